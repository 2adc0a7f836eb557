use rustc_hash::FxHashMap;

use crate::{Gender, GenderMap};

#[derive(Clone, Debug, Default)]
struct TrieNode {
    children: FxHashMap<char, usize>,
    genders: GenderMap<f64>,
    /// Mass of nouns whose gender the inserting stage could not vouch for.
    questionable: f64,
}

/// Trie over reversed base forms, each node holding the gender distribution
/// of every noun ending in the node's suffix.
///
/// Lookups interpolate from the last character inward. At each deeper node
/// the estimate becomes `gamma * p_node + beta * q^alpha * p_so_far`, where `q`
/// is the node's questionable share and `gamma = (1 - beta * q^alpha) / (1 - q)`,
/// so nodes dominated by questionable mass defer to the shorter suffix.
#[derive(Clone, Debug)]
pub struct SuffixTrie {
    nodes: Vec<TrieNode>,
    alpha: f64,
    beta: f64,
}

impl SuffixTrie {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            alpha,
            beta,
        }
    }

    /// Adds `genders` and `questionable` to every node on the path of `word`.
    pub fn insert(&mut self, word: &str, genders: GenderMap<f64>, questionable: f64) {
        let mut node_idx = 0;
        self.add_mass(node_idx, &genders, questionable);
        for ch in word.chars().rev() {
            let next_idx = if let Some(&idx) = self.nodes[node_idx].children.get(&ch) {
                idx
            } else {
                let new_idx = self.nodes.len();
                self.nodes.push(TrieNode::default());
                self.nodes[node_idx].children.insert(ch, new_idx);
                new_idx
            };
            node_idx = next_idx;
            self.add_mass(node_idx, &genders, questionable);
        }
    }

    fn add_mass(&mut self, node_idx: usize, genders: &GenderMap<f64>, questionable: f64) {
        let node = &mut self.nodes[node_idx];
        for (gender, value) in genders.iter() {
            *node.genders.get_mut(&gender) += value;
        }
        node.questionable += questionable;
    }

    /// Turns every node's mass into a distribution over genders plus the
    /// questionable share. Call once after all insertions.
    pub fn normalize(&mut self) {
        for node in &mut self.nodes {
            let total: f64 = node.genders.values().sum::<f64>() + node.questionable;
            if total > 0.0 {
                node.genders = node.genders.map(|_, value| value / total);
                node.questionable /= total;
            }
        }
    }

    /// Smoothed gender distribution for `word`, normalized to sum to one (or
    /// all zero when the last character was never seen).
    pub fn gender_probs(&self, word: &str) -> GenderMap<f64> {
        let mut chars = word.chars().rev();
        let Some(last) = chars.next() else {
            return GenderMap::default();
        };
        let Some(&first_idx) = self.nodes[0].children.get(&last) else {
            return GenderMap::default();
        };

        let mut probs = self.nodes[first_idx].genders;
        let mut node_idx = first_idx;
        for ch in chars {
            let Some(&next_idx) = self.nodes[node_idx].children.get(&ch) else {
                break;
            };
            node_idx = next_idx;
            let node = &self.nodes[node_idx];
            let q = node.questionable;
            if q < 1.0 {
                let deferral = self.beta * q.powf(self.alpha);
                let gamma = (1.0 - deferral) / (1.0 - q);
                probs = GenderMap::from_fn(|gender: Gender| {
                    gamma * node.genders.get(&gender) + deferral * probs.get(&gender)
                });
            }
        }

        probs.normalized()
    }
}
