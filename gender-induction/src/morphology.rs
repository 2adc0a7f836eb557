use rustc_hash::FxHashMap;

use crate::{
    Affinities, ContextIndex, Gender, GenderMap, InductionConfig, InductionError, LabelSource,
    MorphoStatistics, MorphologyModel, NounId, NounInventory, SnapshotLog, Stage, SuffixTrie,
    Warning, inventory::suffix_of,
};

fn weight(statistics: MorphoStatistics, frequency: u64) -> f64 {
    match statistics {
        MorphoStatistics::Type => 1.0,
        MorphoStatistics::Token => frequency as f64,
    }
}

/// Gender distributions of labeled nouns grouped by their last `suffix_length` characters.
pub struct SuffixStatistics {
    suffix_length: usize,
    by_suffix: FxHashMap<String, GenderMap<f64>>,
}

impl SuffixStatistics {
    pub fn learn(inventory: &NounInventory, suffix_length: usize, statistics: MorphoStatistics) -> Self {
        let mut by_suffix: FxHashMap<String, GenderMap<f64>> = FxHashMap::default();
        for (_, noun) in inventory.iter() {
            let Some(gender) = noun.induced() else {
                continue;
            };
            let counts = by_suffix
                .entry(noun.suffix(suffix_length).to_string())
                .or_default();
            *counts.get_mut(&gender) += weight(statistics, noun.frequency());
        }
        Self {
            suffix_length,
            by_suffix,
        }
    }

    /// Normalized distribution for the suffix of `base_form`, if any labeled noun shares it.
    pub fn distribution(&self, base_form: &str) -> Option<GenderMap<f64>> {
        self.by_suffix
            .get(suffix_of(base_form, self.suffix_length))
            .map(|counts| counts.normalized())
    }
}

fn build_trie(
    inventory: &NounInventory,
    index: &ContextIndex,
    statistics: MorphoStatistics,
    alpha: f64,
    beta: f64,
) -> SuffixTrie {
    let affinities = Affinities::compute(index, &inventory.label_view());
    let mut trie = SuffixTrie::new(alpha, beta);
    for (id, noun) in inventory.iter() {
        let weight = weight(statistics, noun.frequency());
        let genders = match noun.induced() {
            Some(gender) => GenderMap::from_fn(|g| if g == gender { 1.0 } else { 0.0 }),
            None => affinities.score(index, id),
        };
        let questionable = (1.0 - genders.values().sum::<f64>()).max(0.0);
        trie.insert(
            noun.base_form(),
            genders.map(|_, value| value * weight),
            questionable * weight,
        );
    }
    trie.normalize();
    trie
}

/// Labels nouns left over by bootstrapping from the endings of labeled nouns.
///
/// Statistics are learned once, from the labels present when the stage starts.
/// A noun is labeled only when its suffix was seen, the majority gender's
/// share exceeds `morphology_threshold`, and the majority is strict.
pub struct MorphologicalClassifier;

impl MorphologicalClassifier {
    pub fn classify(
        inventory: &NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
    ) -> Vec<(NounId, Gender)> {
        let decide = |probs: GenderMap<f64>| {
            let (gender, best, runner_up) = probs.best_and_runner_up();
            (best > 0.0 && best > config.morphology_threshold && best > runner_up)
                .then_some(gender)
        };

        match config.morphology_model {
            MorphologyModel::FixedSuffix => {
                let suffixes =
                    SuffixStatistics::learn(inventory, config.suffix_length, config.morpho_statistics);
                inventory
                    .unassigned()
                    .filter_map(|(id, noun)| {
                        let gender = decide(suffixes.distribution(noun.base_form())?)?;
                        Some((id, gender))
                    })
                    .collect()
            }
            MorphologyModel::SmoothedTrie { alpha, beta } => {
                let trie = build_trie(inventory, index, config.morpho_statistics, alpha, beta);
                inventory
                    .unassigned()
                    .filter_map(|(id, noun)| Some((id, decide(trie.gender_probs(noun.base_form()))?)))
                    .collect()
            }
        }
    }
}

impl Stage for MorphologicalClassifier {
    fn name(&self) -> &'static str {
        "morphology"
    }

    fn run(
        &self,
        inventory: &mut NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
        _snapshots: &mut SnapshotLog,
    ) -> Result<Vec<Warning>, InductionError> {
        for (id, gender) in Self::classify(inventory, index, config) {
            inventory.assign(id, gender, LabelSource::Morphology)?;
        }
        Ok(Vec::new())
    }
}
