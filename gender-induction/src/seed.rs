use std::cmp::Reverse;

use rustc_hash::FxHashMap;

use crate::{
    ContextIndex, Gender, GenderMap, InductionConfig, InductionError, LabelSource, Noun, NounId,
    NounInventory, SnapshotLog, Stage, Warning, inventory::normalize_base_form,
};

/// Supplies the gender of a seed candidate.
///
/// This is the only supervision the induction receives: the selector decides
/// *which* nouns become seeds from frequency and context breadth alone, and the
/// labeler only says what gender a chosen candidate has (or that it cannot
/// tell, in which case the candidate is skipped).
pub trait SeedLabeler {
    fn label(&self, noun: &Noun) -> Option<Gender>;
}

/// Labels candidates with their annotated gender, standing in for a human
/// annotator who labels the handful of top-ranked words. Forms annotated with
/// more than one gender are never seeds.
pub struct GoldAnnotator;

impl SeedLabeler for GoldAnnotator {
    fn label(&self, noun: &Noun) -> Option<Gender> {
        noun.gold().unambiguous()
    }
}

/// Labels candidates from an explicit base form → gender list.
#[derive(Clone, Debug, Default)]
pub struct SeedLexicon {
    genders: FxHashMap<String, Gender>,
}

impl SeedLexicon {
    pub fn new(entries: impl IntoIterator<Item = (String, Gender)>) -> Self {
        Self {
            genders: entries
                .into_iter()
                .map(|(form, gender)| (normalize_base_form(&form), gender))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.genders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genders.is_empty()
    }
}

impl SeedLabeler for SeedLexicon {
    fn label(&self, noun: &Noun) -> Option<Gender> {
        self.genders.get(noun.base_form()).copied()
    }
}

/// Seeds chosen for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedSelection {
    pub seeds: Vec<(NounId, Gender)>,
    pub shortfalls: Vec<Warning>,
}

/// Orders unassigned nouns by how reliable their statistics are.
///
/// Each noun gets its position in the frequency ranking plus its position in
/// the context-breadth ranking (distinct co-occurring signatures); smaller sums
/// come first. Every ranking breaks ties by base form.
pub fn rank_candidates(inventory: &NounInventory, index: &ContextIndex) -> Vec<NounId> {
    let candidates: Vec<(NounId, &Noun)> = inventory.unassigned().collect();

    let mut by_frequency = candidates.clone();
    by_frequency.sort_by(|(_, a), (_, b)| {
        (Reverse(a.frequency()), a.base_form()).cmp(&(Reverse(b.frequency()), b.base_form()))
    });

    let mut by_breadth = candidates.clone();
    by_breadth.sort_by(|(a_id, a), (b_id, b)| {
        (Reverse(index.breadth(*a_id)), a.base_form())
            .cmp(&(Reverse(index.breadth(*b_id)), b.base_form()))
    });

    let mut rank_sum: FxHashMap<NounId, usize> = FxHashMap::default();
    for ranking in [&by_frequency, &by_breadth] {
        for (position, (id, _)) in ranking.iter().enumerate() {
            *rank_sum.entry(*id).or_insert(0) += position;
        }
    }

    let mut ranked = candidates;
    ranked.sort_by(|(a_id, a), (b_id, b)| {
        (rank_sum[a_id], a.base_form()).cmp(&(rank_sum[b_id], b.base_form()))
    });
    ranked.into_iter().map(|(id, _)| id).collect()
}

/// Picks up to `seeds_per_gender` seeds per gender by walking the ranking.
pub fn select_seeds(
    inventory: &NounInventory,
    index: &ContextIndex,
    labeler: &dyn SeedLabeler,
    seeds_per_gender: usize,
) -> SeedSelection {
    let mut taken = GenderMap::<usize>::default();
    let mut seeds = Vec::new();

    for id in rank_candidates(inventory, index) {
        if taken.values().all(|&count| count >= seeds_per_gender) {
            break;
        }
        let Some(gender) = labeler.label(inventory.get(id)) else {
            continue;
        };
        let count = taken.get_mut(&gender);
        if *count < seeds_per_gender {
            *count += 1;
            seeds.push((id, gender));
        }
    }

    let shortfalls = taken
        .iter()
        .filter(|&(_, &found)| found < seeds_per_gender)
        .map(|(gender, &found)| Warning::ReducedSeedSet {
            gender,
            found,
            requested: seeds_per_gender,
        })
        .collect();

    SeedSelection { seeds, shortfalls }
}

/// Stage labeling the selected seeds.
pub struct SeedSelector {
    labeler: Box<dyn SeedLabeler>,
}

impl SeedSelector {
    pub fn new(labeler: Box<dyn SeedLabeler>) -> Self {
        Self { labeler }
    }
}

impl Stage for SeedSelector {
    fn name(&self) -> &'static str {
        "seed_selection"
    }

    fn run(
        &self,
        inventory: &mut NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
        _snapshots: &mut SnapshotLog,
    ) -> Result<Vec<Warning>, InductionError> {
        let selection = select_seeds(inventory, index, self.labeler.as_ref(), config.seeds_per_gender);
        for &(id, gender) in &selection.seeds {
            log::debug!("Seed: {} ({gender})", inventory.get(id).base_form());
            inventory.assign(id, gender, LabelSource::Seed)?;
        }
        Ok(selection.shortfalls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextSignature, ContextStatistics, GoldGender, Occurrence};

    fn corpus() -> (NounInventory, ContextIndex) {
        let mut inventory = NounInventory::new();
        let nouns = [
            ("pán", 50, Gender::Masculine),
            ("hrad", 50, Gender::Masculine),
            ("žena", 40, Gender::Feminine),
            ("město", 30, Gender::Neuter),
            ("růže", 2, Gender::Feminine),
        ];
        let mut occurrences = Vec::new();
        for (noun, frequency, gender) in nouns {
            inventory
                .insert(noun, frequency, GoldGender::Known(gender))
                .unwrap();
            let breadth = (frequency / 10).max(1);
            for i in 0..breadth {
                occurrences.push(Occurrence::new(
                    noun,
                    [ContextSignature::new(&format!("{noun}-{i}|"))],
                ));
            }
        }
        let index =
            ContextIndex::build(&inventory, occurrences, ContextStatistics::Token).unwrap();
        (inventory, index)
    }

    fn names(inventory: &NounInventory, ids: &[NounId]) -> Vec<String> {
        ids.iter()
            .map(|&id| inventory.get(id).base_form().to_string())
            .collect()
    }

    #[test]
    fn test_ranking_breaks_ties_by_base_form() {
        let (inventory, index) = corpus();
        let ranking = rank_candidates(&inventory, &index);
        assert_eq!(
            names(&inventory, &ranking),
            ["hrad", "pán", "žena", "město", "růže"]
        );
    }

    #[test]
    fn test_selects_top_k_per_gender() {
        let (inventory, index) = corpus();
        let selection = select_seeds(&inventory, &index, &GoldAnnotator, 1);
        let seeds: Vec<(String, Gender)> = selection
            .seeds
            .iter()
            .map(|&(id, gender)| (inventory.get(id).base_form().to_string(), gender))
            .collect();
        assert_eq!(
            seeds,
            vec![
                ("hrad".to_string(), Gender::Masculine),
                ("žena".to_string(), Gender::Feminine),
                ("město".to_string(), Gender::Neuter),
            ]
        );
        assert!(selection.shortfalls.is_empty());
    }

    #[test]
    fn test_gold_annotator_skips_ambiguous_forms() {
        let (mut inventory, _) = corpus();
        inventory
            .insert("kočka", 90, GoldGender::Ambiguous(Gender::Feminine))
            .unwrap();
        let occurrences = inventory
            .iter()
            .map(|(_, noun)| {
                let breadth = (noun.frequency() / 10).max(1);
                let signatures: Vec<ContextSignature> = (0..breadth)
                    .map(|i| ContextSignature::new(&format!("{}-{i}|", noun.base_form())))
                    .collect();
                Occurrence::new(noun.base_form(), signatures)
            })
            .collect::<Vec<_>>();
        let index =
            ContextIndex::build(&inventory, occurrences, ContextStatistics::Token).unwrap();

        let ranking = rank_candidates(&inventory, &index);
        assert_eq!(names(&inventory, &ranking[..1]), ["kočka"]);

        let selection = select_seeds(&inventory, &index, &GoldAnnotator, 1);
        let feminine: Vec<String> = selection
            .seeds
            .iter()
            .filter(|&&(_, gender)| gender == Gender::Feminine)
            .map(|&(id, _)| inventory.get(id).base_form().to_string())
            .collect();
        assert_eq!(feminine, ["žena"]);
    }

    #[test]
    fn test_reports_reduced_seed_set() {
        let (inventory, index) = corpus();
        let selection = select_seeds(&inventory, &index, &GoldAnnotator, 2);
        assert_eq!(selection.seeds.len(), 5);
        assert_eq!(
            selection.shortfalls,
            vec![Warning::ReducedSeedSet {
                gender: Gender::Neuter,
                found: 1,
                requested: 2,
            }]
        );
    }

    #[test]
    fn test_lexicon_labeler_skips_unlisted_nouns() {
        let (inventory, index) = corpus();
        let lexicon = SeedLexicon::new([
            ("Růže".to_string(), Gender::Feminine),
            ("pán".to_string(), Gender::Masculine),
            ("Pán".to_string(), Gender::Masculine),
        ]);
        assert_eq!(lexicon.len(), 2);
        assert!(!lexicon.is_empty());
        let selection = select_seeds(&inventory, &index, &lexicon, 1);
        assert_eq!(
            names(
                &inventory,
                &selection.seeds.iter().map(|&(id, _)| id).collect::<Vec<_>>()
            ),
            ["pán", "růže"]
        );
        assert_eq!(selection.shortfalls.len(), 1);
    }
}
