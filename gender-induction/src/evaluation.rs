use crate::{Gender, InductionConfig, NounInventory};

/// Coverage and accuracy of the current labeling.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Evaluation {
    /// Labeled nouns over all nouns. An empty inventory counts as fully covered.
    pub coverage: f64,
    /// Correctly labeled nouns over labeled nouns; `None` before anything is labeled.
    pub accuracy: Option<f64>,
    pub labeled: usize,
    pub correct: usize,
    pub total: usize,
}

pub fn evaluate(inventory: &NounInventory) -> Evaluation {
    let total = inventory.len();
    let mut labeled = 0;
    let mut correct = 0;
    for (_, noun) in inventory.iter() {
        let Some(induced) = noun.induced() else {
            continue;
        };
        labeled += 1;
        if noun.gold().known() == Some(induced) {
            correct += 1;
        }
    }

    let coverage = if total == 0 {
        1.0
    } else {
        labeled as f64 / total as f64
    };
    let accuracy = (labeled > 0).then(|| correct as f64 / labeled as f64);

    Evaluation {
        coverage,
        accuracy,
        labeled,
        correct,
        total,
    }
}

/// Conditions worth surfacing in a snapshot that do not stop the run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Warning {
    /// Fewer seed candidates than requested were found for a gender.
    ReducedSeedSet {
        gender: Gender,
        found: usize,
        requested: usize,
    },
    /// Bootstrapping stopped at the round limit while still assigning labels.
    RoundLimitReached { rounds: usize },
    /// Bootstrapping stopped because its time budget ran out.
    TimeBudgetExhausted { rounds: usize },
    /// Almost nothing was labeled before the default gender was applied.
    LowCoverageBeforeDefault { coverage: f64 },
}

/// Immutable record of the labeling after one pipeline step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub step: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub hyperparameters: InductionConfig,
    pub warnings: Vec<Warning>,
}

/// Append-only sequence of snapshots for one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotLog {
    snapshots: Vec<Snapshot>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `inventory` and appends the result under `step`.
    pub fn record(
        &mut self,
        step: impl Into<String>,
        inventory: &NounInventory,
        config: &InductionConfig,
        warnings: Vec<Warning>,
    ) -> &Snapshot {
        self.snapshots.push(Snapshot {
            step: step.into(),
            evaluation: evaluate(inventory),
            hyperparameters: config.clone(),
            warnings,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn find(&self, step: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.step == step)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl IntoIterator for SnapshotLog {
    type Item = Snapshot;
    type IntoIter = std::vec::IntoIter<Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GoldGender, LabelSource};

    #[test]
    fn test_three_of_four_correct_is_exactly_three_quarters() {
        let mut inventory = NounInventory::new();
        let labels = [
            ("pán", Gender::Masculine, Gender::Masculine),
            ("žena", Gender::Feminine, Gender::Feminine),
            ("město", Gender::Neuter, Gender::Neuter),
            ("stroj", Gender::Masculine, Gender::Feminine),
        ];
        for (noun, gold, induced) in labels {
            let id = inventory.insert(noun, 1, GoldGender::Known(gold)).unwrap();
            inventory.assign(id, induced, LabelSource::Seed).unwrap();
        }
        inventory
            .insert("kuře", 1, GoldGender::Known(Gender::Neuter))
            .unwrap();

        let evaluation = evaluate(&inventory);
        assert_eq!(evaluation.labeled, 4);
        assert_eq!(evaluation.correct, 3);
        assert_eq!(evaluation.accuracy, Some(0.75));
        assert_eq!(evaluation.coverage, 0.8);
    }

    #[test]
    fn test_unknown_gold_never_counts_as_correct() {
        let mut inventory = NounInventory::new();
        let id = inventory.insert("xyz", 1, GoldGender::Unknown).unwrap();
        inventory
            .assign(id, Gender::Neuter, LabelSource::Default)
            .unwrap();
        assert_eq!(evaluate(&inventory).accuracy, Some(0.0));
    }

    #[test]
    fn test_nothing_labeled_has_no_accuracy() {
        let mut inventory = NounInventory::new();
        inventory.insert("hrad", 2, GoldGender::Unknown).unwrap();
        let evaluation = evaluate(&inventory);
        assert_eq!(evaluation.coverage, 0.0);
        assert_eq!(evaluation.accuracy, None);
    }

    #[test]
    fn test_snapshot_log_appends_in_order() {
        let mut inventory = NounInventory::new();
        let id = inventory.insert("hrad", 2, GoldGender::Unknown).unwrap();
        let config = InductionConfig::default();

        let mut log = SnapshotLog::new();
        log.record("before", &inventory, &config, Vec::new());
        inventory
            .assign(id, Gender::Masculine, LabelSource::Seed)
            .unwrap();
        log.record("after", &inventory, &config, Vec::new());

        let steps: Vec<&str> = log.snapshots().iter().map(|s| s.step.as_str()).collect();
        assert_eq!(steps, ["before", "after"]);
        assert_eq!(log.find("before").unwrap().evaluation.coverage, 0.0);
        assert_eq!(log.last().unwrap().evaluation.coverage, 1.0);
    }
}
