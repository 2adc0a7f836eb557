use crate::{
    ContextIndex, Fallback, Gender, GenderMap, InductionConfig, InductionError, LabelSource,
    NounInventory, SnapshotLog, Stage, Warning, evaluate,
};

/// Labels every noun still unassigned with one fallback gender, making
/// coverage total.
pub struct DefaultResolver;

impl DefaultResolver {
    /// The gender the fallback resolves to for the current labels.
    ///
    /// `MostFrequent` counts induced labels by type; ties and an unlabeled
    /// inventory go to the first-declared gender.
    pub fn resolve(inventory: &NounInventory, fallback: Fallback) -> Gender {
        match fallback {
            Fallback::Fixed(gender) => gender,
            Fallback::MostFrequent => {
                let mut counts = GenderMap::<f64>::default();
                for (_, noun) in inventory.iter() {
                    if let Some(gender) = noun.induced() {
                        *counts.get_mut(&gender) += 1.0;
                    }
                }
                counts.best_and_runner_up().0
            }
        }
    }
}

impl Stage for DefaultResolver {
    fn name(&self) -> &'static str {
        "default"
    }

    fn run(
        &self,
        inventory: &mut NounInventory,
        _index: &ContextIndex,
        config: &InductionConfig,
        _snapshots: &mut SnapshotLog,
    ) -> Result<Vec<Warning>, InductionError> {
        let mut warnings = Vec::new();
        let coverage = evaluate(inventory).coverage;
        if !inventory.is_empty() && coverage < config.low_coverage_warning {
            warnings.push(Warning::LowCoverageBeforeDefault { coverage });
        }

        let gender = Self::resolve(inventory, config.fallback);
        let remaining: Vec<_> = inventory.unassigned().map(|(id, _)| id).collect();
        log::debug!("Assigning {gender} to {} remaining nouns", remaining.len());
        for id in remaining {
            inventory.assign(id, gender, LabelSource::Default)?;
        }
        Ok(warnings)
    }
}
