use crate::{
    Bootstrapper, ContextIndex, DefaultResolver, InductionConfig, InductionError,
    MorphologicalClassifier, NounInventory, SeedLabeler, SeedSelector, SnapshotLog, Warning,
    evaluate,
};

/// One step of the induction pipeline.
///
/// A stage may only label nouns that are still unassigned. Stages that
/// produce intermediate states worth evaluating (bootstrapping rounds) record
/// their own snapshots; the pipeline records one more after the stage.
pub trait Stage {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        inventory: &mut NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
        snapshots: &mut SnapshotLog,
    ) -> Result<Vec<Warning>, InductionError>;
}

/// Ordered composition of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Seed selection, bootstrapping, morphology, default.
    pub fn standard(labeler: Box<dyn SeedLabeler>) -> Self {
        Self::new(vec![
            Box::new(SeedSelector::new(labeler)),
            Box::new(Bootstrapper),
            Box::new(MorphologicalClassifier),
            Box::new(DefaultResolver),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(
        &self,
        inventory: &mut NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
    ) -> Result<SnapshotLog, InductionError> {
        config.validate()?;

        let mut snapshots = SnapshotLog::new();
        for stage in &self.stages {
            let before = evaluate(inventory).labeled;
            let warnings = stage.run(inventory, index, config, &mut snapshots)?;
            for warning in &warnings {
                log::warn!("{}: {warning:?}", stage.name());
            }

            let snapshot = snapshots.record(stage.name(), inventory, config, warnings);
            log::info!(
                "{}: labeled {} nouns, coverage {:.4}, accuracy {}",
                stage.name(),
                snapshot.evaluation.labeled - before,
                snapshot.evaluation.coverage,
                snapshot
                    .evaluation
                    .accuracy
                    .map_or_else(|| "n/a".to_string(), |accuracy| format!("{accuracy:.4}")),
            );
        }

        Ok(snapshots)
    }
}
