use std::time::Instant;

use crate::{
    ContextIndex, Gender, GenderMap, InductionConfig, InductionError, LabelSource, LabelView,
    NounId, NounInventory, SnapshotLog, Stage, Warning,
};

/// Per-signature gender affinity computed from one frozen set of labels.
///
/// The affinity of a signature is the share of its labeled co-occurrences
/// belonging to each gender. A signature with no labeled co-occurrence has an
/// all-zero affinity and so adds nothing to any score.
pub struct Affinities {
    by_signature: Vec<GenderMap<f64>>,
}

impl Affinities {
    pub fn compute(index: &ContextIndex, view: &LabelView) -> Self {
        let by_signature = index
            .signature_ids()
            .map(|signature| {
                let mut counts = GenderMap::<f64>::default();
                for (&noun, &count) in index.nouns_of(signature) {
                    if let Some(gender) = view.get(noun) {
                        *counts.get_mut(&gender) += count as f64;
                    }
                }
                counts.normalized()
            })
            .collect();
        Self { by_signature }
    }

    /// Association of `noun` with each gender: the affinities of its
    /// signatures averaged with co-occurrence counts as weights. All zero for
    /// a noun without signatures.
    pub fn score(&self, index: &ContextIndex, noun: NounId) -> GenderMap<f64> {
        let mut weighted = GenderMap::<f64>::default();
        let mut total = 0.0;
        for (signature, count) in index.signatures_of(noun) {
            let count = count as f64;
            total += count;
            for (gender, affinity) in self.by_signature[signature.index()].iter() {
                *weighted.get_mut(&gender) += count * affinity;
            }
        }
        if total == 0.0 {
            return weighted;
        }
        weighted.map(|_, value| value / total)
    }
}

/// Labels assigned by one round, committed only after the whole round is scored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundOutcome {
    pub assignments: Vec<(NounId, Gender)>,
}

/// Grows the labeled set through shared contexts until a fixed point.
pub struct Bootstrapper;

impl Bootstrapper {
    /// Decides one round from `view` without touching the inventory.
    pub fn score_round(
        inventory: &NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
        view: &LabelView,
    ) -> RoundOutcome {
        let affinities = Affinities::compute(index, view);
        let assignments = inventory
            .iter()
            .filter(|&(id, _)| view.get(id).is_none())
            .filter_map(|(id, _)| {
                let (gender, best, runner_up) = affinities.score(index, id).best_and_runner_up();
                let confident = best > 0.0
                    && best > config.confidence_threshold
                    && best - runner_up > config.margin_threshold;
                confident.then_some((id, gender))
            })
            .collect();
        RoundOutcome { assignments }
    }

    fn commit(
        inventory: &mut NounInventory,
        outcome: &RoundOutcome,
        round: usize,
    ) -> Result<(), InductionError> {
        for &(id, gender) in &outcome.assignments {
            inventory.assign(id, gender, LabelSource::Bootstrap { round })?;
        }
        Ok(())
    }
}

impl Stage for Bootstrapper {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn run(
        &self,
        inventory: &mut NounInventory,
        index: &ContextIndex,
        config: &InductionConfig,
        snapshots: &mut SnapshotLog,
    ) -> Result<Vec<Warning>, InductionError> {
        let started = Instant::now();
        let budget = config.time_budget();
        let mut round = 0;

        loop {
            if config.max_rounds.is_some_and(|limit| round >= limit) {
                log::info!("Bootstrapping stopped at the round limit ({round} rounds)");
                return Ok(vec![Warning::RoundLimitReached { rounds: round }]);
            }
            if budget.is_some_and(|budget| started.elapsed() >= budget) {
                log::info!("Bootstrapping ran out of time after {round} rounds");
                return Ok(vec![Warning::TimeBudgetExhausted { rounds: round }]);
            }

            round += 1;
            let view = inventory.label_view();
            let outcome = Self::score_round(inventory, index, config, &view);
            Self::commit(inventory, &outcome, round)?;

            let snapshot = snapshots.record(
                format!("bootstrap_round_{round}"),
                inventory,
                config,
                Vec::new(),
            );
            log::debug!(
                "Round {round}: {} new labels, coverage {:.4}",
                outcome.assignments.len(),
                snapshot.evaluation.coverage
            );

            if outcome.assignments.is_empty() {
                log::info!("Bootstrapping reached a fixed point after {round} rounds");
                return Ok(Vec::new());
            }
        }
    }
}
