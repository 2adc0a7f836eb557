pub mod cli;
pub mod corpus;
pub mod run_log;

use gender_induction::{NounInventory, Pipeline, SnapshotLog};

use crate::cli::Args;
use crate::run_log::RunLog;

pub struct RunOutcome {
    pub run_log: RunLog,
    pub snapshots: SnapshotLog,
    pub inventory: NounInventory,
}

/// Loads the corpus, runs the standard pipeline and writes every output file.
pub fn run(args: &Args) -> anyhow::Result<RunOutcome> {
    let config = args.induction_config();
    config.validate()?;

    let run_log = RunLog::create(&args.out_dir)?;
    run_log.save_args(args)?;
    log::info!("Writing run to {}", run_log.dir().display());

    let sentences = corpus::read_conllu(&args.corpus_path)?;
    let corpus = corpus::load(&sentences, &args.corpus_options())?;
    let mut inventory = corpus.inventory;

    let pipeline = Pipeline::standard(args.seed_labeler()?);
    let snapshots = pipeline.run(&mut inventory, &corpus.index, &config)?;

    run_log.save_snapshots(&snapshots)?;
    for step in pipeline.stage_names() {
        if let Some(snapshot) = snapshots.find(step) {
            run_log.save_step_stats(snapshot)?;
        }
    }
    run_log.save_assignment(&inventory)?;

    Ok(RunOutcome {
        run_log,
        snapshots,
        inventory,
    })
}
