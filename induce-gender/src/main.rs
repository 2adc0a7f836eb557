use clap::Parser;
use induce_gender::cli::Args;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let outcome = induce_gender::run(&args)?;

    println!();
    println!("{:<20} {:>10} {:>10} {:>8}", "step", "coverage", "accuracy", "labeled");
    println!("================================================");
    for snapshot in outcome.snapshots.snapshots() {
        let accuracy = snapshot
            .evaluation
            .accuracy
            .map_or_else(|| "-".to_string(), |accuracy| format!("{accuracy:.4}"));
        println!(
            "{:<20} {:>10.4} {:>10} {:>8}",
            snapshot.step, snapshot.evaluation.coverage, accuracy, snapshot.evaluation.labeled
        );
    }
    println!();
    println!(
        "{} nouns written to {}",
        outcome.inventory.len(),
        outcome.run_log.dir().display()
    );

    Ok(())
}
