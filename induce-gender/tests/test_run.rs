use std::fs;
use std::path::Path;

use clap::Parser;
use gender_induction::{Gender, LabelSource};
use induce_gender::cli::Args;

const SENTENCES: &[&[(&str, &str)]] = &[
    &[("Ten", "PDYS1----------"), ("pán", "NNMS1-----A----"), ("spí", "VB-S---3P-AA---")],
    &[("ten", "PDYS1----------"), ("pán", "NNMS1-----A----"), ("leží", "VB-S---3P-AA---")],
    &[("ten", "PDYS1----------"), ("sluha", "NNMS1-----A----"), ("spí", "VB-S---3P-AA---")],
    &[("ta", "PDFS1----------"), ("žena", "NNFS1-----A----"), ("spí", "VB-S---3P-AA---")],
    &[("ta", "PDFS1----------"), ("kniha", "NNFS1-----A----"), ("leží", "VB-S---3P-AA---")],
    &[("to", "PDNS1----------"), ("město", "NNNS1-----A----"), ("spí", "VB-S---3P-AA---")],
];

fn write_corpus(path: &Path) {
    let mut text = String::new();
    for (sent_idx, sentence) in SENTENCES.iter().enumerate() {
        text.push_str(&format!("# sent_id = {}\n", sent_idx + 1));
        for (idx, (form, tag)) in sentence.iter().enumerate() {
            text.push_str(&format!(
                "{}\t{form}\t_\t_\t{tag}\t_\t0\t_\t_\t_\n",
                idx + 1
            ));
        }
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

#[test]
fn test_full_run_writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.conllu");
    write_corpus(&corpus_path);
    let out_dir = dir.path().join("out");

    let args = Args::try_parse_from([
        "induce-gender",
        "--corpus-path",
        corpus_path.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
        "--num-seeds",
        "1",
        "--context-type",
        "left",
        "--context-word-form",
        "word",
    ])
    .unwrap();

    let outcome = induce_gender::run(&args).unwrap();

    let sluha = outcome.inventory.by_base_form("sluha").unwrap();
    assert_eq!(sluha.induced(), Some(Gender::Masculine));
    assert_eq!(sluha.label_source(), Some(LabelSource::Bootstrap { round: 1 }));
    let last = outcome.snapshots.last().unwrap();
    assert_eq!(last.evaluation.coverage, 1.0);
    assert_eq!(last.evaluation.accuracy, Some(1.0));

    let run_dir = outcome.run_log.dir();
    assert!(run_dir.starts_with(&out_dir));
    for file in [
        "args.json",
        "snapshots.jsonl",
        "seed_selection_stats.json",
        "bootstrap_stats.json",
        "morphology_stats.json",
        "default_stats.json",
        "gender_assignment.json",
    ] {
        assert!(run_dir.join(file).is_file(), "missing {file}");
    }

    let assignment: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("gender_assignment.json")).unwrap())
            .unwrap();
    assert_eq!(
        assignment,
        serde_json::json!({
            "kniha": "FEM",
            "město": "NEUT",
            "pán": "MASC",
            "sluha": "MASC",
            "žena": "FEM",
        })
    );

    let args_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("args.json")).unwrap()).unwrap();
    assert_eq!(args_json["num_seeds"], 1);
    assert_eq!(args_json["context_type"], "left");
}

#[test]
fn test_seed_lexicon_replaces_gold_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.conllu");
    write_corpus(&corpus_path);
    let lexicon_path = dir.path().join("seeds.json");
    fs::write(&lexicon_path, r#"{"pán": "MASC", "žena": "FEM"}"#).unwrap();

    let out_dir = dir.path().join("out");
    let args = Args::try_parse_from([
        "induce-gender",
        "--corpus-path",
        corpus_path.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
        "--seed-lexicon",
        lexicon_path.to_str().unwrap(),
        "--context-type",
        "left",
        "--context-word-form",
        "word",
    ])
    .unwrap();

    let outcome = induce_gender::run(&args).unwrap();
    let seeds: Vec<&str> = outcome
        .inventory
        .iter()
        .filter(|(_, noun)| noun.label_source() == Some(LabelSource::Seed))
        .map(|(_, noun)| noun.base_form())
        .collect();
    assert_eq!(seeds, ["pán", "žena"]);

    let seed_step = outcome.snapshots.find("seed_selection").unwrap();
    assert_eq!(seed_step.warnings.len(), 3);
}
