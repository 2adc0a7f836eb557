use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use gender_induction::{NounInventory, Snapshot, SnapshotLog};

/// Output directory of one run.
pub struct RunLog {
    dir: PathBuf,
}

#[derive(serde::Serialize)]
struct StepStats {
    coverage: f64,
    accuracy: Option<f64>,
}

impl RunLog {
    /// Creates `<out_dir>/<YYYY-MM-DD_HHMMSS>` from the local time.
    pub fn create(out_dir: &Path) -> anyhow::Result<Self> {
        let name = chrono::Local::now().format("%Y-%m-%d_%H%M%S").to_string();
        Self::create_named(out_dir, &name)
    }

    /// Fails if the run directory already exists.
    pub fn create_named(out_dir: &Path, name: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
        let dir = out_dir.join(name);
        fs::create_dir(&dir)
            .with_context(|| format!("Failed to create run directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn create_file(&self, file_name: &str) -> anyhow::Result<(PathBuf, BufWriter<File>)> {
        let path = self.dir.join(file_name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok((path, BufWriter::new(file)))
    }

    fn write_json(&self, file_name: &str, value: &impl serde::Serialize) -> anyhow::Result<PathBuf> {
        let (path, mut writer) = self.create_file(file_name)?;
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        Ok(path)
    }

    pub fn save_args(&self, args: &impl serde::Serialize) -> anyhow::Result<PathBuf> {
        self.write_json("args.json", args)
    }

    /// One JSON object per line, in recording order.
    pub fn save_snapshots(&self, snapshots: &SnapshotLog) -> anyhow::Result<PathBuf> {
        let (path, mut writer) = self.create_file("snapshots.jsonl")?;
        for snapshot in snapshots.snapshots() {
            serde_json::to_writer(&mut writer, snapshot)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn save_step_stats(&self, snapshot: &Snapshot) -> anyhow::Result<PathBuf> {
        self.write_json(
            &format!("{}_stats.json", snapshot.step),
            &StepStats {
                coverage: snapshot.evaluation.coverage,
                accuracy: snapshot.evaluation.accuracy,
            },
        )
    }

    /// Base form → induced gender, sorted by base form.
    pub fn save_assignment(&self, inventory: &NounInventory) -> anyhow::Result<PathBuf> {
        self.write_json("gender_assignment.json", &inventory.assignment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gender_induction::{Gender, GoldGender, InductionConfig, LabelSource};

    #[test]
    fn test_writes_snapshots_and_assignment() {
        let out = tempfile::tempdir().unwrap();
        let run_log = RunLog::create_named(out.path(), "run").unwrap();

        let mut inventory = NounInventory::new();
        let id = inventory
            .insert("žena", 2, GoldGender::Known(Gender::Feminine))
            .unwrap();
        inventory.insert("hrad", 1, GoldGender::Unknown).unwrap();
        let config = InductionConfig::default();
        let mut snapshots = SnapshotLog::new();
        snapshots.record("before", &inventory, &config, Vec::new());
        inventory
            .assign(id, Gender::Feminine, LabelSource::Seed)
            .unwrap();
        snapshots.record("after", &inventory, &config, Vec::new());

        let path = run_log.save_snapshots(&snapshots).unwrap();
        let lines: Vec<serde_json::Value> = fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["step"], "before");
        assert_eq!(lines[1]["coverage"], 0.5);
        assert_eq!(lines[1]["accuracy"], 1.0);

        let path = run_log.save_step_stats(&snapshots.snapshots()[1]).unwrap();
        assert_eq!(path.file_name().unwrap(), "after_stats.json");

        let path = run_log.save_assignment(&inventory).unwrap();
        let assignment: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(assignment, serde_json::json!({ "žena": "FEM" }));
    }

    #[test]
    fn test_refuses_to_reuse_a_run_directory() {
        let out = tempfile::tempdir().unwrap();
        RunLog::create_named(out.path(), "run").unwrap();
        assert!(RunLog::create_named(out.path(), "run").is_err());
    }
}
