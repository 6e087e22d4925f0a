use crate::metrics::MuscleFunctionSummary;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};

/// Fixed result-file name, written next to the input artifact. Kept from
/// the sheet the lab's existing tooling expects.
pub const RESULTS_FILE_NAME: &str = "Risultati AC.csv";

const HEADERS: [&str; 8] = [
    "Participant",
    "MViF (N)",
    "TTP63 (mSec)",
    "RFD50 (N/Sec)",
    "RFD100 (N/Sec)",
    "RFD150 (N/Sec)",
    "RFD200 (N/Sec)",
    "AC (%)",
];

/// Participant identifier: input file name with its extension stripped.
pub fn participant_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Write the single result row for this run, values rounded to 2 decimals.
/// Returns the path of the written file.
pub fn write_results(dir: &Path, summary: &MuscleFunctionSummary) -> Result<PathBuf> {
    let path = dir.join(RESULTS_FILE_NAME);
    let mut writer = WriterBuilder::new()
        .from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    writer.write_record([
        summary.participant.clone(),
        format!("{:.2}", summary.mvif),
        format!("{:.2}", summary.ttp63_ms),
        format!("{:.2}", summary.rfd50),
        format!("{:.2}", summary.rfd100),
        format!("{:.2}", summary.rfd150),
        format!("{:.2}", summary.rfd200),
        format!("{:.2}", summary.ac),
    ])?;
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MuscleFunctionSummary {
        MuscleFunctionSummary {
            participant: "p07".into(),
            mvif: 412.3456,
            ttp63_ms: 126.0,
            rfd50: 500.126,
            rfd100: 480.0,
            rfd150: 450.0,
            rfd200: 430.0,
            ac: 87.654,
        }
    }

    #[test]
    fn participant_is_the_file_stem() {
        assert_eq!(
            participant_from_path(Path::new("/data/trials/p07_mvc.mat")),
            "p07_mvc"
        );
    }

    #[test]
    fn writes_one_rounded_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_results(dir.path(), &summary()).unwrap();
        assert_eq!(path.file_name().unwrap().to_str(), Some(RESULTS_FILE_NAME));
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Participant,MViF (N),TTP63 (mSec),RFD50 (N/Sec),RFD100 (N/Sec),RFD150 (N/Sec),RFD200 (N/Sec),AC (%)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "p07,412.35,126.00,500.13,480.00,450.00,430.00,87.65"
        );
        assert!(lines.next().is_none());
    }
}
