use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited force samples (kgf), ignoring blank/comment
/// lines. Non-finite samples are rejected: a NaN would silently poison the
/// peak search and every window mean downstream.
pub fn parse_force_samples(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not a force sample: {}", idx + 1, trimmed))?;
        if !val.is_finite() {
            anyhow::bail!("line {} is not a finite force sample: {}", idx + 1, trimmed);
        }
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no force samples found");
    }
    Ok(out)
}

/// Read a newline-delimited force series from disk.
pub fn read_force_samples(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_force_samples(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_samples_and_skips_comments() {
        let parsed = parse_force_samples("# header\n1.5\n\n2.5\n").unwrap();
        assert_eq!(parsed, vec![1.5, 2.5]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_force_samples("# nothing\n").is_err());
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let err = parse_force_samples("1.0\nNaN\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_force_samples("inf\n").is_err());
    }
}
