use crate::signal::ForceSeries;
use anyhow::{anyhow, Context, Result};
use matfile::{MatFile, NumericData};
use std::fs::File;
use std::path::Path;

/// Load a force recording from a MAT level-5 container.
///
/// The container must hold a numeric `data` array (column-major; the first
/// column is the force channel, in kilograms-force) and a scalar
/// `samplerate` in Hz. Any numeric MAT class is accepted and widened to f64.
pub fn load_force_mat(path: &Path) -> Result<ForceSeries> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mat = MatFile::parse(file)
        .map_err(|e| anyhow!("parsing {} as a MAT file: {e:?}", path.display()))?;

    let fs = scalar(&mat, "samplerate")?;
    if fs <= 0.0 || !fs.is_finite() {
        anyhow::bail!("samplerate must be a positive number, got {fs}");
    }

    let array = mat
        .find_by_name("data")
        .ok_or_else(|| anyhow!("no `data` variable in {}", path.display()))?;
    let values = numeric_to_f64(array.data())
        .ok_or_else(|| anyhow!("`data` is not a numeric array"))?;
    let data = first_column(&values, array.size())?;
    if data.is_empty() {
        anyhow::bail!("`data` holds no samples");
    }

    Ok(ForceSeries { fs, data })
}

/// First column of a column-major array. Row and column vectors are taken
/// whole.
fn first_column(values: &[f64], size: &[usize]) -> Result<Vec<f64>> {
    match size {
        [1, _] | [_, 1] => Ok(values.to_vec()),
        [rows, _cols] if *rows <= values.len() => Ok(values[..*rows].to_vec()),
        other => Err(anyhow!("unsupported `data` shape {other:?}")),
    }
}

fn scalar(mat: &MatFile, name: &str) -> Result<f64> {
    let array = mat
        .find_by_name(name)
        .ok_or_else(|| anyhow!("no `{name}` variable in the MAT file"))?;
    let values =
        numeric_to_f64(array.data()).ok_or_else(|| anyhow!("`{name}` is not numeric"))?;
    values
        .first()
        .copied()
        .ok_or_else(|| anyhow!("`{name}` is empty"))
}

fn numeric_to_f64(data: &NumericData) -> Option<Vec<f64>> {
    let out = match data {
        NumericData::Double { real, .. } => real.clone(),
        NumericData::Single { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Int8 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::UInt8 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Int16 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::UInt16 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Int32 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::UInt32 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Int64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::UInt64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
    };
    Some(out)
}
