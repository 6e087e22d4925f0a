use crate::error::AnalysisError;
use crate::landmarks::{TwitchWindows, Window};
use crate::signal::ForceSeries;
use serde::{Deserialize, Serialize};

/// TTP63 threshold as a fraction of MViF.
pub const TTP_TARGET_FRACTION: f64 = 0.63;

/// Intervals after force onset over which RFD is reported.
pub const RFD_INTERVALS_MS: [u32; 4] = [50, 100, 150, 200];

/// All metrics for one run, assembled once and then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuscleFunctionSummary {
    pub participant: String,
    /// Maximum voluntary isometric force (N)
    pub mvif: f64,
    /// Time to 63% of MViF (mSec)
    pub ttp63_ms: f64,
    /// Rate of force development (N/Sec)
    pub rfd50: f64,
    pub rfd100: f64,
    pub rfd150: f64,
    pub rfd200: f64,
    /// Activation capacity (%)
    pub ac: f64,
}

fn slice<'a>(series: &'a ForceSeries, window: &Window) -> Result<&'a [f64], AnalysisError> {
    if window.is_empty() {
        return Err(AnalysisError::EmptyWindow {
            start: window.start,
            end: window.end,
        });
    }
    if window.end > series.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index: window.end as i64,
            len: series.len(),
        });
    }
    Ok(&series.data[window.start..window.end])
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v))
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().fold(f64::INFINITY, |m, &v| m.min(v))
}

/// Maximum voluntary isometric force: peak over the selected window.
pub fn mvif(series: &ForceSeries, window: &Window) -> Result<f64, AnalysisError> {
    Ok(max_of(slice(series, window)?))
}

/// Time from onset to the first sample at or above 63% of MViF, in ms.
pub fn ttp63(series: &ForceSeries, onset: usize, mvif: f64) -> Result<f64, AnalysisError> {
    if onset >= series.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index: onset as i64,
            len: series.len(),
        });
    }
    let target = mvif * TTP_TARGET_FRACTION;
    for (i, &value) in series.data.iter().enumerate().skip(onset) {
        if value >= target {
            return Ok((i - onset) as f64 / series.fs * 1000.0);
        }
    }
    Err(AnalysisError::TargetNotReached { target, onset })
}

/// Rate of force development over `ms` milliseconds from the onset, in N/s.
pub fn rfd(series: &ForceSeries, onset: usize, ms: u32) -> Result<f64, AnalysisError> {
    let offset = (ms as f64 * series.fs / 1000.0).round() as usize;
    let end = onset + offset;
    if onset >= series.len() || end >= series.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index: end as i64,
            len: series.len(),
        });
    }
    let n0 = series.data[onset];
    let n1 = series.data[end];
    Ok((n1 - n0) / (ms as f64 / 1000.0))
}

/// Activation capacity: (1 - A/B) * 100, where A is the superimposed twitch
/// amplitude and B the resting twitch amplitude. Offset-invariant.
pub fn activation_capacity(
    series: &ForceSeries,
    windows: &TwitchWindows,
) -> Result<f64, AnalysisError> {
    let twitch = slice(series, &windows.twitch)?;
    let rest = slice(series, &windows.rest)?;
    let a = max_of(twitch) - min_of(twitch);
    let b = max_of(rest) - min_of(rest);
    if b == 0.0 {
        return Err(AnalysisError::DivisionByZero);
    }
    Ok((1.0 - a / b) * 100.0)
}
