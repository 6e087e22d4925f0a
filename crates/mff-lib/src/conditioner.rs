use crate::error::AnalysisError;
use crate::signal::ForceSeries;
use std::f64::consts::PI;

/// Configurable parameters for force-signal conditioning.
///
/// The defaults reproduce the lab calibration this tool was built around:
/// load cells reporting kilograms-force and mains noise removed at 40 Hz.
#[derive(Debug, Clone, Copy)]
pub struct ConditionerConfig {
    /// Multiplier applied to every raw sample (kilograms-force to newtons).
    pub kgf_to_newtons: f64,
    /// Low-pass cutoff frequency (Hz).
    pub cutoff_hz: f64,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            kgf_to_newtons: 9.81,
            cutoff_hz: 40.0,
        }
    }
}

/// Butterworth order; realised as FILTER_ORDER / 2 cascaded biquads.
const FILTER_ORDER: usize = 4;

/// Reflection padding applied at each end before forward-backward filtering,
/// matching the transfer-function padding rule `3 * (order + 1)`.
pub const PAD_LEN: usize = 3 * (FILTER_ORDER + 1);

/// Convert units and low-pass filter a raw force trace.
///
/// The conversion runs before filtering, and the filter is applied forward
/// and backward so the conditioned series has no phase lag relative to the
/// raw one. Onset-timing metrics (TTP63, RFD) rely on that alignment.
pub fn condition(
    raw: &ForceSeries,
    cfg: &ConditionerConfig,
) -> Result<ForceSeries, AnalysisError> {
    let converted: Vec<f64> = raw.data.iter().map(|x| x * cfg.kgf_to_newtons).collect();
    let filtered = filtfilt_lowpass(&converted, raw.fs, cfg.cutoff_hz)?;
    Ok(ForceSeries {
        fs: raw.fs,
        data: filtered,
    })
}

/// Zero-reference the series at the force-onset sample.
///
/// Must run after the TTP onset landmark is acquired and before the
/// peak/timing metrics are computed. Activation capacity only uses
/// within-window differences, so the offset cancels there.
pub fn remove_offset(
    series: &ForceSeries,
    onset: usize,
) -> Result<ForceSeries, AnalysisError> {
    if onset >= series.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index: onset as i64,
            len: series.len(),
        });
    }
    let base = series.data[onset];
    Ok(ForceSeries {
        fs: series.fs,
        data: series.data.iter().map(|x| x - base).collect(),
    })
}

/// One second-order section in direct form II transposed.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Low-pass biquad from the bilinear transform with cutoff pre-warping.
fn lowpass_section(fs: f64, fc: f64, q: f64) -> Biquad {
    let wc = (PI * fc / fs).tan();
    let wc2 = wc * wc;
    let k = 1.0 + wc / q + wc2;
    Biquad {
        b0: wc2 / k,
        b1: 2.0 * wc2 / k,
        b2: wc2 / k,
        a1: 2.0 * (wc2 - 1.0) / k,
        a2: (1.0 - wc / q + wc2) / k,
    }
}

/// Section Q values from the Butterworth pole pairs of an order-4 prototype.
fn butterworth_sections(fs: f64, fc: f64) -> [Biquad; FILTER_ORDER / 2] {
    let mut sections = [lowpass_section(fs, fc, 1.0); FILTER_ORDER / 2];
    for (k, section) in sections.iter_mut().enumerate() {
        let theta = PI * (2 * k + 1) as f64 / (2.0 * FILTER_ORDER as f64);
        let q = 1.0 / (2.0 * theta.cos());
        *section = lowpass_section(fs, fc, q);
    }
    sections
}

/// Internal state that keeps a section at its step steady state, scaled by
/// the first input sample. Starting each pass from this state (rather than
/// zero) keeps a constant trace exactly constant, so the reflection padding
/// only has the genuine boundary transient to absorb.
fn step_state(s: Biquad, x0: f64) -> (f64, f64) {
    let dc = (s.b0 + s.b1 + s.b2) / (1.0 + s.a1 + s.a2);
    let z2 = (s.b2 - s.a2 * dc) * x0;
    let z1 = (s.b1 - s.a1 * dc) * x0 + z2;
    (z1, z2)
}

fn apply_section(signal: &[f64], s: Biquad) -> Vec<f64> {
    let Some(&x0) = signal.first() else {
        return Vec::new();
    };
    let (mut z1, mut z2) = step_state(s, x0);
    signal
        .iter()
        .map(|&x| {
            let y = s.b0 * x + z1;
            z1 = s.b1 * x - s.a1 * y + z2;
            z2 = s.b2 * x - s.a2 * y;
            y
        })
        .collect()
}

fn cascade(signal: &[f64], sections: &[Biquad]) -> Vec<f64> {
    let mut out = signal.to_vec();
    for &section in sections {
        out = apply_section(&out, section);
    }
    out
}

/// Zero-phase 4th-order Butterworth low-pass.
///
/// The input is extended at both ends with an odd reflection, filtered
/// forward, reversed, filtered again, reversed, and the padding stripped.
fn filtfilt_lowpass(data: &[f64], fs: f64, fc: f64) -> Result<Vec<f64>, AnalysisError> {
    let n = data.len();
    if n <= PAD_LEN {
        return Err(AnalysisError::InsufficientData {
            len: n,
            min: PAD_LEN,
        });
    }

    let mut ext = Vec::with_capacity(n + 2 * PAD_LEN);
    for i in (1..=PAD_LEN).rev() {
        ext.push(2.0 * data[0] - data[i]);
    }
    ext.extend_from_slice(data);
    for i in 1..=PAD_LEN {
        ext.push(2.0 * data[n - 1] - data[n - 1 - i]);
    }

    let sections = butterworth_sections(fs, fc);
    let mut out = cascade(&ext, &sections);
    out.reverse();
    out = cascade(&out, &sections);
    out.reverse();

    Ok(out[PAD_LEN..PAD_LEN + n].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(fs: f64, data: Vec<f64>) -> ForceSeries {
        ForceSeries { fs, data }
    }

    fn unit_gain_cfg() -> ConditionerConfig {
        ConditionerConfig {
            kgf_to_newtons: 1.0,
            ..Default::default()
        }
    }

    fn argmax(data: &[f64]) -> usize {
        let mut best = 0;
        for (i, &v) in data.iter().enumerate() {
            if v > data[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn preserves_length() {
        let raw = series(1000.0, vec![0.5; 300]);
        let out = condition(&raw, &ConditionerConfig::default()).unwrap();
        assert_eq!(out.len(), raw.len());
        assert_eq!(out.fs, raw.fs);
    }

    #[test]
    fn impulse_peak_keeps_its_index() {
        let mut data = vec![0.0; 400];
        data[200] = 1.0;
        let raw = series(1000.0, data);
        let out = condition(&raw, &unit_gain_cfg()).unwrap();
        let peak = argmax(&out.data) as i64;
        assert!((peak - 200).abs() <= 1, "peak moved to {peak}");
    }

    #[test]
    fn converts_units_before_filtering() {
        let raw = series(1000.0, vec![2.0; 200]);
        let out = condition(&raw, &ConditionerConfig::default()).unwrap();
        // A constant trace passes the low-pass untouched apart from the
        // unit conversion, at the edges included: the filter state starts
        // at the step steady state, so no startup transient leaks in.
        for &v in &out.data {
            assert!((v - 2.0 * 9.81).abs() < 1e-6, "got {v}");
        }
    }

    #[test]
    fn dc_shift_passes_through_unchanged() {
        let base: Vec<f64> = (0..300)
            .map(|i| (i as f64 * 0.07).sin() * 3.0)
            .collect();
        let shifted: Vec<f64> = base.iter().map(|v| v + 50.0).collect();
        let cfg = unit_gain_cfg();
        let a = condition(&series(1000.0, base), &cfg).unwrap();
        let b = condition(&series(1000.0, shifted), &cfg).unwrap();
        for (x, y) in a.data.iter().zip(&b.data) {
            assert!((y - x - 50.0).abs() < 1e-6, "shift drifted: {x} vs {y}");
        }
    }

    #[test]
    fn attenuates_above_cutoff_and_passes_below() {
        use std::f64::consts::PI;
        let fs = 1000.0;
        let n = 2000;
        let slow: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / fs).sin())
            .collect();
        let fast: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 100.0 * i as f64 / fs).sin())
            .collect();
        let cfg = unit_gain_cfg();
        let slow_out = condition(&series(fs, slow), &cfg).unwrap();
        let fast_out = condition(&series(fs, fast), &cfg).unwrap();
        let amp = |d: &[f64]| d[500..1500].iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        assert!(amp(&slow_out.data) > 0.95);
        assert!(amp(&fast_out.data) < 0.05);
    }

    #[test]
    fn short_series_is_rejected() {
        let raw = series(1000.0, vec![1.0; PAD_LEN]);
        let err = condition(&raw, &ConditionerConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn offset_removal_zeroes_the_onset() {
        let raw = series(1000.0, (0..100).map(|i| 10.0 + i as f64).collect());
        let zeroed = remove_offset(&raw, 5).unwrap();
        assert_eq!(zeroed.data[5], 0.0);
        assert_eq!(zeroed.data[6], 1.0);
        assert_eq!(zeroed.len(), raw.len());
    }

    #[test]
    fn offset_removal_checks_bounds() {
        let raw = series(1000.0, vec![0.0; 10]);
        let err = remove_offset(&raw, 10).unwrap_err();
        assert!(matches!(err, AnalysisError::IndexOutOfRange { .. }));
    }
}
