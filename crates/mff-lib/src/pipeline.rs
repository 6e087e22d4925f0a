use crate::conditioner::{condition, remove_offset, ConditionerConfig};
use crate::error::AnalysisError;
use crate::landmarks::{
    onset_from_picks, twitch_windows_from_picks, validate_count, window_from_picks,
    LandmarkSource, SelectionTask,
};
use crate::metrics::{activation_capacity, mvif, rfd, ttp63, MuscleFunctionSummary};
use crate::signal::ForceSeries;
use log::debug;

/// Run the whole analysis on one raw trace: condition the signal, collect
/// the three landmark selections, and compute every metric.
///
/// Strictly sequential, single pass. Each stage hands an immutable value to
/// the next; any error aborts the run and nothing is assembled.
pub fn analyze(
    raw: &ForceSeries,
    participant: &str,
    source: &mut dyn LandmarkSource,
    cfg: &ConditionerConfig,
) -> Result<MuscleFunctionSummary, AnalysisError> {
    let conditioned = condition(raw, cfg)?;
    debug!(
        "conditioned {} samples at {} Hz (cutoff {} Hz)",
        conditioned.len(),
        conditioned.fs,
        cfg.cutoff_hz
    );

    let onset_picks = collect(source, SelectionTask::TtpOnset, &conditioned)?;
    let onset = onset_from_picks(&onset_picks, conditioned.len())?;
    let zeroed = remove_offset(&conditioned, onset)?;
    debug!("force onset at sample {onset}");

    let window_picks = collect(source, SelectionTask::MvifWindow, &zeroed)?;
    let window = window_from_picks(&window_picks, zeroed.len())?;
    let peak = mvif(&zeroed, &window)?;
    debug!("MViF {peak:.2} N over samples {}..{}", window.start, window.end);

    let ttp63_ms = ttp63(&zeroed, onset, peak)?;

    let rfd50 = rfd(&zeroed, onset, 50)?;
    let rfd100 = rfd(&zeroed, onset, 100)?;
    let rfd150 = rfd(&zeroed, onset, 150)?;
    let rfd200 = rfd(&zeroed, onset, 200)?;

    let twitch_picks = collect(source, SelectionTask::TwitchWindows, &zeroed)?;
    let windows = twitch_windows_from_picks(&twitch_picks, zeroed.len())?;
    let ac = activation_capacity(&zeroed, &windows)?;

    Ok(MuscleFunctionSummary {
        participant: participant.to_string(),
        mvif: peak,
        ttp63_ms,
        rfd50,
        rfd100,
        rfd150,
        rfd200,
        ac,
    })
}

/// Acquire picks for one task and re-validate the count before use.
fn collect(
    source: &mut dyn LandmarkSource,
    task: SelectionTask,
    series: &ForceSeries,
) -> Result<Vec<f64>, AnalysisError> {
    let picks = source.acquire(task, series)?;
    validate_count(task, &picks)?;
    Ok(picks)
}
