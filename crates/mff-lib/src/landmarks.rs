use crate::error::AnalysisError;
use crate::signal::ForceSeries;
use serde::{Deserialize, Serialize};

/// One human selection task on the plotted trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTask {
    /// Two points bracketing the maximal-effort plateau.
    MvifWindow,
    /// Single point at the force onset.
    TtpOnset,
    /// Four points around the superimposed and resting twitches.
    TwitchWindows,
}

impl SelectionTask {
    pub fn clicks(&self) -> usize {
        match self {
            SelectionTask::MvifWindow => 2,
            SelectionTask::TtpOnset => 1,
            SelectionTask::TwitchWindows => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SelectionTask::MvifWindow => "MViF window",
            SelectionTask::TtpOnset => "force onset",
            SelectionTask::TwitchWindows => "twitch windows",
        }
    }

    /// Operator-facing prompt shown above the plot.
    pub fn title(&self) -> &'static str {
        match self {
            SelectionTask::MvifWindow => "Select start/end area for MVC then press done",
            SelectionTask::TtpOnset => "Select the start for Time to Peak then press done",
            SelectionTask::TwitchWindows => {
                "Select 4 points, before/after superimposed and resting twitch then press done"
            }
        }
    }
}

/// Where landmark picks come from.
///
/// The interactive front-end blocks in `acquire` until the operator commits
/// or aborts; tests and the CLI substitute a scripted source. Picks are raw
/// x-axis positions in sample units; normalization and count validation
/// stay with the consumer.
pub trait LandmarkSource {
    fn acquire(
        &mut self,
        task: SelectionTask,
        series: &ForceSeries,
    ) -> Result<Vec<f64>, AnalysisError>;
}

/// Non-interactive `LandmarkSource` with pre-baked picks per task.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pub mvif_window: Vec<f64>,
    pub ttp_onset: Vec<f64>,
    pub twitch_windows: Vec<f64>,
}

impl LandmarkSource for ScriptedSource {
    fn acquire(
        &mut self,
        task: SelectionTask,
        _series: &ForceSeries,
    ) -> Result<Vec<f64>, AnalysisError> {
        Ok(match task {
            SelectionTask::MvifWindow => self.mvif_window.clone(),
            SelectionTask::TtpOnset => self.ttp_onset.clone(),
            SelectionTask::TwitchWindows => self.twitch_windows.clone(),
        })
    }
}

/// Half-open `[start, end)` sample window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Twitch/rest window pair for activation capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchWindows {
    pub twitch: Window,
    pub rest: Window,
}

/// Check the pick count against what the task demands.
pub fn validate_count(task: SelectionTask, picks: &[f64]) -> Result<(), AnalysisError> {
    if picks.len() != task.clicks() {
        return Err(AnalysisError::WrongSelectionCount {
            task: task.label(),
            expected: task.clicks(),
            actual: picks.len(),
        });
    }
    Ok(())
}

fn pick_to_index(pick: f64, n_samples: usize) -> Result<usize, AnalysisError> {
    let rounded = pick.round();
    if rounded < 0.0 || rounded as usize >= n_samples {
        return Err(AnalysisError::IndexOutOfRange {
            index: rounded as i64,
            len: n_samples,
        });
    }
    Ok(rounded as usize)
}

/// Two picks, in either order, into a `[start, end)` window.
pub fn window_from_picks(picks: &[f64], n_samples: usize) -> Result<Window, AnalysisError> {
    validate_count(SelectionTask::MvifWindow, picks)?;
    let a = pick_to_index(picks[0], n_samples)?;
    let b = pick_to_index(picks[1], n_samples)?;
    Ok(Window {
        start: a.min(b),
        end: a.max(b),
    })
}

/// Single onset pick.
pub fn onset_from_picks(picks: &[f64], n_samples: usize) -> Result<usize, AnalysisError> {
    validate_count(SelectionTask::TtpOnset, picks)?;
    pick_to_index(picks[0], n_samples)
}

/// Four picks, sorted ascending, split into twitch then rest windows.
///
/// The split is by position on the time axis, not click order: the earlier
/// pair is taken as the superimposed twitch and the later pair as the
/// resting twitch, so only the clicked areas matter.
pub fn twitch_windows_from_picks(
    picks: &[f64],
    n_samples: usize,
) -> Result<TwitchWindows, AnalysisError> {
    validate_count(SelectionTask::TwitchWindows, picks)?;
    let mut idx = [0usize; 4];
    for (slot, &pick) in idx.iter_mut().zip(picks) {
        *slot = pick_to_index(pick, n_samples)?;
    }
    idx.sort_unstable();
    Ok(TwitchWindows {
        twitch: Window {
            start: idx[0],
            end: idx[1],
        },
        rest: Window {
            start: idx[2],
            end: idx[3],
        },
    })
}
