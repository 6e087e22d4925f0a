use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use eframe::{egui, egui::ViewportBuilder};
use egui_plot::{Line, Plot, VLine};
use mff_lib::conditioner::ConditionerConfig;
use mff_lib::error::AnalysisError;
use mff_lib::io::{mat as mat_io, report};
use mff_lib::landmarks::{LandmarkSource, SelectionTask};
use mff_lib::metrics::MuscleFunctionSummary;
use mff_lib::pipeline::analyze;
use mff_lib::plot::{decimate_points, series_points};
use mff_lib::signal::ForceSeries;
use rfd::FileDialog;
use std::env;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([960.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Muscle Function from Force",
        native_options,
        Box::new(|_cc| Ok(Box::<MffApp>::default())),
    )
}

/// Messages from the analysis worker to the UI thread.
enum WorkerEvent {
    /// The pipeline is blocked on a landmark selection.
    Select {
        task: SelectionTask,
        points: Vec<[f64; 2]>,
        reply: Sender<Result<Vec<f64>, AnalysisError>>,
    },
    Finished(Box<MuscleFunctionSummary>, PathBuf),
    Failed(String),
}

/// `LandmarkSource` that hands each task to the UI thread and blocks until
/// the operator commits or aborts. No timeout: the operator may zoom and
/// pan as long as they need.
struct ChannelSource {
    events: Sender<WorkerEvent>,
}

impl LandmarkSource for ChannelSource {
    fn acquire(
        &mut self,
        task: SelectionTask,
        series: &ForceSeries,
    ) -> Result<Vec<f64>, AnalysisError> {
        let aborted = || AnalysisError::SelectionAborted { task: task.label() };
        let (reply_tx, reply_rx) = bounded(1);
        let points = decimate_points(&series_points(series), 8192);
        self.events
            .send(WorkerEvent::Select {
                task,
                points,
                reply: reply_tx,
            })
            .map_err(|_| aborted())?;
        reply_rx.recv().unwrap_or_else(|_| Err(aborted()))
    }
}

fn start_run(
    path: PathBuf,
    cfg: ConditionerConfig,
    events: Sender<WorkerEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let outcome = run_analysis(&path, cfg, &events);
        let message = match outcome {
            Ok((summary, csv_path)) => WorkerEvent::Finished(Box::new(summary), csv_path),
            Err(err) => WorkerEvent::Failed(format!("{err:#}")),
        };
        let _ = events.send(message);
    })
}

fn run_analysis(
    path: &Path,
    cfg: ConditionerConfig,
    events: &Sender<WorkerEvent>,
) -> anyhow::Result<(MuscleFunctionSummary, PathBuf)> {
    let raw = mat_io::load_force_mat(path)?;
    let participant = report::participant_from_path(path);
    let mut source = ChannelSource {
        events: events.clone(),
    };
    let summary = analyze(&raw, &participant, &mut source, &cfg)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let csv_path = report::write_results(dir, &summary)?;
    Ok((summary, csv_path))
}

/// One in-progress landmark selection owned by the UI.
struct ActiveSelection {
    task: SelectionTask,
    points: Vec<[f64; 2]>,
    picks: Vec<f64>,
    reply: Sender<Result<Vec<f64>, AnalysisError>>,
}

struct MffApp {
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    worker: Option<JoinHandle<()>>,
    selection: Option<ActiveSelection>,
    result: Option<(MuscleFunctionSummary, PathBuf)>,
    cutoff_hz: f64,
    kgf_to_newtons: f64,
    status: String,
}

impl Default for MffApp {
    fn default() -> Self {
        let (events_tx, events_rx) = unbounded();
        let defaults = ConditionerConfig::default();
        Self {
            events_tx,
            events_rx,
            worker: None,
            selection: None,
            result: None,
            cutoff_hz: defaults.cutoff_hz,
            kgf_to_newtons: defaults.kgf_to_newtons,
            status: "No recording loaded".into(),
        }
    }
}

impl MffApp {
    fn open_recording(&mut self) {
        let mut dialog = FileDialog::new().add_filter("MATLAB files", &["mat"]);
        if let Some(dir) = env::var_os("MFF_INITIAL_DIR") {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };
        let cfg = ConditionerConfig {
            kgf_to_newtons: self.kgf_to_newtons,
            cutoff_hz: self.cutoff_hz,
        };
        self.result = None;
        self.status = format!("Analyzing {}", path.display());
        self.worker = Some(start_run(path, cfg, self.events_tx.clone()));
    }

    fn drain_worker_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                WorkerEvent::Select {
                    task,
                    points,
                    reply,
                } => {
                    self.selection = Some(ActiveSelection {
                        task,
                        points,
                        picks: Vec::new(),
                        reply,
                    });
                    self.status = task.title().to_string();
                }
                WorkerEvent::Finished(summary, csv_path) => {
                    self.status = format!("Results written to {}", csv_path.display());
                    self.result = Some((*summary, csv_path));
                    self.join_worker();
                }
                WorkerEvent::Failed(message) => {
                    self.status = format!("Run aborted: {message}");
                    self.selection = None;
                    self.join_worker();
                }
            }
        }
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn show_selection(&mut self, ui: &mut egui::Ui) {
        let Some(sel) = &mut self.selection else {
            return;
        };
        ui.heading(sel.task.title());
        ui.label("Click adds a point, right-click removes the last one. Scroll to zoom, drag to pan.");

        let (clicked, removed, coordinate) = Plot::new("force_trace")
            .height(440.0)
            .x_axis_label("Time (Samples)")
            .y_axis_label("Force (N)")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(sel.points.clone()).name("force"));
                for &x in &sel.picks {
                    plot_ui.vline(
                        VLine::new(x).stroke(egui::Stroke::new(1.0, egui::Color32::RED)),
                    );
                }
                (
                    plot_ui.response().clicked(),
                    plot_ui.response().secondary_clicked(),
                    plot_ui.pointer_coordinate(),
                )
            })
            .inner;
        if clicked {
            if let Some(pos) = coordinate {
                sel.picks.push(pos.x);
            }
        }
        if removed {
            sel.picks.pop();
        }

        let mut committed = false;
        let mut aborted = false;
        ui.horizontal(|ui| {
            let expected = sel.task.clicks();
            committed = ui
                .button(format!("Done ({}/{})", sel.picks.len(), expected))
                .clicked();
            aborted = ui.button("Abort run").clicked();
        });

        if committed {
            if let Some(sel) = self.selection.take() {
                let _ = sel.reply.send(Ok(sel.picks));
                self.status = "Computing…".into();
            }
        } else if aborted {
            if let Some(sel) = self.selection.take() {
                let task = sel.task.label();
                let _ = sel
                    .reply
                    .send(Err(AnalysisError::SelectionAborted { task }));
            }
        }
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        let Some((summary, csv_path)) = &self.result else {
            return;
        };
        ui.heading(format!("Results — {}", summary.participant));
        egui::Grid::new("results").striped(true).show(ui, |ui| {
            for (name, value) in [
                ("MViF (N)", summary.mvif),
                ("TTP63 (mSec)", summary.ttp63_ms),
                ("RFD50 (N/Sec)", summary.rfd50),
                ("RFD100 (N/Sec)", summary.rfd100),
                ("RFD150 (N/Sec)", summary.rfd150),
                ("RFD200 (N/Sec)", summary.rfd200),
                ("AC (%)", summary.ac),
            ] {
                ui.label(name);
                ui.label(format!("{value:.2}"));
                ui.end_row();
            }
        });
        if ui.button("Open results file").clicked() {
            open_in_default_app(csv_path);
        }
    }
}

impl eframe::App for MffApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_worker_events();
        if self.worker.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Muscle Function from Force");
                let idle = self.worker.is_none();
                if ui
                    .add_enabled(idle, egui::Button::new("Open .mat recording"))
                    .clicked()
                {
                    self.open_recording();
                }
                ui.add_enabled(
                    self.worker.is_none(),
                    egui::Slider::new(&mut self.cutoff_hz, 5.0..=100.0).text("Cutoff (Hz)"),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.selection.is_some() {
                self.show_selection(ui);
            } else if self.result.is_some() {
                self.show_result(ui);
            } else if self.worker.is_some() {
                ui.centered_and_justified(|ui| {
                    ui.label("Conditioning the signal…");
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a .mat recording to start an analysis.");
                });
            }
        });

        egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
            ui.label(&self.status);
        });
    }
}

fn open_in_default_app(path: &Path) {
    #[cfg(target_os = "linux")]
    let command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(path);
        c
    };
    #[cfg(target_os = "macos")]
    let command = {
        let mut c = std::process::Command::new("open");
        c.arg(path);
        c
    };
    #[cfg(target_os = "windows")]
    let command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };
    let mut command = command;
    if let Err(err) = command.spawn() {
        log::warn!("could not open {}: {err}", path.display());
    }
}
