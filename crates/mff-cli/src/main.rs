use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use mff_lib::{
    conditioner::{condition, ConditionerConfig},
    io::{mat as mat_io, report, text as text_io},
    landmarks::ScriptedSource,
    pipeline::analyze,
    plot::{decimate_points, series_points},
    signal::ForceSeries,
};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "mff",
    version,
    about = "Muscle function metrics from a recorded force trace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input selection shared by the subcommands: a MAT container, or a
/// newline-delimited text series with an explicit sampling rate.
#[derive(Args)]
struct InputArgs {
    /// MAT file holding `data` (force, kgf) and `samplerate`
    #[arg(long)]
    input: Option<PathBuf>,
    /// Newline-delimited force samples (kgf)
    #[arg(long, conflicts_with = "input")]
    text_input: Option<PathBuf>,
    /// Sampling rate for --text-input (Hz)
    #[arg(long, default_value_t = 1000.0)]
    fs: f64,
}

impl InputArgs {
    fn load(&self) -> Result<(ForceSeries, PathBuf)> {
        if let Some(path) = &self.input {
            Ok((mat_io::load_force_mat(path)?, path.clone()))
        } else if let Some(path) = &self.text_input {
            let data = text_io::read_force_samples(path)?;
            Ok((
                ForceSeries {
                    fs: self.fs,
                    data,
                },
                path.clone(),
            ))
        } else {
            Err(anyhow!("either --input or --text-input is required"))
        }
    }
}

#[derive(Args)]
struct ConditionerArgs {
    /// Low-pass cutoff (Hz)
    #[arg(long, default_value_t = 40.0)]
    cutoff_hz: f64,
    /// Raw-unit multiplier (kilograms-force to newtons)
    #[arg(long, default_value_t = 9.81)]
    kgf_to_newtons: f64,
}

impl ConditionerArgs {
    fn config(&self) -> ConditionerConfig {
        ConditionerConfig {
            kgf_to_newtons: self.kgf_to_newtons,
            cutoff_hz: self.cutoff_hz,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis with scripted landmark picks
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        conditioner: ConditionerArgs,
        /// Force-onset pick (sample position)
        #[arg(long)]
        ttp_start: f64,
        /// MViF window picks, e.g. --mvif-window 1500,2500
        #[arg(long, value_delimiter = ',')]
        mvif_window: Vec<f64>,
        /// Twitch-window picks (4 points), e.g. --ac-points 100,200,700,800
        #[arg(long, value_delimiter = ',')]
        ac_points: Vec<f64>,
        /// Participant identifier (default: input file stem)
        #[arg(long)]
        participant: Option<String>,
        /// Directory for the results CSV (default: the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Print the JSON summary without writing the results CSV
        #[arg(long)]
        no_report: bool,
    },
    /// Render the conditioned trace to a PNG
    Plot {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        conditioner: ConditionerArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            conditioner,
            ttp_start,
            mvif_window,
            ac_points,
            participant,
            out_dir,
            no_report,
        } => cmd_analyze(
            input,
            conditioner,
            ttp_start,
            mvif_window,
            ac_points,
            participant,
            out_dir,
            no_report,
        ),
        Commands::Plot {
            input,
            conditioner,
            out,
        } => cmd_plot(input, conditioner, &out),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    input: InputArgs,
    conditioner: ConditionerArgs,
    ttp_start: f64,
    mvif_window: Vec<f64>,
    ac_points: Vec<f64>,
    participant: Option<String>,
    out_dir: Option<PathBuf>,
    no_report: bool,
) -> Result<()> {
    let (raw, source_path) = input.load()?;
    let participant =
        participant.unwrap_or_else(|| report::participant_from_path(&source_path));
    let mut picks = ScriptedSource {
        ttp_onset: vec![ttp_start],
        mvif_window,
        twitch_windows: ac_points,
    };
    let summary = analyze(&raw, &participant, &mut picks, &conditioner.config())?;

    if !no_report {
        let dir = match out_dir {
            Some(dir) => dir,
            None => source_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let written = report::write_results(&dir, &summary)?;
        eprintln!("results written to {}", written.display());
    }
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_plot(input: InputArgs, conditioner: ConditionerArgs, out: &Path) -> Result<()> {
    let (raw, _) = input.load()?;
    let conditioned = condition(&raw, &conditioner.config())?;
    let points = decimate_points(&series_points(&conditioned), 4096);

    let backend = BitMapBackend::new(out, (1024, 520));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let x_max = conditioned.len().saturating_sub(1) as f64;
    let y_min = points.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let y_max = points
        .iter()
        .map(|p| p[1])
        .fold(f64::NEG_INFINITY, f64::max);
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption("Conditioned force trace", ("sans-serif", 24))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..x_max.max(1.0), (y_min - 1.0)..(y_max + 1.0))?;
    chart
        .configure_mesh()
        .x_desc("Time (Samples)")
        .y_desc("Force (N)")
        .draw()?;
    chart.draw_series(LineSeries::new(
        points.iter().map(|p| (p[0], p[1])),
        &RGBColor(0x1f, 0x77, 0xb4),
    ))?;
    root.present()?;
    Ok(())
}
