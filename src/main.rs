use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hflow_timeline::log::LifecycleEvent;
use hflow_timeline::render::RenderOptions;
use hflow_timeline::{Result, TimelineConfig, diagnostics, log, model, render};

#[derive(Parser)]
#[command(name = "hflow-timeline")]
#[command(about = "HyperFlow execution timeline visualizer", long_about = None)]
struct Cli {
    /// Logging filter (trace, debug, info, warn, error or an EnvFilter directive).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the execution timeline of one log directory and write an HTML report.
    Report {
        /// Directory with job_descriptions.jsonl and metrics.jsonl.
        #[arg(short, long)]
        source: PathBuf,

        /// Output file. Defaults to <workflow>-<size>-<version>.html.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        /// Also write the reconstructed report data as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Draw the number of active jobs under the Gantt chart.
        #[arg(short = 'a', long)]
        show_active_jobs: bool,

        /// Label lanes with full node names.
        #[arg(short = 'f', long)]
        full_node_names: bool,

        /// Event counted as a job becoming active.
        #[arg(long, default_value = LifecycleEvent::JobStart.as_str())]
        event_start: String,

        /// Event counted as a job becoming inactive.
        #[arg(long, default_value = LifecycleEvent::JobEnd.as_str())]
        event_end: String,

        /// Fail on event values other than the four lifecycle transitions.
        #[arg(long)]
        strict_events: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(&cli.log_level)?;

    match cli.cmd {
        Commands::Report {
            source,
            out,
            json,
            show_active_jobs,
            full_node_names,
            event_start,
            event_end,
            strict_events,
        } => {
            let cfg = TimelineConfig {
                occupancy_start: event_start,
                occupancy_end: event_end,
                strict_events,
                full_node_names,
            };

            // 1) Parse logs.
            let parsed = log::parse_log_dir(&source)?;

            // 2) Reconstruct.
            let data = model::build_report_data(&parsed, &cfg)
                .with_context(|| format!("reconstruct timeline from {}", source.display()))?;
            tracing::info!(
                jobs = data.totals.jobs,
                lanes = data.totals.lanes,
                max_time = data.max_time,
                "reconstructed {}",
                data.workflow.name
            );

            if let Some(path) = json {
                std::fs::write(&path, serde_json::to_string_pretty(&data)?)
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Report data saved to {}", path.display());
            }

            // 3) Render HTML.
            let out = out.unwrap_or_else(|| {
                let w = &data.workflow;
                PathBuf::from(format!("{}-{}-{}.html", w.name, w.size, w.version))
            });
            let html = render::render_html_report(&data, RenderOptions { show_active_jobs })?;
            std::fs::write(&out, html).with_context(|| format!("write {}", out.display()))?;
            println!("Chart saved to {}", out.display());
        }
    }

    Ok(())
}
