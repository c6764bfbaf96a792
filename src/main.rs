// src/main.rs
// Command-line entry point: `serve` runs the HTTP surface, `batch` writes a trajectory report.

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quad_pendulum::config::SimConfig;
use quad_pendulum::report::{write_report, ReportFormat};
use quad_pendulum::run_batch;
use quad_pendulum::ui::{configure, AppState};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quad-pendulum", about = "Four-link pendulum simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web interface and JSON API.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
        /// Directory with the browser front end.
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,
        /// JSON configuration for the interactive session.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a fixed-step batch and write the per-step joint angles.
    Batch {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long)]
        dt: Option<f64>,
        #[arg(long, default_value = "results.txt")]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

fn load_config(path: Option<&Path>, fallback: SimConfig) -> Result<SimConfig> {
    match path {
        Some(p) => SimConfig::from_path(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(fallback),
    }
}

fn batch(config: &SimConfig, output: &Path, format: ReportFormat) -> Result<()> {
    let mut model = config.build_model()?;
    let integrator = config.batch_integrator()?;
    tracing::info!(steps = config.steps, dt = config.dt, "running batch simulation");
    let records = run_batch(&mut model, &integrator, config.steps)?;

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    write_report(&mut BufWriter::new(file), &records, format)?;
    tracing::info!(records = records.len(), path = %output.display(), "report written");
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Serve {
            bind,
            static_dir,
            config,
        } => {
            let config = load_config(config.as_deref(), SimConfig::interactive())?;
            let state = web::Data::new(AppState::new(config)?);
            tracing::info!("listening on http://{bind}");
            HttpServer::new(move || {
                App::new()
                    .app_data(state.clone())
                    .configure(configure)
                    .service(Files::new("/", static_dir.clone()).index_file("index.html"))
            })
            .bind(&bind)
            .with_context(|| format!("binding {bind}"))?
            .run()
            .await?;
        }
        Command::Batch {
            config,
            steps,
            dt,
            output,
            format,
        } => {
            let mut config = load_config(config.as_deref(), SimConfig::default())?;
            if let Some(steps) = steps {
                config.steps = steps;
            }
            if let Some(dt) = dt {
                config.dt = dt;
            }
            if let Err(e) = batch(&config, &output, format) {
                tracing::error!("batch run failed: {e:#}");
                return Err(e);
            }
        }
    }
    Ok(())
}
