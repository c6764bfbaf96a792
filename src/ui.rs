// src/ui.rs
// HTTP surface for the simulator. None of this carries physics; it parses requests, runs the core
// on a blocking task, and shapes the output for a browser.
//   POST /api/simulate        batch run -> trajectory plot (base64 PNG) + animation positions
//   POST /api/report          batch run -> literal text report
//   GET  /api/session         interactive snapshot
//   POST /api/session/toggle  flip the simulate flag
//   POST /api/session/advance step the session a number of frames
//   POST /api/session/reset   back to the initial state
use crate::angles::normalize_all;
use crate::config::SimConfig;
use crate::driver::InteractiveDriver;
use crate::error::SimError;
use crate::logic::{run_batch, StepRecord};
use crate::math::joint_positions;
use crate::model::{LinkParameters, JOINTS};
use crate::report::write_text;
use actix_web::{error, web, HttpResponse, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Cursor};
use std::sync::{Mutex, MutexGuard};

/// Upper bound on batch steps accepted over HTTP.
pub const MAX_STEPS: usize = 100_000;

/// Upper bound on frames per advance request.
pub const MAX_FRAMES: usize = 10_000;

/// Shared application state: one interactive session, stepped under a lock.
pub struct AppState {
    pub session: Mutex<InteractiveDriver>,
}

impl AppState {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Ok(Self {
            session: Mutex::new(InteractiveDriver::new(config)?),
        })
    }
}

#[derive(Deserialize)]
pub struct SimParams {
    masses: String,         // Comma-separated masses
    lengths: String,        // Comma-separated lengths
    initial_angles: String, // Comma-separated initial angles in degrees
    dt: f64,                // Fixed timestep in seconds
    steps: usize,           // Number of steps to run
    #[serde(default)]
    gravity: Option<f64>, // Defaults to Earth gravity
}

impl SimParams {
    fn to_config(&self) -> Result<SimConfig, SimError> {
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(SimError::InvalidInput(format!(
                "steps must be between 1 and {MAX_STEPS}, got {}",
                self.steps
            )));
        }
        let defaults = SimConfig::default();
        Ok(SimConfig {
            lengths: parse_joint_list("lengths", &self.lengths)?,
            masses: parse_joint_list("masses", &self.masses)?,
            initial_angles_deg: parse_joint_list("initial_angles", &self.initial_angles)?,
            gravity: self.gravity.unwrap_or(defaults.gravity),
            dt: self.dt,
            steps: self.steps,
            ..defaults
        })
    }
}

/// Parses exactly one value per joint from a comma-separated list.
fn parse_joint_list(name: &str, raw: &str) -> Result<[f64; JOINTS], SimError> {
    let values = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| SimError::InvalidInput(format!("{name}: {e}")))?;
    <[f64; JOINTS]>::try_from(values).map_err(|v| {
        SimError::InvalidInput(format!("{name}: expected {JOINTS} values, got {}", v.len()))
    })
}

#[derive(Serialize)]
struct SimResponse {
    success: bool,                    // Whether the simulation succeeded
    error: Option<String>,            // Validation or solver failure
    trajectory_image: Option<String>, // Base64 PNG data URL, absent if drawing failed
    animation_data: AnimationData,    // Raw joint positions for frontend animation
    angles_degrees: Vec<[f64; JOINTS]>, // Reporting angles per step
}

#[derive(Serialize, Default)]
struct AnimationData {
    positions: Vec<Vec<f64>>, // Per step: [x1, y1, x2, y2, ...]
    n: usize,                 // Number of joints
    limit: f64,               // Plot boundary for consistent scaling
}

impl SimResponse {
    fn failed(err: &SimError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            trajectory_image: None,
            animation_data: AnimationData::default(),
            angles_degrees: Vec::new(),
        }
    }
}

type BatchOutput = (LinkParameters, Vec<StepRecord>);

/// Runs a batch for `config` off the async executor.
async fn run_config(config: SimConfig) -> Result<Result<BatchOutput, SimError>> {
    tokio::task::spawn_blocking(move || -> Result<BatchOutput, SimError> {
        let mut model = config.build_model()?;
        let integrator = config.batch_integrator()?;
        let records = run_batch(&mut model, &integrator, config.steps)?;
        Ok((*model.params(), records))
    })
    .await
    .map_err(error::ErrorInternalServerError)
}

pub async fn simulate_handler(params: web::Json<SimParams>) -> Result<HttpResponse> {
    let config = match params.to_config() {
        Ok(config) => config,
        Err(e) => return Ok(HttpResponse::Ok().json(SimResponse::failed(&e))),
    };
    let (link_params, records) = match run_config(config).await? {
        Ok(done) => done,
        Err(e) => {
            tracing::warn!("batch simulation failed: {e}");
            return Ok(HttpResponse::Ok().json(SimResponse::failed(&e)));
        }
    };

    // Convert angular states into Cartesian coordinates
    let positions: Vec<Vec<f64>> = records
        .iter()
        .map(|r| {
            joint_positions(&link_params, &r.state)
                .iter()
                .flat_map(|&(x, y)| [x, y])
                .collect()
        })
        .collect();
    let limit = link_params.total_length() * 1.1;

    let trajectory_image = match render_trajectory(&positions, limit) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("could not render trajectory plot: {e}");
            None
        }
    };

    Ok(HttpResponse::Ok().json(SimResponse {
        success: true,
        error: None,
        trajectory_image,
        animation_data: AnimationData {
            positions,
            n: JOINTS,
            limit,
        },
        angles_degrees: records.iter().map(|r| normalize_all(&r.state.angles)).collect(),
    }))
}

pub async fn report_handler(params: web::Json<SimParams>) -> Result<HttpResponse> {
    let outcome = match params.to_config() {
        Ok(config) => run_config(config).await?,
        Err(e) => Err(e),
    };
    match outcome {
        Ok((_, records)) => {
            let mut body = Vec::new();
            write_text(&mut body, &records).map_err(error::ErrorInternalServerError)?;
            Ok(HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(body))
        }
        Err(e) => Ok(HttpResponse::BadRequest().body(e.to_string())),
    }
}

/// Draws every joint's path and returns it as a PNG data URL.
fn render_trajectory(positions: &[Vec<f64>], limit: f64) -> io::Result<String> {
    // Image width and height in pixels
    const W: u32 = 500;
    const H: u32 = 500;

    // Allocate RGB pixel buffer (3 bytes per pixel)
    let mut pixel_buffer = vec![0u8; (W * H * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixel_buffer, (W, H)).into_drawing_area();
        root.fill(&WHITE).map_err(io::Error::other)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Joint trajectories", ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(-limit..limit, -limit..limit)
            .map_err(io::Error::other)?;
        chart.configure_mesh().draw().map_err(io::Error::other)?;

        let colors: [ShapeStyle; JOINTS] = [
            BLUE.mix(0.75).stroke_width(1),
            RED.mix(0.75).stroke_width(1),
            GREEN.mix(0.75).stroke_width(1),
            MAGENTA.mix(0.75).stroke_width(1),
        ];

        for (k, color) in colors.iter().enumerate() {
            chart
                .draw_series(LineSeries::new(
                    positions.iter().map(|p| (p[2 * k], p[2 * k + 1])),
                    *color,
                ))
                .map_err(io::Error::other)?;
        }

        root.present().map_err(io::Error::other)?;
    }

    let img_buffer = image::ImageBuffer::from_raw(W, H, pixel_buffer)
        .ok_or_else(|| io::Error::other("Failed to create image buffer"))?;
    let dynamic_image = image::DynamicImage::ImageRgb8(img_buffer);

    // Encode raw RGB pixels into PNG format in memory
    let mut png_buffer = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut png_buffer, ImageFormat::Png)
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_buffer.into_inner())
    ))
}

fn lock_session(state: &AppState) -> Result<MutexGuard<'_, InteractiveDriver>> {
    state
        .session
        .lock()
        .map_err(|_| error::ErrorInternalServerError("session lock poisoned"))
}

#[derive(Deserialize)]
pub struct AdvanceParams {
    frames: usize,
}

#[derive(Serialize)]
struct SessionError {
    error: String,
}

pub async fn session_handler(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock_session(&state)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn toggle_handler(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock_session(&state)?;
    session.toggle();
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn advance_handler(
    state: web::Data<AppState>,
    params: web::Json<AdvanceParams>,
) -> Result<HttpResponse> {
    if params.frames > MAX_FRAMES {
        return Ok(HttpResponse::BadRequest().json(SessionError {
            error: format!("frames must be at most {MAX_FRAMES}"),
        }));
    }
    let mut session = lock_session(&state)?;
    match session.advance(params.frames) {
        Ok(_) => Ok(HttpResponse::Ok().json(session.snapshot())),
        Err(e) => {
            tracing::warn!("session step failed: {e}");
            Ok(HttpResponse::UnprocessableEntity().json(SessionError {
                error: e.to_string(),
            }))
        }
    }
}

pub async fn reset_handler(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock_session(&state)?;
    session.reset().map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Registers the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/simulate", web::post().to(simulate_handler))
            .route("/report", web::post().to(report_handler))
            .route("/session", web::get().to(session_handler))
            .route("/session/toggle", web::post().to(toggle_handler))
            .route("/session/advance", web::post().to(advance_handler))
            .route("/session/reset", web::post().to(reset_handler)),
    );
}
