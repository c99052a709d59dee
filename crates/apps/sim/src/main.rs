//! Headless contour terrain session
//!
//! Runs a local peer and a number of scripted bot peers through the full
//! pipeline over an in-memory room, then prints the local peer's view of the
//! terrain as ASCII contours.

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use contour_core::{PointerInput, Viewport};
use contour_network::{LoopbackHub, LoopbackTransport};
use contour_session::{FrameInputs, SessionConfig, SessionController};
use contour_terrain::DisplayMode;
use glam::Vec2;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "contour-sim")]
#[command(about = "Headless multi-peer contour terrain simulation", long_about = None)]
struct Args {
    /// Session config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of scripted remote peers
    #[arg(long, default_value = "3")]
    bots: usize,

    /// Frames to simulate
    #[arg(long, default_value = "240")]
    frames: usize,

    /// Simulated frame rate
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Sleep between frames to run at wall-clock speed
    #[arg(long)]
    realtime: bool,

    /// Frame at which the last bot leaves (never when unset)
    #[arg(long)]
    leave_at: Option<usize>,

    /// Light or dark display mode (overrides config)
    #[arg(long)]
    display_mode: Option<DisplayMode>,

    /// ASCII output width in characters
    #[arg(long, default_value = "72")]
    width: usize,

    /// ASCII output height in characters
    #[arg(long, default_value = "32")]
    height: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Virtual viewport the simulated pointers move over
const VIEWPORT: Viewport = Viewport {
    width: 800.0,
    height: 600.0,
};

/// Lissajous pointer path in viewport fractions
#[derive(Debug, Clone, Copy)]
struct PointerPath {
    freq: Vec2,
    phase: f32,
}

impl PointerPath {
    fn for_index(index: usize) -> Self {
        let i = index as f32;
        Self {
            freq: Vec2::new(0.35 + 0.13 * i, 0.5 + 0.07 * i),
            phase: i * 1.7,
        }
    }

    /// Pixel position at time `t`, kept in the part of the view that
    /// looks down on the terrain
    fn pixel(&self, t: f32) -> Vec2 {
        let fraction = Vec2::new(
            0.5 + 0.3 * (self.freq.x * t + self.phase).sin(),
            0.65 + 0.25 * (self.freq.y * t).sin(),
        );
        fraction * Vec2::new(VIEWPORT.width, VIEWPORT.height)
    }
}

struct Bot {
    controller: SessionController<LoopbackTransport>,
    path: PointerPath,
    active: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("contour_sim={log_level},contour_session={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Contour Sim v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        SessionConfig::load(args.config.as_deref()).context("Failed to load session config")?;
    if let Some(mode) = args.display_mode {
        config.display_mode = mode;
    }
    let fps = args.fps.max(1);
    let dt = 1.0 / fps as f32;

    let hub = LoopbackHub::new();
    let mut local = SessionController::new(config.clone(), hub.connect())
        .context("Failed to create local session")?;
    if let Err(e) = local.join().await {
        tracing::warn!("Local peer could not join, continuing offline: {}", e);
    }

    let mut bots = Vec::with_capacity(args.bots);
    for index in 0..args.bots {
        let controller = SessionController::new(config.clone(), hub.connect())
            .with_context(|| format!("Failed to create bot {index}"))?;
        bots.push(Bot {
            controller,
            path: PointerPath::for_index(index + 1),
            active: true,
        });
    }

    let joins = futures::future::join_all(bots.iter_mut().map(|bot| bot.controller.join())).await;
    for (index, result) in joins.into_iter().enumerate() {
        if let Err(e) = result {
            tracing::warn!("Bot {} failed to join: {}", index, e);
        }
    }

    tracing::info!(
        "Simulating {} frames at {} fps with {} bot(s) in room '{}'",
        args.frames,
        fps,
        args.bots,
        config.room
    );

    let local_path = PointerPath::for_index(0);
    let mut ticker = tokio::time::interval(Duration::from_secs_f32(dt));
    let mut last = None;

    for frame in 0..args.frames {
        if args.realtime {
            ticker.tick().await;
        }
        let t = frame as f32 * dt;

        if args.leave_at == Some(frame) {
            if let Some(bot) = bots.iter_mut().rev().find(|bot| bot.active) {
                bot.active = false;
                bot.controller
                    .close()
                    .await
                    .context("Failed to close bot session")?;
            }
        }

        for bot in bots.iter_mut().filter(|bot| bot.active) {
            let pixel = bot.path.pixel(t);
            let inputs = FrameInputs::idle(VIEWPORT, config.display_mode)
                .with_pointer(PointerInput::Moved { x: pixel.x, y: pixel.y });
            bot.controller.update(dt, &inputs);
        }

        let pixel = local_path.pixel(t);
        let inputs = FrameInputs::idle(VIEWPORT, config.display_mode)
            .with_pointer(PointerInput::Moved { x: pixel.x, y: pixel.y });
        let output = local.update(dt, &inputs);

        for event in &output.events {
            tracing::debug!(frame, ?event, "session event");
        }
        last = Some(output);
    }

    if let Some(output) = last {
        let lines = render::render_frame(
            &output,
            local.model(),
            &local.config().contour,
            args.width,
            args.height,
        );
        for line in lines {
            println!("{line}");
        }
        print!("{}", render::summary(&output));

        let mesh = local
            .config()
            .grid()
            .evaluate(local.model(), output.time, &output.influence);
        let (low, high) = mesh
            .elevations
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &e| {
                (lo.min(e), hi.max(e))
            });
        println!(
            "mesh: {} vertices, {} triangles, elevation {:.2}..{:.2}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            low,
            high
        );
    }

    let info = local.bridge().info();
    println!(
        "messages: sent={} received={} dropped={} send_failures={}",
        info.messages_sent, info.messages_received, info.messages_dropped, info.send_failures
    );

    for bot in bots.iter_mut().filter(|bot| bot.active) {
        bot.controller
            .close()
            .await
            .context("Failed to close bot session")?;
    }
    local.close().await.context("Failed to close local session")?;

    Ok(())
}
