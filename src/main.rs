// src/main.rs
mod input;
mod term;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use input::{collect_input_nonblocking, Action};
use log::{info, LevelFilter};
use rdpaint::config::{load_settings, save_settings_atomic, settings_path, Settings};
use rdpaint::{PointerState, Preset, SharedPointer, Simulation, SimulationParameters};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use term::{draw_hud, surface_size, HalfBlockRenderer, TermGuard};

const HUD_ROWS: u16 = 2;

#[derive(Parser, Debug, Clone)]
#[command(name = "rdpaint")]
#[command(about = "Paint live reaction-diffusion patterns in the terminal", long_about = None)]
struct Args {
    /// Diffusion rate for A (as configured; drives B's diffusion)
    #[arg(long)]
    da: Option<f32>,

    /// Diffusion rate for B (as configured; drives A's diffusion)
    #[arg(long)]
    db: Option<f32>,

    /// Feed rate
    #[arg(long)]
    feed: Option<f32>,

    /// Kill rate
    #[arg(long)]
    kill: Option<f32>,

    /// Brush radius as a fraction of the shorter surface side
    #[arg(long)]
    brush: Option<f32>,

    /// Simulation steps per displayed frame
    #[arg(long)]
    speed: Option<usize>,

    /// Background (low intensity) color, #RRGGBB
    #[arg(long)]
    background: Option<String>,

    /// Pattern (high intensity) color, #RRGGBB
    #[arg(long)]
    pattern: Option<String>,

    /// Start from the wide-brush, faster touch profile
    #[arg(long, default_value_t = false)]
    touch: bool,

    /// FPS cap
    #[arg(long)]
    fps: Option<u32>,

    /// Ignore the saved settings file
    #[arg(long, default_value_t = false)]
    no_settings: bool,

    /// Persist the effective settings for the next run
    #[arg(long, default_value_t = false)]
    save_settings: bool,

    /// Run without a terminal and write the last frame as PNG
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Headless surface width in pixels
    #[arg(long, default_value_t = 256)]
    width: usize,

    /// Headless surface height in pixels
    #[arg(long, default_value_t = 256)]
    height: usize,

    /// Headless frame count
    #[arg(long, default_value_t = 200)]
    frames: usize,

    /// Headless: hold a B press at the centre for the first N frames
    #[arg(long, default_value_t = 0)]
    press_frames: usize,

    /// Headless output image
    #[arg(long, default_value = "rdpaint.png")]
    output: PathBuf,

    /// Write logs here (interactive mode discards them otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp_millis();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // stderr would tear the alternate screen
        None if !headless => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }
    builder.init();
    Ok(())
}

/// Saved settings, then the touch profile, then explicit flags.
fn effective_settings(args: &Args, saved: Settings) -> Settings {
    let mut s = saved;
    if args.touch {
        let touch = Preset::Touch.params();
        s.params.brush_radius = touch.brush_radius;
        s.params.steps_per_frame = touch.steps_per_frame;
    }
    let p: &mut SimulationParameters = &mut s.params;
    if let Some(v) = args.da {
        p.diffusion_rate_a = v;
    }
    if let Some(v) = args.db {
        p.diffusion_rate_b = v;
    }
    if let Some(v) = args.feed {
        p.feed_rate = v;
    }
    if let Some(v) = args.kill {
        p.kill_rate = v;
    }
    if let Some(v) = args.brush {
        p.brush_radius = v;
    }
    if let Some(v) = args.speed {
        p.steps_per_frame = v;
    }
    if let Some(v) = &args.background {
        s.background_hex = v.clone();
    }
    if let Some(v) = &args.pattern {
        s.pattern_hex = v.clone();
    }
    if let Some(v) = args.fps {
        s.fps_cap = v;
    }
    s
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.headless)?;

    let path = settings_path()?;
    let saved = if args.no_settings {
        Settings::default()
    } else {
        load_settings(&path)
    };
    let settings = effective_settings(&args, saved);
    // reject bad colors before touching the terminal
    settings.colors()?;

    if args.save_settings {
        save_settings_atomic(&path, &settings)?;
        info!("settings saved to {}", path.display());
    }

    if args.headless {
        run_headless(&args, &settings)
    } else {
        run_interactive(&settings)
    }
}

fn run_headless(args: &Args, settings: &Settings) -> Result<()> {
    let mut sim = Simulation::new(args.width, args.height, settings.params, settings.colors()?)?;
    let centre = PointerState::at(args.width as f32 / 2.0, args.height as f32 / 2.0)
        .with_secondary(true);
    let idle = PointerState::default();

    let started = Instant::now();
    for frame in 0..args.frames {
        let pointer = if frame < args.press_frames { &centre } else { &idle };
        sim.step_frame(pointer);
    }
    info!(
        "{} frames ({} steps) in {:?}",
        args.frames,
        sim.steps(),
        started.elapsed()
    );

    sim.render()
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn run_interactive(settings: &Settings) -> Result<()> {
    let mut tg = TermGuard::new().context("terminal setup failed")?;
    let out = &mut tg.out;

    let mut show_hud = true;
    let mut hud_rows = HUD_ROWS;
    let mut cols_rows = terminal::size()?;
    let (w, h) = surface_size(cols_rows.0, cols_rows.1, hud_rows);
    let mut sim = Simulation::new(w, h, settings.params, settings.colors()?)?;

    let pointer = SharedPointer::new();
    let mut renderer = HalfBlockRenderer::new(hud_rows);
    let mut paused = false;

    let frame_dt = Duration::from_secs_f32(1.0 / settings.fps_cap.clamp(5, 240) as f32);
    let mut last_present = Instant::now();
    let mut fps_timer = Instant::now();
    let mut frames: u32 = 0;
    let mut fps: f32 = 0.0;

    loop {
        let batch = collect_input_nonblocking(&pointer, hud_rows)?;

        let mut relayout = batch.resized;
        for action in batch.actions {
            match action {
                Action::Quit => return Ok(()),
                Action::TogglePause => paused = !paused,
                Action::Reset => sim.reset_simulation(),
                Action::Clear => sim.clear_simulation(),
                Action::Speed(d) => {
                    let p = sim.params_mut();
                    p.steps_per_frame = (p.steps_per_frame as i32 + d).clamp(1, 500) as usize;
                }
                Action::Brush(d) => {
                    let p = sim.params_mut();
                    p.brush_radius = (p.brush_radius + d).clamp(0.002, 0.5);
                }
                Action::Feed(d) => {
                    let p = sim.params_mut();
                    p.feed_rate = (p.feed_rate + d).clamp(0.0, 0.1);
                }
                Action::Kill(d) => {
                    let p = sim.params_mut();
                    p.kill_rate = (p.kill_rate + d).clamp(0.0, 0.1);
                }
                Action::SwapColors => {
                    let c = sim.colors().swapped();
                    sim.update_colors(c.low, c.high);
                }
                Action::ToggleHud => {
                    show_hud = !show_hud;
                    hud_rows = if show_hud { HUD_ROWS } else { 0 };
                    relayout = true;
                }
            }
        }

        // Handle terminal resize
        let now_cols_rows = terminal::size()?;
        if relayout || now_cols_rows != cols_rows {
            cols_rows = now_cols_rows;
            let (w, h) = surface_size(cols_rows.0, cols_rows.1, hud_rows);
            if sim.dimensions() != (w, h) {
                sim.resize(w, h)?;
            }
            renderer.set_top_row(hud_rows);
            renderer.invalidate();
            execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
        }

        if !paused {
            sim.step_frame(&pointer.snapshot());
        }

        if show_hud {
            let p = sim.params();
            let line1 = format!(
                "rdpaint  paused:{}  steps/frame:{}  fps:{:>5.1}  sim:{}x{}",
                if paused { "yes" } else { "no " },
                p.steps_per_frame,
                fps,
                sim.dimensions().0,
                sim.dimensions().1,
            );
            let line2 = format!(
                "F:{:.4} k:{:.4} dA:{:.2} dB:{:.2} brush:{:.3}  L-drag B  R-drag A  R reset  C clear  T colors  H hud  Q quit",
                p.feed_rate, p.kill_rate, p.diffusion_rate_a, p.diffusion_rate_b, p.brush_radius
            );
            draw_hud(out, &[line1, line2], cols_rows.0 as usize)?;
        }
        renderer.draw(out, sim.render())?;

        // FPS estimate
        frames += 1;
        if fps_timer.elapsed() >= Duration::from_millis(500) {
            fps = frames as f32 / fps_timer.elapsed().as_secs_f32();
            fps_timer = Instant::now();
            frames = 0;
        }

        let elapsed = last_present.elapsed();
        if elapsed < frame_dt {
            std::thread::sleep(frame_dt - elapsed);
        }
        last_present = Instant::now();
    }
}
