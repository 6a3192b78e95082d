use std::time::Instant;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rustyhands::args::Args;
use rustyhands::camera::CameraSource;
use rustyhands::classifier;
use rustyhands::config::AppConfig;
use rustyhands::font;
use rustyhands::inference::{HandLandmarkPipeline, SimulatedHandPipeline};
use rustyhands::opponent::OpponentChooser;
use rustyhands::outcome::Outcome;
use rustyhands::output::WindowOutput;
use rustyhands::pipeline::Pipeline;
use rustyhands::round::{Phase, RoundMachine};
use rustyhands::ttf::FontRenderer;
use rustyhands::types::Classification;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.list {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
        println!("Available Cameras:");
        println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
        println!("{}", "-".repeat(60));
        for cam in cameras {
            println!("{:<5} | {:<30} | {:?}", cam.index(), cam.human_name(), cam.misc());
        }
        return Ok(());
    }

    let config = AppConfig::load()?;

    let mut camera = CameraSource::new(args.cam_index as usize)?;
    println!("Opened camera: {}", camera.name());

    let mut pipeline: Box<dyn Pipeline> = if args.simulate {
        Box::new(SimulatedHandPipeline::new())
    } else {
        Box::new(HandLandmarkPipeline::new(&args.landmark_model, &args.palm_model)?)
    };
    println!("Active Pipeline: {}", pipeline.name());

    let width = camera.width();
    let height = camera.height();
    let mut window = WindowOutput::new("Rusty Hands", width as usize, height as usize)?;

    let mut machine = RoundMachine::new(
        config.timing.round_timing(),
        config.timing.dwell_frames,
        OpponentChooser::from_entropy(),
    );

    let font_renderer = FontRenderer::try_load(&config.ui.font_family);
    let hud_scale = config.ui.hud_scale;
    let (lr, lg, lb) = parse_hex(&config.ui.landmark_color_hex);

    let mut mirror_mode = config.ui.mirror_mode;
    let mut show_landmarks = config.ui.show_landmarks;

    println!("Controls: [R] Reset Score [A] Abort Round [M] Mirror [L] Landmarks [Esc] Quit");

    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        for key in window.get_keys_pressed(minifb::KeyRepeat::No) {
            match key {
                minifb::Key::R => machine.reset_scores(),
                minifb::Key::A => {
                    machine.abort();
                }
                minifb::Key::M => mirror_mode = !mirror_mode,
                minifb::Key::L => show_landmarks = !show_landmarks,
                _ => {}
            }
        }

        // Dropped frames only cost responsiveness; skip and retry.
        let mut frame = match camera.capture() {
            Ok(f) => f,
            Err(_) => continue,
        };
        if mirror_mode {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }

        let now = Instant::now();
        let landmarks = match pipeline.process(&frame) {
            Ok(l) => l,
            Err(e) => {
                // Bad frame from the model wrapper; log, treat as no hand.
                tracing::warn!("pipeline error: {e:#}");
                None
            }
        };

        let class = match &landmarks {
            Some(hand) => classifier::classify(hand, now),
            None => Classification::no_hand(now),
        };

        if let Some(event) = machine.step(now, &class) {
            debug!(?event, "round event");
        }

        // --- DRAWING ---
        let mut display_buffer = frame.to_vec();
        let (w, h) = (frame.width() as usize, frame.height() as usize);

        if show_landmarks {
            if let Some(hand) = &landmarks {
                let dot = config.ui.landmark_dot_size;
                for p in hand.points() {
                    let x = p.x as usize;
                    let y = p.y as usize;
                    for dy in 0..dot {
                        for dx in 0..dot {
                            if x + dx < w && y + dy < h {
                                let idx = ((y + dy) * w + (x + dx)) * 3;
                                if idx + 2 < display_buffer.len() {
                                    display_buffer[idx] = lr;
                                    display_buffer[idx + 1] = lg;
                                    display_buffer[idx + 2] = lb;
                                }
                            }
                        }
                    }
                }
            }
        }

        let draw_text = |buf: &mut [u8], x: usize, y: usize, txt: &str, col: (u8, u8, u8)| {
            if let Some(fr) = &font_renderer {
                fr.draw_text(buf, w, h, x, y, txt, col, config.ui.font_size_pt as f32);
            } else {
                font::draw_text_line(buf, w, h, x, y, txt, col, hud_scale);
            }
        };
        let line_height = if let Some(fr) = &font_renderer {
            fr.measure_height(config.ui.font_size_pt as f32) + 5
        } else {
            font::line_height(hud_scale)
        };
        let center_x = |txt: &str| -> usize {
            let tw = font::measure_text_width(txt, hud_scale);
            w.saturating_sub(tw) / 2
        };

        let snapshot = machine.snapshot(now);
        match snapshot.phase {
            Phase::Idle => {
                let msg = "SHOW HAND TO START!";
                draw_text(&mut display_buffer, center_x(msg), 40, msg, (0, 255, 0));
            }
            Phase::Countdown { .. } => {
                let secs = snapshot.remaining.as_secs_f32().ceil().max(1.0) as u32;
                let msg = format!("{}", secs);
                // Big centered digit
                font::draw_text_line(
                    &mut display_buffer,
                    w,
                    h,
                    w.saturating_sub(font::measure_text_width(&msg, hud_scale * 4)) / 2,
                    h / 2 - 20,
                    &msg,
                    (255, 0, 0),
                    hud_scale * 4,
                );
            }
            Phase::Capture { .. } => {
                let msg = "THROW NOW!";
                draw_text(&mut display_buffer, center_x(msg), 40, msg, (255, 255, 0));
                // Dwell progress bar under the prompt.
                let bar_w = (w as f32 * 0.4) as usize;
                let filled = (bar_w as f32 * machine.capture_progress()) as usize;
                let bx = (w - bar_w) / 2;
                let by = 40 + line_height;
                for dy in 0..8 {
                    for dx in 0..bar_w {
                        let idx = ((by + dy) * w + bx + dx) * 3;
                        if idx + 2 < display_buffer.len() {
                            let on = dx < filled;
                            display_buffer[idx] = if on { 255 } else { 40 };
                            display_buffer[idx + 1] = if on { 255 } else { 40 };
                            display_buffer[idx + 2] = if on { 0 } else { 40 };
                        }
                    }
                }
            }
            Phase::Resolved {
                human,
                opponent,
                outcome,
                ..
            } => {
                let you = format!("YOU: {}", human.as_str());
                draw_text(&mut display_buffer, 10, 40, &you, (0, 255, 0));
                let cpu = match opponent {
                    Some(sym) => format!("CPU: {}", sym.as_str()),
                    None => "CPU: -".to_string(),
                };
                draw_text(&mut display_buffer, 10, 40 + line_height, &cpu, (255, 80, 80));
                let color = match outcome {
                    Outcome::HumanWin => (0, 255, 0),
                    Outcome::OpponentWin => (255, 0, 0),
                    Outcome::Tie => (255, 255, 0),
                    Outcome::NoDecision => (200, 200, 200),
                };
                let msg = outcome.as_str();
                font::draw_text_line(
                    &mut display_buffer,
                    w,
                    h,
                    w.saturating_sub(font::measure_text_width(msg, hud_scale * 2)) / 2,
                    h / 2 - 10,
                    msg,
                    color,
                    hud_scale * 2,
                );
            }
            Phase::Cooldown { .. } => {
                let msg = "GET READY...";
                draw_text(&mut display_buffer, center_x(msg), 40, msg, (200, 200, 200));
            }
        }

        // Score and controls, always visible.
        let score = format!(
            "SCORE  YOU: {}  CPU: {}  TIES: {}",
            snapshot.tally.human_wins, snapshot.tally.opponent_wins, snapshot.tally.ties
        );
        draw_text(&mut display_buffer, 10, h - 2 * line_height - 10, &score, (255, 255, 255));
        let controls = "[R] RESET  [A] ABORT  [M] MIRROR  [L] DOTS  [ESC] QUIT";
        draw_text(&mut display_buffer, 10, h - line_height - 5, controls, (160, 160, 160));

        window.update(&display_buffer)?;
    }

    Ok(())
}

fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        (r, g, b)
    } else {
        (0, 255, 0) // Default Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0000"), (255, 0, 0));
        assert_eq!(parse_hex("#00FF00"), (0, 255, 0));
        assert_eq!(parse_hex("#0000FF"), (0, 0, 255));
        assert_eq!(parse_hex("invalid"), (0, 255, 0)); // Fallback
    }
}
