//! Application entry point: live microphone amplitude console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the [`AudioAnalyzer`] with the cpal microphone and host session.
//! 5. Register the meter observer and start analysis.
//! 6. Read commands from stdin until `quit` or end of input.

use std::io::{BufRead, Write};

use anyhow::Context;
use gen_audio::{
    audio::{CpalMicrophone, HostSession},
    config::AppConfig,
    pipeline::AudioAnalyzer,
};

/// Width of the amplitude bar in characters.
const METER_WIDTH: usize = 40;

/// Amplitude shown as a full bar.
const METER_FULL_SCALE: f32 = 0.5;

const HELP: &str = "commands: start | stop | gain <value> | status | quit";

// ---------------------------------------------------------------------------
// Meter rendering
// ---------------------------------------------------------------------------

fn render_meter(amplitude: f32) -> String {
    let fraction = (amplitude / METER_FULL_SCALE).clamp(0.0, 1.0);
    let filled = (fraction * METER_WIDTH as f32).round() as usize;
    format!(
        "\r[{}{}] {:>7.4}",
        "#".repeat(filled),
        " ".repeat(METER_WIDTH - filled),
        amplitude
    )
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Start,
    Stop,
    Gain(f32),
    Status,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(HELP.to_string());
    };
    match head.to_ascii_lowercase().as_str() {
        "start" => Ok(Command::Start),
        "stop" => Ok(Command::Stop),
        "status" => Ok(Command::Status),
        "quit" | "exit" => Ok(Command::Quit),
        "gain" => words
            .next()
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(Command::Gain)
            .ok_or_else(|| "usage: gain <non-negative number>".to_string()),
        other => Err(format!("unknown command '{other}'; {HELP}")),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("gen-audio starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (the scheduler task is the only steady load)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Analyzer
    let microphone = CpalMicrophone::with_device(config.audio.input_device.clone())
        .with_buffer_frames(config.audio.buffer_frames);
    let mut analyzer = AudioAnalyzer::new(
        config,
        Box::new(microphone),
        Box::new(HostSession),
        rt.handle().clone(),
    )?;

    // 5. Meter observer, then start
    analyzer.register_observer(|amplitude: f32| {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{}", render_meter(amplitude));
        let _ = out.flush();
    });

    if let Err(e) = analyzer.start() {
        log::error!("Could not start analysis: {e}");
    }
    println!("{HELP}");

    // 6. Command loop
    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Start) => {
                if let Err(e) = analyzer.start() {
                    println!("\nstart failed: {e}");
                }
            }
            Ok(Command::Stop) => {
                analyzer.stop();
                println!("\nstopped");
            }
            Ok(Command::Gain(gain)) => {
                analyzer.set_boost_gain(gain);
                println!("\nboost gain {}", analyzer.boost_gain());
            }
            Ok(Command::Status) => {
                println!(
                    "\n{} | boost {} | amplitude {:.4}",
                    analyzer.state().label(),
                    analyzer.boost_gain(),
                    analyzer.current_amplitude()
                );
            }
            Ok(Command::Quit) => break,
            Err(message) => println!("\n{message}"),
        }
    }

    analyzer.stop();
    println!();
    log::info!("gen-audio shutting down");
    Ok(())
}
