use anyhow::Result;
use clap::{Parser, Subcommand};
use ctg_lib::{
    detectors::episodes::{detect_episodes, EpisodeConfig},
    io::{archive as archive_io, recording as recording_io},
    metrics::stats::window_stats,
    Event, Mode, Sample, SampleBuffer, Session, SessionConfig, Window, WindowStats,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

#[derive(Parser)]
#[command(
    name = "ctg",
    version,
    about = "CTG monitoring core: headless playback, statistics and archiving"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a recorded session to completion, printing per-tick frames
    Replay {
        input: PathBuf,
        #[arg(long, default_value_t = 4.0)]
        speed: f64,
        #[arg(long, default_value_t = 0.5)]
        tick: f64,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit one JSON line per frame instead of only the summary
        #[arg(long, default_value_t = false)]
        frames: bool,
    },
    /// Window statistics over a slice of a recording
    Stats {
        input: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long)]
        end: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Detect clinical episodes over a whole recording
    Detect {
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate a synthetic recording CSV from a seed
    Simulate {
        out: PathBuf,
        /// Recording length, seconds
        #[arg(long, default_value_t = 600)]
        duration: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Sample interval, seconds
        #[arg(long, default_value_t = 1.0)]
        interval: f64,
    },
    /// Archive a finished session: recording plus detected events as JSON
    Archive {
        input: PathBuf,
        out: PathBuf,
        #[arg(long)]
        session_id: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Join the monitor's paired bpm/uterus channel exports into one CSV
    Join {
        bpm: PathBuf,
        uterus: PathBuf,
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            input,
            speed,
            tick,
            config,
            frames,
        } => cmd_replay(&input, speed, tick, config.as_deref(), frames)?,
        Commands::Stats {
            input,
            start,
            end,
            config,
        } => cmd_stats(&input, start, end, config.as_deref())?,
        Commands::Detect { input, config } => cmd_detect(&input, config.as_deref())?,
        Commands::Simulate {
            out,
            duration,
            seed,
            interval,
        } => cmd_simulate(&out, duration, seed, interval)?,
        Commands::Archive {
            input,
            out,
            session_id,
            notes,
            config,
        } => cmd_archive(&input, &out, &session_id, notes, config.as_deref())?,
        Commands::Join { bpm, uterus, out } => cmd_join(&bpm, &uterus, &out)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::from_toml_path(path),
        None => Ok(SessionConfig::default()),
    }
}

#[derive(Serialize)]
struct Frame {
    t: f64,
    window: Window,
    mode: Mode,
    stats: WindowStats,
}

#[derive(Serialize)]
struct ReplaySummary {
    frames: usize,
    window: Window,
    stats: WindowStats,
    events: Vec<Event>,
}

fn cmd_replay(
    input: &Path,
    speed: f64,
    tick: f64,
    config: Option<&Path>,
    frames: bool,
) -> Result<()> {
    let tick = tick.max(1e-3);
    let config = load_config(config)?;
    let samples = recording_io::read_recording(input)?;
    let mut session = Session::recorded(config, samples)?;
    session.play(speed);
    session.start_ticker(0.0);

    let mut emitted = 0;
    let mut now = 0.0;
    while !session.playback_completed() {
        now += tick;
        if session.tick(now).is_none() {
            continue;
        }
        session.scan_for_episodes(now);
        if frames {
            let view = session.view();
            let frame = Frame {
                t: now,
                window: view.window,
                mode: view.mode,
                stats: view.stats,
            };
            println!("{}", serde_json::to_string(&frame)?);
            emitted += 1;
        }
    }

    let view = session.view();
    let summary = ReplaySummary {
        frames: emitted,
        window: view.window,
        stats: view.stats,
        events: view.events,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

#[derive(Serialize)]
struct SliceStats {
    window: Window,
    samples: usize,
    stats: WindowStats,
}

fn cmd_stats(input: &Path, start: f64, end: Option<f64>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let samples = recording_io::read_recording(input)?;
    let mut buffer = SampleBuffer::with_capacity(samples.len());
    buffer.load(samples)?;
    let end = end.or(buffer.latest_t()).unwrap_or(start);
    let slice = buffer.slice(start, end);
    let stats = window_stats(&slice, &config.stats());
    let out = SliceStats {
        window: Window { start, end },
        samples: slice.len(),
        stats,
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn cmd_detect(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let samples = recording_io::read_recording(input)?;
    let cfg = EpisodeConfig {
        delta_bpm: config.delta_threshold,
        ..EpisodeConfig::default()
    };
    let episodes = detect_episodes(&samples, &cfg);
    println!("{}", serde_json::to_string(&episodes)?);
    Ok(())
}

fn cmd_simulate(out: &Path, duration: usize, seed: u64, interval: f64) -> Result<()> {
    let samples = synthetic_recording(duration, seed, interval);
    recording_io::write_recording(out, &samples)?;
    log::info!("wrote {} samples to {}", samples.len(), out.display());
    println!(
        "{}",
        serde_json::json!({ "samples": samples.len(), "path": out.display().to_string() })
    );
    Ok(())
}

/// Seeded synthetic CTG trace: baseline wander plus periodic contraction
/// bells, some of them followed by a deceleration.
fn synthetic_recording(duration: usize, seed: u64, interval: f64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let baseline = 140.0 + rng.gen_range(-5.0..5.0);
    let count = (duration as f64 / interval.max(1e-3)).ceil() as usize;

    let mut samples = Vec::with_capacity(count);
    let mut contraction_at = rng.gen_range(60.0..180.0);
    let mut decel_until = f64::NEG_INFINITY;
    for i in 0..count {
        let t = i as f64 * interval;
        let wander = 5.0 * (t / 45.0).sin();
        let mut fhr = baseline + wander + rng.gen_range(-3.0..3.0);
        let mut ua = 8.0 + rng.gen_range(-2.0..2.0);

        let since = t - contraction_at;
        if (0.0..60.0).contains(&since) {
            ua += 55.0 * (since / 60.0 * std::f64::consts::PI).sin();
        } else if since >= 60.0 {
            if rng.gen_bool(0.3) {
                decel_until = t + rng.gen_range(20.0..40.0);
            }
            contraction_at = t + rng.gen_range(120.0..240.0);
        }
        if t < decel_until {
            fhr -= 25.0;
        }
        samples.push(Sample::new(t, fhr, ua).clamped());
    }
    samples
}

fn cmd_archive(
    input: &Path,
    out: &Path,
    session_id: &str,
    notes: Option<String>,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let samples = recording_io::read_recording(input)?;
    let ended_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let cfg = EpisodeConfig {
        delta_bpm: config.delta_threshold,
        ..EpisodeConfig::default()
    };
    let events: Vec<Event> = detect_episodes(&samples, &cfg)
        .into_iter()
        .map(|ep| ep.into_event(ended_at))
        .collect();
    let archive = archive_io::SessionArchive::new(
        session_id,
        notes,
        ended_at,
        samples,
        events,
        &config.stats(),
    );
    archive_io::write_archive(out, &archive)?;
    println!(
        "{}",
        serde_json::json!({
            "path": out.display().to_string(),
            "session_id": archive.session_id,
            "duration": archive.duration(),
            "events": archive.events.len(),
        })
    );
    Ok(())
}

fn cmd_join(bpm: &Path, uterus: &Path, out: &Path) -> Result<()> {
    let samples = recording_io::join_channel_files(bpm, uterus)?;
    recording_io::write_recording(out, &samples)?;
    println!(
        "{}",
        serde_json::json!({ "samples": samples.len(), "path": out.display().to_string() })
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_recording_is_deterministic() {
        let a = synthetic_recording(120, 7, 1.0);
        let b = synthetic_recording(120, 7, 1.0);
        assert_eq!(a.len(), 120);
        assert_eq!(a, b);
    }

    #[test]
    fn synthetic_recording_stays_in_range() {
        let samples = synthetic_recording(600, 3, 1.0);
        assert!(samples.iter().all(|s| s.in_range()));
        assert!(samples.windows(2).all(|w| w[0].t <= w[1].t));
    }
}
