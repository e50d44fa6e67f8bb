//! Morphwave - an audio-reactive morphing form
//!
//! A seeded noise field ripples the surface, loudness and the beat grid push
//! it outward, and every sixteen bars the form becomes a different shape.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{parse_seed, Args, Command, RenderArgs};
use morphwave::analysis::{AnalysisResult, BeatAnalyzer, Waveform};
use morphwave::audio::{ManualClock, ProceduralSynth, SharedBlockTap, TrackTap};
use morphwave::noise::{NoiseField, Seed};
use morphwave::params::audio_constants::{OFFLINE_SAMPLE_RATE, TAP_SIZE};
use morphwave::params::ScheduleConfig;
use morphwave::preview;
use morphwave::{Session, SessionConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("morphwave=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Analyze { input, json } => run_analyze(&input, json),
        Command::Render(render) => run_render(&render),
        Command::Live { seconds, seed } => run_live(seconds, &seed),
        Command::NoisePreview {
            seed,
            scale,
            size,
            output,
        } => run_noise_preview(&seed, scale, size, &output),
    }
}

fn analyze_file(path: &std::path::Path) -> Result<(Waveform, AnalysisResult)> {
    let waveform = Waveform::from_wav(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        sample_rate = waveform.sample_rate(),
        channels = waveform.channel_count(),
        duration = waveform.duration(),
        "decoded track"
    );
    let analysis = BeatAnalyzer::default().analyze(&waveform);
    Ok((waveform, analysis))
}

fn run_analyze(path: &std::path::Path, json: bool) -> Result<()> {
    let (_, analysis) = analyze_file(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("Track: {}", path.display());
    println!("  Duration: {:.2}s", analysis.duration);
    println!("  BPM: {}", analysis.bpm);
    println!("  Beats: {}", analysis.beats.len());
    let first: Vec<String> = analysis
        .beats
        .iter()
        .take(8)
        .map(|b| format!("{:.3}", b))
        .collect();
    println!("  First beats: [{}]", first.join(", "));
    Ok(())
}

fn session_for(seed: u32) -> Session {
    Session::new(SessionConfig {
        noise_seed: seed,
        schedule: ScheduleConfig {
            seed: seed as u64,
            ..ScheduleConfig::default()
        },
        ..SessionConfig::default()
    })
}

fn run_render(args: &RenderArgs) -> Result<()> {
    args.validate()?;
    let seed = parse_seed(&args.seed);
    let mut session = session_for(seed);

    if let Some(style) = args.load_style()? {
        session.apply_style(style);
    }
    if let Some(shape) = args.parse_shape()? {
        session.pin_shape(shape);
    }

    let frame_s = 1.0 / args.fps;
    let frames_per_second = args.fps.round().max(1.0) as u32;

    // Offline sources: a manual clock for tracks, rendered synth audio for procedural
    let clock = ManualClock::new();
    let mut synth = None;
    let tap = SharedBlockTap::new(TAP_SIZE);

    if let Some(path) = &args.input {
        let (waveform, analysis) = analyze_file(path)?;
        println!(
            "Uploaded track: {} BPM, {} beats",
            analysis.bpm,
            analysis.beats.len()
        );
        let samples: Arc<[f32]> = waveform.mono().into();
        let track_tap = TrackTap::new(
            samples,
            waveform.sample_rate(),
            TAP_SIZE,
            Box::new(clock.clone()),
            0.0,
        );
        session.start_uploaded(
            Arc::new(analysis),
            Box::new(clock.clone()),
            0.0,
            Box::new(track_tap),
        );
    } else {
        let procedural = ProceduralSynth::new(OFFLINE_SAMPLE_RATE)?;
        session.start_procedural(Box::new(procedural.transport()), Box::new(tap.clone()));
        println!("Procedural track at {} Hz", OFFLINE_SAMPLE_RATE);
        synth = Some(procedural);
    }

    let samples_per_frame = (OFFLINE_SAMPLE_RATE as f64 * frame_s).round() as usize;
    let mut block = vec![0.0f32; samples_per_frame.max(1)];
    let mut changes = 0u32;

    for frame in 0..args.frames {
        match synth.as_mut() {
            Some(synth) => {
                synth.render(&mut block);
                tap.push(&block);
            }
            None => clock.set(frame as f64 * frame_s),
        }

        let scene = session.advance();
        let vertices = scene.vertices.len();
        let Some(report) = session.last_report() else {
            continue;
        };

        if let Some(shape) = report.shape_changed {
            changes += 1;
            info!(frame, time = session.current_time(), shape = %shape, "shape cycled");
        }
        if frame % frames_per_second == 0 {
            println!(
                "t={:6.2}s shape={:<11} pulse={:.2} level={:.2} vertices={}",
                session.current_time(),
                session.shape().name(),
                report.pulse,
                report.smoothed_level,
                vertices
            );
        }
    }

    println!("Rendered {} frames, {} shape changes", args.frames, changes);
    session.stop();
    Ok(())
}

#[cfg(feature = "live")]
fn run_live(seconds: f32, seed: &str) -> Result<()> {
    use morphwave::audio::LiveOutput;
    use std::time::{Duration, Instant};

    let output = LiveOutput::start()?;
    let mut session = session_for(parse_seed(seed));
    session.start_procedural(Box::new(output.transport()), Box::new(output.tap()));

    println!("\nMorphwave is running for {:.0}s", seconds);
    let frame = Duration::from_secs_f64(1.0 / 60.0);
    let start = Instant::now();
    while start.elapsed().as_secs_f32() < seconds {
        let tick = Instant::now();
        session.advance();
        if let Some(shape) = session.last_report().and_then(|r| r.shape_changed) {
            info!(time = session.current_time(), shape = %shape, "shape cycled");
        }
        if let Some(rest) = frame.checked_sub(tick.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    session.stop();
    Ok(())
}

#[cfg(not(feature = "live"))]
fn run_live(_seconds: f32, _seed: &str) -> Result<()> {
    anyhow::bail!("live playback needs the `live` feature (cargo run --features live)")
}

fn run_noise_preview(seed: &str, scale: f64, size: u32, output: &std::path::Path) -> Result<()> {
    let seed = parse_seed(seed);
    println!("Noise preview");
    println!("  Seed: {}", seed);
    println!("  Scale: {}", scale);
    println!("  Size: {}x{}", size, size);

    let noise = NoiseField::new(Seed::Int(seed));
    let img = preview::heightmap(&noise, size, scale);
    img.save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("  Output: {}", output.display());
    Ok(())
}
