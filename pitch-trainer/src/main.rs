//! # Pitch Trainer - Headless Practice Driver
//!
//! Drives the pitch comparison engine from outside, the way a UI would:
//! a source thread produces frame pairs, an analysis thread ticks the session
//! once per pair, and the main thread consumes the per-tick results and the
//! final report card.
//!
//! ## Architecture
//! - **Source Thread**: Synthetic singer and reference track, chunked into frames
//! - **Analysis Thread**: Owns the `PitchSession` and calls `tick()`
//! - **Communication**: Crossbeam channels for frames, events and shutdown

mod source;
mod worker;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn};
use pitch_core::chords::ChordTimeline;
use pitch_core::graph::GraphScale;
use pitch_core::history::HistorySnapshot;
use pitch_core::{EngineConfig, PitchSession, SessionReport, dominant, tuning};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use source::{Performance, ToneVoice};
use worker::{AnalysisWorker, WorkerEvent};

/// Log one status line every this many ticks.
const STATUS_INTERVAL: usize = 30;

/// Simulate a singing practice session against a reference pitch.
#[derive(Debug, Parser)]
#[command(name = "pitch-trainer", version)]
struct Args {
    /// JSON engine configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Number of frames (ticks) to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: usize,

    /// The singer's pitch in Hz.
    #[arg(long, default_value_t = 440.0)]
    sung_hz: f32,

    /// Vibrato depth of the singer in cents.
    #[arg(long, default_value_t = 0.0)]
    vibrato_cents: f32,

    /// Pitch of the reference track in Hz; omit for no reference audio.
    #[arg(long)]
    reference_hz: Option<f32>,

    /// Song key used when the reference is silent, e.g. "F#" or "A minor".
    #[arg(long)]
    key: Option<String>,

    /// Chord timeline JSON (`[{"time": 0.0, "chord": "C Maj"}, ...]`).
    #[arg(long)]
    chords: Option<PathBuf>,

    /// Mute the singer for one frame out of every N.
    #[arg(long)]
    gap_every: Option<usize>,

    /// Write the report and graph snapshot to this JSON file.
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Everything a UI would need after the session ends.
#[derive(Debug, Serialize)]
struct SessionExport {
    ticks: usize,
    report: Option<SessionReport>,
    reference_dominant_note: Option<&'static str>,
    history: HistorySnapshot,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut session = PitchSession::new(config)?;

    if let Some(key) = &args.key {
        let pitch_class = key
            .parse::<u8>()
            .ok()
            .or_else(|| tuning::pitch_class_from_name(key))
            .ok_or_else(|| anyhow!("unrecognised key {key:?}"))?;
        session.set_key(Some(pitch_class))?;
        info!("Key {key} -> tonic {:?} Hz", session.key_tonic());
    }

    let chords = match &args.chords {
        Some(path) => load_chords(path)?,
        None => ChordTimeline::default(),
    };

    let singer = ToneVoice::new(args.sung_hz, args.sample_rate).with_vibrato(args.vibrato_cents);
    let reference = args
        .reference_hz
        .map(|freq| ToneVoice::new(freq, args.sample_rate));

    let reference_dominant_note = match &reference {
        Some(voice) => scan_reference(voice.clone(), args.sample_rate, &config)?,
        None => None,
    };

    let performance = Performance {
        sample_rate: args.sample_rate,
        frames: args.ticks,
        singer,
        reference,
        gap_every: args.gap_every,
    };

    let (frame_tx, frame_rx) = crossbeam_channel::bounded(4);
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let worker = AnalysisWorker::spawn(session, chords, args.sample_rate, frame_rx, event_tx);
    let producer = thread::spawn(move || source::stream_performance(performance, frame_tx));

    let mut export = None;
    let mut tick = 0;
    for event in event_rx.iter() {
        match event {
            WorkerEvent::Tick { output, chord } => {
                tick += 1;
                if tick % STATUS_INTERVAL == 0 {
                    info!(
                        "{:>7} | you {:>8} | target {:>6.1} Hz ({}) | chord {} | {}",
                        tick,
                        output
                            .user_frequency
                            .map_or_else(|| "-".to_string(), |f| format!("{f:.1} Hz")),
                        output.target_frequency,
                        output.reference_note.unwrap_or("--"),
                        chord.as_deref().unwrap_or("--"),
                        output.status(),
                    );
                }
            }
            WorkerEvent::Finished {
                report,
                snapshot,
                ticks,
            } => {
                export = Some(SessionExport {
                    ticks,
                    report,
                    reference_dominant_note,
                    history: snapshot,
                });
                worker.shutdown();
                break;
            }
        }
    }

    let delivered = producer
        .join()
        .map_err(|_| anyhow!("frame source thread panicked"))?;
    worker.join()?;
    let export = export.ok_or_else(|| anyhow!("analysis thread ended without a report"))?;
    info!("Delivered {delivered} frames, analysed {}", export.ticks);

    print_summary(&export);

    if let Some(path) = &args.json {
        save_export(&export, path)?;
        info!("Session written to {}", path.display());
    }
    Ok(())
}

/// Renders a few seconds of the reference voice and finds its main note.
fn scan_reference(
    mut voice: ToneVoice,
    sample_rate: u32,
    config: &EngineConfig,
) -> Result<Option<&'static str>> {
    let seconds = config.dominant_note.max_seconds.min(5.0);
    let mut track = vec![0.0; (seconds * sample_rate as f32) as usize];
    voice.render(&mut track);
    let note = dominant::estimate_dominant_note(&track, sample_rate, &config.dominant_note)?;
    Ok(note.map(|n| n.name))
}

fn load_chords(path: &Path) -> Result<ChordTimeline> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading chord timeline {}", path.display()))?;
    let timeline = ChordTimeline::from_json(&json)
        .with_context(|| format!("parsing chord timeline {}", path.display()))?;
    if timeline.is_empty() {
        warn!("Chord timeline {} has no usable segments", path.display());
    }
    Ok(timeline)
}

fn print_summary(export: &SessionExport) {
    match &export.report {
        Some(report) => {
            println!("Score: {}%", report.score);
            println!(
                "Match {}% | Near {}% | Miss {}%",
                report.match_percent, report.near_percent, report.miss_percent
            );
            println!("{}", report.message);
        }
        None => println!("Not enough singing to score this session."),
    }
    if let Some(note) = export.reference_dominant_note {
        println!("Reference main note: {note}");
    }

    let scale = GraphScale::new(800.0, 200.0, export.history.capacity);
    let (reference, user) = scale.traces(&export.history);
    println!(
        "Graph: {} reference stroke(s), {} user stroke(s) over {} ticks",
        reference.len(),
        user.len(),
        export.history.user.len()
    );
}

fn save_export(export: &SessionExport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
