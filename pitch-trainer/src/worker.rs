//! # Analysis Worker
//!
//! Owns the [`PitchSession`] on a dedicated thread. Frames arrive over one
//! channel, results leave over another, and a third carries the shutdown
//! signal. Each received frame pair becomes exactly one `tick()`.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, warn};
use pitch_core::chords::ChordTimeline;
use pitch_core::history::HistorySnapshot;
use pitch_core::{Frame, PitchSession, SessionReport, TickOutput};
use std::thread::{self, JoinHandle};

use crate::source::FramePair;

/// Messages sent from the analysis thread to the main thread.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Tick {
        output: TickOutput,
        /// Chord label active at the frame's playback position.
        chord: Option<String>,
    },
    Finished {
        report: Option<SessionReport>,
        snapshot: HistorySnapshot,
        ticks: usize,
    },
}

/// Analysis worker thread management structure.
#[derive(Debug)]
pub struct AnalysisWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AnalysisWorker {
    /// Starts listening and spawns the analysis thread.
    ///
    /// The thread ends when the frame channel disconnects or a shutdown
    /// message arrives; either way it stops the session and sends
    /// [`WorkerEvent::Finished`].
    pub fn spawn(
        mut session: PitchSession,
        chords: ChordTimeline,
        sample_rate: u32,
        frames: Receiver<FramePair>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let thread_handle = thread::spawn(move || {
            debug!("Analysis thread started");
            session.start();
            let mut ticks = 0;

            loop {
                crossbeam_channel::select! {
                    recv(frames) -> msg => match msg {
                        Ok(pair) => {
                            match analyse(&mut session, &chords, sample_rate, &pair) {
                                Ok(event) => {
                                    ticks += 1;
                                    if events.send(event).is_err() {
                                        warn!("Event receiver closed; stopping analysis");
                                        break;
                                    }
                                }
                                Err(e) => error!("Tick failed: {e}"),
                            }
                        }
                        Err(_) => {
                            debug!("Frame channel closed");
                            break;
                        }
                    },
                    recv(shutdown_rx) -> _ => {
                        debug!("Received shutdown signal");
                        break;
                    },
                }
            }

            let report = session.stop();
            let finished = WorkerEvent::Finished {
                report,
                snapshot: session.snapshot(),
                ticks,
            };
            if events.send(finished).is_err() {
                warn!("Event receiver closed before the session report was delivered");
            }
            debug!("Analysis thread finished after {ticks} ticks");
        });

        Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        }
    }

    /// Asks the thread to stop after its current tick.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.try_send(());
    }

    /// Waits for the thread to exit.
    pub fn join(mut self) -> anyhow::Result<()> {
        if let Some(handle) = self.thread_handle.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("analysis thread panicked"))?;
        }
        Ok(())
    }
}

fn analyse(
    session: &mut PitchSession,
    chords: &ChordTimeline,
    sample_rate: u32,
    pair: &FramePair,
) -> pitch_core::error::Result<WorkerEvent> {
    let mic = Frame::new(&pair.mic, sample_rate)?;
    let reference = pair
        .reference
        .as_deref()
        .map(|samples| Frame::new(samples, sample_rate))
        .transpose()?;

    let output = session.tick(mic, reference)?;
    // Chords only follow a playing reference track.
    let chord = reference
        .and_then(|_| chords.label_at(pair.position))
        .map(str::to_owned);
    Ok(WorkerEvent::Tick { output, chord })
}
