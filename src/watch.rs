//! Debounced file-watch loop.
//!
//! State machine: Idle -> Triggered -> Debouncing -> Validating -> Idle.
//! A change event leaves Idle; further events while debouncing restart the
//! timer, coalescing bursts into a single validation pass. The loop only
//! ends on an explicit stop; errors during a pass are reported by the
//! callback and the next event is still processed. Cancellation interrupts
//! waiting only, never an in-flight pass.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::{DocmanError, Result};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Messages feeding the loop: coalesced change paths, watcher errors, or
/// an explicit stop.
#[derive(Debug)]
pub enum Message {
    Changed(Vec<PathBuf>),
    Error(String),
    Stop,
}

/// Cloneable handle that cancels a running watch loop. Safe to invoke from
/// a signal handler; the corresponding loop finishes any in-flight pass
/// before returning.
#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<Message>,
}

impl StopHandle {
    pub fn stop(&self) {
        // A dropped receiver means the loop already ended.
        let _ = self.tx.send(Message::Stop);
    }
}

/// A single-threaded debounced watch session over one path.
pub struct WatchLoop {
    rx: Receiver<Message>,
    debounce: Duration,
    // Kept alive for the duration of the loop; dropping it unregisters
    // the OS watches.
    _watcher: Option<RecommendedWatcher>,
}

impl WatchLoop {
    /// Watch `path` recursively, debouncing change events by `debounce`.
    pub fn new(path: &Path, debounce: Duration) -> Result<(Self, StopHandle)> {
        if !path.exists() {
            return Err(DocmanError::PathNotFound(path.to_path_buf()));
        }
        let (tx, rx) = channel();
        let event_tx = tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<notify::Event>| match event {
                Ok(event) => {
                    let files: Vec<PathBuf> =
                        event.paths.into_iter().filter(|p| p.is_file()).collect();
                    if !files.is_empty() {
                        let _ = event_tx.send(Message::Changed(files));
                    }
                }
                Err(e) => {
                    let _ = event_tx.send(Message::Error(e.to_string()));
                }
            },
            Config::default(),
        )
        .map_err(|e| DocmanError::Watch(e.to_string()))?;

        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| DocmanError::Watch(e.to_string()))?;

        Ok((
            Self {
                rx,
                debounce,
                _watcher: Some(watcher),
            },
            StopHandle { tx },
        ))
    }

    /// Loop driven by an injected channel instead of a real watcher.
    /// Used by tests to exercise the state machine deterministically.
    #[must_use]
    pub fn from_channel(rx: Receiver<Message>, debounce: Duration) -> Self {
        Self {
            rx,
            debounce,
            _watcher: None,
        }
    }

    /// Run until stopped. `on_pass` is invoked once per debounced batch
    /// with the sorted, deduplicated set of affected paths; it reports its
    /// own failures and must not panic the loop.
    pub fn run(self, mut on_pass: impl FnMut(&[PathBuf])) -> Result<()> {
        let mut pending: BTreeSet<PathBuf> = BTreeSet::new();

        loop {
            if pending.is_empty() {
                // Idle: suspend until something happens.
                match self.rx.recv() {
                    Ok(Message::Changed(paths)) => pending.extend(paths),
                    Ok(Message::Error(e)) => warn!(error = %e, "watcher error"),
                    Ok(Message::Stop) | Err(_) => return Ok(()),
                }
            } else {
                // Debouncing: every new event restarts the timer.
                match self.rx.recv_timeout(self.debounce) {
                    Ok(Message::Changed(paths)) => pending.extend(paths),
                    Ok(Message::Error(e)) => warn!(error = %e, "watcher error"),
                    Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
                    Err(RecvTimeoutError::Timeout) => {
                        // Validating: one pass over the coalesced batch.
                        let batch: Vec<PathBuf> = std::mem::take(&mut pending)
                            .into_iter()
                            .collect();
                        debug!(paths = batch.len(), "debounce expired, validating");
                        on_pass(&batch);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    const FAST: Duration = Duration::from_millis(20);

    #[test]
    fn test_burst_coalesces_into_one_pass() {
        let (tx, rx) = channel();
        for _ in 0..5 {
            tx.send(Message::Changed(vec![PathBuf::from("a.md")])).unwrap();
        }
        // Stop after the quiet period so the loop can flush the batch.
        let stopper = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(FAST * 5);
            stopper.send(Message::Stop).unwrap();
        });

        let mut passes = Vec::new();
        WatchLoop::from_channel(rx, FAST)
            .run(|paths| passes.push(paths.to_vec()))
            .unwrap();

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0], vec![PathBuf::from("a.md")]);
    }

    #[test]
    fn test_batch_is_deduplicated_and_sorted() {
        let (tx, rx) = channel();
        tx.send(Message::Changed(vec![
            PathBuf::from("b.md"),
            PathBuf::from("a.md"),
            PathBuf::from("b.md"),
        ]))
        .unwrap();
        let stopper = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(FAST * 5);
            stopper.send(Message::Stop).unwrap();
        });

        let mut passes = Vec::new();
        WatchLoop::from_channel(rx, FAST)
            .run(|paths| passes.push(paths.to_vec()))
            .unwrap();

        assert_eq!(
            passes,
            vec![vec![PathBuf::from("a.md"), PathBuf::from("b.md")]]
        );
    }

    #[test]
    fn test_stop_while_idle() {
        let (tx, rx) = channel();
        tx.send(Message::Stop).unwrap();
        let mut passes = 0;
        WatchLoop::from_channel(rx, FAST).run(|_| passes += 1).unwrap();
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_stop_during_debounce_skips_pass() {
        let (tx, rx) = channel();
        tx.send(Message::Changed(vec![PathBuf::from("a.md")])).unwrap();
        tx.send(Message::Stop).unwrap();

        let mut passes = 0;
        WatchLoop::from_channel(rx, FAST).run(|_| passes += 1).unwrap();
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_separate_bursts_yield_separate_passes() {
        let (tx, rx) = channel();
        tx.send(Message::Changed(vec![PathBuf::from("a.md")])).unwrap();
        let feeder = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(FAST * 5);
            feeder.send(Message::Changed(vec![PathBuf::from("b.md")])).unwrap();
            std::thread::sleep(FAST * 5);
            feeder.send(Message::Stop).unwrap();
        });

        let mut passes = Vec::new();
        WatchLoop::from_channel(rx, FAST)
            .run(|paths| passes.push(paths.to_vec()))
            .unwrap();

        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0], vec![PathBuf::from("a.md")]);
        assert_eq!(passes[1], vec![PathBuf::from("b.md")]);
    }

    #[test]
    fn test_watcher_error_does_not_end_loop() {
        let (tx, rx) = channel();
        tx.send(Message::Error("transient".into())).unwrap();
        tx.send(Message::Changed(vec![PathBuf::from("a.md")])).unwrap();
        let stopper = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(FAST * 5);
            stopper.send(Message::Stop).unwrap();
        });

        let mut passes = 0;
        WatchLoop::from_channel(rx, FAST).run(|_| passes += 1).unwrap();
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_new_rejects_missing_path() {
        assert!(matches!(
            WatchLoop::new(Path::new("/does/not/exist"), FAST),
            Err(DocmanError::PathNotFound(_))
        ));
    }
}
