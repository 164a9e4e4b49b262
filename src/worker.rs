//! Generation-tagged background work.
//!
//! Every request bumps a shared counter. Workers publish only if their tag is
//! still current and the event thread re-checks the tag when draining, so a
//! superseded search can never replace the results of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its tag.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, tag: u64) -> bool {
        self.current() == tag
    }

    pub fn token(&self, tag: u64) -> CancelToken {
        CancelToken {
            generation: self.clone(),
            tag,
        }
    }
}

/// Handed to a job so long-running work can stop once it is superseded.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: Generation,
    tag: u64,
}

impl CancelToken {
    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn is_cancelled(&self) -> bool {
        !self.generation.is_current(self.tag)
    }
}

struct Tagged<T> {
    generation: u64,
    value: T,
}

/// Runs jobs on worker threads and hands back only the freshest result.
pub struct SearchWorker<T> {
    name: &'static str,
    generation: Generation,
    tx: Sender<Tagged<T>>,
    rx: Receiver<Tagged<T>>,
    in_flight: Option<u64>,
}

impl<T: Send + 'static> SearchWorker<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            name,
            generation: Generation::new(),
            tx,
            rx,
            in_flight: None,
        }
    }

    /// Run `job` on a new thread under a fresh generation.
    pub fn spawn<F>(&mut self, job: F) -> u64
    where
        F: FnOnce(&CancelToken) -> T + Send + 'static,
    {
        let tag = self.generation.advance();
        let token = self.generation.token(tag);
        let tx = self.tx.clone();
        let name = self.name;
        let spawned = thread::Builder::new()
            .name(format!("{name}-worker"))
            .spawn(move || {
                let value = job(&token);
                if token.is_cancelled() {
                    tracing::debug!(worker = name, generation = tag, "dropping stale results");
                    return;
                }
                let _ = tx.send(Tagged {
                    generation: tag,
                    value,
                });
            });
        match spawned {
            Ok(_) => self.in_flight = Some(tag),
            Err(e) => {
                tracing::error!(worker = name, error = %e, "failed to spawn worker thread");
                self.in_flight = None;
            }
        }
        tag
    }

    /// Discard whatever is in flight.
    pub fn invalidate(&mut self) {
        self.generation.advance();
        self.in_flight = None;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drain finished jobs, returning the result of the current generation if it arrived.
    pub fn drain(&mut self) -> Option<T> {
        let mut fresh = None;
        while let Ok(msg) = self.rx.try_recv() {
            if self.generation.is_current(msg.generation) {
                self.in_flight = None;
                fresh = Some(msg.value);
            } else {
                tracing::debug!(
                    worker = self.name,
                    generation = msg.generation,
                    current = self.generation.current(),
                    "ignoring superseded results"
                );
            }
        }
        fresh
    }
}

/// Delays a query until typing pauses.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, query: &str) {
        self.pending = Some((query.to_string(), Instant::now() + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending query once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(q, _)| q),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_tokens_go_stale() {
        let generation = Generation::new();
        let first = generation.token(generation.advance());
        assert!(!first.is_cancelled());
        let second = generation.token(generation.advance());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(second.tag(), 2);
    }

    #[test]
    fn debounce_waits_for_deadline() {
        let mut d = Debounce::new(Duration::from_secs(60));
        d.push("cat");
        assert!(d.take_due(Instant::now()).is_none());
        assert!(d.is_pending());
        assert_eq!(
            d.take_due(Instant::now() + Duration::from_secs(61)).as_deref(),
            Some("cat")
        );
        assert!(!d.is_pending());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut d = Debounce::new(Duration::ZERO);
        d.push("a");
        d.push("ab");
        assert_eq!(d.take_due(Instant::now()).as_deref(), Some("ab"));
    }
}
