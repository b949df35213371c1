//! Per-key request coalescing.
//!
//! Concurrent lookups of the same key share one fetch. The fetch runs on
//! its own task, so a caller that goes away does not cancel it for the
//! others.
//!
//! A flight can be forgotten while it runs. Later callers then start a new
//! fetch, and the forgotten one learns through its [`Ticket`] that its
//! result must not be cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;

/// The shared fetch ended without producing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("shared lookup aborted")]
pub struct FlightAborted;

/// Handed to a fetch; reports whether its flight has been forgotten.
#[derive(Debug, Clone)]
pub struct Ticket {
    current: Arc<AtomicBool>,
}

impl Ticket {
    /// False once [`Coalescer::forget`] was called for the flight's key.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst)
    }
}

struct Entry<T> {
    sender: broadcast::Sender<T>,
    current: Arc<AtomicBool>,
}

type Flights<T> = Arc<Mutex<HashMap<String, Entry<T>>>>;

/// Deduplicates concurrent fetches by key.
///
/// Results are not kept once a fetch completes; the next call for the same
/// key starts a new fetch.
pub struct Coalescer<T> {
    flights: Flights<T>,
}

impl<T: Clone + Send + 'static> Coalescer<T> {
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of fetches currently in flight.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        lock(&self.flights).len()
    }

    /// Runs the fetch built by `fetch` for `key`, or waits for the fetch
    /// already in flight.
    ///
    /// Every caller waiting on the same flight receives a clone of its result.
    /// `fetch` is never called when another flight is joined.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> Result<T, FlightAborted>
    where
        F: FnOnce(Ticket) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut receiver = {
            let mut flights = lock(&self.flights);
            match flights.get(key) {
                Some(entry) => {
                    tracing::trace!(key, "Joining in-flight lookup");
                    entry.sender.subscribe()
                }
                None => {
                    let (sender, receiver) = broadcast::channel(1);
                    let current = Arc::new(AtomicBool::new(true));
                    flights.insert(
                        key.to_string(),
                        Entry {
                            sender: sender.clone(),
                            current: current.clone(),
                        },
                    );

                    let fetch = fetch(Ticket { current });
                    let flight = Flight {
                        flights: self.flights.clone(),
                        key: Some(key.to_string()),
                        sender,
                    };
                    tokio::spawn(async move {
                        let value = fetch.await;
                        flight.complete(value);
                    });
                    receiver
                }
            }
        };

        receiver.recv().await.map_err(|_| FlightAborted)
    }

    /// Detaches the flight for `key`, if any.
    ///
    /// Callers already waiting still get its result; new callers start a
    /// fresh fetch.
    pub fn forget(&self, key: &str) {
        if let Some(entry) = lock(&self.flights).remove(key) {
            entry.current.store(false, Ordering::SeqCst);
            tracing::trace!(key, "Forgot in-flight lookup");
        }
    }
}

impl<T: Clone + Send + 'static> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(flights: &Flights<T>) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
    flights.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Leader-side handle of one flight.
///
/// Removes its map entry when completed or dropped, so a panicking fetch
/// releases its waiters instead of stranding them.
struct Flight<T> {
    flights: Flights<T>,
    key: Option<String>,
    sender: broadcast::Sender<T>,
}

impl<T> Flight<T> {
    fn complete(mut self, value: T) {
        self.release();
        // Waiters may all be gone; the value is then simply dropped
        let _ = self.sender.send(value);
    }

    fn release(&mut self) {
        if let Some(key) = self.key.take() {
            let mut flights = lock(&self.flights);
            if flights
                .get(&key)
                .is_some_and(|entry| entry.sender.same_channel(&self.sender))
            {
                flights.remove(&key);
            }
        }
    }
}

impl<T> Drop for Flight<T> {
    fn drop(&mut self) {
        self.release();
    }
}
