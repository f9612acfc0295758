//! Connection-setup tracking for upstream requests.
//!
//! The pooled client either hands a request an idle connection or dials a new
//! one, and it does not say which. [`DialTrackingLayer`] wraps the client's
//! connector and reports dials to the [`DialProgress`] of the request being
//! dispatched, so the response-head timer can start once the connection is
//! ready instead of when the request entered the client.
//!
//! # Design Decisions
//! - The progress handle travels in a tokio task-local; the client polls the
//!   connect future inside the dispatching task
//! - A dial that outlives its request (handed to the pool in the background)
//!   reports to nobody once the request is gone

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tower::{Layer, Service};

tokio::task_local! {
    static DIAL_PROGRESS: DialProgress;
}

/// Snapshot of connection setup for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialState {
    /// Dials currently in flight.
    pub active: usize,
    /// When the most recent dial finished, successfully or not.
    pub settled_at: Option<Instant>,
}

impl DialState {
    /// When the response head is due, or `None` while a dial is in flight.
    pub fn head_deadline(&self, started: Instant, budget: Duration) -> Option<Instant> {
        if self.active > 0 {
            return None;
        }
        let ready = match self.settled_at {
            Some(at) if at > started => at,
            _ => started,
        };
        Some(ready + budget)
    }
}

/// Per-request dial tracker.
#[derive(Debug, Clone)]
pub struct DialProgress {
    tx: Arc<watch::Sender<DialState>>,
}

impl DialProgress {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(DialState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<DialState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> DialState {
        *self.tx.borrow()
    }

    /// Run `future` with dials started inside it reported here.
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        DIAL_PROGRESS.scope(self, future).await
    }

    fn begin(&self) -> DialGuard {
        self.tx.send_modify(|state| state.active += 1);
        DialGuard {
            tx: self.tx.clone(),
        }
    }
}

impl Default for DialProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one dial as settled when dropped, including on cancellation.
#[derive(Debug)]
struct DialGuard {
    tx: Arc<watch::Sender<DialState>>,
}

impl Drop for DialGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|state| {
            state.active = state.active.saturating_sub(1);
            state.settled_at = Some(Instant::now());
        });
    }
}

/// Connector layer that reports dials to the current request's [`DialProgress`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DialTrackingLayer;

impl<S> Layer<S> for DialTrackingLayer {
    type Service = DialTracking<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DialTracking { inner }
    }
}

#[derive(Debug, Clone)]
pub struct DialTracking<S> {
    inner: S,
}

impl<S, R> Service<R> for DialTracking<S>
where
    S: Service<R>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        let guard = DIAL_PROGRESS.try_with(DialProgress::begin).ok();
        let connecting = self.inner.call(request);
        Box::pin(async move {
            let result = connecting.await;
            drop(guard);
            result
        })
    }
}
