use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};

use crate::adapter::DistanceEstimator;
use crate::error::{DistanceError, Result};
use crate::locator::Locator;
use crate::models::{CalculationResult, DeviceCoordinate, LocationQuery};
use crate::validation::validate_query;

pub const LOCATION_UNAVAILABLE: &str = "Localização não disponível";

/// Everything the form displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShellState {
    pub origin: String,
    pub destination: String,
    pub loading: bool,
    pub result: Option<CalculationResult>,
    pub error: Option<String>,
    pub coordinate: DeviceCoordinate,
    pub geo_error: Option<String>,
}

/// How a submission ended, from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Empty field; the estimator was not called
    Rejected,
    Completed,
    Failed(DistanceError),
    /// A newer submission started before this one finished; its reply was dropped
    Stale,
}

/// Form state plus the estimator it submits to.
#[derive(Clone)]
pub struct Shell {
    estimator: Arc<dyn DistanceEstimator>,
    state: Arc<Mutex<ShellState>>,
    latest: Arc<AtomicU64>,
}

impl Shell {
    pub fn new(estimator: Arc<dyn DistanceEstimator>) -> Self {
        Self {
            estimator,
            state: Arc::new(Mutex::new(ShellState::default())),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// One-time, best-effort device lookup. Failure is recorded, never fatal.
    pub async fn start(&self, locator: &dyn Locator) {
        let located = locator.locate().await;
        let mut state = self.state.lock().await;
        match located {
            Ok(coordinate) => {
                tracing::info!("Device location captured");
                state.coordinate = coordinate;
                state.geo_error = None;
            }
            Err(e) => {
                tracing::warn!("Geolocation access denied: {}", e);
                state.coordinate = DeviceCoordinate::unknown();
                state.geo_error = Some(LOCATION_UNAVAILABLE.to_string());
            }
        }
    }

    pub async fn set_origin(&self, origin: impl Into<String>) {
        self.state.lock().await.origin = origin.into();
    }

    pub async fn set_destination(&self, destination: impl Into<String>) {
        self.state.lock().await.destination = destination.into();
    }

    pub async fn coordinate(&self) -> DeviceCoordinate {
        self.state.lock().await.coordinate
    }

    pub async fn snapshot(&self) -> ShellState {
        self.state.lock().await.clone()
    }

    /// An empty form for a new client, carrying the cached coordinate.
    pub async fn fresh_state(&self) -> ShellState {
        let state = self.state.lock().await;
        ShellState {
            coordinate: state.coordinate,
            geo_error: state.geo_error.clone(),
            ..Default::default()
        }
    }

    /// Validate the current fields and, if they pass, ask the estimator once.
    pub async fn submit(&self) -> SubmitOutcome {
        let state = self.state.lock().await;
        self.submit_shared(state).await
    }

    /// Set both fields and submit them without releasing the lock in between.
    pub async fn submit_query(
        &self,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> SubmitOutcome {
        let mut state = self.state.lock().await;
        state.origin = origin.into();
        state.destination = destination.into();
        self.submit_shared(state).await
    }

    /// Run one submission on request-local state. The shared form is not touched.
    pub async fn submit_detached(
        &self,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> (ShellState, SubmitOutcome) {
        let mut state = self.fresh_state().await;
        state.origin = origin.into();
        state.destination = destination.into();

        let Some(query) = begin(&mut state) else {
            return (state, SubmitOutcome::Rejected);
        };
        let outcome = self.estimator.compute_distance(&query, state.coordinate).await;
        let outcome = finish(&mut state, outcome);
        (state, outcome)
    }

    async fn submit_shared(&self, mut state: MutexGuard<'_, ShellState>) -> SubmitOutcome {
        let Some(query) = begin(&mut state) else {
            return SubmitOutcome::Rejected;
        };
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let coordinate = state.coordinate;
        drop(state);

        let outcome = self.estimator.compute_distance(&query, coordinate).await;

        let mut state = self.state.lock().await;
        if self.latest.load(Ordering::SeqCst) != seq {
            tracing::debug!("Discarding stale reply for submission #{}", seq);
            return SubmitOutcome::Stale;
        }
        finish(&mut state, outcome)
    }
}

// Validation and the loading transition; `None` means rejected
fn begin(state: &mut ShellState) -> Option<LocationQuery> {
    match validate_query(&state.origin, &state.destination) {
        Ok(query) => {
            state.loading = true;
            state.error = None;
            state.result = None;
            Some(query)
        }
        Err(e) => {
            state.error = Some(e.to_string());
            None
        }
    }
}

fn finish(state: &mut ShellState, outcome: Result<CalculationResult>) -> SubmitOutcome {
    state.loading = false;
    match outcome {
        Ok(result) => {
            state.result = Some(result);
            SubmitOutcome::Completed
        }
        Err(e) => {
            state.error = Some(e.to_string());
            SubmitOutcome::Failed(e)
        }
    }
}
