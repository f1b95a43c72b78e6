//! Test doubles for dispatcher contract tests

use async_trait::async_trait;
use parcel_core::error::{Error, Result};
use parcel_core::traits::{Courier, CourierFactory, HttpRequest, HttpResponse, HttpTransport};
use parcel_core::{Carrier, Checkpoint, TrackerConfig, TrackingResult};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport that refuses every request
pub struct OfflineTransport;

#[async_trait]
impl HttpTransport for OfflineTransport {
    async fn get(&self, _request: &HttpRequest) -> Result<HttpResponse> {
        Err(Error::server("offline"))
    }
}

/// A courier that records the tracking numbers it was asked for
pub struct RecordingCourier {
    carrier: Carrier,
    outcome: Result<TrackingResult>,
    calls: Arc<AtomicUsize>,
    numbers: Arc<Mutex<Vec<String>>>,
}

impl RecordingCourier {
    pub fn new(carrier: Carrier, outcome: Result<TrackingResult>) -> Self {
        Self {
            carrier,
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            numbers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times track() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tracking numbers received, in call order
    pub fn numbers(&self) -> Vec<String> {
        self.numbers.lock().unwrap().clone()
    }

    /// Create a new RecordingCourier that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            carrier: other.carrier,
            outcome: other.outcome.clone(),
            calls: Arc::clone(&other.calls),
            numbers: Arc::clone(&other.numbers),
        }
    }
}

#[async_trait]
impl Courier for RecordingCourier {
    async fn track(&self, tracking_number: &str) -> Result<TrackingResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.numbers
            .lock()
            .unwrap()
            .push(tracking_number.to_string());
        self.outcome.clone()
    }

    fn carrier(&self) -> Carrier {
        self.carrier
    }
}

/// Factory producing a courier that echoes the configured USPS endpoint
pub struct EchoEndpointFactory;

impl CourierFactory for EchoEndpointFactory {
    fn create(
        &self,
        config: &TrackerConfig,
        _transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>> {
        let checkpoint = Checkpoint::new(
            config.endpoints.usps.clone(),
            "echo",
            sample_time(),
        );
        Ok(Box::new(RecordingCourier::new(
            Carrier::Usps,
            Ok(TrackingResult::new(vec![checkpoint])),
        )))
    }
}

/// Fixed timestamp used by the doubles
pub fn sample_time() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(15, 15, 0)
        .unwrap()
}
