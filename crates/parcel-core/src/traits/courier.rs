// # Courier Trait
//
// Defines the single contract every carrier adapter implements.
//
// ## Implementations
//
// - USPS: `parcel-courier-usps` crate (XML API)
// - Hong Kong Post: `parcel-courier-hkpost` crate (HTML scrape)
// - DPD UK: `parcel-courier-dpduk` crate (two-step JSON session flow)
//
// ## Usage
//
// ```rust,ignore
// use parcel_core::Courier;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let courier = /* Courier implementation */;
//
//     let result = courier.track("EJ958083578US").await?;
//     for checkpoint in &result.checkpoints {
//         println!("{} {}", checkpoint.checkpoint_time(), checkpoint.message());
//     }
//
//     Ok(())
// }
// ```

use crate::config::TrackerConfig;
use crate::model::{Carrier, TrackingResult};
use crate::traits::HttpTransport;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for carrier adapters
///
/// # Completion
///
/// `track` resolves exactly once, to either a [`TrackingResult`] or an
/// [`Error`](crate::Error). Partial results are never returned alongside
/// an error.
///
/// # Statelessness
///
/// Each call is self-contained. Anything a carrier needs between requests
/// (such as DPD UK's session) lives on the call's own stack and is dropped
/// when the call completes, so concurrent calls never share state.
///
/// # Forbidden
///
/// - Retries or backoff
/// - Caching results between calls
/// - Spawning background tasks
#[async_trait]
pub trait Courier: Send + Sync {
    /// Look up checkpoints for a tracking number
    ///
    /// # Returns
    ///
    /// - `Ok(TrackingResult)`: checkpoints in carrier-defined order
    /// - `Err(Error::Server)`: transport failure or non-200 status
    /// - `Err(Error::CourierUpstream)`: carrier reported a failure
    /// - `Err(Error::RecordNotFound)`: carrier knows no such parcel
    /// - `Err(Error::MalformedResponse)`: response could not be understood
    async fn track(&self, tracking_number: &str) -> Result<TrackingResult, crate::Error>;

    /// The carrier this courier talks to
    fn carrier(&self) -> Carrier;
}

/// Helper trait for constructing couriers from configuration
pub trait CourierFactory: Send + Sync {
    /// Create a Courier instance
    ///
    /// # Parameters
    ///
    /// - `config`: Tracker configuration (endpoints, transport settings)
    /// - `transport`: Shared outbound HTTP implementation
    fn create(
        &self,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>, crate::Error>;
}
