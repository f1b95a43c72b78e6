//! Routes a (carrier, tracking number) pair to the matching courier
//!
//! ```text
//!                       ┌──────────────┐
//!  (carrier, number) ──▶│  Dispatcher  │
//!                       └──────────────┘
//!                              │
//!         ┌────────────────────┼────────────────────┐
//!         ▼                    ▼                    ▼
//!  ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//!  │    USPS     │     │    HKPost    │     │   DPD UK    │
//!  └─────────────┘     └──────────────┘     └─────────────┘
//!         │                    │                    │
//!         └───────────── HttpTransport ─────────────┘
//! ```
//!
//! The dispatcher holds no per-call state. Concurrent `track` calls are
//! independent.

use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::model::{Carrier, TrackingResult};
use crate::registry::CourierRegistry;
use crate::traits::{Courier, HttpTransport};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Courier set built from a registry
pub struct Dispatcher {
    couriers: HashMap<Carrier, Box<dyn Courier>>,
}

impl Dispatcher {
    /// Build a dispatcher from an explicit list of couriers
    pub fn new(couriers: Vec<Box<dyn Courier>>) -> Self {
        let couriers = couriers
            .into_iter()
            .map(|courier| (courier.carrier(), courier))
            .collect();
        Self { couriers }
    }

    /// Instantiate every courier registered in `registry`
    ///
    /// The configuration is validated first. All couriers share `transport`.
    pub fn from_registry(
        registry: &CourierRegistry,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;

        let couriers = registry
            .list_couriers()
            .into_iter()
            .map(|carrier| registry.create_courier(carrier, config, transport.clone()))
            .collect::<Result<Vec<_>>>()?;

        debug!("Dispatcher ready with {} courier(s)", couriers.len());
        Ok(Self::new(couriers))
    }

    /// Carriers this dispatcher can route to, in [`Carrier::ALL`] order
    pub fn carriers(&self) -> Vec<Carrier> {
        Carrier::ALL
            .into_iter()
            .filter(|carrier| self.couriers.contains_key(carrier))
            .collect()
    }

    /// Track a parcel with the courier for `carrier`
    ///
    /// The tracking number is trimmed. A blank number is rejected before any
    /// request is issued.
    pub async fn track(&self, carrier: Carrier, tracking_number: &str) -> Result<TrackingResult> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(Error::invalid_input("Tracking number cannot be empty"));
        }

        let courier = self
            .couriers
            .get(&carrier)
            .ok_or_else(|| Error::unknown_carrier(carrier.slug()))?;

        info!("Dispatching {} to {}", tracking_number, carrier.slug());

        match courier.track(tracking_number).await {
            Ok(result) => {
                info!(
                    "{} returned {} checkpoint(s) for {}",
                    carrier.slug(),
                    result.len(),
                    tracking_number
                );
                Ok(result)
            }
            Err(e) => {
                warn!("{} failed for {}: {}", carrier.slug(), tracking_number, e);
                Err(e)
            }
        }
    }

    /// Same as [`Dispatcher::track`], with the carrier given by name
    pub async fn track_by_name(&self, carrier: &str, tracking_number: &str) -> Result<TrackingResult> {
        let carrier: Carrier = carrier.parse()?;
        self.track(carrier, tracking_number).await
    }
}
