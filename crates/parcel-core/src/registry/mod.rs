//! Plugin-based courier registry
//!
//! Couriers live in their own crates and register a factory here, so the
//! dispatcher never hard-codes which adapters exist.
//!
//! ## Registration
//!
//! ```rust,ignore
//! // In parcel-courier-usps
//! pub fn register(registry: &CourierRegistry) {
//!     registry.register_courier(Carrier::Usps, Box::new(UspsFactory));
//! }
//! ```

use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::model::Carrier;
use crate::traits::{Courier, CourierFactory, HttpTransport};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of courier factories keyed by carrier
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct CourierRegistry {
    couriers: RwLock<HashMap<Carrier, Box<dyn CourierFactory>>>,
}

impl CourierRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a courier factory, replacing any previous one for `carrier`
    pub fn register_courier(&self, carrier: Carrier, factory: Box<dyn CourierFactory>) {
        let mut couriers = self
            .couriers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        couriers.insert(carrier, factory);
    }

    /// Create the courier registered for `carrier`
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Courier>)`: Created courier
    /// - `Err(Error::UnknownCarrier)`: Nothing registered for `carrier`
    /// - `Err(Error)`: Factory failed
    pub fn create_courier(
        &self,
        carrier: Carrier,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>> {
        let couriers = self
            .couriers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = couriers
            .get(&carrier)
            .ok_or_else(|| Error::unknown_carrier(carrier.slug()))?;

        factory.create(config, transport)
    }

    /// List registered carriers, in [`Carrier::ALL`] order
    pub fn list_couriers(&self) -> Vec<Carrier> {
        let couriers = self
            .couriers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Carrier::ALL
            .into_iter()
            .filter(|carrier| couriers.contains_key(carrier))
            .collect()
    }

    /// Check if a courier is registered for `carrier`
    pub fn has_courier(&self, carrier: Carrier) -> bool {
        let couriers = self
            .couriers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        couriers.contains_key(&carrier)
    }
}
