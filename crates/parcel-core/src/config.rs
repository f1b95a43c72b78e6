//! Configuration types for the parcel tracking system
//!
//! Every field has a default, so an empty document deserializes to a
//! working configuration pointed at the carriers' public endpoints.

use serde::{Deserialize, Serialize};

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// USPS Web Tools tracking endpoint
pub const USPS_API_URL: &str = "http://testing.shippingapis.com/ShippingAPITest.dll";

/// Hong Kong Post mail tracking detail page
pub const HKPOST_DETAIL_URL: &str = "http://app3.hongkongpost.hk/CGI/mt/e_detail.jsp";

/// DPD UK parcel search (step 1: resolves parcel code and session)
pub const DPDUK_PARCEL_URL: &str = "http://www.dpd.co.uk/esgServer/shipping/shipment/_/parcel/";

/// DPD UK delivery events (step 2)
pub const DPDUK_DELIVERY_URL: &str = "http://www.dpd.co.uk/esgServer/shipping/delivery/";

/// Main tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Outbound HTTP settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Carrier endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl TrackerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.transport.validate()?;
        self.endpoints.validate()?;
        Ok(())
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Upper bound on a single outbound request (seconds)
    ///
    /// Couriers never time out on their own; this is the only bound on a
    /// hung carrier backend.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl TransportConfig {
    /// Validate the transport configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(crate::Error::config("User agent cannot be empty"));
        }
        Ok(())
    }

    /// Builder-style timeout override
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Carrier endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// USPS TrackV2 API
    #[serde(default = "default_usps_url")]
    pub usps: String,

    /// Hong Kong Post detail page
    #[serde(default = "default_hkpost_url")]
    pub hkpost: String,

    /// DPD UK parcel search
    #[serde(default = "default_dpduk_parcel_url")]
    pub dpduk_parcel: String,

    /// DPD UK delivery events
    #[serde(default = "default_dpduk_delivery_url")]
    pub dpduk_delivery: String,
}

impl EndpointConfig {
    /// Validate the endpoint configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let endpoints = [
            ("usps", &self.usps),
            ("hkpost", &self.hkpost),
            ("dpduk_parcel", &self.dpduk_parcel),
            ("dpduk_delivery", &self.dpduk_delivery),
        ];

        for (name, url) in endpoints {
            if url.is_empty() {
                return Err(crate::Error::config(format!(
                    "Endpoint '{}' cannot be empty",
                    name
                )));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(crate::Error::config(format!(
                    "Endpoint '{}' must use HTTP or HTTPS scheme. Got: {}",
                    name, url
                )));
            }
        }

        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            usps: default_usps_url(),
            hkpost: default_hkpost_url(),
            dpduk_parcel: default_dpduk_parcel_url(),
            dpduk_delivery: default_dpduk_delivery_url(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    concat!("parcel-track/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_usps_url() -> String {
    USPS_API_URL.to_string()
}

fn default_hkpost_url() -> String {
    HKPOST_DETAIL_URL.to_string()
}

fn default_dpduk_parcel_url() -> String {
    DPDUK_PARCEL_URL.to_string()
}

fn default_dpduk_delivery_url() -> String {
    DPDUK_DELIVERY_URL.to_string()
}
