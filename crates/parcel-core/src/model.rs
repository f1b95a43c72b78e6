//! Normalized tracking data shared by every courier
//!
//! - [`Carrier`]: closed set of supported carriers
//! - [`Checkpoint`]: one observed tracking event
//! - [`TrackingResult`]: ordered list of checkpoints returned by a courier

use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported carriers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Carrier {
    /// United States Postal Service (XML API)
    Usps,
    /// Hong Kong Post (HTML scrape)
    HkPost,
    /// DPD UK (two-step JSON session flow)
    DpdUk,
}

impl Carrier {
    /// All supported carriers, in registration order
    pub const ALL: [Carrier; 3] = [Carrier::Usps, Carrier::HkPost, Carrier::DpdUk];

    /// Registry key and CLI name (e.g. "usps")
    pub fn slug(&self) -> &'static str {
        match self {
            Carrier::Usps => "usps",
            Carrier::HkPost => "hkpost",
            Carrier::DpdUk => "dpduk",
        }
    }

    /// Human-readable carrier name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Carrier::Usps => "USPS",
            Carrier::HkPost => "Hong Kong Post",
            Carrier::DpdUk => "DPD (UK)",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Carrier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Carrier::ALL
            .into_iter()
            .find(|carrier| carrier.slug() == wanted)
            .ok_or_else(|| crate::Error::unknown_carrier(s.trim()))
    }
}

/// One normalized tracking event
///
/// Immutable once constructed. Carries no carrier identifier; the caller
/// already knows which courier produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    country_name: String,
    message: String,
    checkpoint_time: String,
}

impl Checkpoint {
    /// Build a checkpoint, rendering `time` in the canonical
    /// `YYYY-MM-DDTHH:mm:ss` form
    pub fn new(
        country_name: impl Into<String>,
        message: impl Into<String>,
        time: NaiveDateTime,
    ) -> Self {
        Self {
            country_name: country_name.into(),
            message: message.into(),
            checkpoint_time: timestamp::format_canonical(&time),
        }
    }

    /// Location label, in the carrier's own format
    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    /// Carrier-native status text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Canonical timestamp, no timezone
    pub fn checkpoint_time(&self) -> &str {
        &self.checkpoint_time
    }
}

/// Successful output of a courier
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingResult {
    /// Checkpoints in carrier-defined order
    pub checkpoints: Vec<Checkpoint>,
}

impl TrackingResult {
    /// Wrap an ordered list of checkpoints
    pub fn new(checkpoints: Vec<Checkpoint>) -> Self {
        Self { checkpoints }
    }

    /// Number of checkpoints
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// `true` when the carrier returned no events
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
