//! Core traits for the parcel tracking system
//!
//! - [`Courier`]: Track one parcel against one carrier backend
//! - [`HttpTransport`]: Issue outbound GET requests on a courier's behalf

pub mod courier;
pub mod transport;

pub use courier::{Courier, CourierFactory};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, check_http};
