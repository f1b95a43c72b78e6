// # parcel-core
//
// Core library for the unified parcel tracking adapters.
//
// ## Architecture Overview
//
// - **Courier**: Trait every carrier adapter implements (one `track` call)
// - **HttpTransport**: Trait for outbound GET requests, shared by couriers
// - **CourierRegistry**: Plugin-based registry of courier factories
// - **Dispatcher**: Routes (carrier, tracking number) to the right courier
// - **Checkpoint / TrackingResult**: Normalized output shared by all couriers
//
// ## Design Principles
//
// 1. **One contract**: USPS (XML), HKPost (HTML) and DPD UK (JSON session)
//    all return `Result<TrackingResult>`
// 2. **Closed error taxonomy**: callers branch on `Error` variants
// 3. **Stateless calls**: nothing survives between `track` invocations
// 4. **Transport at the edge**: couriers only see `HttpTransport`

pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod registry;
pub mod timestamp;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export core types for convenience
pub use config::{EndpointConfig, TrackerConfig, TransportConfig};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use model::{Carrier, Checkpoint, TrackingResult};
pub use registry::CourierRegistry;
pub use traits::{Courier, CourierFactory, HttpRequest, HttpResponse, HttpTransport, check_http};
