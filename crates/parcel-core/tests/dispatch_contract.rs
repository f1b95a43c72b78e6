//! Contract Test: Dispatcher routing
//!
//! Constraints verified:
//! - A (carrier, number) pair reaches exactly the matching courier
//! - Unknown carriers and blank numbers fail before any courier runs
//! - Courier errors reach the caller unchanged
//! - Registry-built dispatchers validate configuration first

mod common;

use common::*;
use parcel_core::{Carrier, CourierRegistry, Dispatcher, Error, TrackerConfig, TrackingResult};
use std::sync::Arc;

#[tokio::test]
async fn routes_to_matching_courier_only() {
    let usps = RecordingCourier::new(Carrier::Usps, Ok(TrackingResult::default()));
    let dpd = RecordingCourier::new(Carrier::DpdUk, Err(Error::RecordNotFound));

    let dispatcher = Dispatcher::new(vec![
        Box::new(RecordingCourier::sharing_counters_with(&usps)),
        Box::new(RecordingCourier::sharing_counters_with(&dpd)),
    ]);

    let result = dispatcher.track(Carrier::Usps, "  EJ958083578US ").await;
    assert_eq!(result, Ok(TrackingResult::default()));

    assert_eq!(usps.call_count(), 1);
    assert_eq!(usps.numbers(), vec!["EJ958083578US".to_string()]);
    assert_eq!(dpd.call_count(), 0);
}

#[tokio::test]
async fn courier_errors_propagate_unchanged() {
    let dpd = RecordingCourier::new(Carrier::DpdUk, Err(Error::RecordNotFound));
    let dispatcher = Dispatcher::new(vec![Box::new(dpd)]);

    let err = dispatcher.track_by_name("dpduk", "15976967").await.unwrap_err();
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn unknown_carrier_is_rejected() {
    let usps = RecordingCourier::new(Carrier::Usps, Ok(TrackingResult::default()));
    let dispatcher = Dispatcher::new(vec![Box::new(RecordingCourier::sharing_counters_with(&usps))]);

    let err = dispatcher.track(Carrier::HkPost, "RR123456789HK").await.unwrap_err();
    assert_eq!(err, Error::unknown_carrier("hkpost"));

    let err = dispatcher.track_by_name("royalmail", "X").await.unwrap_err();
    assert!(matches!(err, Error::UnknownCarrier(_)));

    assert_eq!(usps.call_count(), 0);
}

#[tokio::test]
async fn blank_tracking_number_never_reaches_courier() {
    let usps = RecordingCourier::new(Carrier::Usps, Ok(TrackingResult::default()));
    let dispatcher = Dispatcher::new(vec![Box::new(RecordingCourier::sharing_counters_with(&usps))]);

    let err = dispatcher.track(Carrier::Usps, "   ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(usps.call_count(), 0);
}

#[tokio::test]
async fn registry_built_dispatcher_passes_config_to_factories() {
    let registry = CourierRegistry::new();
    registry.register_courier(Carrier::Usps, Box::new(EchoEndpointFactory));

    let mut config = TrackerConfig::new();
    config.endpoints.usps = "http://usps.test/api".to_string();

    let dispatcher =
        Dispatcher::from_registry(&registry, &config, Arc::new(OfflineTransport)).unwrap();
    assert_eq!(dispatcher.carriers(), vec![Carrier::Usps]);

    let result = dispatcher.track(Carrier::Usps, "EJ958083578US").await.unwrap();
    assert_eq!(result.checkpoints[0].country_name(), "http://usps.test/api");
}

#[tokio::test]
async fn invalid_config_is_rejected_before_building() {
    let registry = CourierRegistry::new();
    registry.register_courier(Carrier::Usps, Box::new(EchoEndpointFactory));

    let mut config = TrackerConfig::new();
    config.transport.timeout_secs = 0;

    let built = Dispatcher::from_registry(&registry, &config, Arc::new(OfflineTransport));
    assert!(matches!(built, Err(Error::Config(_))));
}
