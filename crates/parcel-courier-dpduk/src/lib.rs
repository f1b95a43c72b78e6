// # DPD UK Courier
//
// Tracks parcels through the DPD UK website's JSON endpoints. Two requests
// per call, the second depending on the first.
//
// ## Step 1: resolve parcel and session
//
// ```http
// GET /esgServer/shipping/shipment/_/parcel/?filter=id&searchCriteria=deliveryReference=<id>
// ```
//
// - `success: false` → `Error::CourierUpstream(DPD (UK))`
// - `obj.totalResults == 0` → `Error::RecordNotFound`
// - otherwise `obj.parcel[0].parcelCode` and `obj.searchSession`
//
// ## Step 2: fetch events
//
// ```http
// GET /esgServer/shipping/delivery/?parcelCode=<code>
// Cookie: tracking=<searchSession>
// ```
//
// Without the cookie DPD answers "access denied". Events are sorted
// ascending by date (stable for equal dates) before conversion.
//
// If step 1 fails, step 2 is never sent and the step 1 error is returned
// as-is. Redirects are disabled on both requests.

use async_trait::async_trait;
use parcel_core::config::TrackerConfig;
use parcel_core::registry::CourierRegistry;
use parcel_core::timestamp::{self, FRACTIONAL_ISO_FORMAT};
use parcel_core::traits::{Courier, CourierFactory, HttpRequest, HttpTransport, check_http};
use parcel_core::{Carrier, Checkpoint, Error, Result, TrackingResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Cookie key carrying the search session
const SESSION_COOKIE: &str = "tracking";

/// DPD UK courier
pub struct DpdUkCourier {
    parcel_endpoint: String,
    delivery_endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

/// Parcel code and session id from step 1
///
/// Lives for one `track` call only.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionContext {
    parcel_code: String,
    session_id: String,
}

/// Common `{ success, obj }` wrapper of every DPD response
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    obj: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParcelSearch {
    total_results: u64,
    #[serde(default)]
    parcel: Vec<ParcelRef>,
    #[serde(default)]
    search_session: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParcelRef {
    parcel_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryEvents {
    tracking_event: Vec<TrackingEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingEvent {
    tracking_event_location: String,
    tracking_event_status: String,
    tracking_event_date: String,
}

impl DpdUkCourier {
    /// Create a DPD UK courier
    ///
    /// # Parameters
    ///
    /// - `parcel_endpoint`: parcel search URL (step 1)
    /// - `delivery_endpoint`: delivery events URL (step 2)
    pub fn new(
        parcel_endpoint: impl Into<String>,
        delivery_endpoint: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            parcel_endpoint: parcel_endpoint.into(),
            delivery_endpoint: delivery_endpoint.into(),
            transport,
        }
    }

    /// Step 1: look the delivery reference up and open a search session
    async fn resolve_session(&self, tracking_number: &str) -> Result<SessionContext> {
        tracing::debug!("Resolving DPD parcel code for {}", tracking_number);

        let request = HttpRequest::get(&self.parcel_endpoint)
            .query("filter", "id")
            .query("searchCriteria", format!("deliveryReference={}", tracking_number))
            .no_redirects();

        let body = check_http(self.transport.get(&request).await)?;
        parse_parcel_search(&body)
    }

    /// Step 2: fetch events for the resolved parcel under its session
    async fn fetch_events(&self, session: &SessionContext) -> Result<TrackingResult> {
        tracing::debug!("Fetching DPD events for parcel {}", session.parcel_code);

        let request = HttpRequest::get(&self.delivery_endpoint)
            .query("parcelCode", session.parcel_code.as_str())
            .header("cookie", format!("{}={}", SESSION_COOKIE, session.session_id))
            .no_redirects();

        let body = check_http(self.transport.get(&request).await)?;
        parse_delivery(&body)
    }
}

#[async_trait]
impl Courier for DpdUkCourier {
    async fn track(&self, tracking_number: &str) -> Result<TrackingResult> {
        tracing::info!("Start dpduk: {}", tracking_number);

        let session = self.resolve_session(tracking_number).await?;
        self.fetch_events(&session).await
    }

    fn carrier(&self) -> Carrier {
        Carrier::DpdUk
    }
}

/// Decode the envelope, fail on `success: false`, then decode `obj` as `T`
fn open_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    if !envelope.success {
        tracing::warn!("DPD (UK) reported success=false");
        return Err(Error::courier_upstream(Carrier::DpdUk));
    }

    let obj = envelope.obj.ok_or_else(|| malformed("missing obj"))?;
    serde_json::from_value(obj).map_err(|e| malformed(format!("unexpected obj shape: {}", e)))
}

fn parse_parcel_search(body: &str) -> Result<SessionContext> {
    let search: ParcelSearch = open_envelope(body)?;

    if search.total_results == 0 {
        return Err(Error::RecordNotFound);
    }

    let parcel_code = search
        .parcel
        .into_iter()
        .next()
        .map(|parcel| parcel.parcel_code)
        .ok_or_else(|| malformed("totalResults > 0 but no parcel entry"))?;
    let session_id = search
        .search_session
        .ok_or_else(|| malformed("missing searchSession"))?;

    Ok(SessionContext {
        parcel_code,
        session_id,
    })
}

fn parse_delivery(body: &str) -> Result<TrackingResult> {
    let delivery: DeliveryEvents = open_envelope(body)?;

    let mut events = delivery
        .tracking_event
        .into_iter()
        .map(|event| {
            let time = timestamp::parse_exact(&event.tracking_event_date, FRACTIONAL_ISO_FORMAT)
                .ok_or_else(|| {
                    malformed(format!(
                        "unparseable trackingEventDate '{}'",
                        event.tracking_event_date
                    ))
                })?;
            Ok((time, event))
        })
        .collect::<Result<Vec<_>>>()?;

    // sort_by_key is stable: equal dates keep response order
    events.sort_by_key(|(time, _)| *time);

    let checkpoints = events
        .into_iter()
        .map(|(time, event)| {
            Checkpoint::new(
                event.tracking_event_location,
                event.tracking_event_status,
                time,
            )
        })
        .collect();

    Ok(TrackingResult::new(checkpoints))
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::malformed(Carrier::DpdUk, reason)
}

/// Factory for creating DPD UK couriers
pub struct DpdUkFactory;

impl CourierFactory for DpdUkFactory {
    fn create(
        &self,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>> {
        if config.endpoints.dpduk_parcel.is_empty() || config.endpoints.dpduk_delivery.is_empty() {
            return Err(Error::config("DPD UK endpoints are required"));
        }
        Ok(Box::new(DpdUkCourier::new(
            config.endpoints.dpduk_parcel.clone(),
            config.endpoints.dpduk_delivery.clone(),
            transport,
        )))
    }
}

/// Register the DPD UK courier with a registry
pub fn register(registry: &CourierRegistry) {
    registry.register_courier(Carrier::DpdUk, Box::new(DpdUkFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_core::testing::CannedTransport;

    const FOUND: &str = r#"{
        "success": true,
        "obj": {
            "totalResults": 1,
            "parcel": [{ "parcelCode": "15501234567890*21234" }],
            "searchSession": "0a1b2c3d-session"
        }
    }"#;

    const NOT_FOUND: &str = r#"{ "success": true, "obj": { "totalResults": 0, "parcel": [] } }"#;

    const EVENTS: &str = r#"{
        "success": true,
        "obj": {
            "trackingEvent": [
                {
                    "trackingEventLocation": "Birmingham",
                    "trackingEventStatus": "Delivered",
                    "trackingEventDate": "2024-03-02T10:00:00.000"
                },
                {
                    "trackingEventLocation": "Hinckley Hub",
                    "trackingEventStatus": "In transit",
                    "trackingEventDate": "2024-03-01T09:00:00.000"
                }
            ]
        }
    }"#;

    fn courier(transport: &Arc<CannedTransport>) -> DpdUkCourier {
        DpdUkCourier::new(
            "http://dpd.test/parcel/",
            "http://dpd.test/delivery/",
            transport.clone(),
        )
    }

    #[tokio::test]
    async fn test_events_are_sorted_ascending() {
        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, FOUND)
                .respond(200, EVENTS),
        );

        let result = courier(&transport).track("15976967").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.checkpoints[0].checkpoint_time(), "2024-03-01T09:00:00");
        assert_eq!(result.checkpoints[0].country_name(), "Hinckley Hub");
        assert_eq!(result.checkpoints[0].message(), "In transit");
        assert_eq!(result.checkpoints[1].checkpoint_time(), "2024-03-02T10:00:00");
        assert_eq!(result.checkpoints[1].message(), "Delivered");
    }

    #[tokio::test]
    async fn test_session_flows_into_second_request() {
        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, FOUND)
                .respond(200, EVENTS),
        );

        courier(&transport).track("15976967").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);

        let lookup = &requests[0];
        assert_eq!(lookup.url, "http://dpd.test/parcel/");
        assert_eq!(lookup.query_value("filter"), Some("id"));
        assert_eq!(
            lookup.query_value("searchCriteria"),
            Some("deliveryReference=15976967")
        );
        assert!(!lookup.follow_redirects);

        let events = &requests[1];
        assert_eq!(events.url, "http://dpd.test/delivery/");
        assert_eq!(events.query_value("parcelCode"), Some("15501234567890*21234"));
        assert_eq!(events.header_value("cookie"), Some("tracking=0a1b2c3d-session"));
        assert!(!events.follow_redirects);
    }

    #[tokio::test]
    async fn test_zero_results_skips_second_request() {
        let transport = Arc::new(CannedTransport::new().respond(200, NOT_FOUND));

        let err = courier(&transport).track("00000000").await.unwrap_err();

        assert_eq!(err, Error::RecordNotFound);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_upstream_error() {
        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, r#"{ "success": false, "obj": null }"#),
        );

        let err = courier(&transport).track("15976967").await.unwrap_err();

        assert_eq!(err, Error::courier_upstream(Carrier::DpdUk));
        assert!(err.to_string().contains("DPD (UK)"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_events_failure_is_upstream_error() {
        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, FOUND)
                .respond(200, r#"{ "success": false }"#),
        );

        let err = courier(&transport).track("15976967").await.unwrap_err();
        assert_eq!(err, Error::courier_upstream(Carrier::DpdUk));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_http_failure_on_either_step_is_server_error() {
        let transport = Arc::new(CannedTransport::new().respond(503, ""));
        let err = courier(&transport).track("15976967").await.unwrap_err();
        assert!(matches!(err, Error::Server { .. }));
        assert_eq!(transport.call_count(), 1);

        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, FOUND)
                .respond(302, ""),
        );
        let err = courier(&transport).track("15976967").await.unwrap_err();
        assert!(matches!(err, Error::Server { .. }));
    }

    #[tokio::test]
    async fn test_repeat_calls_are_identical() {
        let transport = Arc::new(
            CannedTransport::new()
                .respond(200, FOUND)
                .respond(200, EVENTS)
                .respond(200, FOUND)
                .respond(200, EVENTS),
        );
        let courier = courier(&transport);

        let first = courier.track("15976967").await.unwrap();
        let second = courier.track("15976967").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.call_count(), 4);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            parse_parcel_search("<html>denied</html>"),
            Err(Error::MalformedResponse { carrier: Carrier::DpdUk, .. })
        ));
    }

    #[test]
    fn test_missing_session_is_malformed() {
        let body = r#"{ "success": true, "obj": { "totalResults": 1, "parcel": [{ "parcelCode": "X" }] } }"#;
        assert!(matches!(
            parse_parcel_search(body),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_equal_dates_keep_response_order() {
        let body = r#"{ "success": true, "obj": { "trackingEvent": [
            { "trackingEventLocation": "A", "trackingEventStatus": "first", "trackingEventDate": "2024-03-01T09:00:00.000" },
            { "trackingEventLocation": "B", "trackingEventStatus": "second", "trackingEventDate": "2024-03-01T09:00:00.000" }
        ] } }"#;

        let result = parse_delivery(body).unwrap();
        assert_eq!(result.checkpoints[0].message(), "first");
        assert_eq!(result.checkpoints[1].message(), "second");
    }

    #[test]
    fn test_bad_event_date_is_malformed() {
        let body = r#"{ "success": true, "obj": { "trackingEvent": [
            { "trackingEventLocation": "A", "trackingEventStatus": "s", "trackingEventDate": "yesterday" }
        ] } }"#;
        assert!(matches!(parse_delivery(body), Err(Error::MalformedResponse { .. })));
    }
}
