// # USPS Courier
//
// Tracks parcels through the USPS Web Tools TrackV2 API.
//
// ## Flow
//
// 1. GET `<endpoint>?API=TrackV2&XML=<TrackFieldRequest .../>`
// 2. Shared HTTP check (connection error or non-200 → `Error::Server`)
// 3. `<Error>` anywhere in the response:
//    - Description "No record of that item" → `Error::RecordNotFound`
//    - anything else → `Error::CourierUpstream(USPS)`
// 4. Otherwise read `TrackSummary` and emit exactly one checkpoint
//
// Only the summary event is used; `TrackDetail` history is ignored.
//
// ## API Reference
//
// The `TrackRequest` tag shown on the USPS website is misleading;
// `TrackFieldRequest` (from the Track and Confirm PDF) is what returns
// the `TrackSummary` fields used here.

use async_trait::async_trait;
use parcel_core::config::TrackerConfig;
use parcel_core::registry::CourierRegistry;
use parcel_core::timestamp;
use parcel_core::traits::{Courier, CourierFactory, HttpRequest, HttpTransport, check_http};
use parcel_core::{Carrier, Checkpoint, Error, Result, TrackingResult};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use std::sync::Arc;

/// Web Tools requester id sent with every request
pub const USPS_USER_ID: &str = "754REDBI4747";

/// Description USPS uses for an unknown tracking number
const NO_RECORD_DESCRIPTION: &str = "No record of that item";

/// USPS courier
pub struct UspsCourier {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

impl UspsCourier {
    /// Create a USPS courier against `endpoint`
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    fn build_request(&self, tracking_number: &str) -> HttpRequest {
        let xml = format!(
            r#"<TrackFieldRequest USERID="{}"><TrackID ID="{}"></TrackID></TrackFieldRequest>"#,
            USPS_USER_ID,
            escape(tracking_number)
        );

        HttpRequest::get(&self.endpoint)
            .query("API", "TrackV2")
            .query("XML", xml)
    }
}

#[async_trait]
impl Courier for UspsCourier {
    async fn track(&self, tracking_number: &str) -> Result<TrackingResult> {
        tracing::info!("Start usps: {}", tracking_number);

        let request = self.build_request(tracking_number);
        let body = check_http(self.transport.get(&request).await)?;

        parse_response(&body)
    }

    fn carrier(&self) -> Carrier {
        Carrier::Usps
    }
}

/// Raw `TrackSummary` fields, as text
#[derive(Debug, Default)]
struct TrackSummary {
    event_time: Option<String>,
    event_date: Option<String>,
    event: Option<String>,
    event_country: Option<String>,
}

impl TrackSummary {
    fn field_mut(&mut self, tag: &str) -> Option<&mut Option<String>> {
        match tag {
            "EventTime" => Some(&mut self.event_time),
            "EventDate" => Some(&mut self.event_date),
            "Event" => Some(&mut self.event),
            "EventCountry" => Some(&mut self.event_country),
            _ => None,
        }
    }
}

/// What a TrackV2 response says, before conversion
#[derive(Debug)]
enum TrackResponse {
    /// An `<Error>` element was present
    Error { description: Option<String> },
    /// No error; summary may be absent
    Summary(Option<TrackSummary>),
}

/// Parse a TrackV2 response body into a single-checkpoint result
pub fn parse_response(body: &str) -> Result<TrackingResult> {
    match read_response(body)? {
        TrackResponse::Error { description } => {
            if description.as_deref() == Some(NO_RECORD_DESCRIPTION) {
                tracing::debug!("USPS reports no record");
                Err(Error::RecordNotFound)
            } else {
                tracing::warn!("USPS error: {}", description.unwrap_or_default());
                Err(Error::courier_upstream(Carrier::Usps))
            }
        }
        TrackResponse::Summary(None) => Err(malformed("missing TrackSummary")),
        TrackResponse::Summary(Some(summary)) => {
            let event_date = required(summary.event_date, "EventDate")?;
            let event_time = required(summary.event_time, "EventTime")?;
            let event = required(summary.event, "Event")?;
            let event_country = required(summary.event_country, "EventCountry")?;

            let moment = format!("{} {}", event_date, event_time);
            let time = timestamp::parse_loose(&moment)
                .ok_or_else(|| malformed(format!("unparseable event time '{}'", moment.trim())))?;

            Ok(TrackingResult::new(vec![Checkpoint::new(
                event_country,
                event,
                time,
            )]))
        }
    }
}

/// Walk the markup once, picking out the error and the first summary
fn read_response(body: &str) -> Result<TrackResponse> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut saw_error = false;
    let mut description: Option<String> = None;
    let mut summary: Option<TrackSummary> = None;
    let mut summary_closed = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "Error" => saw_error = true,
                    "TrackSummary" if summary.is_none() => summary = Some(TrackSummary::default()),
                    _ => {}
                }
                path.push(name);
                open_summary_field(&path, summary_closed, &mut summary);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "Error" {
                    saw_error = true;
                }
                path.push(name);
                open_summary_field(&path, summary_closed, &mut summary);
                path.pop();
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("TrackSummary") {
                    summary_closed = true;
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| malformed(format!("XML parse error: {}", e)))?;
                collect_text(&path, &text, summary_closed, &mut description, &mut summary);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).to_string();
                collect_text(&path, &text, summary_closed, &mut description, &mut summary);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(format!("XML parse error: {}", e))),
            _ => {}
        }
    }

    if saw_error {
        Ok(TrackResponse::Error { description })
    } else {
        Ok(TrackResponse::Summary(summary))
    }
}

/// Mark a summary field as present (possibly empty) when its tag opens
fn open_summary_field(path: &[String], summary_closed: bool, summary: &mut Option<TrackSummary>) {
    if summary_closed || !inside(path, "TrackSummary") {
        return;
    }
    if let (Some(tag), Some(summary)) = (path.last(), summary.as_mut()) {
        if let Some(field) = summary.field_mut(tag) {
            field.get_or_insert_with(String::new);
        }
    }
}

fn collect_text(
    path: &[String],
    text: &str,
    summary_closed: bool,
    description: &mut Option<String>,
    summary: &mut Option<TrackSummary>,
) {
    let Some(tag) = path.last() else {
        return;
    };

    if tag == "Description" && inside(path, "Error") {
        description.get_or_insert_with(String::new).push_str(text);
        return;
    }

    if !summary_closed && inside(path, "TrackSummary") {
        if let Some(field) = summary.as_mut().and_then(|s| s.field_mut(tag)) {
            field.get_or_insert_with(String::new).push_str(text);
        }
    }
}

fn inside(path: &[String], ancestor: &str) -> bool {
    path.iter().any(|segment| segment == ancestor)
}

fn required(field: Option<String>, tag: &str) -> Result<String> {
    field.ok_or_else(|| malformed(format!("missing TrackSummary/{}", tag)))
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::malformed(Carrier::Usps, reason)
}

/// Factory for creating USPS couriers
pub struct UspsFactory;

impl CourierFactory for UspsFactory {
    fn create(
        &self,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>> {
        if config.endpoints.usps.is_empty() {
            return Err(Error::config("USPS endpoint is required"));
        }
        Ok(Box::new(UspsCourier::new(config.endpoints.usps.clone(), transport)))
    }
}

/// Register the USPS courier with a registry
///
/// # Example
///
/// ```rust
/// use parcel_core::{Carrier, CourierRegistry};
///
/// let registry = CourierRegistry::new();
/// parcel_courier_usps::register(&registry);
/// assert!(registry.has_courier(Carrier::Usps));
/// ```
pub fn register(registry: &CourierRegistry) {
    registry.register_courier(Carrier::Usps, Box::new(UspsFactory));
}
