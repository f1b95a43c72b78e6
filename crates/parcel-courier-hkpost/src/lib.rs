// # Hong Kong Post Courier
//
// Scrapes the Hong Kong Post mail tracking detail page.
//
// ## Flow
//
// 1. GET `<endpoint>?mail_type=parcel_ouw&tracknbr=<id>&localno=<id>` with
//    redirects disabled. For an unknown number the site redirects to its
//    enquiry page; the 302 fails the shared HTTP check as `Error::Server`.
// 2. Take the LAST `table.detail` on the page. Earlier matches are layout
//    tables; only the last one holds the item history.
// 3. Skip the first row (header). Each remaining row is
//    `date | location | status` and becomes one checkpoint, in page order.
//
// ## Location code
//
// `country_name` is the first letter of each of the first two words of the
// location cell ("Hong Kong" → "HK", "United Kingdom" → "UK"). It is an
// abbreviation, not an ISO lookup. A one-word location yields one letter.

use async_trait::async_trait;
use parcel_core::config::TrackerConfig;
use parcel_core::registry::CourierRegistry;
use parcel_core::timestamp;
use parcel_core::traits::{Courier, CourierFactory, HttpRequest, HttpTransport, check_http};
use parcel_core::{Carrier, Checkpoint, Error, Result, TrackingResult};
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

/// Mail type selecting the outward parcel lookup
const MAIL_TYPE: &str = "parcel_ouw";

/// Hong Kong Post courier
pub struct HkPostCourier {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

impl HkPostCourier {
    /// Create a Hong Kong Post courier against `endpoint`
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    fn build_request(&self, tracking_number: &str) -> HttpRequest {
        HttpRequest::get(&self.endpoint)
            .query("mail_type", MAIL_TYPE)
            .query("tracknbr", tracking_number)
            .query("localno", tracking_number)
            .no_redirects()
    }
}

#[async_trait]
impl Courier for HkPostCourier {
    async fn track(&self, tracking_number: &str) -> Result<TrackingResult> {
        tracing::info!("Start hkpost: {}", tracking_number);

        let request = self.build_request(tracking_number);
        let body = check_http(self.transport.get(&request).await)?;

        parse_page(&body)
    }

    fn carrier(&self) -> Carrier {
        Carrier::HkPost
    }
}

/// One history row, as text
#[derive(Debug)]
struct DetailRow {
    date: String,
    location: String,
    status: String,
}

/// Parse the detail page into checkpoints, in row order
pub fn parse_page(body: &str) -> Result<TrackingResult> {
    let rows = read_detail_rows(body)?;
    tracing::debug!("Hong Kong Post detail table has {} row(s)", rows.len());

    let checkpoints = rows
        .into_iter()
        .map(|row| {
            let time = timestamp::parse_loose(&row.date)
                .ok_or_else(|| malformed(format!("unparseable date '{}'", row.date)))?;
            Ok(Checkpoint::new(abbreviate_location(&row.location), row.status, time))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrackingResult::new(checkpoints))
}

fn read_detail_rows(body: &str) -> Result<Vec<DetailRow>> {
    let document = Html::parse_document(body);
    let table_sel = selector("table.detail")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .last()
        .ok_or_else(|| malformed("no detail table on page"))?;

    table
        .select(&row_sel)
        .skip(1)
        .enumerate()
        .map(|(index, row)| {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
            if cells.len() < 3 {
                return Err(malformed(format!(
                    "detail row {} has {} cell(s), expected 3",
                    index + 1,
                    cells.len()
                )));
            }
            Ok(DetailRow {
                date: cell_text(&cells[0]),
                location: cell_text(&cells[1]),
                status: cell_text(&cells[2]),
            })
        })
        .collect()
}

/// First letters of the first two whitespace-separated words
fn abbreviate_location(location: &str) -> String {
    location
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .collect()
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Other(format!("invalid selector '{}': {}", css, e)))
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::malformed(Carrier::HkPost, reason)
}

/// Factory for creating Hong Kong Post couriers
pub struct HkPostFactory;

impl CourierFactory for HkPostFactory {
    fn create(
        &self,
        config: &TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Box<dyn Courier>> {
        if config.endpoints.hkpost.is_empty() {
            return Err(Error::config("Hong Kong Post endpoint is required"));
        }
        Ok(Box::new(HkPostCourier::new(
            config.endpoints.hkpost.clone(),
            transport,
        )))
    }
}

/// Register the Hong Kong Post courier with a registry
pub fn register(registry: &CourierRegistry) {
    registry.register_courier(Carrier::HkPost, Box::new(HkPostFactory));
}
