//! Thin asynchronous client for the Universalis market API.
//!
//! Item ids are batched and the batches are walked strictly sequentially
//! with a short pause between requests; Universalis rate-limits burst
//! traffic aggressively.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;

use crate::domain::{ItemMarketData, MarketListing, MarketSnapshot};

const DEFAULT_BASE_URL: &str = "https://universalis.app/api/v2/";
const USER_AGENT: &str = "seal-scanner/1.0.0";

/// 50 six-digit ids plus separators stay far below common URL length limits.
const BATCH_SIZE: usize = 50;
const BATCH_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum UniversalisError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct UniversalisClient {
    http: Client,
    base_url: Url,
}

impl UniversalisClient {
    pub fn new() -> Result<Self, UniversalisError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, UniversalisError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    /// Fetch current listings for `item_ids` on a world or data center.
    ///
    /// `on_progress` receives the cumulative percentage once per batch,
    /// strictly increasing and ending at exactly 100. A failed batch is
    /// logged and contributes nothing; the remaining batches still run. An
    /// empty id list returns an empty snapshot without touching the network.
    pub async fn fetch_market_data(
        &self,
        location: &str,
        item_ids: &[u32],
        listing_limit: u32,
        mut on_progress: impl FnMut(u8),
    ) -> MarketSnapshot {
        let batches = chunk_ids(item_ids);
        if batches.is_empty() {
            return MarketSnapshot::new();
        }

        let total = batches.len();
        let mut snapshot = MarketSnapshot::new();

        for (index, batch) in batches.into_iter().enumerate() {
            match self.fetch_batch(location, &batch, listing_limit).await {
                Ok(items) => snapshot.extend(items),
                Err(error) => println!(
                    "[universalis] Batch {}/{total} failed: {error}; continuing.",
                    index + 1
                ),
            }

            on_progress(progress_percent(index + 1, total));

            // Stay polite regardless of outcome; bursts earn 429s.
            sleep(BATCH_DELAY).await;
        }

        snapshot
    }

    async fn fetch_batch(
        &self,
        location: &str,
        batch: &[u32],
        listing_limit: u32,
    ) -> Result<MarketSnapshot, UniversalisError> {
        let ids = batch
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut url = self.base_url.join(&format!("{location}/{ids}"))?;
        url.query_pairs_mut()
            .append_pair("listings", &listing_limit.to_string())
            .append_pair("entries", "0");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        Ok(parse_market_payload(payload))
    }
}

/// Fixed-size batches, preserving input order.
fn chunk_ids(item_ids: &[u32]) -> Vec<Vec<u32>> {
    item_ids.chunks(BATCH_SIZE).map(<[u32]>::to_vec).collect()
}

/// Cumulative progress after `completed` of `total` batches, rounded.
fn progress_percent(completed: usize, total: usize) -> u8 {
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

#[derive(Debug, Deserialize)]
struct MultiItemResponseDto {
    items: HashMap<String, ItemMarketDataDto>,
}

#[derive(Debug, Deserialize)]
struct SingleItemResponseDto {
    #[serde(rename = "itemID")]
    item_id: u32,
    #[serde(flatten)]
    data: ItemMarketDataDto,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemMarketDataDto {
    listings: Vec<ListingDto>,
    #[serde(rename = "unitsForSale")]
    units_for_sale: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListingDto {
    #[serde(rename = "pricePerUnit")]
    price_per_unit: u32,
    quantity: u32,
    hq: bool,
    #[serde(rename = "worldName")]
    world_name: Option<String>,
}

impl Default for ListingDto {
    fn default() -> Self {
        Self {
            price_per_unit: 0,
            quantity: 0,
            hq: false,
            world_name: None,
        }
    }
}

impl From<ListingDto> for MarketListing {
    fn from(dto: ListingDto) -> Self {
        Self {
            price_per_unit: dto.price_per_unit,
            quantity: dto.quantity,
            hq: dto.hq,
            world_name: dto.world_name,
        }
    }
}

impl From<ItemMarketDataDto> for ItemMarketData {
    fn from(dto: ItemMarketDataDto) -> Self {
        Self {
            listings: dto.listings.into_iter().map(MarketListing::from).collect(),
            units_for_sale: dto.units_for_sale,
        }
    }
}

/// Universalis answers multi-item requests with an `items` map but inlines a
/// lone item at the top level; fold both shapes into one mapping.
fn parse_market_payload(value: serde_json::Value) -> MarketSnapshot {
    if let Ok(response) = serde_json::from_value::<MultiItemResponseDto>(value.clone()) {
        return response
            .items
            .into_iter()
            .filter_map(|(id, dto)| {
                id.parse::<u32>()
                    .ok()
                    .map(|id| (id, ItemMarketData::from(dto)))
            })
            .collect();
    }

    if let Ok(response) = serde_json::from_value::<SingleItemResponseDto>(value) {
        return MarketSnapshot::from([(response.item_id, ItemMarketData::from(response.data))]);
    }

    MarketSnapshot::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batches_are_ceil_of_n_over_fifty() {
        assert!(chunk_ids(&[]).is_empty());
        assert_eq!(chunk_ids(&[1]).len(), 1);
        assert_eq!(chunk_ids(&(1..=50).collect::<Vec<_>>()).len(), 1);
        assert_eq!(chunk_ids(&(1..=51).collect::<Vec<_>>()).len(), 2);
        assert_eq!(chunk_ids(&(1..=120).collect::<Vec<_>>()).len(), 3);
    }

    #[test]
    fn batches_preserve_input_order() {
        let ids: Vec<u32> = (1..=120).collect();
        let flattened: Vec<u32> = chunk_ids(&ids).into_iter().flatten().collect();
        assert_eq!(flattened, ids);
    }

    #[test]
    fn progress_is_strictly_increasing_and_ends_at_100() {
        for total in [1usize, 3, 7, 16] {
            let reported: Vec<u8> = (1..=total)
                .map(|completed| progress_percent(completed, total))
                .collect();
            assert!(
                reported.windows(2).all(|pair| pair[0] < pair[1]),
                "not increasing for {total} batches: {reported:?}"
            );
            assert_eq!(*reported.last().unwrap(), 100);
            assert_eq!(reported.len(), total);
        }
    }

    #[tokio::test]
    async fn empty_id_list_skips_the_network_and_progress() {
        let client = UniversalisClient::new().expect("client");
        let mut progress_calls = 0;
        let snapshot = client
            .fetch_market_data("Light", &[], 10, |_| progress_calls += 1)
            .await;
        assert!(snapshot.is_empty());
        assert_eq!(progress_calls, 0);
    }

    #[test]
    fn parses_multi_item_payload() {
        let payload = json!({
            "items": {
                "39700": {
                    "listings": [
                        {"pricePerUnit": 1000, "quantity": 2, "hq": false, "worldName": "Odin"}
                    ],
                    "unitsForSale": 2
                }
            },
            "unresolvedItems": []
        });

        let snapshot = parse_market_payload(payload);
        let data = snapshot.get(&39700).expect("item present");
        assert_eq!(data.listings.len(), 1);
        assert_eq!(data.listings[0].price_per_unit, 1000);
        assert_eq!(data.listings[0].world_name.as_deref(), Some("Odin"));
        assert_eq!(data.units_for_sale, 2);
    }

    #[test]
    fn parses_flat_single_item_payload() {
        let payload = json!({
            "itemID": 42942,
            "listings": [
                {"pricePerUnit": 800, "quantity": 1, "hq": true}
            ],
            "unitsForSale": 1
        });

        let snapshot = parse_market_payload(payload);
        let data = snapshot.get(&42942).expect("item present");
        assert!(data.listings[0].hq);
        assert_eq!(data.listings[0].world_name, None);
    }

    #[test]
    fn unrecognized_payload_degrades_to_empty_snapshot() {
        assert!(parse_market_payload(json!({"error": "not found"})).is_empty());
        assert!(parse_market_payload(json!([1, 2, 3])).is_empty());
    }
}
