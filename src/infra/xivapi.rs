//! Thin asynchronous client for the XIVAPI v2 search endpoint.
//!
//! - Builds the tiered item-level queries that find turn-in candidates.
//! - Normalizes the duck-typed response fields into `ItemCandidate`.

use std::collections::HashMap;

use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::domain::ItemCandidate;
use crate::infra::cache::{load_candidate_cache, save_candidate_cache, CandidateCache};

const DEFAULT_BASE_URL: &str = "https://v2.xivapi.com/api/";
const USER_AGENT: &str = "seal-scanner/1.0.0";

const SEARCH_FIELDS: &str = "Name,LevelItem,Icon,Rarity,IsUntradable,ItemSearchCategory,EquipSlotCategory";
const RESULTS_PER_RANGE: u32 = 200;
const MAX_ITEM_LEVEL: u16 = 9999;

/// Ishgard Restoration turn-ins occupy gear slots but are not GC-eligible.
const EXCLUDED_NAME_MARKER: &str = "Skybuilders'";

#[derive(Debug, Error)]
pub enum XivApiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Inclusive item-level range for one search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelRange {
    pub min: u16,
    pub max: u16,
}

/// Tiered query ranges. The API caps each query at one page sorted by level
/// descending, so a single open-ended query would return nothing but the
/// newest items; splitting into bands keeps every tier represented.
pub fn level_ranges(min_item_level: u16) -> Vec<LevelRange> {
    if min_item_level <= 1 {
        // Broad sweep across the historical expansion bands.
        vec![
            LevelRange { min: 1, max: 150 },
            LevelRange { min: 151, max: 400 },
            LevelRange { min: 401, max: 630 },
            LevelRange {
                min: 631,
                max: MAX_ITEM_LEVEL,
            },
        ]
    } else {
        vec![
            LevelRange {
                min: min_item_level,
                max: min_item_level.saturating_add(60),
            },
            LevelRange {
                min: min_item_level.saturating_add(61),
                max: min_item_level.saturating_add(150),
            },
            LevelRange {
                min: min_item_level.saturating_add(151),
                max: MAX_ITEM_LEVEL,
            },
        ]
    }
}

#[derive(Clone)]
pub struct XivApiClient {
    http: Client,
    base_url: Url,
}

impl XivApiClient {
    pub fn new() -> Result<Self, XivApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, XivApiError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    /// Find marketable, sufficiently rare equipment at or above
    /// `min_item_level`.
    ///
    /// Serves the on-disk catalog cache when it matches the requested level
    /// and is still fresh. One failed range degrades to an empty slice for
    /// that range only; an empty return means "no candidates", never an
    /// error.
    pub async fn search_candidates(&self, min_item_level: u16) -> Vec<ItemCandidate> {
        if let Some(cache) = load_candidate_cache() {
            if cache.min_item_level == min_item_level && !cache.is_expired() {
                println!(
                    "[xivapi] Using cached catalog ({} items, age: {})",
                    cache.items.len(),
                    cache.age_string()
                );
                return cache.items;
            }
        }

        let ranges = level_ranges(min_item_level);
        println!(
            "[xivapi] Querying {} level ranges for candidates >= {min_item_level}",
            ranges.len()
        );

        let mut requests = JoinSet::new();
        for range in ranges {
            let client = self.clone();
            requests.spawn(async move { client.fetch_range(range).await });
        }

        let mut rows = Vec::new();
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok(Ok(mut range_rows)) => rows.append(&mut range_rows),
                Ok(Err(error)) => {
                    println!("[xivapi] Range request failed: {error}; continuing with the rest.")
                }
                Err(error) => println!("[xivapi] Range task failed to join: {error}"),
            }
        }

        let items = collect_candidates(rows);
        println!("[xivapi] {} eligible candidates after filtering", items.len());

        if !items.is_empty() {
            if let Err(error) =
                save_candidate_cache(&CandidateCache::new(min_item_level, items.clone()))
            {
                println!("[xivapi] Warning: failed to save catalog cache: {error}");
            }
        }

        items
    }

    async fn fetch_range(
        &self,
        range: LevelRange,
    ) -> Result<Vec<(u32, ItemFieldsDto)>, XivApiError> {
        let mut url = self.base_url.join("search")?;
        let query = format!(
            "LevelItem>={} LevelItem<={} IsUntradable=0 Rarity>=2",
            range.min, range.max
        );
        url.query_pairs_mut()
            .append_pair("sheets", "Item")
            .append_pair("query", &query)
            .append_pair("fields", SEARCH_FIELDS)
            .append_pair("limit", &RESULTS_PER_RANGE.to_string())
            .append_pair("sort", "LevelItem")
            .append_pair("order", "desc");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        Ok(parse_search_rows(payload))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponseDto {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemFieldsDto {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "LevelItem", deserialize_with = "level_from_json")]
    level_item: Option<u16>,
    #[serde(rename = "Icon", deserialize_with = "icon_from_json")]
    icon: Option<String>,
    #[serde(rename = "Rarity")]
    rarity: Option<u8>,
    #[serde(rename = "IsUntradable", deserialize_with = "flag_from_json")]
    is_untradable: Option<bool>,
    #[serde(rename = "ItemSearchCategory", deserialize_with = "category_id_from_json")]
    item_search_category: Option<i64>,
    #[serde(rename = "EquipSlotCategory", deserialize_with = "category_id_from_json")]
    equip_slot_category: Option<i64>,
}

/// Merge rows from every range: dedup by row id (duplicate rows across
/// ranges carry identical fields, so later occurrences may overwrite earlier
/// ones), drop ineligible rows, order newest levels first.
fn collect_candidates(rows: Vec<(u32, ItemFieldsDto)>) -> Vec<ItemCandidate> {
    let mut merged: HashMap<u32, ItemCandidate> = HashMap::new();
    for (row_id, fields) in rows {
        if let Some(candidate) = candidate_from_row(row_id, fields) {
            merged.insert(candidate.id, candidate);
        }
    }

    let mut items: Vec<ItemCandidate> = merged.into_values().collect();
    items.sort_by(|a, b| b.item_level.cmp(&a.item_level));
    items
}

fn parse_search_rows(value: serde_json::Value) -> Vec<(u32, ItemFieldsDto)> {
    let Ok(response) = serde_json::from_value::<SearchResponseDto>(value) else {
        return Vec::new();
    };
    response
        .results
        .into_iter()
        .filter_map(parse_search_row)
        .collect()
}

fn parse_search_row(row: serde_json::Value) -> Option<(u32, ItemFieldsDto)> {
    let row_id = row.get("row_id").and_then(serde_json::Value::as_u64)? as u32;
    // Current API versions nest the requested fields under `fields`; older
    // ones flatten them onto the row itself.
    let fields_value = row.get("fields").cloned().unwrap_or(row);
    let fields = serde_json::from_value::<ItemFieldsDto>(fields_value).ok()?;
    Some((row_id, fields))
}

/// Eligibility gate plus final normalization into the domain shape.
fn candidate_from_row(row_id: u32, fields: ItemFieldsDto) -> Option<ItemCandidate> {
    let name = fields.name?;
    let item_level = fields.level_item?;
    let rarity = fields.rarity?;
    // Equipment only; materials and consumables have no equip slot.
    let equip_slot_id = fields.equip_slot_category?;
    let search_category_id = fields.item_search_category.unwrap_or(0);

    if rarity < 2 {
        return None;
    }
    if fields.is_untradable.unwrap_or(false) {
        return None;
    }
    if name.contains(EXCLUDED_NAME_MARKER) {
        return None;
    }
    if search_category_id < 1 {
        return None;
    }

    let icon_path = fields
        .icon
        .as_deref()
        .map(normalize_icon_path)
        .unwrap_or_default();

    Some(ItemCandidate {
        id: row_id,
        name,
        item_level,
        icon_path,
        rarity,
        search_category_id: search_category_id as i32,
        equip_slot_id: equip_slot_id as i32,
    })
}

/// The sheet stores `ui/icon/063000/063945.tex`; the public CDN serves the
/// same image under `/i/063000/063945.png`.
fn normalize_icon_path(raw: &str) -> String {
    raw.replace("ui/icon", "/i").replace(".tex", ".png")
}

/// Accepts `640` as well as `{"value": 640}`.
fn level_from_json<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::Object(map) => map.get("value").and_then(serde_json::Value::as_i64),
        _ => None,
    };
    Ok(number.and_then(|n| u16::try_from(n).ok()))
}

/// Accepts a raw sheet path as well as `{path, path_hr1}`; prefers hi-res.
fn icon_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(path) => Some(path),
        serde_json::Value::Object(map) => map
            .get("path_hr1")
            .or_else(|| map.get("path"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

/// Accepts `true`/`false` as well as `1`/`0`.
fn flag_from_json<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(flag) => Some(flag),
        serde_json::Value::Number(number) => number.as_i64().map(|n| n != 0),
        _ => None,
    })
}

/// Accepts a bare id as well as `{"id": …}` / `{"value": …}` references.
fn category_id_from_json<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match &value {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("value"))
            .and_then(serde_json::Value::as_i64),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn broad_search_uses_four_expansion_bands() {
        for min in [0, 1] {
            let ranges = level_ranges(min);
            assert_eq!(
                ranges,
                vec![
                    LevelRange { min: 1, max: 150 },
                    LevelRange { min: 151, max: 400 },
                    LevelRange { min: 401, max: 630 },
                    LevelRange { min: 631, max: 9999 },
                ]
            );
        }
    }

    #[test]
    fn targeted_search_uses_three_tiers() {
        let ranges = level_ranges(430);
        assert_eq!(
            ranges,
            vec![
                LevelRange { min: 430, max: 490 },
                LevelRange { min: 491, max: 580 },
                LevelRange { min: 581, max: 9999 },
            ]
        );
    }

    fn eligible_fields() -> serde_json::Value {
        json!({
            "Name": "Diadochos Ring of Fending",
            "LevelItem": {"value": 640},
            "Icon": {"path": "ui/icon/063000/063945.tex", "path_hr1": "ui/icon/063000/063945_hr1.tex"},
            "Rarity": 2,
            "IsUntradable": 0,
            "ItemSearchCategory": {"id": 42},
            "EquipSlotCategory": {"id": 12},
        })
    }

    #[test]
    fn parses_nested_and_flattened_rows() {
        let nested = json!({"results": [{"row_id": 39700, "fields": eligible_fields()}]});
        let rows = parse_search_rows(nested);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 39700);

        let mut flattened = eligible_fields();
        flattened["row_id"] = json!(39700);
        let rows = parse_search_rows(json!({"results": [flattened]}));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.level_item, Some(640));
    }

    #[test]
    fn malformed_payload_degrades_to_empty() {
        assert!(parse_search_rows(json!("oops")).is_empty());
        assert!(parse_search_rows(json!({"error": true})).is_empty());
        assert!(parse_search_rows(json!({"results": [{"no_row_id": 1}]})).is_empty());
    }

    #[test]
    fn level_accepts_scalar_and_object_forms() {
        let mut scalar = eligible_fields();
        scalar["LevelItem"] = json!(645);
        let fields: ItemFieldsDto = serde_json::from_value(scalar).unwrap();
        assert_eq!(fields.level_item, Some(645));

        let fields: ItemFieldsDto = serde_json::from_value(eligible_fields()).unwrap();
        assert_eq!(fields.level_item, Some(640));
    }

    #[test]
    fn icon_prefers_hi_res_path() {
        let fields: ItemFieldsDto = serde_json::from_value(eligible_fields()).unwrap();
        assert_eq!(
            fields.icon.as_deref(),
            Some("ui/icon/063000/063945_hr1.tex")
        );

        let mut raw = eligible_fields();
        raw["Icon"] = json!("ui/icon/063000/063945.tex");
        let fields: ItemFieldsDto = serde_json::from_value(raw).unwrap();
        assert_eq!(fields.icon.as_deref(), Some("ui/icon/063000/063945.tex"));
    }

    #[test]
    fn icon_path_is_rewritten_for_the_cdn() {
        assert_eq!(
            normalize_icon_path("ui/icon/063000/063945.tex"),
            "/i/063000/063945.png"
        );
    }

    #[test]
    fn eligible_row_becomes_a_candidate() {
        let fields: ItemFieldsDto = serde_json::from_value(eligible_fields()).unwrap();
        let candidate = candidate_from_row(39700, fields).expect("eligible");
        assert_eq!(candidate.id, 39700);
        assert_eq!(candidate.item_level, 640);
        assert_eq!(candidate.icon_path, "/i/063000/063945_hr1.png");
        assert_eq!(candidate.search_category_id, 42);
    }

    #[test]
    fn duplicate_rows_across_ranges_merge_to_one_candidate() {
        let fields = || serde_json::from_value::<ItemFieldsDto>(eligible_fields()).unwrap();
        let mut low_level = eligible_fields();
        low_level["LevelItem"] = json!({"value": 430});
        let low = serde_json::from_value::<ItemFieldsDto>(low_level).unwrap();

        let items = collect_candidates(vec![(39700, fields()), (12345, low), (39700, fields())]);

        assert_eq!(items.len(), 2);
        // Highest level first.
        assert_eq!(items[0].id, 39700);
        assert_eq!(items[1].id, 12345);
    }

    #[test]
    fn eligibility_filter_rejects_ineligible_rows() {
        let reject = |mutate: fn(&mut serde_json::Value)| {
            let mut raw = eligible_fields();
            mutate(&mut raw);
            let fields: ItemFieldsDto = serde_json::from_value(raw).unwrap();
            candidate_from_row(1, fields)
        };

        assert!(reject(|raw| raw["Rarity"] = json!(1)).is_none());
        assert!(reject(|raw| raw["IsUntradable"] = json!(1)).is_none());
        assert!(reject(|raw| raw["IsUntradable"] = json!(true)).is_none());
        assert!(reject(|raw| raw["Name"] = json!("Grade 4 Skybuilders' Cap")).is_none());
        assert!(reject(|raw| raw["EquipSlotCategory"] = json!(null)).is_none());
        assert!(reject(|raw| raw["ItemSearchCategory"] = json!({"id": 0})).is_none());
    }
}
