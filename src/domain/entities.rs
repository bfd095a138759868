#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An item eligible for Expert Delivery, as resolved by the candidate search.
///
/// Immutable once produced; the raw API quirks (object-or-scalar fields) are
/// normalized away before this type is constructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemCandidate {
    pub id: u32,
    pub name: String,
    pub item_level: u16,
    /// Normalized icon path, e.g. `/i/063000/063945.png`.
    pub icon_path: String,
    pub rarity: u8,
    pub search_category_id: i32,
    pub equip_slot_id: i32,
}

/// A single marketboard listing, supplied verbatim by Universalis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    pub price_per_unit: u32,
    pub quantity: u32,
    pub hq: bool,
    /// Present on data-center-wide queries; absent when a single world was
    /// queried.
    pub world_name: Option<String>,
}

/// Listings for one item, merged across fetch batches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemMarketData {
    /// Price-ascending, as delivered by the API.
    pub listings: Vec<MarketListing>,
    /// Total units on the board across both qualities.
    pub units_for_sale: u32,
}

/// One snapshot per scan; discarded and replaced by the next scan.
pub type MarketSnapshot = HashMap<u32, ItemMarketData>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QualityFilter {
    #[default]
    Any,
    NormalOnly,
    HighQualityOnly,
}

impl QualityFilter {
    /// True if a listing of the given quality passes this filter.
    pub fn accepts(&self, hq: bool) -> bool {
        match self {
            QualityFilter::Any => true,
            QualityFilter::NormalOnly => !hq,
            QualityFilter::HighQualityOnly => hq,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityFilter::Any => "Any",
            QualityFilter::NormalOnly => "NQ only",
            QualityFilter::HighQualityOnly => "HQ only",
        }
    }
}

/// User-supplied thresholds applied by the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct DealFilters {
    pub min_stock: u32,
    pub quality: QualityFilter,
    pub min_seals: u32,
    pub min_efficiency: f64,
    pub favorites_only: bool,
}

impl Default for DealFilters {
    fn default() -> Self {
        Self {
            min_stock: 1,
            quality: QualityFilter::default(),
            min_seals: 0,
            min_efficiency: 0.0,
            favorites_only: false,
        }
    }
}

/// A candidate that survived every filter, with its derived metrics.
///
/// Computed once per scan and only ever reordered afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedDeal {
    pub item_id: u32,
    pub name: String,
    pub item_level: u16,
    pub icon_path: String,
    /// World of the chosen listing, or the queried location when the listing
    /// carried no world of its own.
    pub world: String,
    pub hq: bool,
    pub price: u32,
    /// Units available at exactly `price` on the displayed world.
    pub stock_at_price: u32,
    /// Units of matching quality across the whole queried location.
    pub total_stock: u32,
    pub seals: u32,
    pub fc_points: u32,
    pub efficiency: f64,
}
