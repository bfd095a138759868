//! Deal evaluation: seal yields, stock math and the rejection funnel.

use std::collections::HashSet;

use super::entities::{DealFilters, EvaluatedDeal, ItemCandidate, MarketSnapshot};

/// Grand Company seals granted for turning in one NQ item of the given level.
///
/// Piecewise-linear fit reverse-engineered from turn-in tables. The
/// breakpoints, the strict upper-bound comparisons and the per-band rounding
/// modes all matter; the bands were fitted independently and do not agree at
/// their seams.
pub fn seal_value(item_level: u16) -> u32 {
    let level = f64::from(item_level);
    if item_level > 660 {
        (level + 1339.0).floor() as u32
    } else if item_level > 530 {
        (1.6667 * level + 895.0).ceil() as u32
    } else if item_level > 400 {
        (1.75 * level + 850.5).ceil() as u32
    } else if item_level > 290 {
        (3.5 * level).floor() as u32
    } else {
        (2.5 * level).floor() as u32
    }
}

/// Free Company credits for the same turn-in. Doubled for HQ items.
pub fn fc_points(item_level: u16, hq: bool) -> u32 {
    let base = (1.5 * f64::from(item_level)).floor() as u32;
    if hq {
        base * 2
    } else {
        base
    }
}

/// Why a candidate was dropped. Every rejected candidate counts under the
/// first check it failed, so the tally buckets are disjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RejectReason {
    NoMarketData,
    NoPrice,
    QualityMismatch,
    LowStock,
    LowSeals,
    LowEfficiency,
    NotFavorite,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionTally {
    pub no_market_data: u32,
    pub no_price: u32,
    pub quality_mismatch: u32,
    pub low_stock: u32,
    pub low_seals: u32,
    pub low_efficiency: u32,
    pub not_favorite: u32,
}

impl RejectionTally {
    fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::NoMarketData => self.no_market_data += 1,
            RejectReason::NoPrice => self.no_price += 1,
            RejectReason::QualityMismatch => self.quality_mismatch += 1,
            RejectReason::LowStock => self.low_stock += 1,
            RejectReason::LowSeals => self.low_seals += 1,
            RejectReason::LowEfficiency => self.low_efficiency += 1,
            RejectReason::NotFavorite => self.not_favorite += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.no_market_data
            + self.no_price
            + self.quality_mismatch
            + self.low_stock
            + self.low_seals
            + self.low_efficiency
            + self.not_favorite
    }

    /// Human-readable breakdown for the "all results hidden" status line.
    pub fn reasons(&self) -> Vec<String> {
        let buckets = [
            (self.no_market_data, "no market data"),
            (self.no_price, "missing a price"),
            (self.quality_mismatch, "wrong quality"),
            (self.low_stock, "low stock"),
            (self.low_seals, "low seal yield"),
            (self.low_efficiency, "poor efficiency"),
            (self.not_favorite, "not in favorites"),
        ];
        buckets
            .into_iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect()
    }
}

pub struct DealReport {
    pub deals: Vec<EvaluatedDeal>,
    pub tally: RejectionTally,
    pub candidates_considered: usize,
}

/// Run every candidate through the filter funnel against the given snapshot.
///
/// `fallback_world` names the queried location and stands in for listings
/// that carry no world of their own (single-world queries omit it).
pub fn evaluate_deals(
    candidates: &[ItemCandidate],
    snapshot: &MarketSnapshot,
    filters: &DealFilters,
    favorites: &HashSet<u32>,
    fallback_world: &str,
) -> DealReport {
    let mut deals = Vec::new();
    let mut tally = RejectionTally::default();

    for candidate in candidates {
        match evaluate_candidate(candidate, snapshot, filters, favorites, fallback_world) {
            Ok(deal) => deals.push(deal),
            Err(reason) => tally.record(reason),
        }
    }

    DealReport {
        deals,
        tally,
        candidates_considered: candidates.len(),
    }
}

fn evaluate_candidate(
    candidate: &ItemCandidate,
    snapshot: &MarketSnapshot,
    filters: &DealFilters,
    favorites: &HashSet<u32>,
    fallback_world: &str,
) -> Result<EvaluatedDeal, RejectReason> {
    let data = snapshot
        .get(&candidate.id)
        .filter(|data| !data.listings.is_empty())
        .ok_or(RejectReason::NoMarketData)?;

    // Listings arrive price-ascending, so the first one is the cheapest.
    let chosen = &data.listings[0];
    if chosen.price_per_unit == 0 {
        return Err(RejectReason::NoPrice);
    }

    let hq = chosen.hq;
    if !filters.quality.accepts(hq) {
        return Err(RejectReason::QualityMismatch);
    }

    // Stock of matching quality anywhere in the queried location. World
    // identity is deliberately ignored here: strict world matching produced
    // false "0 results" whenever listings arrived without a world name.
    let total_stock: u32 = data
        .listings
        .iter()
        .filter(|listing| filters.quality.accepts(listing.hq))
        .map(|listing| listing.quantity)
        .sum();
    if total_stock < filters.min_stock {
        return Err(RejectReason::LowStock);
    }

    let world = chosen
        .world_name
        .clone()
        .unwrap_or_else(|| fallback_world.to_string());

    // Units at exactly the chosen price, same quality, same world when the
    // listing names one.
    let stock_at_price: u32 = data
        .listings
        .iter()
        .filter(|listing| {
            listing.price_per_unit == chosen.price_per_unit
                && listing.hq == hq
                && listing
                    .world_name
                    .as_deref()
                    .map(|name| name == world)
                    .unwrap_or(true)
        })
        .map(|listing| listing.quantity)
        .sum();

    let mut seals = seal_value(candidate.item_level);
    if hq {
        seals *= 2;
    }
    if seals < filters.min_seals {
        return Err(RejectReason::LowSeals);
    }

    let efficiency = f64::from(seals) / f64::from(chosen.price_per_unit);
    if efficiency < filters.min_efficiency {
        return Err(RejectReason::LowEfficiency);
    }

    if filters.favorites_only && !favorites.contains(&candidate.id) {
        return Err(RejectReason::NotFavorite);
    }

    Ok(EvaluatedDeal {
        item_id: candidate.id,
        name: candidate.name.clone(),
        item_level: candidate.item_level,
        icon_path: candidate.icon_path.clone(),
        world,
        hq,
        price: chosen.price_per_unit,
        stock_at_price,
        total_stock,
        seals,
        fc_points: fc_points(candidate.item_level, hq),
        efficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ItemMarketData, MarketListing, QualityFilter};

    fn candidate(id: u32, item_level: u16) -> ItemCandidate {
        ItemCandidate {
            id,
            name: format!("Test Item {id}"),
            item_level,
            icon_path: "/i/063000/063945.png".to_string(),
            rarity: 2,
            search_category_id: 34,
            equip_slot_id: 12,
        }
    }

    fn listing(price: u32, quantity: u32, hq: bool, world: Option<&str>) -> MarketListing {
        MarketListing {
            price_per_unit: price,
            quantity,
            hq,
            world_name: world.map(str::to_string),
        }
    }

    fn snapshot_with(id: u32, listings: Vec<MarketListing>) -> MarketSnapshot {
        let units_for_sale = listings.iter().map(|l| l.quantity).sum();
        MarketSnapshot::from([(
            id,
            ItemMarketData {
                listings,
                units_for_sale,
            },
        )])
    }

    #[test]
    fn seal_value_respects_band_boundaries() {
        // Top band starts strictly above 660.
        assert_eq!(seal_value(661), 2000);
        assert_eq!(seal_value(660), 1996);
        // 530/531 seam between the 1.75 and 1.6667 bands.
        assert_eq!(seal_value(531), 1781);
        assert_eq!(seal_value(530), 1778);
        // 400/401 seam; 400 still belongs to the 3.5 band.
        assert_eq!(seal_value(401), 1553);
        assert_eq!(seal_value(400), 1400);
        // 290/291 seam into the low-level fallback.
        assert_eq!(seal_value(291), 1018);
        assert_eq!(seal_value(290), 725);
    }

    #[test]
    fn fc_points_double_on_hq() {
        assert_eq!(fc_points(640, false), 960);
        assert_eq!(fc_points(640, true), 1920);
    }

    #[test]
    fn single_candidate_end_to_end() {
        let candidates = vec![candidate(1, 640)];
        let snapshot = snapshot_with(1, vec![listing(1000, 5, false, None)]);
        let filters = DealFilters::default();

        let report = evaluate_deals(&candidates, &snapshot, &filters, &HashSet::new(), "Light");

        assert_eq!(report.deals.len(), 1);
        let deal = &report.deals[0];
        assert_eq!(deal.seals, 1962);
        assert!((deal.efficiency - 1.962).abs() < 1e-9);
        assert_eq!(deal.stock_at_price, 5);
        assert_eq!(deal.total_stock, 5);
        assert_eq!(deal.world, "Light");
        assert_eq!(report.tally.total(), 0);
    }

    #[test]
    fn hq_listing_doubles_seals() {
        let candidates = vec![candidate(1, 640)];
        let snapshot = snapshot_with(1, vec![listing(1000, 1, true, Some("Odin"))]);

        let report = evaluate_deals(
            &candidates,
            &snapshot,
            &DealFilters::default(),
            &HashSet::new(),
            "Light",
        );

        let deal = &report.deals[0];
        assert_eq!(deal.seals, 3924);
        assert_eq!(deal.fc_points, 1920);
        assert_eq!(deal.world, "Odin");
    }

    #[test]
    fn missing_or_empty_listings_count_as_no_market_data() {
        let candidates = vec![candidate(1, 640), candidate(2, 640)];
        let snapshot = snapshot_with(2, Vec::new());

        let report = evaluate_deals(
            &candidates,
            &snapshot,
            &DealFilters::default(),
            &HashSet::new(),
            "Light",
        );

        assert!(report.deals.is_empty());
        assert_eq!(report.tally.no_market_data, 2);
    }

    #[test]
    fn first_failing_filter_wins_the_tally() {
        // Fails both the stock and the efficiency checks; only low_stock may
        // be counted.
        let candidates = vec![candidate(1, 640)];
        let snapshot = snapshot_with(1, vec![listing(1_000_000, 1, false, None)]);
        let filters = DealFilters {
            min_stock: 10,
            min_efficiency: 5.0,
            ..DealFilters::default()
        };

        let report = evaluate_deals(&candidates, &snapshot, &filters, &HashSet::new(), "Light");

        assert_eq!(report.tally.low_stock, 1);
        assert_eq!(report.tally.low_efficiency, 0);
        assert_eq!(report.tally.total(), 1);
    }

    #[test]
    fn quality_filter_rejects_mismatched_cheapest_listing() {
        let candidates = vec![candidate(1, 640)];
        let snapshot = snapshot_with(
            1,
            vec![listing(500, 1, true, None), listing(900, 4, false, None)],
        );
        let filters = DealFilters {
            quality: QualityFilter::NormalOnly,
            ..DealFilters::default()
        };

        let report = evaluate_deals(&candidates, &snapshot, &filters, &HashSet::new(), "Light");

        assert!(report.deals.is_empty());
        assert_eq!(report.tally.quality_mismatch, 1);
    }

    #[test]
    fn total_stock_ignores_world_but_honors_quality() {
        let candidates = vec![candidate(1, 640)];
        let snapshot = snapshot_with(
            1,
            vec![
                listing(1000, 2, false, Some("Odin")),
                listing(1000, 3, false, Some("Shiva")),
                listing(1200, 4, true, Some("Odin")),
            ],
        );
        let filters = DealFilters {
            quality: QualityFilter::NormalOnly,
            ..DealFilters::default()
        };

        let report = evaluate_deals(&candidates, &snapshot, &filters, &HashSet::new(), "Light");

        let deal = &report.deals[0];
        // HQ units are excluded; the Shiva units still count toward the
        // location-wide total but not toward the per-world cheapest stack.
        assert_eq!(deal.total_stock, 5);
        assert_eq!(deal.stock_at_price, 2);
        assert!(deal.stock_at_price <= deal.total_stock);
    }

    #[test]
    fn favorites_only_keeps_favorites() {
        let candidates = vec![candidate(1, 640), candidate(2, 640)];
        let mut snapshot = snapshot_with(1, vec![listing(1000, 5, false, None)]);
        snapshot.extend(snapshot_with(2, vec![listing(1000, 5, false, None)]));
        let filters = DealFilters {
            favorites_only: true,
            ..DealFilters::default()
        };
        let favorites = HashSet::from([2]);

        let report = evaluate_deals(&candidates, &snapshot, &filters, &favorites, "Light");

        assert_eq!(report.deals.len(), 1);
        assert_eq!(report.deals[0].item_id, 2);
        assert_eq!(report.tally.not_favorite, 1);
    }

    #[test]
    fn tally_reasons_enumerate_only_nonzero_buckets() {
        let mut tally = RejectionTally::default();
        tally.record(RejectReason::LowStock);
        tally.record(RejectReason::LowStock);
        tally.record(RejectReason::NoMarketData);

        assert_eq!(
            tally.reasons(),
            vec!["1 no market data".to_string(), "2 low stock".to_string()]
        );
    }
}
