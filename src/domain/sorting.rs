//! Column ordering for the results table.

use std::cmp::Ordering;

use super::entities::EvaluatedDeal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    ItemLevel,
    World,
    Quality,
    Price,
    Stock,
    Seals,
    FcPoints,
    Efficiency,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Item",
            Self::ItemLevel => "iLvl",
            Self::World => "World",
            Self::Quality => "HQ",
            Self::Price => "Price",
            Self::Stock => "Stock",
            Self::Seals => "Seals",
            Self::FcPoints => "FC Pts",
            Self::Efficiency => "Efficiency",
        }
    }

    /// Text columns read naturally smallest-first.
    fn defaults_ascending(self) -> bool {
        matches!(self, Self::Name | Self::World)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Efficiency,
            descending: true,
        }
    }
}

impl SortState {
    /// Clicking the active column flips its direction; a new column starts
    /// descending, except Name and World which start ascending.
    pub fn toggled(self, column: SortColumn) -> SortState {
        if self.column == column {
            SortState {
                column,
                descending: !self.descending,
            }
        } else {
            SortState {
                column,
                descending: !column.defaults_ascending(),
            }
        }
    }
}

/// Reorder in place. Stable, so equal keys keep their previous order.
pub fn sort_deals(deals: &mut [EvaluatedDeal], sort: SortState) {
    deals.sort_by(|a, b| {
        let ord = match sort.column {
            SortColumn::Name => cmp_text(&a.name, &b.name),
            SortColumn::ItemLevel => a.item_level.cmp(&b.item_level),
            SortColumn::World => cmp_text(&a.world, &b.world),
            SortColumn::Quality => a.hq.cmp(&b.hq),
            SortColumn::Price => a.price.cmp(&b.price),
            SortColumn::Stock => a.stock_at_price.cmp(&b.stock_at_price),
            SortColumn::Seals => a.seals.cmp(&b.seals),
            SortColumn::FcPoints => a.fc_points.cmp(&b.fc_points),
            SortColumn::Efficiency => a
                .efficiency
                .partial_cmp(&b.efficiency)
                .unwrap_or(Ordering::Equal),
        };
        if sort.descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(name: &str, world: &str, price: u32, efficiency: f64) -> EvaluatedDeal {
        EvaluatedDeal {
            item_id: 1,
            name: name.to_string(),
            item_level: 640,
            icon_path: String::new(),
            world: world.to_string(),
            hq: false,
            price,
            stock_at_price: 1,
            total_stock: 1,
            seals: 1962,
            fc_points: 960,
            efficiency,
        }
    }

    #[test]
    fn default_sort_is_efficiency_descending() {
        let state = SortState::default();
        assert_eq!(state.column, SortColumn::Efficiency);
        assert!(state.descending);
    }

    #[test]
    fn new_text_column_starts_ascending() {
        let state = SortState::default().toggled(SortColumn::Name);
        assert_eq!(state.column, SortColumn::Name);
        assert!(!state.descending);

        let flipped = state.toggled(SortColumn::Name);
        assert!(flipped.descending);
    }

    #[test]
    fn new_numeric_column_starts_descending() {
        let state = SortState::default().toggled(SortColumn::Price);
        assert_eq!(state.column, SortColumn::Price);
        assert!(state.descending);

        let world = state.toggled(SortColumn::World);
        assert!(!world.descending);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut deals = vec![
            deal("zeta Ring", "Odin", 100, 1.0),
            deal("Alpha Sword", "Odin", 100, 1.0),
            deal("beta Shield", "Odin", 100, 1.0),
        ];
        sort_deals(
            &mut deals,
            SortState {
                column: SortColumn::Name,
                descending: false,
            },
        );
        let names: Vec<_> = deals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Sword", "beta Shield", "zeta Ring"]);
    }

    #[test]
    fn efficiency_sort_keeps_equal_rows_stable() {
        let mut deals = vec![
            deal("First", "Odin", 100, 2.0),
            deal("Second", "Shiva", 200, 2.0),
            deal("Third", "Lich", 300, 3.0),
        ];
        sort_deals(&mut deals, SortState::default());
        let names: Vec<_> = deals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);
    }
}
