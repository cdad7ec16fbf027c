//! Read-only views published once per tick for external consumers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Commodity, Faction, SystemSecurity, SystemState};
use crate::ids::SystemId;

/// Price and stock of one commodity in one system market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommodityQuote {
    /// The good.
    pub commodity: Commodity,
    /// Published price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Units held by the market.
    pub stock: u64,
    /// Units traded during the last tick.
    pub last_volume: u64,
}

/// State of one system at a tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemSnapshot {
    /// The system.
    pub system: SystemId,
    /// Display name.
    pub name: String,
    /// Controlling faction.
    pub faction: Faction,
    /// Political condition.
    pub state: SystemState,
    /// Enforcement level.
    pub security: SystemSecurity,
    /// Reputation score per faction.
    pub reputation: BTreeMap<Faction, i32>,
    /// Market table, one row per commodity.
    pub quotes: Vec<CommodityQuote>,
    /// Agents currently trading in the system.
    pub agent_count: u32,
    /// Units traded during the last tick.
    pub trade_volume: u64,
    /// Orders rejected during the last tick.
    pub rejected_orders: u32,
}

/// State of every system at a tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GalaxySnapshot {
    /// Tick the snapshot was taken after (0 before the first tick).
    pub tick: u64,
    /// Per-system views in structural order.
    pub systems: Vec<SystemSnapshot>,
}

impl GalaxySnapshot {
    /// Look up the snapshot of one system.
    pub fn system(&self, id: SystemId) -> Option<&SystemSnapshot> {
        self.systems
            .binary_search_by(|snapshot| snapshot.system.cmp(&id))
            .ok()
            .and_then(|index| self.systems.get(index))
    }

    /// Mean published price of `commodity` across all systems.
    pub fn mean_price(&self, commodity: Commodity) -> Option<Decimal> {
        let prices: Vec<Decimal> = self
            .systems
            .iter()
            .flat_map(|system| system.quotes.iter())
            .filter(|quote| quote.commodity == commodity)
            .map(|quote| quote.price)
            .collect();
        let count = Decimal::from(prices.len());
        if count.is_zero() {
            return None;
        }
        let total = prices
            .iter()
            .try_fold(Decimal::ZERO, |acc, price| acc.checked_add(*price))?;
        total.checked_div(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot(index: u32, price: Decimal) -> SystemSnapshot {
        SystemSnapshot {
            system: SystemId::new(0, index),
            name: format!("S{index}"),
            faction: Faction::Empire,
            state: SystemState::Stable,
            security: SystemSecurity::High,
            reputation: BTreeMap::new(),
            quotes: vec![CommodityQuote {
                commodity: Commodity::Food,
                price,
                stock: 10,
                last_volume: 0,
            }],
            agent_count: 3,
            trade_volume: 0,
            rejected_orders: 0,
        }
    }

    #[test]
    fn lookup_and_mean_price() {
        let board = GalaxySnapshot {
            tick: 4,
            systems: vec![snapshot(0, dec!(10)), snapshot(1, dec!(20))],
        };
        assert_eq!(board.system(SystemId::new(0, 1)).unwrap().name, "S1");
        assert!(board.system(SystemId::new(0, 2)).is_none());
        assert_eq!(board.mean_price(Commodity::Food), Some(dec!(15)));
        assert_eq!(board.mean_price(Commodity::Metal), None);
    }

    #[test]
    fn snapshot_serializes_decimal_as_string() {
        let json = serde_json::to_string(&snapshot(0, dec!(12.50))).unwrap();
        assert!(json.contains("\"12.50\""));
    }
}
