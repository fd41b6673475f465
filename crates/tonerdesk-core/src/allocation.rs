//! # Allocation Module
//!
//! Ranks consumable sources for a printer that needs a fresh cartridge.
//!
//! ## The Preference Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Consumable Allocation Preference                           │
//! │                                                                         │
//! │  "Accounting HP" needs a CF287A cartridge.                              │
//! │                                                                         │
//! │  Stock of CF287A across the fleet:                                      │
//! │    Accounting HP   qty 1   ◄── own stock ALWAYS ranks first             │
//! │    Warehouse HP    qty 4   ◄── biggest borrowable pile next             │
//! │    Reception HP    qty 2                                                │
//! │    Lab HP          qty 0   ◄── empty rows are not candidates            │
//! │                                                                         │
//! │  Ranked: [Accounting(own), Warehouse(4), Reception(2)]                  │
//! │                                                                         │
//! │  Consuming a borrowed candidate creates a loan                          │
//! │  (lender = source printer) so the debt is tracked.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a ranking over fully-loaded in-memory rows - a sort, not a
//! scheduler. Ties between borrowable piles break on printer name so the
//! ordering is stable across runs.

use serde::{Deserialize, Serialize};

// =============================================================================
// Input / Output Types
// =============================================================================

/// One printer's on-hand stock of the model being allocated.
///
/// Built by the caller from inventory rows joined with printer names;
/// this module never touches the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAtPrinter {
    pub printer_id: String,
    pub printer_name: String,
    pub quantity: i64,
}

/// A ranked consumable source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCandidate {
    pub printer_id: String,
    pub printer_name: String,
    /// Quantity available at this source.
    pub quantity: i64,
    /// True when the source is the consuming printer's own row.
    pub is_own: bool,
}

// =============================================================================
// Ranking
// =============================================================================

/// Ranks candidate sources for `own_printer_id`.
///
/// ## Rules
/// 1. Rows with zero (or negative) quantity are dropped.
/// 2. The printer's own row, if stocked, ranks first.
/// 3. Borrowable rows follow, most available quantity first.
/// 4. Equal quantities order by printer name.
///
/// ## Example
/// ```rust
/// use tonerdesk_core::allocation::{rank_sources, StockAtPrinter};
///
/// let stock = vec![
///     StockAtPrinter { printer_id: "b".into(), printer_name: "Warehouse".into(), quantity: 4 },
///     StockAtPrinter { printer_id: "a".into(), printer_name: "Accounting".into(), quantity: 1 },
/// ];
/// let ranked = rank_sources("a", stock);
/// assert!(ranked[0].is_own);
/// assert_eq!(ranked[1].printer_name, "Warehouse");
/// ```
pub fn rank_sources(own_printer_id: &str, stock: Vec<StockAtPrinter>) -> Vec<AllocationCandidate> {
    let mut candidates: Vec<AllocationCandidate> = stock
        .into_iter()
        .filter(|s| s.quantity > 0)
        .map(|s| AllocationCandidate {
            is_own: s.printer_id == own_printer_id,
            printer_id: s.printer_id,
            printer_name: s.printer_name,
            quantity: s.quantity,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.is_own
            .cmp(&a.is_own)
            .then(b.quantity.cmp(&a.quantity))
            .then(a.printer_name.cmp(&b.printer_name))
    });

    candidates
}

/// The preferred source, if any row holds stock.
pub fn choose_source(
    own_printer_id: &str,
    stock: Vec<StockAtPrinter>,
) -> Option<AllocationCandidate> {
    rank_sources(own_printer_id, stock).into_iter().next()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, name: &str, qty: i64) -> StockAtPrinter {
        StockAtPrinter {
            printer_id: id.to_string(),
            printer_name: name.to_string(),
            quantity: qty,
        }
    }

    #[test]
    fn test_own_stock_ranks_first_even_when_smaller() {
        let ranked = rank_sources(
            "own",
            vec![
                stock("other", "Warehouse", 10),
                stock("own", "Accounting", 1),
            ],
        );

        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].is_own);
        assert_eq!(ranked[0].quantity, 1);
        assert_eq!(ranked[1].printer_id, "other");
    }

    #[test]
    fn test_borrowed_sorted_by_quantity_desc() {
        let ranked = rank_sources(
            "own",
            vec![
                stock("p1", "Reception", 2),
                stock("p2", "Warehouse", 4),
                stock("p3", "Lab", 3),
            ],
        );

        let names: Vec<&str> = ranked.iter().map(|c| c.printer_name.as_str()).collect();
        assert_eq!(names, vec!["Warehouse", "Lab", "Reception"]);
        assert!(ranked.iter().all(|c| !c.is_own));
    }

    #[test]
    fn test_ties_break_on_printer_name() {
        let ranked = rank_sources(
            "own",
            vec![stock("p1", "Zeta", 2), stock("p2", "Alpha", 2)],
        );

        assert_eq!(ranked[0].printer_name, "Alpha");
        assert_eq!(ranked[1].printer_name, "Zeta");
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let ranked = rank_sources(
            "own",
            vec![stock("own", "Accounting", 0), stock("p1", "Lab", -1)],
        );
        assert!(ranked.is_empty());
        assert_eq!(choose_source("own", vec![stock("p1", "Lab", 0)]), None);
    }

    #[test]
    fn test_choose_source_prefers_own() {
        let chosen = choose_source(
            "own",
            vec![stock("other", "Warehouse", 9), stock("own", "Accounting", 1)],
        )
        .unwrap();

        assert!(chosen.is_own);
        assert_eq!(chosen.printer_id, "own");
    }
}
