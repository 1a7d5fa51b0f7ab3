//! Estimate money math. All amounts are integer cents; callers convert for
//! display. Tax rates are expressed in basis points so the arithmetic stays
//! integral end to end.

use crate::models::EstimateItem;

pub fn line_total(item: &EstimateItem) -> i64 {
    item.quantity * item.unit_price
}

/// Sum of line totals. Order-independent, 0 for an empty list.
pub fn subtotal(items: &[EstimateItem]) -> i64 {
    items.iter().map(line_total).sum()
}

/// Tax on a subtotal, rounded half-up to the nearest cent.
pub fn tax(subtotal: i64, rate_basis_points: i64) -> i64 {
    (subtotal * rate_basis_points + 5_000) / 10_000
}

pub fn total(subtotal: i64, rate_basis_points: i64) -> i64 {
    subtotal + tax(subtotal, rate_basis_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;

    fn item(quantity: i64, unit_price: i64) -> EstimateItem {
        EstimateItem {
            id: 0,
            job_id: 1,
            kind: ItemKind::Material,
            description: "part".to_string(),
            quantity,
            unit_price,
            store_source: None,
            material_id: None,
        }
    }

    #[test]
    fn subtotal_of_empty_list_is_zero() {
        assert_eq!(subtotal(&[]), 0);
    }

    #[test]
    fn subtotal_sums_quantity_times_unit_price() {
        let items = vec![item(2, 1_500), item(1, 250), item(3, 0)];
        assert_eq!(subtotal(&items), 3_250);
    }

    #[test]
    fn subtotal_is_order_independent() {
        let mut items = vec![item(1, 100), item(5, 999), item(2, 42)];
        let forward = subtotal(&items);
        items.reverse();
        assert_eq!(subtotal(&items), forward);
    }

    #[test]
    fn tax_rounds_half_up() {
        // 17000 * 8.25% = 1402.5 cents, rounds up
        assert_eq!(tax(17_000, 825), 1_403);
        // 10000 * 8.25% = 825 exactly
        assert_eq!(tax(10_000, 825), 825);
        // 99 * 8.25% = 8.1675, rounds down
        assert_eq!(tax(99, 825), 8);
    }

    #[test]
    fn tax_on_zero_subtotal_is_zero() {
        assert_eq!(tax(0, 825), 0);
    }

    #[test]
    fn total_is_subtotal_plus_tax() {
        assert_eq!(total(17_000, 825), 18_403);
        assert_eq!(total(0, 825), 0);
    }
}
