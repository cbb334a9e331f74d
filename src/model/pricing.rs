//! Order totals, recomputed from the items on every call.

use crate::model::{Menu, MenuError, Order};
use rust_decimal::{Decimal, RoundingStrategy};

/// Money figures for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Sums `quantity * unit price` over the order's items and applies the
    /// promo discount, rounded half-up to cents.
    pub fn compute(order: &Order, menu: &Menu) -> Result<Self, MenuError> {
        let subtotal = order.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            let price = menu.price_of(&item.category, &item.name)?;
            Ok::<_, MenuError>(sum + price * Decimal::from(item.quantity))
        })?;

        let discount_amount = match order.discount_percent() {
            Some(percent) => (subtotal * Decimal::from(percent) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            None => Decimal::ZERO,
        };

        Ok(Self {
            subtotal,
            discount_amount,
            total: subtotal - discount_amount,
        })
    }

    pub fn is_discounted(&self) -> bool {
        !self.discount_amount.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppliedPromo, Location, OrderCreate, OrderId, OrderItem, UserId};

    fn order_with(items: Vec<OrderItem>) -> Order {
        let mut order = Order::new(
            OrderId(100),
            OrderCreate {
                customer: "Ada".into(),
                location: Location::Indoor,
                promo_code: None,
                created_by: UserId(1),
            },
        );
        order.items = items;
        order
    }

    #[test]
    fn test_subtotal_matches_items() {
        let menu = Menu::standard();
        let order = order_with(vec![
            OrderItem::new("entrees", "Chick-Fil-A Chicken Sandwich Entree", 2),
            OrderItem::new("sides", "Waffle Potato Fries", 1),
        ]);

        let totals = Totals::compute(&order, &menu).unwrap();
        assert_eq!(totals.subtotal, Decimal::new(982, 2));
        assert_eq!(totals.total, Decimal::new(982, 2));
        assert!(!totals.is_discounted());
    }

    #[test]
    fn test_promo_discount() {
        let menu = Menu::new().with_item("test", "Ten", 1000);
        let mut order = order_with(vec![OrderItem::new("test", "Ten", 1)]);
        order.promo = Some(AppliedPromo {
            code: "SAVE10".into(),
            discount_percent: 10,
        });

        let totals = Totals::compute(&order, &menu).unwrap();
        assert_eq!(totals.subtotal, Decimal::new(1000, 2));
        assert_eq!(totals.discount_amount, Decimal::new(100, 2));
        assert_eq!(totals.total, Decimal::new(900, 2));
    }

    #[test]
    fn test_totals_follow_item_changes() {
        let menu = Menu::standard();
        let mut order = order_with(vec![OrderItem::new("treats", "Ice Cream Cone", 1)]);
        let before = Totals::compute(&order, &menu).unwrap();
        assert_eq!(before, Totals::compute(&order, &menu).unwrap());

        order.items.push(OrderItem::new("treats", "Ice Cream Cone", 3));
        let after = Totals::compute(&order, &menu).unwrap();
        assert_eq!(after.subtotal, Decimal::new(500, 2));
    }
}
