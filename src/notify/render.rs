//! Plain-text rendering of orders for the kitchen and log channels.

use crate::model::{Location, Menu, MenuError, Order, OrderItem, Totals};
use std::collections::BTreeMap;
use std::fmt::Write;

/// The kitchen-facing order card. Totals are recomputed on every render.
pub struct OrderSummary<'a> {
    order: &'a Order,
    menu: &'a Menu,
}

impl<'a> OrderSummary<'a> {
    pub fn new(order: &'a Order, menu: &'a Menu) -> Self {
        Self { order, menu }
    }

    pub fn render(&self) -> Result<String, MenuError> {
        let order = self.order;
        let totals = Totals::compute(order, self.menu)?;
        let mut out = String::new();

        let _ = writeln!(out, "**Order: {} - #{}**", order.customer, order.id);
        let _ = writeln!(out, "Customer Name: {}", order.customer);
        let _ = writeln!(out, "Status: {}", order.phase());
        let _ = writeln!(out, "Location: {}", order.location);
        if order.location == Location::Outdoor {
            if let Some(vehicle) = &order.vehicle {
                let _ = writeln!(out, "Car Model: {}", vehicle.model);
            }
        }

        for (category, items) in group_by_category(&order.items) {
            let _ = writeln!(out, "\n__{category}__");
            for item in items {
                let price = self.menu.price_of(&item.category, &item.name)?;
                let line_total = price * rust_decimal::Decimal::from(item.quantity);
                let _ = writeln!(out, "{}x {} - ${:.2}", item.quantity, item.name, line_total);
            }
        }

        let _ = writeln!(out, "\nSubtotal: ${:.2}", totals.subtotal);
        if let (Some(promo), true) = (&order.promo, totals.is_discounted()) {
            let _ = writeln!(out, "Promo Code: {}", promo.code);
            let _ = writeln!(
                out,
                "Discount: {}% (-${:.2})",
                promo.discount_percent, totals.discount_amount
            );
            let _ = writeln!(out, "Final Total: ${:.2}", totals.total);
        }

        if !order.notes.is_empty() {
            let _ = writeln!(out, "\nSpecial Instructions:");
            for (n, note) in order.notes.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", n + 1, note);
            }
        }

        let _ = write!(out, "\nCashier: {}", order.created_by.mention());
        Ok(out)
    }
}

/// Short running summary shown in builder prompts.
pub fn running_summary(order: &Order) -> String {
    if order.items.is_empty() {
        return "No items yet.".to_string();
    }
    let mut out = order
        .items
        .iter()
        .map(|item| format!("{}x {} ({})", item.quantity, item.name, item.category))
        .collect::<Vec<_>>()
        .join("\n");
    if !order.notes.is_empty() {
        let _ = write!(out, "\nNotes: {}", order.notes.join("; "));
    }
    out
}

/// The log-channel entry for one audited action.
pub fn render_log_entry(order: &Order, action: &str, actor: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**Order {} - {}**", order.id, action);
    let _ = writeln!(out, "Customer: {}", order.customer);
    let _ = writeln!(out, "Action: {action}");
    let _ = writeln!(out, "By: {actor}");
    let _ = write!(out, "Status: {}", order.phase());
    if !order.items.is_empty() {
        let _ = write!(out, "\nItems:");
        for item in &order.items {
            let _ = write!(out, "\n{}x {}", item.quantity, item.name);
        }
    }
    if !order.notes.is_empty() {
        let _ = write!(out, "\nSpecial Instructions:\n{}", order.notes.join("\n"));
    }
    out
}

fn group_by_category(items: &[OrderItem]) -> BTreeMap<&str, Vec<&OrderItem>> {
    let mut groups: BTreeMap<&str, Vec<&OrderItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.as_str()).or_default().push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppliedPromo, OrderCreate, OrderId, UserId, VehicleDetails};

    fn ada() -> Order {
        let mut order = Order::new(
            OrderId(100),
            OrderCreate {
                customer: "Ada".into(),
                location: Location::Indoor,
                promo_code: None,
                created_by: UserId(7),
            },
        );
        order.items = vec![
            OrderItem::new("entrees", "Chick-Fil-A Chicken Sandwich Entree", 2),
            OrderItem::new("sides", "Waffle Potato Fries", 1),
        ];
        order
    }

    #[test]
    fn test_summary_shows_recomputed_subtotal() {
        let menu = Menu::standard();
        let mut order = ada();
        let text = OrderSummary::new(&order, &menu).render().unwrap();
        assert!(text.contains("#100"));
        assert!(text.contains("2x Chick-Fil-A Chicken Sandwich Entree - $7.38"));
        assert!(text.contains("Subtotal: $9.82"));
        assert!(text.contains("Status: Pending"));
        assert!(text.contains("Cashier: <@7>"));
        assert!(!text.contains("Final Total"));

        order.items.pop();
        let text = OrderSummary::new(&order, &menu).render().unwrap();
        assert!(text.contains("Subtotal: $7.38"));
    }

    #[test]
    fn test_summary_with_promo_notes_and_car() {
        let menu = Menu::standard();
        let mut order = ada();
        order.location = Location::Outdoor;
        order.vehicle = Some(VehicleDetails {
            make: "Honda".into(),
            model: "Civic".into(),
            color: "Blue".into(),
            license_plate: "ABC123".into(),
        });
        order.promo = Some(AppliedPromo {
            code: "SAVE10".into(),
            discount_percent: 10,
        });
        order.notes = vec!["no pickles".into(), "extra sauce".into()];

        let text = OrderSummary::new(&order, &menu).render().unwrap();
        assert!(text.contains("Car Model: Civic"));
        assert!(text.contains("Discount: 10% (-$0.98)"));
        assert!(text.contains("Final Total: $8.84"));
        assert!(text.contains("1. no pickles\n2. extra sauce"));
    }

    #[test]
    fn test_log_entry_lists_items() {
        let entry = render_log_entry(&ada(), "Claimed", "<@2>");
        assert!(entry.starts_with("**Order 100 - Claimed**"));
        assert!(entry.contains("By: <@2>"));
        assert!(entry.contains("1x Waffle Potato Fries"));
    }
}
