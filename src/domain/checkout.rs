//! Order-summary computation and the WhatsApp hand-off message.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use url::form_urlencoded;

use crate::domain::cart::CartItem;

/// Pricing rules applied at checkout. One instance lives in the app config;
/// all display surfaces and the checkout path share it.
#[derive(Clone, Debug)]
pub struct CheckoutPolicy {
    /// Fraction of the subtotal charged as tax, e.g. `0.18`.
    pub tax_rate: Decimal,
    /// Flat shipping fee in minor units, waived above the free threshold.
    pub shipping_fee: i64,
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: i64,
    /// Unit price substituted when a product's price is missing (zero).
    pub fallback_unit_price: i64,
    /// Destination phone for the order hand-off, `+`-prefixed E.164.
    pub whatsapp_phone: String,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.18),
            shipping_fee: 499,
            free_shipping_threshold: 4000,
            fallback_unit_price: 1249,
            whatsapp_phone: "+919789909362".into(),
        }
    }
}

/// Order summary derived from a cart snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CheckoutPolicy {
    fn unit_price(&self, price: i64) -> i64 {
        if price > 0 {
            price
        } else {
            self.fallback_unit_price
        }
    }

    /// Computes subtotal, tax, shipping, and total for a cart snapshot.
    ///
    /// `total = subtotal + tax + shipping`, with shipping zero once the
    /// subtotal clears the free-shipping threshold.
    pub fn compute_totals(&self, items: &[CartItem]) -> Totals {
        let subtotal: i64 = items
            .iter()
            .map(|item| i64::from(item.quantity) * self.unit_price(item.product.price))
            .sum();
        let subtotal = Decimal::from(subtotal);
        let tax = subtotal * self.tax_rate;
        let shipping = if subtotal > Decimal::from(self.free_shipping_threshold) {
            Decimal::ZERO
        } else {
            Decimal::from(self.shipping_fee)
        };
        Totals { subtotal, tax, shipping, total: subtotal + tax + shipping }
    }
}

/// Renders the order summary handed off to the supplier chat.
///
/// Shape: `Hi, I am interested in <title> (Qty: <n>), ... with the cost ₹<total>.`
pub fn compose_order_message(items: &[CartItem], total: Decimal) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("{} (Qty: {})", item.product.title, item.quantity))
        .collect();
    format!("Hi, I am interested in {} with the cost ₹{}.", lines.join(", "), format_inr(total))
}

/// Builds the `wa.me` deep link carrying a pre-filled message. The response
/// channel is human-operated; nothing programmatic is consumed back.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", phone.trim_start_matches('+'), encoded)
}

/// Formats an amount with en-IN digit grouping: the last three integer
/// digits, then groups of two (`1234567` -> `12,34,567`).
pub fn format_inr(amount: Decimal) -> String {
    let amount = amount.normalize();
    let text = amount.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (pos, c) in digits.iter().enumerate() {
        let remaining = digits.len() - pos;
        if pos > 0 && (remaining == 3 || (remaining > 3 && remaining % 2 == 1)) {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use chrono::Utc;

    fn item(id: i64, title: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product: Product {
                id,
                handle: title.to_lowercase().replace(' ', "-"),
                title: title.into(),
                description: String::new(),
                image: String::new(),
                price,
                category: "Leather Goods".into(),
                subcategory: "Bags".into(),
                highlights: vec![],
                tags: vec![],
                brand: "Meraki".into(),
                condition: "New".into(),
                inventory: 1,
                seo_title: None,
                seo_description: None,
            },
            quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn totals_match_the_worked_example() {
        // A: 1000 x 2, B: 500 x 1 -> subtotal 2500, tax 450, total 2950
        // once the subtotal clears the free-shipping threshold.
        let policy = CheckoutPolicy { free_shipping_threshold: 2000, ..Default::default() };
        let totals = policy.compute_totals(&[item(1, "A", 1000, 2), item(2, "B", 500, 1)]);
        assert_eq!(totals.subtotal, dec!(2500));
        assert_eq!(totals.tax, dec!(450));
        assert_eq!(totals.shipping, dec!(0));
        assert_eq!(totals.total, dec!(2950));
    }

    #[test]
    fn shipping_fee_applies_below_threshold() {
        let policy = CheckoutPolicy::default();
        let totals = policy.compute_totals(&[item(1, "A", 1000, 2)]);
        assert_eq!(totals.shipping, dec!(499));
        assert_eq!(totals.total, dec!(2000) + dec!(360) + dec!(499));
    }

    #[test]
    fn shipping_waived_above_threshold() {
        let policy = CheckoutPolicy::default();
        let totals = policy.compute_totals(&[item(1, "A", 4500, 1)]);
        assert_eq!(totals.shipping, dec!(0));
    }

    #[test]
    fn zero_price_falls_back_to_default_unit_price() {
        let policy = CheckoutPolicy::default();
        let totals = policy.compute_totals(&[item(1, "Mystery", 0, 2)]);
        assert_eq!(totals.subtotal, dec!(2498));
    }

    #[test]
    fn empty_cart_totals_are_zero_plus_shipping() {
        let policy = CheckoutPolicy::default();
        let totals = policy.compute_totals(&[]);
        assert_eq!(totals.subtotal, dec!(0));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.shipping, dec!(499));
    }

    #[test]
    fn message_lists_items_and_grouped_total() {
        let items = [item(1, "Leather Satchel", 4999, 1), item(2, "Oud Parfum", 2499, 2)];
        let message = compose_order_message(&items, dec!(11797));
        assert_eq!(
            message,
            "Hi, I am interested in Leather Satchel (Qty: 1), Oud Parfum (Qty: 2) with the cost ₹11,797."
        );
    }

    #[test]
    fn whatsapp_link_encodes_message_and_strips_plus() {
        let link = whatsapp_link("+919789909362", "Hi, I am interested in A (Qty: 1) with the cost ₹2,950.");
        assert!(link.starts_with("https://wa.me/919789909362?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('₹'));
    }

    #[test]
    fn inr_grouping_uses_lakh_crore_breaks() {
        assert_eq!(format_inr(dec!(950)), "950");
        assert_eq!(format_inr(dec!(2950)), "2,950");
        assert_eq!(format_inr(dec!(123456)), "1,23,456");
        assert_eq!(format_inr(dec!(1234567)), "12,34,567");
        assert_eq!(format_inr(dec!(12345678.50)), "1,23,45,678.5");
    }
}
