use serde::{Deserialize, Serialize};

use super::types::Product;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Quantity of '{0}' is too large.")]
    QuantityOverflow(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// The visitor's cart. Items keep the order they were first added in.
///
/// The whole struct serializes as `{"items": [...]}` so the client can persist it as is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds `quantity` units, accumulating onto an existing line. Zero is ignored.
    ///
    /// A line that would go past `u32::MAX` is rejected and the cart is left unchanged.
    pub fn add_item(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Ok(());
        }
        match self.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CartError::QuantityOverflow(product_id.to_string()))?;
            }
            None => self.items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
            }),
        }
        Ok(())
    }

    /// Overwrites the quantity of an existing line, zero removes it.
    /// Products that are not in the cart are left alone.
    pub fn set_item_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|item| item.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get_item_quantity(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product: Product,
    pub quantity: u32,
    pub line_total: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub total_quantity: u32,
    pub subtotal: f64,
}

/// Resolves cart items against the menu. Items whose product is gone are skipped.
pub fn build_cart_line_items(items: &[CartItem], products: &[Product]) -> Vec<CartLineItem> {
    items
        .iter()
        .filter_map(|item| {
            let product = products.iter().find(|product| product.id == item.product_id)?;
            Some(CartLineItem {
                product: product.clone(),
                quantity: item.quantity,
                line_total: product.price * item.quantity as f64,
            })
        })
        .collect()
}

/// The item count saturates at `u32::MAX` rather than wrapping.
pub fn calculate_cart_totals(line_items: &[CartLineItem]) -> CartTotals {
    line_items
        .iter()
        .fold(CartTotals::default(), |mut totals, item| {
            totals.total_quantity = totals.total_quantity.saturating_add(item.quantity);
            totals.subtotal += item.line_total;
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            slug: id.to_string(),
            description: String::new(),
            image_url: String::new(),
            price,
            category_id: "lanches".to_string(),
            available: true,
            tags: Vec::new(),
        }
    }

    #[test]
    fn add_accumulates_and_ignores_zero() {
        let mut cart = Cart::new();
        cart.add_item("x-burguer", 1).unwrap();
        cart.add_item("suco", 2).unwrap();
        cart.add_item("x-burguer", 2).unwrap();
        cart.add_item("agua", 0).unwrap();
        assert_eq!(cart.get_item_quantity("x-burguer"), 3);
        assert_eq!(cart.get_item_quantity("suco"), 2);
        assert_eq!(cart.get_item_quantity("agua"), 0);
        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["x-burguer", "suco"]);
    }

    #[test]
    fn set_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_item("suco", 2).unwrap();
        cart.add_item("agua", 1).unwrap();
        cart.set_item_quantity("suco", 5);
        assert_eq!(cart.get_item_quantity("suco"), 5);
        cart.set_item_quantity("pastel", 3);
        assert_eq!(cart.get_item_quantity("pastel"), 0);
        cart.set_item_quantity("suco", 0);
        assert_eq!(cart.get_item_quantity("suco"), 0);
        cart.remove_item("agua");
        assert!(cart.items().is_empty());
        cart.add_item("agua", 1).unwrap();
        cart.clear();
        assert!(cart.items().is_empty());
    }

    #[test]
    fn persisted_shape() {
        let mut cart = Cart::new();
        cart.add_item("suco", 2).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json, r#"{"items":[{"productId":"suco","quantity":2}]}"#);
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn line_items_and_totals() {
        let products = vec![product("suco", 7.5), product("pastel", 9.0)];
        let items = vec![
            CartItem { product_id: "pastel".to_string(), quantity: 2 },
            CartItem { product_id: "sumiu".to_string(), quantity: 1 },
            CartItem { product_id: "suco".to_string(), quantity: 1 },
        ];
        let lines = build_cart_line_items(&items, &products);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_total, 18.0);
        let totals = calculate_cart_totals(&lines);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal, 25.5);
    }

    #[test]
    fn add_rejects_overflow_and_keeps_line() {
        let mut cart = Cart::new();
        cart.add_item("pastel", u32::MAX).unwrap();
        assert_eq!(
            cart.add_item("pastel", 1),
            Err(CartError::QuantityOverflow("pastel".to_string()))
        );
        assert_eq!(cart.get_item_quantity("pastel"), u32::MAX);
    }

    #[test]
    fn totals_saturate() {
        let products = vec![product("suco", 1.0), product("pastel", 1.0)];
        let items = vec![
            CartItem { product_id: "suco".to_string(), quantity: u32::MAX },
            CartItem { product_id: "pastel".to_string(), quantity: 2 },
        ];
        let totals = calculate_cart_totals(&build_cart_line_items(&items, &products));
        assert_eq!(totals.total_quantity, u32::MAX);
    }
}
