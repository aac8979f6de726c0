//! Cart snapshot type and its mutation rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user's cart snapshot: product id → size label → quantity.
///
/// Persisted as a single JSONB value on the user row and replaced wholesale
/// on every mutation (last write wins; cart state is single-user and
/// low-contention). The invariant maintained by every mutation: no entry
/// with quantity ≤ 0 survives, and a product with no sizes left is removed
/// entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartData(BTreeMap<String, BTreeMap<String, u32>>);

impl CartData {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Increment the quantity for `(product_id, size)` by one, creating the
    /// nested entries as needed.
    pub fn add(&mut self, product_id: &str, size: &str) {
        let quantity = self
            .0
            .entry(product_id.to_owned())
            .or_default()
            .entry(size.to_owned())
            .or_insert(0);
        *quantity = quantity.saturating_add(1);
    }

    /// Overwrite the quantity for an existing `(product_id, size)` entry.
    ///
    /// A quantity of zero deletes the entry, and the product key too once its
    /// last size is gone. Returns `false` if the entry does not exist — the
    /// cart is left untouched in that case.
    #[must_use]
    pub fn set(&mut self, product_id: &str, size: &str, quantity: u32) -> bool {
        let Some(sizes) = self.0.get_mut(product_id) else {
            return false;
        };
        if !sizes.contains_key(size) {
            return false;
        }

        if quantity > 0 {
            sizes.insert(size.to_owned(), quantity);
        } else {
            sizes.remove(size);
            if sizes.is_empty() {
                self.0.remove(product_id);
            }
        }
        true
    }

    /// Quantity for `(product_id, size)`, or `None` if absent.
    #[must_use]
    pub fn quantity(&self, product_id: &str, size: &str) -> Option<u32> {
        self.0.get(product_id).and_then(|sizes| sizes.get(size)).copied()
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying mapping.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, BTreeMap<String, u32>> {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_yields_two() {
        let mut cart = CartData::new();
        cart.add("prod-1", "M");
        cart.add("prod-1", "M");
        assert_eq!(cart.quantity("prod-1", "M"), Some(2));
    }

    #[test]
    fn test_add_creates_nested_entries() {
        let mut cart = CartData::new();
        cart.add("prod-1", "M");
        cart.add("prod-1", "L");
        cart.add("prod-2", "S");
        assert_eq!(cart.quantity("prod-1", "M"), Some(1));
        assert_eq!(cart.quantity("prod-1", "L"), Some(1));
        assert_eq!(cart.quantity("prod-2", "S"), Some(1));
    }

    #[test]
    fn test_set_overwrites_quantity() {
        let mut cart = CartData::new();
        cart.add("prod-1", "M");
        assert!(cart.set("prod-1", "M", 5));
        assert_eq!(cart.quantity("prod-1", "M"), Some(5));
    }

    #[test]
    fn test_set_zero_removes_entry_and_empty_product() {
        let mut cart = CartData::new();
        cart.add("prod-1", "M");
        cart.add("prod-1", "L");

        assert!(cart.set("prod-1", "M", 0));
        assert_eq!(cart.quantity("prod-1", "M"), None);
        // Other size still present, so the product key survives.
        assert!(cart.entries().contains_key("prod-1"));

        assert!(cart.set("prod-1", "L", 0));
        // Last size gone: product key removed too.
        assert!(!cart.entries().contains_key("prod-1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_missing_entry_returns_false() {
        let mut cart = CartData::new();
        assert!(!cart.set("prod-1", "M", 3));

        cart.add("prod-1", "M");
        assert!(!cart.set("prod-1", "XL", 3));
        assert!(!cart.set("prod-9", "M", 3));
        // Failed sets leave the cart untouched.
        assert_eq!(cart.quantity("prod-1", "M"), Some(1));
    }

    #[test]
    fn test_serde_shape_is_plain_nested_mapping() {
        let mut cart = CartData::new();
        cart.add("prod-1", "M");
        cart.add("prod-1", "M");
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json, serde_json::json!({"prod-1": {"M": 2}}));

        let empty = CartData::new();
        assert_eq!(serde_json::to_value(&empty).unwrap(), serde_json::json!({}));
    }
}
