// Cart Domain Model
//
// Lives inside the session blob, so the serialized shape is persisted data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::ProductId;
use super::error::{DomainError, Result};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: u32,
    pub price: Money,
}

impl CartLine {
    pub fn total(&self) -> Result<Money> {
        self.price.checked_mul(self.quantity)
    }
}

/// Product -> (quantity, unit price). Never holds a zero-quantity line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    lines: BTreeMap<ProductId, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units, refreshing the unit price
    pub fn add(&mut self, product_id: ProductId, quantity: u32, price: Money) -> Result<()> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        let line = self.lines.entry(product_id).or_insert(CartLine {
            quantity: 0,
            price,
        });
        line.quantity = line
            .quantity
            .checked_add(quantity)
            .ok_or(DomainError::InvalidQuantity(quantity))?;
        line.price = price;
        Ok(())
    }

    /// Remove up to `quantity` units; removing an absent product is a no-op
    pub fn remove(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.lines.get_mut(&product_id) {
            line.quantity = line.quantity.saturating_sub(quantity);
            if line.quantity == 0 {
                self.lines.remove(&product_id);
            }
        }
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return if self.lines.remove(&product_id).is_some() {
                Ok(())
            } else {
                Err(DomainError::NotInCart(product_id))
            };
        }
        let line = self
            .lines
            .get_mut(&product_id)
            .ok_or(DomainError::NotInCart(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.get(&product_id)
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines.get(&product_id).map_or(0, |l| l.quantity)
    }

    pub fn line_total(&self, product_id: ProductId) -> Result<Money> {
        match self.lines.get(&product_id) {
            Some(line) => line.total(),
            None => Ok(Money::ZERO),
        }
    }

    pub fn total_price(&self) -> Result<Money> {
        self.lines
            .values()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.total()?))
    }

    pub fn total_items(&self) -> u64 {
        self.lines.values().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.keys().copied().collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = (ProductId, &CartLine)> {
        self.lines.iter().map(|(id, line)| (*id, line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates_and_refreshes_price() {
        let mut cart = Cart::new();
        cart.add(1, 2, Money::from_units(10)).unwrap();
        cart.add(1, 3, Money::from_units(12)).unwrap();

        let line = cart.line(1).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.price, Money::from_units(12));
        assert_eq!(cart.total_price().unwrap(), Money::from_units(60));
    }

    #[test]
    fn test_add_zero_rejected() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(1, 0, Money::from_units(1)),
            Err(DomainError::InvalidQuantity(0))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_deletes_line_at_zero() {
        let mut cart = Cart::new();
        cart.add(1, 2, Money::from_units(10)).unwrap();
        cart.remove(1, 1);
        assert_eq!(cart.quantity_of(1), 1);
        cart.remove(1, 5);
        assert!(cart.line(1).is_none());
        assert!(cart.is_empty());

        // absent product
        cart.remove(42, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add(7, 1, Money::from_minor(999)).unwrap();
        cart.set_quantity(7, 4).unwrap();
        assert_eq!(cart.line_total(7).unwrap(), Money::from_minor(3996));

        cart.set_quantity(7, 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.set_quantity(7, 1),
            Err(DomainError::NotInCart(7))
        ));
    }

    #[test]
    fn test_totals_over_several_lines() {
        let mut cart = Cart::new();
        cart.add(1, 2, Money::from_minor(1050)).unwrap();
        cart.add(2, 1, Money::from_minor(99)).unwrap();

        assert_eq!(cart.total_price().unwrap(), Money::from_minor(2199));
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.line_total(3).unwrap(), Money::ZERO);
        assert_eq!(cart.product_ids(), vec![1, 2]);

        cart.clear();
        assert_eq!(cart.total_price().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_session_blob_shape() {
        let mut cart = Cart::new();
        cart.add(3, 2, Money::from_minor(150)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lines": {"3": {"quantity": 2, "price": 1.5}}})
        );

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
