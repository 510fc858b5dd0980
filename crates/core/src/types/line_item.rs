//! Cart line items and the ordered collection that holds them.
//!
//! [`LineItems`] owns the cart's mutation rules. Every operation reports a
//! [`Change`] so callers can tell a real mutation apart from a no-op and
//! skip side effects (persistence, notifications) when nothing happened.
//!
//! ## Invariants
//!
//! - At most one line item per [`ProductId`]
//! - Every line item has `quantity >= 1`; decrementing the last unit removes it
//! - Insertion order is preserved across all mutations
//! - Unit prices are whole cents between zero and [`MAX_UNIT_PRICE`]
//!
//! Prices are stored as JSON numbers. Whole cents below the limit have at
//! most 15 significant digits, so they survive the trip through `f64`
//! unchanged.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Largest unit price accepted into the cart (10^12).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Round a unit price to cents, rejecting values outside `0..=MAX_UNIT_PRICE`.
fn unit_price(id: &ProductId, price: Decimal) -> Result<Decimal, LineItemsError> {
    if price < Decimal::ZERO || price > MAX_UNIT_PRICE {
        return Err(LineItemsError::PriceOutOfRange {
            id: id.clone(),
            price,
        });
    }
    Ok(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// A product about to be added to the cart (no quantity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A product held in the cart together with its quantity.
///
/// Descriptive fields are fixed when the item is first added; only the
/// quantity changes afterwards, and only through [`LineItems`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: ProductId,
    title: String,
    image_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: u32,
}

impl LineItem {
    fn first_unit(item: NewLineItem) -> Result<Self, LineItemsError> {
        let price = unit_price(&item.id, item.price)?;
        Ok(Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price,
            quantity: 1,
        })
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Outcome of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new line item was appended with quantity 1.
    Added,
    /// An existing line item's quantity went up.
    Incremented { quantity: u32 },
    /// An existing line item's quantity went down.
    Decremented { quantity: u32 },
    /// The last unit of a line item was removed.
    Removed,
    /// Nothing matched, or the quantity is already at its limit.
    Unchanged,
}

impl Change {
    /// Whether the collection was actually modified.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Errors raised when a decoded collection breaks the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemsError {
    #[error("line item {0} has quantity 0")]
    ZeroQuantity(ProductId),
    #[error("line item {0} appears more than once")]
    DuplicateId(ProductId),
    #[error("line item {id} has price {price}, expected 0 to 1000000000000")]
    PriceOutOfRange { id: ProductId, price: Decimal },
}

/// Ordered collection of line items, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart this is exactly
    /// [`increment`](Self::increment); otherwise the item is appended with
    /// quantity 1 and its price rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemsError::PriceOutOfRange`] for a new product priced
    /// below zero or above [`MAX_UNIT_PRICE`]. The collection is left as is.
    pub fn add(&mut self, item: NewLineItem) -> Result<Change, LineItemsError> {
        if self.position(&item.id).is_some() {
            return Ok(self.increment(&item.id));
        }

        self.0.push(LineItem::first_unit(item)?);
        Ok(Change::Added)
    }

    /// Raise the quantity of a product by one. Unknown IDs are a no-op.
    pub fn increment(&mut self, id: &ProductId) -> Change {
        let Some(item) = self.0.iter_mut().find(|item| &item.id == id) else {
            return Change::Unchanged;
        };

        match item.quantity.checked_add(1) {
            Some(quantity) => {
                item.quantity = quantity;
                Change::Incremented { quantity }
            }
            None => Change::Unchanged,
        }
    }

    /// Lower the quantity of a product by one, removing it at zero.
    /// Unknown IDs are a no-op.
    pub fn decrement(&mut self, id: &ProductId) -> Change {
        let Some(index) = self.position(id) else {
            return Change::Unchanged;
        };

        let Some(item) = self.0.get_mut(index) else {
            return Change::Unchanged;
        };

        if item.quantity <= 1 {
            self.0.remove(index);
            Change::Removed
        } else {
            item.quantity -= 1;
            Change::Decremented {
                quantity: item.quantity,
            }
        }
    }

    /// Look up a line item by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.0.iter().find(|item| &item.id == id)
    }

    /// Sum of `price × quantity` over all line items, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.0
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.0.iter().position(|item| &item.id == id)
    }
}

impl TryFrom<Vec<LineItem>> for LineItems {
    type Error = LineItemsError;

    fn try_from(mut items: Vec<LineItem>) -> Result<Self, Self::Error> {
        for i in 0..items.len() {
            let (earlier, rest) = items.split_at_mut(i);
            let Some(item) = rest.first_mut() else {
                break;
            };
            if item.quantity == 0 {
                return Err(LineItemsError::ZeroQuantity(item.id.clone()));
            }
            if earlier.iter().any(|other| other.id == item.id) {
                return Err(LineItemsError::DuplicateId(item.id.clone()));
            }
            item.price = unit_price(&item.id, item.price)?;
        }
        Ok(Self(items))
    }
}

impl From<LineItems> for Vec<LineItem> {
    fn from(items: LineItems) -> Self {
        items.0
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
