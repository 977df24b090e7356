//! # Domain Types
//!
//! Core domain types used throughout cartkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  NewLineItem    │   │    LineItem     │   │   CartState     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id (unique)    │◄──│  Arc<Vec<..>>   │       │
//! │  │  title          │   │  title          │   │  insertion      │       │
//! │  │  image_url      │   │  image_url      │   │  ordered        │       │
//! │  │  unit_price     │   │  unit_price     │   └─────────────────┘       │
//! │  └─────────────────┘   │  quantity >= 1  │                             │
//! │                        └─────────────────┘                             │
//! │  ┌──────────────────────────────────────┐                              │
//! │  │  CartOperation                       │                              │
//! │  │  AddToCart | Increment | Decrement   │                              │
//! │  └──────────────────────────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Copy-on-Write
//! A [`CartState`] is an immutable, cheaply cloneable view. Transitions build
//! a fresh sequence and never touch the one a reader may still be holding.

use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Product image shown next to the line.
    pub image_url: String,

    /// Unit price as supplied by the catalog. Never used for arithmetic here.
    pub unit_price: f64,

    /// Always >= 1. A line that would reach 0 is removed instead.
    pub quantity: u32,
}

impl LineItem {
    /// Creates the first line for a candidate (`quantity = 1`).
    pub fn from_candidate(candidate: &NewLineItem) -> Self {
        LineItem {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            image_url: candidate.image_url.clone(),
            unit_price: candidate.unit_price,
            quantity: 1,
        }
    }

    /// Returns a copy with a different quantity, metadata untouched.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        LineItem {
            quantity,
            ..self.clone()
        }
    }
}

// =============================================================================
// New Line Item
// =============================================================================

/// A cart candidate: a line item without a quantity.
///
/// This is what the product list hands to `addToCart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub unit_price: f64,
}

impl NewLineItem {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: f64,
    ) -> Self {
        NewLineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            unit_price,
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// The full ordered set of line items at a point in time.
///
/// ## Invariants
/// - Ids are unique
/// - Every quantity is >= 1
/// - Order is insertion order; increment / decrement never reorder
///
/// Constructed only through [`CartState::empty`], the transitions in
/// [`crate::store`], or the validating [`CartState::try_from_items`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct CartState {
    items: Arc<Vec<LineItem>>,
}

impl CartState {
    /// An empty cart.
    pub fn empty() -> Self {
        CartState::default()
    }

    /// Builds a state from items, enforcing every cart invariant.
    pub fn try_from_items(items: Vec<LineItem>) -> Result<Self, ValidationError> {
        validation::validate_items(&items)?;
        Ok(CartState::from_items_unchecked(items))
    }

    /// Used by transitions that preserve the invariants by construction.
    pub(crate) fn from_items_unchecked(items: Vec<LineItem>) -> Self {
        CartState {
            items: Arc::new(items),
        }
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Position of a line by id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Checks whether a line with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (badge count).
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// True when both states share the same underlying sequence.
    pub fn ptr_eq(&self, other: &CartState) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl TryFrom<Vec<LineItem>> for CartState {
    type Error = ValidationError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        CartState::try_from_items(items)
    }
}

impl Serialize for CartState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.as_slice().serialize(serializer)
    }
}

// =============================================================================
// Cart Operation
// =============================================================================

/// A cart command as issued by the UI shell.
///
/// ## Wire Format
/// ```json
/// { "type": "addToCart", "item": { "id": "A", "title": "Shoe", "imageUrl": "u", "unitPrice": 10 } }
/// { "type": "increment", "id": "A" }
/// { "type": "decrement", "id": "A" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartOperation {
    AddToCart { item: NewLineItem },
    Increment { id: String },
    Decrement { id: String },
}

impl CartOperation {
    /// The line id this operation targets.
    pub fn target_id(&self) -> &str {
        match self {
            CartOperation::AddToCart { item } => &item.id,
            CartOperation::Increment { id } | CartOperation::Decrement { id } => id,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartOperation::AddToCart { .. } => "add_to_cart",
            CartOperation::Increment { .. } => "increment",
            CartOperation::Decrement { .. } => "decrement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: format!("Product {}", id),
            image_url: format!("https://img/{}.png", id),
            unit_price: 10.0,
            quantity,
        }
    }

    #[test]
    fn test_line_item_serializes_camel_case() {
        let json = serde_json::to_value(line("A", 2)).unwrap();
        assert_eq!(json["imageUrl"], "https://img/A.png");
        assert_eq!(json["unitPrice"], 10.0);
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_try_from_items_rejects_duplicates() {
        let result = CartState::try_from_items(vec![line("A", 1), line("A", 2)]);
        assert!(matches!(result, Err(ValidationError::Duplicate { .. })));
    }

    #[test]
    fn test_try_from_items_rejects_zero_quantity() {
        let result = CartState::try_from_items(vec![line("A", 0)]);
        assert!(matches!(result, Err(ValidationError::MustBePositive { .. })));
    }

    #[test]
    fn test_state_queries() {
        let state = CartState::try_from_items(vec![line("A", 2), line("B", 3)]).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.position("B"), Some(1));
        assert!(state.contains("A"));
        assert!(!state.contains("C"));
        assert_eq!(state.total_quantity(), 5);
    }

    #[test]
    fn test_clone_shares_sequence() {
        let state = CartState::try_from_items(vec![line("A", 1)]).unwrap();
        let copy = state.clone();
        assert!(state.ptr_eq(&copy));
    }

    #[test]
    fn test_operation_wire_format() {
        let op: CartOperation =
            serde_json::from_str(r#"{"type":"increment","id":"A"}"#).unwrap();
        assert_eq!(op, CartOperation::Increment { id: "A".into() });

        let op: CartOperation = serde_json::from_str(
            r#"{"type":"addToCart","item":{"id":"A","title":"Shoe","imageUrl":"u","unitPrice":10}}"#,
        )
        .unwrap();
        assert_eq!(op.target_id(), "A");
        assert_eq!(op.name(), "add_to_cart");
    }
}
