//! # Snapshot Codec
//!
//! Serialized form of a [`CartState`] as stored under the cart key.
//!
//! ## Format
//! A bare JSON array in cart order, no envelope and no version field:
//! ```json
//! [
//!   { "id": "A", "title": "Shoe", "imageUrl": "u", "unitPrice": 10, "quantity": 2 }
//! ]
//! ```
//!
//! Snapshots written by the earlier mobile app spell two keys differently
//! (`image_url`, `price`). Both spellings are read; only the canonical one is
//! written.

use serde::Deserialize;

use crate::error::SnapshotError;
use crate::types::{CartState, LineItem};

/// On-disk shape of one line, tolerant of the legacy key spellings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    id: String,
    title: String,
    #[serde(alias = "image_url")]
    image_url: String,
    #[serde(alias = "price")]
    unit_price: f64,
    quantity: u32,
}

impl From<StoredLineItem> for LineItem {
    fn from(stored: StoredLineItem) -> Self {
        LineItem {
            id: stored.id,
            title: stored.title,
            image_url: stored.image_url,
            unit_price: stored.unit_price,
            quantity: stored.quantity,
        }
    }
}

/// Serializes a state into snapshot text.
pub fn encode(state: &CartState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(state)?)
}

/// Parses snapshot text, enforcing every cart invariant.
///
/// ## Errors
/// - [`SnapshotError::Parse`] when the text is not an array of lines
/// - [`SnapshotError::Invalid`] when ids repeat, a quantity is 0, and so on
pub fn decode(text: &str) -> Result<CartState, SnapshotError> {
    let stored: Vec<StoredLineItem> = serde_json::from_str(text)?;
    let items = stored.into_iter().map(LineItem::from).collect();
    Ok(CartState::try_from_items(items)?)
}
