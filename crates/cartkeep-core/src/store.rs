//! # Cart Store
//!
//! Owns the current [`CartState`] and computes next states deterministically.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Transitions (pure)                              │
//! │                                                                         │
//! │  Operation              Line exists?      Result                       │
//! │  ─────────              ────────────      ──────                       │
//! │                                                                         │
//! │  add_to_cart(item) ───► yes ────────────► qty + 1, metadata kept       │
//! │                    └──► no  ────────────► append { ..item, qty: 1 }    │
//! │                                                                         │
//! │  increment(id) ───────► yes ────────────► qty + 1                      │
//! │                    └──► no  ────────────► ItemNotFound(id)             │
//! │                                                                         │
//! │  decrement(id) ───────► yes, qty > 1 ───► qty - 1                      │
//! │                    ├──► yes, qty == 1 ──► line removed, order kept     │
//! │                    └──► no  ────────────► ItemNotFound(id)             │
//! │                                                                         │
//! │  Every transition returns a NEW CartState. The input is never touched. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staging
//! [`CartStore::stage`] computes a [`Transition`] without changing the current
//! state. The caller persists `transition.next()` and then either
//! [`CartStore::commit`]s or [`CartStore::rollback`]s it.

use crate::error::{CoreError, CoreResult};
use crate::types::{CartOperation, CartState, LineItem, NewLineItem};
use crate::validation;

// =============================================================================
// Pure Transitions
// =============================================================================

/// Adds a candidate, or bumps the quantity of the line that already has its id.
///
/// When the id exists, the stored title, image and price win over the
/// candidate's; only the quantity changes.
pub fn add_to_cart(state: &CartState, candidate: &NewLineItem) -> CoreResult<CartState> {
    validation::validate_candidate(candidate)?;

    match state.position(&candidate.id) {
        Some(index) => bump(state, index, &candidate.id),
        None => {
            let mut items = Vec::with_capacity(state.len() + 1);
            items.extend_from_slice(state.items());
            items.push(LineItem::from_candidate(candidate));
            Ok(CartState::from_items_unchecked(items))
        }
    }
}

/// Increases the quantity of an existing line by one.
pub fn increment(state: &CartState, id: &str) -> CoreResult<CartState> {
    let index = state
        .position(id)
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

    bump(state, index, id)
}

/// Decreases the quantity of an existing line by one, removing it at zero.
pub fn decrement(state: &CartState, id: &str) -> CoreResult<CartState> {
    let index = state
        .position(id)
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

    let items = state
        .items()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match (i == index, item.quantity) {
            (true, 1) => None,
            (true, quantity) => Some(item.with_quantity(quantity - 1)),
            (false, _) => Some(item.clone()),
        })
        .collect();

    Ok(CartState::from_items_unchecked(items))
}

/// Dispatches an operation to its transition.
pub fn apply_operation(state: &CartState, op: &CartOperation) -> CoreResult<CartState> {
    match op {
        CartOperation::AddToCart { item } => add_to_cart(state, item),
        CartOperation::Increment { id } => increment(state, id),
        CartOperation::Decrement { id } => decrement(state, id),
    }
}

fn bump(state: &CartState, index: usize, id: &str) -> CoreResult<CartState> {
    let current = state.items()[index].quantity;
    let quantity = current
        .checked_add(1)
        .ok_or_else(|| CoreError::QuantityOverflow(id.to_string()))?;

    let mut items = state.items().to_vec();
    items[index] = items[index].with_quantity(quantity);
    Ok(CartState::from_items_unchecked(items))
}

// =============================================================================
// Transition
// =============================================================================

/// A computed but not yet committed state change.
#[derive(Debug, Clone)]
#[must_use = "a staged transition must be committed or rolled back"]
pub struct Transition {
    operation: &'static str,
    prior: CartState,
    next: CartState,
}

impl Transition {
    /// State before the operation.
    pub fn prior(&self) -> &CartState {
        &self.prior
    }

    /// State the operation produced.
    pub fn next(&self) -> &CartState {
        &self.next
    }

    /// Operation name, for logs.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Holder of the canonical cart state.
///
/// `CartStore` itself is not synchronized; the owner wraps it in a lock when
/// it is shared (see `cartkeep-sync`).
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    current: CartState,
}

impl CartStore {
    /// Creates a store holding an empty cart.
    pub fn new() -> Self {
        CartStore::default()
    }

    /// Creates a store seeded with an existing state.
    pub fn from_state(state: CartState) -> Self {
        CartStore { current: state }
    }

    /// The committed state.
    pub fn current(&self) -> &CartState {
        &self.current
    }

    /// Replaces the current state wholesale. Used when seeding from a snapshot.
    pub fn replace(&mut self, state: CartState) {
        self.current = state;
    }

    /// Computes the state `op` would produce without changing the store.
    pub fn compute(&self, op: &CartOperation) -> CoreResult<CartState> {
        apply_operation(&self.current, op)
    }

    /// Computes a transition for `op`. The current state is left as is.
    pub fn stage(&self, op: &CartOperation) -> CoreResult<Transition> {
        let next = self.compute(op)?;
        Ok(Transition {
            operation: op.name(),
            prior: self.current.clone(),
            next,
        })
    }

    /// Makes the transition's next state current and returns it.
    pub fn commit(&mut self, transition: Transition) -> CartState {
        debug_assert!(
            transition.prior.ptr_eq(&self.current),
            "transition was staged against a different state"
        );
        self.current = transition.next;
        self.current.clone()
    }

    /// Discards the transition, reinstating its prior state, and returns it.
    pub fn rollback(&mut self, transition: Transition) -> CartState {
        self.current = transition.prior;
        self.current.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
