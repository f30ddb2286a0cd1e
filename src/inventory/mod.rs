//! Item-ID bookkeeping for the asset workflow.
//!
//! Permanent assets carry one serial ID per unit. Every workflow step that
//! moves units (purchase, issue, return, disposal) validates its ID list here
//! before touching stock. All functions are pure; the services own the reads
//! and writes.

use std::collections::HashSet;
use thiserror::Error;

use crate::types::AssetType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Quantity must be greater than zero")]
    ZeroQuantity,

    #[error("Item IDs must not be blank")]
    BlankId,

    #[error("Duplicate item IDs: {}", .0.join(", "))]
    DuplicateIds(Vec<String>),

    #[error("{given} item IDs given but only {declared} units declared")]
    ExceedsQuantity { declared: u32, given: usize },

    #[error("Expected exactly {expected} item IDs, got {given}")]
    CountMismatch { expected: u32, given: usize },

    #[error("Consumable assets are tracked by quantity and take no item IDs")]
    IdsNotAllowed,

    #[error("Item IDs not available: {}", .0.join(", "))]
    NotAvailable(Vec<String>),

    #[error("Item IDs already held by another pending request: {}", .0.join(", "))]
    AlreadyReserved(Vec<String>),

    #[error("Item IDs already recorded: {}", .0.join(", "))]
    AlreadyRecorded(Vec<String>),

    #[error("Requested {requested} units but only {available} available")]
    InsufficientQuantity { requested: u32, available: u32 },
}

/// IDs that appear more than once, in first-seen order
pub fn find_duplicates(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut dups = Vec::new();
    for id in ids {
        if !seen.insert(id.as_str()) && reported.insert(id.as_str()) {
            dups.push(id.clone());
        }
    }
    dups
}

/// Members of `ids` that are also in `other`
pub fn overlap(ids: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    ids.iter().filter(|id| other.contains(id.as_str())).cloned().collect()
}

/// Members of `ids` missing from `pool`
pub fn missing_from(ids: &[String], pool: &[String]) -> Vec<String> {
    let pool: HashSet<&str> = pool.iter().map(String::as_str).collect();
    ids.iter().filter(|id| !pool.contains(id.as_str())).cloned().collect()
}

/// `pool` without `ids`, order preserved
pub fn subtract(pool: &[String], ids: &[String]) -> Vec<String> {
    let remove: HashSet<&str> = ids.iter().map(String::as_str).collect();
    pool.iter().filter(|id| !remove.contains(id.as_str())).cloned().collect()
}

/// `pool` followed by the members of `ids` it does not already hold
pub fn merge(pool: &[String], ids: &[String]) -> Vec<String> {
    let mut out = pool.to_vec();
    let mut present: HashSet<String> = pool.iter().cloned().collect();
    for id in ids {
        if present.insert(id.clone()) {
            out.push(id.clone());
        }
    }
    out
}

/// Trim every ID; blank IDs are an error.
pub fn normalize_ids(ids: &[String]) -> Result<Vec<String>, InventoryError> {
    ids.iter()
        .map(|id| {
            let trimmed = id.trim();
            if trimmed.is_empty() {
                Err(InventoryError::BlankId)
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn reject_duplicates(ids: &[String]) -> Result<(), InventoryError> {
    let dups = find_duplicates(ids);
    if dups.is_empty() {
        Ok(())
    } else {
        Err(InventoryError::DuplicateIds(dups))
    }
}

/// ID list of a purchase line: may be shorter than the quantity, never longer.
pub fn validate_declared_ids(
    asset_type: AssetType,
    quantity: u32,
    ids: &[String],
) -> Result<(), InventoryError> {
    if quantity == 0 {
        return Err(InventoryError::ZeroQuantity);
    }
    if !asset_type.tracks_ids() {
        return if ids.is_empty() { Ok(()) } else { Err(InventoryError::IdsNotAllowed) };
    }
    reject_duplicates(ids)?;
    if ids.len() > quantity as usize {
        return Err(InventoryError::ExceedsQuantity {
            declared: quantity,
            given: ids.len(),
        });
    }
    Ok(())
}

/// ID list of a movement (issue, return, disposal): exactly one ID per unit.
pub fn validate_movement_ids(
    asset_type: AssetType,
    quantity: u32,
    ids: &[String],
) -> Result<(), InventoryError> {
    if quantity == 0 {
        return Err(InventoryError::ZeroQuantity);
    }
    if !asset_type.tracks_ids() {
        return if ids.is_empty() { Ok(()) } else { Err(InventoryError::IdsNotAllowed) };
    }
    reject_duplicates(ids)?;
    if ids.len() != quantity as usize {
        return Err(InventoryError::CountMismatch {
            expected: quantity,
            given: ids.len(),
        });
    }
    Ok(())
}

/// Units and IDs held by pending requests against one pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservations {
    pub quantity: u32,
    pub ids: Vec<String>,
}

impl Reservations {
    pub fn add(&mut self, quantity: u32, ids: &[String]) {
        self.quantity = self.quantity.saturating_add(quantity);
        self.ids.extend(ids.iter().cloned());
    }
}

/// A pool of units (store stock or a location's holding) with its reservations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub total: u32,
    pub ids: Vec<String>,
    pub reserved: Reservations,
}

impl Availability {
    pub fn new(total: u32, ids: Vec<String>, reserved: Reservations) -> Self {
        Self { total, ids, reserved }
    }

    pub fn available_quantity(&self) -> u32 {
        self.total.saturating_sub(self.reserved.quantity)
    }

    pub fn available_ids(&self) -> Vec<String> {
        subtract(&self.ids, &self.reserved.ids)
    }

    /// Check a movement of `quantity` units / `ids` out of this pool.
    pub fn check_take(&self, quantity: u32, ids: &[String]) -> Result<(), InventoryError> {
        let available = self.available_quantity();
        if quantity > available {
            return Err(InventoryError::InsufficientQuantity {
                requested: quantity,
                available,
            });
        }
        let missing = missing_from(ids, &self.ids);
        if !missing.is_empty() {
            return Err(InventoryError::NotAvailable(missing));
        }
        let held = overlap(ids, &self.reserved.ids);
        if !held.is_empty() {
            return Err(InventoryError::AlreadyReserved(held));
        }
        Ok(())
    }
}

/// Change to one stock line caused by editing a purchase line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDelta {
    pub added_quantity: u32,
    pub removed_quantity: u32,
    pub added_ids: Vec<String>,
    pub removed_ids: Vec<String>,
}

impl LineDelta {
    pub fn between(old_quantity: u32, old_ids: &[String], new_quantity: u32, new_ids: &[String]) -> Self {
        Self {
            added_quantity: new_quantity.saturating_sub(old_quantity),
            removed_quantity: old_quantity.saturating_sub(new_quantity),
            added_ids: subtract(new_ids, old_ids),
            removed_ids: subtract(old_ids, new_ids),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_quantity == 0
            && self.removed_quantity == 0
            && self.added_ids.is_empty()
            && self.removed_ids.is_empty()
    }
}
