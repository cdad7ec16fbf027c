//! Cargo hold operations for agents.
//!
//! Each agent carries goods subject to its ship's cargo capacity. Production
//! respects the hold; purchases are sized by the order strategy to fit and
//! are stowed without a capacity check so that a validated fill can always
//! settle. All arithmetic is checked.

use std::collections::BTreeMap;

use starlane_types::Commodity;

use crate::error::AgentError;

/// Total units aboard.
///
/// Returns `None` if the sum overflows `u32`.
pub fn total_load(inventory: &BTreeMap<Commodity, u32>) -> Option<u32> {
    let mut total: u32 = 0;
    for quantity in inventory.values() {
        total = total.checked_add(*quantity)?;
    }
    Some(total)
}

/// Units of free cargo space. Zero when the hold is full or over-full.
pub fn free_capacity(inventory: &BTreeMap<Commodity, u32>, capacity: u32) -> u32 {
    total_load(inventory).map_or(0, |load| capacity.saturating_sub(load))
}

/// Units of `commodity` held.
pub fn holding(inventory: &BTreeMap<Commodity, u32>, commodity: Commodity) -> u32 {
    inventory.get(&commodity).copied().unwrap_or(0)
}

/// Add `amount` units of `commodity`, failing if the hold would overflow.
pub fn load(
    inventory: &mut BTreeMap<Commodity, u32>,
    capacity: u32,
    commodity: Commodity,
    amount: u32,
) -> Result<(), AgentError> {
    let current_load =
        total_load(inventory).ok_or_else(|| AgentError::overflow("total_load in load"))?;
    let overflow = AgentError::CargoOverflow {
        commodity,
        attempted: amount,
        current_load,
        capacity,
    };
    match current_load.checked_add(amount) {
        Some(new_load) if new_load <= capacity => stow(inventory, commodity, amount),
        _ => Err(overflow),
    }
}

/// Add `amount` units of `commodity` regardless of capacity.
pub fn stow(
    inventory: &mut BTreeMap<Commodity, u32>,
    commodity: Commodity,
    amount: u32,
) -> Result<(), AgentError> {
    if amount == 0 {
        return Ok(());
    }
    let entry = inventory.entry(commodity).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| AgentError::overflow("commodity quantity in stow"))?;
    Ok(())
}

/// Remove `amount` units of `commodity`.
///
/// Removes the key entirely when the quantity reaches zero.
pub fn unload(
    inventory: &mut BTreeMap<Commodity, u32>,
    commodity: Commodity,
    amount: u32,
) -> Result<(), AgentError> {
    let current = holding(inventory, commodity);
    let remaining = current
        .checked_sub(amount)
        .ok_or(AgentError::InsufficientCommodity {
            commodity,
            requested: amount,
            available: current,
        })?;
    if remaining == 0 {
        inventory.remove(&commodity);
    } else {
        inventory.insert(commodity, remaining);
    }
    Ok(())
}

/// Remove up to `amount` units, returning how many were removed.
pub fn unload_saturating(
    inventory: &mut BTreeMap<Commodity, u32>,
    commodity: Commodity,
    amount: u32,
) -> u32 {
    let removed = holding(inventory, commodity).min(amount);
    unload(inventory, commodity, removed).map_or(0, |()| removed)
}

/// Empty the hold, returning its contents.
pub fn drain_all(inventory: &mut BTreeMap<Commodity, u32>) -> BTreeMap<Commodity, u32> {
    core::mem::take(inventory)
}
