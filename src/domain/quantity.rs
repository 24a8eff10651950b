//! Increment, decrement and parsing for a single quantity input.
//!
//! Nothing here fails: text that is not a non-negative integer collapses to
//! the lower bound before any arithmetic happens.

use super::picklist::QuantityBounds;

/// Parses digits-only text. Anything else (signs, spaces, decimals, empty
/// input, overflow) is `None`.
pub fn parse(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parses `raw`, falling back to `min` on invalid text.
pub fn normalize(raw: &str, bounds: QuantityBounds) -> u32 {
    parse(raw).unwrap_or(bounds.min)
}

/// One step up, never past `max`.
pub fn increment(current: u32, max: u32) -> u32 {
    current.saturating_add(1).min(max)
}

/// One step down, never below `min`.
pub fn decrement(current: u32, min: u32) -> u32 {
    if current > min {
        current - 1
    } else {
        min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityAction {
    Increment,
    Decrement,
    Set,
}

/// Applies a user action to the raw text currently in the input.
///
/// `Set` keeps the typed value as-is (it may be out of range; the validation
/// pass reports that), while the buttons always start from the normalized
/// value and clamp.
pub fn apply(action: QuantityAction, raw: &str, bounds: QuantityBounds) -> u32 {
    let current = normalize(raw, bounds);
    match action {
        QuantityAction::Increment => increment(current, bounds.max),
        QuantityAction::Decrement => decrement(current, bounds.min),
        QuantityAction::Set => current,
    }
}
