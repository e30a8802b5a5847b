//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{DISPLAY_DECIMAL_PLACES, DEFAULT_SETTLEMENT_EPSILON, is_material, round_for_display};
