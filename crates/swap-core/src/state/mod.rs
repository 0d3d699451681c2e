//! Flow state tracking.

pub mod swap;

pub use swap::{is_valid_transition, InvalidTransition, PhaseTracker, SwapPhase};
