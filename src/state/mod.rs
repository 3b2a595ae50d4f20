//! State module for tracking pagination progress
//!
//! # Components
//!
//! - `PaginationState`: Where the pagination loop is (fetching, extracting, advancing, or done)
//! - `PaginationCursor`: Pages fetched so far plus the one-way termination latch
//! - `Termination`: How a listing ended, distinguishing normal ends from masked errors

mod cursor;
mod pagination_state;

// Re-export main types
pub use cursor::{EndCause, PaginationCursor, Termination};
pub use pagination_state::PaginationState;
