//! Local, slot-based arrangement of a container's children.
//!
//! Adapters position a fixed set of typed children with one of five
//! arrangement codes; generic containers stack theirs in a row or column.

pub mod adapter;
pub mod stack;
pub(crate) mod types;

pub use adapter::{AdapterLayout, AdapterMode, Arrangement, arrange, arrange_to_fit, required_size};
pub use stack::{StackDirection, stack};
pub use types::*;
