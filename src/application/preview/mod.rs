//! The refactor preview engine: tree state, auto-expansion, diff resource
//! resolution and the session controller tying them together.

pub mod controller;
pub mod element;
pub mod expand;
pub mod flags;
pub mod resolver;
pub mod tree;
pub mod view_states;


pub use controller::*;
pub use element::*;
pub use expand::AutoExpandPlanner;
pub use flags::ContextFlags;
pub use resolver::{DiffResources, ResourceResolver};
pub use tree::*;
pub use view_states::*;
