//! Utilities for *components* in ECS.

use std::any::Any;

pub use handle::*;
pub use logic::*;
pub use registry::*;
pub use render::*;
pub use storage::*;
pub use transform::*;

mod handle;
mod logic;
mod registry;
mod render;
mod storage;
mod transform;

/// Objects of this trait represent *component* of ECS.
///
/// Any `'static` type can be a component once it is registered
/// in the [`ComponentRegistry`] of a manager.
///
pub trait Component: Any {}

impl<T> Component for T where T: Any {}
