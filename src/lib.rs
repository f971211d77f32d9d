//! Entity component system core for a small real-time game engine.
//!
//! Components of each type are stored densely and compacted on removal,
//! capabilities of entities are queried with bitmasks, and entity deletion
//! is deferred until the end of the frame.

pub use app::Engine;
pub use ecs::{Entity, EntityComponentManager};
pub use error::{Error, Result, Status};

pub mod app;
pub mod config;
pub mod ecs;
pub mod error;
pub mod graphics;
