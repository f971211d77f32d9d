//! Configuration utilities for game engine and your game.

use std::time::Duration;

use semver::Version;

/// Name of the engine crate.
pub const ENGINE_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");

const ENGINE_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");
lazy_static::lazy_static! {
    /// Semver version of the engine crate.
    pub static ref ENGINE_VERSION: Version = Version::parse(ENGINE_VERSION_STR)
        .unwrap_or_else(|_| Version::new(0, 0, 0));
}

/// Fixed simulation step: 144 ticks per second.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_nanos(6_944_444);

/// Number of slots each component store reserves up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// This struct represents general configuration of game engine.
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    version: Version,
    tick_period: Duration,
    initial_capacity: usize,
}

impl Config {
    /// Creates new configuration with given name and version of your game.
    pub const fn new(name: String, version: Version) -> Self {
        Self {
            name,
            version,
            tick_period: DEFAULT_TICK_PERIOD,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Replaces the fixed update period of the game loop.
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Replaces the number of slots reserved by each component store.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Name of your game.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semver version of your game.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Duration of one simulation tick.
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Initial capacity of every component store.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("Hello World".to_string(), Version::new(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.name(), "Hello World");
        assert_eq!(config.version(), &Version::new(0, 0, 0));
        assert_eq!(config.tick_period(), Duration::from_nanos(6_944_444));
        assert_eq!(config.initial_capacity(), 1024);
    }

    #[test]
    fn test_builder() {
        let config = Config::new("test".to_string(), Version::new(1, 2, 3))
            .with_tick_period(Duration::from_millis(10))
            .with_initial_capacity(8);
        assert_eq!(config.tick_period(), Duration::from_millis(10));
        assert_eq!(config.initial_capacity(), 8);
        assert_eq!(config.version().to_string(), "1.2.3");
    }

    #[test]
    fn test_engine_version() {
        assert_eq!(ENGINE_VERSION.to_string(), env!("CARGO_PKG_VERSION"));
        assert_eq!(ENGINE_NAME, "tessera");
    }
}
