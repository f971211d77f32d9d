//! Utilities for engine initialization and the game loop.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::ecs::{EntityComponentManager, RenderComponent};
use crate::error::{Error, Result, Status};
use crate::graphics::Renderer;

/// Type which represents duration between two frames.
pub type DeltaTime = Duration;

/// Callback which sets up the initial state of the game.
pub type Initialization = Box<dyn FnMut(&mut EntityComponentManager) -> Result<()>>;

/// Time bookkeeping of the fixed step game loop.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct SimulationTime {
    /// Total simulated time.
    pub simulation_time: Duration,
    /// Elapsed wall time not simulated yet.
    pub accumulator: Duration,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds elapsed wall time to be simulated.
    pub fn advance(&mut self, elapsed: DeltaTime) {
        self.accumulator += elapsed;
    }
}

/// General context of game engine.
///
/// Owns the entity-component manager and the render backend and drives both:
/// systems are updated with a fixed step, then the frame is rendered,
/// then deleted entities are swept.
///
pub struct Engine<R>
where
    R: Renderer,
{
    config: Config,
    manager: EntityComponentManager,
    renderer: R,
    initialization: Option<Initialization>,
}

impl<R> Engine<R>
where
    R: Renderer,
{
    /// Creates engine with built-in components and the game logic system.
    pub fn new(config: Config, renderer: R) -> Self {
        let manager = EntityComponentManager::with_config(&config);
        Self {
            config,
            manager,
            renderer,
            initialization: None,
        }
    }

    /// Creates engine around a custom manager.
    pub fn with_manager(config: Config, manager: EntityComponentManager, renderer: R) -> Self {
        Self {
            config,
            manager,
            renderer,
            initialization: None,
        }
    }

    /// Sets callback which creates the initial state of the game.
    pub fn with_initialization<F>(mut self, initialization: F) -> Self
    where
        F: FnMut(&mut EntityComponentManager) -> Result<()> + 'static,
    {
        self.inject_initialization(initialization);
        self
    }

    /// Replaces callback which creates the initial state of the game.
    pub fn inject_initialization<F>(&mut self, initialization: F)
    where
        F: FnMut(&mut EntityComponentManager) -> Result<()> + 'static,
    {
        self.initialization = Some(Box::new(initialization));
    }

    /// Runs the initialization callback, then initializes the renderer.
    ///
    /// # Errors
    ///
    /// [`Error::EngineFailureNoInitialState`] if no callback was set,
    /// otherwise whatever the callback or the renderer returns.
    ///
    pub fn initialize(&mut self) -> Result<()> {
        let mut initialization = self
            .initialization
            .take()
            .ok_or(Error::EngineFailureNoInitialState)?;
        initialization(&mut self.manager)?;
        self.renderer.initialize(&self.manager)?;
        log::info!(
            "{} {} initialized with {} entities",
            self.config.name(),
            self.config.version(),
            self.manager.entity_count(),
        );
        Ok(())
    }

    /// Simulates `dt` seconds once.
    pub fn update(&mut self, dt: f64) -> Status {
        self.manager.update_systems(dt)
    }

    /// Hands every render component to the renderer.
    pub fn render(&mut self) -> Result<()> {
        let components = self
            .manager
            .component_store::<RenderComponent>()
            .unwrap_or(&[]);
        self.renderer.render(components)
    }

    /// Sweeps entities deleted during this frame.
    pub fn garbage_collect(&mut self) {
        self.manager.garbage_collect();
    }

    /// Runs as many fixed steps as fit into the accumulated time.
    ///
    /// Failures of each step are logged and combined into the returned status.
    ///
    pub fn run_ticks(&mut self, time: &mut SimulationTime) -> Status {
        let period = self.config.tick_period();
        if period.is_zero() {
            log::warn!("tick period is zero, simulation is skipped");
            return Status::OK;
        }
        let dt = period.as_secs_f64();

        let mut status = Status::OK;
        while time.accumulator >= period {
            let tick_status = self.update(dt);
            if !tick_status.is_ok() {
                log::warn!("tick at {:?} reported {}", time.simulation_time, tick_status);
            }
            status |= tick_status;
            time.accumulator -= period;
            time.simulation_time += period;
        }
        status
    }

    /// Initializes the engine and runs the game loop until rendering terminates.
    ///
    /// # Errors
    ///
    /// Initialization errors and render errors other than
    /// [`Error::RenderingTerminated`] are returned.
    ///
    pub fn try_run(&mut self) -> Result<()> {
        self.initialize()?;

        let mut time = SimulationTime::new();
        let mut previous = Instant::now();
        loop {
            let now = Instant::now();
            time.advance(now.duration_since(previous));
            previous = now;

            self.run_ticks(&mut time);
            match self.render() {
                Ok(()) => (),
                Err(Error::RenderingTerminated) => break,
                Err(error) => return Err(error),
            }
            self.garbage_collect();
        }
        log::info!(
            "rendering terminated after {:?} of simulation",
            time.simulation_time
        );
        Ok(())
    }

    /// Starts execution of game engine.
    ///
    /// Any failure of initialization is fatal: it is logged and the process exits.
    ///
    pub fn run(mut self) {
        if let Err(error) = self.try_run() {
            log::error!("engine failure: {}", error);
            std::process::exit(-1);
        }
        log::info!("closing this application");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &EntityComponentManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntityComponentManager {
        &mut self.manager
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
