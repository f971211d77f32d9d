//! Demo: entities drift along X and destroy themselves once they leave [-1, 1].

use std::error::Error;
use std::time::Duration;

use ultraviolet::Vec3;

use tessera::app::Engine;
use tessera::config::{Config, ENGINE_VERSION};
use tessera::ecs::{
    world_position, BehaviourContext, EntityComponentManager, GameBehaviour, GameLogicComponent,
    TransformComponent,
};
use tessera::graphics::HeadlessRenderer;

#[cfg(not(feature = "env-logger"))]
mod logger;

const ENTITY_COUNT: usize = 5;
const REPORT_PERIOD: u32 = 72;

/// Moves the owner along X with constant speed until it leaves [-1, 1].
struct MoveBackAndForth {
    speed: f32,
    direction: f32,
    updates: u32,
}

impl MoveBackAndForth {
    fn new(speed: f32) -> Self {
        Self {
            speed,
            direction: 1.0,
            updates: 0,
        }
    }
}

impl GameBehaviour for MoveBackAndForth {
    fn update(&mut self, dt: f64, context: &mut BehaviourContext<'_>) {
        let owner = context.owner();
        let translation = Vec3::new(self.direction * self.speed * dt as f32, 0.0, 0.0);
        let manager = context.manager();
        match manager.get_component_mut::<TransformComponent>(owner) {
            Some(transform) => transform.translate_local(translation),
            None => return,
        }
        let position = world_position(manager, owner).unwrap_or_else(Vec3::zero);
        self.updates += 1;

        if position.x.abs() > 1.0 {
            context.unregister_this();
            if let Err(error) = context.owning_entity().destroy() {
                log::warn!("{} could not be destroyed: {}", owner, error);
            }
            log::info!("{} left the track at x = {:.3}", owner, position.x);
            return;
        }
        if self.updates == REPORT_PERIOD {
            log::info!(
                "{}: {:.3}, {:.3}, {:.3}",
                owner,
                position.x,
                position.y,
                position.z
            );
            self.updates = 0;
        }
    }
}

fn setup(manager: &mut EntityComponentManager) -> tessera::error::Result<()> {
    for index in 0..ENTITY_COUNT {
        let mut logic = GameLogicComponent::new();
        logic.register_behaviour(Box::new(MoveBackAndForth::new(1.0 + index as f32 * 0.25)));
        let mut entity = manager.create_entity();
        entity.add_component(logic)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "env-logger")]
    pretty_env_logger::try_init()?;
    #[cfg(not(feature = "env-logger"))]
    let _handle = logger::init(log::LevelFilter::Info)?;

    log::info!("tessera {}", *ENGINE_VERSION);
    let config = Config::new("move back and forth".to_string(), ENGINE_VERSION.clone());
    let renderer = HeadlessRenderer::new()
        .with_frame_limit(180)
        .with_frame_time(Duration::from_millis(16));

    Engine::new(config, renderer).with_initialization(setup).run();
    Ok(())
}
