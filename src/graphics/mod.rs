//! Boundary between the engine and a render backend.

use std::thread;
use std::time::Duration;

use crate::ecs::{DrawFunction, EntityComponentManager, Primitive, RenderComponent, ShaderProgram};
use crate::error::{Error, Result};

/// Render backend driven by the engine once per frame.
///
/// The backend owns GPU resources of render components. It only sees the
/// components for the duration of [`render`](Renderer::render): the store
/// compacts whenever a component is added or removed.
///
pub trait Renderer {
    /// Called once before the first frame.
    fn initialize(&mut self, _manager: &EntityComponentManager) -> Result<()> {
        Ok(())
    }

    /// Draws every render component.
    ///
    /// # Errors
    ///
    /// [`Error::RenderingTerminated`] is returned once the render surface was closed.
    ///
    fn render(&mut self, components: &[RenderComponent]) -> Result<()>;
}

/// Draw call a backend would issue for one render component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub function: DrawFunction,
    pub primitive: Primitive,
    pub shader_program: ShaderProgram,
    /// Count of vertices or indices drawn.
    pub count: usize,
    /// Offset in the vertex buffer for arrays, in bytes of the element buffer for elements.
    pub offset: usize,
}

impl From<&RenderComponent> for DrawCall {
    fn from(component: &RenderComponent) -> Self {
        let function = component.draw_function();
        let (count, offset) = match function {
            DrawFunction::Arrays => (component.vertex_count(), component.vertex_buffer_offset()),
            DrawFunction::Elements => (component.index_count(), component.element_offset()),
        };
        Self {
            function,
            primitive: component.primitive(),
            shader_program: component.shader_program(),
            count,
            offset,
        }
    }
}

/// Renderer without any surface.
///
/// Records draw calls instead of issuing them; the surface "closes"
/// after the optional frame limit is reached.
///
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frame_limit: Option<u64>,
    frame_time: Option<Duration>,
    frames: u64,
    draw_calls: u64,
    last_frame: Vec<DrawCall>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminates rendering after the given count of frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Sleeps for the given duration each frame, as if waiting for vsync.
    pub fn with_frame_time(mut self, frame_time: Duration) -> Self {
        self.frame_time = Some(frame_time);
        self
    }

    /// Count of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Count of draw calls over all frames.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Draw calls of the latest frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }
}

impl Renderer for HeadlessRenderer {
    fn initialize(&mut self, manager: &EntityComponentManager) -> Result<()> {
        let components = manager.component_store::<RenderComponent>()?;
        log::info!(
            "headless renderer initialized with {} render components",
            components.len()
        );
        Ok(())
    }

    fn render(&mut self, components: &[RenderComponent]) -> Result<()> {
        if matches!(self.frame_limit, Some(limit) if self.frames >= limit) {
            return Err(Error::RenderingTerminated);
        }
        self.last_frame.clear();
        self.last_frame.extend(components.iter().map(DrawCall::from));
        self.draw_calls += components.len() as u64;
        self.frames += 1;
        log::trace!("frame #{}: {} draw calls", self.frames, components.len());

        if let Some(frame_time) = self.frame_time {
            thread::sleep(frame_time);
        }
        Ok(())
    }
}
