use gl;
use glutin;
use glutin::GlContext;

use crate::device::DeviceConfig;
use crate::errors::*;
use crate::math::prelude::Vector2;

/// Events of the window surface the device cares about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface was resized to the physical size.
    Resized(Vector2<u32>),
    Closed,
}

/// A window with an OpenGL 3.3 core context, the surface a `GL33Device`
/// renders into.
pub struct GLContext {
    window: glutin::GlWindow,
    events_loop: glutin::EventsLoop,
}

impl GLContext {
    /// Opens a window described by `config`, makes its context current and
    /// loads the GL symbols.
    pub fn new(title: &str, config: &DeviceConfig) -> Result<Self> {
        let events_loop = glutin::EventsLoop::new();

        let monitor = if config.full_screen {
            Some(events_loop.get_primary_monitor())
        } else {
            None
        };

        let builder = glutin::WindowBuilder::new()
            .with_title(title)
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(config.size.x),
                f64::from(config.size.y),
            ))
            .with_resizable(config.resizeable)
            .with_fullscreen(monitor);

        let context = glutin::ContextBuilder::new()
            .with_gl_profile(glutin::GlProfile::Core)
            .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (3, 3)))
            .with_double_buffer(Some(config.double_buf))
            .with_depth_buffer(config.depth_size)
            .with_stencil_buffer(config.stencil_size)
            .with_vsync(config.vsync);

        let window = glutin::GlWindow::new(builder, context, &events_loop)
            .map_err(|err| DeviceError::Requirement(format!("OpenGL 3.3 context ({})", err)))?;

        let mut ctx = GLContext {
            window,
            events_loop,
        };

        ctx.events_loop.poll_events(|_| {});

        unsafe {
            ctx.window.make_current()?;
            let window = &ctx.window;
            gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);
        }

        info!(
            "[GLContext] Opened {:?} window of {:?}.",
            title,
            ctx.dimensions()
        );

        Ok(ctx)
    }

    /// Physical size of the window surface.
    pub fn dimensions(&self) -> Vector2<u32> {
        let dpr = self.window.get_hidpi_factor();
        match self.window.get_inner_size() {
            Some(size) => {
                let size = size.to_physical(dpr);
                Vector2::new(size.width as u32, size.height as u32)
            }
            None => Vector2::new(0, 0),
        }
    }

    pub fn resize(&self, dimensions: Vector2<u32>) {
        let size = glutin::dpi::PhysicalSize::new(f64::from(dimensions.x), f64::from(dimensions.y));
        self.window.resize(size)
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        self.window.is_current()
    }

    pub fn make_current(&self) -> Result<()> {
        unsafe {
            self.window.make_current()?;
            Ok(())
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.window.swap_buffers()?;
        Ok(())
    }

    /// Drains pending window events.
    pub fn poll_events(&mut self, events: &mut Vec<SurfaceEvent>) {
        let window = &self.window;
        self.events_loop.poll_events(|v| {
            if let glutin::Event::WindowEvent { event, .. } = v {
                match event {
                    glutin::WindowEvent::Resized(size) => {
                        let size = size.to_physical(window.get_hidpi_factor());
                        window.resize(size);
                        events.push(SurfaceEvent::Resized(Vector2::new(
                            size.width as u32,
                            size.height as u32,
                        )));
                    }
                    glutin::WindowEvent::CloseRequested => events.push(SurfaceEvent::Closed),
                    _ => {}
                }
            }
        });
    }
}
