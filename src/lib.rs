//! # Robogfx
//!
//! The rendering device of a programmable-robot strategy game: an abstract
//! `Device` contract over the fixed-function era of graphics APIs, and an
//! OpenGL 3.3 core profile implementation emulating it with one shader
//! program.
//!
//! ```rust,ignore
//! use robogfx::prelude::*;
//!
//! let config = DeviceConfig::from_config_file(&ConfigFile::load("settings.json")?);
//! let mut ctx = GLContext::new("robogfx", &config)?;
//! let mut device = GL33Device::new(config, robogfx::backends::new());
//! device.create()?;
//! ```

#[macro_use]
extern crate log;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod backends;
pub mod device;
pub mod gl33;
pub mod settings;

pub mod prelude {
    pub use crate::backends::headless::{HeadlessVisitor, Journal};
    #[cfg(not(target_arch = "wasm32"))]
    pub use crate::backends::gl::{GLContext, SurfaceEvent};
    pub use crate::backends::{Capabilities, Visitor};
    pub use crate::device::*;
    pub use crate::errors::{DeviceError, Result};
    pub use crate::gl33::{DeviceState, GL33Device, ProgramSources};
    pub use crate::math::prelude::*;
    pub use crate::settings::{ConfigFile, GraphicsSettings};
}
