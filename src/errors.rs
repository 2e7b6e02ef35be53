//! Error types shared by the device and its backends.

pub use failure::{bail, format_err, Error, Fail, ResultExt};

use crate::device::{StaticBufferHandle, TextureHandle, VertexType};

pub type Result<T> = ::std::result::Result<T, Error>;

/// Categorized device failures. Backends report everything else as plain
/// `failure::Error` messages.
#[derive(Debug, Fail)]
pub enum DeviceError {
    #[fail(display = "Graphics context doesn't support {}.", _0)]
    Requirement(String),
    #[fail(display = "Failed to create shader program, errors: \n{}", _0)]
    ShaderCreationFailure(String),
    #[fail(display = "Uniform({}) is undefined in shader sources.", _0)]
    UniformMissing(String),
    #[fail(display = "Operation `{}` is not allowed while the device is {:?}.", _0, _1)]
    InvalidState(&'static str, crate::gl33::DeviceState),
    #[fail(display = "{} is invalid.", _0)]
    TextureHandleInvalid(TextureHandle),
    #[fail(display = "{} is invalid.", _0)]
    StaticBufferHandleInvalid(StaticBufferHandle),
    #[fail(
        display = "Static buffer layout is {:?}, can not update it with {:?}.",
        _0, _1
    )]
    VertexLayoutMismatch(VertexType, VertexType),
    #[fail(
        display = "Static buffer holds {} bytes, can not upload {} bytes.",
        _0, _1
    )]
    BufferOverflow(usize, usize),
    #[fail(
        display = "Texture of {}x{} exceeds the maximum size {}.",
        _0, _1, _2
    )]
    TextureTooLarge(u32, u32, u32),
    #[fail(display = "Image data holds {} bytes, expected {}.", _0, _1)]
    ImageDataMismatch(usize, usize),
    #[fail(display = "Framebuffer is incomplete: {}", _0)]
    FramebufferIncomplete(String),
    #[fail(display = "Framebuffer name `{}` is reserved.", _0)]
    ReservedFramebuffer(String),
}
