//! The backend of the device, which should be responsible for only one thing:
//! submitting raw calls to the low-level graphics API.

pub mod capabilities;
pub mod headless;

pub use self::capabilities::{Capabilities, Version};

use smallvec::SmallVec;

use crate::device::{
    AttachmentType, BlendFunc, CompFunc, CullMode, FillMode, FramebufferParams, PrimitiveType,
    TexFilter, TexImgFormat, TexWrapMode,
};
use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

/// Name of an object living in the graphics context. Zero names nothing.
pub type ObjectId = u32;

/// Uniform variable for shader program object. Each matrix based
/// `UniformVariable` is supplied in column major order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix3f([[f32; 3]; 3]),
    Matrix4f([[f32; 4]; 4]),
}

/// Usage hint of buffer data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferHint {
    /// Uploaded once, drawn many times.
    Static,
    /// Re-uploaded about every draw.
    Stream,
}

/// One float vertex attribute sourced from a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    /// Number of float components.
    pub size: u8,
    /// Offset in bytes from the start of a vertex.
    pub offset: usize,
}

/// Describes how vertices are laid out in a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: SmallVec<[VertexAttribute; 4]>,
}

impl VertexLayout {
    pub fn new(stride: usize) -> Self {
        VertexLayout {
            stride,
            attributes: SmallVec::new(),
        }
    }

    pub fn with(mut self, location: u32, size: u8, offset: usize) -> Self {
        self.attributes.push(VertexAttribute {
            location,
            size,
            offset,
        });
        self
    }

    /// Returns true if the attribute at `location` is sourced from the buffer.
    pub fn contains(&self, location: u32) -> bool {
        self.attributes.iter().any(|v| v.location == location)
    }
}

/// Server-side capabilities toggled with enable/disable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
    CullFace,
    PolygonOffsetFill,
}

/// One attachment of a framebuffer object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentObject {
    pub kind: AttachmentType,
    pub id: ObjectId,
}

/// The objects backing a framebuffer. The window surface owns none.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferObjects {
    pub fbo: ObjectId,
    pub color: Option<AttachmentObject>,
    pub depth: Option<AttachmentObject>,
}

/// Filtering applied to a texture object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerParams {
    pub filter: TexFilter,
    /// Number of mipmap levels, 1 disables mipmapping.
    pub levels: u32,
    /// Anisotropy level, 1 disables anisotropic filtering.
    pub anisotropy: u32,
}

/// Executes raw graphics API calls. Every method requires the graphics
/// context to be current on the calling thread.
pub trait Visitor {
    /// Queries the capabilities of the context.
    unsafe fn probe(&mut self) -> Result<Capabilities>;

    unsafe fn create_program(&mut self, vs: &str, fs: &str) -> Result<ObjectId>;

    unsafe fn delete_program(&mut self, id: ObjectId) -> Result<()>;

    unsafe fn use_program(&mut self, id: ObjectId) -> Result<()>;

    /// Returns the location of a uniform, or `None` if the program does not
    /// declare it.
    unsafe fn uniform_location(&mut self, program: ObjectId, name: &str) -> Result<Option<i32>>;

    /// Uploads a uniform of the program in use.
    unsafe fn bind_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()>;

    /// Creates a 2D texture from tightly packed pixels and leaves it bound to
    /// texture unit 0.
    unsafe fn create_texture(
        &mut self,
        size: Vector2<u32>,
        format: TexImgFormat,
        bytes: &[u8],
    ) -> Result<ObjectId>;

    /// Creates a depth-only texture with depth comparison enabled.
    unsafe fn create_depth_texture(&mut self, size: Vector2<u32>, depth: u32) -> Result<ObjectId>;

    /// Applies filtering to the texture bound to texture unit 0.
    unsafe fn set_sampler(&mut self, params: SamplerParams) -> Result<()>;

    /// Sets wrap modes of the texture bound to `unit`.
    unsafe fn set_wrap(&mut self, unit: usize, s: TexWrapMode, t: TexWrapMode) -> Result<()>;

    unsafe fn delete_texture(&mut self, id: ObjectId) -> Result<()>;

    /// Binds a texture to `unit`, zero unbinds.
    unsafe fn bind_texture(&mut self, unit: usize, id: ObjectId) -> Result<()>;

    /// Creates a buffer object initialized with `bytes`.
    unsafe fn create_buffer(&mut self, bytes: &[u8], hint: BufferHint) -> Result<ObjectId>;

    /// Re-allocates the storage of a buffer object with `bytes`.
    unsafe fn upload_buffer(&mut self, id: ObjectId, bytes: &[u8], hint: BufferHint)
        -> Result<()>;

    /// Writes `bytes` into the existing storage of a buffer object.
    unsafe fn update_buffer(&mut self, id: ObjectId, offset: usize, bytes: &[u8]) -> Result<()>;

    unsafe fn delete_buffer(&mut self, id: ObjectId) -> Result<()>;

    /// Creates a vertex array object sourcing `layout` from buffer `vbo`.
    unsafe fn create_vertex_array(&mut self, vbo: ObjectId, layout: &VertexLayout)
        -> Result<ObjectId>;

    unsafe fn bind_vertex_array(&mut self, id: ObjectId) -> Result<()>;

    unsafe fn delete_vertex_array(&mut self, id: ObjectId) -> Result<()>;

    /// Sets the value of an attribute which is not sourced from a buffer.
    unsafe fn set_constant_attribute(&mut self, location: u32, value: [f32; 4]) -> Result<()>;

    /// Draws `count` vertices of the bound vertex array from `first`.
    unsafe fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32)
        -> Result<()>;

    unsafe fn set_capability(&mut self, capability: Capability, enabled: bool) -> Result<()>;

    unsafe fn set_depth_func(&mut self, func: CompFunc) -> Result<()>;

    unsafe fn set_depth_mask(&mut self, write: bool) -> Result<()>;

    unsafe fn set_polygon_offset(&mut self, factor: f32, units: f32) -> Result<()>;

    unsafe fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) -> Result<()>;

    unsafe fn set_color_mask(&mut self, mask: [bool; 4]) -> Result<()>;

    unsafe fn set_front_face(&mut self, mode: CullMode) -> Result<()>;

    unsafe fn set_polygon_mode(&mut self, mode: FillMode) -> Result<()>;

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()>;

    unsafe fn clear(&mut self, color: bool, depth: bool) -> Result<()>;

    unsafe fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()>;

    unsafe fn create_framebuffer(&mut self, params: &FramebufferParams)
        -> Result<FramebufferObjects>;

    unsafe fn delete_framebuffer(&mut self, objects: &FramebufferObjects) -> Result<()>;

    /// Makes a framebuffer object the render target, zero selects the window.
    unsafe fn bind_framebuffer(&mut self, fbo: ObjectId) -> Result<()>;

    /// Copies a region of the bound framebuffer into a texture.
    unsafe fn copy_framebuffer_to_texture(
        &mut self,
        id: ObjectId,
        offset: Vector2<i32>,
        origin: Vector2<i32>,
        size: Vector2<u32>,
    ) -> Result<()>;

    /// Reads RGBA pixels of the bound framebuffer.
    unsafe fn read_pixels(&mut self, origin: Vector2<i32>, size: Vector2<u32>) -> Result<Vec<u8>>;

    /// Blocks until all execution is complete.
    unsafe fn flush(&mut self) -> Result<()>;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

/// Creates the OpenGL visitor. The context must be current and GL symbols
/// loaded, see `gl::GLContext`.
#[cfg(not(target_arch = "wasm32"))]
pub fn new() -> Box<dyn Visitor> {
    Box::new(self::gl::visitor::GLVisitor::new())
}
