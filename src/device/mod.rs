//! The abstract rendering device consumed by the engine, and the value types
//! passed through it.
//!
//! A device follows a simple lifecycle. It is constructed with a
//! `DeviceConfig`, initialized with `create` once a graphics context is
//! current, and then driven once per frame:
//!
//! ```text
//! begin_scene -> (set_* | draw_*)* -> end_scene
//! ```
//!
//! Resources like textures, static buffers and framebuffers could be created
//! or destroyed at any time between `create` and `destroy`, independent of
//! the frame boundaries. Handles returned by a device are plain values; a
//! destroyed handle never resolves again, even after its slot is reused.

pub mod config;
pub mod framebuffer;
pub mod material;
pub mod texture;
pub mod tunables;
pub mod types;
pub mod vertex;

pub use self::config::DeviceConfig;
pub use self::framebuffer::{
    AttachmentType, Framebuffer, FramebufferAttachment, FramebufferParams, DEFAULT_FRAMEBUFFER,
};
pub use self::material::{Light, LightType, Material};
pub use self::texture::{Image, ImageData, Texture, TextureHandle};
pub use self::tunables::Tunables;
pub use self::types::*;
pub use self::vertex::{Vertex, VertexCol, VertexTex2, VertexType, Vertices};

use crate::errors::*;
use crate::math::prelude::*;

impl_handle!(StaticBufferHandle);

/// Number of light slots of a device.
pub const MAX_LIGHT_COUNT: usize = 8;

/// Number of texture stages of a device. Stage 0 and 1 are the primary and
/// secondary textures, stage 2 samples the shadow map.
pub const MAX_TEXTURE_STAGE_COUNT: usize = 3;

/// The rendering device contract.
///
/// Setters are idempotent and observable by the next draw call. Calls made
/// out of lifecycle order, or with unknown handles and out-of-range indices,
/// are logged and ignored; the ones returning a value report them as errors.
pub trait Device {
    /// Logs the content of every light slot.
    fn debug_lights(&self);

    /// Probes the context, builds the shader program and pushes the default
    /// state. The device is unusable if this fails.
    fn create(&mut self) -> Result<()>;

    /// Releases every resource owned by the device.
    fn destroy(&mut self);

    /// Applies a new surface configuration without touching resources.
    fn config_changed(&mut self, config: DeviceConfig);

    fn config(&self) -> &DeviceConfig;

    fn begin_scene(&mut self);

    fn end_scene(&mut self);

    /// Clears the current framebuffer with the clear color.
    fn clear(&mut self);

    fn set_transform(&mut self, tp: TransformType, matrix: &Matrix4<f32>);

    fn set_material(&mut self, material: &Material);

    fn max_light_count(&self) -> usize;

    fn set_light(&mut self, index: usize, light: &Light);

    fn set_light_enabled(&mut self, index: usize, enabled: bool);

    fn create_texture(&mut self, image: &Image, params: &TextureCreateParams) -> Result<Texture>;

    fn create_texture_from_data(
        &mut self,
        data: &ImageData,
        params: &TextureCreateParams,
    ) -> Result<Texture>;

    /// Creates a depth-only texture of `depth` bits.
    fn create_depth_texture(&mut self, width: u32, height: u32, depth: u32) -> Result<Texture>;

    fn destroy_texture(&mut self, texture: &Texture);

    fn destroy_all_textures(&mut self);

    fn max_texture_stage_count(&self) -> usize;

    /// Binds `texture` to stage `index`, or clears the stage with `None`.
    fn set_texture(&mut self, index: usize, texture: Option<&Texture>);

    /// Binds the texture attachment of a named framebuffer to stage `index`.
    fn set_framebuffer_texture(
        &mut self,
        index: usize,
        name: &str,
        attachment: FramebufferAttachment,
    );

    fn set_texture_enabled(&mut self, index: usize, enabled: bool);

    fn set_texture_stage_params(&mut self, index: usize, params: &TextureStageParams);

    fn set_texture_stage_wrap(&mut self, index: usize, wrap_s: TexWrapMode, wrap_t: TexWrapMode);

    fn set_texture_coord_generation(&mut self, index: usize, params: &TextureGenerationParams);

    /// Draws transient vertices. `color` is used as the flat color of the
    /// layouts without a per-vertex color.
    fn draw_primitive(&mut self, primitive: PrimitiveType, vertices: Vertices, color: Color);

    fn create_static_buffer(
        &mut self,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<StaticBufferHandle>;

    /// Re-uploads a static buffer. The vertex layout must match the one the
    /// buffer was created with and the data must fit its allocation.
    fn update_static_buffer(
        &mut self,
        handle: StaticBufferHandle,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<()>;

    fn draw_static_buffer(&mut self, handle: StaticBufferHandle);

    fn destroy_static_buffer(&mut self, handle: StaticBufferHandle);

    /// Returns the frustum planes the sphere lies entirely outside of.
    fn compute_sphere_visibility(&self, center: Vector3<f32>, radius: f32) -> PlaneMask;

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    fn set_render_state(&mut self, state: RenderState, enabled: bool);

    fn set_color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);

    fn set_depth_test_func(&mut self, func: CompFunc);

    fn set_depth_bias(&mut self, factor: f32, units: f32);

    fn set_alpha_test_func(&mut self, func: CompFunc, reference: f32);

    fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc);

    fn set_clear_color(&mut self, color: Color);

    fn set_global_ambient(&mut self, color: Color);

    fn set_fog_params(&mut self, mode: FogMode, color: Color, start: f32, end: f32, density: f32);

    fn set_cull_mode(&mut self, mode: CullMode);

    fn set_shade_model(&mut self, model: ShadeModel);

    fn set_shadow_color(&mut self, value: f32);

    fn set_fill_mode(&mut self, mode: FillMode);

    /// Copies a region of the bound framebuffer into `texture`.
    fn copy_framebuffer_to_texture(
        &mut self,
        texture: &Texture,
        offset: Vector2<i32>,
        origin: Vector2<i32>,
        size: Vector2<u32>,
    );

    /// Reads back the RGBA pixels of the bound framebuffer.
    fn frame_buffer_pixels(&mut self) -> Result<Vec<u8>>;

    fn framebuffer(&self, name: &str) -> Option<&Framebuffer>;

    /// Creates a framebuffer, releasing any previous one with the same name.
    fn create_framebuffer(&mut self, name: &str, params: &FramebufferParams)
        -> Result<&Framebuffer>;

    fn delete_framebuffer(&mut self, name: &str);

    /// Makes the named framebuffer the render target.
    fn bind_framebuffer(&mut self, name: &str);

    fn is_anisotropy_supported(&self) -> bool;

    fn max_anisotropy_level(&self) -> u32;

    fn max_samples(&self) -> u32;

    fn is_shadow_mapping_supported(&self) -> bool;

    fn max_texture_size(&self) -> u32;

    fn is_framebuffer_supported(&self) -> bool;

    fn texture_mipmap_level(&self) -> u32;

    fn set_texture_mipmap_level(&mut self, level: u32);

    fn texture_anisotropy_level(&self) -> u32;

    fn set_texture_anisotropy_level(&mut self, level: u32);

    fn multisample(&self) -> u32;

    fn set_multisample(&mut self, samples: u32);

    fn texture_filter_mode(&self) -> TexFilter;

    fn set_texture_filter_mode(&mut self, filter: TexFilter);

    fn shadow_mapping(&self) -> bool;

    fn set_shadow_mapping(&mut self, enabled: bool);

    fn shadow_mapping_quality(&self) -> bool;

    fn set_shadow_mapping_quality(&mut self, enabled: bool);

    fn shadow_mapping_resolution(&self) -> u32;

    fn set_shadow_mapping_resolution(&mut self, resolution: u32);
}
