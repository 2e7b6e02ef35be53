//! The OpenGL 3.3 implementation of `Device`.
//!
//! The fixed-function pipeline is emulated by one shader program. A
//! `GL33Device` composes a `StateTracker` recording everything that was set,
//! a `Registry` owning the GPU resources and a `Dispatcher` issuing the
//! draws; all raw calls go through the `Visitor` it was constructed with.
//!
//! ```rust,ignore
//! let mut ctx = GLContext::new("robogfx", &config)?;
//! let mut device = GL33Device::new(config, backends::new());
//! device.create()?;
//!
//! loop {
//!     device.begin_scene();
//!     device.draw_primitive(PrimitiveType::Triangles, (&vertices).into(), Color::white());
//!     device.end_scene();
//!     ctx.swap_buffers()?;
//! }
//! ```

pub mod dispatch;
pub mod registry;
pub mod shader;
pub mod state;

pub use self::registry::StaticBuffer;
pub use self::shader::ProgramSources;
pub use self::state::{Fog, PipelineState, Sampler, StateTracker, TextureStage};

use crate::backends::{Capabilities, Capability, ObjectId, Visitor};
use crate::device::*;
use crate::errors::*;
use crate::math::prelude::*;
use crate::math::sphere_visibility;

use self::dispatch::Dispatcher;
use self::registry::Registry;

/// Lifecycle of a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Uninitialized,
    Created,
    /// Between `begin_scene` and `end_scene`.
    InScene,
    Destroyed,
}

pub struct GL33Device {
    config: DeviceConfig,
    visitor: Box<dyn Visitor>,
    sources: ProgramSources,
    lifecycle: DeviceState,
    capabilities: Capabilities,
    tunables: Tunables,
    program: ObjectId,
    state: StateTracker,
    registry: Registry,
    dispatcher: Dispatcher,
    bound_framebuffer: String,
}

#[inline]
fn report(op: &str, result: Result<()>) {
    if let Err(err) = result {
        warn!("[GL33Device] `{}` failed: {}", op, err);
    }
}

impl GL33Device {
    /// Creates a device submitting its calls to `visitor`. Nothing touches
    /// the graphics context until `create`.
    pub fn new(config: DeviceConfig, visitor: Box<dyn Visitor>) -> Self {
        GL33Device {
            config,
            visitor,
            sources: ProgramSources::default(),
            lifecycle: DeviceState::Uninitialized,
            capabilities: Capabilities::default(),
            tunables: Tunables::default(),
            program: 0,
            state: StateTracker::new(config.size),
            registry: Registry::new(),
            dispatcher: Dispatcher::new(),
            bound_framebuffer: DEFAULT_FRAMEBUFFER.to_owned(),
        }
    }

    /// Replaces the sources of the shader program built by `create`.
    pub fn with_program(mut self, sources: ProgramSources) -> Self {
        self.sources = sources;
        self
    }

    #[inline]
    pub fn device_state(&self) -> DeviceState {
        self.lifecycle
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[inline]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Everything set on this device so far.
    #[inline]
    pub fn tracker(&self) -> &StateTracker {
        &self.state
    }

    #[inline]
    pub fn transform(&self, tp: TransformType) -> Matrix4<f32> {
        self.state.transform(tp)
    }

    #[inline]
    pub fn model_view(&self) -> Matrix4<f32> {
        self.state.model_view()
    }

    #[inline]
    pub fn light(&self, index: usize) -> Option<&Light> {
        self.state.light(index)
    }

    #[inline]
    pub fn is_light_enabled(&self, index: usize) -> bool {
        self.state.is_light_enabled(index)
    }

    #[inline]
    pub fn render_state(&self, state: RenderState) -> bool {
        self.state.render_state(state)
    }

    #[inline]
    pub fn texture_stage(&self, index: usize) -> Option<&TextureStage> {
        self.state.stage(index)
    }

    /// Returns true if `texture` is alive in this device.
    #[inline]
    pub fn contains_texture(&self, texture: &Texture) -> bool {
        self.registry.texture_id(texture.handle).is_some()
    }

    #[inline]
    pub fn texture_count(&self) -> usize {
        self.registry.texture_count()
    }

    #[inline]
    pub fn static_buffer(&self, handle: StaticBufferHandle) -> Option<&StaticBuffer> {
        self.registry.static_buffer(handle)
    }

    #[inline]
    pub fn static_buffer_count(&self) -> usize {
        self.registry.static_buffer_count()
    }

    /// Name of the framebuffer being rendered into.
    #[inline]
    pub fn bound_framebuffer(&self) -> &str {
        &self.bound_framebuffer
    }

    fn is_ready(&self, op: &str) -> bool {
        match self.lifecycle {
            DeviceState::Created | DeviceState::InScene => true,
            v => {
                warn!("[GL33Device] `{}` is ignored while the device is {:?}.", op, v);
                false
            }
        }
    }

    fn is_in_scene(&self, op: &str) -> bool {
        if self.lifecycle == DeviceState::InScene {
            true
        } else {
            warn!(
                "[GL33Device] `{}` is ignored outside of a scene ({:?}).",
                op, self.lifecycle
            );
            false
        }
    }

    fn ensure_ready(&self, op: &'static str) -> Result<()> {
        match self.lifecycle {
            DeviceState::Created | DeviceState::InScene => Ok(()),
            v => Err(DeviceError::InvalidState(op, v).into()),
        }
    }

    unsafe fn initialize(&mut self) -> Result<()> {
        let caps = self.visitor.probe()?;
        info!("[GL33Device] {:#?}", caps);
        caps.check_requirements(MAX_TEXTURE_STAGE_COUNT)?;

        self.capabilities = caps;
        self.tunables.clamp(&caps);

        self.program = self
            .visitor
            .create_program(&self.sources.vs, &self.sources.fs)?;
        self.visitor.use_program(self.program)?;

        self.state = StateTracker::new(self.config.size);
        self.state
            .uniforms_mut()
            .resolve(&mut *self.visitor, self.program)?;
        self.state.uniforms_mut().flush(&mut *self.visitor)?;

        self.dispatcher.create(&mut *self.visitor)?;

        let size = self.config.size;
        let depth = u32::from(self.config.depth_size);
        self.registry
            .register_default_framebuffer(Framebuffer::window(size.x, size.y, depth, 1));
        self.bound_framebuffer = DEFAULT_FRAMEBUFFER.to_owned();

        self.push_pipeline_state()
    }

    unsafe fn release(&mut self) {
        self.registry.clear(&mut *self.visitor);

        if let Err(err) = self.dispatcher.destroy(&mut *self.visitor) {
            warn!("[GL33Device] Failed to release auxiliary buffers: {}", err);
        }

        if self.program != 0 {
            report("release", self.visitor.delete_program(self.program));
            self.program = 0;
        }

        self.state.uniforms_mut().reset();
    }

    /// Pushes every piece of pipeline state regardless of what the context
    /// is assumed to hold.
    unsafe fn push_pipeline_state(&mut self) -> Result<()> {
        let p = *self.state.pipeline();
        let v = &mut self.visitor;

        v.set_capability(Capability::Blend, p.blending)?;
        v.set_capability(Capability::DepthTest, p.depth_test)?;
        v.set_capability(Capability::CullFace, p.culling)?;
        v.set_capability(Capability::PolygonOffsetFill, p.depth_bias)?;
        v.set_depth_mask(p.depth_write)?;
        v.set_depth_func(p.depth_func)?;
        v.set_polygon_offset(p.polygon_offset.0, p.polygon_offset.1)?;
        v.set_blend_func(p.blend_func.0, p.blend_func.1)?;
        v.set_color_mask(p.color_mask)?;
        v.set_front_face(p.cull_mode)?;
        v.set_polygon_mode(p.fill_mode)?;
        v.set_clear_color(p.clear_color)?;
        v.set_viewport(p.viewport.0, p.viewport.1)
    }

    /// Resolves the object name sampled by a stage.
    fn sampler_id(&self, sampler: &Sampler) -> Option<ObjectId> {
        match sampler {
            Sampler::Texture(handle) => self.registry.texture_id(*handle),
            Sampler::Framebuffer(name, attachment) => {
                self.registry.framebuffer_texture_id(name, *attachment)
            }
        }
    }

    /// Binds what a stage samples to its texture unit.
    unsafe fn bind_stage(&mut self, index: usize) -> Result<()> {
        let (id, wrap) = match self.state.stage(index) {
            Some(stage) => (
                stage
                    .sampler
                    .as_ref()
                    .and_then(|v| self.sampler_id(v))
                    .unwrap_or(0),
                stage.wrap,
            ),
            None => return Ok(()),
        };

        self.visitor.bind_texture(index, id)?;
        if id != 0 {
            self.visitor.set_wrap(index, wrap.0, wrap.1)?;
        }

        Ok(())
    }

    /// Clears the stages sampling anything `predicate` accepts.
    unsafe fn unbind_samplers<F>(&mut self, predicate: F)
    where
        F: Fn(&Sampler) -> bool,
    {
        for i in 0..MAX_TEXTURE_STAGE_COUNT {
            let sampled = self
                .state
                .stage(i)
                .and_then(|v| v.sampler.as_ref())
                .map(|v| predicate(v))
                .unwrap_or(false);

            if sampled {
                self.state.set_sampler(i, None);
                report("unbind_samplers", self.visitor.bind_texture(i, 0));
            }
        }
    }

    /// Rebinds the named framebuffer after its objects could have changed.
    unsafe fn rebind_framebuffer(&mut self) -> Result<()> {
        let fbo = match self.registry.framebuffer(&self.bound_framebuffer) {
            Some(v) => v.objects.fbo,
            None => {
                self.bound_framebuffer = DEFAULT_FRAMEBUFFER.to_owned();
                0
            }
        };

        self.visitor.bind_framebuffer(fbo)
    }

    unsafe fn apply_wrap(&mut self, index: usize) {
        let bound = self
            .state
            .stage(index)
            .map(|v| v.sampler.is_some())
            .unwrap_or(false);

        if bound {
            report("apply_wrap", self.bind_stage(index));
        }
    }

    fn set_tunables<F>(&mut self, func: F)
    where
        F: FnOnce(&mut Tunables),
    {
        func(&mut self.tunables);

        if self.lifecycle != DeviceState::Uninitialized {
            self.tunables.clamp(&self.capabilities);
        }
    }
}

impl Device for GL33Device {
    fn debug_lights(&self) {
        self.state.debug_lights();
    }

    fn create(&mut self) -> Result<()> {
        if self.lifecycle != DeviceState::Uninitialized {
            return Err(DeviceError::InvalidState("create", self.lifecycle).into());
        }

        match unsafe { self.initialize() } {
            Ok(()) => {
                self.lifecycle = DeviceState::Created;
                info!(
                    "[GL33Device] Created with surface of {}.",
                    self.config.resolution()
                );
                Ok(())
            }
            Err(err) => {
                error!("[GL33Device] Failed to create device: {}", err);
                unsafe { self.release() };
                Err(err)
            }
        }
    }

    fn destroy(&mut self) {
        if !self.is_ready("destroy") {
            return;
        }

        unsafe { self.release() };
        self.lifecycle = DeviceState::Destroyed;
        info!("[GL33Device] Destroyed.");
    }

    fn config_changed(&mut self, config: DeviceConfig) {
        match self.lifecycle {
            DeviceState::Uninitialized => {
                self.config = config;
                return;
            }
            DeviceState::Destroyed => {
                warn!("[GL33Device] `config_changed` is ignored while the device is destroyed.");
                return;
            }
            _ => {}
        }

        self.config = config;
        let size = config.size;

        if let Some(v) = self.registry.framebuffer_mut(DEFAULT_FRAMEBUFFER) {
            v.resize(size.x, size.y);
        }

        if self.state.set_viewport(Vector2::new(0, 0), size) {
            let result = unsafe { self.visitor.set_viewport(Vector2::new(0, 0), size) };
            report("config_changed", result);
        }

        info!("[GL33Device] Surface changed to {}.", config.resolution());
    }

    #[inline]
    fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn begin_scene(&mut self) {
        if self.lifecycle != DeviceState::Created {
            warn!(
                "[GL33Device] `begin_scene` is ignored while the device is {:?}.",
                self.lifecycle
            );
            return;
        }

        report("begin_scene", unsafe { self.visitor.clear(true, true) });
        self.lifecycle = DeviceState::InScene;
    }

    fn end_scene(&mut self) {
        if self.lifecycle != DeviceState::InScene {
            warn!(
                "[GL33Device] `end_scene` is ignored while the device is {:?}.",
                self.lifecycle
            );
            return;
        }

        report("end_scene", unsafe { self.visitor.flush() });
        self.lifecycle = DeviceState::Created;
    }

    fn clear(&mut self) {
        if self.is_ready("clear") {
            report("clear", unsafe { self.visitor.clear(true, true) });
        }
    }

    fn set_transform(&mut self, tp: TransformType, matrix: &Matrix4<f32>) {
        if self.is_ready("set_transform") {
            self.state.set_transform(tp, matrix);
        }
    }

    fn set_material(&mut self, material: &Material) {
        if self.is_ready("set_material") {
            self.state.set_material(material);
        }
    }

    #[inline]
    fn max_light_count(&self) -> usize {
        MAX_LIGHT_COUNT
    }

    fn set_light(&mut self, index: usize, light: &Light) {
        if self.is_ready("set_light") && !self.state.set_light(index, light) {
            warn!("[GL33Device] Light index {} is out of range.", index);
        }
    }

    fn set_light_enabled(&mut self, index: usize, enabled: bool) {
        if self.is_ready("set_light_enabled") && !self.state.set_light_enabled(index, enabled) {
            warn!("[GL33Device] Light index {} is out of range.", index);
        }
    }

    fn create_texture(&mut self, image: &Image, params: &TextureCreateParams) -> Result<Texture> {
        self.create_texture_from_data(&image.as_data(), params)
    }

    fn create_texture_from_data(
        &mut self,
        data: &ImageData,
        params: &TextureCreateParams,
    ) -> Result<Texture> {
        self.ensure_ready("create_texture")?;

        unsafe {
            let result = self.registry.create_texture(
                &mut *self.visitor,
                &self.capabilities,
                data,
                params,
                &self.tunables,
            );

            report("create_texture", self.bind_stage(0));
            result
        }
    }

    fn create_depth_texture(&mut self, width: u32, height: u32, depth: u32) -> Result<Texture> {
        self.ensure_ready("create_depth_texture")?;

        unsafe {
            let result = self.registry.create_depth_texture(
                &mut *self.visitor,
                &self.capabilities,
                Vector2::new(width, height),
                depth,
            );

            report("create_depth_texture", self.bind_stage(0));
            result
        }
    }

    fn destroy_texture(&mut self, texture: &Texture) {
        if !self.is_ready("destroy_texture") {
            return;
        }

        let handle = texture.handle;
        unsafe {
            self.unbind_samplers(|v| *v == Sampler::Texture(handle));

            match self.registry.destroy_texture(&mut *self.visitor, handle) {
                Ok(true) => {}
                Ok(false) => debug!("[GL33Device] {} is not alive.", handle),
                Err(err) => warn!("[GL33Device] Failed to destroy {}: {}", handle, err),
            }
        }
    }

    fn destroy_all_textures(&mut self) {
        if !self.is_ready("destroy_all_textures") {
            return;
        }

        unsafe {
            self.unbind_samplers(|v| match v {
                Sampler::Texture(_) => true,
                _ => false,
            });

            if let Err(err) = self.registry.destroy_all_textures(&mut *self.visitor) {
                warn!("[GL33Device] Failed to destroy textures: {}", err);
            }
        }
    }

    #[inline]
    fn max_texture_stage_count(&self) -> usize {
        MAX_TEXTURE_STAGE_COUNT
    }

    fn set_texture(&mut self, index: usize, texture: Option<&Texture>) {
        if !self.is_ready("set_texture") {
            return;
        }

        if index >= MAX_TEXTURE_STAGE_COUNT {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
            return;
        }

        let sampler = match texture {
            Some(v) if self.contains_texture(v) => Some(Sampler::Texture(v.handle)),
            Some(v) => {
                warn!("[GL33Device] {} is not alive.", v.handle);
                return;
            }
            None => None,
        };

        if self.state.set_sampler(index, sampler) {
            report("set_texture", unsafe { self.bind_stage(index) });
        }
    }

    fn set_framebuffer_texture(
        &mut self,
        index: usize,
        name: &str,
        attachment: FramebufferAttachment,
    ) {
        if !self.is_ready("set_framebuffer_texture") {
            return;
        }

        if index >= MAX_TEXTURE_STAGE_COUNT {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
            return;
        }

        if self
            .registry
            .framebuffer_texture_id(name, attachment)
            .is_none()
        {
            warn!(
                "[GL33Device] Framebuffer {:?} has no {:?} texture.",
                name, attachment
            );
            return;
        }

        let sampler = Sampler::Framebuffer(name.to_owned(), attachment);
        if self.state.set_sampler(index, Some(sampler)) {
            report("set_framebuffer_texture", unsafe { self.bind_stage(index) });
        }
    }

    fn set_texture_enabled(&mut self, index: usize, enabled: bool) {
        if self.is_ready("set_texture_enabled") && !self.state.set_stage_enabled(index, enabled) {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
        }
    }

    fn set_texture_stage_params(&mut self, index: usize, params: &TextureStageParams) {
        if !self.is_ready("set_texture_stage_params") {
            return;
        }

        if index >= MAX_TEXTURE_STAGE_COUNT {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
        } else if self.state.set_stage_params(index, params) {
            unsafe { self.apply_wrap(index) };
        }
    }

    fn set_texture_stage_wrap(&mut self, index: usize, wrap_s: TexWrapMode, wrap_t: TexWrapMode) {
        if !self.is_ready("set_texture_stage_wrap") {
            return;
        }

        if index >= MAX_TEXTURE_STAGE_COUNT {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
        } else if self.state.set_stage_wrap(index, wrap_s, wrap_t) {
            unsafe { self.apply_wrap(index) };
        }
    }

    fn set_texture_coord_generation(&mut self, index: usize, params: &TextureGenerationParams) {
        if self.is_ready("set_texture_coord_generation")
            && !self.state.set_stage_generation(index, params)
        {
            warn!("[GL33Device] Texture stage {} is out of range.", index);
        }
    }

    fn draw_primitive(&mut self, primitive: PrimitiveType, vertices: Vertices, color: Color) {
        if !self.is_in_scene("draw_primitive") || vertices.is_empty() {
            return;
        }

        let result = unsafe {
            self.state
                .uniforms_mut()
                .flush(&mut *self.visitor)
                .and_then(|_| {
                    self.dispatcher
                        .draw_primitive(&mut *self.visitor, primitive, vertices, color)
                })
        };

        report("draw_primitive", result);
    }

    fn create_static_buffer(
        &mut self,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<StaticBufferHandle> {
        self.ensure_ready("create_static_buffer")?;
        unsafe {
            self.registry
                .create_static_buffer(&mut *self.visitor, primitive, vertices)
        }
    }

    fn update_static_buffer(
        &mut self,
        handle: StaticBufferHandle,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<()> {
        self.ensure_ready("update_static_buffer")?;

        let result = unsafe {
            self.registry
                .update_static_buffer(&mut *self.visitor, handle, primitive, vertices)
        };

        if let Err(ref err) = result {
            warn!("[GL33Device] Rejected update of {}: {}", handle, err);
        }

        result
    }

    fn draw_static_buffer(&mut self, handle: StaticBufferHandle) {
        if !self.is_in_scene("draw_static_buffer") {
            return;
        }

        let buffer = match self.registry.static_buffer(handle) {
            Some(v) => *v,
            None => {
                warn!("[GL33Device] {} is not alive.", handle);
                return;
            }
        };

        let result = unsafe {
            self.state
                .uniforms_mut()
                .flush(&mut *self.visitor)
                .and_then(|_| {
                    self.dispatcher
                        .draw_static_buffer(&mut *self.visitor, &buffer)
                })
        };

        report("draw_static_buffer", result);
    }

    fn destroy_static_buffer(&mut self, handle: StaticBufferHandle) {
        if !self.is_ready("destroy_static_buffer") {
            return;
        }

        match unsafe {
            self.registry
                .destroy_static_buffer(&mut *self.visitor, handle)
        } {
            Ok(true) => {}
            Ok(false) => warn!("[GL33Device] {} is not alive.", handle),
            Err(err) => warn!("[GL33Device] Failed to destroy {}: {}", handle, err),
        }
    }

    fn compute_sphere_visibility(&self, center: Vector3<f32>, radius: f32) -> PlaneMask {
        sphere_visibility(&self.state.clip_matrix(), center, radius)
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let position = Vector2::new(x, y);
        let size = Vector2::new(width, height);

        if self.is_ready("set_viewport") && self.state.set_viewport(position, size) {
            report("set_viewport", unsafe {
                self.visitor.set_viewport(position, size)
            });
        }
    }

    fn set_render_state(&mut self, state: RenderState, enabled: bool) {
        if !self.is_ready("set_render_state") || !self.state.set_render_state(state, enabled) {
            return;
        }

        let v = &mut self.visitor;
        let result = unsafe {
            match state {
                RenderState::Blending => v.set_capability(Capability::Blend, enabled),
                RenderState::DepthTest => v.set_capability(Capability::DepthTest, enabled),
                RenderState::Culling => v.set_capability(Capability::CullFace, enabled),
                RenderState::DepthBias => {
                    v.set_capability(Capability::PolygonOffsetFill, enabled)
                }
                RenderState::DepthWrite => v.set_depth_mask(enabled),
                _ => Ok(()),
            }
        };

        report("set_render_state", result);
    }

    fn set_color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        let mask = [red, green, blue, alpha];
        if self.is_ready("set_color_mask") && self.state.set_color_mask(mask) {
            report("set_color_mask", unsafe { self.visitor.set_color_mask(mask) });
        }
    }

    fn set_depth_test_func(&mut self, func: CompFunc) {
        if self.is_ready("set_depth_test_func") && self.state.set_depth_func(func) {
            report("set_depth_test_func", unsafe {
                self.visitor.set_depth_func(func)
            });
        }
    }

    fn set_depth_bias(&mut self, factor: f32, units: f32) {
        if self.is_ready("set_depth_bias") && self.state.set_depth_bias(factor, units) {
            report("set_depth_bias", unsafe {
                self.visitor.set_polygon_offset(factor, units)
            });
        }
    }

    fn set_alpha_test_func(&mut self, func: CompFunc, reference: f32) {
        if self.is_ready("set_alpha_test_func") {
            self.state.set_alpha_func(func, reference);
        }
    }

    fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) {
        if self.is_ready("set_blend_func") && self.state.set_blend_func(src, dst) {
            report("set_blend_func", unsafe {
                self.visitor.set_blend_func(src, dst)
            });
        }
    }

    fn set_clear_color(&mut self, color: Color) {
        if self.is_ready("set_clear_color") && self.state.set_clear_color(color) {
            report("set_clear_color", unsafe {
                self.visitor.set_clear_color(color)
            });
        }
    }

    fn set_global_ambient(&mut self, color: Color) {
        if self.is_ready("set_global_ambient") {
            self.state.set_global_ambient(color);
        }
    }

    fn set_fog_params(&mut self, mode: FogMode, color: Color, start: f32, end: f32, density: f32) {
        if self.is_ready("set_fog_params") {
            self.state.set_fog(Fog {
                mode,
                color,
                start,
                end,
                density,
            });
        }
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        if self.is_ready("set_cull_mode") && self.state.set_cull_mode(mode) {
            report("set_cull_mode", unsafe { self.visitor.set_front_face(mode) });
        }
    }

    fn set_shade_model(&mut self, model: ShadeModel) {
        if self.is_ready("set_shade_model") {
            self.state.set_shade_model(model);
        }
    }

    fn set_shadow_color(&mut self, value: f32) {
        if self.is_ready("set_shadow_color") {
            self.state.set_shadow_color(value);
        }
    }

    fn set_fill_mode(&mut self, mode: FillMode) {
        if self.is_ready("set_fill_mode") && self.state.set_fill_mode(mode) {
            report("set_fill_mode", unsafe {
                self.visitor.set_polygon_mode(mode)
            });
        }
    }

    fn copy_framebuffer_to_texture(
        &mut self,
        texture: &Texture,
        offset: Vector2<i32>,
        origin: Vector2<i32>,
        size: Vector2<u32>,
    ) {
        if !self.is_ready("copy_framebuffer_to_texture") {
            return;
        }

        let id = match self.registry.texture_id(texture.handle) {
            Some(v) => v,
            None => {
                warn!("[GL33Device] {} is not alive.", texture.handle);
                return;
            }
        };

        unsafe {
            report(
                "copy_framebuffer_to_texture",
                self.visitor
                    .copy_framebuffer_to_texture(id, offset, origin, size),
            );

            report("copy_framebuffer_to_texture", self.bind_stage(0));
        }
    }

    fn frame_buffer_pixels(&mut self) -> Result<Vec<u8>> {
        self.ensure_ready("frame_buffer_pixels")?;

        let size = match self.registry.framebuffer(&self.bound_framebuffer) {
            Some(v) => Vector2::new(v.width(), v.height()),
            None => self.config.size,
        };

        unsafe { self.visitor.read_pixels(Vector2::new(0, 0), size) }
    }

    #[inline]
    fn framebuffer(&self, name: &str) -> Option<&Framebuffer> {
        self.registry.framebuffer(name)
    }

    fn create_framebuffer(
        &mut self,
        name: &str,
        params: &FramebufferParams,
    ) -> Result<&Framebuffer> {
        self.ensure_ready("create_framebuffer")?;

        if name == DEFAULT_FRAMEBUFFER {
            return Err(DeviceError::ReservedFramebuffer(name.into()).into());
        }

        unsafe {
            self.unbind_samplers(|v| match v {
                Sampler::Framebuffer(n, _) => n == name,
                _ => false,
            });

            let result = self
                .registry
                .create_framebuffer(&mut *self.visitor, &self.capabilities, name, params)
                .map(|_| ());

            report("create_framebuffer", self.bind_stage(0));
            report("create_framebuffer", self.rebind_framebuffer());
            result?;
        }

        self.registry
            .framebuffer(name)
            .ok_or_else(|| format_err!("Framebuffer {:?} is not registered.", name))
    }

    fn delete_framebuffer(&mut self, name: &str) {
        if !self.is_ready("delete_framebuffer") {
            return;
        }

        if name == DEFAULT_FRAMEBUFFER {
            warn!("[GL33Device] Framebuffer {:?} can not be deleted.", name);
            return;
        }

        unsafe {
            self.unbind_samplers(|v| match v {
                Sampler::Framebuffer(n, _) => n == name,
                _ => false,
            });

            match self.registry.delete_framebuffer(&mut *self.visitor, name) {
                Ok(true) => {
                    if self.bound_framebuffer == name {
                        report("delete_framebuffer", self.rebind_framebuffer());
                    }
                }
                Ok(false) => debug!("[GL33Device] Framebuffer {:?} does not exist.", name),
                Err(err) => warn!("[GL33Device] Failed to delete {:?}: {}", name, err),
            }
        }
    }

    fn bind_framebuffer(&mut self, name: &str) {
        if !self.is_ready("bind_framebuffer") {
            return;
        }

        let fbo = match self.registry.framebuffer(name) {
            Some(v) => v.objects.fbo,
            None => {
                warn!("[GL33Device] Framebuffer {:?} does not exist.", name);
                return;
            }
        };

        if let Err(err) = unsafe { self.visitor.bind_framebuffer(fbo) } {
            warn!("[GL33Device] Failed to bind {:?}: {}", name, err);
            return;
        }

        self.bound_framebuffer = name.to_owned();
    }

    #[inline]
    fn is_anisotropy_supported(&self) -> bool {
        self.capabilities.anisotropy_supported
    }

    #[inline]
    fn max_anisotropy_level(&self) -> u32 {
        self.capabilities.max_anisotropy
    }

    #[inline]
    fn max_samples(&self) -> u32 {
        self.capabilities.max_samples
    }

    #[inline]
    fn is_shadow_mapping_supported(&self) -> bool {
        self.capabilities.shadow_mapping_supported
    }

    #[inline]
    fn max_texture_size(&self) -> u32 {
        self.capabilities.max_texture_size
    }

    #[inline]
    fn is_framebuffer_supported(&self) -> bool {
        self.capabilities.framebuffer_supported
    }

    #[inline]
    fn texture_mipmap_level(&self) -> u32 {
        self.tunables.texture_mipmap_level
    }

    fn set_texture_mipmap_level(&mut self, level: u32) {
        self.set_tunables(|v| v.texture_mipmap_level = level);
    }

    #[inline]
    fn texture_anisotropy_level(&self) -> u32 {
        self.tunables.texture_anisotropy_level
    }

    fn set_texture_anisotropy_level(&mut self, level: u32) {
        self.set_tunables(|v| v.texture_anisotropy_level = level);
    }

    #[inline]
    fn multisample(&self) -> u32 {
        self.tunables.multisample
    }

    fn set_multisample(&mut self, samples: u32) {
        self.set_tunables(|v| v.multisample = samples);
    }

    #[inline]
    fn texture_filter_mode(&self) -> TexFilter {
        self.tunables.texture_filter_mode
    }

    fn set_texture_filter_mode(&mut self, filter: TexFilter) {
        self.set_tunables(|v| v.texture_filter_mode = filter);
    }

    #[inline]
    fn shadow_mapping(&self) -> bool {
        self.tunables.shadow_mapping
    }

    fn set_shadow_mapping(&mut self, enabled: bool) {
        self.set_tunables(|v| v.shadow_mapping = enabled);
    }

    #[inline]
    fn shadow_mapping_quality(&self) -> bool {
        self.tunables.shadow_mapping_quality
    }

    fn set_shadow_mapping_quality(&mut self, enabled: bool) {
        self.set_tunables(|v| v.shadow_mapping_quality = enabled);
    }

    #[inline]
    fn shadow_mapping_resolution(&self) -> u32 {
        self.tunables.shadow_mapping_resolution
    }

    fn set_shadow_mapping_resolution(&mut self, resolution: u32) {
        self.set_tunables(|v| v.shadow_mapping_resolution = resolution);
    }
}
