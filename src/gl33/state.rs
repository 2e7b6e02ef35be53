//! Tracks the state of a device. Values consumed by the shader program are
//! recorded into a `UniformTable` and uploaded lazily before the next draw,
//! while the pipeline state is reported back to the caller only when it
//! really changes.

use std::mem;

use crate::backends::{ObjectId, UniformVariable, Visitor};
use crate::device::*;
use crate::errors::*;
use crate::math::prelude::*;

use super::shader::{LightUniform, Uniform, TEXTURE_UNITS};

#[derive(Debug, Clone, Copy, PartialEq)]
struct UniformSlot {
    location: Option<i32>,
    value: Option<UniformVariable>,
    uploaded: Option<UniformVariable>,
    dirty: bool,
}

impl Default for UniformSlot {
    fn default() -> Self {
        UniformSlot {
            location: None,
            value: None,
            uploaded: None,
            dirty: false,
        }
    }
}

/// Values of the uniforms of the program with a queue of the changed ones.
pub struct UniformTable {
    slots: Vec<UniformSlot>,
    dirty: Vec<usize>,
}

impl Default for UniformTable {
    fn default() -> Self {
        UniformTable::new()
    }
}

impl UniformTable {
    pub fn new() -> Self {
        let len = Uniform::ALL.len() + MAX_LIGHT_COUNT * LightUniform::ALL.len();
        UniformTable {
            slots: vec![UniformSlot::default(); len],
            dirty: Vec::new(),
        }
    }

    #[inline]
    fn slot(uniform: Uniform) -> usize {
        uniform as usize
    }

    #[inline]
    fn light_slot(index: usize, uniform: LightUniform) -> usize {
        Uniform::ALL.len() + index * LightUniform::ALL.len() + uniform as usize
    }

    fn write(&mut self, slot: usize, value: UniformVariable) {
        let v = &mut self.slots[slot];
        if v.value == Some(value) {
            return;
        }

        v.value = Some(value);
        if !v.dirty {
            v.dirty = true;
            self.dirty.push(slot);
        }
    }

    #[inline]
    pub fn set(&mut self, uniform: Uniform, value: UniformVariable) {
        self.write(Self::slot(uniform), value);
    }

    #[inline]
    pub fn set_light(&mut self, index: usize, uniform: LightUniform, value: UniformVariable) {
        if index < MAX_LIGHT_COUNT {
            self.write(Self::light_slot(index, uniform), value);
        }
    }

    /// Returns the tracked value of a uniform.
    pub fn get(&self, uniform: Uniform) -> Option<UniformVariable> {
        self.slots[Self::slot(uniform)].value
    }

    /// Number of values waiting for the next flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    /// Resolves the locations of every uniform in `program`, and schedules
    /// all the tracked values for upload.
    pub unsafe fn resolve(&mut self, visitor: &mut dyn Visitor, program: ObjectId) -> Result<()> {
        for &v in Uniform::ALL.iter() {
            let location = visitor.uniform_location(program, v.name())?;
            if location.is_none() {
                if v.is_required() {
                    return Err(DeviceError::UniformMissing(v.name().into()).into());
                }

                debug!("[GL33Device] Uniform {} is inactive.", v.name());
            }

            self.slots[Self::slot(v)].location = location;
        }

        for i in 0..MAX_LIGHT_COUNT {
            for &v in LightUniform::ALL.iter() {
                let location = visitor.uniform_location(program, &v.name(i))?;
                self.slots[Self::light_slot(i, v)].location = location;
            }
        }

        self.dirty.clear();
        for (i, v) in self.slots.iter_mut().enumerate() {
            v.uploaded = None;
            v.dirty = v.value.is_some();
            if v.dirty {
                self.dirty.push(i);
            }
        }

        Ok(())
    }

    /// Uploads the values changed since the last flush. The program must be
    /// in use.
    pub unsafe fn flush(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        let dirty = mem::replace(&mut self.dirty, Vec::new());

        for (n, &i) in dirty.iter().enumerate() {
            let v = &mut self.slots[i];
            if v.uploaded != v.value {
                if let (Some(location), Some(value)) = (v.location, v.value) {
                    if let Err(err) = visitor.bind_uniform(location, &value) {
                        // Slots not yet uploaded stay queued for the next flush.
                        self.dirty.extend_from_slice(&dirty[n..]);
                        return Err(err);
                    }
                }

                v.uploaded = v.value;
            }

            v.dirty = false;
        }

        Ok(())
    }

    /// Forgets the locations of a released program.
    pub fn reset(&mut self) {
        self.dirty.clear();
        for v in &mut self.slots {
            v.location = None;
            v.uploaded = None;
            v.dirty = false;
        }
    }
}

/// The texture sampled by a stage. Stages never own what they sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampler {
    Texture(TextureHandle),
    Framebuffer(String, FramebufferAttachment),
}

/// State of one texture stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureStage {
    pub sampler: Option<Sampler>,
    pub enabled: bool,
    pub params: TextureStageParams,
    pub wrap: (TexWrapMode, TexWrapMode),
    pub generation: TextureGenerationParams,
}

impl Default for TextureStage {
    fn default() -> Self {
        TextureStage {
            sampler: None,
            enabled: false,
            params: TextureStageParams::default(),
            wrap: (TexWrapMode::Repeat, TexWrapMode::Repeat),
            generation: TextureGenerationParams::default(),
        }
    }
}

/// Fog parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fog {
    pub mode: FogMode,
    pub color: Color,
    pub start: f32,
    pub end: f32,
    pub density: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Fog {
            mode: FogMode::Linear,
            color: Color::black(),
            start: 0.0,
            end: 1.0,
            density: 1.0,
        }
    }
}

/// The state applied through the graphics API instead of the program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineState {
    pub blending: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub culling: bool,
    pub depth_bias: bool,
    pub color_mask: [bool; 4],
    pub depth_func: CompFunc,
    pub polygon_offset: (f32, f32),
    pub blend_func: (BlendFunc, BlendFunc),
    pub clear_color: Color,
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
    pub viewport: (Vector2<i32>, Vector2<u32>),
}

impl PipelineState {
    pub fn new(size: Vector2<u32>) -> Self {
        PipelineState {
            blending: false,
            depth_test: true,
            depth_write: true,
            culling: true,
            depth_bias: false,
            color_mask: [true; 4],
            depth_func: CompFunc::LessOrEqual,
            polygon_offset: (0.0, 0.0),
            blend_func: (BlendFunc::One, BlendFunc::Zero),
            clear_color: Color::black(),
            cull_mode: CullMode::Ccw,
            fill_mode: FillMode::Polygon,
            viewport: (Vector2::new(0, 0), size),
        }
    }
}

/// A light whose slot has never been set.
fn blank_light() -> Light {
    let zero = Color::new(0.0, 0.0, 0.0, 0.0);
    Light {
        ambient: zero,
        diffuse: zero,
        specular: zero,
        ..Light::default()
    }
}

#[inline]
fn update<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[inline]
fn vec4(color: Color) -> UniformVariable {
    UniformVariable::Vector4f(color.rgba())
}

#[inline]
fn flag(v: bool) -> UniformVariable {
    UniformVariable::I32(v as i32)
}

/// Everything a device remembers between calls.
pub struct StateTracker {
    world: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    shadow: Matrix4<f32>,
    model_view: Matrix4<f32>,
    material: Material,
    global_ambient: Color,
    lighting: bool,
    lights: [Option<Light>; MAX_LIGHT_COUNT],
    lights_enabled: [bool; MAX_LIGHT_COUNT],
    stages: Vec<TextureStage>,
    fog_enabled: bool,
    fog: Fog,
    alpha_test: bool,
    alpha_func: (CompFunc, f32),
    shade_model: ShadeModel,
    shadow_color: f32,
    pipeline: PipelineState,
    uniforms: UniformTable,
}

impl StateTracker {
    /// Creates the default state of a device rendering into a surface of
    /// `size`.
    pub fn new(size: Vector2<u32>) -> Self {
        let mut state = StateTracker {
            world: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            shadow: Matrix4::identity(),
            model_view: Matrix4::identity(),
            material: Material::default(),
            global_ambient: Color::black(),
            lighting: false,
            lights: [None; MAX_LIGHT_COUNT],
            lights_enabled: [false; MAX_LIGHT_COUNT],
            stages: vec![TextureStage::default(); MAX_TEXTURE_STAGE_COUNT],
            fog_enabled: false,
            fog: Fog::default(),
            alpha_test: false,
            alpha_func: (CompFunc::Always, 0.5),
            shade_model: ShadeModel::Smooth,
            shadow_color: 0.5,
            pipeline: PipelineState::new(size),
            uniforms: UniformTable::new(),
        };

        state.upload_defaults();
        state
    }

    fn upload_defaults(&mut self) {
        let u = &mut self.uniforms;
        u.set(Uniform::ProjectionMatrix, matrix4(&self.projection));
        u.set(Uniform::ViewMatrix, matrix4(&self.view));
        u.set(Uniform::ModelMatrix, matrix4(&self.world));
        u.set(Uniform::ShadowMatrix, matrix4(&self.shadow));

        for (stage, unit) in TEXTURE_UNITS.iter().enumerate() {
            if let Some(v) = Uniform::sampler(stage) {
                u.set(v, UniformVariable::I32(*unit));
            }
        }

        u.set(Uniform::LightingEnabled, flag(self.lighting));
        u.set(Uniform::SmoothShading, flag(true));
        u.set(Uniform::ShadowColor, UniformVariable::F32(self.shadow_color));
        u.set(Uniform::AlphaTestEnabled, flag(self.alpha_test));
        u.set(Uniform::FogEnabled, flag(self.fog_enabled));
        u.set(Uniform::GlobalAmbient, vec4(self.global_ambient));

        self.update_normal_matrix();
        self.upload_material();
        self.upload_fog();
        self.upload_alpha_func();

        for i in 0..MAX_LIGHT_COUNT {
            self.upload_light(i, &blank_light());
            self.uniforms
                .set_light(i, LightUniform::Enabled, flag(false));
        }

        for i in 0..MAX_TEXTURE_STAGE_COUNT {
            self.upload_stage_enabled(i);
        }
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    #[inline]
    pub fn uniforms_mut(&mut self) -> &mut UniformTable {
        &mut self.uniforms
    }

    #[inline]
    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    pub fn transform(&self, tp: TransformType) -> Matrix4<f32> {
        match tp {
            TransformType::World => self.world,
            TransformType::View => self.view,
            TransformType::Projection => self.projection,
            TransformType::Shadow => self.shadow,
        }
    }

    /// The `view * world` product.
    #[inline]
    pub fn model_view(&self) -> Matrix4<f32> {
        self.model_view
    }

    /// The `projection * view * world` product.
    #[inline]
    pub fn clip_matrix(&self) -> Matrix4<f32> {
        self.projection * self.model_view
    }

    pub fn set_transform(&mut self, tp: TransformType, matrix: &Matrix4<f32>) {
        match tp {
            TransformType::World => {
                self.world = *matrix;
                self.model_view = self.view * self.world;
                self.uniforms.set(Uniform::ModelMatrix, matrix4(matrix));
                self.update_normal_matrix();
            }
            TransformType::View => {
                self.view = *matrix;
                self.model_view = self.view * self.world;
                self.uniforms.set(Uniform::ViewMatrix, matrix4(matrix));
                self.update_normal_matrix();
            }
            TransformType::Projection => {
                self.projection = *matrix;
                self.uniforms.set(Uniform::ProjectionMatrix, matrix4(matrix));
            }
            TransformType::Shadow => {
                self.shadow = *matrix;
                self.uniforms.set(Uniform::ShadowMatrix, matrix4(matrix));
            }
        }
    }

    fn update_normal_matrix(&mut self) {
        let m = self.model_view;
        let m = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        let normal = m.invert().map(|v| v.transpose()).unwrap_or(m);
        self.uniforms
            .set(Uniform::NormalMatrix, UniformVariable::Matrix3f(normal.into()));
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: &Material) {
        self.material = *material;
        self.upload_material();
    }

    fn upload_material(&mut self) {
        let m = self.material;
        self.uniforms.set(Uniform::AmbientColor, vec4(m.ambient));
        self.uniforms.set(Uniform::DiffuseColor, vec4(m.diffuse));
        self.uniforms.set(Uniform::SpecularColor, vec4(m.specular));
    }

    #[inline]
    pub fn global_ambient(&self) -> Color {
        self.global_ambient
    }

    pub fn set_global_ambient(&mut self, color: Color) {
        self.global_ambient = color;
        self.uniforms.set(Uniform::GlobalAmbient, vec4(color));
    }

    #[inline]
    pub fn light(&self, index: usize) -> Option<&Light> {
        self.lights.get(index).and_then(|v| v.as_ref())
    }

    #[inline]
    pub fn is_light_enabled(&self, index: usize) -> bool {
        self.lights_enabled.get(index).cloned().unwrap_or(false)
    }

    /// Returns false if `index` is out of range.
    pub fn set_light(&mut self, index: usize, light: &Light) -> bool {
        if index >= MAX_LIGHT_COUNT {
            return false;
        }

        self.lights[index] = Some(*light);
        self.upload_light(index, light);
        true
    }

    /// Returns false if `index` is out of range.
    pub fn set_light_enabled(&mut self, index: usize, enabled: bool) -> bool {
        if index >= MAX_LIGHT_COUNT {
            return false;
        }

        self.lights_enabled[index] = enabled;
        self.uniforms
            .set_light(index, LightUniform::Enabled, flag(enabled));
        true
    }

    fn upload_light(&mut self, index: usize, light: &Light) {
        let u = &mut self.uniforms;
        let position = light.homogeneous_position();
        let direction = light.direction;

        u.set_light(index, LightUniform::Type, UniformVariable::I32(light.light_type.code()));
        u.set_light(index, LightUniform::Position, UniformVariable::Vector4f(position.into()));
        u.set_light(index, LightUniform::Ambient, vec4(light.ambient));
        u.set_light(index, LightUniform::Diffuse, vec4(light.diffuse));
        u.set_light(index, LightUniform::Specular, vec4(light.specular));
        u.set_light(index, LightUniform::Attenuation, UniformVariable::Vector3f(light.attenuation));
        u.set_light(index, LightUniform::SpotDirection, UniformVariable::Vector3f(direction.into()));
        u.set_light(
            index,
            LightUniform::SpotParams,
            UniformVariable::Vector2f([light.spot_angle, light.spot_intensity]),
        );
    }

    /// Dumps the light slots at debug level.
    pub fn debug_lights(&self) {
        debug!("[GL33Device] Lighting is {}.", if self.lighting { "on" } else { "off" });
        for (i, light) in self.lights.iter().enumerate() {
            match light {
                Some(v) => debug!(
                    "[GL33Device] Light {} ({}): {:?}",
                    i,
                    if self.lights_enabled[i] { "enabled" } else { "disabled" },
                    v
                ),
                None => debug!(
                    "[GL33Device] Light {} ({}): unset",
                    i,
                    if self.lights_enabled[i] { "enabled" } else { "disabled" }
                ),
            }
        }
    }

    #[inline]
    pub fn stage(&self, index: usize) -> Option<&TextureStage> {
        self.stages.get(index)
    }

    /// Returns false if the stage already samples `sampler`.
    pub fn set_sampler(&mut self, index: usize, sampler: Option<Sampler>) -> bool {
        let changed = match self.stages.get_mut(index) {
            Some(stage) => update(&mut stage.sampler, sampler),
            None => false,
        };

        if changed {
            self.upload_stage_enabled(index);
        }

        changed
    }

    pub fn set_stage_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => stage.enabled = enabled,
            None => return false,
        }

        self.upload_stage_enabled(index);
        true
    }

    fn upload_stage_enabled(&mut self, index: usize) {
        let active = self
            .stages
            .get(index)
            .map(|v| v.enabled && v.sampler.is_some())
            .unwrap_or(false);

        if let Some(u) = Uniform::stage_enabled(index) {
            self.uniforms.set(u, flag(active));
        }
    }

    /// Returns true if the wrap modes of the stage changed.
    pub fn set_stage_params(&mut self, index: usize, params: &TextureStageParams) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => {
                stage.params = *params;
                update(&mut stage.wrap, (params.wrap_s, params.wrap_t))
            }
            None => false,
        }
    }

    /// Returns true if the wrap modes of the stage changed.
    pub fn set_stage_wrap(&mut self, index: usize, s: TexWrapMode, t: TexWrapMode) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => {
                stage.params.wrap_s = s;
                stage.params.wrap_t = t;
                update(&mut stage.wrap, (s, t))
            }
            None => false,
        }
    }

    pub fn set_stage_generation(&mut self, index: usize, params: &TextureGenerationParams) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => {
                stage.generation = *params;
                true
            }
            None => false,
        }
    }

    pub fn render_state(&self, state: RenderState) -> bool {
        match state {
            RenderState::Blending => self.pipeline.blending,
            RenderState::Fog => self.fog_enabled,
            RenderState::DepthTest => self.pipeline.depth_test,
            RenderState::DepthWrite => self.pipeline.depth_write,
            RenderState::Lighting => self.lighting,
            RenderState::Culling => self.pipeline.culling,
            RenderState::AlphaTest => self.alpha_test,
            RenderState::DepthBias => self.pipeline.depth_bias,
            RenderState::ShadowMapping => self
                .stages
                .get(2)
                .map(|v| v.enabled)
                .unwrap_or(false),
        }
    }

    /// Returns true if pipeline state must be pushed to the graphics API.
    /// Program driven states are recorded for the next flush instead.
    pub fn set_render_state(&mut self, state: RenderState, enabled: bool) -> bool {
        let p = &mut self.pipeline;
        match state {
            RenderState::Blending => update(&mut p.blending, enabled),
            RenderState::DepthTest => update(&mut p.depth_test, enabled),
            RenderState::DepthWrite => update(&mut p.depth_write, enabled),
            RenderState::Culling => update(&mut p.culling, enabled),
            RenderState::DepthBias => update(&mut p.depth_bias, enabled),
            RenderState::Fog => {
                self.fog_enabled = enabled;
                self.uniforms.set(Uniform::FogEnabled, flag(enabled));
                false
            }
            RenderState::Lighting => {
                self.lighting = enabled;
                self.uniforms.set(Uniform::LightingEnabled, flag(enabled));
                false
            }
            RenderState::AlphaTest => {
                self.alpha_test = enabled;
                self.uniforms.set(Uniform::AlphaTestEnabled, flag(enabled));
                false
            }
            RenderState::ShadowMapping => {
                self.set_stage_enabled(2, enabled);
                false
            }
        }
    }

    pub fn set_color_mask(&mut self, mask: [bool; 4]) -> bool {
        update(&mut self.pipeline.color_mask, mask)
    }

    pub fn set_depth_func(&mut self, func: CompFunc) -> bool {
        update(&mut self.pipeline.depth_func, func)
    }

    pub fn set_depth_bias(&mut self, factor: f32, units: f32) -> bool {
        update(&mut self.pipeline.polygon_offset, (factor, units))
    }

    pub fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) -> bool {
        update(&mut self.pipeline.blend_func, (src, dst))
    }

    pub fn set_clear_color(&mut self, color: Color) -> bool {
        update(&mut self.pipeline.clear_color, color)
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) -> bool {
        update(&mut self.pipeline.cull_mode, mode)
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) -> bool {
        update(&mut self.pipeline.fill_mode, mode)
    }

    pub fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> bool {
        update(&mut self.pipeline.viewport, (position, size))
    }

    #[inline]
    pub fn alpha_func(&self) -> (CompFunc, f32) {
        self.alpha_func
    }

    pub fn set_alpha_func(&mut self, func: CompFunc, reference: f32) {
        self.alpha_func = (func, reference);
        self.upload_alpha_func();
    }

    fn upload_alpha_func(&mut self) {
        let (func, reference) = self.alpha_func;
        self.uniforms
            .set(Uniform::AlphaTestFunc, UniformVariable::I32(func.code()));
        self.uniforms
            .set(Uniform::AlphaReference, UniformVariable::F32(reference));
    }

    #[inline]
    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn set_fog(&mut self, fog: Fog) {
        self.fog = fog;
        self.upload_fog();
    }

    fn upload_fog(&mut self) {
        let fog = self.fog;
        let u = &mut self.uniforms;
        u.set(Uniform::FogMode, UniformVariable::I32(fog.mode.code()));
        u.set(Uniform::FogRange, UniformVariable::Vector2f([fog.start, fog.end]));
        u.set(Uniform::FogDensity, UniformVariable::F32(fog.density));
        u.set(Uniform::FogColor, vec4(fog.color));
    }

    #[inline]
    pub fn shade_model(&self) -> ShadeModel {
        self.shade_model
    }

    pub fn set_shade_model(&mut self, model: ShadeModel) {
        self.shade_model = model;
        self.uniforms
            .set(Uniform::SmoothShading, flag(model == ShadeModel::Smooth));
    }

    #[inline]
    pub fn shadow_color(&self) -> f32 {
        self.shadow_color
    }

    pub fn set_shadow_color(&mut self, value: f32) {
        self.shadow_color = value;
        self.uniforms
            .set(Uniform::ShadowColor, UniformVariable::F32(value));
    }
}

#[inline]
fn matrix4(m: &Matrix4<f32>) -> UniformVariable {
    UniformVariable::Matrix4f((*m).into())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backends::headless::HeadlessVisitor;
    use crate::gl33::shader::ProgramSources;

    #[test]
    fn model_view() {
        let mut state = StateTracker::new(Vector2::new(800, 600));
        let world = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let view = Matrix4::from_nonuniform_scale(2.0, 3.0, 4.0);

        state.set_transform(TransformType::World, &world);
        state.set_transform(TransformType::View, &view);
        assert_eq!(state.model_view(), view * world);

        state.set_transform(TransformType::World, &Matrix4::identity());
        assert_eq!(state.model_view(), view);
    }

    #[test]
    fn lights() {
        let mut state = StateTracker::new(Vector2::new(800, 600));
        assert!(state.set_light(1, &Light::default()));
        assert!(!state.set_light(MAX_LIGHT_COUNT, &Light::default()));
        assert!(!state.set_light_enabled(MAX_LIGHT_COUNT + 3, true));

        assert!(state.set_light_enabled(2, true));
        assert!(state.light(2).is_none());
        assert!(state.is_light_enabled(2));
        assert!(state.light(1).is_some());
        assert!(!state.is_light_enabled(1));
    }

    #[test]
    fn pipeline_changes() {
        let mut state = StateTracker::new(Vector2::new(800, 600));
        assert!(state.set_blend_func(BlendFunc::SrcAlpha, BlendFunc::InvSrcAlpha));
        assert!(!state.set_blend_func(BlendFunc::SrcAlpha, BlendFunc::InvSrcAlpha));
        assert!(!state.set_render_state(RenderState::DepthTest, true));
        assert!(state.set_render_state(RenderState::Blending, true));
        assert!(!state.set_render_state(RenderState::Fog, true));
        assert!(state.render_state(RenderState::Fog));
    }

    #[test]
    fn uniform_flush() {
        let mut visitor = HeadlessVisitor::new();
        let journal = visitor.journal();
        let sources = ProgramSources::default();
        let mut state = StateTracker::new(Vector2::new(800, 600));

        unsafe {
            let program = visitor.create_program(&sources.vs, &sources.fs).unwrap();
            visitor.use_program(program).unwrap();
            state.uniforms_mut().resolve(&mut visitor, program).unwrap();
            state.uniforms_mut().flush(&mut visitor).unwrap();
        }

        let uploads = journal.borrow().uniform_uploads;
        assert!(uploads > 0);

        let material = Material::new(Color::red(), Color::green(), Color::blue());
        state.set_material(&material);
        state.set_material(&material);
        assert_eq!(state.uniforms().pending(), 3);

        unsafe { state.uniforms_mut().flush(&mut visitor).unwrap() };
        assert_eq!(journal.borrow().uniform_uploads, uploads + 3);
        assert_eq!(
            journal.borrow().uniform("uni_DiffuseColor"),
            Some(UniformVariable::Vector4f(Color::green().rgba()))
        );

        // Changed and restored before the flush.
        state.set_shadow_color(0.1);
        state.set_shadow_color(0.5);
        unsafe { state.uniforms_mut().flush(&mut visitor).unwrap() };
        assert_eq!(journal.borrow().uniform_uploads, uploads + 3);
    }
}
