#[macro_use]
extern crate approx;
extern crate robogfx;

use std::cell::RefCell;
use std::rc::Rc;

use robogfx::backends::{Capability, UniformVariable, Version};
use robogfx::gl33::shader::{ATTRIB_COLOR, ATTRIB_NORMAL};
use robogfx::math::Deg;
use robogfx::prelude::*;

fn device() -> (GL33Device, Rc<RefCell<Journal>>) {
    let _ = env_logger::try_init();
    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));
    device.create().unwrap();
    (device, journal)
}

fn triangle() -> Vec<Vertex> {
    let n = Vector3::new(0.0, 0.0, 1.0);
    vec![
        Vertex::new(Vector3::new(0.0, 0.0, 0.0), n, Vector2::new(0.0, 0.0)),
        Vertex::new(Vector3::new(1.0, 0.0, 0.0), n, Vector2::new(1.0, 0.0)),
        Vertex::new(Vector3::new(0.0, 1.0, 0.0), n, Vector2::new(0.0, 1.0)),
    ]
}

#[test]
fn lifecycle() {
    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));
    assert_eq!(device.device_state(), DeviceState::Uninitialized);

    device.create().unwrap();
    assert_eq!(device.device_state(), DeviceState::Created);
    assert!(device.create().is_err());
    assert!(journal.borrow().program_in_use != 0);

    device.begin_scene();
    assert_eq!(device.device_state(), DeviceState::InScene);
    assert_eq!(journal.borrow().clears, 1);

    // Nested scenes are ignored.
    device.begin_scene();
    assert_eq!(journal.borrow().clears, 1);

    device.end_scene();
    assert_eq!(device.device_state(), DeviceState::Created);
    assert_eq!(journal.borrow().flushes, 1);

    device.end_scene();
    assert_eq!(journal.borrow().flushes, 1);

    device.destroy();
    assert_eq!(device.device_state(), DeviceState::Destroyed);
    assert_eq!(journal.borrow().live_objects(), 0);
    assert!(device.create().is_err());
}

#[test]
fn calls_before_create_are_ignored() {
    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));

    device.set_render_state(RenderState::Blending, true);
    device.begin_scene();
    assert_eq!(device.device_state(), DeviceState::Uninitialized);
    assert!(device
        .create_static_buffer(PrimitiveType::Triangles, Vertices::Normal(&triangle()))
        .is_err());

    let journal = journal.borrow();
    assert_eq!(journal.live_objects(), 0);
    assert_eq!(journal.state_changes, 0);
}

#[test]
fn create_requires_feature_level() {
    let caps = Capabilities {
        version: Version::GL(2, 1),
        framebuffer_supported: false,
        ..Capabilities::headless()
    };

    let visitor = HeadlessVisitor::with_capabilities(caps);
    let journal = visitor.journal();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));

    assert!(device.create().is_err());
    assert_eq!(device.device_state(), DeviceState::Uninitialized);
    assert_eq!(journal.borrow().live_objects(), 0);

    let caps = Capabilities {
        version: Version::GL(3, 2),
        ..Capabilities::headless()
    };

    let mut device = GL33Device::new(
        DeviceConfig::default(),
        Box::new(HeadlessVisitor::with_capabilities(caps)),
    );

    let err = device.create().unwrap_err();
    match err.downcast_ref::<DeviceError>() {
        Some(DeviceError::Requirement(_)) => {}
        v => panic!("unexpected error {:?}", v),
    }
}

#[test]
fn create_requires_matrix_uniforms() {
    let sources = ProgramSources {
        vs: "void main() { gl_Position = vec4(0.0); }".into(),
        fs: "out vec4 color; void main() { color = vec4(1.0); }".into(),
    };

    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    let mut device =
        GL33Device::new(DeviceConfig::default(), Box::new(visitor)).with_program(sources);

    assert!(device.create().is_err());
    assert_eq!(journal.borrow().live_objects(), 0);
}

#[test]
fn failed_create_releases_auxiliary_buffers() {
    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    journal.borrow_mut().vertex_array_budget = Some(1);

    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));
    assert!(device.create().is_err());
    assert_eq!(device.device_state(), DeviceState::Uninitialized);

    let journal = journal.borrow();
    assert!(journal.buffers.is_empty());
    assert!(journal.vertex_arrays.is_empty());
    assert_eq!(journal.live_objects(), 0);
}

#[test]
fn defaults_are_pushed() {
    let (device, journal) = device();
    let journal = journal.borrow();

    assert!(journal.is_enabled(Capability::DepthTest));
    assert!(journal.is_enabled(Capability::CullFace));
    assert!(!journal.is_enabled(Capability::Blend));
    assert_eq!(journal.depth_func, Some(CompFunc::LessOrEqual));
    assert_eq!(
        journal.viewport,
        Some((Vector2::new(0, 0), Vector2::new(800, 600)))
    );

    assert!(device.render_state(RenderState::DepthWrite));
    assert!(!device.render_state(RenderState::Lighting));
    assert!(device.capabilities().max_texture_size > 0);
}

#[test]
fn model_view() {
    let (mut device, _) = device();

    let world = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    let view = Matrix4::from_angle_y(Deg(90.0)) * Matrix4::from_scale(2.0);

    device.set_transform(TransformType::World, &world);
    device.set_transform(TransformType::View, &view);
    assert_eq!(device.model_view(), view * world);

    // Order of the calls does not matter.
    device.set_transform(TransformType::View, &Matrix4::identity());
    device.set_transform(TransformType::World, &world);
    device.set_transform(TransformType::View, &view);
    assert_eq!(device.model_view(), view * world);

    device.set_transform(TransformType::Projection, &Matrix4::from_scale(0.5));
    assert_eq!(device.model_view(), view * world);
    assert_eq!(device.transform(TransformType::World), world);
}

#[test]
fn normal_matrix() {
    let (mut device, journal) = device();

    device.set_transform(TransformType::World, &Matrix4::from_scale(2.0));
    device.begin_scene();
    device.draw_primitive(
        PrimitiveType::Triangles,
        Vertices::Normal(&triangle()),
        Color::white(),
    );

    let normal = match journal.borrow().uniform("uni_NormalMatrix") {
        Some(UniformVariable::Matrix3f(v)) => Matrix3::from(v),
        v => panic!("unexpected normal matrix {:?}", v),
    };

    assert_ulps_eq!(normal, Matrix3::from_value(0.5));
}

#[test]
fn redundant_state_is_filtered() {
    let (mut device, journal) = device();
    let changes = journal.borrow().state_changes;

    device.set_render_state(RenderState::Blending, true);
    device.set_render_state(RenderState::Blending, true);
    assert_eq!(journal.borrow().state_changes, changes + 1);
    assert!(journal.borrow().is_enabled(Capability::Blend));

    device.set_blend_func(BlendFunc::SrcAlpha, BlendFunc::InvSrcAlpha);
    device.set_blend_func(BlendFunc::SrcAlpha, BlendFunc::InvSrcAlpha);
    device.set_depth_test_func(CompFunc::LessOrEqual);
    assert_eq!(journal.borrow().state_changes, changes + 2);

    // Program driven states never touch the pipeline.
    device.set_render_state(RenderState::Fog, true);
    device.set_render_state(RenderState::Lighting, true);
    assert_eq!(journal.borrow().state_changes, changes + 2);
    assert!(device.render_state(RenderState::Fog));
}

#[test]
fn failed_flush_keeps_uniforms_queued() {
    let (mut device, journal) = device();
    let vertices = triangle();

    device.begin_scene();
    device.set_material(&Material::new(Color::red(), Color::green(), Color::blue()));

    // Uploads are rejected while no program is in use.
    let program = journal.borrow().program_in_use;
    journal.borrow_mut().program_in_use = 0;
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());
    journal.borrow_mut().program_in_use = program;

    let white = Color::white();
    device.set_material(&Material::new(white, white, white));
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());

    let journal = journal.borrow();
    for name in &["uni_AmbientColor", "uni_DiffuseColor", "uni_SpecularColor"] {
        assert_eq!(
            journal.uniform(name),
            Some(UniformVariable::Vector4f(white.rgba()))
        );
    }
}

#[test]
fn uniforms_upload_once() {
    let (mut device, journal) = device();
    let vertices = triangle();
    let material = Material::new(Color::gray(), Color::red(), Color::white());

    device.begin_scene();
    device.set_material(&material);
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());

    let uploads = journal.borrow().uniform_uploads;
    assert_eq!(
        journal.borrow().uniform("uni_DiffuseColor"),
        Some(UniformVariable::Vector4f(Color::red().rgba()))
    );

    device.set_material(&material);
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());
    assert_eq!(journal.borrow().uniform_uploads, uploads);

    // Set and restored between two draws.
    device.set_render_state(RenderState::Fog, true);
    device.set_render_state(RenderState::Fog, false);
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());
    assert_eq!(journal.borrow().uniform_uploads, uploads);

    device.set_render_state(RenderState::AlphaTest, true);
    device.set_alpha_test_func(CompFunc::Greater, 0.5);
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::white());

    let journal = journal.borrow();
    assert_eq!(
        journal.uniform("uni_AlphaTestEnabled"),
        Some(UniformVariable::I32(1))
    );
    assert_eq!(
        journal.uniform("uni_AlphaTestFunc"),
        Some(UniformVariable::I32(CompFunc::Greater.code()))
    );
    assert_eq!(
        journal.uniform("uni_AlphaReference"),
        Some(UniformVariable::F32(0.5))
    );
}

#[test]
fn lights() {
    let (mut device, journal) = device();
    assert_eq!(device.max_light_count(), MAX_LIGHT_COUNT);

    let mut light = Light::default();
    light.diffuse = Color::blue();
    device.set_light(0, &light);
    device.set_light_enabled(0, true);

    // Unset and disabled are distinct.
    device.set_light(1, &light);
    assert!(device.light(1).is_some());
    assert!(!device.is_light_enabled(1));
    assert!(device.light(2).is_none());

    let mut other = light;
    other.diffuse = Color::green();
    device.set_light(MAX_LIGHT_COUNT, &other);
    device.set_light_enabled(MAX_LIGHT_COUNT + 3, true);
    assert_eq!(device.light(0), Some(&light));
    assert!(device.is_light_enabled(0));
    assert!(device.light(MAX_LIGHT_COUNT).is_none());

    device.debug_lights();
    device.begin_scene();
    device.draw_primitive(
        PrimitiveType::Triangles,
        Vertices::Normal(&triangle()),
        Color::white(),
    );

    let journal = journal.borrow();
    assert_eq!(
        journal.uniform("uni_Light[0].Diffuse"),
        Some(UniformVariable::Vector4f(Color::blue().rgba()))
    );
    assert_eq!(
        journal.uniform("uni_Light[0].Enabled"),
        Some(UniformVariable::I32(1))
    );
    assert_eq!(
        journal.uniform("uni_Light[1].Enabled"),
        Some(UniformVariable::I32(0))
    );
}

#[test]
fn draw_primitive() {
    let (mut device, journal) = device();
    let vertices = triangle();

    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::red());
    assert!(journal.borrow().draws.is_empty());

    device.begin_scene();
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&vertices), Color::red());
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&[]), Color::red());

    {
        let journal = journal.borrow();
        assert_eq!(journal.draws.len(), 1);

        let draw = &journal.draws[0];
        assert_eq!(draw.count, 3);
        assert_eq!(draw.bytes, Vertices::Normal(&vertices).as_bytes());
        assert_eq!(draw.constants, vec![(ATTRIB_COLOR, Color::red().rgba())]);
    }

    let colored = vec![
        VertexCol::new(Vector3::new(0.0, 0.0, 0.0), Color::red()),
        VertexCol::new(Vector3::new(1.0, 0.0, 0.0), Color::green()),
    ];

    device.draw_primitive(PrimitiveType::Lines, Vertices::Col(&colored), Color::white());

    let journal = journal.borrow();
    let draw = &journal.draws[1];
    assert_eq!(draw.primitive, PrimitiveType::Lines);
    assert_eq!(draw.bytes, Vertices::Col(&colored).as_bytes());
    assert_eq!(draw.constants, vec![(ATTRIB_NORMAL, [0.0, 0.0, 1.0, 0.0])]);
}

#[test]
fn auxiliary_buffers_grow() {
    let (mut device, journal) = device();
    let small = triangle();
    let large: Vec<Vertex> = (0..10).flat_map(|_| triangle()).collect();

    device.begin_scene();
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&small), Color::white());
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&large), Color::white());
    device.draw_primitive(PrimitiveType::Triangles, Vertices::Normal(&small), Color::white());

    let journal = journal.borrow();
    assert_eq!(journal.draws.len(), 3);
    assert_eq!(journal.draws[1].count, 30);
    assert_eq!(journal.draws[2].bytes, Vertices::Normal(&small).as_bytes());
}

#[test]
fn config_changed() {
    let (mut device, journal) = device();

    let mut config = DeviceConfig::default();
    config.size = Vector2::new(1024, 768);
    device.config_changed(config);

    assert_eq!(device.config().size, Vector2::new(1024, 768));
    assert_eq!(
        journal.borrow().viewport,
        Some((Vector2::new(0, 0), Vector2::new(1024, 768)))
    );

    let fb = device.framebuffer(DEFAULT_FRAMEBUFFER).unwrap();
    assert!(fb.is_default());
    assert_eq!((fb.width(), fb.height()), (1024, 768));

    let pixels = device.frame_buffer_pixels().unwrap();
    assert_eq!(pixels.len(), 1024 * 768 * 4);
}

#[test]
fn clear_color() {
    let (mut device, _) = device();

    device.set_clear_color(Color::red());
    device.set_viewport(0, 0, 2, 2);
    device.clear();

    let pixels = device.frame_buffer_pixels().unwrap();
    assert_eq!(&pixels[0..4], &[255, 0, 0, 255]);
}

#[test]
fn sphere_visibility() {
    let (mut device, _) = device();

    let visible = device.compute_sphere_visibility(Vector3::new(0.0, 0.0, 0.0), 0.5);
    assert!(visible.is_empty());

    let mask = device.compute_sphere_visibility(Vector3::new(5.0, 0.0, 0.0), 0.5);
    assert!(mask.contains(PlaneMask::RIGHT));
    assert!(!mask.contains(PlaneMask::LEFT));

    let world = Matrix4::from_translation(Vector3::new(-5.0, 0.0, 0.0));
    device.set_transform(TransformType::World, &world);
    let mask = device.compute_sphere_visibility(Vector3::new(5.0, 0.0, 0.0), 0.5);
    assert!(mask.is_empty());
}

#[test]
fn tunables() {
    let visitor = HeadlessVisitor::new();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));

    // Recorded before creation, clamped once the context is probed.
    device.set_multisample(64);
    assert_eq!(device.multisample(), 64);

    device.create().unwrap();
    assert_eq!(device.multisample(), 8);

    device.set_texture_anisotropy_level(0);
    assert_eq!(device.texture_anisotropy_level(), 1);

    device.set_texture_mipmap_level(100);
    assert_eq!(device.texture_mipmap_level(), 16);

    device.set_texture_filter_mode(TexFilter::Bilinear);
    assert_eq!(device.texture_filter_mode(), TexFilter::Bilinear);

    device.set_shadow_mapping_resolution(0);
    assert_eq!(device.shadow_mapping_resolution(), 0);
}
