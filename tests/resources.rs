extern crate robogfx;

use std::cell::RefCell;
use std::rc::Rc;

use robogfx::gl33::Sampler;
use robogfx::prelude::*;

fn device() -> (GL33Device, Rc<RefCell<Journal>>) {
    let visitor = HeadlessVisitor::new();
    let journal = visitor.journal();
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(visitor));
    device.create().unwrap();
    (device, journal)
}

fn image(w: u32, h: u32) -> Image {
    Image::filled(Vector2::new(w, h), Color::white())
}

fn quad() -> Vec<Vertex> {
    let n = Vector3::new(0.0, 0.0, 1.0);
    vec![
        Vertex::new(Vector3::new(-1.0, -1.0, 0.0), n, Vector2::new(0.0, 0.0)),
        Vertex::new(Vector3::new(1.0, -1.0, 0.0), n, Vector2::new(1.0, 0.0)),
        Vertex::new(Vector3::new(-1.0, 1.0, 0.0), n, Vector2::new(0.0, 1.0)),
        Vertex::new(Vector3::new(1.0, 1.0, 0.0), n, Vector2::new(1.0, 1.0)),
    ]
}

#[test]
fn texture_scenario() {
    let (mut device, journal) = device();

    let max = device.max_texture_size();
    assert!(max > 0);
    assert!(max.is_power_of_two());

    let textures = journal.borrow().textures.len();
    let texture = device
        .create_texture(&image(256, 256), &TextureCreateParams::default())
        .unwrap();

    assert!(texture.is_valid());
    assert!(texture.alpha);
    assert_eq!(texture.size, Vector2::new(256, 256));
    assert_eq!(device.texture_count(), 1);
    assert_eq!(journal.borrow().textures.len(), textures + 1);

    device.destroy_texture(&texture);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(journal.borrow().textures.len(), textures);

    device.destroy_texture(&texture);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(journal.borrow().textures.len(), textures);
}

#[test]
fn destroyed_handles_never_resolve() {
    let (mut device, journal) = device();
    let params = TextureCreateParams::default();

    let t1 = device.create_texture(&image(4, 4), &params).unwrap();
    device.destroy_texture(&t1);

    let t2 = device.create_texture(&image(8, 8), &params).unwrap();
    assert!(t1.handle != t2.handle);
    assert!(!device.contains_texture(&t1));
    assert!(device.contains_texture(&t2));

    device.set_texture(0, Some(&t1));
    assert_eq!(device.texture_stage(0).unwrap().sampler, None);

    device.destroy_texture(&t1);
    assert!(device.contains_texture(&t2));
    assert_eq!(journal.borrow().textures.len(), 1);
}

#[test]
fn destroy_all_textures() {
    let (mut device, journal) = device();
    let params = TextureCreateParams::default();

    let textures: Vec<_> = (0..3)
        .map(|_| device.create_texture(&image(2, 2), &params).unwrap())
        .collect();

    device.set_texture(1, Some(&textures[2]));
    device.destroy_all_textures();

    assert_eq!(device.texture_count(), 0);
    for v in &textures {
        assert!(!device.contains_texture(v));
    }

    assert_eq!(device.texture_stage(1).unwrap().sampler, None);
    assert!(journal.borrow().textures.is_empty());
    assert!(journal.borrow().texture_units.is_empty());
}

#[test]
fn destroyed_texture_is_unbound() {
    let (mut device, journal) = device();
    let texture = device
        .create_texture(&image(2, 2), &TextureCreateParams::default())
        .unwrap();

    device.set_texture(0, Some(&texture));
    device.set_texture_enabled(0, true);
    assert_eq!(
        device.texture_stage(0).unwrap().sampler,
        Some(Sampler::Texture(texture.handle))
    );
    assert!(journal.borrow().texture_units.contains_key(&0));

    device.destroy_texture(&texture);
    assert_eq!(device.texture_stage(0).unwrap().sampler, None);
    assert!(device.texture_stage(0).unwrap().enabled);
    assert!(!journal.borrow().texture_units.contains_key(&0));
}

#[test]
fn texture_creation_keeps_stage_bindings() {
    let (mut device, journal) = device();
    let params = TextureCreateParams::default();

    let primary = device.create_texture(&image(2, 2), &params).unwrap();
    device.set_texture(0, Some(&primary));
    let bound = journal.borrow().texture_units.get(&0).cloned();

    let _ = device.create_texture(&image(4, 4), &params).unwrap();
    let _ = device.create_depth_texture(64, 64, 24).unwrap();
    assert_eq!(journal.borrow().texture_units.get(&0).cloned(), bound);
}

#[test]
fn texture_params() {
    let (mut device, journal) = device();

    let params = TextureCreateParams {
        format: TexImgFormat::Auto,
        filter: TexFilter::Trilinear,
        mipmap: true,
        pad_to_nearest_power_of_two: true,
    };

    let data = vec![0u8; 3 * 5 * 3];
    let texture = device
        .create_texture_from_data(
            &ImageData::new(Vector2::new(3, 5), TexImgFormat::Auto, &data),
            &params,
        )
        .unwrap();

    assert!(!texture.alpha);
    assert_eq!(texture.size, Vector2::new(4, 8));
    assert_eq!(texture.original_size, Vector2::new(3, 5));

    let journal = journal.borrow();
    let record = journal
        .textures
        .values()
        .find(|v| v.size == Vector2::new(4, 8))
        .unwrap();

    assert_eq!(record.format, Some(TexImgFormat::RGB));
    assert_eq!(record.bytes.len(), 4 * 8 * 3);

    let sampler = record.sampler.unwrap();
    assert_eq!(sampler.filter, TexFilter::Trilinear);
    assert_eq!(sampler.levels, device.texture_mipmap_level());
    assert_eq!(sampler.anisotropy, device.texture_anisotropy_level());
}

#[test]
fn texture_rejections() {
    let (mut device, journal) = device();
    let params = TextureCreateParams::default();

    let max = device.max_texture_size();
    let data = vec![0u8; (max as usize + 1) * 4];
    let wide = ImageData::new(Vector2::new(max + 1, 1), TexImgFormat::RGBA, &data);
    assert!(device.create_texture_from_data(&wide, &params).is_err());

    let data = vec![0u8; 7];
    let broken = ImageData::new(Vector2::new(2, 2), TexImgFormat::RGBA, &data);
    assert!(device.create_texture_from_data(&broken, &params).is_err());

    assert_eq!(device.texture_count(), 0);
    assert!(journal.borrow().textures.is_empty());
}

#[test]
fn stage_wrap() {
    let (mut device, journal) = device();
    let texture = device
        .create_texture(&image(2, 2), &TextureCreateParams::default())
        .unwrap();

    device.set_texture(1, Some(&texture));
    device.set_texture_stage_wrap(1, TexWrapMode::Clamp, TexWrapMode::Repeat);

    let id = journal.borrow().texture_units[&1];
    assert_eq!(
        journal.borrow().textures[&id].wrap,
        (TexWrapMode::Clamp, TexWrapMode::Repeat)
    );

    let mut params = TextureStageParams::default();
    params.wrap_s = TexWrapMode::ClampToBorder;
    params.wrap_t = TexWrapMode::ClampToBorder;
    device.set_texture_stage_params(1, &params);

    assert_eq!(
        journal.borrow().textures[&id].wrap,
        (TexWrapMode::ClampToBorder, TexWrapMode::ClampToBorder)
    );
    assert_eq!(device.texture_stage(1).unwrap().params, params);

    // Out of range stages are ignored.
    device.set_texture(MAX_TEXTURE_STAGE_COUNT, Some(&texture));
    device.set_texture_enabled(MAX_TEXTURE_STAGE_COUNT, true);
    assert!(device.texture_stage(MAX_TEXTURE_STAGE_COUNT).is_none());
}

#[test]
fn static_buffer_round_trip() {
    let (mut device, journal) = device();
    device.begin_scene();

    let n = Vector3::new(0.0, 1.0, 0.0);
    let normal = quad();
    let tex2: Vec<VertexTex2> = normal.iter().map(|v| VertexTex2::from(*v)).collect();
    let col = vec![
        VertexCol::new(Vector3::new(0.0, 0.0, 0.0), Color::red()),
        VertexCol::new(n, Color::blue()),
    ];

    let layouts = [
        (PrimitiveType::TriangleStrip, Vertices::Normal(&normal)),
        (PrimitiveType::TriangleStrip, Vertices::Tex2(&tex2)),
        (PrimitiveType::Lines, Vertices::Col(&col)),
    ];

    for (primitive, vertices) in layouts.iter() {
        let handle = device.create_static_buffer(*primitive, *vertices).unwrap();
        device.draw_static_buffer(handle);

        let journal = journal.borrow();
        let draw = journal.draws.last().unwrap();
        assert_eq!(draw.primitive, *primitive);
        assert_eq!(draw.count as usize, vertices.len());
        assert_eq!(draw.bytes, vertices.as_bytes());
    }

    assert_eq!(device.static_buffer_count(), 3);
    assert_eq!(journal.borrow().draws.len(), 3);
}

#[test]
fn static_buffer_updates() {
    let (mut device, journal) = device();
    let vertices = quad();

    let handle = device
        .create_static_buffer(PrimitiveType::TriangleStrip, Vertices::Normal(&vertices))
        .unwrap();

    let col = vec![VertexCol::new(Vector3::new(0.0, 0.0, 0.0), Color::red())];
    assert!(device
        .update_static_buffer(handle, PrimitiveType::Points, Vertices::Col(&col))
        .is_err());

    let larger: Vec<Vertex> = quad().into_iter().chain(quad()).collect();
    assert!(device
        .update_static_buffer(handle, PrimitiveType::Triangles, Vertices::Normal(&larger))
        .is_err());

    assert_eq!(device.static_buffer(handle).unwrap().count, 4);

    let smaller = &vertices[1..];
    device
        .update_static_buffer(handle, PrimitiveType::Triangles, Vertices::Normal(smaller))
        .unwrap();

    let buffer = *device.static_buffer(handle).unwrap();
    assert_eq!(buffer.count, 3);
    assert_eq!(buffer.primitive, PrimitiveType::Triangles);

    device.begin_scene();
    device.draw_static_buffer(handle);
    assert_eq!(
        journal.borrow().draws[0].bytes,
        Vertices::Normal(smaller).as_bytes()
    );

    let objects = journal.borrow().live_objects();
    device.destroy_static_buffer(handle);
    assert_eq!(journal.borrow().live_objects(), objects - 2);
    assert!(device.static_buffer(handle).is_none());

    device.draw_static_buffer(handle);
    assert_eq!(journal.borrow().draws.len(), 1);
    assert!(device
        .update_static_buffer(handle, PrimitiveType::Triangles, Vertices::Normal(smaller))
        .is_err());
}

fn shadow_params() -> FramebufferParams {
    FramebufferParams {
        width: 512,
        height: 512,
        depth: 24,
        samples: 1,
        color_attachment: AttachmentType::None,
        depth_attachment: AttachmentType::Texture,
    }
}

#[test]
fn framebuffer_replacement() {
    let (mut device, journal) = device();
    let objects = journal.borrow().live_objects();

    device.create_framebuffer("shadow", &shadow_params()).unwrap();
    assert_eq!(journal.borrow().live_objects(), objects + 2);

    let mut params = FramebufferParams::default();
    params.samples = 64;
    {
        let fb = device.create_framebuffer("shadow", &params).unwrap();
        assert_eq!(fb.samples(), 8);
        assert_eq!(fb.width(), 1024);
        assert!(!fb.is_default());
    }

    let journal = journal.borrow();
    assert_eq!(journal.framebuffers.len(), 1);
    assert_eq!(journal.renderbuffers.len(), 2);
    assert_eq!(journal.live_objects(), objects + 3);
}

#[test]
fn default_framebuffer_is_reserved() {
    let (mut device, journal) = device();

    assert!(device
        .create_framebuffer(DEFAULT_FRAMEBUFFER, &FramebufferParams::default())
        .is_err());

    device.delete_framebuffer(DEFAULT_FRAMEBUFFER);
    assert!(device.framebuffer(DEFAULT_FRAMEBUFFER).is_some());
    assert!(journal.borrow().framebuffers.is_empty());
}

#[test]
fn framebuffer_textures() {
    let (mut device, journal) = device();
    device.create_framebuffer("shadow", &shadow_params()).unwrap();

    // Renderbuffers could not be sampled.
    device.set_framebuffer_texture(2, "shadow", FramebufferAttachment::Color);
    device.set_framebuffer_texture(2, "missing", FramebufferAttachment::Depth);
    assert_eq!(device.texture_stage(2).unwrap().sampler, None);

    device.set_framebuffer_texture(2, "shadow", FramebufferAttachment::Depth);
    device.set_render_state(RenderState::ShadowMapping, true);
    assert!(device.render_state(RenderState::ShadowMapping));
    assert_eq!(
        device.texture_stage(2).unwrap().sampler,
        Some(Sampler::Framebuffer(
            "shadow".into(),
            FramebufferAttachment::Depth
        ))
    );
    assert!(journal.borrow().texture_units.contains_key(&2));

    device.delete_framebuffer("shadow");
    assert_eq!(device.texture_stage(2).unwrap().sampler, None);
    assert!(!journal.borrow().texture_units.contains_key(&2));
    assert!(device.framebuffer("shadow").is_none());
}

#[test]
fn bind_framebuffer() {
    let (mut device, journal) = device();
    device.create_framebuffer("offscreen", &FramebufferParams::default()).unwrap();
    device.begin_scene();

    device.bind_framebuffer("offscreen");
    assert_eq!(device.bound_framebuffer(), "offscreen");
    let fbo = journal.borrow().bound_framebuffer;
    assert!(fbo != 0);

    // Replacing the bound framebuffer keeps rendering into its name.
    device.create_framebuffer("offscreen", &FramebufferParams::default()).unwrap();
    let replaced = journal.borrow().bound_framebuffer;
    assert!(replaced != 0 && replaced != fbo);

    let pixels = device.frame_buffer_pixels().unwrap();
    assert_eq!(pixels.len(), 1024 * 1024 * 4);

    device.draw_primitive(PrimitiveType::TriangleStrip, Vertices::Normal(&quad()), Color::white());
    assert_eq!(journal.borrow().draws[0].framebuffer, replaced);

    device.bind_framebuffer("missing");
    assert_eq!(device.bound_framebuffer(), "offscreen");

    device.delete_framebuffer("offscreen");
    assert_eq!(device.bound_framebuffer(), DEFAULT_FRAMEBUFFER);
    assert_eq!(journal.borrow().bound_framebuffer, 0);
}

#[test]
fn copy_framebuffer_to_texture() {
    let (mut device, journal) = device();
    let params = TextureCreateParams::default();

    let target = device.create_texture(&image(16, 16), &params).unwrap();
    let primary = device.create_texture(&image(2, 2), &params).unwrap();
    device.set_texture(0, Some(&primary));
    let bound = journal.borrow().texture_units.get(&0).cloned();

    device.copy_framebuffer_to_texture(
        &target,
        Vector2::new(0, 0),
        Vector2::new(0, 0),
        Vector2::new(16, 16),
    );

    assert_eq!(journal.borrow().texture_units.get(&0).cloned(), bound);
}

#[test]
fn destroy_releases_everything() {
    let (mut device, journal) = device();

    device
        .create_texture(&image(2, 2), &TextureCreateParams::default())
        .unwrap();
    device
        .create_static_buffer(PrimitiveType::Triangles, Vertices::Normal(&quad()))
        .unwrap();
    device.create_framebuffer("shadow", &shadow_params()).unwrap();

    device.destroy();
    assert_eq!(journal.borrow().live_objects(), 0);
}
