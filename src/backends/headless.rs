//! A backend that simulates the graphics context in memory. Every object and
//! call is recorded into a shared `Journal`, which makes GPU-side effects
//! observable without a window.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::device::{
    AttachmentType, BlendFunc, CompFunc, CullMode, FillMode, FramebufferParams, PrimitiveType,
    TexImgFormat, TexWrapMode,
};
use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

use super::*;

/// A draw call issued to the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub primitive: PrimitiveType,
    pub layout: VertexLayout,
    /// The vertex bytes consumed by the draw.
    pub bytes: Vec<u8>,
    pub count: u32,
    /// Constant values of the attributes not sourced from the buffer.
    pub constants: Vec<(u32, [f32; 4])>,
    pub framebuffer: ObjectId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub size: Vector2<u32>,
    pub format: Option<TexImgFormat>,
    pub depth: Option<u32>,
    pub bytes: Vec<u8>,
    pub sampler: Option<SamplerParams>,
    pub wrap: (TexWrapMode, TexWrapMode),
}

#[derive(Debug, Clone)]
pub struct BufferRecord {
    pub bytes: Vec<u8>,
    pub hint: BufferHint,
    /// Number of times the storage was (re)allocated.
    pub allocations: usize,
}

/// Everything the headless backend has observed.
#[derive(Debug, Default)]
pub struct Journal {
    pub programs: HashMap<ObjectId, (String, String)>,
    pub program_in_use: ObjectId,
    pub uniform_names: HashMap<String, i32>,
    pub uniforms: HashMap<i32, UniformVariable>,
    /// Total number of uniform uploads.
    pub uniform_uploads: usize,
    pub textures: HashMap<ObjectId, TextureRecord>,
    /// Texture bound to each texture unit.
    pub texture_units: HashMap<usize, ObjectId>,
    pub buffers: HashMap<ObjectId, BufferRecord>,
    pub vertex_arrays: HashMap<ObjectId, (ObjectId, VertexLayout)>,
    /// Number of vertex arrays that could still be created, like a context
    /// running out of memory. `None` never runs out.
    pub vertex_array_budget: Option<usize>,
    pub bound_vertex_array: ObjectId,
    pub constants: HashMap<u32, [f32; 4]>,
    pub framebuffers: HashMap<ObjectId, FramebufferParams>,
    pub renderbuffers: HashMap<ObjectId, Vector2<u32>>,
    pub bound_framebuffer: ObjectId,
    /// Total number of pipeline state calls.
    pub state_changes: usize,
    pub capabilities: HashMap<Capability, bool>,
    pub depth_func: Option<CompFunc>,
    pub depth_mask: Option<bool>,
    pub polygon_offset: Option<(f32, f32)>,
    pub blend_func: Option<(BlendFunc, BlendFunc)>,
    pub color_mask: Option<[bool; 4]>,
    pub front_face: Option<CullMode>,
    pub polygon_mode: Option<FillMode>,
    pub clear_color: Option<Color>,
    pub viewport: Option<(Vector2<i32>, Vector2<u32>)>,
    pub clears: usize,
    pub draws: Vec<DrawCall>,
    pub flushes: usize,
}

impl Journal {
    /// Returns true if a capability has been enabled.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.get(&capability).cloned().unwrap_or(false)
    }

    /// Returns the last uploaded value of a uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformVariable> {
        self.uniform_names
            .get(name)
            .and_then(|location| self.uniforms.get(location))
            .cloned()
    }

    /// Number of live GPU objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.programs.len()
            + self.textures.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
            + self.framebuffers.len()
            + self.renderbuffers.len()
    }
}

/// Simulated graphics context.
pub struct HeadlessVisitor {
    capabilities: Capabilities,
    journal: Rc<RefCell<Journal>>,
    next_id: ObjectId,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor::with_capabilities(Capabilities::headless())
    }

    /// Creates a visitor reporting `capabilities` when probed.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        HeadlessVisitor {
            capabilities,
            journal: Rc::new(RefCell::new(Journal::default())),
            next_id: 0,
        }
    }

    /// Returns a shared reference to the journal of this visitor.
    pub fn journal(&self) -> Rc<RefCell<Journal>> {
        self.journal.clone()
    }

    fn allocate(&mut self) -> ObjectId {
        self.next_id += 1;
        self.next_id
    }

    fn state_change(&self) -> ::std::cell::RefMut<Journal> {
        let mut journal = self.journal.borrow_mut();
        journal.state_changes += 1;
        journal
    }

    fn create_attachment(
        &mut self,
        kind: AttachmentType,
        params: &FramebufferParams,
        depth: bool,
    ) -> Option<AttachmentObject> {
        let size = Vector2::new(params.width, params.height);
        let id = match kind {
            AttachmentType::None => return None,
            AttachmentType::Texture => {
                let id = self.allocate();
                let record = TextureRecord {
                    size,
                    format: if depth { None } else { Some(TexImgFormat::RGBA) },
                    depth: if depth { Some(params.depth) } else { None },
                    bytes: Vec::new(),
                    sampler: None,
                    wrap: (TexWrapMode::Clamp, TexWrapMode::Clamp),
                };

                self.journal.borrow_mut().textures.insert(id, record);
                id
            }
            AttachmentType::Renderbuffer => {
                let id = self.allocate();
                self.journal.borrow_mut().renderbuffers.insert(id, size);
                id
            }
        };

        Some(AttachmentObject { kind, id })
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn probe(&mut self) -> Result<Capabilities> {
        Ok(self.capabilities)
    }

    unsafe fn create_program(&mut self, vs: &str, fs: &str) -> Result<ObjectId> {
        if vs.is_empty() || fs.is_empty() {
            bail!("Shader sources are empty.");
        }

        let id = self.allocate();
        self.journal
            .borrow_mut()
            .programs
            .insert(id, (vs.to_owned(), fs.to_owned()));
        Ok(id)
    }

    unsafe fn delete_program(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.programs.remove(&id).is_none() {
            bail!("Program {} is invalid.", id);
        }

        if journal.program_in_use == id {
            journal.program_in_use = 0;
        }

        Ok(())
    }

    unsafe fn use_program(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if id != 0 && !journal.programs.contains_key(&id) {
            bail!("Program {} is invalid.", id);
        }

        journal.program_in_use = id;
        Ok(())
    }

    unsafe fn uniform_location(&mut self, program: ObjectId, name: &str) -> Result<Option<i32>> {
        let mut journal = self.journal.borrow_mut();
        let declared = match journal.programs.get(&program) {
            Some((vs, fs)) => {
                // Array members are declared through their struct type.
                let base = name.split('[').next().unwrap_or(name);
                vs.contains(base) || fs.contains(base)
            }
            None => bail!("Program {} is invalid.", program),
        };

        if !declared {
            return Ok(None);
        }

        let next = journal.uniform_names.len() as i32;
        Ok(Some(
            *journal.uniform_names.entry(name.to_owned()).or_insert(next),
        ))
    }

    unsafe fn bind_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.program_in_use == 0 {
            bail!("No program is in use.");
        }

        journal.uniforms.insert(location, *variable);
        journal.uniform_uploads += 1;
        Ok(())
    }

    unsafe fn create_texture(
        &mut self,
        size: Vector2<u32>,
        format: TexImgFormat,
        bytes: &[u8],
    ) -> Result<ObjectId> {
        if size.x > self.capabilities.max_texture_size || size.y > self.capabilities.max_texture_size
        {
            bail!("[Headless] Texture of {:?} is out of memory.", size);
        }

        let id = self.allocate();
        let record = TextureRecord {
            size,
            format: Some(format),
            depth: None,
            bytes: bytes.to_vec(),
            sampler: None,
            wrap: (TexWrapMode::Repeat, TexWrapMode::Repeat),
        };

        let mut journal = self.journal.borrow_mut();
        journal.textures.insert(id, record);
        journal.texture_units.insert(0, id);
        Ok(id)
    }

    unsafe fn create_depth_texture(&mut self, size: Vector2<u32>, depth: u32) -> Result<ObjectId> {
        let id = self.allocate();
        let record = TextureRecord {
            size,
            format: None,
            depth: Some(depth),
            bytes: Vec::new(),
            sampler: None,
            wrap: (TexWrapMode::Clamp, TexWrapMode::Clamp),
        };

        let mut journal = self.journal.borrow_mut();
        journal.textures.insert(id, record);
        journal.texture_units.insert(0, id);
        Ok(id)
    }

    unsafe fn set_sampler(&mut self, params: SamplerParams) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        let id = journal.texture_units.get(&0).cloned().unwrap_or(0);
        match journal.textures.get_mut(&id) {
            Some(texture) => {
                texture.sampler = Some(params);
                Ok(())
            }
            None => bail!("No texture is bound to unit 0."),
        }
    }

    unsafe fn set_wrap(&mut self, unit: usize, s: TexWrapMode, t: TexWrapMode) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        let id = journal.texture_units.get(&unit).cloned().unwrap_or(0);
        match journal.textures.get_mut(&id) {
            Some(texture) => {
                texture.wrap = (s, t);
                Ok(())
            }
            None => bail!("No texture is bound to unit {}.", unit),
        }
    }

    unsafe fn delete_texture(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.textures.remove(&id).is_none() {
            bail!("Texture {} is invalid.", id);
        }

        journal.texture_units.retain(|_, v| *v != id);
        Ok(())
    }

    unsafe fn bind_texture(&mut self, unit: usize, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if id == 0 {
            journal.texture_units.remove(&unit);
            return Ok(());
        }

        if !journal.textures.contains_key(&id) {
            bail!("Texture {} is invalid.", id);
        }

        journal.texture_units.insert(unit, id);
        Ok(())
    }

    unsafe fn create_buffer(&mut self, bytes: &[u8], hint: BufferHint) -> Result<ObjectId> {
        let id = self.allocate();
        let record = BufferRecord {
            bytes: bytes.to_vec(),
            hint,
            allocations: 1,
        };

        self.journal.borrow_mut().buffers.insert(id, record);
        Ok(id)
    }

    unsafe fn upload_buffer(&mut self, id: ObjectId, bytes: &[u8], hint: BufferHint) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        match journal.buffers.get_mut(&id) {
            Some(buffer) => {
                buffer.bytes = bytes.to_vec();
                buffer.hint = hint;
                buffer.allocations += 1;
                Ok(())
            }
            None => bail!("Buffer {} is invalid.", id),
        }
    }

    unsafe fn update_buffer(&mut self, id: ObjectId, offset: usize, bytes: &[u8]) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        match journal.buffers.get_mut(&id) {
            Some(buffer) => {
                if offset + bytes.len() > buffer.bytes.len() {
                    bail!("[Headless] Buffer {} update is out of bounds.", id);
                }

                buffer.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
                Ok(())
            }
            None => bail!("Buffer {} is invalid.", id),
        }
    }

    unsafe fn delete_buffer(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.buffers.remove(&id).is_none() {
            bail!("Buffer {} is invalid.", id);
        }

        Ok(())
    }

    unsafe fn create_vertex_array(
        &mut self,
        vbo: ObjectId,
        layout: &VertexLayout,
    ) -> Result<ObjectId> {
        {
            let mut journal = self.journal.borrow_mut();
            if !journal.buffers.contains_key(&vbo) {
                bail!("Buffer {} is invalid.", vbo);
            }

            match journal.vertex_array_budget {
                Some(0) => bail!("Out of memory."),
                Some(ref mut v) => *v -= 1,
                None => {}
            }
        }

        let id = self.allocate();
        self.journal
            .borrow_mut()
            .vertex_arrays
            .insert(id, (vbo, layout.clone()));
        Ok(id)
    }

    unsafe fn bind_vertex_array(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if id != 0 && !journal.vertex_arrays.contains_key(&id) {
            bail!("Vertex array {} is invalid.", id);
        }

        journal.bound_vertex_array = id;
        Ok(())
    }

    unsafe fn delete_vertex_array(&mut self, id: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.vertex_arrays.remove(&id).is_none() {
            bail!("Vertex array {} is invalid.", id);
        }

        if journal.bound_vertex_array == id {
            journal.bound_vertex_array = 0;
        }

        Ok(())
    }

    unsafe fn set_constant_attribute(&mut self, location: u32, value: [f32; 4]) -> Result<()> {
        self.journal.borrow_mut().constants.insert(location, value);
        Ok(())
    }

    unsafe fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.program_in_use == 0 {
            bail!("No program is in use.");
        }

        let (vbo, layout) = match journal.vertex_arrays.get(&journal.bound_vertex_array) {
            Some(v) => v.clone(),
            None => bail!("No vertex array is bound."),
        };

        let bytes = {
            let buffer = match journal.buffers.get(&vbo) {
                Some(v) => v,
                None => bail!("Buffer {} is invalid.", vbo),
            };

            let begin = first as usize * layout.stride;
            let end = begin + count as usize * layout.stride;
            if end > buffer.bytes.len() {
                bail!("[Headless] Draw of {} vertices is out of bounds.", count);
            }

            buffer.bytes[begin..end].to_vec()
        };

        let mut constants: Vec<(u32, [f32; 4])> = journal
            .constants
            .iter()
            .filter(|(location, _)| !layout.contains(**location))
            .map(|(location, value)| (*location, *value))
            .collect();
        constants.sort_by_key(|v| v.0);

        let call = DrawCall {
            primitive,
            layout,
            bytes,
            count,
            constants,
            framebuffer: journal.bound_framebuffer,
        };

        journal.draws.push(call);
        Ok(())
    }

    unsafe fn set_capability(&mut self, capability: Capability, enabled: bool) -> Result<()> {
        self.state_change().capabilities.insert(capability, enabled);
        Ok(())
    }

    unsafe fn set_depth_func(&mut self, func: CompFunc) -> Result<()> {
        self.state_change().depth_func = Some(func);
        Ok(())
    }

    unsafe fn set_depth_mask(&mut self, write: bool) -> Result<()> {
        self.state_change().depth_mask = Some(write);
        Ok(())
    }

    unsafe fn set_polygon_offset(&mut self, factor: f32, units: f32) -> Result<()> {
        self.state_change().polygon_offset = Some((factor, units));
        Ok(())
    }

    unsafe fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) -> Result<()> {
        self.state_change().blend_func = Some((src, dst));
        Ok(())
    }

    unsafe fn set_color_mask(&mut self, mask: [bool; 4]) -> Result<()> {
        self.state_change().color_mask = Some(mask);
        Ok(())
    }

    unsafe fn set_front_face(&mut self, mode: CullMode) -> Result<()> {
        self.state_change().front_face = Some(mode);
        Ok(())
    }

    unsafe fn set_polygon_mode(&mut self, mode: FillMode) -> Result<()> {
        self.state_change().polygon_mode = Some(mode);
        Ok(())
    }

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()> {
        self.state_change().clear_color = Some(color);
        Ok(())
    }

    unsafe fn clear(&mut self, color: bool, depth: bool) -> Result<()> {
        if color || depth {
            self.journal.borrow_mut().clears += 1;
        }

        Ok(())
    }

    unsafe fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()> {
        self.state_change().viewport = Some((position, size));
        Ok(())
    }

    unsafe fn create_framebuffer(
        &mut self,
        params: &FramebufferParams,
    ) -> Result<FramebufferObjects> {
        if params.width == 0 || params.height == 0 {
            return Err(DeviceError::FramebufferIncomplete("zero sized attachments".into()).into());
        }

        if params.color_attachment == AttachmentType::None
            && params.depth_attachment == AttachmentType::None
        {
            return Err(DeviceError::FramebufferIncomplete("no attachments".into()).into());
        }

        let fbo = self.allocate();
        let color = self.create_attachment(params.color_attachment, params, false);
        let depth = self.create_attachment(params.depth_attachment, params, true);

        self.journal.borrow_mut().framebuffers.insert(fbo, *params);
        Ok(FramebufferObjects { fbo, color, depth })
    }

    unsafe fn delete_framebuffer(&mut self, objects: &FramebufferObjects) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if journal.framebuffers.remove(&objects.fbo).is_none() {
            bail!("Framebuffer {} is invalid.", objects.fbo);
        }

        if journal.bound_framebuffer == objects.fbo {
            journal.bound_framebuffer = 0;
        }

        for attachment in objects.color.iter().chain(objects.depth.iter()) {
            match attachment.kind {
                AttachmentType::Texture => {
                    journal.textures.remove(&attachment.id);
                    journal.texture_units.retain(|_, v| *v != attachment.id);
                }
                AttachmentType::Renderbuffer => {
                    journal.renderbuffers.remove(&attachment.id);
                }
                AttachmentType::None => {}
            }
        }

        Ok(())
    }

    unsafe fn bind_framebuffer(&mut self, fbo: ObjectId) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if fbo != 0 && !journal.framebuffers.contains_key(&fbo) {
            bail!("Framebuffer {} is invalid.", fbo);
        }

        journal.bound_framebuffer = fbo;
        Ok(())
    }

    unsafe fn copy_framebuffer_to_texture(
        &mut self,
        id: ObjectId,
        _: Vector2<i32>,
        _: Vector2<i32>,
        _: Vector2<u32>,
    ) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        if !journal.textures.contains_key(&id) {
            bail!("Texture {} is invalid.", id);
        }

        journal.texture_units.insert(0, id);
        Ok(())
    }

    unsafe fn read_pixels(&mut self, _: Vector2<i32>, size: Vector2<u32>) -> Result<Vec<u8>> {
        let journal = self.journal.borrow();
        let color: [u8; 4] = journal.clear_color.unwrap_or_else(Color::black).into();

        let len = (size.x as usize) * (size.y as usize);
        let mut pixels = Vec::with_capacity(len * 4);
        for _ in 0..len {
            pixels.extend_from_slice(&color);
        }

        Ok(pixels)
    }

    unsafe fn flush(&mut self) -> Result<()> {
        self.journal.borrow_mut().flushes += 1;
        Ok(())
    }
}
