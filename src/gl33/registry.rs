//! Ownership of the GPU resources of a device. Handles given out are
//! generation checked, the object names behind them never leave here.

use std::collections::HashMap;

use crate::backends::{BufferHint, Capabilities, ObjectId, SamplerParams, Visitor};
use crate::device::*;
use crate::errors::*;
use crate::math::prelude::*;
use crate::utils::ObjectPool;

use super::shader;

#[derive(Debug, Clone, Copy)]
struct TextureObject {
    id: ObjectId,
    size: Vector2<u32>,
    original_size: Vector2<u32>,
    alpha: bool,
}

/// Metadata of a static vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBuffer {
    pub primitive: PrimitiveType,
    pub vertex_type: VertexType,
    pub count: usize,
    /// Bytes allocated at creation.
    pub size: usize,
    pub(crate) vbo: ObjectId,
    pub(crate) vao: ObjectId,
}

pub struct Registry {
    textures: ObjectPool<TextureHandle, TextureObject>,
    buffers: ObjectPool<StaticBufferHandle, StaticBuffer>,
    framebuffers: HashMap<String, Framebuffer>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            textures: ObjectPool::new(),
            buffers: ObjectPool::new(),
            framebuffers: HashMap::new(),
        }
    }

    /// Uploads pixels as a new texture. The texture is left bound to unit 0.
    pub unsafe fn create_texture(
        &mut self,
        visitor: &mut dyn Visitor,
        caps: &Capabilities,
        data: &ImageData,
        params: &TextureCreateParams,
        tunables: &Tunables,
    ) -> Result<Texture> {
        let format = data.resolve_format(params.format)?;
        let bpp = format.bytes_per_pixel().unwrap_or(4);

        let original_size = data.size;
        let (size, padded) = if params.pad_to_nearest_power_of_two {
            let size = texture::power_of_two_size(original_size);
            if size != original_size {
                let bytes = texture::pad_pixels(data.bytes, original_size, size, bpp);
                (size, Some(bytes))
            } else {
                (size, None)
            }
        } else {
            (original_size, None)
        };

        if size.x > caps.max_texture_size || size.y > caps.max_texture_size {
            return Err(
                DeviceError::TextureTooLarge(size.x, size.y, caps.max_texture_size).into(),
            );
        }

        let bytes = padded.as_ref().map(|v| &v[..]).unwrap_or(data.bytes);
        let id = visitor.create_texture(size, format, bytes)?;

        let sampler = SamplerParams {
            filter: params.filter,
            levels: if params.mipmap {
                tunables.texture_mipmap_level
            } else {
                1
            },
            anisotropy: if caps.anisotropy_supported {
                tunables.texture_anisotropy_level
            } else {
                1
            },
        };

        if let Err(err) = visitor.set_sampler(sampler) {
            visitor.delete_texture(id)?;
            return Err(err);
        }

        let object = TextureObject {
            id,
            size,
            original_size,
            alpha: format.has_alpha(),
        };

        let handle = self.textures.create(object);
        debug!("[GL33Device] Created texture {} of {:?}.", handle, size);
        Ok(Self::texture_of(handle, &object))
    }

    /// Creates a depth-only texture. The texture is left bound to unit 0.
    pub unsafe fn create_depth_texture(
        &mut self,
        visitor: &mut dyn Visitor,
        caps: &Capabilities,
        size: Vector2<u32>,
        depth: u32,
    ) -> Result<Texture> {
        if !caps.shadow_mapping_supported {
            return Err(DeviceError::Requirement("depth textures".into()).into());
        }

        if size.x > caps.max_texture_size || size.y > caps.max_texture_size {
            return Err(
                DeviceError::TextureTooLarge(size.x, size.y, caps.max_texture_size).into(),
            );
        }

        let id = visitor.create_depth_texture(size, depth)?;
        let object = TextureObject {
            id,
            size,
            original_size: size,
            alpha: false,
        };

        let handle = self.textures.create(object);
        debug!("[GL33Device] Created depth texture {} of {:?}.", handle, size);
        Ok(Self::texture_of(handle, &object))
    }

    fn texture_of(handle: TextureHandle, object: &TextureObject) -> Texture {
        Texture {
            handle,
            size: object.size,
            original_size: object.original_size,
            alpha: object.alpha,
        }
    }

    /// Returns the object name of a live texture.
    #[inline]
    pub fn texture_id(&self, handle: TextureHandle) -> Option<ObjectId> {
        self.textures.get(handle).map(|v| v.id)
    }

    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Releases a texture, returns false if the handle is not alive.
    pub unsafe fn destroy_texture(
        &mut self,
        visitor: &mut dyn Visitor,
        handle: TextureHandle,
    ) -> Result<bool> {
        match self.textures.free(handle) {
            Some(v) => {
                visitor.delete_texture(v.id)?;
                debug!("[GL33Device] Destroyed texture {}.", handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Releases every texture, returning their former handles.
    pub unsafe fn destroy_all_textures(
        &mut self,
        visitor: &mut dyn Visitor,
    ) -> Result<Vec<TextureHandle>> {
        let mut handles = Vec::new();
        let mut result = Ok(());

        for (handle, v) in self.textures.drain() {
            if let Err(err) = visitor.delete_texture(v.id) {
                result = Err(err);
            }

            handles.push(handle);
        }

        debug!("[GL33Device] Destroyed {} textures.", handles.len());
        result.map(|_| handles)
    }

    pub unsafe fn create_static_buffer(
        &mut self,
        visitor: &mut dyn Visitor,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<StaticBufferHandle> {
        let bytes = vertices.as_bytes();
        let vertex_type = vertices.vertex_type();

        let vbo = visitor.create_buffer(bytes, BufferHint::Static)?;
        let vao = match visitor.create_vertex_array(vbo, &shader::vertex_layout(vertex_type)) {
            Ok(v) => v,
            Err(err) => {
                visitor.delete_buffer(vbo)?;
                return Err(err);
            }
        };

        let handle = self.buffers.create(StaticBuffer {
            primitive,
            vertex_type,
            count: vertices.len(),
            size: bytes.len(),
            vbo,
            vao,
        });

        debug!(
            "[GL33Device] Created static buffer {} of {} {:?} vertices.",
            handle,
            vertices.len(),
            vertex_type
        );

        Ok(handle)
    }

    /// Re-uploads the vertices of a static buffer in place. Nothing changes
    /// if the layout differs or the vertices do not fit.
    pub unsafe fn update_static_buffer(
        &mut self,
        visitor: &mut dyn Visitor,
        handle: StaticBufferHandle,
        primitive: PrimitiveType,
        vertices: Vertices,
    ) -> Result<()> {
        let buffer = self
            .buffers
            .get_mut(handle)
            .ok_or_else(|| DeviceError::StaticBufferHandleInvalid(handle))?;

        if buffer.vertex_type != vertices.vertex_type() {
            return Err(
                DeviceError::VertexLayoutMismatch(buffer.vertex_type, vertices.vertex_type())
                    .into(),
            );
        }

        let bytes = vertices.as_bytes();
        if bytes.len() > buffer.size {
            return Err(DeviceError::BufferOverflow(buffer.size, bytes.len()).into());
        }

        visitor.update_buffer(buffer.vbo, 0, bytes)?;
        buffer.primitive = primitive;
        buffer.count = vertices.len();
        Ok(())
    }

    #[inline]
    pub fn static_buffer(&self, handle: StaticBufferHandle) -> Option<&StaticBuffer> {
        self.buffers.get(handle)
    }

    #[inline]
    pub fn static_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Releases a static buffer, returns false if the handle is not alive.
    pub unsafe fn destroy_static_buffer(
        &mut self,
        visitor: &mut dyn Visitor,
        handle: StaticBufferHandle,
    ) -> Result<bool> {
        match self.buffers.free(handle) {
            Some(v) => {
                visitor.delete_vertex_array(v.vao)?;
                visitor.delete_buffer(v.vbo)?;
                debug!("[GL33Device] Destroyed static buffer {}.", handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Registers the framebuffer of the window surface.
    pub fn register_default_framebuffer(&mut self, framebuffer: Framebuffer) {
        self.framebuffers
            .insert(DEFAULT_FRAMEBUFFER.to_owned(), framebuffer);
    }

    #[inline]
    pub fn framebuffer(&self, name: &str) -> Option<&Framebuffer> {
        self.framebuffers.get(name)
    }

    #[inline]
    pub fn framebuffer_mut(&mut self, name: &str) -> Option<&mut Framebuffer> {
        self.framebuffers.get_mut(name)
    }

    /// Returns the object name of an attachment of a framebuffer if it is a
    /// texture.
    pub fn framebuffer_texture_id(
        &self,
        name: &str,
        attachment: FramebufferAttachment,
    ) -> Option<ObjectId> {
        let fb = self.framebuffers.get(name)?;
        let object = match attachment {
            FramebufferAttachment::Color => fb.objects.color,
            FramebufferAttachment::Depth => fb.objects.depth,
        }?;

        if object.kind == AttachmentType::Texture {
            Some(object.id)
        } else {
            None
        }
    }

    /// Creates a framebuffer, releasing the one registered with the same name
    /// first.
    pub unsafe fn create_framebuffer(
        &mut self,
        visitor: &mut dyn Visitor,
        caps: &Capabilities,
        name: &str,
        params: &FramebufferParams,
    ) -> Result<&Framebuffer> {
        if name == DEFAULT_FRAMEBUFFER {
            return Err(DeviceError::ReservedFramebuffer(name.into()).into());
        }

        if !caps.framebuffer_supported {
            return Err(DeviceError::Requirement("framebuffer objects".into()).into());
        }

        if params.width > caps.max_texture_size || params.height > caps.max_texture_size {
            return Err(DeviceError::TextureTooLarge(
                params.width,
                params.height,
                caps.max_texture_size,
            )
            .into());
        }

        self.delete_framebuffer(visitor, name)?;

        let mut params = *params;
        params.samples = params.samples.max(1).min(caps.max_samples.max(1));

        let objects = visitor.create_framebuffer(&params)?;
        debug!(
            "[GL33Device] Created framebuffer {:?} of {}x{}.",
            name, params.width, params.height
        );

        let framebuffer = Framebuffer::new(params, objects);
        let entry = self
            .framebuffers
            .entry(name.to_owned())
            .or_insert(framebuffer);

        Ok(&*entry)
    }

    /// Releases a framebuffer, returns false if there is none with `name`.
    pub unsafe fn delete_framebuffer(
        &mut self,
        visitor: &mut dyn Visitor,
        name: &str,
    ) -> Result<bool> {
        if name == DEFAULT_FRAMEBUFFER {
            return Err(DeviceError::ReservedFramebuffer(name.into()).into());
        }

        match self.framebuffers.remove(name) {
            Some(v) => {
                visitor.delete_framebuffer(&v.objects)?;
                debug!("[GL33Device] Deleted framebuffer {:?}.", name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Releases every resource. Failures are logged, every object is
    /// forgotten regardless.
    pub unsafe fn clear(&mut self, visitor: &mut dyn Visitor) {
        if let Err(err) = self.destroy_all_textures(visitor) {
            warn!("[GL33Device] Failed to release textures: {}", err);
        }

        for (handle, v) in self.buffers.drain() {
            if let Err(err) = visitor
                .delete_vertex_array(v.vao)
                .and_then(|_| visitor.delete_buffer(v.vbo))
            {
                warn!("[GL33Device] Failed to release {}: {}", handle, err);
            }
        }

        for (name, v) in self.framebuffers.drain() {
            if v.is_default() {
                continue;
            }

            if let Err(err) = visitor.delete_framebuffer(&v.objects) {
                warn!("[GL33Device] Failed to release framebuffer {:?}: {}", name, err);
            }
        }
    }
}
