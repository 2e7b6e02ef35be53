use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use ::gl;
use ::gl::types::*;

use crate::device::{
    AttachmentType, BlendFunc, CompFunc, CullMode, FillMode, FramebufferParams, PrimitiveType,
    TexFilter, TexImgFormat, TexWrapMode,
};
use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

use super::super::*;
use super::capabilities;
use super::types;

/// Submits calls to the OpenGL context which is current on this thread.
pub struct GLVisitor {
    active_unit: usize,
}

impl Default for GLVisitor {
    fn default() -> Self {
        GLVisitor::new()
    }
}

impl GLVisitor {
    pub fn new() -> Self {
        GLVisitor { active_unit: 0 }
    }

    unsafe fn active_texture(&mut self, unit: usize) {
        if self.active_unit != unit {
            gl::ActiveTexture(gl::TEXTURE0 + unit as GLuint);
            self.active_unit = unit;
        }
    }

    unsafe fn create_attachment(
        &mut self,
        kind: AttachmentType,
        params: &FramebufferParams,
        depth: bool,
    ) -> Result<Option<AttachmentObject>> {
        let location = if depth {
            gl::DEPTH_ATTACHMENT
        } else {
            gl::COLOR_ATTACHMENT0
        };

        let internal_format = if depth {
            types::depth_format(params.depth)
        } else {
            gl::RGBA8
        };

        let id = match kind {
            AttachmentType::None => return Ok(None),
            AttachmentType::Texture => {
                let size = Vector2::new(params.width, params.height);
                let id = if depth {
                    self.create_depth_texture(size, params.depth)?
                } else {
                    self.create_texture(size, TexImgFormat::RGBA, &[])?
                };

                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
                gl::FramebufferTexture2D(gl::FRAMEBUFFER, location, gl::TEXTURE_2D, id, 0);
                id
            }
            AttachmentType::Renderbuffer => {
                let mut id = 0;
                gl::GenRenderbuffers(1, &mut id);
                gl::BindRenderbuffer(gl::RENDERBUFFER, id);

                if params.samples > 1 {
                    gl::RenderbufferStorageMultisample(
                        gl::RENDERBUFFER,
                        params.samples as GLsizei,
                        internal_format,
                        params.width as GLsizei,
                        params.height as GLsizei,
                    );
                } else {
                    gl::RenderbufferStorage(
                        gl::RENDERBUFFER,
                        internal_format,
                        params.width as GLsizei,
                        params.height as GLsizei,
                    );
                }

                gl::FramebufferRenderbuffer(gl::FRAMEBUFFER, location, gl::RENDERBUFFER, id);
                gl::BindRenderbuffer(gl::RENDERBUFFER, 0);
                id
            }
        };

        check()?;
        Ok(Some(AttachmentObject { kind, id }))
    }

    unsafe fn compile(shader: GLenum, src: &str) -> Result<GLuint> {
        let shader = gl::CreateShader(shader);
        let c_str = CString::new(src.as_bytes())?;
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteShader(shader);

            let log = String::from_utf8_lossy(&buf[..buf.len() - 1]).into_owned();
            Err(DeviceError::ShaderCreationFailure(log).into())
        } else {
            Ok(shader)
        }
    }

    unsafe fn link(vs: GLuint, fs: GLuint) -> Result<GLuint> {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vs);
        gl::AttachShader(program, fs);
        gl::LinkProgram(program);

        gl::DetachShader(program, vs);
        gl::DetachShader(program, fs);
        gl::DeleteShader(vs);
        gl::DeleteShader(fs);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteProgram(program);

            let log = String::from_utf8_lossy(&buf[..buf.len() - 1]).into_owned();
            Err(DeviceError::ShaderCreationFailure(log).into())
        } else {
            Ok(program)
        }
    }
}

impl Visitor for GLVisitor {
    unsafe fn probe(&mut self) -> Result<Capabilities> {
        capabilities::probe()
    }

    unsafe fn create_program(&mut self, vs: &str, fs: &str) -> Result<ObjectId> {
        let vs = Self::compile(gl::VERTEX_SHADER, vs)?;
        let fs = match Self::compile(gl::FRAGMENT_SHADER, fs) {
            Ok(v) => v,
            Err(err) => {
                gl::DeleteShader(vs);
                return Err(err);
            }
        };

        let id = Self::link(vs, fs)?;
        check()?;
        Ok(id)
    }

    unsafe fn delete_program(&mut self, id: ObjectId) -> Result<()> {
        gl::DeleteProgram(id);
        check()
    }

    unsafe fn use_program(&mut self, id: ObjectId) -> Result<()> {
        gl::UseProgram(id);
        check()
    }

    unsafe fn uniform_location(&mut self, program: ObjectId, name: &str) -> Result<Option<i32>> {
        let c_name = CString::new(name.as_bytes())?;
        let location = gl::GetUniformLocation(program, c_name.as_ptr());
        check()?;

        if location < 0 {
            Ok(None)
        } else {
            Ok(Some(location))
        }
    }

    unsafe fn bind_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()> {
        match *variable {
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
            UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
            UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
            UniformVariable::Matrix3f(v) => {
                gl::UniformMatrix3fv(location, 1, gl::FALSE, v[0].as_ptr())
            }
            UniformVariable::Matrix4f(v) => {
                gl::UniformMatrix4fv(location, 1, gl::FALSE, v[0].as_ptr())
            }
        }

        check()
    }

    unsafe fn create_texture(
        &mut self,
        size: Vector2<u32>,
        format: TexImgFormat,
        bytes: &[u8],
    ) -> Result<ObjectId> {
        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate texture object.");
        }

        self.active_texture(0);
        gl::BindTexture(gl::TEXTURE_2D, id);

        let value = if bytes.is_empty() {
            ptr::null()
        } else {
            bytes.as_ptr() as *const c_void
        };

        let (internal_format, format, pixel_type) = types::texture_format(format);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format as GLint,
            size.x as GLsizei,
            size.y as GLsizei,
            0,
            format,
            pixel_type,
            value,
        );

        if let Err(err) = check() {
            gl::DeleteTextures(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn create_depth_texture(&mut self, size: Vector2<u32>, depth: u32) -> Result<ObjectId> {
        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate texture object.");
        }

        self.active_texture(0);
        gl::BindTexture(gl::TEXTURE_2D, id);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            types::depth_format(depth) as GLint,
            size.x as GLsizei,
            size.y as GLsizei,
            0,
            gl::DEPTH_COMPONENT,
            gl::FLOAT,
            ptr::null(),
        );

        let clamp = gl::CLAMP_TO_EDGE as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, clamp);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, clamp);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        gl::TexParameteri(
            gl::TEXTURE_2D,
            gl::TEXTURE_COMPARE_MODE,
            gl::COMPARE_REF_TO_TEXTURE as GLint,
        );
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_COMPARE_FUNC, gl::LEQUAL as GLint);

        if let Err(err) = check() {
            gl::DeleteTextures(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn set_sampler(&mut self, params: SamplerParams) -> Result<()> {
        self.active_texture(0);

        let levels = params.levels.max(1);
        let (min_filter, mag_filter) = match params.filter {
            TexFilter::Nearest if levels > 1 => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
            TexFilter::Nearest => (gl::NEAREST, gl::NEAREST),
            TexFilter::Bilinear if levels > 1 => (gl::LINEAR_MIPMAP_NEAREST, gl::LINEAR),
            TexFilter::Bilinear => (gl::LINEAR, gl::LINEAR),
            TexFilter::Trilinear if levels > 1 => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
            TexFilter::Trilinear => (gl::LINEAR, gl::LINEAR),
        };

        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_BASE_LEVEL, 0);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, (levels - 1) as GLint);

        if levels > 1 {
            gl::GenerateMipmap(gl::TEXTURE_2D);
        }

        if params.anisotropy > 1 {
            gl::TexParameterf(
                gl::TEXTURE_2D,
                capabilities::TEXTURE_MAX_ANISOTROPY,
                params.anisotropy as GLfloat,
            );
        }

        check()
    }

    unsafe fn set_wrap(&mut self, unit: usize, s: TexWrapMode, t: TexWrapMode) -> Result<()> {
        self.active_texture(unit);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, GLenum::from(s) as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, GLenum::from(t) as GLint);
        check()
    }

    unsafe fn delete_texture(&mut self, id: ObjectId) -> Result<()> {
        gl::DeleteTextures(1, &id);
        check()
    }

    unsafe fn bind_texture(&mut self, unit: usize, id: ObjectId) -> Result<()> {
        self.active_texture(unit);
        gl::BindTexture(gl::TEXTURE_2D, id);
        check()
    }

    unsafe fn create_buffer(&mut self, bytes: &[u8], hint: BufferHint) -> Result<ObjectId> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate buffer object.");
        }

        self.upload_buffer(id, bytes, hint)?;
        Ok(id)
    }

    unsafe fn upload_buffer(&mut self, id: ObjectId, bytes: &[u8], hint: BufferHint) -> Result<()> {
        let value = if bytes.is_empty() {
            ptr::null()
        } else {
            bytes.as_ptr() as *const c_void
        };

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferData(gl::ARRAY_BUFFER, bytes.len() as isize, value, hint.into());
        check()
    }

    unsafe fn update_buffer(&mut self, id: ObjectId, offset: usize, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferSubData(
            gl::ARRAY_BUFFER,
            offset as isize,
            bytes.len() as isize,
            bytes.as_ptr() as *const c_void,
        );
        check()
    }

    unsafe fn delete_buffer(&mut self, id: ObjectId) -> Result<()> {
        gl::DeleteBuffers(1, &id);
        check()
    }

    unsafe fn create_vertex_array(
        &mut self,
        vbo: ObjectId,
        layout: &VertexLayout,
    ) -> Result<ObjectId> {
        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        if vao == 0 {
            bail!("[GL] Failed to generate vertex array object.");
        }

        gl::BindVertexArray(vao);
        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

        for v in &layout.attributes {
            gl::EnableVertexAttribArray(v.location);
            gl::VertexAttribPointer(
                v.location,
                GLint::from(v.size),
                gl::FLOAT,
                gl::FALSE,
                layout.stride as GLsizei,
                v.offset as *const c_void,
            );
        }

        gl::BindVertexArray(0);
        check()?;
        Ok(vao)
    }

    unsafe fn bind_vertex_array(&mut self, id: ObjectId) -> Result<()> {
        gl::BindVertexArray(id);
        check()
    }

    unsafe fn delete_vertex_array(&mut self, id: ObjectId) -> Result<()> {
        gl::DeleteVertexArrays(1, &id);
        check()
    }

    unsafe fn set_constant_attribute(&mut self, location: u32, value: [f32; 4]) -> Result<()> {
        gl::VertexAttrib4f(location, value[0], value[1], value[2], value[3]);
        check()
    }

    unsafe fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> Result<()> {
        gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei);
        check()
    }

    unsafe fn set_capability(&mut self, capability: Capability, enabled: bool) -> Result<()> {
        if enabled {
            gl::Enable(capability.into());
        } else {
            gl::Disable(capability.into());
        }

        check()
    }

    unsafe fn set_depth_func(&mut self, func: CompFunc) -> Result<()> {
        gl::DepthFunc(func.into());
        check()
    }

    unsafe fn set_depth_mask(&mut self, write: bool) -> Result<()> {
        gl::DepthMask(if write { gl::TRUE } else { gl::FALSE });
        check()
    }

    unsafe fn set_polygon_offset(&mut self, factor: f32, units: f32) -> Result<()> {
        gl::PolygonOffset(factor, units);
        check()
    }

    unsafe fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) -> Result<()> {
        gl::BlendFunc(src.into(), dst.into());
        check()
    }

    unsafe fn set_color_mask(&mut self, mask: [bool; 4]) -> Result<()> {
        let v = |b: bool| if b { gl::TRUE } else { gl::FALSE };
        gl::ColorMask(v(mask[0]), v(mask[1]), v(mask[2]), v(mask[3]));
        check()
    }

    unsafe fn set_front_face(&mut self, mode: CullMode) -> Result<()> {
        gl::FrontFace(mode.into());
        check()
    }

    unsafe fn set_polygon_mode(&mut self, mode: FillMode) -> Result<()> {
        gl::PolygonMode(gl::FRONT_AND_BACK, mode.into());
        check()
    }

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()> {
        gl::ClearColor(color.r, color.g, color.b, color.a);
        check()
    }

    unsafe fn clear(&mut self, color: bool, depth: bool) -> Result<()> {
        let mut bits = 0;
        if color {
            bits |= gl::COLOR_BUFFER_BIT;
        }

        if depth {
            bits |= gl::DEPTH_BUFFER_BIT;
        }

        if bits != 0 {
            gl::Clear(bits);
            check()
        } else {
            Ok(())
        }
    }

    unsafe fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()> {
        gl::Viewport(position.x, position.y, size.x as GLsizei, size.y as GLsizei);
        check()
    }

    unsafe fn create_framebuffer(
        &mut self,
        params: &FramebufferParams,
    ) -> Result<FramebufferObjects> {
        let mut fbo = 0;
        gl::GenFramebuffers(1, &mut fbo);
        if fbo == 0 {
            bail!("[GL] Failed to generate framebuffer object.");
        }

        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);

        let mut objects = FramebufferObjects {
            fbo,
            color: None,
            depth: None,
        };

        let attached = self
            .create_attachment(params.color_attachment, params, false)
            .and_then(|color| {
                objects.color = color;
                self.create_attachment(params.depth_attachment, params, true)
            });

        let status = match attached {
            Ok(depth) => {
                objects.depth = depth;

                if objects.color.is_none() {
                    gl::DrawBuffer(gl::NONE);
                    gl::ReadBuffer(gl::NONE);
                }

                gl::CheckFramebufferStatus(gl::FRAMEBUFFER)
            }
            Err(err) => {
                gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
                self.delete_framebuffer(&objects)?;
                return Err(err);
            }
        };

        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        if status != gl::FRAMEBUFFER_COMPLETE {
            self.delete_framebuffer(&objects)?;

            let reason = match status {
                gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => {
                    "not all framebuffer attachment points are framebuffer attachment complete"
                }
                gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                    "no images are attached to the framebuffer"
                }
                gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => {
                    "the number of samples is not the same for all attached images"
                }
                gl::FRAMEBUFFER_UNSUPPORTED => {
                    "the combination of internal formats of the attached images violates an \
                     implementation-dependent set of restrictions"
                }
                _ => "unknown status",
            };

            return Err(DeviceError::FramebufferIncomplete(reason.into()).into());
        }

        Ok(objects)
    }

    unsafe fn delete_framebuffer(&mut self, objects: &FramebufferObjects) -> Result<()> {
        for v in objects.color.iter().chain(objects.depth.iter()) {
            match v.kind {
                AttachmentType::Texture => gl::DeleteTextures(1, &v.id),
                AttachmentType::Renderbuffer => gl::DeleteRenderbuffers(1, &v.id),
                AttachmentType::None => {}
            }
        }

        if objects.fbo != 0 {
            gl::DeleteFramebuffers(1, &objects.fbo);
        }

        check()
    }

    unsafe fn bind_framebuffer(&mut self, fbo: ObjectId) -> Result<()> {
        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        check()
    }

    unsafe fn copy_framebuffer_to_texture(
        &mut self,
        id: ObjectId,
        offset: Vector2<i32>,
        origin: Vector2<i32>,
        size: Vector2<u32>,
    ) -> Result<()> {
        self.active_texture(0);
        gl::BindTexture(gl::TEXTURE_2D, id);
        gl::CopyTexSubImage2D(
            gl::TEXTURE_2D,
            0,
            offset.x,
            offset.y,
            origin.x,
            origin.y,
            size.x as GLsizei,
            size.y as GLsizei,
        );
        check()
    }

    unsafe fn read_pixels(&mut self, origin: Vector2<i32>, size: Vector2<u32>) -> Result<Vec<u8>> {
        let mut pixels = vec![0u8; (size.x as usize) * (size.y as usize) * 4];
        if pixels.is_empty() {
            return Ok(pixels);
        }

        gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
        gl::ReadPixels(
            origin.x,
            origin.y,
            size.x as GLsizei,
            size.y as GLsizei,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            pixels.as_mut_ptr() as *mut c_void,
        );

        check()?;
        Ok(pixels)
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
