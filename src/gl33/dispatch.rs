//! Issues draw calls. Transient vertices go through one auxiliary buffer
//! per vertex layout, which is reused across draws and grown on demand.

use crate::backends::{BufferHint, ObjectId, Visitor};
use crate::device::*;
use crate::errors::*;
use crate::math::prelude::Color;

use super::registry::StaticBuffer;
use super::shader::{self, ATTRIB_COLOR, ATTRIB_NORMAL};

#[derive(Debug, Clone, Copy, PartialEq)]
struct AuxBuffer {
    vbo: ObjectId,
    vao: ObjectId,
    /// Bytes allocated for `vbo`.
    capacity: usize,
}

const VERTEX_TYPES: [VertexType; 3] = [VertexType::Normal, VertexType::Tex2, VertexType::Col];

#[derive(Default)]
pub struct Dispatcher {
    buffers: Vec<AuxBuffer>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Allocates the auxiliary buffers.
    pub unsafe fn create(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        for &tp in VERTEX_TYPES.iter() {
            let vbo = visitor.create_buffer(&[], BufferHint::Stream)?;
            let vao = match visitor.create_vertex_array(vbo, &shader::vertex_layout(tp)) {
                Ok(v) => v,
                Err(err) => {
                    visitor.delete_buffer(vbo)?;
                    return Err(err);
                }
            };

            self.buffers.push(AuxBuffer {
                vbo,
                vao,
                capacity: 0,
            });
        }

        // Vertices with colors carry no normals.
        visitor.set_constant_attribute(ATTRIB_NORMAL, [0.0, 0.0, 1.0, 0.0])?;
        Ok(())
    }

    /// Releases the auxiliary buffers.
    pub unsafe fn destroy(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        for v in self.buffers.drain(..) {
            visitor.delete_vertex_array(v.vao)?;
            visitor.delete_buffer(v.vbo)?;
        }

        Ok(())
    }

    fn index(tp: VertexType) -> usize {
        match tp {
            VertexType::Normal => 0,
            VertexType::Tex2 => 1,
            VertexType::Col => 2,
        }
    }

    /// Draws transient vertices with the program in use.
    pub unsafe fn draw_primitive(
        &mut self,
        visitor: &mut dyn Visitor,
        primitive: PrimitiveType,
        vertices: Vertices,
        color: Color,
    ) -> Result<()> {
        if vertices.is_empty() {
            return Ok(());
        }

        let tp = vertices.vertex_type();
        let buffer = match self.buffers.get_mut(Self::index(tp)) {
            Some(v) => v,
            None => bail!("Auxiliary buffers are not allocated."),
        };

        let bytes = vertices.as_bytes();
        if bytes.len() > buffer.capacity {
            visitor.upload_buffer(buffer.vbo, bytes, BufferHint::Stream)?;
            buffer.capacity = bytes.len();
        } else {
            visitor.update_buffer(buffer.vbo, 0, bytes)?;
        }

        visitor.bind_vertex_array(buffer.vao)?;
        if !tp.has_color() {
            visitor.set_constant_attribute(ATTRIB_COLOR, color.rgba())?;
        }

        visitor.draw_arrays(primitive, 0, vertices.len() as u32)
    }

    /// Draws a static buffer with the program in use.
    pub unsafe fn draw_static_buffer(
        &mut self,
        visitor: &mut dyn Visitor,
        buffer: &StaticBuffer,
    ) -> Result<()> {
        if buffer.count == 0 {
            return Ok(());
        }

        visitor.bind_vertex_array(buffer.vao)?;
        if !buffer.vertex_type.has_color() {
            visitor.set_constant_attribute(ATTRIB_COLOR, Color::white().rgba())?;
        }

        visitor.draw_arrays(buffer.primitive, 0, buffer.count as u32)
    }
}
