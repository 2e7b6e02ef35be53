//! Vertex layouts accepted by immediate and buffered draws.

use std::mem;
use std::slice;

use crate::math::prelude::*;

/// Position, normal and one texture coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub coord: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coord: Vector2<f32>,
}

impl Vertex {
    pub fn new(coord: Vector3<f32>, normal: Vector3<f32>, tex_coord: Vector2<f32>) -> Self {
        Vertex {
            coord,
            normal,
            tex_coord,
        }
    }
}

/// Position, normal and two texture coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct VertexTex2 {
    pub coord: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coord: Vector2<f32>,
    pub tex_coord2: Vector2<f32>,
}

impl VertexTex2 {
    pub fn new(
        coord: Vector3<f32>,
        normal: Vector3<f32>,
        tex_coord: Vector2<f32>,
        tex_coord2: Vector2<f32>,
    ) -> Self {
        VertexTex2 {
            coord,
            normal,
            tex_coord,
            tex_coord2,
        }
    }
}

impl From<Vertex> for VertexTex2 {
    fn from(v: Vertex) -> Self {
        VertexTex2::new(v.coord, v.normal, v.tex_coord, Vector2::new(0.0, 0.0))
    }
}

/// Position and a per-vertex color.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct VertexCol {
    pub coord: Vector3<f32>,
    pub color: Color,
}

impl VertexCol {
    pub fn new(coord: Vector3<f32>, color: Color) -> Self {
        VertexCol { coord, color }
    }
}

/// Tag of the vertex layout a buffer was created with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexType {
    Normal,
    Tex2,
    Col,
}

impl VertexType {
    /// Size of one vertex in bytes.
    pub fn stride(self) -> usize {
        match self {
            VertexType::Normal => mem::size_of::<Vertex>(),
            VertexType::Tex2 => mem::size_of::<VertexTex2>(),
            VertexType::Col => mem::size_of::<VertexCol>(),
        }
    }

    /// Whether the layout carries its own color, otherwise a flat color is
    /// supplied with the draw.
    #[inline]
    pub fn has_color(self) -> bool {
        self == VertexType::Col
    }
}

/// A borrowed slice of vertices in one of the supported layouts.
#[derive(Debug, Copy, Clone)]
pub enum Vertices<'a> {
    Normal(&'a [Vertex]),
    Tex2(&'a [VertexTex2]),
    Col(&'a [VertexCol]),
}

impl<'a> Vertices<'a> {
    #[inline]
    pub fn vertex_type(&self) -> VertexType {
        match *self {
            Vertices::Normal(_) => VertexType::Normal,
            Vertices::Tex2(_) => VertexType::Tex2,
            Vertices::Col(_) => VertexType::Col,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            Vertices::Normal(v) => v.len(),
            Vertices::Tex2(v) => v.len(),
            Vertices::Col(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Views the vertices as raw bytes in the layout uploaded to the GPU.
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Vertices::Normal(v) => as_bytes(v),
            Vertices::Tex2(v) => as_bytes(v),
            Vertices::Col(v) => as_bytes(v),
        }
    }
}

fn as_bytes<T: Copy>(values: &[T]) -> &[u8] {
    let len = values.len() * mem::size_of::<T>();
    unsafe { slice::from_raw_parts(values.as_ptr() as *const u8, len) }
}

macro_rules! impl_vertices_from {
    ($vertex:ident, $variant:ident) => {
        impl<'a> From<&'a [$vertex]> for Vertices<'a> {
            fn from(v: &'a [$vertex]) -> Self {
                Vertices::$variant(v)
            }
        }

        impl<'a> From<&'a Vec<$vertex>> for Vertices<'a> {
            fn from(v: &'a Vec<$vertex>) -> Self {
                Vertices::$variant(&v[..])
            }
        }
    };
}

impl_vertices_from!(Vertex, Normal);
impl_vertices_from!(VertexTex2, Tex2);
impl_vertices_from!(VertexCol, Col);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strides() {
        assert_eq!(VertexType::Normal.stride(), 32);
        assert_eq!(VertexType::Tex2.stride(), 40);
        assert_eq!(VertexType::Col.stride(), 28);
    }

    #[test]
    fn bytes() {
        let verts = [
            VertexCol::new(Vector3::new(1.0, 2.0, 3.0), Color::red()),
            VertexCol::new(Vector3::new(4.0, 5.0, 6.0), Color::blue()),
        ];

        let v: Vertices = (&verts[..]).into();
        assert_eq!(v.vertex_type(), VertexType::Col);
        assert_eq!(v.len(), 2);

        let bytes = v.as_bytes();
        assert_eq!(bytes.len(), 56);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes()[..]);
        assert_eq!(&bytes[28..32], &4.0f32.to_ne_bytes()[..]);
        assert_eq!(&bytes[12..16], &1.0f32.to_ne_bytes()[..]);
    }
}
