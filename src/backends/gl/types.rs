use gl;
use gl::types::*;

use crate::device::{
    BlendFunc, CompFunc, CullMode, FillMode, PrimitiveType, TexImgFormat, TexWrapMode,
};

use super::super::{BufferHint, Capability};

impl From<BufferHint> for GLenum {
    fn from(hint: BufferHint) -> Self {
        match hint {
            BufferHint::Static => gl::STATIC_DRAW,
            BufferHint::Stream => gl::STREAM_DRAW,
        }
    }
}

impl From<CompFunc> for GLenum {
    fn from(cmp: CompFunc) -> Self {
        match cmp {
            CompFunc::Never => gl::NEVER,
            CompFunc::Less => gl::LESS,
            CompFunc::Equal => gl::EQUAL,
            CompFunc::NotEqual => gl::NOTEQUAL,
            CompFunc::LessOrEqual => gl::LEQUAL,
            CompFunc::Greater => gl::GREATER,
            CompFunc::GreaterOrEqual => gl::GEQUAL,
            CompFunc::Always => gl::ALWAYS,
        }
    }
}

impl From<BlendFunc> for GLenum {
    fn from(factor: BlendFunc) -> Self {
        match factor {
            BlendFunc::Zero => gl::ZERO,
            BlendFunc::One => gl::ONE,
            BlendFunc::SrcColor => gl::SRC_COLOR,
            BlendFunc::InvSrcColor => gl::ONE_MINUS_SRC_COLOR,
            BlendFunc::DstColor => gl::DST_COLOR,
            BlendFunc::InvDstColor => gl::ONE_MINUS_DST_COLOR,
            BlendFunc::SrcAlpha => gl::SRC_ALPHA,
            BlendFunc::InvSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
            BlendFunc::DstAlpha => gl::DST_ALPHA,
            BlendFunc::InvDstAlpha => gl::ONE_MINUS_DST_ALPHA,
            BlendFunc::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
        }
    }
}

impl From<PrimitiveType> for GLenum {
    fn from(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::Points => gl::POINTS,
            PrimitiveType::Lines => gl::LINES,
            PrimitiveType::LineStrip => gl::LINE_STRIP,
            PrimitiveType::LineLoop => gl::LINE_LOOP,
            PrimitiveType::Triangles => gl::TRIANGLES,
            PrimitiveType::TriangleStrip => gl::TRIANGLE_STRIP,
            PrimitiveType::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

impl From<CullMode> for GLenum {
    fn from(mode: CullMode) -> Self {
        match mode {
            CullMode::Cw => gl::CW,
            CullMode::Ccw => gl::CCW,
        }
    }
}

impl From<FillMode> for GLenum {
    fn from(mode: FillMode) -> Self {
        match mode {
            FillMode::Point => gl::POINT,
            FillMode::Lines => gl::LINE,
            FillMode::Polygon => gl::FILL,
        }
    }
}

impl From<TexWrapMode> for GLenum {
    fn from(wrap: TexWrapMode) -> Self {
        match wrap {
            TexWrapMode::Clamp => gl::CLAMP_TO_EDGE,
            TexWrapMode::ClampToBorder => gl::CLAMP_TO_BORDER,
            TexWrapMode::Repeat => gl::REPEAT,
        }
    }
}

impl From<Capability> for GLenum {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Blend => gl::BLEND,
            Capability::DepthTest => gl::DEPTH_TEST,
            Capability::CullFace => gl::CULL_FACE,
            Capability::PolygonOffsetFill => gl::POLYGON_OFFSET_FILL,
        }
    }
}

/// Returns the internal format, format and pixel type of an image format.
pub fn texture_format(format: TexImgFormat) -> (GLenum, GLenum, GLenum) {
    match format {
        TexImgFormat::RGB => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
        TexImgFormat::BGR => (gl::RGB8, gl::BGR, gl::UNSIGNED_BYTE),
        TexImgFormat::BGRA => (gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
        TexImgFormat::RGBA | TexImgFormat::Auto => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
    }
}

/// Returns the sized internal format of a depth attachment of `depth` bits.
pub fn depth_format(depth: u32) -> GLenum {
    match depth {
        0..=16 => gl::DEPTH_COMPONENT16,
        17..=24 => gl::DEPTH_COMPONENT24,
        _ => gl::DEPTH_COMPONENT32,
    }
}
