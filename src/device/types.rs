//! Plain value types shared by every `Device` implementation.

use crate::math::prelude::*;

/// The matrix slots a device tracks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransformType {
    World,
    View,
    Projection,
    Shadow,
}

/// Primitive topologies accepted by the draw calls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Default for PrimitiveType {
    fn default() -> Self {
        PrimitiveType::Triangles
    }
}

/// Toggleable pieces of rendering state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderState {
    Blending,
    Fog,
    DepthTest,
    DepthWrite,
    Lighting,
    Culling,
    AlphaTest,
    DepthBias,
    ShadowMapping,
}

/// Comparison functions used by depth and alpha tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompFunc {
    Never,
    Less,
    Equal,
    NotEqual,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Always,
}

impl CompFunc {
    /// Code understood by the emulated alpha test in the shader program.
    pub fn code(self) -> i32 {
        match self {
            CompFunc::Never => 0,
            CompFunc::Less => 1,
            CompFunc::Equal => 2,
            CompFunc::NotEqual => 3,
            CompFunc::LessOrEqual => 4,
            CompFunc::Greater => 5,
            CompFunc::GreaterOrEqual => 6,
            CompFunc::Always => 7,
        }
    }
}

/// Source and destination factors of color blending.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFunc {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    DstColor,
    InvDstColor,
    SrcAlpha,
    InvSrcAlpha,
    DstAlpha,
    InvDstAlpha,
    SrcAlphaSaturate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FogMode {
    Linear,
    Exp,
    Exp2,
}

impl FogMode {
    pub fn code(self) -> i32 {
        match self {
            FogMode::Linear => 0,
            FogMode::Exp => 1,
            FogMode::Exp2 => 2,
        }
    }
}

/// Winding order of front-facing polygons. Back faces are culled when
/// `RenderState::Culling` is enabled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Clockwise polygons are front-facing.
    Cw,
    /// Counter-clockwise polygons are front-facing.
    Ccw,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShadeModel {
    Flat,
    Smooth,
}

/// Polygon rasterization mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
    Point,
    Lines,
    Polygon,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexWrapMode {
    Clamp,
    ClampToBorder,
    Repeat,
}

/// Texture minification and magnification filtering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexFilter {
    Nearest,
    Bilinear,
    Trilinear,
}

impl TexFilter {
    /// Maps the persisted integer code back into a filter.
    pub fn from_code(v: i64) -> Option<TexFilter> {
        match v {
            0 => Some(TexFilter::Nearest),
            1 => Some(TexFilter::Bilinear),
            2 => Some(TexFilter::Trilinear),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            TexFilter::Nearest => 0,
            TexFilter::Bilinear => 1,
            TexFilter::Trilinear => 2,
        }
    }
}

/// Pixel layout of the source image of a texture. `Auto` infers RGB or RGBA
/// from the size of the pixel data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexImgFormat {
    Auto,
    RGB,
    BGR,
    RGBA,
    BGRA,
}

impl TexImgFormat {
    /// Returns the bytes per pixel, or `None` for `Auto`.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            TexImgFormat::Auto => None,
            TexImgFormat::RGB | TexImgFormat::BGR => Some(3),
            TexImgFormat::RGBA | TexImgFormat::BGRA => Some(4),
        }
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        match self {
            TexImgFormat::RGBA | TexImgFormat::BGRA => true,
            _ => false,
        }
    }
}

/// How a texture stage combines its inputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexMixOperation {
    Default,
    Replace,
    Modulate,
    Add,
    Subtract,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexMixArgument {
    Texture,
    ComputedColor,
    Src,
    Factor,
}

/// Sampling and combining parameters of one texture stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureStageParams {
    pub color_operation: TexMixOperation,
    pub color_arg1: TexMixArgument,
    pub color_arg2: TexMixArgument,
    pub alpha_operation: TexMixOperation,
    pub alpha_arg1: TexMixArgument,
    pub alpha_arg2: TexMixArgument,
    pub wrap_s: TexWrapMode,
    pub wrap_t: TexWrapMode,
    pub factor: Color,
}

impl Default for TextureStageParams {
    fn default() -> Self {
        TextureStageParams {
            color_operation: TexMixOperation::Default,
            color_arg1: TexMixArgument::ComputedColor,
            color_arg2: TexMixArgument::Texture,
            alpha_operation: TexMixOperation::Default,
            alpha_arg1: TexMixArgument::ComputedColor,
            alpha_arg2: TexMixArgument::Texture,
            wrap_s: TexWrapMode::Repeat,
            wrap_t: TexWrapMode::Repeat,
            factor: Color::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexGenMode {
    None,
    ObjectLinear,
    EyeLinear,
    SphereMap,
    NormalMap,
    ReflectionMap,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexGenCoord {
    pub mode: TexGenMode,
    pub plane: [f32; 4],
}

impl Default for TexGenCoord {
    fn default() -> Self {
        TexGenCoord {
            mode: TexGenMode::None,
            plane: [0.0; 4],
        }
    }
}

/// Texture coordinate generation of the S, T, R and Q coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TextureGenerationParams {
    pub coords: [TexGenCoord; 4],
}

/// Parameters of texture creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureCreateParams {
    pub format: TexImgFormat,
    pub filter: TexFilter,
    pub mipmap: bool,
    pub pad_to_nearest_power_of_two: bool,
}

impl Default for TextureCreateParams {
    fn default() -> Self {
        TextureCreateParams {
            format: TexImgFormat::Auto,
            filter: TexFilter::Nearest,
            mipmap: false,
            pad_to_nearest_power_of_two: false,
        }
    }
}
