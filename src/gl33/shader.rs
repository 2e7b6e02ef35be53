//! The GLSL program emulating the fixed-function pipeline, and the names
//! and vertex attribute locations it is driven through.

use crate::backends::VertexLayout;
use crate::device::{VertexType, MAX_LIGHT_COUNT};

pub const ATTRIB_POSITION: u32 = 0;
pub const ATTRIB_NORMAL: u32 = 1;
pub const ATTRIB_COLOR: u32 = 2;
pub const ATTRIB_TEXCOORD0: u32 = 3;
pub const ATTRIB_TEXCOORD1: u32 = 4;

/// Texture units of the primary, secondary and shadow stages.
pub const TEXTURE_UNITS: [i32; 3] = [0, 1, 2];

/// Returns the layout vertices of `tp` are sourced with.
pub fn vertex_layout(tp: VertexType) -> VertexLayout {
    let layout = VertexLayout::new(tp.stride()).with(ATTRIB_POSITION, 3, 0);
    match tp {
        VertexType::Normal => layout
            .with(ATTRIB_NORMAL, 3, 12)
            .with(ATTRIB_TEXCOORD0, 2, 24),
        VertexType::Tex2 => layout
            .with(ATTRIB_NORMAL, 3, 12)
            .with(ATTRIB_TEXCOORD0, 2, 24)
            .with(ATTRIB_TEXCOORD1, 2, 32),
        VertexType::Col => layout.with(ATTRIB_COLOR, 4, 12),
    }
}

/// Uniforms of the program which are not per light.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Uniform {
    ProjectionMatrix,
    ViewMatrix,
    ModelMatrix,
    ShadowMatrix,
    NormalMatrix,
    PrimaryTexture,
    SecondaryTexture,
    ShadowTexture,
    PrimaryTextureEnabled,
    SecondaryTextureEnabled,
    ShadowTextureEnabled,
    FogEnabled,
    FogMode,
    FogRange,
    FogDensity,
    FogColor,
    AlphaTestEnabled,
    AlphaTestFunc,
    AlphaReference,
    ShadowColor,
    SmoothShading,
    LightingEnabled,
    GlobalAmbient,
    AmbientColor,
    DiffuseColor,
    SpecularColor,
}

impl Uniform {
    pub const ALL: [Uniform; 26] = [
        Uniform::ProjectionMatrix,
        Uniform::ViewMatrix,
        Uniform::ModelMatrix,
        Uniform::ShadowMatrix,
        Uniform::NormalMatrix,
        Uniform::PrimaryTexture,
        Uniform::SecondaryTexture,
        Uniform::ShadowTexture,
        Uniform::PrimaryTextureEnabled,
        Uniform::SecondaryTextureEnabled,
        Uniform::ShadowTextureEnabled,
        Uniform::FogEnabled,
        Uniform::FogMode,
        Uniform::FogRange,
        Uniform::FogDensity,
        Uniform::FogColor,
        Uniform::AlphaTestEnabled,
        Uniform::AlphaTestFunc,
        Uniform::AlphaReference,
        Uniform::ShadowColor,
        Uniform::SmoothShading,
        Uniform::LightingEnabled,
        Uniform::GlobalAmbient,
        Uniform::AmbientColor,
        Uniform::DiffuseColor,
        Uniform::SpecularColor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Uniform::ProjectionMatrix => "uni_ProjectionMatrix",
            Uniform::ViewMatrix => "uni_ViewMatrix",
            Uniform::ModelMatrix => "uni_ModelMatrix",
            Uniform::ShadowMatrix => "uni_ShadowMatrix",
            Uniform::NormalMatrix => "uni_NormalMatrix",
            Uniform::PrimaryTexture => "uni_PrimaryTexture",
            Uniform::SecondaryTexture => "uni_SecondaryTexture",
            Uniform::ShadowTexture => "uni_ShadowTexture",
            Uniform::PrimaryTextureEnabled => "uni_PrimaryTextureEnabled",
            Uniform::SecondaryTextureEnabled => "uni_SecondaryTextureEnabled",
            Uniform::ShadowTextureEnabled => "uni_ShadowTextureEnabled",
            Uniform::FogEnabled => "uni_FogEnabled",
            Uniform::FogMode => "uni_FogMode",
            Uniform::FogRange => "uni_FogRange",
            Uniform::FogDensity => "uni_FogDensity",
            Uniform::FogColor => "uni_FogColor",
            Uniform::AlphaTestEnabled => "uni_AlphaTestEnabled",
            Uniform::AlphaTestFunc => "uni_AlphaTestFunc",
            Uniform::AlphaReference => "uni_AlphaReference",
            Uniform::ShadowColor => "uni_ShadowColor",
            Uniform::SmoothShading => "uni_SmoothShading",
            Uniform::LightingEnabled => "uni_LightingEnabled",
            Uniform::GlobalAmbient => "uni_GlobalAmbient",
            Uniform::AmbientColor => "uni_AmbientColor",
            Uniform::DiffuseColor => "uni_DiffuseColor",
            Uniform::SpecularColor => "uni_SpecularColor",
        }
    }

    /// The program is unusable without these. Drivers are free to strip
    /// any other uniform that does not contribute to the output.
    pub fn is_required(self) -> bool {
        match self {
            Uniform::ProjectionMatrix | Uniform::ViewMatrix | Uniform::ModelMatrix => true,
            _ => false,
        }
    }

    /// Uniform of the sampler of a texture stage.
    pub fn sampler(stage: usize) -> Option<Uniform> {
        match stage {
            0 => Some(Uniform::PrimaryTexture),
            1 => Some(Uniform::SecondaryTexture),
            2 => Some(Uniform::ShadowTexture),
            _ => None,
        }
    }

    /// Uniform of the enabled flag of a texture stage.
    pub fn stage_enabled(stage: usize) -> Option<Uniform> {
        match stage {
            0 => Some(Uniform::PrimaryTextureEnabled),
            1 => Some(Uniform::SecondaryTextureEnabled),
            2 => Some(Uniform::ShadowTextureEnabled),
            _ => None,
        }
    }
}

/// Members of one element of the light array.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LightUniform {
    Enabled,
    Type,
    Position,
    Ambient,
    Diffuse,
    Specular,
    Attenuation,
    SpotDirection,
    SpotParams,
}

impl LightUniform {
    pub const ALL: [LightUniform; 9] = [
        LightUniform::Enabled,
        LightUniform::Type,
        LightUniform::Position,
        LightUniform::Ambient,
        LightUniform::Diffuse,
        LightUniform::Specular,
        LightUniform::Attenuation,
        LightUniform::SpotDirection,
        LightUniform::SpotParams,
    ];

    pub fn field(self) -> &'static str {
        match self {
            LightUniform::Enabled => "Enabled",
            LightUniform::Type => "Type",
            LightUniform::Position => "Position",
            LightUniform::Ambient => "Ambient",
            LightUniform::Diffuse => "Diffuse",
            LightUniform::Specular => "Specular",
            LightUniform::Attenuation => "Attenuation",
            LightUniform::SpotDirection => "SpotDirection",
            LightUniform::SpotParams => "SpotParams",
        }
    }

    pub fn name(self, index: usize) -> String {
        format!("uni_Light[{}].{}", index, self.field())
    }
}

/// GLSL sources of a program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSources {
    pub vs: String,
    pub fs: String,
}

impl Default for ProgramSources {
    fn default() -> Self {
        let count = MAX_LIGHT_COUNT.to_string();
        ProgramSources {
            vs: VERTEX_SHADER.to_owned(),
            fs: FRAGMENT_SHADER.replace("MAX_LIGHT_COUNT", &count),
        }
    }
}

const VERTEX_SHADER: &str = r#"
#version 330 core

uniform mat4 uni_ProjectionMatrix;
uniform mat4 uni_ViewMatrix;
uniform mat4 uni_ModelMatrix;
uniform mat4 uni_ShadowMatrix;
uniform mat3 uni_NormalMatrix;

layout(location = 0) in vec3 in_VertexCoord;
layout(location = 1) in vec3 in_Normal;
layout(location = 2) in vec4 in_Color;
layout(location = 3) in vec2 in_TexCoord0;
layout(location = 4) in vec2 in_TexCoord1;

out VertexData
{
    vec4 Color;
    vec2 TexCoord0;
    vec2 TexCoord1;
    vec3 Normal;
    vec4 ShadowCoord;
    vec3 Position;
    float Distance;
} data;

void main()
{
    vec4 position = uni_ModelMatrix * vec4(in_VertexCoord, 1.0);
    vec4 eyeSpace = uni_ViewMatrix * position;

    gl_Position = uni_ProjectionMatrix * eyeSpace;

    data.Color = in_Color;
    data.TexCoord0 = in_TexCoord0;
    data.TexCoord1 = in_TexCoord1;
    data.Normal = normalize(uni_NormalMatrix * in_Normal);
    data.ShadowCoord = uni_ShadowMatrix * position;
    data.Position = eyeSpace.xyz;
    data.Distance = abs(eyeSpace.z);
}
"#;

const FRAGMENT_SHADER: &str = r#"
#version 330 core

struct LightParams
{
    bool Enabled;
    int Type;
    vec4 Position;
    vec4 Ambient;
    vec4 Diffuse;
    vec4 Specular;
    vec3 Attenuation;
    vec3 SpotDirection;
    vec2 SpotParams;
};

uniform mat4 uni_ViewMatrix;

uniform sampler2D uni_PrimaryTexture;
uniform sampler2D uni_SecondaryTexture;
uniform sampler2DShadow uni_ShadowTexture;

uniform bool uni_PrimaryTextureEnabled;
uniform bool uni_SecondaryTextureEnabled;
uniform bool uni_ShadowTextureEnabled;

uniform bool uni_FogEnabled;
uniform int uni_FogMode;
uniform vec2 uni_FogRange;
uniform float uni_FogDensity;
uniform vec4 uni_FogColor;

uniform bool uni_AlphaTestEnabled;
uniform int uni_AlphaTestFunc;
uniform float uni_AlphaReference;

uniform float uni_ShadowColor;
uniform bool uni_SmoothShading;
uniform bool uni_LightingEnabled;

uniform vec4 uni_GlobalAmbient;
uniform vec4 uni_AmbientColor;
uniform vec4 uni_DiffuseColor;
uniform vec4 uni_SpecularColor;

uniform LightParams uni_Light[MAX_LIGHT_COUNT];

in VertexData
{
    vec4 Color;
    vec2 TexCoord0;
    vec2 TexCoord1;
    vec3 Normal;
    vec4 ShadowCoord;
    vec3 Position;
    float Distance;
} data;

out vec4 out_FragColor;

bool alphaTest(float alpha)
{
    switch (uni_AlphaTestFunc)
    {
        case 0: return false;
        case 1: return alpha < uni_AlphaReference;
        case 2: return alpha == uni_AlphaReference;
        case 3: return alpha != uni_AlphaReference;
        case 4: return alpha <= uni_AlphaReference;
        case 5: return alpha > uni_AlphaReference;
        case 6: return alpha >= uni_AlphaReference;
        default: return true;
    }
}

float fogFactor(float distance)
{
    float factor;
    if (uni_FogMode == 0)
        factor = (uni_FogRange.y - distance) / (uni_FogRange.y - uni_FogRange.x);
    else if (uni_FogMode == 1)
        factor = exp(-uni_FogDensity * distance);
    else
        factor = exp(-pow(uni_FogDensity * distance, 2.0));

    return clamp(factor, 0.0, 1.0);
}

vec4 lighting(vec3 normal, float shadow)
{
    vec4 ambient = uni_GlobalAmbient * uni_AmbientColor;
    vec4 diffuse = vec4(0.0);
    vec4 specular = vec4(0.0);

    vec3 view = normalize(-data.Position);

    for (int i = 0; i < MAX_LIGHT_COUNT; i++)
    {
        if (!uni_Light[i].Enabled)
            continue;

        vec4 position = uni_ViewMatrix * uni_Light[i].Position;
        vec3 direction;
        float attenuation = 1.0;

        if (position.w == 0.0)
        {
            direction = normalize(position.xyz);
        }
        else
        {
            vec3 delta = position.xyz - data.Position;
            float distance = length(delta);
            direction = delta / distance;

            vec3 factors = uni_Light[i].Attenuation;
            attenuation = 1.0 / max(factors.x + factors.y * distance + factors.z * distance * distance, 0.0001);
        }

        if (uni_Light[i].Type == 1)
        {
            vec3 axis = normalize((uni_ViewMatrix * vec4(uni_Light[i].SpotDirection, 0.0)).xyz);
            float cosine = dot(-direction, axis);
            if (cosine < cos(uni_Light[i].SpotParams.x))
                attenuation = 0.0;
            else
                attenuation *= pow(cosine, uni_Light[i].SpotParams.y);
        }

        float lambert = max(dot(normal, direction), 0.0);
        float highlight = lambert > 0.0 ? pow(max(dot(reflect(-direction, normal), view), 0.0), 10.0) : 0.0;

        ambient += attenuation * uni_Light[i].Ambient * uni_AmbientColor;
        diffuse += attenuation * lambert * uni_Light[i].Diffuse * uni_DiffuseColor;
        specular += attenuation * highlight * uni_Light[i].Specular * uni_SpecularColor;
    }

    vec4 color = ambient + shadow * (diffuse + specular);
    return vec4(clamp(color.rgb, 0.0, 1.0), uni_DiffuseColor.a);
}

void main()
{
    vec4 color = data.Color;

    float shadow = 1.0;
    if (uni_ShadowTextureEnabled)
        shadow = mix(uni_ShadowColor, 1.0, textureProj(uni_ShadowTexture, data.ShadowCoord));

    if (uni_LightingEnabled)
    {
        vec3 normal = uni_SmoothShading
            ? normalize(data.Normal)
            : normalize(cross(dFdx(data.Position), dFdy(data.Position)));

        if (!gl_FrontFacing)
            normal = -normal;

        color *= lighting(normal, shadow);
    }
    else
    {
        color.rgb *= shadow;
    }

    if (uni_PrimaryTextureEnabled)
        color *= texture(uni_PrimaryTexture, data.TexCoord0);

    if (uni_SecondaryTextureEnabled)
        color *= texture(uni_SecondaryTexture, data.TexCoord1);

    if (uni_AlphaTestEnabled && !alphaTest(color.a))
        discard;

    if (uni_FogEnabled)
        color.rgb = mix(uni_FogColor.rgb, color.rgb, fogFactor(data.Distance));

    out_FragColor = color;
}
"#;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layouts() {
        let layout = vertex_layout(VertexType::Normal);
        assert_eq!(layout.stride, 32);
        assert!(layout.contains(ATTRIB_NORMAL));
        assert!(!layout.contains(ATTRIB_COLOR));

        let layout = vertex_layout(VertexType::Tex2);
        assert_eq!(layout.stride, 40);
        assert!(layout.contains(ATTRIB_TEXCOORD1));

        let layout = vertex_layout(VertexType::Col);
        assert_eq!(layout.stride, 28);
        assert!(layout.contains(ATTRIB_COLOR));
        assert!(!layout.contains(ATTRIB_NORMAL));
    }

    #[test]
    fn sources() {
        let sources = ProgramSources::default();
        assert!(!sources.fs.contains("MAX_LIGHT_COUNT"));

        for v in Uniform::ALL.iter() {
            assert!(
                sources.vs.contains(v.name()) || sources.fs.contains(v.name()),
                "{} is not declared",
                v.name()
            );
        }

        for v in LightUniform::ALL.iter() {
            assert!(sources.fs.contains(v.field()));
        }

        assert_eq!(LightUniform::Position.name(3), "uni_Light[3].Position");
    }
}
