use std::ffi;

use gl;
use gl::types::*;

use crate::errors::*;

use super::super::capabilities::{Capabilities, Version};

/// Obtains the OpenGL version of the current context using the loaded functions.
///
/// # Unsafe
///
/// You must ensure that the functions belong to the current context, otherwise you will get
/// an undefined behavior.
pub unsafe fn parse_version() -> Result<Version> {
    let desc = parse_str(gl::VERSION)?;

    let (es, desc) = if desc.starts_with("OpenGL ES ") {
        (true, &desc[10..])
    } else if desc.starts_with("OpenGL ES-") {
        (true, &desc[13..])
    } else {
        (false, &desc[..])
    };

    let desc = desc
        .split(' ')
        .next()
        .ok_or_else(|| format_err!("[GL] String is unformaled."))?;

    let mut iter = desc.split(move |c: char| c == '.');
    let major = iter
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format_err!("[GL] Failed to parse GL major version."))?;
    let minor = iter
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format_err!("[GL] Failed to parse GL minor version."))?;

    if es {
        Ok(Version::ES(major, minor))
    } else {
        Ok(Version::GL(major, minor))
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions.
        #[derive(Debug, Clone, Copy)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Returns the list of extensions supported by the context.
            ///
            /// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
            pub unsafe fn parse(version: Version) -> Result<Extensions> {
                let strings: Vec<String> = if version >= Version::GL(3, 0) || version >= Version::ES(3, 0) {
                    let mut num_extensions = 0;
                    gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);
                    (0 .. num_extensions).filter_map(|i| {
                        let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                        if ext.is_null() {
                            None
                        } else {
                            Some(ffi::CStr::from_ptr(ext as *const _).to_string_lossy().into_owned())
                        }
                    }).collect()
                } else {
                    parse_str(gl::EXTENSIONS)?.split(' ').map(|e| e.to_owned()).collect()
                };

                let mut extensions = Extensions {
                    $(
                        $field: false,
                    )+
                };

                for extension in strings {
                    match &extension[..] {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                Ok(extensions)
            }
        }
    }
}

extensions! {
    "GL_ARB_framebuffer_object" => gl_arb_framebuffer_object,
    "GL_EXT_framebuffer_object" => gl_ext_framebuffer_object,
    "GL_ARB_depth_texture" => gl_arb_depth_texture,
    "GL_ARB_shadow" => gl_arb_shadow,
    "GL_EXT_texture_filter_anisotropic" => gl_ext_texture_filter_anisotropic,
    "GL_ARB_texture_filter_anisotropic" => gl_arb_texture_filter_anisotropic,
}

/// `GL_MAX_TEXTURE_MAX_ANISOTROPY_EXT`
pub const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;

/// `GL_TEXTURE_MAX_ANISOTROPY_EXT`
pub const TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FE;

/// Probes the capabilities of the current context.
pub unsafe fn probe() -> Result<Capabilities> {
    let version = parse_version()?;
    let extensions = Extensions::parse(version)?;

    let anisotropy_supported = version >= Version::GL(4, 6)
        || extensions.gl_ext_texture_filter_anisotropic
        || extensions.gl_arb_texture_filter_anisotropic;

    let max_anisotropy = if anisotropy_supported {
        let mut val: GLfloat = 1.0;
        gl::GetFloatv(MAX_TEXTURE_MAX_ANISOTROPY, &mut val);
        val.max(1.0) as u32
    } else {
        1
    };

    let framebuffer_supported = version >= Version::GL(3, 0)
        || extensions.gl_arb_framebuffer_object
        || extensions.gl_ext_framebuffer_object;

    let max_samples = if framebuffer_supported {
        get_integer(gl::MAX_SAMPLES, 1)
    } else {
        1
    };

    let shadow_mapping_supported = framebuffer_supported
        && (version >= Version::GL(3, 0)
            || (extensions.gl_arb_depth_texture && extensions.gl_arb_shadow));

    let caps = Capabilities {
        version,
        anisotropy_supported,
        max_anisotropy,
        max_samples,
        shadow_mapping_supported,
        max_texture_size: get_integer(gl::MAX_TEXTURE_SIZE, 0),
        framebuffer_supported,
        max_texture_units: get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 0),
    };

    info!(
        "[GL] {} ({}), {}.",
        parse_str(gl::RENDERER).unwrap_or_default(),
        parse_str(gl::VENDOR).unwrap_or_default(),
        parse_str(gl::VERSION).unwrap_or_default()
    );

    // Drains errors raised by queries the driver does not know.
    while gl::GetError() != gl::NO_ERROR {}

    Ok(caps)
}

#[inline]
unsafe fn get_integer(id: GLenum, default: GLint) -> u32 {
    let mut val = default;
    gl::GetIntegerv(id, &mut val);
    val.max(0) as u32
}

#[inline]
unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        bail!("[GL] String of {} is null.", id);
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| format_err!("[GL] String of {} is unformaled.", id))
}
