use crate::backends::FramebufferObjects;

/// Name of the framebuffer describing the window surface.
pub const DEFAULT_FRAMEBUFFER: &str = "default";

/// Storage of one framebuffer attachment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentType {
    None,
    /// A texture which could be sampled afterwards.
    Texture,
    Renderbuffer,
}

/// Selects an attachment of a framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramebufferAttachment {
    Color,
    Depth,
}

/// Parameters of framebuffer creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferParams {
    pub width: u32,
    pub height: u32,
    /// Bits of the depth attachment, one of 16, 24 or 32.
    pub depth: u32,
    /// Multisample count, 1 disables multisampling.
    pub samples: u32,
    pub color_attachment: AttachmentType,
    pub depth_attachment: AttachmentType,
}

impl Default for FramebufferParams {
    fn default() -> Self {
        FramebufferParams {
            width: 1024,
            height: 1024,
            depth: 16,
            samples: 1,
            color_attachment: AttachmentType::Renderbuffer,
            depth_attachment: AttachmentType::Renderbuffer,
        }
    }
}

/// A named render target registered in a device.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    params: FramebufferParams,
    default: bool,
    pub(crate) objects: FramebufferObjects,
}

impl Framebuffer {
    pub(crate) fn new(params: FramebufferParams, objects: FramebufferObjects) -> Self {
        Framebuffer {
            params,
            default: false,
            objects,
        }
    }

    /// Describes the window surface of `width`x`height`.
    pub(crate) fn window(width: u32, height: u32, depth: u32, samples: u32) -> Self {
        let params = FramebufferParams {
            width,
            height,
            depth,
            samples,
            color_attachment: AttachmentType::Renderbuffer,
            depth_attachment: AttachmentType::Renderbuffer,
        };

        Framebuffer {
            params,
            default: true,
            objects: FramebufferObjects::default(),
        }
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.params.width = width;
        self.params.height = height;
    }

    #[inline]
    pub fn params(&self) -> &FramebufferParams {
        &self.params
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.default
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.params.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.params.height
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.params.depth
    }

    #[inline]
    pub fn samples(&self) -> u32 {
        self.params.samples
    }

    #[inline]
    pub fn has_color(&self) -> bool {
        self.params.color_attachment != AttachmentType::None
    }

    #[inline]
    pub fn has_depth(&self) -> bool {
        self.params.depth_attachment != AttachmentType::None
    }
}
