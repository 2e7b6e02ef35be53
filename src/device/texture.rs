use crate::errors::*;
use crate::math::prelude::*;

use super::types::TexImgFormat;

impl_handle!(TextureHandle);

/// A texture owned by the device. The GPU object behind `handle` stays
/// private to the device that created it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    /// Allocated dimensions, after optional padding.
    pub size: Vector2<u32>,
    /// Dimensions of the source image.
    pub original_size: Vector2<u32>,
    pub alpha: bool,
}

impl Texture {
    /// Returns true if this texture was issued by a device.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }
}

/// A borrowed view of tightly packed pixels, rows bottom to top.
#[derive(Debug, Copy, Clone)]
pub struct ImageData<'a> {
    pub size: Vector2<u32>,
    pub format: TexImgFormat,
    pub bytes: &'a [u8],
}

impl<'a> ImageData<'a> {
    pub fn new(size: Vector2<u32>, format: TexImgFormat, bytes: &'a [u8]) -> Self {
        ImageData {
            size,
            format,
            bytes,
        }
    }

    /// Resolves the concrete pixel format, preferring `hint` over the format
    /// stored with the data, and checks it against the amount of bytes.
    pub fn resolve_format(&self, hint: TexImgFormat) -> Result<TexImgFormat> {
        let pixels = (self.size.x as usize) * (self.size.y as usize);
        let format = match (hint, self.format) {
            (TexImgFormat::Auto, TexImgFormat::Auto) => match pixels {
                0 => TexImgFormat::RGBA,
                n if self.bytes.len() == n * 3 => TexImgFormat::RGB,
                _ => TexImgFormat::RGBA,
            },
            (TexImgFormat::Auto, v) => v,
            (v, _) => v,
        };

        let expected = pixels * format.bytes_per_pixel().unwrap_or(4);
        if expected != self.bytes.len() {
            return Err(DeviceError::ImageDataMismatch(self.bytes.len(), expected).into());
        }

        Ok(format)
    }
}

/// Owned pixels of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vector2<u32>,
    pub format: TexImgFormat,
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn new(size: Vector2<u32>, format: TexImgFormat, bytes: Vec<u8>) -> Self {
        Image {
            size,
            format,
            bytes,
        }
    }

    /// Creates an image filled with `color`.
    pub fn filled(size: Vector2<u32>, color: Color) -> Self {
        let pixel: [u8; 4] = color.into();
        let len = (size.x as usize) * (size.y as usize);
        let mut bytes = Vec::with_capacity(len * 4);
        for _ in 0..len {
            bytes.extend_from_slice(&pixel);
        }

        Image::new(size, TexImgFormat::RGBA, bytes)
    }

    #[inline]
    pub fn as_data(&self) -> ImageData {
        ImageData::new(self.size, self.format, &self.bytes)
    }
}

/// Returns the dimensions rounded up to the nearest powers of two.
pub fn power_of_two_size(size: Vector2<u32>) -> Vector2<u32> {
    Vector2::new(
        size.x.max(1).next_power_of_two(),
        size.y.max(1).next_power_of_two(),
    )
}

/// Copies `bytes` into the lower-left corner of a zeroed image of `size`.
pub fn pad_pixels(
    bytes: &[u8],
    from: Vector2<u32>,
    size: Vector2<u32>,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let src_row = from.x as usize * bytes_per_pixel;
    let dst_row = size.x as usize * bytes_per_pixel;
    let mut padded = vec![0; dst_row * size.y as usize];

    for (y, row) in bytes.chunks(src_row.max(1)).take(from.y as usize).enumerate() {
        let begin = y * dst_row;
        padded[begin..begin + row.len()].copy_from_slice(row);
    }

    padded
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolve_format() {
        let rgb = vec![0u8; 2 * 2 * 3];
        let data = ImageData::new(Vector2::new(2, 2), TexImgFormat::Auto, &rgb);
        assert_eq!(data.resolve_format(TexImgFormat::Auto).unwrap(), TexImgFormat::RGB);
        assert_eq!(data.resolve_format(TexImgFormat::BGR).unwrap(), TexImgFormat::BGR);
        assert!(data.resolve_format(TexImgFormat::RGBA).is_err());

        let image = Image::filled(Vector2::new(3, 1), Color::white());
        assert_eq!(
            image.as_data().resolve_format(TexImgFormat::Auto).unwrap(),
            TexImgFormat::RGBA
        );
    }

    #[test]
    fn padding() {
        assert_eq!(power_of_two_size(Vector2::new(3, 8)), Vector2::new(4, 8));
        assert_eq!(power_of_two_size(Vector2::new(0, 65)), Vector2::new(1, 128));

        let bytes = [1, 2, 3, 4, 5, 6];
        let padded = pad_pixels(&bytes, Vector2::new(3, 2), Vector2::new(4, 2), 1);
        assert_eq!(padded, vec![1, 2, 3, 0, 4, 5, 6, 0]);
    }
}
