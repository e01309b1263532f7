use crate::color::Rgba;
use crate::error::{Error, Result};

/// owned RGBA8 raster buffer, row-major, 4 bytes per pixel.
///
/// this is the canvas-factory surface: platform adapters hand decoded pixels to
/// [`Bitmap::from_raw`], which validates fail-fast before any search starts.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pub(crate) data: Vec<u8>,
}

impl Bitmap {
    /// blank (all-zero) canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        })
    }

    /// canvas filled with a solid color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self> {
        let mut bitmap = Self::new(width, height)?;
        for px in bitmap.data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
        Ok(bitmap)
    }

    /// wrap an externally decoded buffer. the buffer must be exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::check_dims(width, height)?;
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn check_dims(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// byte offset of pixel (x, y). callers guarantee in-bounds coordinates
    /// (scanlines are filtered before use).
    #[inline]
    pub(crate) fn offset(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Bitmap::new(0, 4),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Bitmap::new(4, 0),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        let err = Bitmap::from_raw(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 64, .. }));
    }

    #[test]
    fn filled_writes_every_pixel() {
        let c = Rgba::new(10, 20, 30, 200);
        let bm = Bitmap::filled(3, 2, c).unwrap();
        assert_eq!(bm.data().len(), 24);
        for px in bm.data().chunks_exact(4) {
            assert_eq!(px, [10, 20, 30, 200]);
        }
    }
}
