use crate::{XrError, XrResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// A rendered color image for one eye, tightly packed row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> XrResult<FrameBuffer> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(XrError::Frame(format!(
                "{}x{} buffer with {} channels needs {} bytes, got {}",
                width, height, format.channels(), expected, data.len()
            )));
        }
        Ok(FrameBuffer { width, height, format, data })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    pub fn is_rgba(&self) -> bool {
        self.format == PixelFormat::Rgba
    }
}

/// Axis along which a frame is mirrored before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum FlipAxis {
    /// Rows are reversed (upside down).
    Vertical,
    /// Columns are reversed (mirror).
    Horizontal,
    Both,
}

/// Image transformations applied to every frame before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct FrameTransformations {
    /// Crop to the recommended aspect ratio and scale to the recommended size.
    pub fit: bool,
    pub flip: Option<FlipAxis>,
}

impl FrameTransformations {
    pub fn is_identity(&self) -> bool {
        !self.fit && self.flip.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_length() {
        assert!(FrameBuffer::new(2, 2, PixelFormat::Rgba, vec![0; 16]).is_ok());
        match FrameBuffer::new(2, 2, PixelFormat::Rgb, vec![0; 16]) {
            Err(XrError::Frame(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_buffers() {
        let frame = FrameBuffer::new(0, 0, PixelFormat::Rgba, Vec::new()).unwrap();
        assert!(frame.is_empty());
        assert!(frame.is_rgba());
    }
}
