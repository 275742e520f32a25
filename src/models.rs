use std::fmt;
use std::path::Path;

use anyhow::Result;
use image::DynamicImage;
use serde::Deserialize;

/// The loaded image: the encoded bytes as uploaded, plus the decoded pixels
/// once they have been resolved.
#[derive(Clone)]
pub struct ImageSource {
    bytes: Vec<u8>,
    decoded: Option<DynamicImage>,
}

impl ImageSource {
    /// Wrap encoded image bytes. Dimensions stay (0, 0) until [`decode`](Self::decode) runs.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            decoded: None,
        }
    }

    /// Read an image file and decode it in one step.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read image {}: {e}", path.display()))?;
        let mut source = Self::from_bytes(bytes);
        source.decode()?;
        Ok(source)
    }

    /// Decode the stored bytes, resolving the native dimensions.
    pub fn decode(&mut self) -> Result<()> {
        if self.decoded.is_none() {
            let img = image::load_from_memory(&self.bytes)
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {e}"))?;
            self.decoded = Some(img);
        }
        Ok(())
    }

    /// Native resolution, or (0, 0) while the image is still undecoded.
    pub fn dimensions(&self) -> (u32, u32) {
        self.decoded
            .as_ref()
            .map(|img| (img.width(), img.height()))
            .unwrap_or((0, 0))
    }

    pub fn is_resolved(&self) -> bool {
        self.decoded.is_some()
    }

    /// The decoded pixels, if [`decode`](Self::decode) has run.
    pub fn image(&self) -> Option<&DynamicImage> {
        self.decoded.as_ref()
    }

    /// Size of the encoded upload in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("ImageSource")
            .field("bytes", &self.bytes.len())
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

/// A chosen point in native pixel units of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPoint {
    pub x: f64,
    pub y: f64,
}

/// One detection returned by the crop service: a displayable encoded image,
/// normally a `data:image/jpeg;base64,` URI.
///
/// Detections are immutable once received; each submission replaces the
/// whole set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub image: String,
}
