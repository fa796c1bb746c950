//! Image container

use super::error::DataError;
use serde::{Deserialize, Serialize};

/// A single image stored as row-major `(height, width, channels)` values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub pixels: Vec<f64>,
}

impl Image {
    pub fn new(height: usize, width: usize, channels: usize, pixels: Vec<f64>) -> Self {
        Self {
            height,
            width,
            channels,
            pixels,
        }
    }

    pub fn expected_len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * self.channels + channel
    }
}

/// A batch of images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImages")]
pub struct Images {
    images: Vec<Image>,
}

#[derive(Deserialize)]
struct RawImages {
    images: Vec<Image>,
}

impl TryFrom<RawImages> for Images {
    type Error = DataError;

    fn try_from(raw: RawImages) -> Result<Self, Self::Error> {
        Images::new(raw.images)
    }
}

impl Images {
    pub fn new(images: Vec<Image>) -> Result<Self, DataError> {
        for (index, image) in images.iter().enumerate() {
            if image.pixels.len() != image.expected_len() {
                return Err(DataError::ImageShape {
                    index,
                    height: image.height,
                    width: image.width,
                    channels: image.channels,
                    expected: image.expected_len(),
                    found: image.pixels.len(),
                });
            }
        }
        Ok(Self { images })
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
