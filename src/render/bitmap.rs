//! Raster image writers.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder};

use super::{PageArtifact, PageContext, Writer};
use crate::engine::RenderTarget;
use crate::error::{Error, Result};

/// JPEG quality, 0-100.
const JPEG_QUALITY: u8 = 90;

fn raster<'a>(artifact: &'a PageArtifact, writer: &str) -> Result<&'a RenderTarget> {
    artifact
        .raster
        .as_ref()
        .ok_or_else(|| Error::Render(format!("{} writer received no raster", writer)))
}

/// Writes `page-N.png`.
#[derive(Debug, Clone, Default)]
pub struct PngWriter {
    minify: bool,
}

impl PngWriter {
    /// Writer with default compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer using the slowest, smallest compression.
    pub fn minified() -> Self {
        Self { minify: true }
    }

    /// Encode a surface as PNG.
    pub fn encode(&self, target: &RenderTarget) -> Result<Vec<u8>> {
        let compression = if self.minify {
            CompressionType::Best
        } else {
            CompressionType::Default
        };
        let image = target.to_image();
        let mut bytes = Vec::new();
        PngEncoder::new_with_quality(&mut bytes, compression, FilterType::Adaptive).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )?;
        Ok(bytes)
    }
}

impl Writer for PngWriter {
    fn name(&self) -> &str {
        "png"
    }

    fn requires_raster(&self) -> bool {
        true
    }

    fn write_page(&mut self, artifact: &PageArtifact, ctx: &mut PageContext<'_>) -> Result<()> {
        let bytes = self.encode(raster(artifact, "png")?)?;
        ctx.output
            .write(&ctx.output.page_file(ctx.page_number, "png"), bytes)
    }
}

/// Writes `page-N.jpg`.
#[derive(Debug, Clone)]
pub struct JpegWriter {
    quality: u8,
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }
}

impl JpegWriter {
    /// Writer at the default quality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer at a specific quality (1-100).
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encode a surface as JPEG, dropping alpha.
    pub fn encode(&self, target: &RenderTarget) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(target.to_image()).into_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        Ok(bytes)
    }
}

impl Writer for JpegWriter {
    fn name(&self) -> &str {
        "jpeg"
    }

    fn requires_raster(&self) -> bool {
        true
    }

    fn write_page(&mut self, artifact: &PageArtifact, ctx: &mut PageContext<'_>) -> Result<()> {
        let bytes = self.encode(raster(artifact, "jpeg")?)?;
        ctx.output
            .write(&ctx.output.page_file(ctx.page_number, "jpg"), bytes)
    }
}
