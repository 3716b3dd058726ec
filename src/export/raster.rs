//! Raster export: SVG -> pixel surface -> PNG/JPEG.
//!
//! [`RasterExport`] walks an explicit state machine:
//!
//! ```text
//! Pending --render--> Rendered --encode--> Encoded
//!    |
//!    +----(decode error)----> Failed
//! ```
//!
//! Rendering rasterizes the generated SVG with resvg, applies the blur filter
//! and then the noise overlay. Encoding is only possible once rendering has
//! succeeded, so the overlay is always in place before the first byte is
//! written. A failed export stays failed; the caller starts a new one.

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use rand::Rng;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use super::{Artifact, ExportFormat, Resolution};
use crate::error::ExportError;
use crate::generate::generate_svg;
use crate::gradient::GradientDescriptor;

/// Side length of the square noise tile.
pub const NOISE_TILE_SIZE: u32 = 100;

const JPEG_QUALITY: u8 = 90;

// ============================================================================
// RasterFormat
// ============================================================================

/// Pixel formats the exporter can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Png,
    Jpg,
}

impl RasterFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }

    /// Encoder quality in `[0, 1]`; PNG is lossless.
    pub fn quality(self) -> f32 {
        match self {
            Self::Png => 1.0,
            Self::Jpg => f32::from(JPEG_QUALITY) / 100.0,
        }
    }

    pub fn export_format(self) -> ExportFormat {
        match self {
            Self::Png => ExportFormat::Png,
            Self::Jpg => ExportFormat::Jpg,
        }
    }
}

// ============================================================================
// EncodedImage
// ============================================================================

/// An encoded raster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: RasterFormat,
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn format(&self) -> RasterFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:<mime>;base64,<payload>`, for consumers that cannot take bytes.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn into_artifact(self) -> Artifact {
        Artifact::new(self.format.export_format(), self.bytes)
    }
}

// ============================================================================
// RasterExport
// ============================================================================

/// Observable stage of a [`RasterExport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterState {
    Pending,
    Rendered,
    Encoded,
    Failed,
}

#[derive(Debug)]
enum Stage {
    Pending,
    Rendered(RgbaImage),
    Encoded {
        image: RgbaImage,
        encoded: EncodedImage,
    },
    Failed(String),
}

/// One raster export of one gradient.
#[derive(Debug)]
pub struct RasterExport {
    format: RasterFormat,
    svg: String,
    width: u32,
    height: u32,
    blur: u8,
    noise: u8,
    stage: Stage,
}

impl RasterExport {
    /// Generates the intermediate SVG and enters [`RasterState::Pending`].
    pub fn new(gradient: &GradientDescriptor, format: RasterFormat, resolution: Resolution) -> Self {
        let svg = generate_svg(
            gradient,
            f64::from(resolution.width),
            f64::from(resolution.height),
        );
        Self::from_svg(svg, format, resolution, gradient.blur(), gradient.noise())
    }

    fn from_svg(svg: String, format: RasterFormat, resolution: Resolution, blur: u8, noise: u8) -> Self {
        Self {
            format,
            svg,
            width: resolution.width,
            height: resolution.height,
            blur,
            noise,
            stage: Stage::Pending,
        }
    }

    /// Where the export is in its pipeline.
    pub fn state(&self) -> RasterState {
        match self.stage {
            Stage::Pending => RasterState::Pending,
            Stage::Rendered(_) => RasterState::Rendered,
            Stage::Encoded { .. } => RasterState::Encoded,
            Stage::Failed(_) => RasterState::Failed,
        }
    }

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Draws the surface with blur and noise applied.
    ///
    /// Runs once; later calls return the same surface. `rng` feeds the noise
    /// tile and is not used when noise is 0.
    pub fn render<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&RgbaImage, ExportError> {
        if let Stage::Pending = self.stage {
            match self.draw(rng) {
                Ok(image) => {
                    log::debug!("rendered {}x{} surface", self.width, self.height);
                    self.stage = Stage::Rendered(image);
                }
                Err(err) => {
                    log::error!("raster export failed: {err}");
                    self.stage = Stage::Failed(err.to_string());
                    return Err(err);
                }
            }
        }

        match &self.stage {
            Stage::Rendered(image) | Stage::Encoded { image, .. } => Ok(image),
            Stage::Failed(reason) => Err(ExportError::Decode(reason.clone())),
            Stage::Pending => Err(ExportError::NotRendered),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RgbaImage, ExportError> {
        let mut image = rasterize_svg(&self.svg, self.width, self.height)?;
        if self.blur > 0 {
            image = image::imageops::blur(&image, f32::from(self.blur));
        }
        if self.noise > 0 {
            let tile = noise_tile(rng);
            overlay_tiled(&mut image, &tile, f32::from(self.noise) / 100.0);
        }
        Ok(image)
    }

    /// Encodes the rendered surface.
    ///
    /// Fails with [`ExportError::NotRendered`] before [`render`](Self::render)
    /// has succeeded.
    pub fn encode(&mut self) -> Result<&EncodedImage, ExportError> {
        let encoded = match &self.stage {
            Stage::Rendered(image) => Some(encode_image(image, self.format)?),
            _ => None,
        };
        if let Some(encoded) = encoded {
            if let Stage::Rendered(image) = std::mem::replace(&mut self.stage, Stage::Pending) {
                log::debug!("encoded {} ({} bytes)", self.format.mime(), encoded.bytes.len());
                self.stage = Stage::Encoded { image, encoded };
            }
        }

        match &self.stage {
            Stage::Encoded { encoded, .. } => Ok(encoded),
            Stage::Failed(reason) => Err(ExportError::Decode(reason.clone())),
            _ => Err(ExportError::NotRendered),
        }
    }

    /// Renders if needed, encodes and returns the result.
    pub fn finish<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<EncodedImage, ExportError> {
        self.render(rng)?;
        self.encode()?;
        match self.stage {
            Stage::Encoded { encoded, .. } => Ok(encoded),
            _ => Err(ExportError::NotRendered),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Rasterizes SVG markup onto a `width` x `height` surface, stretching the
/// document to fill it.
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> Result<RgbaImage, ExportError> {
    let tree = Tree::from_str(svg, &Options::default())
        .map_err(|err| ExportError::Decode(err.to_string()))?;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a premultiplied tiny_skia pixmap into straight-alpha RGBA.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// A grayscale tile of independent uniform luminance values, fully opaque.
pub fn noise_tile<R: Rng + ?Sized>(rng: &mut R) -> RgbaImage {
    RgbaImage::from_fn(NOISE_TILE_SIZE, NOISE_TILE_SIZE, |_, _| {
        let v: u8 = rng.gen_range(0..255);
        Rgba([v, v, v, 255])
    })
}

/// Repeats `tile` over `dest`, blended at `opacity`.
pub fn overlay_tiled(dest: &mut RgbaImage, tile: &RgbaImage, opacity: f32) {
    let (tw, th) = tile.dimensions();
    if tw == 0 || th == 0 {
        return;
    }
    for (x, y, pixel) in dest.enumerate_pixels_mut() {
        *pixel = alpha_blend(*tile.get_pixel(x % tw, y % th), *pixel, opacity);
    }
}

/// Source-over blend of `src`, scaled by `opacity`, onto `dst`.
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let out = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        out.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Encoding
// ============================================================================

fn encode_image(image: &RgbaImage, format: RasterFormat) -> Result<EncodedImage, ExportError> {
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();

    match format {
        RasterFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        RasterFormat::Jpg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }

    Ok(EncodedImage { format, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::sanitize_gradient_state;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn black_to_white() -> GradientDescriptor {
        sanitize_gradient_state(&json!({
            "stops": [{ "color": "#000", "pos": 0 }, { "color": "#fff", "pos": 100 }]
        }))
    }

    fn size(width: u32, height: u32) -> Resolution {
        Resolution { width, height }
    }

    #[test]
    fn linear_gradient_runs_left_to_right() {
        let mut export = RasterExport::new(&black_to_white(), RasterFormat::Png, size(20, 4));
        assert_eq!(export.state(), RasterState::Pending);

        let image = export.render(&mut rng()).unwrap();
        assert_eq!(image.dimensions(), (20, 4));
        assert!(image.get_pixel(0, 0)[0] < 40, "left edge should be dark");
        assert!(image.get_pixel(19, 0)[0] > 215, "right edge should be light");
        assert_eq!(image.get_pixel(10, 2)[3], 255);
        assert_eq!(export.state(), RasterState::Rendered);
    }

    #[test]
    fn encode_requires_render() {
        let mut export = RasterExport::new(&black_to_white(), RasterFormat::Png, size(4, 4));
        assert!(matches!(export.encode(), Err(ExportError::NotRendered)));
        assert_eq!(export.state(), RasterState::Pending);
    }

    #[test]
    fn png_is_lossless() {
        let mut export = RasterExport::new(&black_to_white(), RasterFormat::Png, size(16, 8));
        let rendered = export.render(&mut rng()).unwrap().clone();
        let encoded = export.encode().unwrap();
        assert!(encoded.bytes().starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(encoded.bytes()).unwrap().to_rgba8();
        assert_eq!(decoded, rendered);
        assert_eq!(export.state(), RasterState::Encoded);
    }

    #[test]
    fn jpeg_encoding() {
        let encoded = RasterExport::new(&black_to_white(), RasterFormat::Jpg, size(16, 8))
            .finish(&mut rng())
            .unwrap();
        assert!(encoded.bytes().starts_with(&[0xFF, 0xD8]));
        assert!(encoded.data_url().starts_with("data:image/jpeg;base64,/9j/"));
        assert_eq!(RasterFormat::Jpg.quality(), 0.9);
    }

    #[test]
    fn decode_failure_is_terminal() {
        let mut export = RasterExport::from_svg("<not-svg".into(), RasterFormat::Png, size(4, 4), 0, 0);
        assert!(matches!(export.render(&mut rng()), Err(ExportError::Decode(_))));
        assert_eq!(export.state(), RasterState::Failed);
        assert!(export.render(&mut rng()).is_err());
        assert!(matches!(export.encode(), Err(ExportError::Decode(_))));
    }

    #[test]
    fn full_noise_replaces_colors_with_tiled_gray() {
        let g = sanitize_gradient_state(&json!({ "noise": 100 }));
        let mut export = RasterExport::new(&g, RasterFormat::Png, size(150, 3));
        let image = export.render(&mut rng()).unwrap();

        for pixel in image.pixels() {
            assert!(pixel[0] == pixel[1] && pixel[1] == pixel[2], "expected gray, got {pixel:?}");
        }
        assert_eq!(image.get_pixel(10, 1), image.get_pixel(110, 1), "tile should repeat");
    }

    #[test]
    fn partial_noise_keeps_gradient_visible() {
        let plain = sanitize_gradient_state(&json!({ "noise": 0 }));
        let noisy = sanitize_gradient_state(&json!({ "noise": 10 }));
        let a = RasterExport::new(&plain, RasterFormat::Png, size(8, 8)).render(&mut rng()).unwrap().clone();
        let b = RasterExport::new(&noisy, RasterFormat::Png, size(8, 8)).render(&mut rng()).unwrap().clone();

        assert_ne!(a, b);
        let (pa, pb) = (a.get_pixel(4, 4), b.get_pixel(4, 4));
        for channel in 0..3 {
            let diff = (pa[channel] as i16 - pb[channel] as i16).abs();
            assert!(diff <= 26, "10% noise moved channel {channel} by {diff}");
        }
    }

    #[test]
    fn blur_softens_hard_stop() {
        let hard = json!({
            "stops": [{ "color": "#000", "pos": 50 }, { "color": "#fff", "pos": 50 }]
        });
        let mut blurred = hard.clone();
        blurred["blur"] = json!(4);

        let sharp = RasterExport::new(&sanitize_gradient_state(&hard), RasterFormat::Png, size(40, 40))
            .render(&mut rng())
            .unwrap()
            .clone();
        let soft = RasterExport::new(&sanitize_gradient_state(&blurred), RasterFormat::Png, size(40, 40))
            .render(&mut rng())
            .unwrap()
            .clone();

        assert!(soft.get_pixel(19, 20)[0] > sharp.get_pixel(19, 20)[0] + 20);
        assert!(soft.get_pixel(20, 20)[0] + 20 < sharp.get_pixel(20, 20)[0]);
    }

    #[test]
    fn noise_tile_is_opaque_gray() {
        let tile = noise_tile(&mut rng());
        assert_eq!(tile.dimensions(), (NOISE_TILE_SIZE, NOISE_TILE_SIZE));
        assert!(tile.pixels().all(|p| p[3] == 255 && p[0] == p[1] && p[1] == p[2] && p[0] < 255));
    }

    #[test]
    fn blend_respects_opacity() {
        let out = alpha_blend(Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(out.0, [128, 128, 128, 255]);
        let out = alpha_blend(Rgba([255, 0, 0, 255]), Rgba([0, 0, 255, 255]), 0.0);
        assert_eq!(out.0, [0, 0, 255, 255]);
    }
}
