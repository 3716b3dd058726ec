//! Exported artifacts: CSS file, SVG file and raster images.

pub mod raster;

pub use raster::{EncodedImage, RasterExport, RasterFormat, RasterState};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::Engine as _;
use rand::Rng;

use crate::error::ExportError;
use crate::generate::{css_file_contents, generate_svg, safe_dimension};
use crate::gradient::GradientDescriptor;

// ============================================================================
// Formats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
    Jpg,
    Css,
}

impl ExportFormat {
    pub const ALL: [Self; 4] = [Self::Svg, Self::Png, Self::Jpg, Self::Css];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Css => "css",
        }
    }

    /// The fixed download name, e.g. `gradient.png`.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Svg => "gradient.svg",
            Self::Png => "gradient.png",
            Self::Jpg => "gradient.jpg",
            Self::Css => "gradient.css",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Css => "text/css",
        }
    }

    /// The pixel format, for raster exports.
    pub fn raster(self) -> Option<RasterFormat> {
        match self {
            Self::Png => Some(RasterFormat::Png),
            Self::Jpg => Some(RasterFormat::Jpg),
            Self::Svg | Self::Css => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "css" => Ok(Self::Css),
            _ => Err(format!("unknown export format `{s}`")),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD_1080P: Self = Self {
        width: 1920,
        height: 1080,
    };

    pub const UHD_4K: Self = Self {
        width: 3840,
        height: 2160,
    };

    /// The named resolutions offered for export.
    pub const TABLE: [(&'static str, Self); 2] = [("1080p", Self::HD_1080P), ("4k", Self::UHD_4K)];

    /// Looks up a named resolution; unknown names give 1080p.
    pub fn from_key(key: &str) -> Self {
        Self::TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, resolution)| *resolution)
            .unwrap_or_else(|| {
                log::warn!("unknown resolution `{key}`, using 1080p");
                Self::HD_1080P
            })
    }

    /// Arbitrary dimensions, clamped like the SVG generator's.
    pub fn custom(width: f64, height: f64) -> Self {
        Self {
            width: safe_dimension(width, f64::from(Self::HD_1080P.width)),
            height: safe_dimension(height, f64::from(Self::HD_1080P.height)),
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HD_1080P
    }
}

// ============================================================================
// Artifact
// ============================================================================

/// A finished export ready to be downloaded or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    format: ExportFormat,
    bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The contents as text, for the CSS and SVG formats.
    pub fn as_text(&self) -> Option<&str> {
        match self.format {
            ExportFormat::Css | ExportFormat::Svg => std::str::from_utf8(&self.bytes).ok(),
            ExportFormat::Png | ExportFormat::Jpg => None,
        }
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Writes the artifact into `dir` under its file name.
    ///
    /// Nothing is written unless the whole export already succeeded, so a
    /// failed export never leaves a partial file behind.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(self.file_name());
        fs::write(&path, &self.bytes)?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// The `gradient.css` file wrapping the declaration in a `.generated-gradient` rule.
pub fn export_css(gradient: &GradientDescriptor) -> Artifact {
    Artifact::new(ExportFormat::Css, css_file_contents(gradient).into_bytes())
}

/// The `gradient.svg` document at `resolution`.
///
/// Blur and noise are raster-only effects and are not applied here.
pub fn export_svg(gradient: &GradientDescriptor, resolution: Resolution) -> Artifact {
    let svg = generate_svg(
        gradient,
        f64::from(resolution.width),
        f64::from(resolution.height),
    );
    Artifact::new(ExportFormat::Svg, svg.into_bytes())
}

/// Runs a complete raster export.
pub fn export_raster<R: Rng + ?Sized>(
    gradient: &GradientDescriptor,
    format: RasterFormat,
    resolution: Resolution,
    rng: &mut R,
) -> Result<Artifact, ExportError> {
    RasterExport::new(gradient, format, resolution)
        .finish(rng)
        .map(EncodedImage::into_artifact)
}

/// Exports in any format. Only raster formats use `resolution`'s pixels
/// and `rng`; SVG uses the resolution as its nominal size.
pub fn export<R: Rng + ?Sized>(
    gradient: &GradientDescriptor,
    format: ExportFormat,
    resolution: Resolution,
    rng: &mut R,
) -> Result<Artifact, ExportError> {
    if let Some(raster) = format.raster() {
        return export_raster(gradient, raster, resolution, rng);
    }
    Ok(match format {
        ExportFormat::Css => export_css(gradient),
        _ => export_svg(gradient, resolution),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn file_names_are_fixed() {
        let names: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["gradient.svg", "gradient.png", "gradient.jpg", "gradient.css"]);
        assert_eq!("JPEG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpg);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn resolution_table() {
        assert_eq!(Resolution::from_key("4k"), Resolution { width: 3840, height: 2160 });
        assert_eq!(Resolution::from_key("1080p"), Resolution { width: 1920, height: 1080 });
        assert_eq!(Resolution::from_key("8k"), Resolution::HD_1080P);
        assert_eq!(Resolution::custom(-1.0, 20_000.0), Resolution { width: 1920, height: 10_000 });
    }

    #[test]
    fn css_artifact() {
        let artifact = export_css(&GradientDescriptor::default());
        assert_eq!(artifact.file_name(), "gradient.css");
        assert_eq!(
            artifact.as_text().unwrap(),
            ".generated-gradient {\n    background: linear-gradient(90deg, #2B8EFB 0%, #1FC8A1 100%);\n}"
        );
    }

    #[test]
    fn svg_artifact_uses_resolution() {
        let artifact = export_svg(&GradientDescriptor::default(), Resolution::UHD_4K);
        assert_eq!(artifact.mime(), "image/svg+xml");
        assert!(artifact.as_text().unwrap().contains(r#"width="3840" height="2160""#));
        assert!(artifact.data_url().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn raster_artifact_written_to_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let artifact = export(
            &GradientDescriptor::default(),
            ExportFormat::Png,
            Resolution { width: 12, height: 6 },
            &mut rng,
        )
        .unwrap();
        assert!(artifact.as_text().is_none());

        let path = artifact.write_to(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("gradient.png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 6));
    }
}
