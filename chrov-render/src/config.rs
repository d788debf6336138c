//! Configuration for chromosome rendering
//!
//! Every renderer takes a typed config struct; `RenderConfig` bundles them
//! and loads from `chrov.toml` files.

use anyhow::{Context, Result};
use chrov_core::{AngularRange, Chrom};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::annot::LabelLoc;
use crate::chrom::VAlign;
use crate::color::Color;
use crate::figure::XKind;
use crate::ranges::RangesKind;
use crate::scene::{AxesRect, CapStyle};
use crate::series::SeriesKind;
use crate::vector_export::ExportConfig;

/// Angular range expressed in multiples of π
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiRange {
    /// Span in units of π, within (0, 2]
    #[serde(default = "default_pi_span")]
    pub pi_span: f64,

    #[serde(default)]
    pub pi_start: f64,

    /// Explicit end in units of π; overrides the span
    #[serde(default)]
    pub pi_end: Option<f64>,
}

impl PiRange {
    pub fn to_range(&self) -> chrov_core::Result<AngularRange> {
        AngularRange::from_pi(self.pi_span, self.pi_start, self.pi_end)
    }
}

impl Default for PiRange {
    fn default() -> Self {
        Self { pi_span: default_pi_span(), pi_start: 0.0, pi_end: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// y position of the arm
    #[serde(default)]
    pub y: f64,

    /// Line width in pixels
    #[serde(default = "default_lw")]
    pub lw: f64,

    #[serde(default = "default_edge_color")]
    pub edge_color: Color,

    #[serde(default = "default_centromere_color")]
    pub centromere_color: Color,

    /// Polar arcs are sampled at `100 * polar_smoothness_scale` points
    #[serde(default = "default_one")]
    pub polar_smoothness_scale: f64,

    #[serde(default = "default_cap")]
    pub cap: CapStyle,

    /// Keep the axis visible
    #[serde(default)]
    pub test: bool,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            y: 0.0,
            lw: default_lw(),
            edge_color: default_edge_color(),
            centromere_color: default_centromere_color(),
            polar_smoothness_scale: default_one(),
            cap: default_cap(),
            test: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromsConfig {
    /// y position of the chromosomes, overriding `arm.y`
    #[serde(default)]
    pub y: Option<f64>,

    /// Subset of chromosomes to plot, in any order
    #[serde(default)]
    pub chromosomes: Option<Vec<Chrom>>,

    #[serde(default = "default_span_color")]
    pub span_color: Color,

    #[serde(default = "default_one")]
    pub span_alpha_scale: f64,

    #[serde(default = "default_true")]
    pub show_labels: bool,

    /// Radial lines at both ends of a partial circle
    #[serde(default = "default_true")]
    pub show_vline: bool,

    #[serde(default)]
    pub label_y: Option<f64>,

    #[serde(default)]
    pub angular: PiRange,

    #[serde(default)]
    pub arm: ArmConfig,
}

impl Default for ChromsConfig {
    fn default() -> Self {
        Self {
            arm: ArmConfig::default(),
            y: None,
            chromosomes: None,
            span_color: default_span_color(),
            span_alpha_scale: default_one(),
            angular: PiRange::default(),
            show_labels: true,
            show_vline: true,
            label_y: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAxesConfig {
    /// Size offset in figure fractions
    #[serde(default)]
    pub off: Option<f64>,

    /// Vertical offset; defaults to `off`
    #[serde(default)]
    pub offy: Option<f64>,

    #[serde(default)]
    pub va: VAlign,

    /// Polar axes; inferred from the reference axes when unset
    #[serde(default)]
    pub arc: Option<bool>,

    #[serde(default)]
    pub zorder: f64,
}

impl Default for AddAxesConfig {
    fn default() -> Self {
        Self { off: None, offy: None, va: VAlign::default(), arc: None, zorder: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub loc: LabelLoc,

    #[serde(default = "default_label_color")]
    pub color: Color,

    /// Elbow and label offsets overriding the distance-based defaults
    #[serde(default)]
    pub yoff_scales: Option<[f64; 4]>,

    /// Number of bin edges for spreading polar labels
    #[serde(default = "default_label_segments")]
    pub segments: usize,

    #[serde(default = "default_scale_polar")]
    pub scale_polar: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            loc: LabelLoc::default(),
            color: default_label_color(),
            yoff_scales: None,
            segments: default_label_segments(),
            scale_polar: default_scale_polar(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    #[serde(default)]
    pub kind: SeriesKind,

    #[serde(default)]
    pub ylabel: Option<String>,

    /// Baseline of stems and lower y limit
    #[serde(default)]
    pub bottom: Option<f64>,

    #[serde(default = "default_edge_color")]
    pub color: Color,

    /// Marker radius in pixels
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,

    #[serde(default = "default_one")]
    pub lw: f64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            kind: SeriesKind::default(),
            ylabel: None,
            bottom: None,
            color: default_edge_color(),
            marker_size: default_marker_size(),
            lw: default_one(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default)]
    pub xkind: XKind,

    /// Only label data points with a value above this
    #[serde(default)]
    pub coffy: Option<f64>,

    #[serde(default)]
    pub chrom_y: f64,

    /// Draw every chromosome of the cytobands, not only those in the data
    #[serde(default)]
    pub show_genome: bool,

    #[serde(default = "default_true")]
    pub arc: bool,

    #[serde(default)]
    pub angular: PiRange,

    /// Data axes rectangle when none is supplied
    #[serde(default)]
    pub data_rect: AxesRect,

    #[serde(default)]
    pub add_axes: AddAxesConfig,

    #[serde(default)]
    pub chroms: ChromsConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub series: SeriesConfig,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            xkind: XKind::default(),
            coffy: None,
            chrom_y: 0.0,
            show_genome: false,
            arc: true,
            angular: PiRange::default(),
            data_rect: AxesRect::default(),
            add_axes: AddAxesConfig::default(),
            chroms: ChromsConfig::default(),
            labels: LabelConfig::default(),
            series: SeriesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangesConfig {
    #[serde(default)]
    pub kind: RangesKind,

    /// Plotted window; ranges are trimmed to it
    #[serde(default)]
    pub start: u64,

    #[serde(default)]
    pub end: Option<u64>,

    #[serde(default = "default_lw")]
    pub lw: f64,

    /// Row of the cytoband arm; one below the last range by default
    #[serde(default)]
    pub cytobands_y: Option<f64>,

    #[serde(default)]
    pub test: bool,
}

impl Default for RangesConfig {
    fn default() -> Self {
        Self {
            kind: RangesKind::default(),
            start: 0,
            end: None,
            lw: default_lw(),
            cytobands_y: None,
            test: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub ranges: RangesConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

// Default value functions
fn default_pi_span() -> f64 { 2.0 }
fn default_lw() -> f64 { 10.0 }
fn default_one() -> f64 { 1.0 }
fn default_true() -> bool { true }
fn default_edge_color() -> Color { Color::BLACK }
fn default_centromere_color() -> Color { Color::CENTROMERE }
fn default_cap() -> CapStyle { CapStyle::Round }
fn default_span_color() -> Color { Color::GAINSBORO }
fn default_label_color() -> Color { Color::DARK_GRAY }
fn default_label_segments() -> usize { 20 }
fn default_scale_polar() -> f64 { 1.5 }
fn default_marker_size() -> f64 { 3.0 }

impl RenderConfig {
    /// Load configuration from file, `chrov.toml` in the working directory, or defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("chrov.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: chrov.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(content)?;
        config.figure.angular.to_range()?;
        config.figure.chroms.angular.to_range()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.figure.labels.segments, 20);
        assert_eq!(config.figure.labels.color, Color::DARK_GRAY);
        assert_eq!(config.figure.chroms.arm.lw, 10.0);
        assert!(config.figure.angular.to_range().unwrap().is_full_circle());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r##"
[figure]
arc = false
coffy = 2.5

[figure.labels]
loc = "in"
color = "#333333"

[figure.chroms.arm]
lw = 6.0
cap = "butt"
"##;
        let config = RenderConfig::from_toml_str(text).unwrap();
        assert!(!config.figure.arc);
        assert_eq!(config.figure.coffy, Some(2.5));
        assert_eq!(config.figure.labels.loc, LabelLoc::In);
        assert_eq!(config.figure.labels.segments, 20);
        assert_eq!(config.figure.chroms.arm.cap, CapStyle::Butt);
        assert_eq!(config.figure.chroms.arm.centromere_color, Color::CENTROMERE);
    }

    #[test]
    fn test_invalid_pi_span_is_rejected() {
        let text = "[figure.angular]\npi_span = 3.0\n";
        assert!(RenderConfig::from_toml_str(text).is_err());
        let half = PiRange { pi_span: 1.0, pi_start: 0.0, pi_end: None }.to_range().unwrap();
        assert!((half.end - PI).abs() < 1e-12);
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let text = "[figure.labels]\ncolor = \"#a\u{e9}\"\n";
        assert!(RenderConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = RenderConfig::default();
        config.figure.show_genome = true;
        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;
        let loaded = RenderConfig::load_from_file(temp_file.path())?;
        assert_eq!(config, loaded);
        Ok(())
    }
}
