/*!
# Scene Model

Backend-neutral description of a figure: axes placed in figure fractions,
each holding artists in data coordinates. The SVG exporter walks this tree;
tests inspect it directly.
*/

use chrov_core::{ChrovError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

use crate::color::Color;

/// Axes rectangle in figure fractions, origin at the bottom left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesRect {
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self { left, bottom, width, height }
    }

    pub fn from_array(r: [f64; 4]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

impl Default for AxesRect {
    fn default() -> Self {
        Self::new(0.125, 0.11, 0.775, 0.77)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Linear,
    /// Angle zero sits at `theta_offset` radians from east; `theta_direction`
    /// is 1 for counter-clockwise and -1 for clockwise.
    Polar { theta_offset: f64, theta_direction: f64 },
}

impl Projection {
    /// Polar layout used for karyotypes: start at west, run clockwise
    pub fn karyotype_polar() -> Self {
        Projection::Polar { theta_offset: PI, theta_direction: -1.0 }
    }

    pub fn is_polar(&self) -> bool {
        matches!(self, Projection::Polar { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapStyle {
    #[default]
    Butt,
    Round,
    Projecting,
}

impl CapStyle {
    pub fn as_svg(&self) -> &'static str {
        match self {
            CapStyle::Butt => "butt",
            CapStyle::Round => "round",
            CapStyle::Projecting => "square",
        }
    }
}

impl FromStr for CapStyle {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "butt" => Ok(CapStyle::Butt),
            "round" => Ok(CapStyle::Round),
            "projecting" | "square" => Ok(CapStyle::Projecting),
            other => Err(ChrovError::config(format!("unknown cap style: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    /// Stroke width in pixels
    pub width: f64,
    pub alpha: f64,
    pub cap: CapStyle,
    pub zorder: f64,
}

impl LineStyle {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width, alpha: 1.0, cap: CapStyle::Butt, zorder: 2.0 }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn cap(mut self, cap: CapStyle) -> Self {
        self.cap = cap;
        self
    }

    pub fn zorder(mut self, zorder: f64) -> Self {
        self.zorder = zorder;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextVAlign {
    Top,
    #[default]
    Center,
    Bottom,
    Baseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub ha: HAlign,
    pub va: TextVAlign,
    /// Counter-clockwise rotation in degrees
    pub rotation: f64,
    pub color: Color,
    pub font_size: Option<f64>,
    pub zorder: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            ha: HAlign::Center,
            va: TextVAlign::Center,
            rotation: 0.0,
            color: Color::BLACK,
            font_size: None,
            zorder: 3.0,
        }
    }
}

impl TextStyle {
    pub fn aligned(ha: HAlign, va: TextVAlign) -> Self {
        Self { ha, va, ..Self::default() }
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanAxis {
    /// Spans an x interval across a fraction of the y extent
    Vertical,
    /// Spans a y interval across the full x extent
    Horizontal,
}

/// Drawable items in data coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artist {
    Line {
        xs: Vec<f64>,
        ys: Vec<f64>,
        style: LineStyle,
    },
    Span {
        axis: SpanAxis,
        lo: f64,
        hi: f64,
        /// Extent along the other axis as axes fractions
        extent: (f64, f64),
        fill: Color,
        alpha: f64,
        zorder: f64,
    },
    AxLine {
        axis: SpanAxis,
        at: f64,
        style: LineStyle,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        style: TextStyle,
    },
    Marker {
        x: f64,
        y: f64,
        /// Radius in pixels
        size: f64,
        color: Color,
        alpha: f64,
        zorder: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
        zorder: f64,
    },
    /// Double-headed arrow
    Arrow {
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    },
}

impl Artist {
    pub fn zorder(&self) -> f64 {
        match self {
            Artist::Line { style, .. } | Artist::AxLine { style, .. } | Artist::Arrow { style, .. } => style.zorder,
            Artist::Text { style, .. } => style.zorder,
            Artist::Span { zorder, .. } | Artist::Marker { zorder, .. } | Artist::Rect { zorder, .. } => *zorder,
        }
    }

    // Data extents that drive autoscaling; spans and axis lines do not
    fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        match self {
            Artist::Line { xs, ys, .. } => Some((bounds(xs)?, bounds(ys)?)),
            Artist::Marker { x, y, .. } | Artist::Text { x, y, .. } => Some(((*x, *x), (*y, *y))),
            Artist::Rect { x, y, width, height, .. } => Some(((*x, x + width), (*y, y + height))),
            Artist::Arrow { from, to, .. } => Some(((from.0.min(to.0), from.0.max(to.0)), (from.1.min(to.1), from.1.max(to.1)))),
            Artist::Span { .. } | Artist::AxLine { .. } => None,
        }
    }
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxesId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub rect: AxesRect,
    pub projection: Projection,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub y_inverted: bool,
    pub axis_visible: bool,
    pub zorder: f64,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub title: Option<String>,
    pub artists: Vec<Artist>,
    pub legend: Vec<LegendEntry>,
    /// Figure size in pixels, used to convert stroke widths into data units
    pub figure_size: (f64, f64),
}

impl Axes {
    pub fn new(rect: AxesRect, projection: Projection, figure_size: (f64, f64)) -> Self {
        Self {
            rect,
            projection,
            xlim: None,
            ylim: None,
            y_inverted: false,
            axis_visible: true,
            zorder: 0.0,
            xlabel: None,
            ylabel: None,
            title: None,
            artists: Vec::new(),
            legend: Vec::new(),
            figure_size,
        }
    }

    pub fn is_polar(&self) -> bool {
        self.projection.is_polar()
    }

    pub fn push(&mut self, artist: Artist) {
        self.artists.push(artist);
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xlim = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.ylim = Some((lo, hi));
    }

    pub fn texts(&self) -> impl Iterator<Item = (f64, f64, &str)> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (&[f64], &[f64], &LineStyle)> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Line { xs, ys, style } => Some((xs.as_slice(), ys.as_slice(), style)),
            _ => None,
        })
    }

    /// Explicit x limits, else the data extent, else `(0, 1)`; polar axes
    /// default to the full circle
    pub fn view_xlim(&self) -> (f64, f64) {
        if let Some(lim) = self.xlim {
            return lim;
        }
        if self.is_polar() {
            return (0.0, 2.0 * PI);
        }
        self.data_extent().map(|(x, _)| pad(x)).unwrap_or((0.0, 1.0))
    }

    /// Explicit y limits, else the data extent, else `(0, 1)`; polar radii
    /// autoscale from zero
    pub fn view_ylim(&self) -> (f64, f64) {
        if let Some(lim) = self.ylim {
            return lim;
        }
        match self.data_extent().map(|(_, y)| y) {
            Some((_, hi)) if self.is_polar() => (0.0, if hi > 0.0 { hi } else { 1.0 }),
            Some(y) => pad(y),
            None => (0.0, 1.0),
        }
    }

    fn data_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        self.artists.iter().filter_map(Artist::extent).reduce(|a, b| {
            (
                (a.0 .0.min(b.0 .0), a.0 .1.max(b.0 .1)),
                (a.1 .0.min(b.1 .0), a.1 .1.max(b.1 .1)),
            )
        })
    }

    /// Axes box in pixels: `(x, y, width, height)` with a top-left origin
    pub fn px_box(&self) -> (f64, f64, f64, f64) {
        let (fw, fh) = self.figure_size;
        let x = self.rect.left * fw;
        let y = (1.0 - self.rect.top()) * fh;
        (x, y, self.rect.width * fw, self.rect.height * fh)
    }

    /// Map a data point to figure pixels
    pub fn data_to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let (bx, by, bw, bh) = self.px_box();
        let (x0, x1) = self.view_xlim();
        let (y0, y1) = self.view_ylim();
        match self.projection {
            Projection::Linear => {
                let fx = frac(x, x0, x1);
                let mut fy = frac(y, y0, y1);
                if self.y_inverted {
                    fy = 1.0 - fy;
                }
                (bx + fx * bw, by + (1.0 - fy) * bh)
            }
            Projection::Polar { theta_offset, theta_direction } => {
                let (cx, cy) = (bx + bw / 2.0, by + bh / 2.0);
                let radius = bw.min(bh) / 2.0;
                let r = frac(y, y0, y1) * radius;
                let phi = theta_offset + theta_direction * x;
                (cx + r * phi.cos(), cy - r * phi.sin())
            }
        }
    }

    /// Pixels per data unit along x for linear axes
    pub fn px_per_x(&self) -> f64 {
        let (x0, x1) = self.view_xlim();
        let width = self.px_box().2;
        if (x1 - x0).abs() > 0.0 {
            width / (x1 - x0).abs()
        } else {
            0.0
        }
    }
}

fn frac(v: f64, lo: f64, hi: f64) -> f64 {
    if hi - lo == 0.0 {
        0.5
    } else {
        (v - lo) / (hi - lo)
    }
}

// 5% autoscale margin
fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    let margin = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - margin, hi + margin)
}

/// A straight line in figure space between points of two axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: (AxesId, f64, f64),
    pub to: (AxesId, f64, f64),
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Size in pixels
    pub width: f64,
    pub height: f64,
    pub axes: Vec<Axes>,
    pub connectors: Vec<Connector>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, axes: Vec::new(), connectors: Vec::new() }
    }

    pub fn add_axes(&mut self, rect: AxesRect, projection: Projection) -> AxesId {
        self.axes.push(Axes::new(rect, projection, (self.width, self.height)));
        AxesId(self.axes.len() - 1)
    }

    pub fn axes(&self, id: AxesId) -> Result<&Axes> {
        self.axes
            .get(id.0)
            .ok_or_else(|| ChrovError::invalid_data(format!("no axes with id {}", id.0)))
    }

    pub fn axes_mut(&mut self, id: AxesId) -> Result<&mut Axes> {
        self.axes
            .get_mut(id.0)
            .ok_or_else(|| ChrovError::invalid_data(format!("no axes with id {}", id.0)))
    }

    /// The most recently added axes, if any
    pub fn last_axes(&self) -> Option<AxesId> {
        self.axes.len().checked_sub(1).map(AxesId)
    }

    pub fn connect(&mut self, from: (AxesId, f64, f64), to: (AxesId, f64, f64), style: LineStyle) -> Result<()> {
        self.axes(from.0)?;
        self.axes(to.0)?;
        self.connectors.push(Connector { from, to, style });
        Ok(())
    }

    /// Map a data point of axes `id` to figure pixels
    pub fn data_to_px(&self, id: AxesId, x: f64, y: f64) -> Result<(f64, f64)> {
        Ok(self.axes(id)?.data_to_px(x, y))
    }

    /// All texts across all axes
    pub fn texts(&self) -> Vec<&str> {
        self.axes.iter().flat_map(|ax| ax.texts().map(|(_, _, t)| t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_mapping_flips_y() {
        let mut fig = Figure::new(100.0, 100.0);
        let id = fig.add_axes(AxesRect::new(0.0, 0.0, 1.0, 1.0), Projection::Linear);
        let ax = fig.axes_mut(id).unwrap();
        ax.set_xlim(0.0, 10.0);
        ax.set_ylim(0.0, 10.0);
        assert_eq!(ax.data_to_px(0.0, 0.0), (0.0, 100.0));
        assert_eq!(ax.data_to_px(10.0, 10.0), (100.0, 0.0));
        ax.y_inverted = true;
        assert_eq!(ax.data_to_px(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_polar_zero_points_west() {
        let mut fig = Figure::new(200.0, 200.0);
        let id = fig.add_axes(AxesRect::new(0.0, 0.0, 1.0, 1.0), Projection::karyotype_polar());
        let ax = fig.axes_mut(id).unwrap();
        ax.set_ylim(0.0, 1.0);
        let (x, y) = ax.data_to_px(0.0, 1.0);
        assert!((x - 0.0).abs() < 1e-9 && (y - 100.0).abs() < 1e-9);
        // clockwise: a quarter turn lands at the top
        let (x, y) = ax.data_to_px(PI / 2.0, 1.0);
        assert!((x - 100.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_autoscale_from_lines() {
        let mut ax = Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0));
        ax.push(Artist::Line { xs: vec![0.0, 100.0], ys: vec![1.0, 1.0], style: LineStyle::new(Color::BLACK, 1.0) });
        assert_eq!(ax.view_xlim(), (-5.0, 105.0));
        assert_eq!(ax.view_ylim(), (0.5, 1.5));
    }

    #[test]
    fn test_unknown_axes_is_error() {
        let fig = Figure::default();
        assert!(fig.axes(AxesId(3)).is_err());
    }
}
