//! Gene labels with elbow connectors, and segment annotations.

use chrov_core::rescale::{linspace, rank_average, rescale};
use chrov_core::{interpolate, ChrovError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::color::{Color, PALETTE};
use crate::config::LabelConfig;
use crate::scene::{Artist, Axes, AxesId, CapStyle, Figure, HAlign, LineStyle, SpanAxis, TextStyle, TextVAlign};
use crate::surface::surface_for;

/// Which side of the chromosome the labels go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLoc {
    #[default]
    Out,
    In,
}

impl FromStr for LabelLoc {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "out" => Ok(LabelLoc::Out),
            "in" => Ok(LabelLoc::In),
            other => Err(ChrovError::config(format!("unknown label location: {:?}", other))),
        }
    }
}

/// A point to label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPoint {
    pub label: String,
    /// x on the data axes
    pub x: f64,
    /// x on the chromosome axes
    pub start: f64,
    /// y on the data axes; connectors continue down to it when set
    pub y: Option<f64>,
}

impl LabelPoint {
    pub fn new<S: Into<String>>(label: S, x: f64) -> Self {
        Self { label: label.into(), x, start: x, y: None }
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }
}

/// Where a label ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnchor {
    pub label: String,
    pub x: f64,
    pub start: f64,
    pub label_x: f64,
}

/// Spread label anchors over the chromosome axes x limits.
///
/// `xs` must be sorted. Linear axes spread by rank across the whole range.
/// Polar axes bin the coordinates into `segments - 1` bins and spread by
/// rank within each bin, so labels stay near their coordinate.
pub fn label_positions(xs: &[f64], xlim: (f64, f64), polar: bool, segments: usize) -> Result<Vec<f64>> {
    if !polar {
        return Ok(rescale(&rank_average(xs), None, Some(xlim)));
    }
    if segments < 2 {
        return Err(ChrovError::config(format!("label segments must be at least 2, got {}", segments)));
    }
    let edges = linspace(xlim.0, xlim.1, segments);
    let nbins = segments - 1;
    let bin_of = |x: f64| {
        // first bin is closed on the left; out-of-range values clamp to the edge bins
        (0..nbins).find(|&i| x <= edges[i + 1]).unwrap_or(nbins - 1)
    };

    let mut positions = Vec::with_capacity(xs.len());
    let mut i = 0;
    while i < xs.len() {
        let bin = bin_of(xs[i]);
        let mut j = i;
        while j < xs.len() && bin_of(xs[j]) == bin {
            j += 1;
        }
        let group = &xs[i..j];
        let mut distinct = group.to_vec();
        distinct.dedup();
        if distinct.len() == 1 {
            positions.extend_from_slice(group);
        } else {
            let (left, right) = (edges[bin], edges[bin + 1]);
            let target = (left, right - (right - left) / distinct.len() as f64);
            positions.extend(rescale(&rank_average(group), None, Some(target)));
        }
        i = j;
    }
    Ok(positions)
}

struct Offsets {
    chrom: f64,
    line1: f64,
    line2: f64,
    line3: f64,
    label: f64,
}

fn offsets(dist: f64, loc: LabelLoc, polar: bool, config: &LabelConfig) -> Offsets {
    let out = loc == LabelLoc::Out;
    let scales = config.yoff_scales;
    let line1 = scales.map_or(dist * if out { 0.03 } else { 0.95 }, |s| s[0]);
    let line2 = scales.map_or(dist * if out { 0.06 } else { 0.85 }, |s| s[1]);
    let line3 = scales.map_or(dist * if out { 0.09 } else { 0.65 }, |s| s[2]);
    let label = if out {
        dist * scales.map_or(0.12 * if polar { config.scale_polar } else { 0.8 }, |s| s[3])
    } else {
        (line3 + line2) / 2.0
    };
    Offsets { chrom: if out { -0.1 } else { 0.0 }, line1, line2, line3, label }
}

/// Annotate labels along the chromosomes.
///
/// Each point gets an elbow connector from its chromosome position to a
/// spread-out label anchor; with `ax_data` the connector continues to the
/// data point. Anchors are spread by the chromosome axes coordinate
/// (`start`); the anchors are returned in that order.
pub fn annot_labels(
    fig: &mut Figure,
    ax_chrom: AxesId,
    points: &[LabelPoint],
    chrom_y: f64,
    config: &LabelConfig,
    ax_data: Option<AxesId>,
) -> Result<Vec<LabelAnchor>> {
    let mut points = points.to_vec();
    points.sort_by(|a, b| a.start.total_cmp(&b.start));

    let chrom = fig.axes(ax_chrom)?;
    let polar = chrom.is_polar();
    let xlim = chrom.view_xlim();
    let (ylim0, ylim1) = chrom.view_ylim();

    let starts: Vec<f64> = points.iter().map(|p| p.start).collect();
    let label_xs = label_positions(&starts, xlim, polar, config.segments)?;
    let anchors: Vec<LabelAnchor> = points
        .iter()
        .zip(&label_xs)
        .map(|(p, &label_x)| LabelAnchor { label: p.label.clone(), x: p.x, start: p.start, label_x })
        .collect();

    let off = offsets(chrom_y - ylim0, config.loc, polar, config);
    let style = LineStyle::new(config.color, 1.0).alpha(0.5).zorder(2.0);
    let base = if config.loc == LabelLoc::Out { ylim1 } else { ylim0 };
    let data_top = match ax_data {
        Some(id) => Some((id, fig.axes(id)?.view_ylim().1)),
        None => None,
    };

    for (point, anchor) in points.iter().zip(&anchors) {
        let chrom_at = chrom_y + off.chrom;
        let elbow1 = base + off.line1;
        let elbow2 = base + off.line2;
        let elbow3 = base + off.line3;
        fig.connect((ax_chrom, point.start, chrom_at), (ax_chrom, point.start, elbow1), style.clone())?;
        fig.connect((ax_chrom, point.start, elbow1), (ax_chrom, anchor.label_x, elbow2), style.clone())?;
        fig.connect((ax_chrom, anchor.label_x, elbow2), (ax_chrom, anchor.label_x, elbow3), style.clone())?;

        if let (Some((data, top)), Some(y)) = (data_top, point.y) {
            let from = match config.loc {
                LabelLoc::Out => (ax_chrom, point.start, chrom_at),
                LabelLoc::In => (ax_chrom, anchor.label_x, elbow3),
            };
            fig.connect(from, (data, point.x, top), style.clone())?;
            fig.connect((data, point.x, top), (data, point.x, y), style.clone())?;
        }
    }

    let target_polar = match ax_data {
        Some(id) => fig.axes(id)?.is_polar(),
        None => polar,
    };
    let data_xlim = match ax_data {
        Some(id) => fig.axes(id)?.view_xlim(),
        None => xlim,
    };
    let ax = fig.axes_mut(ax_chrom)?;
    if target_polar {
        let edges = interpolate(data_xlim.0, data_xlim.1, None, Some(100))?;
        for pair in edges.windows(2) {
            ax.push(Artist::Span {
                axis: SpanAxis::Vertical,
                lo: pair[0],
                hi: pair[1],
                extent: (0.0, 0.85),
                fill: Color::WHITE,
                alpha: 1.0,
                zorder: 0.0,
            });
        }
    } else {
        ax.push(Artist::Span {
            axis: SpanAxis::Horizontal,
            lo: ylim0,
            hi: 0.0,
            extent: (0.0, 1.0),
            fill: Color::WHITE,
            alpha: 1.0,
            zorder: 0.0,
        });
    }
    place_labels(ax, &anchors, base + off.label, config.loc);

    if target_polar {
        if let Some(id) = ax_data {
            fig.axes_mut(id)?.ylabel = None;
        }
    }
    Ok(anchors)
}

fn place_labels(ax: &mut Axes, anchors: &[LabelAnchor], y: f64, loc: LabelLoc) {
    let va = if loc == LabelLoc::Out && !ax.is_polar() { TextVAlign::Bottom } else { TextVAlign::Center };
    let mut surface = surface_for(ax);
    let mut seen: Vec<(&str, u64)> = Vec::new();
    for anchor in anchors {
        let key = (anchor.label.as_str(), anchor.label_x.to_bits());
        if seen.contains(&key) {
            debug!("skipping duplicate label {} at {}", anchor.label, anchor.label_x);
            continue;
        }
        seen.push(key);
        surface.place_label(anchor.label_x, y, &anchor.label, TextStyle::aligned(HAlign::Center, va));
    }
}

/// How segments are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    #[default]
    Arrows,
    Bands,
}

impl FromStr for SegmentKind {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arrows" => Ok(SegmentKind::Arrows),
            "bands" => Ok(SegmentKind::Bands),
            other => Err(ChrovError::config(format!("unknown segment kind: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub label: Option<String>,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { label: None, start, end }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Consecutive windows of `size` covering `[start, end]`, named `segment1`, `segment2`, ...
pub fn windows(start: f64, end: f64, size: f64) -> Result<Vec<Segment>> {
    if !(size > 0.0) {
        return Err(ChrovError::config(format!("window size must be positive, got {}", size)));
    }
    let mut segments = Vec::new();
    let mut lo = start;
    while lo < end {
        let hi = (lo + size).min(end);
        segments.push(Segment::new(lo, hi).with_label(format!("segment{}", segments.len() + 1)));
        lo = hi;
    }
    Ok(segments)
}

/// Show segments along a chromosome arm at `y`; odd segments drop by `offy`.
pub fn show_segments(
    ax: &mut Axes,
    segments: &[Segment],
    y: f64,
    offy: f64,
    kind: SegmentKind,
    offytext: f64,
    test: bool,
) {
    let mut sorted = segments.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
    for (i, segment) in sorted.iter().enumerate() {
        let sy = if i % 2 == 0 { y } else { y - offy };
        match kind {
            SegmentKind::Arrows => ax.push(Artist::Arrow {
                from: (segment.start, sy),
                to: (segment.end, sy),
                style: LineStyle::new(Color::BLACK, 1.0),
            }),
            SegmentKind::Bands => ax.push(Artist::Line {
                xs: vec![segment.start, segment.end],
                ys: vec![sy, sy],
                style: LineStyle::new(PALETTE[i % PALETTE.len()], 10.0).cap(CapStyle::Butt),
            }),
        }
        if let Some(label) = &segment.label {
            ax.push(Artist::Text {
                x: (segment.start + segment.end) / 2.0,
                y: y + offytext,
                text: label.clone(),
                style: TextStyle::aligned(HAlign::Center, TextVAlign::Bottom),
            });
        }
    }
    if !test {
        ax.axis_visible = false;
    }
}
