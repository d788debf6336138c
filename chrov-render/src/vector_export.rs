/*!
# Vector Export System

Turns a [`Figure`] into an SVG document with an optional title, legend,
provenance comment and configuration footer. Output is deterministic as long
as the footer (which carries a timestamp) is disabled.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Line, Path as SvgPath, Rectangle, Text};
use svg::node::{Comment, Text as TextNode};
use svg::Document;

use crate::color::Color;
use crate::scene::{Artist, Axes, Figure, HAlign, LineStyle, Projection, SpanAxis, TextStyle, TextVAlign};

/// Samples per full turn when approximating arcs
const ARC_SAMPLES: f64 = 128.0;

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub show_legend: bool,
    pub show_footer: bool,
    pub title: Option<String>,
    pub background_color: Color,
    pub font_family: String,
    pub font_size: f64,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_footer: true,
            title: None,
            background_color: Color::WHITE,
            font_family: "Arial, sans-serif".to_string(),
            font_size: 10.0,
            provenance_comment: None,
        }
    }
}

/// SVG export of figures
pub struct SvgExporter {
    config: ExportConfig,
}

impl SvgExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the SVG document for `figure`
    pub fn to_document(&self, figure: &Figure) -> Document {
        let mut svg = SvgBuilder::new(&self.config, figure.width, figure.height);

        if let Some(comment) = &self.config.provenance_comment {
            svg.add_comment(comment);
        }
        svg.add_background();
        if let Some(title) = &self.config.title {
            svg.add_title(title);
        }

        // stable sort keeps insertion order for equal zorders
        let mut axes: Vec<&Axes> = figure.axes.iter().collect();
        axes.sort_by(|a, b| a.zorder.total_cmp(&b.zorder));
        for ax in axes {
            svg.render_axes(ax);
        }
        svg.add_connectors(figure);

        if self.config.show_legend {
            svg.add_legend(figure);
        }
        if self.config.show_footer {
            svg.add_footer(figure);
        }
        svg.finish()
    }

    pub fn to_svg_string(&self, figure: &Figure) -> String {
        self.to_document(figure).to_string()
    }

    /// Export to SVG format
    pub fn export_svg<P: AsRef<Path>>(&self, path: P, figure: &Figure) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_svg_string(figure);
        std::fs::write(path, content).with_context(|| format!("Failed to write SVG file: {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

/// SVG builder for vector graphics
struct SvgBuilder {
    config: ExportConfig,
    width: f64,
    height: f64,
    top_comments: Vec<String>,
    elements: Vec<Group>,
}

impl SvgBuilder {
    fn new(config: &ExportConfig, width: f64, height: f64) -> Self {
        Self {
            config: config.clone(),
            width,
            height,
            top_comments: Vec::new(),
            elements: Vec::new(),
        }
    }

    fn add_comment(&mut self, text: &str) {
        self.top_comments.push(text.to_string());
    }

    fn add_background(&mut self) {
        let rect = Rectangle::new()
            .set("width", num(self.width))
            .set("height", num(self.height))
            .set("fill", self.config.background_color.to_hex());
        self.elements.push(Group::new().add(rect));
    }

    fn add_title(&mut self, title: &str) {
        let text = self
            .text(self.width / 2.0, self.config.font_size + 10.0, title, self.config.font_size + 4.0)
            .set("text-anchor", "middle")
            .set("font-weight", "bold");
        self.elements.push(Group::new().add(text));
    }

    fn text(&self, x: f64, y: f64, content: &str, size: f64) -> Text {
        Text::new()
            .set("x", num(x))
            .set("y", num(y))
            .set("font-family", self.config.font_family.as_str())
            .set("font-size", format!("{}px", num(size)))
            .add(TextNode::new(content))
    }

    fn render_axes(&mut self, ax: &Axes) {
        let mut group = Group::new();
        let mut artists: Vec<&Artist> = ax.artists.iter().collect();
        artists.sort_by(|a, b| a.zorder().total_cmp(&b.zorder()));
        for artist in artists {
            group = match artist {
                Artist::Line { xs, ys, style } => {
                    let points: Vec<(f64, f64)> = xs.iter().zip(ys).map(|(&x, &y)| ax.data_to_px(x, y)).collect();
                    match polyline(&points) {
                        Some(data) => group.add(stroke(SvgPath::new().set("d", data).set("fill", "none"), style)),
                        None => group,
                    }
                }
                Artist::Span { alpha, .. } if *alpha <= 0.0 => group,
                Artist::Span { axis, lo, hi, extent, fill, alpha, .. } => {
                    let outline = span_outline(ax, *axis, *lo, *hi, *extent);
                    match polygon(&outline) {
                        Some(data) => group.add(
                            SvgPath::new()
                                .set("d", data)
                                .set("fill", fill.to_hex())
                                .set("fill-opacity", num(*alpha))
                                .set("fill-rule", "evenodd")
                                .set("stroke", "none"),
                        ),
                        None => group,
                    }
                }
                Artist::AxLine { axis, at, style } => match axis_line(ax, *axis, *at) {
                    AxisLine::Segment(a, b) => group.add(stroke(line(a, b), style)),
                    AxisLine::Circle(cx, cy, r) => group.add(stroke(
                        Circle::new().set("cx", num(cx)).set("cy", num(cy)).set("r", num(r)).set("fill", "none"),
                        style,
                    )),
                },
                Artist::Text { x, y, text, style } => {
                    let (px, py) = ax.data_to_px(*x, *y);
                    group.add(self.styled_text(px, py, text, style))
                }
                Artist::Marker { x, y, size, color, alpha, .. } => {
                    let (px, py) = ax.data_to_px(*x, *y);
                    group.add(
                        Circle::new()
                            .set("cx", num(px))
                            .set("cy", num(py))
                            .set("r", num(*size))
                            .set("fill", color.to_hex())
                            .set("fill-opacity", num(*alpha)),
                    )
                }
                Artist::Rect { x, y, width, height, fill, .. } => {
                    let outline = rect_outline(ax, *x, *y, *width, *height);
                    match polygon(&outline) {
                        Some(data) => group.add(SvgPath::new().set("d", data).set("fill", fill.to_hex())),
                        None => group,
                    }
                }
                Artist::Arrow { from, to, style } => {
                    let a = ax.data_to_px(from.0, from.1);
                    let b = ax.data_to_px(to.0, to.1);
                    let mut g = group.add(stroke(line(a, b), style));
                    for head in [arrow_head(b, a, 6.0), arrow_head(a, b, 6.0)] {
                        if let Some(data) = polygon(&head) {
                            g = g.add(SvgPath::new().set("d", data).set("fill", style.color.to_hex()));
                        }
                    }
                    g
                }
            };
        }
        if ax.axis_visible && !ax.is_polar() {
            group = self.add_axis_decorations(group, ax);
        }
        self.elements.push(group);
    }

    fn styled_text(&self, x: f64, y: f64, content: &str, style: &TextStyle) -> Text {
        let anchor = match style.ha {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        let baseline = match style.va {
            TextVAlign::Top => "hanging",
            TextVAlign::Center => "middle",
            TextVAlign::Bottom => "text-after-edge",
            TextVAlign::Baseline => "alphabetic",
        };
        let mut text = self
            .text(x, y, content, style.font_size.unwrap_or(self.config.font_size))
            .set("text-anchor", anchor)
            .set("dominant-baseline", baseline)
            .set("fill", style.color.to_hex());
        if style.rotation != 0.0 {
            // svg rotates clockwise
            text = text.set("transform", format!("rotate({} {} {})", num(-style.rotation), num(x), num(y)));
        }
        text
    }

    fn add_axis_decorations(&self, group: Group, ax: &Axes) -> Group {
        let (bx, by, bw, bh) = ax.px_box();
        let bottom = by + bh;
        let black = LineStyle::new(Color::BLACK, 1.0);
        let small = (self.config.font_size - 2.0).max(6.0);
        let mut group = group
            .add(stroke(line((bx, bottom), (bx + bw, bottom)), &black))
            .add(stroke(line((bx, by), (bx, bottom)), &black));

        let (x0, x1) = ax.view_xlim();
        for w in nice_ticks_world(x0.min(x1), x0.max(x1), 6) {
            let (x, _) = ax.data_to_px(w, 0.0);
            group = group
                .add(stroke(line((x, bottom), (x, bottom + 5.0)), &black))
                .add(self.text(x, bottom + 16.0, &format_bp(w), small).set("text-anchor", "middle"));
        }
        let (y0, y1) = ax.view_ylim();
        for w in nice_ticks_world(y0.min(y1), y0.max(y1), 5) {
            let (_, y) = ax.data_to_px(x0, w);
            group = group
                .add(stroke(line((bx - 5.0, y), (bx, y)), &black))
                .add(
                    self.text(bx - 8.0, y, &num(w), small)
                        .set("text-anchor", "end")
                        .set("dominant-baseline", "middle"),
                );
        }
        if let Some(xlabel) = &ax.xlabel {
            group = group.add(
                self.text(bx + bw / 2.0, bottom + 32.0, xlabel, self.config.font_size).set("text-anchor", "middle"),
            );
        }
        if let Some(ylabel) = &ax.ylabel {
            let (x, y) = (bx - 40.0, by + bh / 2.0);
            group = group.add(
                self.text(x, y, ylabel, self.config.font_size)
                    .set("text-anchor", "middle")
                    .set("transform", format!("rotate(-90 {} {})", num(x), num(y))),
            );
        }
        if let Some(title) = &ax.title {
            group = group.add(self.text(bx + bw / 2.0, by - 8.0, title, self.config.font_size).set("text-anchor", "middle"));
        }
        group
    }

    fn add_connectors(&mut self, figure: &Figure) {
        let mut group = Group::new();
        for connector in &figure.connectors {
            let from = figure.data_to_px(connector.from.0, connector.from.1, connector.from.2);
            let to = figure.data_to_px(connector.to.0, connector.to.1, connector.to.2);
            if let (Ok(a), Ok(b)) = (from, to) {
                group = group.add(stroke(line(a, b), &connector.style));
            }
        }
        self.elements.push(group);
    }

    fn add_legend(&mut self, figure: &Figure) {
        let entries: Vec<_> = figure.axes.iter().flat_map(|ax| ax.legend.iter()).collect();
        if entries.is_empty() {
            return;
        }
        let legend_x = self.width - 150.0;
        let legend_y = 50.0;
        let mut group = Group::new().add(
            Rectangle::new()
                .set("x", num(legend_x))
                .set("y", num(legend_y))
                .set("width", "130")
                .set("height", num(entries.len() as f64 * 25.0 + 10.0))
                .set("fill", "white")
                .set("stroke", "black")
                .set("stroke-width", "1")
                .set("fill-opacity", "0.9"),
        );
        for (i, entry) in entries.iter().enumerate() {
            let y = legend_y + 20.0 + i as f64 * 25.0;
            group = group
                .add(
                    Circle::new()
                        .set("cx", num(legend_x + 15.0))
                        .set("cy", num(y))
                        .set("r", "5")
                        .set("fill", entry.color.to_hex()),
                )
                .add(
                    self.text(legend_x + 30.0, y, &entry.label, self.config.font_size)
                        .set("dominant-baseline", "middle"),
                );
        }
        self.elements.push(group);
    }

    fn add_footer(&mut self, figure: &Figure) {
        let footer_text = format!(
            "chrov v{} | {} axes | Generated: {}",
            chrov_core::VERSION,
            figure.axes.len(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let text = self
            .text(10.0, self.height - 10.0, &footer_text, (self.config.font_size - 2.0).max(6.0))
            .set("fill", "gray");
        self.elements.push(Group::new().add(text));
    }

    fn finish(self) -> Document {
        let mut doc = Document::new()
            .set("width", num(self.width))
            .set("height", num(self.height))
            .set("viewBox", format!("0 0 {} {}", num(self.width), num(self.height)));
        for comment in &self.top_comments {
            for line in comment.lines() {
                doc = doc.add(Comment::new(format!(" {} ", line)));
            }
        }
        for element in self.elements {
            doc = doc.add(element);
        }
        doc
    }
}

// Fixed precision keeps the output stable across platforms
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn line(a: (f64, f64), b: (f64, f64)) -> Line {
    Line::new()
        .set("x1", num(a.0))
        .set("y1", num(a.1))
        .set("x2", num(b.0))
        .set("y2", num(b.1))
}

fn stroke<T: svg::Node>(node: T, style: &LineStyle) -> T {
    let mut node = node;
    node.assign("stroke", style.color.to_hex());
    node.assign("stroke-width", num(style.width));
    node.assign("stroke-linecap", style.cap.as_svg());
    if style.alpha < 1.0 {
        node.assign("stroke-opacity", num(style.alpha));
    }
    node
}

fn polyline(points: &[(f64, f64)]) -> Option<Data> {
    let (first, rest) = points.split_first()?;
    let data = Data::new().move_to(pt(*first));
    let data = rest.iter().fold(data, |d, &p| d.line_to(pt(p)));
    Some(if rest.is_empty() { data.line_to(pt(*first)) } else { data })
}

fn polygon(points: &[(f64, f64)]) -> Option<Data> {
    let (first, rest) = points.split_first()?;
    let data = Data::new().move_to(pt(*first));
    Some(rest.iter().fold(data, |d, &p| d.line_to(pt(p))).close())
}

fn pt(p: (f64, f64)) -> (f32, f32) {
    ((p.0 * 100.0).round() as f32 / 100.0, (p.1 * 100.0).round() as f32 / 100.0)
}

// Centre, radius, offset and direction of a polar axes in pixels
fn polar_frame(ax: &Axes) -> Option<((f64, f64), f64, f64, f64)> {
    match ax.projection {
        Projection::Polar { theta_offset, theta_direction } => {
            let (bx, by, bw, bh) = ax.px_box();
            Some(((bx + bw / 2.0, by + bh / 2.0), bw.min(bh) / 2.0, theta_offset, theta_direction))
        }
        Projection::Linear => None,
    }
}

fn radius_fraction(ax: &Axes, r: f64) -> f64 {
    let (r0, r1) = ax.view_ylim();
    if r1 - r0 == 0.0 {
        0.5
    } else {
        (r - r0) / (r1 - r0)
    }
}

// Closed outline of the sector between two angles and two radius fractions
fn sector(ax: &Axes, t0: f64, t1: f64, f0: f64, f1: f64) -> Vec<(f64, f64)> {
    let Some(((cx, cy), radius, offset, direction)) = polar_frame(ax) else {
        return Vec::new();
    };
    let steps = (((t1 - t0).abs() / (2.0 * PI)) * ARC_SAMPLES).ceil().max(1.0) as usize;
    let at = |t: f64, f: f64| {
        let phi = offset + direction * t;
        (cx + f * radius * phi.cos(), cy - f * radius * phi.sin())
    };
    let mut points: Vec<(f64, f64)> = (0..=steps).map(|i| at(t0 + (t1 - t0) * i as f64 / steps as f64, f1)).collect();
    points.extend((0..=steps).rev().map(|i| at(t0 + (t1 - t0) * i as f64 / steps as f64, f0)));
    points
}

fn span_outline(ax: &Axes, axis: SpanAxis, lo: f64, hi: f64, extent: (f64, f64)) -> Vec<(f64, f64)> {
    let (bx, by, bw, bh) = ax.px_box();
    match (axis, ax.is_polar()) {
        (SpanAxis::Vertical, false) => {
            let (x0, _) = ax.data_to_px(lo, 0.0);
            let (x1, _) = ax.data_to_px(hi, 0.0);
            let (y0, y1) = (by + (1.0 - extent.0) * bh, by + (1.0 - extent.1) * bh);
            vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
        }
        (SpanAxis::Horizontal, false) => {
            let (_, y0) = ax.data_to_px(0.0, lo);
            let (_, y1) = ax.data_to_px(0.0, hi);
            let (x0, x1) = (bx + extent.0 * bw, bx + extent.1 * bw);
            vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
        }
        (SpanAxis::Vertical, true) => sector(ax, lo, hi, extent.0, extent.1),
        (SpanAxis::Horizontal, true) => {
            sector(ax, 0.0, 2.0 * PI, radius_fraction(ax, lo), radius_fraction(ax, hi))
        }
    }
}

fn rect_outline(ax: &Axes, x: f64, y: f64, width: f64, height: f64) -> Vec<(f64, f64)> {
    if ax.is_polar() {
        sector(ax, x, x + width, radius_fraction(ax, y), radius_fraction(ax, y + height))
    } else {
        [(x, y), (x + width, y), (x + width, y + height), (x, y + height)]
            .iter()
            .map(|&(px, py)| ax.data_to_px(px, py))
            .collect()
    }
}

enum AxisLine {
    Segment((f64, f64), (f64, f64)),
    Circle(f64, f64, f64),
}

fn axis_line(ax: &Axes, axis: SpanAxis, at: f64) -> AxisLine {
    let (bx, by, bw, bh) = ax.px_box();
    match (axis, polar_frame(ax)) {
        (SpanAxis::Vertical, None) => {
            let (x, _) = ax.data_to_px(at, 0.0);
            AxisLine::Segment((x, by), (x, by + bh))
        }
        (SpanAxis::Horizontal, None) => {
            let (_, y) = ax.data_to_px(0.0, at);
            AxisLine::Segment((bx, y), (bx + bw, y))
        }
        (SpanAxis::Vertical, Some(((cx, cy), radius, offset, direction))) => {
            let phi = offset + direction * at;
            AxisLine::Segment((cx, cy), (cx + radius * phi.cos(), cy - radius * phi.sin()))
        }
        (SpanAxis::Horizontal, Some(((cx, cy), radius, _, _))) => {
            AxisLine::Circle(cx, cy, radius_fraction(ax, at) * radius)
        }
    }
}

// Triangle with its tip at `tip`, pointing away from `from`
fn arrow_head(from: (f64, f64), tip: (f64, f64), size: f64) -> Vec<(f64, f64)> {
    let (dx, dy) = (tip.0 - from.0, tip.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return Vec::new();
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = (tip.0 - ux * size, tip.1 - uy * size);
    let half = size / 2.0;
    vec![tip, (base.0 - uy * half, base.1 + ux * half), (base.0 + uy * half, base.1 - ux * half)]
}

// Format a basepair coordinate in human-friendly units
fn format_bp(bp: f64) -> String {
    let abs = bp.abs();
    if abs >= 1e9 {
        format!("{:.2} Gb", bp / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} Mb", bp / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2} kb", bp / 1e3)
    } else {
        num(bp)
    }
}

// Round a length to a "nice" number: 2, 5 or 10 × 10^k
fn nice_round_length(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    let exp = x.log10().floor();
    let base = 10f64.powf(exp);
    let mant = x / base;
    let nice = if mant < 2.0 {
        2.0
    } else if mant < 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

// Nice tick positions in data units
fn nice_ticks_world(min_world: f64, max_world: f64, desired: usize) -> Vec<f64> {
    let span = max_world - min_world;
    if !(span > 0.0) || !span.is_finite() {
        return Vec::new();
    }
    let step = nice_round_length(span / desired as f64);
    let mut ticks = Vec::new();
    let mut v = (min_world / step).ceil() * step;
    while v <= max_world {
        ticks.push(v);
        v += step;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AxesRect, LegendEntry};

    fn figure() -> Figure {
        let mut fig = Figure::new(400.0, 300.0);
        let id = fig.add_axes(AxesRect::default(), Projection::Linear);
        let ax = fig.axes_mut(id).unwrap();
        ax.set_xlim(0.0, 1000.0);
        ax.set_ylim(0.0, 1.0);
        ax.push(Artist::Line { xs: vec![0.0, 500.0], ys: vec![0.5, 0.5], style: LineStyle::new(Color::BLACK, 10.0) });
        ax.push(Artist::Text { x: 250.0, y: 0.8, text: "GENE".into(), style: TextStyle::default().rotation(90.0) });
        fig
    }

    fn quiet() -> ExportConfig {
        ExportConfig { show_footer: false, ..ExportConfig::default() }
    }

    #[test]
    fn test_svg_contains_artists() {
        let svg = SvgExporter::new(quiet()).to_svg_string(&figure());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("GENE"));
        assert!(svg.contains("rotate(-90"));
        assert!(svg.contains(r#"stroke-width="10""#));
        assert!(!svg.contains("Generated"));
    }

    #[test]
    fn test_footer_and_comment() {
        let config = ExportConfig { provenance_comment: Some("cytobands: hg38".into()), ..ExportConfig::default() };
        let svg = SvgExporter::new(config).to_svg_string(&figure());
        assert!(svg.contains("cytobands: hg38"));
        assert!(svg.contains("chrov v"));
    }

    #[test]
    fn test_transparent_spans_are_skipped() {
        let mut fig = Figure::new(400.0, 300.0);
        let id = fig.add_axes(AxesRect::default(), Projection::karyotype_polar());
        let ax = fig.axes_mut(id).unwrap();
        for (i, alpha) in [0.0, 1.0].into_iter().enumerate() {
            ax.push(Artist::Span {
                axis: SpanAxis::Vertical,
                lo: i as f64,
                hi: i as f64 + 1.0,
                extent: (0.0, 1.0),
                fill: Color::GAINSBORO,
                alpha,
                zorder: -1.0,
            });
        }
        let svg = SvgExporter::new(quiet()).to_svg_string(&fig);
        assert_eq!(svg.matches("#dcdcdc").count(), 1);
    }

    #[test]
    fn test_legend_entries() {
        let mut fig = figure();
        fig.axes[0].legend.push(LegendEntry { label: "exon".into(), color: Color::rgb(0x1f, 0x77, 0xb4) });
        let svg = SvgExporter::new(quiet()).to_svg_string(&fig);
        assert!(svg.contains("exon"));
        assert!(svg.contains("#1f77b4"));
    }

    #[test]
    fn test_export_to_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("figure.svg");
        SvgExporter::new(quiet()).export_svg(&path, &figure())?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("GENE"));
        Ok(())
    }

    #[test]
    fn test_helpers() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(2.346), "2.35");
        assert_eq!(format_bp(2_500_000.0), "2.50 Mb");
        assert_eq!(nice_ticks_world(0.0, 1000.0, 5), vec![0.0, 500.0, 1000.0]);
        assert!(nice_ticks_world(1.0, 1.0, 5).is_empty());
    }
}
