//! Genomic ranges (e.g. transcripts or alignments) drawn as rows of
//! horizontal bars, optionally under a cytoband arm.

use chrov_core::{ChrovError, Cytoband, GenomicPos, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::chrom::plot_arm;
use crate::color::{ncolors, PALETTE};
use crate::config::{ArmConfig, RangesConfig};
use crate::scene::{Artist, Axes, CapStyle, HAlign, LegendEntry, LineStyle, TextStyle, TextVAlign};
use crate::surface::CoordMap;

/// Row assignment of ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangesKind {
    /// One row per range; ids must be unique
    #[default]
    Split,
    /// Ranges sharing an id share a row
    Joined,
}

impl FromStr for RangesKind {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "split" => Ok(RangesKind::Split),
            "joined" => Ok(RangesKind::Joined),
            other => Err(ChrovError::config(format!("unknown ranges kind: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomicRange {
    pub id: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    /// Category used for coloring
    #[serde(default)]
    pub hue: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl GenomicRange {
    pub fn new<S: Into<String>>(id: S, start: GenomicPos, end: GenomicPos) -> Self {
        Self { id: id.into(), start, end, hue: None, label: None }
    }

    pub fn with_hue<S: Into<String>>(mut self, hue: S) -> Self {
        self.hue = Some(hue.into());
        self
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Plot ranges trimmed to the configured window. Returns the y row of each
/// drawn range, in input order (trimmed-away ranges are absent).
pub fn plot_ranges(
    ax: &mut Axes,
    ranges: &[GenomicRange],
    config: &RangesConfig,
    cytobands: Option<&[Cytoband]>,
) -> Result<Vec<(String, f64)>> {
    if ranges.is_empty() {
        return Err(ChrovError::invalid_data("no ranges to plot"));
    }
    if let Some(r) = ranges.iter().find(|r| r.end <= r.start) {
        return Err(ChrovError::invalid_data(format!("range {} has end {} <= start {}", r.id, r.end, r.start)));
    }
    let window_end = config.end.unwrap_or_else(|| ranges.iter().map(|r| r.end).max().unwrap_or(config.start));

    let mut rows: HashMap<&str, f64> = HashMap::new();
    if config.kind == RangesKind::Split {
        for (i, r) in ranges.iter().enumerate() {
            if rows.insert(r.id.as_str(), i as f64).is_some() {
                return Err(ChrovError::invalid_data(format!("duplicate range id: {}", r.id)));
            }
        }
    } else {
        for r in ranges {
            let next = rows.len() as f64;
            rows.entry(r.id.as_str()).or_insert(next);
        }
    }

    let mut hues: Vec<&str> = Vec::new();
    for hue in ranges.iter().filter_map(|r| r.hue.as_deref()) {
        if !hues.contains(&hue) {
            hues.push(hue);
        }
    }
    let colors = ncolors(hues.len());
    let color_of = |hue: Option<&str>| {
        hue.and_then(|h| hues.iter().position(|&x| x == h))
            .map_or(PALETTE[0], |i| colors[i])
    };

    let mut drawn = Vec::new();
    let mut labelled: Vec<&str> = Vec::new();
    for r in ranges {
        let start = r.start.max(config.start);
        let end = r.end.min(window_end);
        if end <= start {
            debug!("range {} lies outside {}-{}", r.id, config.start, window_end);
            continue;
        }
        let y = rows.get(r.id.as_str()).copied().unwrap_or(0.0);
        ax.push(Artist::Line {
            xs: vec![start as f64, end as f64],
            ys: vec![y, y],
            style: LineStyle::new(color_of(r.hue.as_deref()), config.lw).cap(CapStyle::Butt),
        });
        if let Some(label) = r.label.as_deref() {
            let x = match config.kind {
                RangesKind::Split => Some(start as f64),
                RangesKind::Joined if !labelled.contains(&r.id.as_str()) => {
                    labelled.push(r.id.as_str());
                    Some(config.start as f64)
                }
                RangesKind::Joined => None,
            };
            if let Some(x) = x {
                ax.push(Artist::Text {
                    x,
                    y,
                    text: format!("{} ", label),
                    style: TextStyle::aligned(HAlign::Right, TextVAlign::Center),
                });
            }
        }
        drawn.push((r.id.clone(), y));
    }

    let max_y = rows.values().copied().fold(0.0, f64::max);
    if let Some(bands) = cytobands {
        let arm = ArmConfig {
            y: config.cytobands_y.unwrap_or(max_y + 1.0),
            lw: config.lw,
            test: true,
            ..ArmConfig::default()
        };
        let bands: Vec<Cytoband> = bands
            .iter()
            .filter(|b| b.end > config.start && b.start < window_end)
            .map(|b| Cytoband { start: b.start.max(config.start), end: b.end.min(window_end), ..b.clone() })
            .collect();
        plot_arm(ax, &bands, &arm, CoordMap::default())?;
    }

    for (hue, color) in hues.iter().zip(&colors) {
        ax.legend.push(LegendEntry { label: hue.to_string(), color: *color });
    }
    ax.set_xlim(config.start as f64, window_end as f64);
    let min_y = rows.values().copied().fold(f64::INFINITY, f64::min);
    let top = config.cytobands_y.map_or(max_y + 1.0, |y| y.max(max_y));
    ax.set_ylim(min_y - 0.5, top + 0.5);
    ax.y_inverted = true;
    ax.xlabel = Some("coordinate (bp)".to_string());
    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AxesRect, Projection};

    fn axes() -> Axes {
        Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0))
    }

    #[test]
    fn test_split_rows_and_trimming() {
        let mut ax = axes();
        let ranges = vec![
            GenomicRange::new("a", 0, 500).with_label("A"),
            GenomicRange::new("b", 400, 900).with_hue("x"),
            GenomicRange::new("c", 2000, 3000),
        ];
        let config = RangesConfig { start: 100, end: Some(1000), ..RangesConfig::default() };
        let drawn = plot_ranges(&mut ax, &ranges, &config, None).unwrap();
        assert_eq!(drawn, vec![("a".to_string(), 0.0), ("b".to_string(), 1.0)]);
        let (xs, _, _) = ax.lines().next().unwrap();
        assert_eq!(xs, &[100.0, 500.0]);
        assert_eq!(ax.texts().next().unwrap(), (100.0, 0.0, "A "));
        assert_eq!(ax.xlim, Some((100.0, 1000.0)));
        assert!(ax.y_inverted);
        assert_eq!(ax.legend.len(), 1);
        assert_eq!(ax.xlabel.as_deref(), Some("coordinate (bp)"));
    }

    #[test]
    fn test_split_rejects_duplicate_ids() {
        let ranges = vec![GenomicRange::new("a", 0, 10), GenomicRange::new("a", 20, 30)];
        let err = plot_ranges(&mut axes(), &ranges, &RangesConfig::default(), None).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_joined_shares_rows() {
        let mut ax = axes();
        let ranges = vec![
            GenomicRange::new("t1", 0, 10).with_label("T1"),
            GenomicRange::new("t2", 5, 15),
            GenomicRange::new("t1", 20, 30).with_label("T1"),
        ];
        let config = RangesConfig { kind: RangesKind::Joined, ..RangesConfig::default() };
        let drawn = plot_ranges(&mut ax, &ranges, &config, None).unwrap();
        let ys: Vec<f64> = drawn.iter().map(|(_, y)| *y).collect();
        assert_eq!(ys, vec![0.0, 1.0, 0.0]);
        assert_eq!(ax.texts().count(), 1);
    }

    #[test]
    fn test_arm_uses_range_width() {
        let mut ax = axes();
        let ranges = vec![GenomicRange::new("a", 0, 100)];
        let bands = vec![Cytoband::new("1", 0, 100, "p11", "gneg")];
        let config = RangesConfig { lw: 4.0, ..RangesConfig::default() };
        plot_ranges(&mut ax, &ranges, &config, Some(&bands)).unwrap();
        let widest = ax.lines().map(|(_, _, style)| style.width).fold(0.0, f64::max);
        // outline stroke is lw + 2
        assert_eq!(widest, 6.0);
    }

    #[test]
    fn test_inverted_range_is_error() {
        let ranges = vec![GenomicRange::new("a", 10, 10)];
        assert!(plot_ranges(&mut axes(), &ranges, &RangesConfig::default(), None).is_err());
    }

    #[test]
    fn test_arm_below_ranges() {
        let mut ax = axes();
        let ranges = vec![GenomicRange::new("a", 0, 100)];
        let bands = vec![
            Cytoband::new("1", 0, 60, "p11", "gneg"),
            Cytoband::new("1", 60, 100, "q11", "gpos25"),
        ];
        plot_ranges(&mut ax, &ranges, &RangesConfig::default(), Some(&bands)).unwrap();
        // the range plus two bands and the two outline strokes
        assert_eq!(ax.lines().count(), 5);
        assert!(ax.axis_visible);
        assert_eq!(ax.ylim, Some((-0.5, 1.5)));
    }
}
