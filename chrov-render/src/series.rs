//! Data series drawn next to the chromosomes: stems, scatter, lines and
//! heatmap strips.

use chrov_core::rescale::min_max;
use chrov_core::{to_polar, AngularRange, ChrovError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::color::Colormap;
use crate::config::SeriesConfig;
use crate::scene::{Artist, Axes, AxesId, AxesRect, Figure, HAlign, LineStyle, Projection, TextStyle, TextVAlign};
use crate::surface::{PolarSurface, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Stem,
    Scatter,
    Line,
}

impl FromStr for SeriesKind {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stem" => Ok(SeriesKind::Stem),
            "scatter" | "scatterplot" => Ok(SeriesKind::Scatter),
            "line" | "lineplot" => Ok(SeriesKind::Line),
            other => Err(ChrovError::config(format!("unknown series kind: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

impl SeriesPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Plot a data series.
///
/// On polar axes x is mapped from `range1` onto `angular`. Returns the
/// points in axes coordinates, in input order.
pub fn plot_series(
    ax: &mut Axes,
    points: &[SeriesPoint],
    config: &SeriesConfig,
    range1: (f64, f64),
    angular: AngularRange,
) -> Result<Vec<SeriesPoint>> {
    if points.is_empty() {
        return Err(ChrovError::invalid_data("no data points to plot"));
    }
    let polar = ax.is_polar();
    let raw_xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let xs = if polar {
        to_polar(&raw_xs, Some(range1), Some(angular.as_tuple()), None)?
    } else {
        raw_xs
    };
    let mapped: Vec<SeriesPoint> = xs.iter().zip(points).map(|(&x, p)| SeriesPoint::new(x, p.y)).collect();
    let ys: Vec<f64> = mapped.iter().map(|p| p.y).collect();
    let (ymin, ymax) = min_max(&ys).unwrap_or((0.0, 1.0));

    let marker = |p: &SeriesPoint| Artist::Marker {
        x: p.x,
        y: p.y,
        size: config.marker_size,
        color: config.color,
        alpha: 1.0,
        zorder: 2.0,
    };
    match config.kind {
        SeriesKind::Stem => {
            let base = config.bottom.unwrap_or(0.0);
            for p in &mapped {
                ax.push(Artist::Line {
                    xs: vec![p.x, p.x],
                    ys: vec![base, p.y],
                    style: LineStyle::new(config.color, config.lw),
                });
                ax.push(marker(p));
            }
        }
        SeriesKind::Scatter => mapped.iter().for_each(|p| ax.push(marker(p))),
        SeriesKind::Line => {
            let mut sorted = mapped.clone();
            sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
            ax.push(Artist::Line {
                xs: sorted.iter().map(|p| p.x).collect(),
                ys: sorted.iter().map(|p| p.y).collect(),
                style: LineStyle::new(config.color, config.lw),
            });
        }
    }

    if polar {
        let rmax = ax.view_ylim().1;
        // r labels sit opposite the start of a half-or-more circle that begins at zero
        let position: f64 = if angular.start == 0.0 && angular.span() >= std::f64::consts::PI { 180.0 } else { 0.0 };
        if let Some(ylabel) = config.ylabel.as_deref() {
            let rotation = if position == 180.0 { 0.0 } else { position };
            ax.push(Artist::Text {
                x: position.to_radians(),
                y: rmax / 2.0,
                text: ylabel.to_string(),
                style: TextStyle::aligned(HAlign::Center, TextVAlign::Top).rotation(rotation),
            });
        }
        ax.ylabel = None;
        PolarSurface::new(ax).set_xlim(angular.start, angular.end);
    } else {
        ax.ylabel = config.ylabel.clone();
        if config.kind == SeriesKind::Stem {
            ax.set_ylim(config.bottom.unwrap_or(ymin), ymax);
        }
        if let Some((x0, x1)) = min_max(&xs) {
            let margin = (x1 - x0) * 0.01;
            ax.set_xlim(x0 - margin, x1 + margin);
        }
    }
    debug!("plotted {} points as {:?}", mapped.len(), config.kind);
    Ok(mapped)
}

/// One row of a heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStrip {
    pub name: String,
    pub values: Vec<f64>,
    pub colormap: Colormap,
}

/// Stack one axes per strip inside `rect`, each value a colored cell.
///
/// Cell labels are written under the last strip when there are at most 20.
pub fn heatmap_strips(fig: &mut Figure, labels: &[String], strips: &[HeatmapStrip], rect: AxesRect) -> Result<Vec<AxesId>> {
    if strips.is_empty() {
        return Err(ChrovError::invalid_data("no heatmap strips to plot"));
    }
    let height = rect.height / strips.len() as f64;
    let mut ids = Vec::with_capacity(strips.len());
    for (i, strip) in strips.iter().enumerate() {
        if strip.values.len() != labels.len() {
            return Err(ChrovError::invalid_data(format!(
                "strip {} has {} values for {} labels",
                strip.name,
                strip.values.len(),
                labels.len()
            )));
        }
        let bottom = rect.top() - height * (i + 1) as f64;
        let id = fig.add_axes(AxesRect::new(rect.left, bottom, rect.width, height), Projection::Linear);
        let ax = fig.axes_mut(id)?;
        let (lo, hi) = min_max(&strip.values).unwrap_or((0.0, 1.0));
        for (j, &value) in strip.values.iter().enumerate() {
            let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
            ax.push(Artist::Rect {
                x: j as f64,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                fill: strip.colormap.at(t),
                zorder: 1.0,
            });
        }
        let n = labels.len() as f64;
        ax.set_xlim(0.0, n);
        ax.set_ylim(0.0, 1.0);
        ax.axis_visible = false;
        // color bar label
        ax.push(Artist::Text {
            x: n + 0.5,
            y: 0.5,
            text: strip.name.clone(),
            style: TextStyle::aligned(HAlign::Left, TextVAlign::Center),
        });
        if i == strips.len() - 1 && labels.len() <= 20 {
            for (j, label) in labels.iter().enumerate() {
                ax.push(Artist::Text {
                    x: j as f64 + 0.5,
                    y: -0.1,
                    text: label.clone(),
                    style: TextStyle::aligned(HAlign::Right, TextVAlign::Center).rotation(90.0),
                });
            }
        }
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::f64::consts::PI;

    fn points() -> Vec<SeriesPoint> {
        vec![SeriesPoint::new(1.0, 2.0), SeriesPoint::new(50.0, 5.0), SeriesPoint::new(100.0, 1.0)]
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("scatterplot".parse::<SeriesKind>().unwrap(), SeriesKind::Scatter);
        assert_eq!("line".parse::<SeriesKind>().unwrap(), SeriesKind::Line);
        assert!("violin".parse::<SeriesKind>().unwrap_err().is_config());
    }

    #[test]
    fn test_linear_stem() {
        let mut ax = Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0));
        let config = SeriesConfig { ylabel: Some("score".into()), ..SeriesConfig::default() };
        let out = plot_series(&mut ax, &points(), &config, (1.0, 100.0), AngularRange::default()).unwrap();
        assert_eq!(out, points());
        assert_eq!(ax.lines().count(), 3);
        assert_eq!(ax.ylim, Some((1.0, 5.0)));
        let (x0, x1) = ax.xlim.unwrap();
        assert!((x0 - 0.01).abs() < 1e-9 && (x1 - 100.99).abs() < 1e-9);
        assert_eq!(ax.ylabel.as_deref(), Some("score"));
    }

    #[test]
    fn test_stem_bottom_overrides_lower_limit() {
        let mut ax = Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0));
        let config = SeriesConfig { bottom: Some(-1.0), ..SeriesConfig::default() };
        plot_series(&mut ax, &points(), &config, (1.0, 100.0), AngularRange::default()).unwrap();
        assert_eq!(ax.ylim, Some((-1.0, 5.0)));
        let (_, ys, _) = ax.lines().next().unwrap();
        assert_eq!(ys, &[-1.0, 2.0]);
    }

    #[test]
    fn test_polar_maps_to_angles() {
        let mut ax = Axes::new(AxesRect::default(), Projection::karyotype_polar(), (800.0, 600.0));
        let config = SeriesConfig { kind: SeriesKind::Scatter, ..SeriesConfig::default() };
        let out = plot_series(&mut ax, &points(), &config, (1.0, 100.0), AngularRange::default()).unwrap();
        assert_eq!(out[0].x, 0.0);
        assert!((out[2].x - 2.0 * PI).abs() < 1e-12);
        assert_eq!(ax.xlim, Some((0.0, 2.0 * PI)));
        assert!(ax.ylabel.is_none());
    }

    #[test]
    fn test_empty_series_is_error() {
        let mut ax = Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0));
        let err = plot_series(&mut ax, &[], &SeriesConfig::default(), (0.0, 1.0), AngularRange::default()).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_heatmap_strips() {
        let mut fig = Figure::default();
        let labels: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let strips = vec![
            HeatmapStrip { name: "expr".into(), values: vec![0.0, 1.0, 2.0], colormap: Colormap::Greys },
            HeatmapStrip { name: "cnv".into(), values: vec![1.0, 1.0, 1.0], colormap: Colormap::Reds },
        ];
        let ids = heatmap_strips(&mut fig, &labels, &strips, AxesRect::default()).unwrap();
        assert_eq!(ids.len(), 2);
        let first = fig.axes(ids[0]).unwrap();
        assert!(first.artists.contains(&Artist::Rect {
            x: 2.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            fill: Color::BLACK,
            zorder: 1.0,
        }));
        assert_eq!(fig.axes(ids[1]).unwrap().texts().count(), 4);

        let bad = vec![HeatmapStrip { name: "x".into(), values: vec![1.0], colormap: Colormap::Viridis }];
        assert!(heatmap_strips(&mut fig, &labels, &bad, AxesRect::default()).is_err());
    }
}
