//! Drawing surfaces: one trait, a linear and a polar implementation.
//!
//! Renderers never branch on the projection themselves; they ask the
//! surface to map and place things and the surface decides what that means.

use chrov_core::{to_polar, ChrovError, Result};
use std::f64::consts::PI;

use crate::color::Color;
use crate::scene::{Artist, Axes, LineStyle, Projection, SpanAxis, TextStyle};

/// How genomic x values are carried onto a surface
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordMap {
    /// Source range of the x values
    pub range1: Option<(f64, f64)>,
    /// Target range (angles on polar surfaces)
    pub range2: Option<(f64, f64)>,
    /// Resolution used to densify polar segments
    pub interval: Option<f64>,
}

impl CoordMap {
    pub fn new(range1: (f64, f64), range2: (f64, f64)) -> Self {
        Self { range1: Some(range1), range2: Some(range2), interval: None }
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }
}

pub trait Surface {
    fn axes(&self) -> &Axes;

    fn axes_mut(&mut self) -> &mut Axes;

    fn is_polar(&self) -> bool {
        self.axes().is_polar()
    }

    /// Map the points of a horizontal segment through the projection
    fn rescale_coordinates(&self, xs: &[f64], ys: &[f64], map: &CoordMap) -> Result<(Vec<f64>, Vec<f64>)>;

    fn plot_segment(&mut self, x0: f64, x1: f64, y: f64, style: LineStyle, map: &CoordMap) -> Result<()> {
        let (xs, ys) = self.rescale_coordinates(&[x0, x1], &[y, y], map)?;
        self.axes_mut().push(Artist::Line { xs, ys, style });
        Ok(())
    }

    fn place_text(&mut self, x: f64, y: f64, text: &str, style: TextStyle) {
        self.axes_mut().push(Artist::Text { x, y, text: text.to_string(), style });
    }

    /// Place a label oriented across the chromosome axis
    fn place_label(&mut self, x: f64, y: f64, text: &str, style: TextStyle);

    /// Shade an x interval over the `extent` fraction of the y axis
    fn span(&mut self, lo: f64, hi: f64, extent: (f64, f64), fill: Color, alpha: f64, zorder: f64) {
        self.axes_mut().push(Artist::Span { axis: SpanAxis::Vertical, lo, hi, extent, fill, alpha, zorder });
    }

    fn vline(&mut self, at: f64, style: LineStyle) {
        self.axes_mut().push(Artist::AxLine { axis: SpanAxis::Vertical, at, style });
    }

    fn set_xlim(&mut self, lo: f64, hi: f64);
}

pub struct LinearSurface<'a> {
    axes: &'a mut Axes,
}

impl<'a> LinearSurface<'a> {
    pub fn new(axes: &'a mut Axes) -> Self {
        Self { axes }
    }
}

impl Surface for LinearSurface<'_> {
    fn axes(&self) -> &Axes {
        self.axes
    }

    fn axes_mut(&mut self) -> &mut Axes {
        self.axes
    }

    fn rescale_coordinates(&self, xs: &[f64], ys: &[f64], _map: &CoordMap) -> Result<(Vec<f64>, Vec<f64>)> {
        Ok((xs.to_vec(), ys.to_vec()))
    }

    fn place_label(&mut self, x: f64, y: f64, text: &str, style: TextStyle) {
        self.place_text(x, y, text, style.rotation(90.0));
    }

    fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.axes.set_xlim(lo, hi);
    }
}

pub struct PolarSurface<'a> {
    axes: &'a mut Axes,
}

impl<'a> PolarSurface<'a> {
    pub fn new(axes: &'a mut Axes) -> Self {
        Self { axes }
    }
}

impl Surface for PolarSurface<'_> {
    fn axes(&self) -> &Axes {
        self.axes
    }

    fn axes_mut(&mut self) -> &mut Axes {
        self.axes
    }

    fn rescale_coordinates(&self, xs: &[f64], ys: &[f64], map: &CoordMap) -> Result<(Vec<f64>, Vec<f64>)> {
        let y = match ys.first() {
            Some(&y) if ys.iter().all(|&v| v == y) => y,
            Some(_) => return Err(ChrovError::invalid_data("polar segments must have a constant y")),
            None => return Ok((Vec::new(), Vec::new())),
        };
        let thetas = to_polar(xs, map.range1, map.range2, map.interval)?;
        let ys = vec![y; thetas.len()];
        Ok((thetas, ys))
    }

    fn place_label(&mut self, x: f64, y: f64, text: &str, style: TextStyle) {
        self.place_text(x, y, text, style.rotation(polar_label_rotation(x)));
    }

    fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.axes.projection = Projection::karyotype_polar();
        self.axes.set_xlim(lo, hi);
    }
}

/// Wrap an axes in the surface matching its projection
pub fn surface_for(axes: &mut Axes) -> Box<dyn Surface + '_> {
    if axes.is_polar() {
        Box::new(PolarSurface::new(axes))
    } else {
        Box::new(LinearSurface::new(axes))
    }
}

/// Text rotation in degrees for a radial label at `angle` radians, keeping
/// labels readable on a clockwise circle that starts at west
pub fn polar_label_rotation(angle: f64) -> f64 {
    let r = angle.to_degrees();
    if angle <= PI / 2.0 {
        r + 180.0 + 2.0 * (r - 90.0).abs()
    } else if angle < 3.0 * PI / 2.0 {
        r - 2.0 * (r - 90.0).abs()
    } else {
        r + 180.0 - 2.0 * (r - 270.0).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AxesRect, Figure};

    fn rotation_mod(angle: f64) -> f64 {
        polar_label_rotation(angle).rem_euclid(360.0)
    }

    #[test]
    fn test_rotation_is_radial() {
        // west and east read horizontally, top and bottom vertically
        assert!((rotation_mod(0.0) - 0.0).abs() < 1e-9);
        assert!((rotation_mod(PI / 2.0) - 270.0).abs() < 1e-9);
        assert!((rotation_mod(PI) - 0.0).abs() < 1e-9);
        assert!((rotation_mod(3.0 * PI / 2.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_segment_is_densified() {
        let mut fig = Figure::default();
        let id = fig.add_axes(AxesRect::default(), Projection::karyotype_polar());
        let mut surface = surface_for(fig.axes_mut(id).unwrap());
        assert!(surface.is_polar());
        let map = CoordMap::new((0.0, 100.0), (0.0, PI)).with_interval(10.0);
        surface.plot_segment(0.0, 100.0, 1.0, LineStyle::new(Color::BLACK, 2.0), &map).unwrap();
        let (xs, ys, _) = surface.axes().lines().next().unwrap();
        assert_eq!(xs.len(), 11);
        assert!((xs[10] - PI).abs() < 1e-9);
        assert!(ys.iter().all(|&y| y == 1.0));
    }

    #[test]
    fn test_polar_rejects_slanted_segment() {
        let mut ax = Axes::new(AxesRect::default(), Projection::karyotype_polar(), (800.0, 600.0));
        let surface = PolarSurface::new(&mut ax);
        let err = surface
            .rescale_coordinates(&[0.0, 1.0], &[0.0, 1.0], &CoordMap::default())
            .unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_linear_label_is_vertical() {
        let mut ax = Axes::new(AxesRect::default(), Projection::Linear, (800.0, 600.0));
        let mut surface = LinearSurface::new(&mut ax);
        surface.place_label(1.0, 0.0, "GENE", TextStyle::default());
        match &ax.artists[0] {
            Artist::Text { style, .. } => assert_eq!(style.rotation, 90.0),
            other => panic!("unexpected artist {:?}", other),
        }
    }
}
