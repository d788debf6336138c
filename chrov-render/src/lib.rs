/*!
# chrov Rendering

Karyotype plots built on a backend-neutral scene model.

## Architecture

1. **Scene**: figures hold axes in figure fractions; axes hold artists in
   data coordinates, either linear or polar.
2. **Surfaces**: renderers draw through a [`surface::Surface`] chosen once
   per axes, so the same code draws straight and circular karyotypes.
3. **Renderers**: chromosome arms and whole genomes ([`chrom`]), labels with
   elbow connectors ([`annot`]), data series ([`series`]), ranges
   ([`ranges`]) and the composed figure ([`figure`]).
4. **Export**: [`vector_export::SvgExporter`] writes the scene as SVG.
*/

pub mod annot;
pub mod chrom;
pub mod color;
pub mod config;
pub mod figure;
pub mod ranges;
pub mod scene;
pub mod series;
pub mod surface;
pub mod vector_export;

pub use annot::{annot_labels, show_segments, windows, LabelAnchor, LabelLoc, LabelPoint, Segment, SegmentKind};
pub use chrom::{add_axes, annot_chroms, plot_arm, plot_chrom, plot_chroms, ChromPlacement, ChromsLayout, VAlign};
pub use color::{Color, Colormap};
pub use config::{
    AddAxesConfig, ArmConfig, ChromsConfig, FigureConfig, LabelConfig, PiRange, RangesConfig, RenderConfig,
    SeriesConfig,
};
pub use figure::{plot_with_chroms, plot_with_genome, FigureAxes, XKind};
pub use ranges::{plot_ranges, GenomicRange, RangesKind};
pub use scene::{Artist, Axes, AxesId, AxesRect, Figure, Projection};
pub use series::{heatmap_strips, plot_series, HeatmapStrip, SeriesKind, SeriesPoint};
pub use surface::{surface_for, CoordMap, LinearSurface, PolarSurface, Surface};
pub use vector_export::{ExportConfig, SvgExporter};
