//! Figure composition: a data axes with chromosomes drawn alongside and the
//! labelled loci connected to both.

use chrov_core::rescale::{min_max, rescale_value};
use chrov_core::types::distinct_chromosomes;
use chrov_core::{ChrovError, Cytoband, Locus, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::annot::{annot_labels, LabelAnchor, LabelPoint};
use crate::chrom::{annot_chroms, ChromsLayout};
use crate::config::{AddAxesConfig, ChromsConfig, FigureConfig};
use crate::scene::{AxesId, Figure, Projection};
use crate::series::{plot_series, SeriesPoint};

/// What the data x axis represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XKind {
    /// Genomic coordinates, concatenated across chromosomes
    #[default]
    Loci,
    /// Caller supplied x values; labels still point at the genomic coordinate
    Group,
}

impl FromStr for XKind {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "loci" => Ok(XKind::Loci),
            "group" => Ok(XKind::Group),
            other => Err(ChrovError::config(format!("unknown x kind: {:?}", other))),
        }
    }
}

/// Handles produced by [`plot_with_chroms`]
#[derive(Debug, Clone, PartialEq)]
pub struct FigureAxes {
    pub chrom: AxesId,
    pub data: AxesId,
    pub layout: ChromsLayout,
    pub labels: Vec<LabelAnchor>,
}

/// Plot `data` with the chromosomes of `cytobands` drawn next to it and the
/// labelled loci annotated.
///
/// Without `ax_data` a new data axes is added and the loci are drawn as a
/// series (every locus then needs a value). With `ax_data` nothing is drawn
/// on it and the data coordinates are used as is.
pub fn plot_with_chroms(
    fig: &mut Figure,
    data: &[Locus],
    cytobands: &[Cytoband],
    config: &FigureConfig,
    ax_data: Option<AxesId>,
) -> Result<FigureAxes> {
    if data.is_empty() {
        return Err(ChrovError::invalid_data("no loci to plot"));
    }
    let bands: Vec<Cytoband> = if config.show_genome {
        cytobands.to_vec()
    } else {
        let wanted = distinct_chromosomes(data);
        cytobands.iter().filter(|b| wanted.contains(&b.chromosome)).cloned().collect()
    };
    if bands.is_empty() {
        return Err(ChrovError::invalid_data("no cytobands for the chromosomes of the data"));
    }
    let angular = config.angular.to_range()?;

    let created = ax_data.is_none();
    let data_id = match ax_data {
        Some(id) => id,
        None => {
            let projection = if config.arc { Projection::karyotype_polar() } else { Projection::Linear };
            fig.add_axes(config.data_rect, projection)
        }
    };

    let axes_config = AddAxesConfig { arc: Some(config.arc), ..config.add_axes.clone() };
    let chroms_config = ChromsConfig { angular: config.angular.clone(), ..config.chroms.clone() };
    let (chrom_id, layout) = annot_chroms(fig, &bands, None, Some(data_id), config.chrom_y, &axes_config, &chroms_config)?;
    fig.axes_mut(chrom_id)?.set_ylim(-0.6, 0.1);

    let placed = layout.genome.place_known(data)?;
    if placed.len() < data.len() {
        debug!("{} loci lie on chromosomes without cytobands", data.len() - placed.len());
    }

    let genome_extent = (
        layout.chromosomes.iter().map(|c| c.start).fold(f64::INFINITY, f64::min),
        layout.chromosomes.iter().map(|c| c.end).fold(f64::NEG_INFINITY, f64::max),
    );
    let chrom_polar = fig.axes(chrom_id)?.is_polar();
    let to_chrom_x = |global: f64| {
        if chrom_polar {
            rescale_value(global, genome_extent, angular.as_tuple())
        } else {
            global
        }
    };

    let mut xs = Vec::with_capacity(placed.len());
    for p in &placed {
        let x = match config.xkind {
            XKind::Loci => p.start as f64,
            XKind::Group => p.row.x.ok_or_else(|| {
                ChrovError::invalid_data(format!("locus {}:{} has no x value", p.row.chromosome, p.row.start))
            })?,
        };
        xs.push(x);
    }

    let mut ys: Vec<Option<f64>> = placed.iter().map(|p| p.row.value).collect();
    if created {
        let points = placed
            .iter()
            .zip(&xs)
            .map(|(p, &x)| {
                let y = p.row.value.ok_or_else(|| {
                    ChrovError::invalid_data(format!("locus {}:{} has no value", p.row.chromosome, p.row.start))
                })?;
                Ok(SeriesPoint::new(x, y))
            })
            .collect::<Result<Vec<_>>>()?;
        let range1 = match config.xkind {
            XKind::Loci => (1.0, layout.genome.total_length() as f64),
            XKind::Group => min_max(&xs).unwrap_or((0.0, 1.0)),
        };
        let mapped = plot_series(fig.axes_mut(data_id)?, &points, &config.series, range1, angular)?;
        xs = mapped.iter().map(|p| p.x).collect();
        ys = mapped.iter().map(|p| Some(p.y)).collect();
    }
    fig.axes_mut(data_id)?.zorder = 1.0;

    let mut points = Vec::new();
    for ((p, &x), &y) in placed.iter().zip(&xs).zip(&ys) {
        let Some(label) = p.row.label.clone() else {
            debug!("skipping unlabelled locus {}:{}", p.row.chromosome, p.row.start);
            continue;
        };
        if let Some(coffy) = config.coffy {
            if !y.is_some_and(|y| y > coffy) {
                continue;
            }
        }
        points.push(LabelPoint { label, x, start: to_chrom_x(p.start as f64), y });
    }
    info!("annotating {} of {} loci", points.len(), data.len());

    let labels = annot_labels(fig, chrom_id, &points, config.chrom_y, &config.labels, Some(data_id))?;
    Ok(FigureAxes { chrom: chrom_id, data: data_id, layout, labels })
}

/// [`plot_with_chroms`] drawing every chromosome of the cytobands.
pub fn plot_with_genome(
    fig: &mut Figure,
    data: &[Locus],
    cytobands: &[Cytoband],
    config: &FigureConfig,
    ax_data: Option<AxesId>,
) -> Result<FigureAxes> {
    let config = FigureConfig { show_genome: true, ..config.clone() };
    plot_with_chroms(fig, data, cytobands, &config, ax_data)
}
