//! Chromosome ideograms: arms, whole chromosomes and concatenated genomes.

use chrov_core::polar::sub_range;
use chrov_core::rescale::rescale;
use chrov_core::types::distinct_chromosomes;
use chrov_core::{
    concat_chroms, interpolate, AngularRange, BandStain, Chrom, ChrovError, Cytoband, GenomeLayout, Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::color::Color;
use crate::config::{AddAxesConfig, ArmConfig, ChromsConfig};
use crate::scene::{AxesId, AxesRect, Axes, CapStyle, Figure, HAlign, LineStyle, Projection, TextStyle, TextVAlign};
use crate::surface::{surface_for, CoordMap};

/// Plot the cytobands of one chromosome arm.
///
/// On polar axes the bands are mapped from `map.range1` (the arm extent by
/// default) onto `map.range2` (the full circle by default) and sampled
/// densely enough to look round.
pub fn plot_arm(ax: &mut Axes, bands: &[Cytoband], config: &ArmConfig, map: CoordMap) -> Result<()> {
    let chromosomes = distinct_chromosomes(bands);
    if chromosomes.is_empty() {
        return Err(ChrovError::invalid_data("no cytobands to plot"));
    }
    if chromosomes.len() > 1 {
        let names: Vec<&str> = chromosomes.iter().map(|c| c.as_str()).collect();
        return Err(ChrovError::invalid_data(format!(
            "multiple chromosomes provided: {}",
            names.join(", ")
        )));
    }

    let start = bands.iter().map(|b| b.start).min().unwrap_or(0) as f64;
    let end = bands.iter().map(|b| b.end).max().unwrap_or(0) as f64;
    let y = config.y;
    let lw = config.lw;

    let mut surface = surface_for(ax);
    let polar = surface.is_polar();
    let mut cap = config.cap;
    let mut map = map;
    let mut offx = 0.0;

    if polar {
        if cap != CapStyle::Butt {
            warn!("polar arms support only butt caps, drawing {:?} caps as butt", cap);
            cap = CapStyle::Butt;
        }
        map.range1 = map.range1.or(Some((start, end)));
        map.range2 = map.range2.or(Some(AngularRange::default().as_tuple()));
        map.interval = map.interval.or(Some((end - start) / (100.0 * config.polar_smoothness_scale)));
    } else {
        surface.set_xlim(start, end);
        if cap == CapStyle::Round {
            // inset so the rounded ends stay within the arm
            let px_per_x = surface.axes().px_per_x();
            if px_per_x > 0.0 {
                offx = (lw / 2.0) / px_per_x;
            }
        }
    }

    for band in bands {
        let style = match &band.stain {
            BandStain::Gpos(n) => LineStyle::new(Color::BLACK, lw).alpha(*n as f64 * 0.01).zorder(2.0),
            BandStain::Gneg => LineStyle::new(Color::WHITE, lw).zorder(1.0),
            BandStain::Acen => LineStyle::new(config.centromere_color, lw * 0.75).zorder(2.0),
            BandStain::Gvar => LineStyle::new(Color::BLACK, lw).zorder(2.0),
            BandStain::Stalk => LineStyle::new(config.centromere_color, lw * 0.5).zorder(2.0),
            BandStain::Other(stain) => {
                debug!("skipping band {} with stain {:?}", band.name, stain);
                continue;
            }
        };
        surface.plot_segment(band.start as f64, band.end as f64, y, style, &map)?;
    }

    let arm_bands = bands.iter().filter(|b| !b.stain.is_centromere());
    let start_line = arm_bands.clone().map(|b| b.start).min();
    let end_line = arm_bands.map(|b| b.end).max();
    if let (Some(s), Some(e)) = (start_line, end_line) {
        let (x0, x1) = (s as f64 + offx, e as f64 - offx);
        let outline = LineStyle::new(config.edge_color, lw + 2.0).cap(cap).zorder(1.0);
        surface.plot_segment(x0, x1, y, outline, &map)?;
        let fill = LineStyle::new(Color::WHITE, lw).cap(cap).zorder(1.0);
        surface.plot_segment(x0, x1, y, fill, &map)?;
    }

    if !config.test {
        surface.axes_mut().axis_visible = false;
    }
    if let (true, Some((lo, hi))) = (polar, map.range2) {
        surface.set_xlim(lo, hi);
    }
    Ok(())
}

// Bands grouped by arm in order of first appearance along the chromosome
fn group_arms(bands: &[Cytoband]) -> Vec<Vec<Cytoband>> {
    let mut sorted = bands.to_vec();
    sorted.sort_by_key(|b| b.start);
    let mut arms: Vec<(String, Vec<Cytoband>)> = Vec::new();
    for band in sorted {
        match arms.iter_mut().find(|(arm, _)| *arm == band.arm) {
            Some((_, group)) => group.push(band),
            None => arms.push((band.arm.clone(), vec![band])),
        }
    }
    arms.into_iter().map(|(_, group)| group).collect()
}

/// Plot one chromosome arm by arm; on polar axes each arm gets a share of
/// `range` proportional to its length.
pub fn plot_chrom(ax: &mut Axes, bands: &[Cytoband], config: &ArmConfig, range: AngularRange) -> Result<()> {
    let start = bands.iter().map(|b| b.start).min().unwrap_or(0) as f64;
    let end = bands.iter().map(|b| b.end).max().unwrap_or(0) as f64;
    let polar = ax.is_polar();

    for arm in group_arms(bands) {
        let map = if polar {
            let local = (
                arm.iter().map(|b| b.start).min().unwrap_or(0) as f64,
                arm.iter().map(|b| b.end).max().unwrap_or(0) as f64,
            );
            let sub = sub_range(local, (start, end), range);
            CoordMap::new(local, sub.as_tuple())
        } else {
            CoordMap::default()
        };
        plot_arm(ax, &arm, config, map)?;
    }
    if polar {
        ax.set_xlim(range.start, range.end);
    }
    Ok(())
}

/// Placement of one chromosome in a concatenated plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromPlacement {
    pub chromosome: Chrom,
    pub index: usize,
    pub start: f64,
    pub end: f64,
    /// Angles of `start` and `end` on polar axes
    pub theta: Option<(f64, f64)>,
}

impl ChromPlacement {
    /// Centre of the chromosome in axes x units
    pub fn mid(&self) -> f64 {
        match self.theta {
            Some((t0, t1)) => (t0 + t1) / 2.0,
            None => (self.start + self.end) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromsLayout {
    pub chromosomes: Vec<ChromPlacement>,
    pub genome: GenomeLayout,
}

/// Plot chromosomes joined end to end along the x axis (or around the circle).
pub fn plot_chroms(ax: &mut Axes, bands: &[Cytoband], config: &ChromsConfig) -> Result<ChromsLayout> {
    let (genome, placed) = concat_chroms(bands, config.chromosomes.as_deref())?;
    let polar = ax.is_polar();
    let range = config.angular.to_range()?;

    let start = placed.iter().map(|p| p.start).min().unwrap_or(0) as f64;
    let end = placed.iter().map(|p| p.end).max().unwrap_or(0) as f64;

    let mut arm_config = config.arm.clone();
    arm_config.y = config.y.unwrap_or(config.arm.y);
    arm_config.cap = if genome.len() > 1 { CapStyle::Butt } else { CapStyle::Round };

    let mut chromosomes = Vec::with_capacity(genome.len());
    for span in genome.spans() {
        let shifted: Vec<Cytoband> = placed
            .iter()
            .filter(|p| p.chrom_index == span.index)
            .map(|p| Cytoband { start: p.start, end: p.end, ..p.row.clone() })
            .collect();
        let chrom_start = shifted.iter().map(|b| b.start).min().unwrap_or(0) as f64;
        let chrom_end = shifted.iter().map(|b| b.end).max().unwrap_or(0) as f64;
        let sub = sub_range((chrom_start, chrom_end), (start, end), range);
        plot_chrom(ax, &shifted, &arm_config, sub)?;
        chromosomes.push(ChromPlacement {
            chromosome: span.chromosome.clone(),
            index: span.index,
            start: chrom_start,
            end: chrom_end,
            theta: polar.then_some((sub.start, sub.end)),
        });
    }

    let mut surface = surface_for(ax);
    if polar {
        let lim = rescale(&[start, end], None, Some(range.as_tuple()));
        surface.set_xlim(lim[0], lim[1]);
        if config.show_vline && !range.is_full_circle() {
            surface.vline(range.start, LineStyle::new(Color::BLACK, 1.0));
            surface.vline(range.end, LineStyle::new(Color::BLACK, 1.0));
        }
    } else {
        surface.set_xlim(start, end);
    }

    for chrom in &chromosomes {
        let alpha = config.span_alpha_scale * (chrom.index % 2) as f64;
        match chrom.theta {
            Some((t0, t1)) => {
                let edges = interpolate(t0, t1, None, Some(5))?;
                for pair in edges.windows(2) {
                    surface.span(pair[0], pair[1], (0.0, 1.0), config.span_color, alpha, -1.0);
                }
            }
            None => surface.span(chrom.start, chrom.end, (0.0, 1.0), config.span_color, alpha, -1.0),
        }
    }

    if config.show_labels {
        let label_y = config
            .label_y
            .or(config.y)
            .unwrap_or(if polar { 0.1 * 1.5 } else { 0.1 * 0.8 });
        let va = if polar { TextVAlign::Center } else { TextVAlign::Bottom };
        for chrom in &chromosomes {
            surface.place_text(chrom.mid(), label_y, chrom.chromosome.as_str(), TextStyle::aligned(HAlign::Center, va));
        }
    }

    Ok(ChromsLayout { chromosomes, genome })
}

/// Vertical placement of a chromosome axes relative to a reference axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "center bottom")]
    CenterBottom,
    #[serde(rename = "bottom")]
    Bottom,
}

impl FromStr for VAlign {
    type Err = ChrovError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "center" => Ok(VAlign::Center),
            "center bottom" => Ok(VAlign::CenterBottom),
            "bottom" => Ok(VAlign::Bottom),
            other => Err(ChrovError::config(format!("unknown vertical alignment: {:?}", other))),
        }
    }
}

/// Add an axes for chromosomes, sized and placed relative to `ax_with`.
pub fn add_axes(fig: &mut Figure, config: &AddAxesConfig, ax_with: Option<AxesId>) -> Result<AxesId> {
    let reference = match ax_with {
        Some(id) => Some(fig.axes(id)?),
        None => None,
    };
    let arc = match (config.arc, reference) {
        (Some(arc), _) => arc,
        (None, Some(ax)) => ax.is_polar(),
        (None, None) => {
            return Err(ChrovError::config("either a reference axes or the projection must be given"))
        }
    };

    let rect = match reference.map(|ax| ax.rect) {
        Some(r) => {
            let off = config.off.unwrap_or(if arc { 0.25 * r.width } else { 0.1 * r.height });
            let offy = config.offy.unwrap_or(off);
            match config.va {
                VAlign::Center => AxesRect::new(r.left - off * 0.5, r.bottom - offy * 0.5, r.width + off, r.height + off),
                VAlign::CenterBottom => AxesRect::new(r.left, r.bottom + offy, r.width + off, r.height + off),
                VAlign::Bottom => AxesRect::new(r.left, r.bottom + offy, r.width, r.height + off),
            }
        }
        None => {
            let off = config.off.unwrap_or(0.1);
            match (arc, config.offy) {
                (true, Some(offy)) if offy == 0.0 => AxesRect::new(-off * 0.5, -off * 0.5, 1.0 + off, 1.0 + off),
                (true, offy) => {
                    let offy = offy.unwrap_or(off * 0.5);
                    AxesRect::new(-off, 1.0 - offy, 1.0 + 2.0 * off, 1.0 + 2.0 * off)
                }
                (false, _) => AxesRect::new(0.0, 1.0, 1.0, off + 0.3),
            }
        }
    };
    info!("rect={:?}", rect);

    let projection = if arc { Projection::karyotype_polar() } else { Projection::Linear };
    let id = fig.add_axes(rect, projection);
    fig.axes_mut(id)?.zorder = config.zorder;
    Ok(id)
}

/// Add (or reuse) a chromosome axes and draw the chromosomes on it with
/// their names.
pub fn annot_chroms(
    fig: &mut Figure,
    bands: &[Cytoband],
    ax_chrom: Option<AxesId>,
    ax_with: Option<AxesId>,
    chrom_y: f64,
    axes_config: &AddAxesConfig,
    config: &ChromsConfig,
) -> Result<(AxesId, ChromsLayout)> {
    let id = match ax_chrom {
        Some(id) => id,
        None => add_axes(fig, axes_config, ax_with)?,
    };
    let config = ChromsConfig {
        y: Some(chrom_y),
        label_y: Some(0.05),
        show_labels: true,
        show_vline: false,
        ..config.clone()
    };
    let ax = fig.axes_mut(id)?;
    let layout = plot_chroms(ax, bands, &config)?;
    ax.set_ylim(-1.0, 0.1);
    Ok((id, layout))
}
