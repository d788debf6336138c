//! Concatenation of chromosomes into one genome-wide coordinate system.
//!
//! Chromosomes are laid end to end in sorted order. A chromosome's global
//! span is `[1 + previous cumulative end, cumulative end]`, where the
//! cumulative end sums the per-chromosome maximum end positions, so the
//! spans of adjacent chromosomes are contiguous.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ChrovError, Result};
use crate::types::{distinct_chromosomes, Chrom, GenomicPos, Interval};

/// Sort chromosome names, optionally restricted to `subset`.
///
/// Numeric names come first in numeric order, then the rest lexically. A
/// subset keeps the sorted order of `available`; it must share at least one
/// chromosome with it.
pub fn sort_chromosomes(available: &[Chrom], subset: Option<&[Chrom]>) -> Result<Vec<Chrom>> {
    let mut sorted: Vec<Chrom> = available.to_vec();
    sorted.sort();
    sorted.dedup();

    match subset {
        None => {
            if sorted.len() > 1 {
                info!(
                    "chromosome order not provided, inferred: {}",
                    sorted.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
                );
            }
            Ok(sorted)
        }
        Some(subset) => {
            let missing: Vec<&Chrom> = subset.iter().filter(|c| !sorted.contains(c)).collect();
            if missing.len() == subset.len() {
                return Err(ChrovError::invalid_data(format!(
                    "requested chromosomes {:?} do not overlap with the data chromosomes {:?}",
                    subset.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                    sorted.iter().map(|c| c.as_str()).collect::<Vec<_>>()
                )));
            }
            if !missing.is_empty() {
                warn!("chromosomes not found in the data: {:?}", missing);
            }
            Ok(sorted.into_iter().filter(|c| subset.contains(c)).collect())
        }
    }
}

/// Global span of one chromosome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromSpan {
    pub chromosome: Chrom,
    /// Position in the concatenation order
    pub index: usize,
    /// First global coordinate (1-based)
    pub start: GenomicPos,
    /// Last global coordinate, the cumulative end
    pub end: GenomicPos,
}

impl ChromSpan {
    pub fn length(&self) -> GenomicPos {
        self.end + 1 - self.start
    }

    /// Offset added to chromosome-local positions
    pub fn offset(&self) -> GenomicPos {
        self.start - 1
    }
}

/// Ordered chromosome spans of a concatenated genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChromSpan>", into = "Vec<ChromSpan>")]
pub struct GenomeLayout {
    spans: Vec<ChromSpan>,
    index: HashMap<Chrom, usize>,
}

impl TryFrom<Vec<ChromSpan>> for GenomeLayout {
    type Error = ChrovError;

    fn try_from(spans: Vec<ChromSpan>) -> Result<Self> {
        Self::from_genome_ends(spans.into_iter().map(|s| (s.chromosome, s.end)).collect())
    }
}

impl From<GenomeLayout> for Vec<ChromSpan> {
    fn from(layout: GenomeLayout) -> Self {
        layout.spans
    }
}

impl GenomeLayout {
    /// Layout from interval rows: each chromosome contributes its maximum end.
    pub fn from_intervals<T: Interval>(rows: &[T], subset: Option<&[Chrom]>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ChrovError::invalid_data("no intervals to concatenate"));
        }
        let order = sort_chromosomes(&distinct_chromosomes(rows), subset)?;
        let mut max_end: HashMap<&Chrom, GenomicPos> = HashMap::new();
        for row in rows {
            let end = max_end.entry(row.chromosome()).or_insert(0);
            *end = (*end).max(row.end());
        }

        let mut cumulative = 0;
        let mut ends = Vec::with_capacity(order.len());
        for chrom in order {
            cumulative += max_end.get(&chrom).copied().unwrap_or(0);
            ends.push((chrom, cumulative));
        }
        Self::from_genome_ends(ends)
    }

    /// Layout from cumulative genome ends in concatenation order, e.g. the
    /// ends of a previously computed reference layout.
    pub fn from_genome_ends(ends: Vec<(Chrom, GenomicPos)>) -> Result<Self> {
        if ends.is_empty() {
            return Err(ChrovError::invalid_data("no chromosomes in the genome layout"));
        }
        let mut spans = Vec::with_capacity(ends.len());
        let mut index = HashMap::with_capacity(ends.len());
        let mut previous_end = 0;
        for (i, (chromosome, end)) in ends.into_iter().enumerate() {
            if end <= previous_end {
                return Err(ChrovError::invalid_data(format!(
                    "genome end of chromosome {} ({}) is not past the previous end ({})",
                    chromosome, end, previous_end
                )));
            }
            if index.insert(chromosome.clone(), i).is_some() {
                return Err(ChrovError::invalid_data(format!("duplicate chromosome {} in genome ends", chromosome)));
            }
            spans.push(ChromSpan {
                chromosome,
                index: i,
                start: previous_end + 1,
                end,
            });
            previous_end = end;
        }
        debug!("genome layout with {} chromosomes, {} bp", spans.len(), previous_end);
        Ok(Self { spans, index })
    }

    pub fn spans(&self) -> &[ChromSpan] {
        &self.spans
    }

    pub fn chromosomes(&self) -> Vec<Chrom> {
        self.spans.iter().map(|s| s.chromosome.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, chrom: &Chrom) -> Option<&ChromSpan> {
        self.index.get(chrom).map(|&i| &self.spans[i])
    }

    /// Cumulative ends, reusable with [`GenomeLayout::from_genome_ends`]
    pub fn genome_ends(&self) -> Vec<(Chrom, GenomicPos)> {
        self.spans.iter().map(|s| (s.chromosome.clone(), s.end)).collect()
    }

    /// Total concatenated length
    pub fn total_length(&self) -> GenomicPos {
        self.spans.last().map(|s| s.end).unwrap_or(0)
    }

    /// Shift a chromosome-local position into the global coordinate system
    pub fn to_global(&self, chrom: &Chrom, position: GenomicPos) -> Result<GenomicPos> {
        let span = self.span(chrom).ok_or_else(|| {
            ChrovError::invalid_data(format!("chromosome {} is not part of the genome layout", chrom))
        })?;
        Ok(span.offset() + position)
    }

    /// Attach global coordinates to every row, sorted by chromosome order then start.
    pub fn place<T: Interval + Clone>(&self, rows: &[T]) -> Result<Vec<Placed<T>>> {
        let mut placed = rows
            .iter()
            .map(|row| {
                let span = self.span(row.chromosome()).ok_or_else(|| {
                    ChrovError::invalid_data(format!(
                        "chromosome {} is not part of the genome layout",
                        row.chromosome()
                    ))
                })?;
                Ok(Placed {
                    row: row.clone(),
                    chrom_index: span.index,
                    chrom_start: span.start,
                    chrom_end: span.end,
                    start: span.offset() + row.start(),
                    end: span.offset() + row.end(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        placed.sort_by_key(|p| (p.chrom_index, p.start));
        Ok(placed)
    }

    /// Rows of the layout's chromosomes only, in chromosome order
    pub fn place_known<T: Interval + Clone>(&self, rows: &[T]) -> Result<Vec<Placed<T>>> {
        let known: Vec<T> = rows
            .iter()
            .filter(|r| self.span(r.chromosome()).is_some())
            .cloned()
            .collect();
        self.place(&known)
    }
}

/// A row with its genome-wide coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placed<T> {
    pub row: T,
    pub chrom_index: usize,
    /// Global span of the row's chromosome
    pub chrom_start: GenomicPos,
    pub chrom_end: GenomicPos,
    /// Global coordinates of the row
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl<T: Interval> Placed<T> {
    pub fn chromosome(&self) -> &Chrom {
        self.row.chromosome()
    }
}

/// Build the layout from `rows` and place them in one step.
pub fn concat_chroms<T: Interval + Clone>(rows: &[T], subset: Option<&[Chrom]>) -> Result<(GenomeLayout, Vec<Placed<T>>)> {
    let layout = GenomeLayout::from_intervals(rows, subset)?;
    let placed = layout.place_known(rows)?;
    Ok((layout, placed))
}
