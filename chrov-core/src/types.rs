use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ChrovError, Result};

pub type GenomicPos = u64;

/// Chromosome name.
///
/// Ordering puts numeric names first in numeric order, then every other
/// name in lexical order: `1 < 2 < 10 < X < Y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chrom(String);

impl Chrom {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the name when it consists of digits only
    pub fn number(&self) -> Option<u64> {
        if !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    fn sort_key(&self) -> (bool, u64, &str) {
        match self.number() {
            Some(n) => (false, n, self.0.as_str()),
            None => (true, 0, self.0.as_str()),
        }
    }
}

impl Ord for Chrom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Chrom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Chrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Chrom {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Chrom {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Giemsa stain category of a cytoband
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandStain {
    /// Positive band with staining intensity in percent
    Gpos(u8),
    Gneg,
    /// Centromere
    Acen,
    /// Variable heterochromatin
    Gvar,
    Stalk,
    Other(String),
}

impl BandStain {
    pub fn parse(stain: &str) -> Self {
        let stain = stain.trim();
        if let Some(level) = stain.strip_prefix("gpos") {
            // bare "gpos" carries no intensity; treat it as fully stained
            let level = level.parse::<u8>().unwrap_or(100).min(100);
            return BandStain::Gpos(level);
        }
        if stain.starts_with("gneg") {
            return BandStain::Gneg;
        }
        match stain {
            "acen" => BandStain::Acen,
            "gvar" => BandStain::Gvar,
            "stalk" => BandStain::Stalk,
            other => BandStain::Other(other.to_string()),
        }
    }

    pub fn is_centromere(&self) -> bool {
        matches!(self, BandStain::Acen)
    }
}

impl fmt::Display for BandStain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandStain::Gpos(level) => write!(f, "gpos{}", level),
            BandStain::Gneg => f.write_str("gneg"),
            BandStain::Acen => f.write_str("acen"),
            BandStain::Gvar => f.write_str("gvar"),
            BandStain::Stalk => f.write_str("stalk"),
            BandStain::Other(s) => f.write_str(s),
        }
    }
}

/// Anything with a chromosome and a `[start, end]` span
pub trait Interval {
    fn chromosome(&self) -> &Chrom;
    fn start(&self) -> GenomicPos;
    fn end(&self) -> GenomicPos;
}

/// One banding interval of a chromosome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cytoband {
    pub chromosome: Chrom,
    pub start: GenomicPos,
    pub end: GenomicPos,
    /// Arm name, usually `p` or `q`
    pub arm: String,
    /// Band name, e.g. `p36.33`
    pub name: String,
    pub stain: BandStain,
}

impl Cytoband {
    /// Build a band; the arm is taken from the leading `p`/`q` of the band name.
    pub fn new<C: Into<Chrom>>(chromosome: C, start: GenomicPos, end: GenomicPos, name: &str, stain: &str) -> Self {
        let arm = match name.chars().next() {
            Some(c @ ('p' | 'q')) => c.to_string(),
            _ => String::new(),
        };
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            arm,
            name: name.to_string(),
            stain: BandStain::parse(stain),
        }
    }

    pub fn with_arm<S: Into<String>>(mut self, arm: S) -> Self {
        self.arm = arm.into();
        self
    }

    pub fn length(&self) -> GenomicPos {
        self.end.saturating_sub(self.start)
    }
}

impl Interval for Cytoband {
    fn chromosome(&self) -> &Chrom {
        &self.chromosome
    }
    fn start(&self) -> GenomicPos {
        self.start
    }
    fn end(&self) -> GenomicPos {
        self.end
    }
}

/// A genomic feature (gene, range or single position) with optional label and value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locus {
    pub chromosome: Chrom,
    pub start: GenomicPos,
    pub end: GenomicPos,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    /// Caller supplied x position, used when x is not a genomic coordinate
    #[serde(default)]
    pub x: Option<f64>,
    /// Category used for coloring
    #[serde(default)]
    pub group: Option<String>,
}

impl Locus {
    pub fn new<C: Into<Chrom>>(chromosome: C, start: GenomicPos, end: GenomicPos) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            label: None,
            value: None,
            x: None,
            group: None,
        }
    }

    pub fn point<C: Into<Chrom>>(chromosome: C, position: GenomicPos) -> Self {
        Self::new(chromosome, position, position)
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl Interval for Locus {
    fn chromosome(&self) -> &Chrom {
        &self.chromosome
    }
    fn start(&self) -> GenomicPos {
        self.start
    }
    fn end(&self) -> GenomicPos {
        self.end
    }
}

/// Check the cytoband invariants: positive length, and per chromosome
/// sorted by start without overlaps.
pub fn validate_cytobands(bands: &[Cytoband]) -> Result<()> {
    let mut last_end: HashMap<&Chrom, (usize, GenomicPos)> = HashMap::new();
    for (i, band) in bands.iter().enumerate() {
        if band.end <= band.start {
            return Err(ChrovError::invalid_data(format!(
                "zero-length band at row {}: {}:{}-{} ({})",
                i, band.chromosome, band.start, band.end, band.name
            )));
        }
        if let Some(&(prev_row, prev_end)) = last_end.get(&band.chromosome) {
            if band.start < prev_end {
                return Err(ChrovError::invalid_data(format!(
                    "band at row {} ({}:{}-{}) overlaps or precedes row {} ending at {}",
                    i, band.chromosome, band.start, band.end, prev_row, prev_end
                )));
            }
        }
        last_end.insert(&band.chromosome, (i, band.end));
    }
    Ok(())
}

/// Distinct chromosomes in order of first appearance
pub fn distinct_chromosomes<T: Interval>(rows: &[T]) -> Vec<Chrom> {
    let mut seen = Vec::new();
    for row in rows {
        if !seen.contains(row.chromosome()) {
            seen.push(row.chromosome().clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrom_ordering() {
        let mut chroms: Vec<Chrom> = ["X", "10", "2", "Y", "1", "MT"].iter().map(|&c| c.into()).collect();
        chroms.sort();
        let names: Vec<&str> = chroms.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "10", "MT", "X", "Y"]);
    }

    #[test]
    fn test_band_stain_parse() {
        assert_eq!(BandStain::parse("gpos75"), BandStain::Gpos(75));
        assert_eq!(BandStain::parse("gpos"), BandStain::Gpos(100));
        assert_eq!(BandStain::parse("gneg"), BandStain::Gneg);
        assert_eq!(BandStain::parse("acen"), BandStain::Acen);
        assert_eq!(BandStain::parse("gvar"), BandStain::Gvar);
        assert_eq!(BandStain::parse("n/a"), BandStain::Other("n/a".into()));
        assert_eq!(BandStain::Gpos(25).to_string(), "gpos25");
    }

    #[test]
    fn test_arm_from_band_name() {
        let band = Cytoband::new("1", 0, 2_300_000, "p36.33", "gneg");
        assert_eq!(band.arm, "p");
        let band = Cytoband::new("1", 125_000_000, 143_200_000, "q12", "gvar");
        assert_eq!(band.arm, "q");
        assert_eq!(band.length(), 18_200_000);
    }

    #[test]
    fn test_validate_cytobands() {
        let ok = vec![
            Cytoband::new("1", 0, 100, "p1", "gneg"),
            Cytoband::new("2", 0, 50, "p1", "gneg"),
            Cytoband::new("1", 100, 200, "q1", "gpos50"),
        ];
        assert!(validate_cytobands(&ok).is_ok());

        let overlapping = vec![
            Cytoband::new("1", 0, 100, "p1", "gneg"),
            Cytoband::new("1", 90, 200, "q1", "gpos50"),
        ];
        let err = validate_cytobands(&overlapping).unwrap_err();
        assert!(err.is_invalid_data());

        let empty = vec![Cytoband::new("1", 10, 10, "p1", "gneg")];
        assert!(validate_cytobands(&empty).is_err());
    }

    #[test]
    fn test_distinct_chromosomes_keeps_first_appearance() {
        let loci = vec![Locus::point("2", 5), Locus::point("1", 3), Locus::point("2", 9)];
        let chroms = distinct_chromosomes(&loci);
        assert_eq!(chroms, vec![Chrom::new("2"), Chrom::new("1")]);
    }
}
