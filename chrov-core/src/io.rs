//! Readers for cytoband and locus tables.
//!
//! Both formats are tab separated. Empty lines, `#` comments and a header
//! row whose start column is not numeric are skipped. Paths ending in
//! `.gz` are decompressed on the fly.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{ChrovError, Result};
use crate::types::{Cytoband, GenomicPos, Locus};

fn parse_pos(field: &str, line_no: usize, column: &str) -> Result<GenomicPos> {
    field
        .trim()
        .parse()
        .map_err(|_| ChrovError::parse(line_no, format!("invalid {} position: {:?}", column, field)))
}

fn is_header(fields: &[&str]) -> bool {
    fields.get(1).map_or(false, |f| f.trim().parse::<GenomicPos>().is_err())
}

type FileReader = BufReader<Box<dyn Read>>;

fn open_table<P: AsRef<Path>>(path: P) -> Result<FileReader> {
    let file = File::open(&path)?;
    let reader: Box<dyn Read> = if path.as_ref().to_string_lossy().ends_with(".gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(BufReader::new(reader))
}

fn normalize_chrom(name: &str, strip_prefix: bool) -> String {
    let name = name.trim();
    if strip_prefix {
        name.strip_prefix("chr").unwrap_or(name).to_string()
    } else {
        name.to_string()
    }
}

/// Reader for UCSC `cytoBand.txt` tables: `chrom start end name gieStain`
pub struct CytobandReader<R> {
    reader: R,
    strip_chr_prefix: bool,
}

impl CytobandReader<FileReader> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_table(path)?))
    }
}

impl<R: BufRead> CytobandReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_chr_prefix: true,
        }
    }

    /// Keep a leading `chr` on chromosome names (stripped by default)
    pub fn keep_chr_prefix(mut self) -> Self {
        self.strip_chr_prefix = false;
        self
    }

    pub fn read_all(self) -> Result<Vec<Cytoband>> {
        let mut bands = Vec::new();
        let mut first = true;
        for (i, line) in self.reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line?;
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if std::mem::take(&mut first) && is_header(&fields) {
                continue;
            }
            if fields.len() < 5 {
                return Err(ChrovError::parse(
                    line_no,
                    format!("cytoband line must have 5 fields, found {}", fields.len()),
                ));
            }
            let chrom = normalize_chrom(fields[0], self.strip_chr_prefix);
            let start = parse_pos(fields[1], line_no, "start")?;
            let end = parse_pos(fields[2], line_no, "end")?;
            let mut band = Cytoband::new(chrom, start, end, fields[3].trim(), fields[4]);
            // an optional sixth column names the arm explicitly
            if let Some(arm) = fields.get(5).map(|a| a.trim()).filter(|a| !a.is_empty()) {
                band = band.with_arm(arm);
            }
            bands.push(band);
        }
        Ok(bands)
    }
}

/// Reader for BED-like locus tables: `chrom start end [label] [value]`
pub struct LociReader<R> {
    reader: R,
    strip_chr_prefix: bool,
}

impl LociReader<FileReader> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_table(path)?))
    }
}

impl<R: BufRead> LociReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_chr_prefix: true,
        }
    }

    pub fn keep_chr_prefix(mut self) -> Self {
        self.strip_chr_prefix = false;
        self
    }

    pub fn read_all(self) -> Result<Vec<Locus>> {
        let mut loci = Vec::new();
        let mut first = true;
        for (i, line) in self.reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line?;
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if std::mem::take(&mut first) && is_header(&fields) {
                continue;
            }
            if fields.len() < 3 {
                return Err(ChrovError::parse(
                    line_no,
                    format!("locus line must have at least 3 fields, found {}", fields.len()),
                ));
            }
            let chrom = normalize_chrom(fields[0], self.strip_chr_prefix);
            let start = parse_pos(fields[1], line_no, "start")?;
            let end = parse_pos(fields[2], line_no, "end")?;
            let mut locus = Locus::new(chrom, start, end);
            if let Some(label) = fields.get(3).map(|l| l.trim()).filter(|l| !l.is_empty() && *l != ".") {
                locus = locus.with_label(label);
            }
            if let Some(value) = fields.get(4).map(|v| v.trim()).filter(|v| !v.is_empty() && *v != ".") {
                let value: f64 = value
                    .parse()
                    .map_err(|_| ChrovError::parse(line_no, format!("invalid value: {:?}", value)))?;
                locus = locus.with_value(value);
            }
            loci.push(locus);
        }
        Ok(loci)
    }
}
