//! chrov core library
//!
//! Data model, coordinate rescaling, polar mapping and chromosome
//! concatenation for karyotype plots.

pub mod error;
pub mod types;
pub mod rescale;
pub mod polar;
pub mod concat;
pub mod io;

// Re-export commonly used types and functions
pub use error::{ChrovError, Result};
pub use types::{BandStain, Chrom, Cytoband, GenomicPos, Interval, Locus};
pub use rescale::{rank_average, rescale};
pub use polar::{interpolate, to_polar, AngularRange};
pub use concat::{concat_chroms, sort_chromosomes, ChromSpan, GenomeLayout, Placed};
pub use io::{CytobandReader, LociReader};

/// Version information for the chrov core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
