pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod allele_split;
    pub mod canonical;
    pub mod cigar;
    pub mod merge;
    pub mod mutation_type;
}

pub mod io {
    pub mod depth;
    pub mod header;
    pub mod ivar_reader;
    pub mod readers;
    pub mod report_writer;
    pub mod sample_sheet;
    pub mod vcf_reader;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
