use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predict functional abundance from 16S marker-gene data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads to use
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Path to log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate model abundance from marker data and extrapolate functions
    Markp(MarkpCommand),

    /// Parse a taxonomy file into a seven-level table
    Taxa(TaxaCommand),
}

#[derive(Parser, Debug)]
pub struct MarkpCommand {
    /// OTU table (TSV, BIOM JSON or mothur shared)
    #[arg(short = 'i', long)]
    pub otutab: PathBuf,

    /// Taxonomy file with a Taxon column
    #[arg(short = 't', long)]
    pub taxonomy: PathBuf,

    /// Taxonomic level to collapse OTUs into (genus or species)
    #[arg(short, long, value_enum, default_value = "genus")]
    pub model: TaxonomyLevel,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Lineage notation used in the taxonomy file
    #[arg(long, value_enum, default_value = "greengenes")]
    pub taxonomy_format: TaxonomyFormat,

    /// JSON file naming reference tables per model level
    #[arg(short, long)]
    pub references: Option<PathBuf>,

    /// 16S copy number table (overrides the reference config)
    #[arg(long)]
    pub copy_number: Option<PathBuf>,

    /// Model-to-function matrix (overrides the reference config)
    #[arg(long)]
    pub model_function: Option<PathBuf>,

    /// Function-to-group matrix (overrides the reference config)
    #[arg(long)]
    pub function_group: Option<PathBuf>,

    /// Fail if the output directory already exists
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct TaxaCommand {
    /// Taxonomy file with a Taxon column
    #[arg(short = 't', long)]
    pub taxonomy: PathBuf,

    /// Lineage notation used in the taxonomy file
    #[arg(long, value_enum, default_value = "greengenes")]
    pub taxonomy_format: TaxonomyFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum TaxonomyLevel {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum TaxonomyFormat {
    /// k__Bacteria; p__Firmicutes; ...
    Greengenes,
    /// D_0__Bacteria;D_1__Firmicutes;... (SILVA)
    Rdp,
    /// Detect per lineage
    Auto,
}

impl From<TaxonomyLevel> for cmnet::TaxonomicLevel {
    fn from(level: TaxonomyLevel) -> Self {
        match level {
            TaxonomyLevel::Kingdom => Self::Kingdom,
            TaxonomyLevel::Phylum => Self::Phylum,
            TaxonomyLevel::Class => Self::Class,
            TaxonomyLevel::Order => Self::Order,
            TaxonomyLevel::Family => Self::Family,
            TaxonomyLevel::Genus => Self::Genus,
            TaxonomyLevel::Species => Self::Species,
        }
    }
}

impl TaxonomyFormat {
    pub fn dialect(self) -> Option<cmnet::Dialect> {
        match self {
            TaxonomyFormat::Greengenes => Some(cmnet::Dialect::GreenGenes),
            TaxonomyFormat::Rdp => Some(cmnet::Dialect::Rdp),
            TaxonomyFormat::Auto => None,
        }
    }
}
