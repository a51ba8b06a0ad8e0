use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Extract tables from PDF documents.
#[derive(Parser, Debug)]
#[command(name = "tabula", version, about)]
pub struct Cli {
    /// PDF file to process.
    pub file: PathBuf,

    /// Pages to process: comma-separated numbers and ranges (e.g.
    /// "1-3,5"), or "all".
    #[arg(short, long, default_value = "all")]
    pub pages: String,

    /// Restrict extraction to an area: top,left,bottom,right in points.
    #[arg(short, long, conflicts_with = "guess")]
    pub area: Option<String>,

    /// Column x-positions for stream extraction, comma-separated.
    #[arg(short, long, conflicts_with = "lattice")]
    pub columns: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Force lattice extraction (tables with ruling lines).
    #[arg(short, long, conflicts_with = "stream")]
    pub lattice: bool,

    /// Force stream extraction (tables without ruling lines).
    #[arg(short = 't', long)]
    pub stream: bool,

    /// Detect table regions before extracting.
    #[arg(short, long)]
    pub guess: bool,

    /// Password for encrypted documents.
    #[arg(short = 's', long)]
    pub password: Option<String>,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
    Json,
    Markdown,
}

impl Format {
    pub fn to_output_format(self) -> tabula::OutputFormat {
        match self {
            Format::Csv => tabula::OutputFormat::Csv,
            Format::Tsv => tabula::OutputFormat::Tsv,
            Format::Json => tabula::OutputFormat::Json,
            Format::Markdown => tabula::OutputFormat::Markdown,
        }
    }
}
