use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bskap",
    version,
    about = "BSKAP curriculum text extraction and CP store maintenance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Headers(HeadersArgs),
    Sync(SyncArgs),
    Inspect(InspectArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::Headers(_) => "headers",
            Self::Sync(_) => "sync",
            Self::Inspect(_) => "inspect",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub pdf_path: PathBuf,

    #[arg(long, default_value = "bskap_extracted.txt")]
    pub text_path: PathBuf,

    #[arg(long)]
    pub max_pages: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct HeadersArgs {
    #[arg(long, default_value = "bskap_extracted.txt")]
    pub text_path: PathBuf,

    #[arg(long, default_value_t = 2)]
    pub context_lines: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[arg(long, default_value = "bskap_extracted.txt")]
    pub text_path: PathBuf,

    #[arg(long)]
    pub pdf_path: Option<PathBuf>,

    #[arg(long, default_value = "src/utils/bskap_2025_intel.json")]
    pub intel_path: PathBuf,

    #[arg(long, default_value = "src/utils/bskap_2025_verbatim.json")]
    pub verbatim_path: PathBuf,

    #[arg(long)]
    pub match_rules: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_variants: bool,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long, default_value = "src/utils/bskap_2025_intel.json")]
    pub intel_path: PathBuf,

    #[arg(long, default_value = "src/utils/bskap_2025_verbatim.json")]
    pub verbatim_path: PathBuf,

    #[arg(long, default_value = "SMA")]
    pub level: String,
}
