use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "subcheck developer CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Config file and credential overrides shared by commands that search.
#[derive(Args, Clone, Debug, Default)]
pub struct SearchArgs {
    /// TOML config file (falls back to SUBCHECK_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Search API key (overrides config and SUBCHECK_SEARCH_API_KEY)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
    /// Search engine identifier (overrides config and SUBCHECK_SEARCH_ENGINE_ID)
    #[arg(long = "engine-id")]
    pub engine_id: Option<String>,
    /// Delay before each query, in milliseconds
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured domains
    Domains {
        /// requirements table (TOML); embedded table when omitted
        #[arg(long)]
        requirements: Option<PathBuf>,
    },

    /// Print the required documents for one domain
    Requirements {
        domain: String,
        #[arg(long)]
        requirements: Option<PathBuf>,
    },

    /// List archive members without extracting
    List { archive: PathBuf },

    /// Extract archive members flat into a directory
    Extract { archive: PathBuf, dest: PathBuf },

    /// Check an archive against a domain's required documents
    Validate {
        archive: PathBuf,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        requirements: Option<PathBuf>,
    },

    /// Print the text chunks the scanner would query for a PDF or DOCX file
    Chunks { file: PathBuf },

    /// Search every chunk of one document
    Scan {
        file: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Run the full submission check (validate + scan) and print the report as JSON
    Check {
        archive: PathBuf,
        #[arg(long)]
        domain: String,
        #[command(flatten)]
        search: SearchArgs,
    },
}
