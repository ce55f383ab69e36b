pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use subcheck_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Domains { requirements } => handlers::handle_domains(requirements),
        Commands::Requirements {
            domain,
            requirements,
        } => handlers::handle_requirements(domain, requirements),
        Commands::List { archive } => handlers::handle_list(archive),
        Commands::Extract { archive, dest } => handlers::handle_extract(archive, dest),
        Commands::Validate {
            archive,
            domain,
            requirements,
        } => handlers::handle_validate(archive, domain, requirements),
        Commands::Chunks { file } => handlers::handle_chunks(file),
        Commands::Scan { file, search } => handlers::handle_scan(file, search),
        Commands::Check {
            archive,
            domain,
            search,
        } => handlers::handle_check(archive, domain, search),
    }
}
