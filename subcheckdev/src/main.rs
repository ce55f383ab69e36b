mod application;
mod presentation {
    pub mod cli;
}

use subcheck_core::error::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "subcheck_core=info,subcheckdev=info";

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    application::run()
}
