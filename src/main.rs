use clap::Parser;
use dotenv::dotenv;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

use grepapp_search_lib::{Args, GrepSearcher, Result};

#[tokio::main]
async fn main() {
    // Load GREPAPP_* and RUST_LOG from a .env file if one exists
    dotenv().ok();

    // Logs go to stderr; stdout only ever carries the JSON document
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Any error means no JSON at all, only a diagnostic and a failing exit code
    if let Err(e) = run(Args::parse()).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Validate before anything touches the network
    let config = args.validate()?;

    let searcher = GrepSearcher::new(&config)?;
    let results = searcher.run(&config.query).await?;

    // Emit the merged result set exactly once
    let json = results.to_json()?;
    println!("{}", json);
    Ok(())
}
