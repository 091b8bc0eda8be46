use clap::Parser;
use tokio::io::{BufWriter, Stdout};
use tracing::info;

use rrmux::prelude::*;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    CliApp::new("rrmux")
        .run(|writer| run_multiplexer(writer, args))
        .await
}

/// Main application logic - merges all inputs onto stdout
async fn run_multiplexer(mut writer: BufWriter<Stdout>, args: Args) -> Result<(), AppError> {
    args.validate()?;
    let config = args.resolve_config().await?;

    let sources = match args.simulate {
        Some(n) => demo_sources(n, args.simulate_delay()),
        None => open_sources(&args.files).await?,
    };

    info!(
        sources = sources.len(),
        timeout = ?config.per_source_timeout,
        max_retries = config.max_retries,
        retry_scope = %config.retry_scope,
        "Starting round-robin merge"
    );

    let mut mux = RoundRobinScheduler::new(sources, config)?;
    let result = copy_records(&mut mux, &mut writer).await;

    let stats = mux.stats();
    info!(
        records = stats.records,
        bytes = stats.bytes,
        timeouts = stats.timeouts,
        exhausted = stats.sources_exhausted,
        "Merge finished"
    );
    result?;
    Ok(())
}
