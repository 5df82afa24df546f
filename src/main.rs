//! research-brief CLI binary entry point.

use clap::Parser;
use research_brief::brief::BriefGenerator;
use research_brief::cli::Cli;
use research_brief::config::BriefConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_brief=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.apply(BriefConfig::from_env());
    let generator = BriefGenerator::from_config(&config)?;

    let thread_id = cli.resolve_thread_id();
    if cli.new_thread {
        if let Some(ref id) = thread_id {
            eprintln!("thread: {id}");
        }
    }

    let brief = generator
        .generate_brief(&cli.topic, thread_id.as_deref())
        .await?;
    println!("{brief}");
    Ok(())
}
