use anyhow::Result;
use clap::Parser;
use flashcard_generator::models::Config;
use flashcard_generator::observer::TracingObserver;
use flashcard_generator::pipeline::{Pipeline, RunState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "flashcards")]
#[command(about = "Generate illustrated Arabic-English flashcards")]
struct CliArgs {
    /// A word or category, in Arabic or English.
    #[arg(value_name = "INPUT")]
    input: String,

    /// Print the cards as single-line JSON.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashcard_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting flashcard generation for {:?}", args.input);
    let pipeline = Pipeline::new(&config, Box::new(TracingObserver));

    match pipeline.request_generation(&args.input).await? {
        RunState::Done => {
            let cards = pipeline.latest_cards();
            let json = if args.compact {
                serde_json::to_string(&cards)?
            } else {
                serde_json::to_string_pretty(&cards)?
            };
            println!("{}", json);
            Ok(())
        }
        _ => std::process::exit(1),
    }
}
