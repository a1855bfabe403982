use anyhow::Result;
use artify::models::{Config, LifecycleState, View};
use artify::orchestrator::Orchestrator;
use artify::prompts::{DEFAULT_NEGATIVE_PROMPT, DEFAULT_USER_PROMPT};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "artify")]
#[command(about = "Generate an image from a text description")]
struct CliArgs {
    /// What the image should show.
    #[arg(value_name = "PROMPT", default_value = DEFAULT_USER_PROMPT)]
    prompt: String,

    /// Things the image should avoid.
    #[arg(short, long, value_name = "TEXT", default_value = DEFAULT_NEGATIVE_PROMPT)]
    negative: String,

    /// Save the generated image to the output directory.
    #[arg(long)]
    download: bool,

    /// Overrides OUTPUT_DIR.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

fn render(state: &LifecycleState) -> String {
    match state.view() {
        View::Placeholder => "Your masterpiece awaits".to_string(),
        View::Loading => "Generating your vision...".to_string(),
        View::Error(message) => format!("Generation failed: {}", message),
        View::Image(locator) => format!("Image ready ({} byte locator)", locator.len()),
    }
}

async fn follow(mut rx: watch::Receiver<LifecycleState>) {
    while rx.changed().await.is_ok() {
        let line = render(&rx.borrow_and_update());
        eprintln!("{}", line);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let mut orchestrator = Orchestrator::from_config(&config);
    let renderer = tokio::spawn(follow(orchestrator.subscribe()));

    orchestrator.submit(&args.prompt, &args.negative).await;

    let outcome = orchestrator.state();

    match outcome {
        LifecycleState::Succeeded(_) => {
            if args.download {
                match orchestrator.download().await {
                    Ok(Some(path)) => println!("{}", path),
                    Ok(None) => {}
                    Err(e) => {
                        error!("Failed to save image: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            drop(orchestrator);
            let _ = renderer.await;
            info!("Generation completed successfully");
            Ok(())
        }
        _ => {
            drop(orchestrator);
            let _ = renderer.await;
            error!("Generation did not produce an image");
            std::process::exit(1);
        }
    }
}
