use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resampler::FilterKind;
use scaler::console;
use scaler::models::AppConfig;
use scaler::services::ScaleController;

#[derive(Parser)]
#[command(name = "scaler")]
#[command(about = "Interactive image scaler with background resampling")]
struct Cli {
    /// Image to open on start
    image: Option<PathBuf>,

    /// YAML configuration file (defaults to $SCALER_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Filter used after loading: nearest, bilinear, bicubic or lanczos
    #[arg(short, long)]
    filter: Option<FilterKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the console session
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scaler=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli
        .config
        .or_else(|| std::env::var("SCALER_CONFIG").ok().map(PathBuf::from));
    let mut config = AppConfig::load(config_path.as_deref());
    if let Some(filter) = cli.filter {
        config.default_filter = filter;
    }

    let mut controller = ScaleController::from_config(&config);
    if let Some(path) = &cli.image {
        // A bad start image is reported like any other failed load
        let _ = controller.load_path(path);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    console::run(&mut controller, stdin, tokio::io::stdout()).await?;

    tracing::debug!("Session ended");
    Ok(())
}
