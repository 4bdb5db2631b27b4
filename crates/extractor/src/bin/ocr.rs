use clap::{Parser, Subcommand};
use extractor::{
    ExtractionResult, ImageExtractor, NormalizationConfig, OpenRouterClient, PromptSet,
    ResponseExtractor, normalize,
    extractors::openrouter_client::{DEFAULT_BASE_URL, DEFAULT_MODEL},
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ocr")]
#[command(
    about = "Image OCR through a remote vision model, with rule-based normalization",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "OCR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[arg(long, env = "OCR_PROMPTS_DIR", default_value = "prompts")]
    prompts_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an image to the model and print the normalized result
    Process {
        image: PathBuf,

        #[command(flatten)]
        gateway: GatewayArgs,

        /// Also write the result as pretty JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the response extractor over a saved model answer (stdin if no file)
    Extract { file: Option<PathBuf> },
    /// Normalize text fragments with the loaded rules
    Normalize {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Load and validate the normalization config
    CheckConfig,
    /// List models available to the API key and check the configured one
    Models {
        #[command(flatten)]
        gateway: GatewayArgs,
    },
}

#[derive(clap::Args)]
struct GatewayArgs {
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "OPENROUTER_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl GatewayArgs {
    fn client(self) -> Result<OpenRouterClient, Box<dyn std::error::Error>> {
        Ok(OpenRouterClient::new(self.base_url, self.api_key, self.model)?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ocr={},extractor={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Process {
            image,
            gateway,
            output,
        } => {
            handle_process(image, gateway, output, &cli.config, &cli.prompts_dir).await?;
        }
        Commands::Extract { file } => {
            handle_extract(file, &cli.config).await?;
        }
        Commands::Normalize { text } => {
            let config = NormalizationConfig::from_path(&cli.config)?;
            for fragment in text {
                println!("{}", normalize(&fragment, &config));
            }
        }
        Commands::CheckConfig => {
            let config = NormalizationConfig::from_path(&cli.config)?;
            tracing::info!(
                "✓ {} is valid: {} literal rules, {} pattern rules",
                cli.config.display(),
                config.replace_rules().len(),
                config.specific_replacements().len()
            );
        }
        Commands::Models { gateway } => {
            handle_models(gateway).await?;
        }
    }

    Ok(())
}

async fn handle_process(
    image: PathBuf,
    gateway: GatewayArgs,
    output: Option<PathBuf>,
    config_path: &Path,
    prompts_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = NormalizationConfig::from_path(config_path)?;
    let prompts = PromptSet::from_dir_or_default(prompts_dir)?;
    let client = gateway.client()?;

    let extractor = ImageExtractor::new(
        Arc::new(client),
        ResponseExtractor::new(Arc::new(config)),
        prompts,
    );

    tracing::info!("Processing image: {}", image.display());
    let result = extractor.extract_from_file(&image).await?;

    print_result(&result, output).await
}

async fn handle_extract(
    file: Option<PathBuf>,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = NormalizationConfig::from_path(config_path)?;

    let response = match file {
        Some(path) => tokio::fs::read_to_string(&path).await?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let result = ResponseExtractor::new(Arc::new(config)).extract_from_response(&response)?;
    print_result(&result, None).await
}

async fn handle_models(gateway: GatewayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = gateway.client()?;
    let models = client.list_models().await?;

    for model in &models {
        println!(
            "{}\t{}\t{}",
            model.id,
            model.name.as_deref().unwrap_or("-"),
            model
                .context_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    if models.iter().any(|m| m.id == client.model()) {
        tracing::info!("✓ Configured model '{}' is available", client.model());
    } else {
        tracing::warn!("Configured model '{}' was not listed", client.model());
    }

    Ok(())
}

async fn print_result(
    result: &ExtractionResult,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);

    if let Some(path) = output {
        tokio::fs::write(&path, &json).await?;
        tracing::info!("Saved to: {}", path.display());
    }

    Ok(())
}
