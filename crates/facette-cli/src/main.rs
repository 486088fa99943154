use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facette_ai::{test_connection, DeepSeekClient};
use facette_core::{classify, extract_metrics, FaceBox, FaceCapture, LandmarkSet, Product};
use facette_engine::{cancellation, AnalysisReport, AnalysisRequest, Analyzer, Config};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facette", about = "Facial geometry analysis and product recommendations")]
struct Cli {
    /// TOML configuration file (FACETTE_* variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a captured face: AI first, local classifier as fallback
    Analyze {
        /// Capture file: {"box": {...}, "landmarks": ...}
        capture: PathBuf,
        /// Jitter seed (default: current time in milliseconds)
        #[arg(long)]
        seed: Option<i64>,
        /// Skip the AI provider
        #[arg(long)]
        local: bool,
        /// Product catalog file (TOML or JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run only the local classifier on a capture
    Classify {
        capture: PathBuf,
        #[arg(long)]
        seed: Option<i64>,
    },
    /// List the product catalog
    Catalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Check that the AI provider answers
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            capture,
            seed,
            local,
            catalog,
            json,
        } => {
            if catalog.is_some() {
                config.catalog_path = catalog;
            }
            let (landmarks, face_box) = read_capture(&capture)?;
            let request = AnalysisRequest {
                landmarks,
                face_box,
                seed: seed.unwrap_or_else(now_millis),
            };

            let catalog = config.catalog().context("failed to load catalog")?;
            let analyzer = Analyzer::new(&catalog, &config);
            let client = if local { None } else { ai_client(&config) };

            let (cancel, signal) = cancellation();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received; cancelling AI request");
                    cancel.cancel();
                }
            });

            let report = analyzer
                .analyze(&request, client.as_ref(), Some(signal))
                .await
                .context("analysis failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Classify { capture, seed } => {
            let (landmarks, face_box) = read_capture(&capture)?;
            let metrics = extract_metrics(&landmarks, &face_box).context("invalid landmarks")?;
            let classification = classify(&metrics, seed.unwrap_or_else(now_millis));
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Commands::Catalog { catalog } => {
            if catalog.is_some() {
                config.catalog_path = catalog;
            }
            let catalog = config.catalog().context("failed to load catalog")?;
            if catalog.is_empty() {
                println!("Catalog is empty");
            }
            for product in catalog.iter() {
                println!("{:>4}  {:<60}  {}", product.id, product.title, format_price(product));
            }
        }
        Commands::Ping => {
            let Some(client) = ai_client(&config) else {
                bail!("AI provider not configured (set FACETTE_AI_API_KEY)");
            };
            println!("Contacting {} ...", client.config().endpoint);
            if test_connection(&client).await {
                println!("AI provider: OK");
            } else {
                bail!("AI provider unreachable or gave an unexpected reply");
            }
        }
    }

    Ok(())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn read_capture(path: &Path) -> Result<(LandmarkSet, FaceBox)> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read capture {}", path.display()))?;
    let capture: FaceCapture = serde_json::from_str(&src)
        .with_context(|| format!("invalid capture {}", path.display()))?;
    let landmarks = capture
        .landmarks
        .into_set()
        .context("flat landmark arrays must hold exactly 68 points")?;
    Ok((landmarks, capture.face_box))
}

fn ai_client(config: &Config) -> Option<DeepSeekClient> {
    if !config.ai_active() {
        tracing::info!("AI provider disabled or missing API key; local analysis only");
        return None;
    }
    match DeepSeekClient::new(config.deepseek()) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "AI client unavailable; local analysis only");
            None
        }
    }
}

fn format_price(product: &Product) -> String {
    format!("{}.{:03} {}", product.price / 1000, product.price % 1000, product.currency)
}

fn print_report(report: &AnalysisReport<'_>) {
    let c = &report.classification;
    println!("Analysis {} ({:?})", report.id, report.source);
    println!("  Age:        {}", c.age_bracket);
    println!("  Skin:       {}", c.skin_type);
    println!("  Face shape: {}", c.face_shape);
    println!("  Confidence: {:.0}%", report.confidence * 100.0);
    println!("  Score:      {} (hash {})", c.diagnostic_score, c.face_hash);

    println!("\nRecommended products:");
    for r in &report.recommendations {
        println!("  [{}] {} ({}) - {}", r.priority, r.product.title, format_price(r.product), r.reason);
    }

    println!("\nTips:");
    for tip in &report.tips {
        println!("  - {tip}");
    }

    if !report.personality_traits.is_empty() {
        println!("\nPersonality: {}", report.personality_traits.join(", "));
    }
    if !report.product_hints.is_empty() {
        println!("Suggested care: {}", report.product_hints.join(", "));
    }
    println!("\n{}", report.explanation);
}
