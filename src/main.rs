use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use festival_insights::analyzers::hashtags::DEFAULT_MIN_USAGE;
use festival_insights::db::{self, PgWarehouse};
use festival_insights::models::DailyMetricPoint;
use festival_insights::quality;
use festival_insights::report;
use festival_insights::{InsightsEngine, LookbackWindow, MetricsSource};

#[derive(Parser)]
#[command(name = "festival-insights")]
#[command(about = "Cross-signal social insights for the festival dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the warehouse schema
    InitDb,
    /// Load a deterministic 30-day dataset
    Seed,
    /// Import daily metrics from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print key insights and action items
    Insights {
        #[arg(long, default_value_t = 30)]
        days: i64,
        #[arg(long, default_value_t = DEFAULT_MIN_USAGE)]
        min_usage: usize,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value_t = 30)]
        days: i64,
        #[arg(long, default_value_t = DEFAULT_MIN_USAGE)]
        min_usage: usize,
        #[arg(long, default_value = "insights.md")]
        out: PathBuf,
    },
    /// Check whether each daily series is dense enough to trust
    Quality {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "festival_insights=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must point at the analytics warehouse")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool, today).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} daily rows from {}.", csv.display());
        }
        Commands::Insights {
            days,
            min_usage,
            json,
        } => {
            let engine =
                InsightsEngine::new(Arc::new(PgWarehouse::new(pool))).with_min_usage(min_usage);
            let insights = engine.generate(LookbackWindow::new(days), today).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
                return Ok(());
            }

            for warning in &insights.warnings {
                println!("! {warning}");
            }
            if insights.key_insights.is_empty() {
                println!("No insights for this window yet.");
            } else {
                println!("Key insights:");
                for insight in &insights.key_insights {
                    println!("- {insight}");
                }
            }
            println!("Action items:");
            for item in &insights.action_items {
                println!("- [{}] {}", item.priority.as_str(), item.action);
            }
        }
        Commands::Report {
            days,
            min_usage,
            out,
        } => {
            let engine =
                InsightsEngine::new(Arc::new(PgWarehouse::new(pool))).with_min_usage(min_usage);
            let insights = engine.generate(LookbackWindow::new(days), today).await;
            std::fs::write(&out, report::build_markdown(&insights))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Quality { days } => {
            let window = LookbackWindow::new(days);
            let since = window.since(today);
            let warehouse = PgWarehouse::new(pool);

            let engagement = warehouse.engagement(since).await?;
            let series = [
                (
                    "engagement",
                    engagement
                        .iter()
                        .map(|day| DailyMetricPoint::new(day.date, day.engagement))
                        .collect::<Vec<_>>(),
                ),
                (
                    "reach",
                    engagement
                        .iter()
                        .map(|day| DailyMetricPoint::new(day.date, day.reach))
                        .collect(),
                ),
                ("sentiment", warehouse.sentiment(since).await?),
                ("follower", warehouse.followers(since).await?),
            ];

            for (metric, points) in series {
                let assessment = quality::assess(metric, &points, window.days() as usize);
                let verdict = if assessment.reliable {
                    "reliable"
                } else {
                    "unreliable"
                };
                println!(
                    "{metric}: {verdict} ({} populated days)",
                    assessment.populated_days
                );
                for warning in &assessment.warnings {
                    println!("  ! {warning}");
                }
            }
        }
    }

    Ok(())
}
