use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod db;
mod models;
mod report;
mod score;
mod trends;
mod zones;

use config::Config;
use models::NewCheckIn;

#[derive(Parser)]
#[command(name = "burnscale")]
#[command(
    about = "Burnout journal: daily check-ins, wellness zones and reports",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample journalers and check-ins
    Seed,
    /// Import check-ins from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a daily check-in
    CheckIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        mood: String,
        #[arg(long)]
        energy: i32,
        #[arg(long)]
        meaningfulness: i32,
        #[arg(long = "trigger")]
        triggers: Vec<String>,
        #[arg(long = "recovery")]
        recovery: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Compute a burnout score without storing anything
    Score {
        #[arg(long)]
        mood: String,
        #[arg(long)]
        energy: i32,
        #[arg(long)]
        meaningfulness: i32,
        #[arg(long = "trigger")]
        triggers: Vec<String>,
    },
    /// Classify recent check-ins into wellness zones
    Zones {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 7)]
        since_days: i64,
        /// Classify per-day average scores instead of individual check-ins
        #[arg(long)]
        daily: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show weekly highlights, daily averages and trigger mix
    Trends {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 7)]
        since_days: i64,
    },
    /// Generate a markdown wellness report
    Report {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 7)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn cutoff(since_days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(since_days.max(1))
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = Config::load()?;
    info!(max_connections = config.max_connections, "connecting to Postgres");

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            mood,
            energy,
            meaningfulness,
            triggers,
        } => {
            let count = models::normalize_labels(&triggers).len();
            let score = score::compute_burnout_score(&mood, energy, meaningfulness, count)?;
            println!("Burnout score: {score}");
        }
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let inserted = db::seed(&pool).await?;
            println!("Seed data inserted ({inserted} new check-ins).");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} check-ins from {}.", csv.display());
        }
        Commands::CheckIn {
            email,
            name,
            mood,
            energy,
            meaningfulness,
            triggers,
            recovery,
            notes,
        } => {
            let pool = connect().await?;
            let entry = NewCheckIn {
                display_name: name.unwrap_or_else(|| email.clone()),
                email,
                created_at: Utc::now(),
                mood,
                energy_level: energy,
                meaningfulness,
                stress_triggers: triggers,
                recovery_activities: recovery,
                notes,
                source_key: None,
            };
            match db::insert_check_in(&pool, &entry).await? {
                Some(stored) => println!(
                    "Check-in {} saved ({} {}) burnout score {}.",
                    stored.id,
                    stored.mood,
                    stored.created_at.date_naive(),
                    stored.burnout_score
                ),
                None => println!("Check-in already recorded."),
            }
        }
        Commands::Zones {
            email,
            since_days,
            daily,
            json,
        } => {
            let pool = connect().await?;
            let check_ins = db::fetch_check_ins(&pool, cutoff(since_days), email.as_deref()).await?;
            let scores: Vec<i32> = if daily {
                report::day_scores(&trends::daily_rollup(&check_ins))
            } else {
                check_ins.iter().map(|c| c.burnout_score).collect()
            };

            let Some(summary) = zones::classify_zones(&scores) else {
                println!("No check-ins found for this window.");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            let [t0, t1, t2, t3] = summary.thresholds;
            let source = if summary.fallback {
                "fixed"
            } else {
                "population"
            };
            println!("Thresholds ({source}): {t0:.1} / {t1:.1} / {t2:.1} / {t3:.1}");
            for zone in &summary.zones {
                println!("- {}: {} ({:.1}%)", zone.zone, zone.count, zone.percent);
            }
        }
        Commands::Trends { email, since_days } => {
            let pool = connect().await?;
            let check_ins = db::fetch_check_ins(&pool, cutoff(since_days), email.as_deref()).await?;

            let Some(highlights) = trends::weekly_highlights(&check_ins) else {
                println!("No check-ins for the past {since_days} days.");
                return Ok(());
            };

            println!("Total check-ins: {}", highlights.total);
            println!(
                "Most common mood: {} ({})",
                highlights.most_common_mood, highlights.most_common_mood_count
            );
            if let Some(stat) = highlights.highest_meaning {
                println!("Highest meaningful day: {} ({})", stat.day, stat.value);
            }
            if let Some(stat) = highlights.lowest_energy {
                println!("Lowest energy day: {} ({})", stat.day, stat.value);
            }

            println!();
            println!("Daily averages:");
            for day in trends::daily_rollup(&check_ins) {
                println!(
                    "- {} score {:.1}, energy {:.1}, meaning {:.1} across {} check-ins",
                    day.date, day.avg_score, day.avg_energy, day.avg_meaning, day.check_ins
                );
            }

            let triggers = trends::trigger_counts(&check_ins);
            if !triggers.is_empty() {
                println!();
                println!("Stress triggers:");
                for trigger in triggers {
                    println!("- {}: {}x", trigger.label, trigger.count);
                }
            }
        }
        Commands::Report {
            email,
            since_days,
            out,
        } => {
            let pool = connect().await?;
            let since = cutoff(since_days);
            let check_ins = db::fetch_check_ins(&pool, since, email.as_deref()).await?;
            let report = report::build_report(
                email.as_deref(),
                since_days,
                since.date_naive(),
                &check_ins,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
