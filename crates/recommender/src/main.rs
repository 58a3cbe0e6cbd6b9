//! movie-recommend: print the top-N movie recommendations for a user
//!
//! Reads MovieLens `u.data` / `u.item` files, builds the recommendation
//! context once, and prints a ranked list for the requested user.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dotenvy::dotenv;
use movie_recommender::{
    init_logging, loader, RecommendationContext, RecommenderConfig, Strategy,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "movie-recommend")]
#[command(about = "Recommend unseen movies from MovieLens ratings", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(help = "User to recommend for (e.g. 1 to 943 for MovieLens 100K)")]
    user_id: u32,

    #[arg(short = 'n', long, help = "Number of recommendations [default: ranking.default_limit]")]
    limit: Option<usize>,

    #[arg(
        short,
        long,
        default_value = "model",
        help = "Recommendation strategy: model or heuristic"
    )]
    strategy: Strategy,

    #[arg(long, env = "RECOMMENDER_RATINGS", help = "Path to the u.data ratings file")]
    ratings: Option<PathBuf>,

    #[arg(long, env = "RECOMMENDER_ITEMS", help = "Path to the u.item catalog file")]
    items: Option<PathBuf>,

    #[arg(short = 'k', long, help = "Neighborhood size for the model strategy")]
    neighbors: Option<usize>,

    #[arg(long, help = "Print recommendations as JSON")]
    json: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let mut config = RecommenderConfig::load().context("Failed to load configuration")?;
    if let Some(path) = cli.ratings {
        config.data.ratings_path = path;
    }
    if let Some(path) = cli.items {
        config.data.items_path = path;
    }
    if let Some(neighbors) = cli.neighbors {
        config.model.neighbors = neighbors;
    }
    config.validate().context("Invalid command line options")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;

    let (ratings, items) = loader::load_dataset(&config.data).with_context(|| {
        format!(
            "Failed to load MovieLens data from {} and {}",
            config.data.ratings_path.display(),
            config.data.items_path.display()
        )
    })?;

    let context = RecommendationContext::from_records(ratings, items, &config)
        .context("Failed to build recommendation context")?;

    let limit = cli.limit.unwrap_or(config.ranking.default_limit);
    info!(user_id = cli.user_id, limit, strategy = %cli.strategy, "Generating recommendations");

    let recommendations = context
        .service()
        .get_recommendations(cli.user_id, limit, cli.strategy)
        .with_context(|| format!("Failed to recommend for user {}", cli.user_id))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    if recommendations.is_empty() {
        println!("{}", "No recommendations could be produced.".yellow());
        return Ok(());
    }

    println!("{}", "Recommended Movies:".bold());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{:>3}. {} - score {:.2} ({})",
            rank + 1,
            rec.title.green(),
            rec.score,
            rec.basis
        );
    }

    Ok(())
}
