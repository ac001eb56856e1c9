use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::DataIndex;
use recommender::{Recommender, ScoredMovie};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// MovieRecs - content-based and collaborative movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie recommendation engine using content similarity and collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the movie attributes file
    #[arg(long, env = "MOVIE_RECS_ATTRIBUTES", default_value = "data/movies_features.txt")]
    attributes: PathBuf,

    /// Path to the user ratings file
    #[arg(long, env = "MOVIE_RECS_RATINGS", default_value = "data/ranks_matrix.txt")]
    ratings: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend by similarity to the user's preference vector
    Content {
        /// User to get recommendations for
        #[arg(long)]
        user: String,

        /// Number of ranked movies to show
        #[arg(long, default_value = "1")]
        limit: usize,
    },

    /// Predict a user's rating of a movie
    Predict {
        #[arg(long)]
        movie: String,

        #[arg(long)]
        user: String,

        /// Number of similar rated movies to use
        #[arg(short, long, default_value = "3")]
        k: usize,
    },

    /// Recommend by item-based collaborative filtering
    Cf {
        /// User to get recommendations for
        #[arg(long)]
        user: String,

        /// Number of similar rated movies to use per prediction
        #[arg(short, long, default_value = "3")]
        k: usize,

        /// Number of ranked movies to show
        #[arg(long, default_value = "1")]
        limit: usize,
    },

    /// Show a user's ratings and preference vector
    User {
        #[arg(long)]
        user: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Neighborhood size for collaborative filtering requests
        #[arg(short, long, default_value = "3")]
        k: usize,
    },
}

#[derive(Serialize)]
struct RankingOutput<'a> {
    user: &'a str,
    strategy: &'a str,
    movies: &'a [ScoredMovie],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.attributes, &cli.ratings)
            .context("Failed to load movie data")?,
    );
    if !cli.json {
        println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    }

    let recommender = Recommender::new(data_index);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Content { user, limit } => handle_content(&recommender, &user, limit, cli.json)?,
        Commands::Predict { movie, user, k } => handle_predict(&recommender, &movie, &user, k, cli.json)?,
        Commands::Cf { user, k, limit } => handle_cf(&recommender, &user, k, limit, cli.json)?,
        Commands::User { user } => handle_user(&recommender, &user, cli.json)?,
        Commands::Benchmark {
            requests,
            concurrent,
            k,
        } => handle_benchmark(recommender, requests, concurrent, k).await?,
    }

    Ok(())
}

/// Handle the 'content' command
fn handle_content(recommender: &Recommender, user: &str, limit: usize, json: bool) -> Result<()> {
    if limit <= 1 {
        let movie = recommender
            .recommend_by_content(user)
            .with_context(|| format!("No content-based recommendation for {}", user))?;
        return print_single(user, "content", &movie, json);
    }

    let ranked = recommender
        .rank_by_content(user, limit)
        .with_context(|| format!("No content-based ranking for {}", user))?;
    print_ranking(user, "content", &ranked, "similarity", json)
}

/// Handle the 'predict' command
fn handle_predict(recommender: &Recommender, movie: &str, user: &str, k: usize, json: bool) -> Result<()> {
    let prediction = recommender
        .predict_rating(movie, user, k)
        .with_context(|| format!("Cannot predict {} for {}", movie, user))?;

    if json {
        let output = serde_json::json!({ "user": user, "movie": movie, "k": k, "prediction": prediction });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Predicted rating of {} by {} (k = {}): {}",
            movie.bold(),
            user.bold(),
            k,
            format!("{:.3}", prediction).green()
        );
    }
    Ok(())
}

/// Handle the 'cf' command
fn handle_cf(recommender: &Recommender, user: &str, k: usize, limit: usize, json: bool) -> Result<()> {
    if limit <= 1 {
        let movie = recommender
            .recommend_by_collaborative_filtering(user, k)
            .with_context(|| format!("No collaborative filtering recommendation for {}", user))?;
        return print_single(user, "collaborative", &movie, json);
    }

    let ranked = recommender
        .rank_by_collaborative_filtering(user, k, limit)
        .with_context(|| format!("No collaborative filtering ranking for {}", user))?;
    print_ranking(user, "collaborative", &ranked, "predicted rating", json)
}

/// Handle the 'user' command
fn handle_user(recommender: &Recommender, user: &str, json: bool) -> Result<()> {
    let index = recommender.data_index();
    let ratings = index
        .get_user_ratings(user)
        .ok_or_else(|| anyhow!("User {} not found", user))?;
    let profile = recommender.preference_profile(user).ok();

    if json {
        let output = serde_json::json!({ "ratings": ratings, "profile": profile });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format!("User: {}", user).bold().blue());
    println!(
        "{}Rated {} of {} movies",
        "• ".green(),
        ratings.rated_count(),
        index.movies().len()
    );

    match &profile {
        Some(profile) => {
            println!("{}Mean rating: {:.2}", "• ".green(), profile.mean);
            let vector = profile
                .vector
                .iter()
                .map(|v| format!("{:.2}", v))
                .collect::<Vec<_>>()
                .join(", ");
            println!("{}Preference vector: [{}]", "• ".green(), vector);
        }
        None => println!("{}No preference vector (no ratings)", "• ".yellow()),
    }

    // Highest rated first
    let mut rated: Vec<(&str, f64)> = ratings
        .rated()
        .map(|(pos, r)| (index.movies()[pos].name.as_str(), r))
        .collect();
    rated.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("Ratings:");
    for (movie, rating) in rated {
        println!("  - {} ({})", movie, rating);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    recommender: Recommender,
    requests: usize,
    concurrent: usize,
    k: usize,
) -> Result<()> {
    let users = recommender.data_index().user_names().to_vec();
    if users.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark: need at least one user and one request"));
    }

    // Pick random users for each request
    let picks: Vec<String> = (0..requests)
        .map(|_| users[rand::random::<u32>() as usize % users.len()].clone())
        .collect();

    info!(
        "Benchmarking {} requests across {} users (concurrency {}, k = {})",
        requests,
        users.len(),
        concurrent,
        k
    );

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for (i, user) in picks.into_iter().enumerate() {
        let recommender = recommender.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let elapsed = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                // Alternate strategies; domain errors count as answered requests
                let _ = if i % 2 == 0 {
                    recommender.recommend_by_content(&user)
                } else {
                    recommender.recommend_by_collaborative_filtering(&user, k)
                };
                start.elapsed()
            })
            .await?;
            Ok::<_, anyhow::Error>(elapsed)
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let busy: Duration = timings.iter().sum();
    let avg_latency = busy / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_single(user: &str, strategy: &str, movie: &str, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({ "user": user, "strategy": strategy, "movie": movie });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} recommendation for {}: {}",
            strategy,
            user.bold(),
            movie.green().bold()
        );
    }
    Ok(())
}

/// Helper function to format and print a ranking
fn print_ranking(user: &str, strategy: &str, ranked: &[ScoredMovie], score_label: &str, json: bool) -> Result<()> {
    if json {
        let output = RankingOutput {
            user,
            strategy,
            movies: ranked,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format!("Movie Recommendations for {} ({}):", user, strategy).bold().blue());
    for (i, movie) in ranked.iter().enumerate() {
        println!(
            "{}. {} - {}: {:.3}",
            (i + 1).to_string().green(),
            movie.name,
            score_label,
            movie.score
        );
    }
    Ok(())
}
