use anyhow::{Context, Result, anyhow, bail};
use catalog::{CatalogIndex, FeatureClass, MediaKind, RecommendationConfig, WatchHistory};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use features::EmbeddingService;
use server::{ItemRecommendation, RecommendationOrchestrator, current_timestamp};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// media-recs - Content-based recommendations for a personal media library
#[derive(Parser)]
#[command(name = "media-recs")]
#[command(about = "Content-based movie and series recommendations", long_about = None)]
struct Cli {
    /// Path to the JSON catalog snapshot
    #[arg(short, long, default_value = "data/library.json")]
    snapshot: PathBuf,

    /// Optional JSON file with recommendation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: String,

        /// Only recommend this kind of item
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Number of recommendations per kind (defaults to the configured counts)
        #[arg(long)]
        limit: Option<usize>,

        /// Show why each item was picked
        #[arg(long)]
        explain: bool,
    },

    /// Show the taste profile derived from a user's watch history
    Profile {
        /// User ID to display
        #[arg(long)]
        user_id: String,
    },

    /// Show the feature vocabulary of the catalog
    Vocabulary {
        /// Number of most frequent features to list per class
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Time recommendation cycles over the whole catalog
    Benchmark {
        /// Number of full cycles to run
        #[arg(long, default_value = "5")]
        iterations: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Movie,
    Series,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Series => MediaKind::Series,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    println!("Loading catalog snapshot from {}...", cli.snapshot.display());
    let start = Instant::now();
    let catalog = Arc::new(
        CatalogIndex::load_from_file(&cli.snapshot).context("Failed to load catalog snapshot")?,
    );
    let (items, users, records) = catalog.counts();
    println!(
        "{} Loaded {} items, {} users and {} watch records in {:?}",
        "✓".green(),
        items,
        users,
        records,
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            kind,
            limit,
            explain,
        } => handle_recommend(catalog, config, &user_id, kind, limit, explain)?,
        Commands::Profile { user_id } => handle_profile(catalog, config, &user_id)?,
        Commands::Vocabulary { top } => handle_vocabulary(catalog, config, top)?,
        Commands::Benchmark { iterations } => {
            handle_benchmark(catalog, config, iterations).await?
        }
    }

    Ok(())
}

/// Defaults when no file is given
fn load_config(path: Option<&Path>) -> Result<RecommendationConfig> {
    let Some(path) = path else {
        return Ok(RecommendationConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = RecommendationConfig::from_json_str(&json)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    debug!("Loaded config: {:?}", config);
    Ok(config)
}

fn require_user(catalog: &CatalogIndex, user_id: &str) -> Result<()> {
    if catalog.contains_user(user_id) {
        Ok(())
    } else {
        Err(anyhow!("User {} not found", user_id))
    }
}

/// Handle the 'recommend' command
fn handle_recommend(
    catalog: Arc<CatalogIndex>,
    mut config: RecommendationConfig,
    user_id: &str,
    kind: Option<KindArg>,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    require_user(&catalog, user_id)?;
    if let Some(limit) = limit {
        config = config.with_recommendation_counts(limit, limit);
    }

    let orchestrator = RecommendationOrchestrator::new(catalog, config)?;
    let recommendations = orchestrator.recommend_for_user(user_id, current_timestamp())?;

    println!(
        "{}",
        format!("Recommendations for {} ({:?})", user_id, recommendations.mode)
            .bold()
            .blue()
    );
    let kind = kind.map(MediaKind::from);
    if kind != Some(MediaKind::Series) {
        print_recommendations("Movies", &recommendations.movies, explain);
    }
    if kind != Some(MediaKind::Movie) {
        print_recommendations("Series", &recommendations.series, explain);
    }
    Ok(())
}

/// Handle the 'profile' command
fn handle_profile(
    catalog: Arc<CatalogIndex>,
    config: RecommendationConfig,
    user_id: &str,
) -> Result<()> {
    require_user(&catalog, user_id)?;
    let mut history = catalog.watch_records(user_id);
    // Most recent first, undated last
    history.sort_by(|a, b| b.1.last_played.cmp(&a.1.last_played));
    let embedding_service = EmbeddingService::from_config(&config);
    let orchestrator = RecommendationOrchestrator::new(catalog.clone(), config)?;
    let model = orchestrator.build_model()?;

    println!("{}", format!("User: {}", user_id).bold().blue());
    println!("{}Watch records: {}", "• ".green(), history.len());

    let Some(profile) = orchestrator.profile_for_user(&model, user_id, current_timestamp())? else {
        println!(
            "{}No fully watched items yet, recommendations use catalog ratings",
            "• ".yellow()
        );
        return Ok(());
    };

    let threshold = orchestrator.config().min_watched_items_for_personalization;
    println!(
        "{}Fully watched items in profile: {} (personalized from {})",
        "• ".green(),
        profile.watched_item_count,
        threshold
    );

    // Strongest taste dimensions
    let labels = embedding_service.dimension_labels(&model.vocabulary);
    let mut weights: Vec<(&str, f32)> = labels
        .iter()
        .map(String::as_str)
        .zip(profile.taste_vector.iter().copied())
        .filter(|(_, weight)| *weight > 0.0)
        .collect();
    weights.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("Strongest taste features:");
    for (label, weight) in weights.iter().take(10) {
        println!("  - {} ({:.3})", label, weight);
    }

    println!("Recently watched:");
    for (item_id, record) in history.iter().take(5) {
        let name = catalog
            .get_item(item_id)
            .map(|item| item.name.as_str())
            .unwrap_or("<not in catalog>");
        let favorite = if record.is_favorite { " ★".yellow().to_string() } else { String::new() };
        println!("  - {} (plays: {}){}", name, record.play_count, favorite);
    }
    Ok(())
}

/// Handle the 'vocabulary' command
fn handle_vocabulary(
    catalog: Arc<CatalogIndex>,
    config: RecommendationConfig,
    top: usize,
) -> Result<()> {
    let orchestrator = RecommendationOrchestrator::new(catalog, config)?;
    let model = orchestrator.build_model()?;
    let vocabulary = &model.vocabulary;

    println!(
        "{}",
        format!(
            "Vocabulary: {} features over {} items",
            vocabulary.feature_count(),
            vocabulary.total_items
        )
        .bold()
        .blue()
    );
    if let (Some(min), Some(max)) = (vocabulary.min_year, vocabulary.max_year) {
        println!("{}Years: {} - {}", "• ".green(), min, max);
    }

    for class in FeatureClass::ALL {
        let table = vocabulary.table(class);
        println!("{}{}: {} features", "• ".cyan(), class.name(), table.len());

        let mut frequent: Vec<(&str, u32)> = table.iter_frequency().collect();
        // Most common first, alphabetical among ties
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        for (feature, df) in frequent.into_iter().take(top) {
            let idf = table.idf(feature).unwrap_or(0.0);
            println!("    {} (df {}, idf {:.3})", feature, df, idf);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<CatalogIndex>,
    config: RecommendationConfig,
    iterations: usize,
) -> Result<()> {
    if iterations == 0 {
        bail!("iterations must be at least 1");
    }
    let user_ids: Vec<String> = catalog.user_ids().cloned().collect();
    if user_ids.is_empty() {
        bail!("Snapshot has no users to benchmark");
    }
    let orchestrator = RecommendationOrchestrator::new(catalog, config)?;
    let now = current_timestamp();

    // Full cycles
    let mut cycle_timings = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        orchestrator.run_cycle(now).await?;
        cycle_timings.push(start.elapsed());
    }

    // Single users picked at random, sharing one model
    let model = orchestrator.build_model()?;
    let mut user_timings = Vec::with_capacity(iterations * 10);
    for _ in 0..iterations * 10 {
        let user_id = &user_ids[rand::random::<u32>() as usize % user_ids.len()];
        let start = Instant::now();
        orchestrator.recommend_with_model(&model, user_id, now)?;
        user_timings.push(start.elapsed());
    }

    println!("{}", "Benchmark results:".bold().blue());
    print_latencies(&format!("Cycle ({} users)", user_ids.len()), &mut cycle_timings);
    print_latencies("Single user", &mut user_timings);
    let total: Duration = user_timings.iter().sum();
    println!(
        "Throughput: {:.2} users/second",
        user_timings.len() as f32 / total.as_secs_f32().max(f32::EPSILON)
    );
    Ok(())
}

fn print_latencies(label: &str, timings: &mut [Duration]) {
    if timings.is_empty() {
        return;
    }
    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    println!(
        "{}: avg {:?}, p50 {:?}, p95 {:?}, p99 {:?}",
        label.green(),
        avg,
        percentile(0.50),
        percentile(0.95),
        percentile(0.99)
    );
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[ItemRecommendation], explain: bool) {
    println!("{}", format!("{}:", title).bold());
    if recommendations.is_empty() {
        println!("  {}", "nothing left to recommend".dimmed());
        return;
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        let year = rec.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "{}. {}{} [{}] - Score: {:.2}",
            (rank + 1).to_string().green(),
            rec.name,
            year,
            rec.genres.join(", "),
            rec.score
        );
        if explain {
            println!("   {}", rec.explanation.dimmed());
        }
    }
}
