//! reelcat - movie catalog browser CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reelcat_api::tmdb::{CatalogApi, CatalogClient, MovieSummary, youtube_video_id};
use reelcat_core::{
    DetailController, FavoriteRecordExt, FavoritesController, FavoritesStore, PageOutcome,
    PaginationController, SearchController, SqliteFavoritesStore,
};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{API_KEY_ENV, AppConfig, CatalogConfig, resolve_config_path};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List popular movies.
    Popular(PopularArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// Show a movie with its trailers and favorite status.
    Detail(DetailArgs),
    /// Show (or open) the first playable trailer of a movie.
    Trailer(TrailerArgs),
    /// Manage local favorites.
    Favorites(FavoritesCommand),
}

/// Arguments for the `popular` subcommand.
#[derive(clap::Args)]
struct PopularArgs {
    /// Number of pages to load.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for.
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `detail` subcommand.
#[derive(clap::Args)]
struct DetailArgs {
    /// Catalog movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `trailer` subcommand.
#[derive(clap::Args)]
struct TrailerArgs {
    /// Catalog movie ID.
    #[arg(long, required = true)]
    id: u64,

    /// Open the trailer in the default browser.
    #[arg(long)]
    open: bool,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List favorites sorted by title.
    List,
    /// Add the movie to favorites, or remove it if already there.
    Toggle(FavoriteIdArgs),
    /// Remove a movie from favorites.
    Remove(FavoriteIdArgs),
}

/// Movie ID argument for favorites subcommands.
#[derive(clap::Args)]
struct FavoriteIdArgs {
    /// Catalog movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Loads the config file for `dir`.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    AppConfig::load(&path)
}

/// Builds the catalog client from config and the `TMDB_API_KEY` override.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_catalog_client(config: &CatalogConfig) -> Result<Arc<CatalogClient>> {
    let api_key = config
        .resolve_api_key(std::env::var(API_KEY_ENV).ok())
        .with_context(|| {
            format!("{API_KEY_ENV} environment variable or [catalog].api_key is required")
        })?;

    let mut builder = CatalogClient::builder()
        .api_key(api_key)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(Duration::from_secs(config.timeout_secs));
    if let Some(base_url) = &config.base_url {
        let url = Url::parse(base_url).with_context(|| format!("invalid base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(language) = &config.language {
        builder = builder.language(language);
    }

    builder
        .build()
        .map(Arc::new)
        .context("failed to build catalog client")
}

/// Opens the favorites store under `dir`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn open_store(dir: Option<&PathBuf>) -> Result<Arc<SqliteFavoritesStore>> {
    SqliteFavoritesStore::open(dir)
        .map(Arc::new)
        .context("failed to open favorites database")
}

/// Logs one row of a movie list.
fn log_movie_row(movie: &MovieSummary) {
    tracing::info!(
        "{}\t{}\t{}\t{}",
        movie.id,
        movie.rating_label().as_deref().unwrap_or("-"),
        movie
            .release_year()
            .map_or_else(|| String::from("-"), |y| y.to_string()),
        movie.title.as_deref().unwrap_or("-"),
    );
}

/// Runs the `popular` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or a page fails to load.
#[instrument(skip_all)]
async fn run_popular(args: &PopularArgs, config: &AppConfig) -> Result<()> {
    let client = build_catalog_client(&config.catalog)?;
    let controller = PaginationController::new(client);

    for _ in 0..args.pages {
        match controller.request_next_page().await {
            PageOutcome::Loaded { count } => tracing::debug!(count, "page loaded"),
            PageOutcome::Exhausted => {
                tracing::info!("No more pages.");
                break;
            }
            PageOutcome::Failed => {
                let state = controller.state();
                bail!(
                    "failed to load popular movies: {}",
                    state.last_error.unwrap_or_default()
                );
            }
            PageOutcome::Skipped => break,
        }
    }

    let state = controller.state();
    tracing::info!(
        "Loaded {} movies ({} pages)",
        state.results.len(),
        state.current_page.saturating_sub(1)
    );
    tracing::info!("ID\tRating\tYear\tTitle");
    for movie in &state.results {
        log_movie_row(movie);
    }

    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the search fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, config: &AppConfig) -> Result<()> {
    let client = build_catalog_client(&config.catalog)?;
    let controller = SearchController::with_debounce(
        client,
        Duration::from_millis(config.search.debounce_ms),
    );
    let mut rx = controller.subscribe();

    controller.set_query(args.query.as_str());
    let state = rx
        .wait_for(|s| s.resolved_query.as_deref() == Some(args.query.as_str()))
        .await
        .context("search driver stopped")?
        .clone();

    if let Some(err) = state.last_error {
        bail!("search failed: {err}");
    }
    if state.results.is_empty() {
        tracing::info!("No results.");
        return Ok(());
    }

    tracing::info!("Results: {}", state.results.len());
    tracing::info!("ID\tRating\tYear\tTitle");
    for movie in &state.results {
        log_movie_row(movie);
    }

    Ok(())
}

/// Runs the `detail` subcommand.
///
/// # Errors
///
/// Returns an error if the client or store fails to open, or the movie fails to load.
#[instrument(skip_all)]
async fn run_detail(args: &DetailArgs, config: &AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_catalog_client(&config.catalog)?;
    let store = open_store(dir)?;
    let controller = DetailController::new(client, store, args.id);

    if !controller.load().await {
        let state = controller.state();
        bail!(
            "failed to load movie {}: {}",
            args.id,
            state.last_error.unwrap_or_default()
        );
    }

    let state = controller.state();
    let Some(details) = state.details else {
        bail!("movie {} has no details", args.id);
    };
    let detail = &details.detail;

    tracing::info!("{}", detail.title.as_deref().unwrap_or("-"));
    tracing::info!(
        "Released: {}",
        detail.release_date.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "Rating: {}",
        detail.rating_label().as_deref().unwrap_or("-")
    );
    if let Some(runtime) = detail.runtime {
        tracing::info!("Runtime: {runtime} min");
    }
    tracing::info!("Genres: {}", detail.genre_names());
    if let Some(poster) = detail.poster_url() {
        tracing::info!("Poster: {poster}");
    }
    tracing::info!("Favorite: {}", if state.is_favorite { "yes" } else { "no" });
    if let Some(overview) = detail.overview.as_deref().filter(|o| !o.is_empty()) {
        tracing::info!("{overview}");
    }

    let trailers: Vec<_> = details.playable_trailers().collect();
    if trailers.is_empty() {
        tracing::info!("No trailers.");
    }
    for trailer in trailers {
        tracing::info!(
            "Trailer: {}\t{}",
            trailer.name.as_deref().unwrap_or("-"),
            trailer.watch_url().unwrap_or_default()
        );
    }

    Ok(())
}

/// Runs the `trailer` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build, the request fails, or the
/// browser cannot be launched.
#[instrument(skip_all)]
async fn run_trailer(args: &TrailerArgs, config: &AppConfig) -> Result<()> {
    let client = build_catalog_client(&config.catalog)?;
    let trailers = client
        .fetch_trailers(args.id)
        .await
        .with_context(|| format!("failed to fetch trailers for movie {}", args.id))?;

    let Some((trailer, embed)) = trailers
        .iter()
        .find_map(|t| t.embed_url().map(|embed| (t, embed)))
    else {
        tracing::info!("No playable trailer for movie {}.", args.id);
        return Ok(());
    };
    let watch = trailer.watch_url().unwrap_or_default();
    let Some(video_id) = youtube_video_id(&watch) else {
        bail!("trailer {} has no YouTube video id", trailer.id);
    };

    tracing::info!("{}", trailer.name.as_deref().unwrap_or("-"));
    tracing::info!("Video: {video_id}");
    tracing::info!("Watch: {watch}");
    tracing::info!("Embed: {embed}");

    if args.open {
        open::that(&watch).with_context(|| format!("failed to open {watch}"))?;
    }

    Ok(())
}

/// Runs `favorites list`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read.
#[instrument(skip_all)]
fn run_favorites_list(dir: Option<&PathBuf>) -> Result<()> {
    let controller = FavoritesController::new(open_store(dir)?);
    controller.refresh();

    let state = controller.state();
    if let Some(err) = state.last_error {
        bail!("failed to load favorites: {err}");
    }
    if state.favorites.is_empty() {
        tracing::info!("No favorites yet. Use `favorites toggle --id <ID>` to add one.");
        return Ok(());
    }

    tracing::info!("Favorites: {}", state.favorites.len());
    tracing::info!("ID\tRating\tYear\tTitle");
    for favorite in &state.favorites {
        log_movie_row(&favorite.to_summary());
    }

    Ok(())
}

/// Runs `favorites toggle`.
///
/// # Errors
///
/// Returns an error if the movie cannot be fetched or the store update fails.
#[instrument(skip_all)]
async fn run_favorites_toggle(
    args: &FavoriteIdArgs,
    config: &AppConfig,
    dir: Option<&PathBuf>,
) -> Result<()> {
    let client = build_catalog_client(&config.catalog)?;
    let detail = client
        .fetch_detail(args.id)
        .await
        .with_context(|| format!("failed to fetch movie {}", args.id))?;

    let controller = FavoritesController::new(open_store(dir)?);
    let Some(now_favorite) = controller.toggle(&detail.summary()) else {
        bail!(
            "failed to toggle favorite: {}",
            controller.state().last_error.unwrap_or_default()
        );
    };

    let title = detail.title.as_deref().unwrap_or("-");
    if now_favorite {
        tracing::info!("Added to favorites: {title}");
    } else {
        tracing::info!("Removed from favorites: {title}");
    }

    Ok(())
}

/// Runs `favorites remove`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or updated.
#[instrument(skip_all)]
fn run_favorites_remove(args: &FavoriteIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let existing = store
        .find(args.id)
        .with_context(|| format!("failed to read favorite {}", args.id))?;
    let Some(existing) = existing else {
        tracing::info!("Movie {} is not a favorite.", args.id);
        return Ok(());
    };

    let controller = FavoritesController::new(store);
    controller.remove(args.id);

    if let Some(err) = controller.state().last_error {
        bail!("failed to remove favorite {}: {err}", args.id);
    }
    tracing::info!(
        "Removed from favorites: {} ({} left)",
        existing.title,
        controller.state().favorites.len()
    );

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    let config = load_config(dir)?;
    match cli.command {
        Commands::Popular(args) => run_popular(&args, &config).await,
        Commands::Search(args) => run_search(&args, &config).await,
        Commands::Detail(args) => run_detail(&args, &config, dir).await,
        Commands::Trailer(args) => run_trailer(&args, &config).await,
        Commands::Favorites(cmd) => match cmd.command {
            FavoritesSubcommands::List => run_favorites_list(dir),
            FavoritesSubcommands::Toggle(args) => run_favorites_toggle(&args, &config, dir).await,
            FavoritesSubcommands::Remove(args) => run_favorites_remove(&args, dir),
        },
    }
}
