use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use feedrank::app::App;
use feedrank::config::Config;
use feedrank::models::Article;
use feedrank::services::{refresh_channel, refresh_summary, MemoryCache, RefreshWorker};

#[derive(Parser)]
#[command(name = "feedrank", version, about = "Feed subscriptions and ranked articles")]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a user's subscriptions, reads and preferences
    Show { user: String },
    /// Subscribe a user to a feed URL
    Subscribe { user: String, url: String },
    /// Unsubscribe a user from a feed URL
    Unsubscribe { user: String, url: String },
    /// List cached summaries of a user's feeds
    Feeds { user: String },
    /// Suggest feeds the user is not subscribed to
    Suggest { user: String },
    /// Add an article from a subscribed feed to a user's list
    AddArticle {
        user: String,
        feed_url: String,
        title: String,
        url: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Record that a user opened an article
    Select {
        user: String,
        feed_url: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Rank a user's articles by preference
    Rank { user: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let cache = Arc::new(MemoryCache::new());
    let (queue, rx) = refresh_channel(config.refresh_queue_capacity);
    let app = App::open(&config, cache.clone(), Arc::new(queue))
        .await
        .with_context(|| format!("failed to open database {}", config.db_path))?;

    // Refreshes are fire-and-forget; the worker drains whatever was queued before exit.
    let worker = tokio::spawn(RefreshWorker::new(Arc::clone(app.store()), cache.clone(), rx).run());

    run_command(&app, &cache, cli.command).await?;

    drop(app);
    let refreshed = worker.await.context("refresh worker panicked")?;
    tracing::debug!("Refreshed {} feeds before exit", refreshed);

    Ok(())
}

async fn run_command(
    app: &App<feedrank::db::Repository>,
    cache: &MemoryCache,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Show { user } => {
            let user = app.user(&user).await?;
            println!("{} ({} read)", user.id, user.total_read);
            for url in &user.subscribed_feed_urls {
                println!("  feed  {}", url);
            }
            for pref in &user.preferences {
                println!("  pref  {}={} ({})", pref.field, pref.value, pref.score);
            }
            println!("  {} articles", user.articles.len());
        }

        Command::Subscribe { user, url } => {
            let url = normalize_feed_url(&url)?;
            let user = app.subscribe_user(&user, &url).await?;
            println!("Subscribed {} to {}", user.id, url);
        }

        Command::Unsubscribe { user, url } => {
            // Match what was stored, which may predate normalization (config catalogs).
            let record = app.user(&user).await?;
            let url = match record.subscribed_url(&url) {
                Some(stored) => stored.to_string(),
                None => normalize_feed_url(&url)?,
            };
            let user = app.unsubscribe_user(&user, &url).await?;
            println!("Unsubscribed {} from {}", user.id, url);
        }

        Command::Feeds { user } => {
            // The cache lives only as long as this process, so warm it first.
            let record = app.user(&user).await?;
            for url in &record.subscribed_feed_urls {
                if let Err(e) = refresh_summary(app.store().as_ref(), cache, url).await {
                    tracing::warn!("Failed to refresh {}: {}", url, e);
                }
            }
            for summary in app.feed_list(&user).await? {
                println!(
                    "{}{}  {} subscribers",
                    summary.url,
                    if summary.is_default { " (default)" } else { "" },
                    summary.subscriber_count
                );
            }
        }

        Command::Suggest { user } => {
            for feed in app.suggested_feeds(&user).await? {
                println!(
                    "{}{}",
                    feed.url,
                    if feed.is_default { " (default)" } else { "" }
                );
            }
        }

        Command::AddArticle {
            user,
            feed_url,
            title,
            url,
            author,
        } => {
            let mut article = Article::new(normalize_feed_url(&feed_url)?, title, url);
            article.author = author;
            article.published_at = Some(chrono::Utc::now());
            let user = app.add_article(&user, article).await?;
            println!("{} now has {} articles", user.id, user.articles.len());
        }

        Command::Select {
            user,
            feed_url,
            author,
        } => {
            let mut article =
                Article::new(normalize_feed_url(&feed_url)?, String::new(), String::new());
            article.author = author;
            let user = app.record_selection(&user, &article).await?;
            println!("{} has read {} articles", user.id, user.total_read);
        }

        Command::Rank { user } => {
            for ranked in app.ranked_articles(&user).await? {
                println!(
                    "{:>6}  {}  {}",
                    ranked.score, ranked.article.title, ranked.article.url
                );
            }
        }
    }

    Ok(())
}

fn normalize_feed_url(raw: &str) -> anyhow::Result<String> {
    let url = url::Url::parse(raw).with_context(|| format!("invalid feed URL: {}", raw))?;
    Ok(url.to_string())
}
