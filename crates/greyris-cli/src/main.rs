use anyhow::Result;
use clap::{Parser, Subcommand};
use greyris_config::{report_unused_keys, UnusedKeyPolicy};

mod commands;

#[derive(Parser)]
#[command(name = "greyris")]
#[command(about = "Sorts your Spotify playlists", long_about = None)]
#[command(after_help = "Sorting rules: artist -> album release date -> disc/track number")]
struct Cli {
    /// Layered config YAML paths in merge order (later overrides earlier)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort playlists given by link or alias
    Sort {
        /// Playlist links, `spotify:playlist:` URIs, ids or aliases
        playlists: Vec<String>,

        /// Sort every aliased playlist
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Print the planned moves without changing anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Add (or update) an alias for a playlist link
    Add { alias: String, link: String },

    /// Remove aliases
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(required = true)]
        aliases: Vec<String>,
    },

    /// List aliases
    List,

    /// Authorize with Spotify and store the token
    Login,

    /// Forget the stored token
    Logout,

    /// Print the effective config as canonical JSON
    Config {
        /// Fail when the config has keys nothing reads
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    let path_refs: Vec<&str> = cli.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = greyris_config::load_layered_yaml(&path_refs)?;

    if let Commands::Config { strict } = cli.cmd {
        let policy = if strict {
            UnusedKeyPolicy::Fail
        } else {
            UnusedKeyPolicy::Warn
        };
        let report = report_unused_keys(&loaded.config_json, policy)?;
        println!("data_dir={}", loaded.settings.data_dir().display());
        println!("unused_keys={}", report.unused_leaf_pointers.len());
        for p in &report.unused_leaf_pointers {
            println!("unused_key={p}");
        }
        println!("{}", loaded.canonical_json()?);
        return Ok(());
    }

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for p in &report.unused_leaf_pointers {
        tracing::warn!(pointer = %p, "unused config key");
    }

    let cfg = loaded.settings;
    let pool = greyris_db::connect(&cfg.data_dir()).await?;

    match cli.cmd {
        Commands::Sort {
            playlists,
            all,
            dry_run,
        } => commands::sort::run(&cfg, &pool, &playlists, all, dry_run).await?,
        Commands::Add { alias, link } => commands::alias::add(&pool, &alias, &link).await?,
        Commands::Remove { aliases } => commands::alias::remove(&pool, &aliases).await?,
        Commands::List => commands::alias::list(&pool).await?,
        Commands::Login => commands::session::login(&cfg, &pool).await?,
        Commands::Logout => commands::session::logout(&pool).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only `key=value` results.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
