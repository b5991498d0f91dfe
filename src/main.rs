//! courtside - league database maintenance and public page data

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use courtside::{
    player_profile, robots, sitemap, Actor, DirStore, HttpTranslator, League, ResultSubmission,
    SiteData, Snapshot, Stamp,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Maintain the league database and build the data the public site renders
#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "Basketball league data tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./courtside.yml when present)
    #[arg(short, long, env = "COURTSIDE_CONFIG")]
    config: Option<PathBuf>,

    /// League database, overriding the config file
    #[arg(long, env = "COURTSIDE_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the database and verify its consistency
    Check,
    /// Write the flat snapshot collections
    Export {
        /// Output directory (defaults to snapshot_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Build page data, sitemap and robots.txt from a snapshot
    Derive {
        /// Snapshot directory (defaults to snapshot_dir)
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Output directory (defaults to output_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Record a final score and box score from a JSON submission
    RecordResult {
        /// Submission file
        submission: PathBuf,
        /// Email of the admin recording the result
        #[arg(long, env = "COURTSIDE_ACTOR")]
        actor: String,
    },
    /// Rebuild every player's season averages from the game history
    Recompute {
        #[arg(long, env = "COURTSIDE_ACTOR")]
        actor: String,
    },
    /// Delete a team with its roster, staff and images
    DeleteTeam {
        /// Team name
        name: String,
        #[arg(long, env = "COURTSIDE_ACTOR")]
        actor: String,
    },
    /// Machine-translate every news article into one base language
    TranslateNews {
        /// Language the articles should end up in, e.g. "fr"
        #[arg(long)]
        target: String,
        /// LibreTranslate compatible service
        #[arg(long, env = "COURTSIDE_TRANSLATE_URL")]
        endpoint: String,
        #[arg(long, env = "COURTSIDE_TRANSLATE_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long, env = "COURTSIDE_ACTOR")]
        actor: String,
    },
    /// Print the sitemap XML for a snapshot
    Sitemap {
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Print robots.txt
    Robots,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "courtside=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    match cli.command {
        Commands::Check => {
            let league = open(&config)?;
            let db = league.database();
            println!(
                "{}: season {}, {} teams, {} players, {} games ({} completed)",
                config.database.display(),
                db.season,
                db.teams.len(),
                db.players.len(),
                db.games.len(),
                db.games.values().filter(|g| g.is_completed()).count(),
            );
        }
        Commands::Export { dir } => {
            let league = open(&config)?;
            let dir = dir.unwrap_or_else(|| config.snapshot_dir.clone());
            Snapshot::from_database(league.database())
                .write_dir(&dir)
                .with_context(|| format!("Failed to write snapshot to {:?}", dir))?;
        }
        Commands::Derive { snapshot, out } => {
            let snapshot = read_snapshot(&config, snapshot)?;
            let out = out.unwrap_or_else(|| config.output_dir.clone());
            derive(&config, &snapshot, &out)
                .with_context(|| format!("Failed to write page data to {:?}", out))?;
        }
        Commands::RecordResult { submission, actor } => {
            let mut league = open(&config)?;
            let stamp = stamp_for(&league, &actor)?;
            let json = fs_err::read_to_string(&submission)?;
            let submission: ResultSubmission = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse submission {:?}", submission))?;
            let recorded = league
                .record_result(&stamp, submission)
                .context("Result rejected")?;
            league.save(&config.database)?;
            println!(
                "recorded game {}: {} lines ({} empty dropped), {} players updated",
                recorded.game, recorded.lines, recorded.dropped, recorded.players_updated
            );
        }
        Commands::Recompute { actor } => {
            let mut league = open(&config)?;
            let stamp = stamp_for(&league, &actor)?;
            let updated = league.recompute_averages(&stamp);
            league.save(&config.database)?;
            println!("recomputed averages for {} players", updated);
        }
        Commands::DeleteTeam { name, actor } => {
            let mut league = open(&config)?;
            let stamp = stamp_for(&league, &actor)?;
            let id = league
                .database()
                .team_by_name(&name)
                .map(|team| team.id)
                .with_context(|| format!("No team named {:?}", name))?;
            let mut store = DirStore::new(&config.image_dir)?;
            let removal = league.delete_team(&stamp, id, &mut store)?;
            league.save(&config.database)?;
            println!(
                "deleted {}: {} players, {} staff, {} images",
                name, removal.players, removal.staff, removal.images
            );
        }
        Commands::TranslateNews {
            target,
            endpoint,
            api_key,
            actor,
        } => {
            let mut league = open(&config)?;
            let stamp = stamp_for(&league, &actor)?;
            let mut translator = HttpTranslator::new(&endpoint, api_key)?;
            let result = league.translate_news(&stamp, &mut translator, &target);
            // Articles rewritten before a failure are kept.
            league.save(&config.database)?;
            let rewritten = result.context("Translation stopped")?;
            println!("translated {} articles to {}", rewritten, target);
        }
        Commands::Sitemap { snapshot } => {
            let snapshot = read_snapshot(&config, snapshot)?;
            print!("{}", sitemap(&config.base_url, &snapshot));
        }
        Commands::Robots => print!("{}", robots(&config.base_url)),
    }
    Ok(())
}

fn open(config: &Config) -> Result<League> {
    let mut league = League::open(&config.database)
        .with_context(|| format!("Failed to open league database {:?}", config.database))?;
    if let Some(season) = &config.season {
        league.set_season(season)?;
    }
    Ok(league)
}

fn read_snapshot(config: &Config, dir: Option<PathBuf>) -> Result<Snapshot> {
    let dir = dir.unwrap_or_else(|| config.snapshot_dir.clone());
    Snapshot::read_dir(&dir).with_context(|| format!("Failed to read snapshot {:?}", dir))
}

fn stamp_for(league: &League, email: &str) -> Result<Stamp> {
    let admin = league
        .database()
        .admin_users
        .values()
        .find(|admin| admin.email.eq_ignore_ascii_case(email.trim()))
        .with_context(|| format!("No admin user with email {:?}", email))?;
    Ok(Stamp::now(Actor {
        uid: admin.id,
        email: admin.email.clone(),
    }))
}

fn derive(config: &Config, snapshot: &Snapshot, out: &Path) -> Result<()> {
    let options = config.display_options();
    let site = SiteData::build(snapshot, &options);
    fs_err::create_dir_all(out)?;
    fs_err::write(out.join("site.json"), serde_json::to_string_pretty(&site)?)?;

    let mut profiles = 0;
    for page in &site.teams {
        for player in &page.roster {
            let Some(profile) = player_profile(snapshot, &options, &page.team.name, player.number)
            else {
                continue;
            };
            let file = out.join(format!("{}.json", profile_file(&page.team.path, player.number)));
            if let Some(parent) = file.parent() {
                fs_err::create_dir_all(parent)?;
            }
            fs_err::write(file, serde_json::to_string_pretty(&profile)?)?;
            profiles += 1;
        }
    }

    let map = sitemap(&config.base_url, snapshot);
    fs_err::write(out.join("sitemap.xml"), map.to_string())?;
    fs_err::write(out.join("robots.txt"), robots(&config.base_url))?;
    info!(
        out = %out.display(),
        teams = site.teams.len(),
        profiles,
        urls = map.len(),
        "derived page data"
    );
    Ok(())
}

/// `/teams/<slug>` plus the jersey, relative to the output directory.
fn profile_file(team_path: &str, number: u8) -> String {
    format!("{}/players/{}", team_path.trim_start_matches('/'), number)
}
