use anyhow::{bail, Context, Result};
use courtside::{builtin_franchises, DisplayOptions, FranchiseTemplate, LogoResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_PATH: &str = "courtside.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// League database (JSON)
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Where `export` writes the snapshot collections
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Where `derive` writes the page data, sitemap and robots.txt
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Root of the uploaded image store
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Public site origin, e.g. https://league.example
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Players shown per gender in the spotlight
    #[serde(default = "default_spotlight_size")]
    pub spotlight_size: usize,

    /// Season label, overriding the one stored in the database
    #[serde(default)]
    pub season: Option<String>,

    /// Team name to bundled logo path; replaces bundled entries of the same name
    #[serde(default)]
    pub logo_overrides: BTreeMap<String, String>,

    #[serde(default = "default_placeholder_logo")]
    pub placeholder_logo: String,

    /// Teams listed before they exist in the database. Unset means the bundled list.
    #[serde(default)]
    pub franchises: Option<Vec<FranchiseTemplate>>,
}

fn default_database() -> PathBuf {
    PathBuf::from("league.json")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshot")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("site")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_spotlight_size() -> usize {
    5
}

fn default_placeholder_logo() -> String {
    courtside::PLACEHOLDER_LOGO.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            snapshot_dir: default_snapshot_dir(),
            output_dir: default_output_dir(),
            image_dir: default_image_dir(),
            base_url: default_base_url(),
            spotlight_size: default_spotlight_size(),
            season: None,
            logo_overrides: BTreeMap::new(),
            placeholder_logo: default_placeholder_logo(),
            franchises: None,
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when `path` is unset and no `courtside.yml` exists in the
    /// working directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None if Path::new(DEFAULT_PATH).exists() => Self::load_file(Path::new(DEFAULT_PATH)),
            None => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.spotlight_size == 0 {
            bail!("spotlight_size must be at least 1");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must be an http(s) URL, got {:?}", self.base_url);
        }
        if self.season.as_deref().is_some_and(|season| season.trim().is_empty()) {
            bail!("season must not be empty when set");
        }
        Ok(())
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            spotlight_size: self.spotlight_size,
            logos: LogoResolver::with_builtin(&self.logo_overrides, self.placeholder_logo.clone()),
            franchises: self.franchises.clone().unwrap_or_else(builtin_franchises),
        }
    }
}
