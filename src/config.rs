use anyhow::{ensure, Context, Result};
use std::env;
use std::path::PathBuf;

/// Runtime configuration, resolved once from the process environment and
/// passed explicitly into the loader and evaluator.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// NYC 311 snapshot (CSV, optionally gzip-compressed).
    pub nyc_path: PathBuf,
    /// Wine Reviews snapshot (CSV, optionally gzip-compressed).
    pub wine_path: PathBuf,
    /// Truth fixture file (JSON).
    pub truth_path: PathBuf,
    /// Rows per load chunk.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/app.db"),
            nyc_path: PathBuf::from("data/raw/nyc_311_12mo.csv.gz"),
            wine_path: PathBuf::from("data/raw/winemag-data-130k-v2.csv"),
            truth_path: PathBuf::from("truth/qna.json"),
            chunk_size: 100_000,
        }
    }
}

impl Config {
    /// Resolve the configuration, letting environment variables override the
    /// defaults: `DATABASE_URL`, `NYC311_SNAPSHOT`, `WINE_SNAPSHOT`,
    /// `TRUTH_PATH`, `CHUNKSIZE`.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();
        let chunk_size = match env::var("CHUNKSIZE") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("invalid CHUNKSIZE '{raw}'"))?,
            Err(_) => defaults.chunk_size,
        };
        ensure!(chunk_size >= 1, "CHUNKSIZE must be at least 1");

        let db_path = match env::var("DATABASE_URL") {
            Ok(url) => db_path_from_url(&url),
            Err(_) => defaults.db_path,
        };

        Ok(Self {
            db_path,
            nyc_path: env_path("NYC311_SNAPSHOT", defaults.nyc_path),
            wine_path: env_path("WINE_SNAPSHOT", defaults.wine_path),
            truth_path: env_path("TRUTH_PATH", defaults.truth_path),
            chunk_size,
        })
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var_os(key).map(PathBuf::from).unwrap_or(default)
}

/// Accepts either a plain file path or a `sqlite://`-style connection string.
fn db_path_from_url(url: &str) -> PathBuf {
    let trimmed = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url);
    PathBuf::from(trimmed)
}
