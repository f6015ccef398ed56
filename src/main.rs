use anyhow::Result;
use clap::{Parser, Subcommand};

use askdb::config::Config;
use askdb::db::Database;
use askdb::eval;
use askdb::loader;
use askdb::matcher::TemplateMatcher;
use askdb::truth;

/// Date columns in the NYC 311 export.
const NYC_DATE_COLS: &[&str] = &["created_date", "closed_date"];

/// Columns indexed after each snapshot load.
const NYC_INDEX_COLS: &[&str] = &["created_date", "borough", "agency", "complaint_type", "status"];
const WINE_INDEX_COLS: &[&str] = &["country", "province", "variety", "points", "price"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both snapshots into the database and build indexes
    Load,
    /// Route a single question to a template and print its results
    Ask {
        /// The question to route
        question: String,
    },
    /// Run the truth fixture and report accuracy
    Eval,
}

fn run_load(config: &Config) -> Result<()> {
    let mut db = Database::open(&config.db_path)?;

    let nyc = loader::load_csv(
        &mut db,
        &config.nyc_path,
        "nyc_311",
        NYC_DATE_COLS,
        config.chunk_size,
    )?;
    db.add_indexes(&nyc.table, NYC_INDEX_COLS);

    let wine = loader::load_csv(
        &mut db,
        &config.wine_path,
        "wine_reviews",
        &[],
        config.chunk_size,
    )?;
    db.add_indexes(&wine.table, WINE_INDEX_COLS);

    println!("\n=== Done ===");
    println!("database: {}", config.db_path.display());
    println!("{}: {} rows", nyc.table, nyc.rows);
    println!("{}: {} rows", wine.table, wine.rows);
    Ok(())
}

fn run_ask(config: &Config, question: &str) -> Result<()> {
    let db = Database::open(&config.db_path)?;
    let matcher = TemplateMatcher::new();
    let template = matcher.pick(question);
    println!("matched: {}", template.label);
    for row in db.query_rows(template.sql)? {
        let cells = row.iter().map(ToString::to_string).collect::<Vec<_>>();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}

fn run_eval(config: &Config) -> Result<()> {
    let db = Database::open(&config.db_path)?;
    let truth = truth::load_truth(&config.truth_path)?;
    let matcher = TemplateMatcher::new();
    eval::evaluate(&db, &matcher, &truth)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Load => run_load(&config),
        Commands::Ask { question } => run_ask(&config, &question),
        Commands::Eval => run_eval(&config),
    }
}
