//! End-to-end pipeline test: write small snapshot files (one gzipped), load
//! them through the chunked loader, build the indexes, then run a truth
//! fixture through the matcher and evaluator.

use askdb::db::Database;
use askdb::eval::evaluate;
use askdb::loader::load_csv;
use askdb::matcher::TemplateMatcher;
use askdb::truth::load_truth;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const NYC_CSV: &str = "\
Created Date,Closed Date,Borough,Agency,Complaint Type,Descriptor,Status,Incident Zip
01/01/2026 10:00:00 AM,01/01/2026 12:00:00 PM,BROOKLYN,NYPD,Noise - Residential,Loud Music,Closed,10001
01/02/2026 10:00:00 AM,01/02/2026 02:00:00 PM,BROOKLYN,NYPD,Noise - Residential,Loud Music,Closed,11201
01/03/2026 10:00:00 AM,01/03/2026 11:00:00 AM,QUEENS,DEP,Water Leak,,Closed,11355
01/04/2026 10:00:00 AM,,BROOKLYN,DSNY,Dirty Sidewalk,,Open,10002
";

const WINE_CSV: &str = "\
Country,Province,Variety,Points,Price
Italy,Tuscany,Red Blend,90,20
Italy,Tuscany,Red Blend,92,
Italy,Veneto,Glera,87,
France,Bordeaux,Merlot,95,50
France,Loire,Chenin Blanc,85,
Spain,Rioja,Tempranillo,88,15
";

fn write_gzipped(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    fs::write(path, enc.finish().unwrap()).unwrap();
}

fn write_truth(path: &Path) {
    let fixture = serde_json::json!({
        "items": [
            {
                "question": "Top-3 boroughs by request volume in the last 30 days",
                "expected_rows": [["BROOKLYN", 3], ["QUEENS", 1]]
            },
            {
                "question": "Borough with the shortest average close time (hours)",
                "expected_rows": [["QUEENS", 1.0]]
            },
            {
                "question": "Share of requests with status = 'Closed' for ZIPs starting with 100",
                "expected_rows": [[50.0]]
            },
            {
                "question": "Top-5 countries by average points",
                "expected_rows": [
                    ["France", 90.0, 2],
                    ["Italy", 89.67, 3],
                    ["Spain", 88.0, 1]
                ]
            },
            {
                "question": "Overall missing price percentage",
                "expected_rows": [[50.0]]
            }
        ]
    });
    fs::write(path, serde_json::to_string_pretty(&fixture).unwrap()).unwrap();
}

struct Workspace {
    _dir: tempfile::TempDir,
    db_path: PathBuf,
    nyc_path: PathBuf,
    wine_path: PathBuf,
    truth_path: PathBuf,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let nyc_path = dir.path().join("nyc_311_12mo.csv.gz");
    let wine_path = dir.path().join("winemag.csv");
    let truth_path = dir.path().join("qna.json");
    write_gzipped(&nyc_path, NYC_CSV);
    fs::write(&wine_path, WINE_CSV).unwrap();
    write_truth(&truth_path);
    Workspace {
        db_path: dir.path().join("data/app.db"),
        _dir: dir,
        nyc_path,
        wine_path,
        truth_path,
    }
}

#[test]
fn load_then_eval_reaches_full_accuracy() {
    let ws = workspace();
    let mut db = Database::open(&ws.db_path).unwrap();

    let nyc = load_csv(
        &mut db,
        &ws.nyc_path,
        "nyc_311",
        &["created_date", "closed_date"],
        3,
    )
    .unwrap();
    db.add_indexes(
        &nyc.table,
        &["created_date", "borough", "agency", "complaint_type", "status"],
    );

    let wine = load_csv(&mut db, &ws.wine_path, "wine_reviews", &[], 3).unwrap();
    db.add_indexes(
        &wine.table,
        &["country", "province", "variety", "points", "price"],
    );

    assert_eq!(nyc.table, "nyc_311");
    assert_eq!(nyc.rows, 4);
    assert_eq!(db.count_rows("nyc_311").unwrap(), 4);
    assert_eq!(wine.rows, 6);
    assert_eq!(db.count_rows("wine_reviews").unwrap(), 6);
    assert_eq!(
        db.table_columns("nyc_311").unwrap(),
        vec![
            "created_date",
            "closed_date",
            "borough",
            "agency",
            "complaint_type",
            "descriptor",
            "status",
            "incident_zip",
        ]
    );

    let truth = load_truth(&ws.truth_path).unwrap();
    let matcher = TemplateMatcher::new();
    let report = evaluate(&db, &matcher, &truth).unwrap();
    assert_eq!(report.total, 5);
    assert_eq!(
        report.passed, 5,
        "every canonical question should reproduce its fixture rows"
    );
}

#[test]
fn database_persists_between_stages() {
    let ws = workspace();

    // Stage one: the loader process.
    {
        let mut db = Database::open(&ws.db_path).unwrap();
        load_csv(&mut db, &ws.wine_path, "wine_reviews", &[], 100).unwrap();
    }

    // Stage two: a fresh connection sees the loaded table.
    let db = Database::open(&ws.db_path).unwrap();
    assert_eq!(db.count_rows("wine_reviews").unwrap(), 6);
}
