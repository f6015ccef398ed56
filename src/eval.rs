use anyhow::Result;
use log::debug;

use crate::db::{Database, Scalar};
use crate::matcher::TemplateMatcher;
use crate::truth::TruthFile;

/// Tally of one evaluation run.
#[derive(Debug)]
pub struct EvalReport {
    pub passed: usize,
    pub total: usize,
}

impl EvalReport {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

/// Run every fixture question through the matcher, execute the routed SQL,
/// and compare the rows against the expected rows, exactly and in order.
/// Prints a `[PASS]`/`[FAIL]` line per question and a final accuracy line.
pub fn evaluate(db: &Database, matcher: &TemplateMatcher, truth: &TruthFile) -> Result<EvalReport> {
    let mut passed = 0;

    for item in &truth.items {
        let template = matcher.pick(&item.question);
        debug!("'{}' routed to '{}'", item.question, template.label);

        let got = db.query_rows(template.sql)?;
        let expected = item.expected();
        let ok = got == expected;
        if ok {
            passed += 1;
        }

        println!("[{}] {}", if ok { "PASS" } else { "FAIL" }, item.question);
        if !ok {
            println!("  picked: {}", template.label);
            println!("  sql   : {}", template.sql.trim());
            println!("  expected: {}", preview(&expected));
            println!("  got     : {}", preview(&got));
        }
    }

    let report = EvalReport {
        passed,
        total: truth.items.len(),
    };
    println!(
        "\nAccuracy: {}/{} = {:.2}%",
        report.passed,
        report.total,
        report.accuracy() * 100.0
    );
    Ok(report)
}

/// First few rows, rendered compactly for the failure diagnostics.
fn preview(rows: &[Vec<Scalar>]) -> String {
    let shown = rows
        .iter()
        .take(3)
        .map(|row| {
            let cells = row.iter().map(Scalar::to_string).collect::<Vec<_>>();
            format!("({})", cells.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{shown}]")
}
