use anyhow::{Context, Result};
use log::warn;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::ident::clean_name;

/// A single cell of a loaded row or a query result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Null => ToSqlOutput::Owned(Value::Null),
            Scalar::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Scalar::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Scalar::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for Scalar {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Scalar::Null,
            ValueRef::Integer(i) => Scalar::Int(i),
            ValueRef::Real(f) => Scalar::Real(f),
            ValueRef::Text(t) => Scalar::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Scalar::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Real(r) => write!(f, "{r}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Drop any existing table of this name and create a fresh, typeless one
    /// with the given (already normalized) columns. Each inserted value keeps
    /// its own affinity.
    pub fn replace_table(&self, table: &str, columns: &[String]) -> Result<()> {
        let cols = columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn
            .execute_batch(&format!(
                "DROP TABLE IF EXISTS \"{table}\";\nCREATE TABLE \"{table}\" ({cols});"
            ))
            .with_context(|| format!("failed to replace table '{table}'"))?;
        Ok(())
    }

    /// Append a chunk of rows inside a single transaction.
    pub fn append_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Scalar>],
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let col_list = columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO \"{table}\" ({col_list}) VALUES ({placeholders})"
            ))?;
            for row in rows {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }
        tx.commit()
            .with_context(|| format!("failed to append rows to '{table}'"))?;
        Ok(())
    }

    /// Best-effort secondary indexes: one attempt per column. A failed
    /// attempt is logged with its cause and skipped; it never aborts the
    /// remaining attempts or the run.
    pub fn add_indexes(&self, table: &str, cols: &[&str]) {
        for col in cols {
            let col = clean_name(col);
            let idx = format!("idx_{table}_{col}");
            let sql = format!("CREATE INDEX IF NOT EXISTS \"{idx}\" ON \"{table}\"(\"{col}\")");
            match self.conn.execute(&sql, []) {
                Ok(_) => println!("  - index on {table}({col}) OK"),
                Err(e) => warn!("index on {table}({col}) skipped: {e}"),
            }
        }
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let n = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                row.get(0)
            })?;
        Ok(n)
    }

    /// Run a SQL statement and collect every result row, in statement order.
    pub fn query_rows(&self, sql: &str) -> Result<Vec<Vec<Scalar>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ncols = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                let mut out = Vec::with_capacity(ncols);
                for i in 0..ncols {
                    out.push(Scalar::from(row.get_ref(i)?));
                }
                Ok(out)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Column names of a table, in declaration order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
        let cols = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cols)
    }
}
