//! askdb: a one-shot batch tool that loads two flat-file snapshots (NYC 311
//! service requests and Wine Reviews) into SQLite and answers a fixed set of
//! analytics questions by routing each question to a hand-written SQL
//! template via TF-IDF cosine similarity.

pub mod config;
pub mod db;
pub mod eval;
pub mod ident;
pub mod loader;
pub mod matcher;
pub mod templates;
pub mod truth;
