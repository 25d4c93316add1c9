//! Sample CSV generator
//!
//! Writes realistic-looking `<object>.csv` files for local testing of the
//! relationship scan and destination loading without API access.

use crate::error::{Error, Result};
use crate::types::ObjectType;
use chrono::DateTime;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Rows generated per object type by default
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Default directory for sample files
pub const DEFAULT_SAMPLE_DIR: &str = "sample_hubspot_data";

/// 2025-01-01T00:00:00Z
const CREATED_FROM: i64 = 1_735_689_600;
/// 2025-08-10T00:00:00Z
const CREATED_TO: i64 = 1_754_784_000;

const FIRST_NAMES: &[&str] = &["Ava", "Liam", "Maya", "Noah", "Iris", "Omar", "Lena", "Kai"];
const LAST_NAMES: &[&str] = &["Garcia", "Chen", "Okafor", "Novak", "Silva", "Patel", "Berg"];
const COMPANY_WORDS: &[&str] = &["Summit", "Harbor", "Vertex", "Pioneer", "Beacon", "Cobalt"];
const COMPANY_SUFFIXES: &[&str] = &["Labs", "Group", "Systems", "Partners", "Holdings"];
const PHRASE_ADJECTIVES: &[&str] = &["Scalable", "Integrated", "Adaptive", "Seamless", "Robust"];
const PHRASE_NOUNS: &[&str] = &["platform", "workflow", "initiative", "solution", "framework"];
const WORDS: &[&str] = &[
    "alpha", "orbit", "maple", "signal", "harvest", "quartz", "meadow", "ember", "delta",
];
const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Random entry of a non-empty word list
fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Generated table: headers plus rows of rendered fields
#[derive(Debug, Clone)]
pub struct SampleTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Object-specific columns appended after the common ones
fn extra_headers(object: &str) -> &'static [&'static str] {
    match object {
        "companies" => &["company_name", "industry"],
        "contacts" => &["first_name", "last_name", "email"],
        "deals" => &["deal_name", "amount", "deal_stage"],
        "calls" => &["rep_name", "call_type", "outcome", "duration", "phone_number"],
        _ => &["name", "description"],
    }
}

fn extra_fields<R: Rng + ?Sized>(object: &str, rng: &mut R) -> Vec<String> {
    match object {
        "companies" => vec![
            format!("{} {}", pick(rng, COMPANY_WORDS), pick(rng, COMPANY_SUFFIXES)),
            pick(rng, &["Tech", "Finance", "Healthcare", "Retail"]).to_string(),
        ],
        "contacts" => {
            let first = pick(rng, FIRST_NAMES);
            let last = pick(rng, LAST_NAMES);
            vec![
                first.to_string(),
                last.to_string(),
                format!(
                    "{}.{}{}@{}",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    rng.random_range(1..100),
                    pick(rng, DOMAINS)
                ),
            ]
        }
        "deals" => vec![
            format!("{} {}", pick(rng, PHRASE_ADJECTIVES), pick(rng, PHRASE_NOUNS)),
            rng.random_range(1000..20000).to_string(),
            pick(rng, &["Prospecting", "Negotiation", "Closed Won", "Closed Lost"])
                .to_string(),
        ],
        "calls" => vec![
            format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
            pick(rng, &["Outbound", "Inbound"]).to_string(),
            pick(rng, &["Connected", "Voicemail", "No Answer", "Busy"]).to_string(),
            rng.random_range(30..1800).to_string(),
            format!(
                "+1-{}-{}-{:04}",
                rng.random_range(200..1000),
                rng.random_range(200..1000),
                rng.random_range(0..10000)
            ),
        ],
        _ => {
            let mut name = pick(rng, WORDS).to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            let description = format!(
                "{} {} {} {}.",
                pick(rng, PHRASE_ADJECTIVES),
                pick(rng, WORDS),
                pick(rng, PHRASE_NOUNS),
                pick(rng, WORDS)
            );
            vec![name, description]
        }
    }
}

/// Generate `rows` sample rows for an object type
pub fn generate_table(object: &str, rows: usize) -> SampleTable {
    let mut rng = rand::rng();
    let mut headers = vec!["id", "createdAt", "hs_object_id"];
    headers.extend_from_slice(extra_headers(object));

    let rows = (0..rows)
        .map(|_| {
            let created = DateTime::from_timestamp(rng.random_range(CREATED_FROM..CREATED_TO), 0)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            let mut row = vec![
                Uuid::new_v4().to_string(),
                created,
                rng.random_range(100_000..1_000_000).to_string(),
            ];
            row.extend(extra_fields(object, &mut rng));
            row
        })
        .collect();

    SampleTable { headers, rows }
}

/// Write `<dir>/<object>.csv` with generated rows
pub fn write_sample(dir: &Path, object: &str, rows: usize) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::output(format!("Failed to create output directory {}: {e}", dir.display()))
    })?;

    let table = generate_table(object, rows);
    let path = dir.join(format!("{object}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Generate sample files for every object type concurrently
pub async fn generate_all(
    dir: &Path,
    objects: &[ObjectType],
    rows: usize,
) -> Result<Vec<PathBuf>> {
    let tasks = objects.iter().map(|object| {
        let dir = dir.to_path_buf();
        let name = object.name.clone();
        tokio::task::spawn_blocking(move || {
            let path = write_sample(&dir, &name, rows)?;
            info!(object = %name, rows, "Sample records generated");
            Ok::<_, Error>(path)
        })
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined
                .map_err(|e| Error::Other(format!("Sample task failed: {e}")))
                .and_then(std::convert::identity)
        })
        .collect()
}
