use crate::database::Database;
use crate::error::{GranaryError, Result};
use crate::markdown;
use std::path::{Path, PathBuf};

/// Per-file outcome of one table's ingestion pass.
#[derive(Debug)]
pub enum Outcome {
    Inserted,
    /// Extension not in the table's accepted set. Mixed-content directories
    /// (images next to data files) are expected, so a skip is never an error.
    Skipped,
    Failed(GranaryError),
}

/// Accumulation of (slug, outcome) pairs for one table.
#[derive(Debug, Default)]
pub struct IngestionReport {
    pub outcomes: Vec<(String, Outcome)>,
}

impl IngestionReport {
    pub fn is_ok(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|(_, o)| matches!(o, Outcome::Failed(_)))
    }

    pub fn inserted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Inserted))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Skipped))
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &GranaryError> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            Outcome::Failed(err) => Some(err),
            _ => None,
        })
    }
}

/// Walk one table's data directory and insert every eligible file. The walk
/// is recursive and sorted; directory entries produce no records. Every
/// file-level failure (read, parse, validate, duplicate) is recorded in the
/// report and the walk continues, so one malformed record never blocks the
/// rest of the dataset.
pub fn ingest_table(db: &mut Database, table_name: &str) -> Result<IngestionReport> {
    let table = db
        .table(table_name)
        .ok_or_else(|| GranaryError::TableNotFound(table_name.to_string()))?;
    let directory = table.directory().to_path_buf();
    let extensions = table.schema().extensions.clone();

    let pattern = format!("{}/**/*", directory.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| GranaryError::Other(format!("glob error: {e}")))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut report = IngestionReport::default();
    for path in files {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if !extensions.iter().any(|e| e == ext) {
            log::debug!("skipping {} (unsupported extension)", path.display());
            report.outcomes.push((slug, Outcome::Skipped));
            continue;
        }

        log::debug!("processing {}", path.display());
        match ingest_file(db, table_name, &slug, &path, ext) {
            Ok(()) => report.outcomes.push((slug, Outcome::Inserted)),
            Err(err) => {
                log::warn!("{err}");
                report.outcomes.push((slug, Outcome::Failed(err)));
            }
        }
    }

    Ok(report)
}

/// Read, normalize, parse, and insert a single file.
fn ingest_file(
    db: &mut Database,
    table: &str,
    slug: &str,
    path: &Path,
    ext: &str,
) -> Result<()> {
    let parse_error = |message: String| GranaryError::Parse {
        table: table.to_string(),
        slug: slug.to_string(),
        message,
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| parse_error(format!("cannot read {}: {e}", path.display())))?;

    // Markdown is normalized into the same structured shape first
    let document = if ext == "md" || ext == "mdx" {
        markdown::to_document(&text)
    } else {
        serde_yaml::from_str(&text).map_err(GranaryError::from)
    }
    .map_err(|e| parse_error(e.to_string()))?;

    db.insert(table, slug, document)
}
