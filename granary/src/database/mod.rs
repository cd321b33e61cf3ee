use crate::config::Config;
use crate::error::{ErrorList, GranaryError, Result};
use crate::ingest::{self, IngestionReport, Outcome};
use crate::schema::{parse_schema_str, SchemaDefinition};
use crate::validation::{FieldValidator, Validate};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A named collection of validated records sharing one schema.
/// Records are keyed by slug; the sorted map gives the slug ordering the
/// output artifact requires.
pub struct Table {
    schema: SchemaDefinition,
    directory: PathBuf,
    records: BTreeMap<String, Value>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.schema.table
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Records in slug order
    pub fn records(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.records.iter()
    }

    pub fn get(&self, slug: &str) -> Option<&Value> {
        self.records.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.records.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate and store one record. A duplicate slug is rejected and the
    /// original record is left unchanged.
    fn insert(&mut self, slug: &str, document: Value, validator: &dyn Validate) -> Result<()> {
        let result = validator.validate(&self.schema, &document);
        if !result.is_ok() {
            return Err(GranaryError::Validation {
                table: self.name().to_string(),
                slug: slug.to_string(),
                violations: result.violations,
            });
        }

        if self.records.contains_key(slug) {
            return Err(GranaryError::DuplicateSlug {
                table: self.name().to_string(),
                slug: slug.to_string(),
            });
        }

        self.records.insert(slug.to_string(), document);
        Ok(())
    }
}

/// Accumulated result of ingesting every table in one build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub tables: Vec<(String, IngestionReport)>,
}

impl BuildReport {
    pub fn is_ok(&self) -> bool {
        self.tables.iter().all(|(_, report)| report.is_ok())
    }

    pub fn inserted(&self) -> usize {
        self.tables.iter().map(|(_, report)| report.inserted()).sum()
    }

    /// Every accumulated per-record error, across all tables.
    pub fn errors(&self) -> impl Iterator<Item = &GranaryError> {
        self.tables.iter().flat_map(|(_, report)| report.errors())
    }

    /// Collapse into a single result carrying every accumulated error.
    pub fn into_result(self) -> Result<()> {
        let mut errors = ErrorList::new();
        for (_, report) in self.tables {
            for (_, outcome) in report.outcomes {
                if let Outcome::Failed(err) = outcome {
                    errors.push(err);
                }
            }
        }
        errors.into_result()
    }
}

/// The aggregate root for one build run: registered tables in registration
/// order, the resolved configuration, and the validation capability.
/// State is rebuilt from scratch on every run.
pub struct Database {
    config: Config,
    tables: Vec<Table>,
    index: HashMap<String, usize>,
    validator: Box<dyn Validate>,
}

impl Database {
    pub fn open(config: Config) -> Self {
        Self::with_validator(config, Box::new(FieldValidator))
    }

    /// Open with a custom constraint engine behind the `Validate` seam.
    pub fn with_validator(config: Config, validator: Box<dyn Validate>) -> Self {
        Database {
            config,
            tables: Vec::new(),
            index: HashMap::new(),
            validator,
        }
    }

    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = Config::load(path)?;
        Ok(Self::open(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register one schema definition and bind a table to it. Creates the
    /// table's data directory if absent. Compile failures and duplicate table
    /// names are fatal: schemas are a precondition, not a per-record concern.
    pub fn register(&mut self, schema_text: &str) -> Result<()> {
        let schema = parse_schema_str(schema_text)?;
        schema.check()?;

        if self.index.contains_key(&schema.table) {
            return Err(GranaryError::Schema(format!(
                "table '{}' is already registered",
                schema.table
            )));
        }

        let directory = self.config.data_dir.join(&schema.table);
        std::fs::create_dir_all(&directory)?;
        log::debug!(
            "registered table '{}' at {}",
            schema.table,
            directory.display()
        );

        self.index.insert(schema.table.clone(), self.tables.len());
        self.tables.push(Table {
            schema,
            directory,
            records: BTreeMap::new(),
        });
        Ok(())
    }

    /// Walk the configured schema directory and register every file in it.
    /// The walk is sorted so registration order (and therefore output order)
    /// does not depend on platform directory order.
    pub fn register_schema_dir(&mut self) -> Result<()> {
        let dir = self.config.schema_dir.clone();
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            GranaryError::Config(format!(
                "cannot read schema directory {}: {e}",
                dir.display()
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            log::debug!("registering schema {}", path.display());
            let text = std::fs::read_to_string(&path)?;
            self.register(&text)?;
        }
        Ok(())
    }

    /// Tables in registration order
    pub fn get_tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&idx| &self.tables[idx])
    }

    /// Delegate an insert to the named table.
    pub fn insert(&mut self, table: &str, slug: &str, document: Value) -> Result<()> {
        let idx = *self
            .index
            .get(table)
            .ok_or_else(|| GranaryError::TableNotFound(table.to_string()))?;
        let validator = self.validator.as_ref();
        self.tables[idx].insert(slug, document, validator)
    }

    /// Ingest every table's data directory. Per-record failures are
    /// accumulated in the report; every table is processed before the
    /// overall build decides success or failure.
    pub fn build(&mut self) -> Result<BuildReport> {
        let names: Vec<String> = self.tables.iter().map(|t| t.name().to_string()).collect();

        let mut report = BuildReport::default();
        for name in names {
            log::debug!("scanning table '{name}'");
            let table_report = ingest::ingest_table(self, &name)?;
            report.tables.push((name, table_report));
        }
        Ok(report)
    }

    /// Resolve every declared reference field across all tables. Each
    /// dangling (table, slug, field, value) is its own violation; nothing is
    /// deduplicated and nothing is mutated. Opt-in at build time: callers
    /// decide whether an intentionally partial dataset is acceptable.
    pub fn check_references(&self) -> Result<()> {
        let mut errors = ErrorList::new();

        for table in &self.tables {
            for (field, target) in table.schema().reference_fields() {
                let Some(target_table) = self.table(&target) else {
                    errors.push(GranaryError::Schema(format!(
                        "table '{}' field '{field}' references unknown table '{target}'",
                        table.name()
                    )));
                    continue;
                };

                for (slug, record) in table.records() {
                    let Some(value) = record.get(field.as_str()) else {
                        continue;
                    };
                    let mut check = |slug_value: &str| {
                        if !target_table.contains(slug_value) {
                            errors.push(GranaryError::Reference {
                                table: table.name().to_string(),
                                slug: slug.clone(),
                                field: field.clone(),
                                target: target.clone(),
                                value: slug_value.to_string(),
                            });
                        }
                    };
                    match value {
                        Value::String(s) => check(s),
                        Value::Sequence(items) => {
                            for item in items.iter().filter_map(Value::as_str) {
                                check(item);
                            }
                        }
                        // Shape problems are validation's job, not ours
                        _ => {}
                    }
                }
            }
        }

        errors.into_result()
    }

    /// The canonical aggregate: table name → slug → record data, tables in
    /// registration order and slugs sorted. Filesystem walk order never
    /// leaks into the artifact.
    pub fn output(&self) -> Result<serde_json::Value> {
        let mut root = serde_json::Map::new();
        for table in &self.tables {
            let mut records = serde_json::Map::new();
            for (slug, value) in table.records() {
                records.insert(slug.clone(), serde_json::to_value(value)?);
            }
            root.insert(table.name().to_string(), serde_json::Value::Object(records));
        }
        Ok(serde_json::Value::Object(root))
    }
}
