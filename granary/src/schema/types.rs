use crate::error::{GranaryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One schema definition file binds one table. The table name doubles as the
/// data directory name and the output key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub table: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldDefinition>,
    /// File extensions accepted in the table's data directory. Anything else
    /// is skipped silently during ingestion.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".into(), "yml".into(), "md".into(), "mdx".into()]
}

/// Definition of a single field constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// For `ref` fields: the table whose slugs this field points at.
    #[serde(default)]
    pub target: Option<String>,
}

/// Field type enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Datetime,
    List,
    Object,
    Ref,
}

impl SchemaDefinition {
    /// Compile-time sanity checks beyond what serde enforces. A schema that
    /// fails here is a fatal registration error.
    pub fn check(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(GranaryError::Schema("table name is empty".into()));
        }
        for (name, field) in &self.fields {
            if field.field_type == FieldType::Ref && field.target.is_none() {
                return Err(GranaryError::Schema(format!(
                    "field '{name}' in table '{}' is a ref but declares no target",
                    self.table
                )));
            }
        }
        Ok(())
    }

    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    /// All declared reference fields as (field name, target table) pairs,
    /// sorted by field name so violation lists are deterministic.
    pub fn reference_fields(&self) -> Vec<(String, String)> {
        let mut refs: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|(_, def)| def.field_type == FieldType::Ref)
            .filter_map(|(name, def)| def.target.clone().map(|t| (name.clone(), t)))
            .collect();
        refs.sort();
        refs
    }
}
