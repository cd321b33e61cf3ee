use super::types::SchemaDefinition;
use crate::error::{GranaryError, Result};
use std::path::Path;

/// Parse a schema definition file into a SchemaDefinition
pub fn parse_schema(path: &Path) -> Result<SchemaDefinition> {
    let content = std::fs::read_to_string(path)?;
    parse_schema_str(&content)
}

/// Parse a schema YAML string into a SchemaDefinition. A text that does not
/// compile is a fatal registration error, never a per-record one.
pub fn parse_schema_str(content: &str) -> Result<SchemaDefinition> {
    let schema: SchemaDefinition = serde_yaml::from_str(content)
        .map_err(|e| GranaryError::Schema(format!("schema does not compile: {e}")))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_parse_minimal() {
        let schema = parse_schema_str(
            r#"
table: profiles
fields:
  name: { type: string, required: true }
  age: { type: number }
"#,
        )
        .unwrap();
        assert_eq!(schema.table, "profiles");
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.fields["name"].required);
        assert_eq!(schema.fields["age"].field_type, FieldType::Number);
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let result = parse_schema_str(
            "table: posts\nfields:\n  x: { type: widget }\n",
        );
        assert!(matches!(result, Err(GranaryError::Schema(_))));
    }

    #[test]
    fn test_parse_missing_table_name_fails() {
        let result = parse_schema_str("fields: {}\n");
        assert!(matches!(result, Err(GranaryError::Schema(_))));
    }
}
