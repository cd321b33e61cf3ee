use crate::schema::{FieldDefinition, FieldType, SchemaDefinition};
use serde_yaml::Value;

/// Result of validating a document against a schema
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub violations: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The constraint capability. The table store only depends on this contract,
/// never on the constraint language behind it.
pub trait Validate {
    fn validate(&self, schema: &SchemaDefinition, document: &Value) -> ValidationResult;
}

/// Default validator: declared field types, required fields, and reference
/// field shape.
#[derive(Debug, Default)]
pub struct FieldValidator;

impl Validate for FieldValidator {
    fn validate(&self, schema: &SchemaDefinition, document: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();

        let mapping = match document.as_mapping() {
            Some(m) => m,
            None => {
                result
                    .violations
                    .push("document must be a YAML mapping".into());
                return result;
            }
        };

        // Sorted so the violation list is deterministic
        let mut names: Vec<&String> = schema.fields.keys().collect();
        names.sort();

        for name in names {
            let field = &schema.fields[name];
            match mapping.get(name.as_str()) {
                None | Some(Value::Null) => {
                    if field.required {
                        result
                            .violations
                            .push(format!("required field '{name}' is missing"));
                    }
                }
                Some(value) => check_field_value(name, field, value, &mut result),
            }
        }

        result
    }
}

fn check_field_value(
    name: &str,
    field: &FieldDefinition,
    value: &Value,
    result: &mut ValidationResult,
) {
    let mut expect = |ok: bool, expected: &str| {
        if !ok {
            result.violations.push(format!(
                "field '{name}' expected {expected}, got {}",
                type_name(value)
            ));
        }
    };

    match field.field_type {
        FieldType::String => expect(value.is_string(), "string"),
        FieldType::Number => expect(value.is_number(), "number"),
        FieldType::Boolean => expect(value.is_bool(), "boolean"),
        // Dates are stored as strings in YAML
        FieldType::Date | FieldType::Datetime => expect(value.is_string(), "date string"),
        FieldType::List => expect(value.is_sequence(), "list"),
        FieldType::Object => expect(value.is_mapping(), "object"),
        FieldType::Ref => {
            // A ref is a slug in the target table, or a list of slugs
            let ok = value.is_string()
                || value
                    .as_sequence()
                    .map(|items| items.iter().all(Value::is_string))
                    .unwrap_or(false);
            expect(ok, "slug string or list of slug strings");
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "object",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema_str;

    fn test_schema() -> SchemaDefinition {
        parse_schema_str(
            r#"
table: posts
fields:
  title: { type: string, required: true }
  author: { type: ref, target: profiles, required: true }
  date: { type: date }
  tags: { type: list }
  draft: { type: boolean }
  meta: { type: object }
  rank: { type: number }
"#,
        )
        .unwrap()
    }

    fn validate(data: &str) -> ValidationResult {
        let schema = test_schema();
        let doc: Value = serde_yaml::from_str(data).unwrap();
        FieldValidator.validate(&schema, &doc)
    }

    #[test]
    fn test_valid_document() {
        let result = validate(
            "title: Hello\nauthor: alice\ndate: '2026-01-01'\ntags: [a, b]\ndraft: false\nrank: 3",
        );
        assert!(result.is_ok(), "violations: {:?}", result.violations);
    }

    #[test]
    fn test_missing_required_field() {
        let result = validate("title: Hello");
        assert!(!result.is_ok());
        assert!(result.violations.iter().any(|v| v.contains("author")));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let result = validate("title: Hello\nauthor: null");
        assert!(!result.is_ok());
        assert!(result.violations.iter().any(|v| v.contains("author")));
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let result = validate("title: 42\nauthor: alice");
        assert!(!result.is_ok());
        assert!(result
            .violations
            .iter()
            .any(|v| v.contains("title") && v.contains("number")));
    }

    #[test]
    fn test_list_mismatch() {
        let result = validate("title: Hello\nauthor: alice\ntags: not-a-list");
        assert!(!result.is_ok());
        assert!(result.violations.iter().any(|v| v.contains("tags")));
    }

    #[test]
    fn test_ref_accepts_string_or_string_list() {
        assert!(validate("title: Hello\nauthor: alice").is_ok());
        // Lists of slugs are fine too
        let schema = parse_schema_str(
            "table: posts\nfields:\n  related: { type: ref, target: posts }\n",
        )
        .unwrap();
        let doc: Value = serde_yaml::from_str("related: [a, b]").unwrap();
        assert!(FieldValidator.validate(&schema, &doc).is_ok());
        let doc: Value = serde_yaml::from_str("related: [a, 2]").unwrap();
        assert!(!FieldValidator.validate(&schema, &doc).is_ok());
    }

    #[test]
    fn test_non_mapping_document() {
        let schema = test_schema();
        let doc: Value = serde_yaml::from_str("- a\n- b").unwrap();
        let result = FieldValidator.validate(&schema, &doc);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_undeclared_fields_are_allowed() {
        let result = validate("title: Hello\nauthor: alice\nextra: anything");
        assert!(result.is_ok(), "violations: {:?}", result.violations);
    }

    #[test]
    fn test_violations_are_deterministically_ordered() {
        let a = validate("draft: 1\ntags: 2");
        let b = validate("draft: 1\ntags: 2");
        assert_eq!(a.violations, b.violations);
    }
}
