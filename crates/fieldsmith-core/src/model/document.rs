//! Loading field lists from JSON documents

use super::field::FieldSpec;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A root field list, optionally wrapped with a schema name
///
/// Accepts either a bare JSON array of fields or an object
/// `{ "name": "...", "fields": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentShape")]
pub struct FieldDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentShape {
    Bare(Vec<FieldSpec>),
    Wrapped {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, alias = "schema")]
        fields: Vec<FieldSpec>,
    },
}

impl From<DocumentShape> for FieldDocument {
    fn from(shape: DocumentShape) -> Self {
        match shape {
            DocumentShape::Bare(fields) => FieldDocument { name: None, fields },
            DocumentShape::Wrapped { name, fields } => FieldDocument { name, fields },
        }
    }
}

impl FieldDocument {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { name: None, fields }
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeTag;
    use std::io::Write;

    #[test]
    fn test_bare_and_wrapped_forms() {
        let bare = FieldDocument::from_json_str(r#"[{"name": "a", "type": "string"}]"#).unwrap();
        assert_eq!(bare.name, None);
        assert_eq!(bare.fields[0].tag(), Some(TypeTag::String));

        let wrapped = FieldDocument::from_json_str(
            r#"{"name": "user", "fields": [{"name": "a", "type": "number"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.name.as_deref(), Some("user"));
        assert_eq!(wrapped.fields[0].tag(), Some(TypeTag::Number));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fields": [{{"name": "flag", "type": "boolean"}}]}}"#).unwrap();
        let doc = FieldDocument::from_path(file.path()).unwrap();
        assert_eq!(doc.fields.len(), 1);
        assert!(FieldDocument::from_path("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            FieldDocument::from_json_str("{ not json"),
            Err(crate::Error::Json { .. })
        ));
    }
}
