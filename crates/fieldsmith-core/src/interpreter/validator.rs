//! The live validator handed to callers

use super::issues::{IssueCode, ParseContext, ValidationIssues};
use super::schema::{Schema, Status};
use crate::value::{FunctionValue, Value};
use serde_json::json;
use std::sync::Arc;

/// Result of [`Validator::safe_parse`]
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Success(Value),
    Failure(ValidationIssues),
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ParseOutcome::Success(value) => Some(value),
            ParseOutcome::Failure(_) => None,
        }
    }

    pub fn issues(&self) -> Option<&ValidationIssues> {
        match self {
            ParseOutcome::Success(_) => None,
            ParseOutcome::Failure(issues) => Some(issues),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationIssues> {
        match self {
            ParseOutcome::Success(value) => Ok(value),
            ParseOutcome::Failure(issues) => Err(issues),
        }
    }

    /// `{ "success": true, "data": … }` or `{ "success": false, "issues": [...] }`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParseOutcome::Success(value) => json!({ "success": true, "data": value.to_tagged_json() }),
            ParseOutcome::Failure(issues) => json!({ "success": false, "issues": issues.issues }),
        }
    }
}

/// A compiled schema; cheap to clone and safe to share across threads
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Arc<Schema>,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Parse without failing; issues are returned, never raised
    pub fn safe_parse(&self, input: &Value) -> ParseOutcome {
        let mut issues = ValidationIssues::new();
        let status = self.schema.run(input.clone(), &ParseContext::root(), &mut issues);
        match status {
            Status::Valid(value) if issues.is_empty() => ParseOutcome::Success(value),
            _ => {
                if issues.is_empty() {
                    issues.add(ParseContext::root().issue(IssueCode::Custom, "Validation failed"));
                }
                ParseOutcome::Failure(issues)
            }
        }
    }

    pub fn parse(&self, input: &Value) -> Result<Value, ValidationIssues> {
        self.safe_parse(input).into_result()
    }

    pub fn is_valid(&self, input: &Value) -> bool {
        self.safe_parse(input).is_success()
    }

    /// Parse a JSON document, honoring `$`-tagged values
    pub fn validate_json(&self, json: &serde_json::Value) -> ParseOutcome {
        self.safe_parse(&Value::from_tagged_json(json))
    }

    pub fn description(&self) -> Option<&str> {
        self.schema.description()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Wrap `f` so its arguments and return value are validated on each call
    ///
    /// Fails unless this validator describes a function.
    pub fn implement(&self, f: FunctionValue) -> Result<FunctionValue, ValidationIssues> {
        match self.parse(&Value::Function(f))? {
            Value::Function(guarded) => Ok(guarded),
            other => Err(ParseContext::root()
                .invalid_type("function", other.parsed_type())
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::schema::UnknownKeyPolicy;

    fn person() -> Validator {
        Validator::new(Schema::Described(
            Box::new(Schema::Object {
                fields: vec![(
                    "age".into(),
                    Schema::Number {
                        coerce: true,
                        checks: vec![],
                    },
                )],
                unknown_keys: UnknownKeyPolicy::Strip,
            }),
            "A person".into(),
        ))
    }

    #[test]
    fn test_safe_parse_and_json() {
        let validator = person();
        let outcome = validator.validate_json(&json!({ "age": "42" }));
        assert_eq!(outcome.value().and_then(|v| v.get("age")), Some(&Value::from(42)));
        assert_eq!(outcome.to_json()["success"], json!(true));

        let outcome = validator.validate_json(&json!({ "age": "old" }));
        assert!(!outcome.is_success());
        let issues = outcome.issues().unwrap();
        assert_eq!(issues.issues[0].path, "$.age");
        assert_eq!(outcome.to_json()["issues"][0]["code"], json!("invalid_type"));
    }

    #[test]
    fn test_description() {
        assert_eq!(person().description(), Some("A person"));
        assert_eq!(Validator::new(Schema::Any).description(), None);
    }

    #[test]
    fn test_implement_requires_function_schema() {
        let f = FunctionValue::noop(0);
        assert!(person().implement(f.clone()).is_err());
        let any = Validator::new(Schema::Any);
        assert!(any.implement(f).is_ok());
    }
}
