use serde_json::Value;

use super::{Issue, StandardSchema, ValidationResult};

/// Runs a validator and normalizes its outcome.
///
/// A fault raised by the validator itself is converted into a single
/// synthetic issue carrying the fault's message: at this layer validation
/// failure is always a data result, never a propagated error.
pub async fn validate_with(schema: &dyn StandardSchema, value: &Value) -> ValidationResult {
    match schema.validate(value).await {
        Ok(issues) if issues.is_empty() => ValidationResult::success(),
        Ok(issues) => ValidationResult::failure(issues),
        Err(error) => ValidationResult::failure(vec![Issue::root(error.to_string())]),
    }
}

/// Renders an issue as `dotted.path: message` for display.
///
/// Issues without a path render as `root: message`.
pub fn format_issue(issue: &Issue) -> String {
    if issue.path.is_empty() {
        format!("root: {}", issue.message)
    } else {
        format!("{}: {}", issue.path.join("."), issue.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::{BoxError, FnValidator};
    use async_trait::async_trait;
    use serde_json::json;

    struct FaultyValidator;

    #[async_trait]
    impl StandardSchema for FaultyValidator {
        async fn validate(&self, _value: &Value) -> Result<Vec<Issue>, BoxError> {
            Err("validator exploded".into())
        }
    }

    #[tokio::test]
    async fn empty_issue_list_is_success() {
        let schema = FnValidator::new("test", |_| Vec::new());
        let result = validate_with(&schema, &json!({})).await;

        assert!(result.success);
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn issues_are_preserved_in_order() {
        let schema = FnValidator::new("test", |_| {
            vec![
                Issue::at(["timeout"], "must be >= 1000"),
                Issue::at(["retries"], "must be positive"),
            ]
        });

        let result = validate_with(&schema, &json!({})).await;

        assert!(!result.success);
        assert_eq!(result.issues[0].path, vec!["timeout".to_string()]);
        assert_eq!(result.issues[1].path, vec!["retries".to_string()]);
    }

    #[tokio::test]
    async fn validator_fault_becomes_synthetic_issue() {
        let result = validate_with(&FaultyValidator, &json!({})).await;

        assert!(!result.success);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].path.is_empty());
        assert_eq!(result.issues[0].message, "validator exploded");
    }

    #[test]
    fn formats_dotted_path_and_message() {
        let issue = Issue::at(["timeout"], "must be >= 1000");
        assert_eq!(format_issue(&issue), "timeout: must be >= 1000");
    }

    #[test]
    fn formats_nested_path() {
        let issue = Issue::at(["server", "port"], "out of range");
        assert_eq!(format_issue(&issue), "server.port: out of range");
    }

    #[test]
    fn formats_root_issue_without_path() {
        let issue = Issue::root("not an object");
        assert_eq!(format_issue(&issue), "root: not an object");
    }
}
