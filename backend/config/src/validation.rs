//! Contract validation: deep checks with field paths and readable messages.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::contract::ContractDocument;

/// A contract validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Contract validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a contract document and return a report of all errors and warnings.
pub fn validate(doc: &ContractDocument) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_versions(doc, &mut report);
    validate_allow_list(doc, &mut report);
    validate_default(doc, &mut report);
    report
}

fn validate_versions(doc: &ContractDocument, report: &mut ValidationReport) {
    if doc.contract_version.trim().is_empty() {
        report.error("contract_version", "contract_version cannot be empty");
    }
    if doc.prompt_version.trim().is_empty() {
        report.error("prompt_version", "prompt_version cannot be empty");
    }
}

fn validate_allow_list(doc: &ContractDocument, report: &mut ValidationReport) {
    if doc.allowed_template_ids.is_empty() {
        report.error(
            "allowed_template_ids",
            "At least one allowed template id is required",
        );
        return;
    }

    let mut seen = BTreeSet::new();
    for (i, id) in doc.allowed_template_ids.iter().enumerate() {
        if id.trim().is_empty() {
            report.error(
                format!("allowed_template_ids[{i}]"),
                "Template id cannot be empty",
            );
        }
        if !seen.insert(id.as_str()) {
            report.warn(
                format!("allowed_template_ids[{i}]"),
                format!("Duplicate template id '{id}'"),
            );
        }
    }
}

fn validate_default(doc: &ContractDocument, report: &mut ValidationReport) {
    if doc.default_template_id.trim().is_empty() {
        report.error("default_template_id", "default_template_id cannot be empty");
        return;
    }
    if !doc.allowed_template_ids.contains(&doc.default_template_id) {
        report.error(
            "default_template_id",
            format!(
                "'{}' is not a member of allowed_template_ids",
                doc.default_template_id
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ContractDocument {
        ContractDocument {
            contract_version: "1.0.0".into(),
            default_template_id: "a".into(),
            allowed_template_ids: vec!["a".into(), "b".into()],
            prompt_version: "extract-v2".into(),
        }
    }

    #[test]
    fn valid_document_has_no_findings() {
        let report = validate(&doc());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn duplicate_ids_warn_but_do_not_fail() {
        let mut d = doc();
        d.allowed_template_ids.push("a".into());
        let report = validate(&d);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "allowed_template_ids[2]");
    }

    #[test]
    fn blank_versions_are_errors() {
        let mut d = doc();
        d.contract_version = " ".into();
        d.prompt_version = String::new();
        let report = validate(&d);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["contract_version", "prompt_version"]);
    }

    #[test]
    fn blank_template_id_is_error() {
        let mut d = doc();
        d.allowed_template_ids.push("".into());
        let report = validate(&d);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "allowed_template_ids[2]");
    }
}
