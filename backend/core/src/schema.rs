//! Strict schema checks for the three untrusted or contract-bound shapes:
//! the inbound request body, the provider candidate, and the assembled
//! response.

use serde_json::{Map, Value};

use crate::canonical::{has_content, is_sha256_hex, CanonicalText};
use crate::error::{RequestError, SchemaIssue};
use crate::types::{
    ExtractRequest, ExtractResponse, Grade, ProviderCandidate, RequestHint, DEFAULT_LOCALE,
    MAX_LOCALE_CHARS, MAX_OCR_TEXT_CHARS, MIN_LOCALE_CHARS,
};

const REQUEST_FIELDS: &[&str] = &["ocr_text", "locale", "hint"];
const HINT_FIELDS: &[&str] = &["grade"];
const GRADE_LITERALS: &str =
    "nencho, nensho, nenchu, shogaku1, shogaku2, shogaku3, shogaku4, shogaku5, shogaku6";

/// Validate an inbound request body.
///
/// The size limit is checked first so an oversized `ocr_text` is reported as
/// [`RequestError::PayloadTooLarge`] regardless of other problems.
pub fn validate_request(body: &Value) -> Result<ExtractRequest, RequestError> {
    let Some(obj) = body.as_object() else {
        return Err(RequestError::Invalid {
            issues: vec![SchemaIssue::new("", "expected a JSON object")],
        });
    };

    if let Some(Value::String(text)) = obj.get("ocr_text") {
        let chars = text.chars().count();
        if chars > MAX_OCR_TEXT_CHARS {
            return Err(RequestError::PayloadTooLarge {
                chars,
                limit: MAX_OCR_TEXT_CHARS,
            });
        }
    }

    let mut issues = Vec::new();
    reject_unknown_fields(obj, REQUEST_FIELDS, "", &mut issues);

    let mut empty_text = false;
    let ocr_text = match obj.get("ocr_text") {
        Some(Value::String(text)) if text.is_empty() => {
            empty_text = true;
            issues.push(SchemaIssue::new(
                "ocr_text",
                "must contain at least 1 character",
            ));
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            issues.push(SchemaIssue::new("ocr_text", "expected string"));
            None
        }
        None => {
            issues.push(SchemaIssue::new("ocr_text", "required"));
            None
        }
    };

    let locale = match obj.get("locale") {
        None => Some(DEFAULT_LOCALE.to_string()),
        Some(Value::String(locale)) => {
            let chars = locale.chars().count();
            if (MIN_LOCALE_CHARS..=MAX_LOCALE_CHARS).contains(&chars) {
                Some(locale.clone())
            } else {
                issues.push(SchemaIssue::new(
                    "locale",
                    format!("must be {MIN_LOCALE_CHARS}..={MAX_LOCALE_CHARS} characters"),
                ));
                None
            }
        }
        Some(_) => {
            issues.push(SchemaIssue::new("locale", "expected string"));
            None
        }
    };

    let hint = match obj.get("hint") {
        None => None,
        Some(Value::Object(hint)) => parse_hint(hint, &mut issues),
        Some(_) => {
            issues.push(SchemaIssue::new("hint", "expected object"));
            None
        }
    };

    match (ocr_text, locale) {
        (Some(ocr_text), Some(locale)) if issues.is_empty() => Ok(ExtractRequest {
            ocr_text,
            locale,
            hint,
        }),
        _ if empty_text && issues.len() == 1 => Err(RequestError::EmptyText { issues }),
        _ => Err(RequestError::Invalid { issues }),
    }
}

fn parse_hint(hint: &Map<String, Value>, issues: &mut Vec<SchemaIssue>) -> Option<RequestHint> {
    reject_unknown_fields(hint, HINT_FIELDS, "hint", issues);
    let grade = match hint.get("grade") {
        None => None,
        Some(value) => match serde_json::from_value::<Grade>(value.clone()) {
            Ok(grade) => Some(grade),
            Err(_) => {
                issues.push(SchemaIssue::new(
                    "hint.grade",
                    format!("expected one of {GRADE_LITERALS}"),
                ));
                None
            }
        },
    };
    Some(RequestHint { grade })
}

fn reject_unknown_fields(
    obj: &Map<String, Value>,
    known: &[&str],
    prefix: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    for key in obj.keys() {
        if !known.contains(&key.as_str()) {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            issues.push(SchemaIssue::new(path, "unrecognized field"));
        }
    }
}

/// Reject text that canonicalizes to nothing but spacing and punctuation.
pub fn require_content(text: &CanonicalText) -> Result<(), RequestError> {
    if has_content(&text.text) {
        return Ok(());
    }
    Err(RequestError::EmptyText {
        issues: vec![SchemaIssue::new(
            "ocr_text",
            "no letters or digits after normalization",
        )],
    })
}

/// Type-check a parsed provider payload and enforce value ranges.
///
/// Unknown fields are ignored; `min <= max` on count ranges is left to the
/// response schema so an inverted range surfaces as an internal error.
pub fn validate_candidate(value: Value) -> Result<ProviderCandidate, Vec<SchemaIssue>> {
    let candidate: ProviderCandidate = serde_json::from_value(value)
        .map_err(|e| vec![SchemaIssue::new("", without_quoted_values(&e.to_string()))])?;

    let mut issues = Vec::new();
    if !(0.0..=1.0).contains(&candidate.confidence) {
        issues.push(SchemaIssue::new("confidence", "must be within [0, 1]"));
    }
    for (i, item) in candidate.items.iter().enumerate() {
        if matches!(item.slot.as_deref(), Some("")) {
            issues.push(SchemaIssue::new(
                format!("items[{i}].slot"),
                "must not be empty when present",
            ));
        }
    }

    if issues.is_empty() {
        Ok(candidate)
    } else {
        Err(issues)
    }
}

/// Replace every double-quoted literal in a serde message with `"…"`.
///
/// serde quotes the offending input (`invalid type: string "..."`), and a
/// model can echo worksheet text into any field. Field names are
/// backtick-quoted and survive.
fn without_quoted_values(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '"' {
            continue;
        }
        out.push('…');
        let mut escaped = false;
        for inner in chars.by_ref() {
            match inner {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    out.push('"');
                    break;
                }
                _ => escaped = false,
            }
        }
    }
    out
}

/// Re-check an assembled response against the wire contract.
pub fn validate_response(
    response: &ExtractResponse,
    is_allowed: impl Fn(&str) -> bool,
) -> Result<(), Vec<SchemaIssue>> {
    let mut issues = Vec::new();

    if !is_allowed(&response.template_id) {
        issues.push(SchemaIssue::new("template_id", "not in the allowed set"));
    }
    if !(0.0..=1.0).contains(&response.confidence) {
        issues.push(SchemaIssue::new("confidence", "must be within [0, 1]"));
    }
    for (i, item) in response.items.iter().enumerate() {
        if item.slot.is_empty() {
            issues.push(SchemaIssue::new(format!("items[{i}].slot"), "must not be empty"));
        }
        if !item.count_range.is_ordered() {
            issues.push(SchemaIssue::new(
                format!("items[{i}].count_range"),
                "min must be <= max",
            ));
        }
    }
    if !response.scene.total_count_range.is_ordered() {
        issues.push(SchemaIssue::new(
            "scene.total_count_range",
            "min must be <= max",
        ));
    }

    let debug = &response.debug;
    if !is_sha256_hex(&debug.raw_ocr_hash) {
        issues.push(SchemaIssue::new("debug.raw_ocr_hash", "expected 64 lowercase hex"));
    }
    if !is_sha256_hex(&debug.normalized_text_hash) {
        issues.push(SchemaIssue::new(
            "debug.normalized_text_hash",
            "expected 64 lowercase hex",
        ));
    }
    if debug.model.is_empty() {
        issues.push(SchemaIssue::new("debug.model", "must not be empty"));
    }
    if debug.prompt_version.is_empty() {
        issues.push(SchemaIssue::new("debug.prompt_version", "must not be empty"));
    }
    if debug.normalized_template_id != response.template_id {
        issues.push(SchemaIssue::new(
            "debug.normalized_template_id",
            "must equal template_id",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
