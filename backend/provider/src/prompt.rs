//! Versioned extraction prompt.

use ruidai_core::ExtractRequest;

/// Bump together with `prompt_version` in the contract document.
pub const PROMPT_VERSION: &str = "extract-v2";

/// Contract schema version this client emits.
pub const CONTRACT_VERSION: &str = "1.0.0";

/// Low, fixed sampling temperature.
pub const TEMPERATURE: f32 = 0.1;

/// Build the prompt for an already canonicalized request.
pub fn build_prompt(request: &ExtractRequest) -> String {
    let grade = request.grade().map(|g| g.as_str()).unwrap_or("unknown");
    let locale_line = format!("locale: {}", request.locale);
    let grade_line = format!("grade_hint: {grade}");
    let text_line = format!("ocr_text: {}", request.ocr_text);
    [
        "You are an extraction engine for kindergarten/school count worksheets.",
        "Return ONLY valid JSON with this exact shape:",
        r#"{"template_id":"string","confidence":number,"items":[{"slot":"string (optional)","category":"string","count_range":[integer,integer]}],"scene":{"categories":["string"],"total_count_range":[integer,integer]} (optional)}"#,
        "Rules:",
        "- Output JSON only. Do not output markdown or explanation.",
        "- Keep confidence between 0 and 1.",
        "- Every count_range is a pair of non-negative integers [min, max] with min <= max.",
        "Input follows.",
        locale_line.as_str(),
        grade_line.as_str(),
        text_line.as_str(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruidai_core::{Grade, RequestHint};

    fn request(grade: Option<Grade>) -> ExtractRequest {
        ExtractRequest {
            ocr_text: "りんご が 3こ".into(),
            locale: "ja-JP".into(),
            hint: grade.map(|g| RequestHint { grade: Some(g) }),
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&request(None)), build_prompt(&request(None)));
    }

    #[test]
    fn prompt_embeds_inputs_and_rules() {
        let prompt = build_prompt(&request(Some(Grade::Nencho)));
        assert!(prompt.contains("grade_hint: nencho"));
        assert!(prompt.contains("locale: ja-JP"));
        assert!(prompt.ends_with("ocr_text: りんご が 3こ"));
        assert!(prompt.contains("min <= max"));
        assert!(prompt.contains("between 0 and 1"));
    }

    #[test]
    fn missing_grade_is_unknown() {
        assert!(build_prompt(&request(None)).contains("grade_hint: unknown"));
    }
}
