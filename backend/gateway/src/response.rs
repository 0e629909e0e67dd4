//! Response assembly: provider candidate to the stable wire contract.
//!
//! Every derived field is a pure function of the candidate's item list, so
//! the same candidate always assembles to the same response.

use ruidai_config::TemplateContract;
use ruidai_core::{
    CandidateItem, CountRange, ExtractResponse, ProviderCandidate, ResponseDebug, ResponseItem,
    Scene, SchemaIssue,
};

/// Inputs that are not part of the candidate itself.
#[derive(Debug, Clone, Copy)]
pub struct Provenance<'a> {
    pub model: &'a str,
    pub raw_ocr_hash: &'a str,
    pub normalized_text_hash: &'a str,
}

/// Build the response for a schema-checked candidate.
///
/// The result still has to pass `validate_response`; an inverted count range
/// is carried through unchanged so that check can reject it.
pub fn assemble(
    contract: &TemplateContract,
    candidate: ProviderCandidate,
    provenance: Provenance<'_>,
) -> Result<ExtractResponse, Vec<SchemaIssue>> {
    let normalization = contract.normalize(&candidate.template_id);
    let items = default_slots(candidate.items);
    let scene = match candidate.scene {
        Some(scene) => Scene::from(scene),
        None => derive_scene(&items)?,
    };

    Ok(ExtractResponse {
        template_id: normalization.normalized_template_id.clone(),
        confidence: candidate.confidence,
        items,
        scene,
        debug: ResponseDebug {
            raw_ocr_hash: provenance.raw_ocr_hash.to_string(),
            normalized_text_hash: provenance.normalized_text_hash.to_string(),
            model: provenance.model.to_string(),
            // The contract's prompt version is authoritative over the one
            // the provider echoed.
            prompt_version: contract.prompt_version().to_string(),
            raw_template_id: normalization.raw_template_id,
            normalized_template_id: normalization.normalized_template_id,
            normalization_reason: normalization.reason,
        },
    })
}

/// Give every slot-less item `slot_{n}`, `n` being its 1-based position.
pub fn default_slots(items: Vec<CandidateItem>) -> Vec<ResponseItem> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| ResponseItem {
            slot: item.slot.unwrap_or_else(|| format!("slot_{}", index + 1)),
            category: item.category,
            count_range: item.count_range,
        })
        .collect()
}

/// Distinct categories in first-seen order, and the element-wise sum of ranges.
pub fn derive_scene(items: &[ResponseItem]) -> Result<Scene, Vec<SchemaIssue>> {
    let mut categories: Vec<String> = Vec::new();
    let mut total = CountRange::ZERO;

    for item in items {
        if !categories.contains(&item.category) {
            categories.push(item.category.clone());
        }
        total = total.checked_add(&item.count_range).ok_or_else(|| {
            vec![SchemaIssue::new(
                "scene.total_count_range",
                "sum of item count ranges overflows",
            )]
        })?;
    }

    Ok(Scene {
        categories,
        total_count_range: total,
    })
}
