//! Template id normalization against the contract allow-list.

use ruidai_core::{NormalizationReason, NormalizationResult};

use crate::contract::TemplateContract;

impl TemplateContract {
    /// Map a provider-supplied template id onto the allow-list.
    ///
    /// Allowed ids pass through; anything else becomes the contract default.
    /// [`NormalizationReason::AliasMap`] is never produced here.
    pub fn normalize(&self, raw_template_id: &str) -> NormalizationResult {
        if self.is_allowed(raw_template_id) {
            return NormalizationResult {
                raw_template_id: raw_template_id.to_string(),
                normalized_template_id: raw_template_id.to_string(),
                reason: NormalizationReason::Allowed,
            };
        }

        NormalizationResult {
            raw_template_id: raw_template_id.to_string(),
            normalized_template_id: self.default_template_id().to_string(),
            reason: NormalizationReason::NotAllowedFallback,
        }
    }
}
