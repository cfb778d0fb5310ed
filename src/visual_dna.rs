//! Visual DNA extractor
//!
//! Optional pre-stage that decomposes a style-reference image into a
//! structured aesthetic profile the brief compiler can replicate. The model
//! is asked for schema-constrained JSON; anything that fails to parse is
//! treated as "no DNA available". A missing profile must never abort the
//! pipeline, so every failure path here collapses to `None`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assets::AssetPayload;
use crate::gemini_client::GenerativeBackend;

/// Color palette by role, as hex strings or free-text color names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaColors {
    pub background: String,
    pub primary: String,
    pub accent: String,
    pub text: String,
}

/// Structured aesthetic profile extracted from a reference image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDna {
    pub colors: DnaColors,
    pub typography_style: String,
    pub composition_blueprint: String,
    /// Reusable background/style fragment, inserted verbatim into the brief
    pub image_generation_prompt_fragment: String,
}

/// Instruction sent alongside the reference image
pub const ANALYSIS_PROMPT: &str = "You are a senior art director. Reverse-engineer the visual identity of the \
attached reference image. Describe the color palette by role (background, \
primary, accent, text), the typography style, the composition blueprint, and \
write one reusable prompt fragment that would reproduce this background and \
style in a new image. Answer strictly in the requested JSON schema.";

/// JSON schema for the structured-output request, mirroring [`VisualDna`]
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "colors": {
                "type": "OBJECT",
                "properties": {
                    "background": { "type": "STRING" },
                    "primary": { "type": "STRING" },
                    "accent": { "type": "STRING" },
                    "text": { "type": "STRING" }
                },
                "required": ["background", "primary", "accent", "text"]
            },
            "typographyStyle": { "type": "STRING" },
            "compositionBlueprint": { "type": "STRING" },
            "imageGenerationPromptFragment": { "type": "STRING" }
        },
        "required": [
            "colors",
            "typographyStyle",
            "compositionBlueprint",
            "imageGenerationPromptFragment"
        ]
    })
}

/// Parse the model's raw text into a profile, tolerating markdown fences.
/// Returns `None` for anything that is not valid schema output.
pub fn parse_visual_dna(raw: &str) -> Option<VisualDna> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(trimmed).ok()
}

/// Run the extraction pre-stage against the backend.
///
/// Network or model failures are swallowed with a warning: reference-image
/// analysis is a quality enhancement, not a requirement.
pub async fn extract_visual_dna(
    backend: &dyn GenerativeBackend,
    reference: &AssetPayload,
) -> Option<VisualDna> {
    match backend.analyze_style_reference(reference).await {
        Ok(raw) => {
            let dna = parse_visual_dna(&raw);
            if dna.is_none() {
                warn!(
                    response_len = raw.len(),
                    "Style analysis returned unparsable output, proceeding without DNA"
                );
            }
            dna
        }
        Err(e) => {
            warn!(error = %e, "Style analysis failed, proceeding without DNA");
            None
        }
    }
}
