//! Generation orchestrator
//!
//! Drives one end-to-end campaign attempt: local gates first (credit, then
//! minimum input), then the strictly sequential stages — optional visual DNA
//! extraction, brief compilation, image rendering, caption writing — with a
//! human-readable progress string at each boundary. The orchestrator never
//! debits the ledger or persists the artifact; the caller does both, and only
//! after a successful return, so a debit can never exist without a render.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::AssetBundle;
use crate::brief::compile_brief;
use crate::credits::CreditLedger;
use crate::errors::{classify, ClassifiedError, ErrorKind};
use crate::gemini_client::{CaptionResult, GenerativeBackend};
use crate::models::{GeneratedArtifact, GenerationConfig};
use crate::niches::NicheProfile;
use crate::visual_dna::extract_visual_dna;

/// Progress strings surfaced to the UI, one per stage boundary
pub const PROGRESS_CALIBRATING: &str = "Calibrando IA Generativa...";
pub const PROGRESS_COMPILING: &str = "Compilando briefing criativo...";
pub const PROGRESS_RENDERING: &str = "Renderizando pixels de alta fidelidade...";
pub const PROGRESS_CAPTIONING: &str = "Escrevendo legenda persuasiva...";

/// Run one generation attempt.
///
/// Gates, in order and before any network call: the ledger must show an
/// available credit, and at least one asset or a non-trivial briefing text
/// must be present. Stages never overlap and a later stage never starts
/// after an earlier one fails, with two deliberate exceptions: a failed DNA
/// extraction degrades to "no DNA", and a failed caption call returns the
/// rendered image with an empty caption rather than discarding it.
pub async fn generate_campaign<F>(
    backend: &dyn GenerativeBackend,
    niche: &NicheProfile,
    assets: &AssetBundle,
    config: &GenerationConfig,
    ledger: &CreditLedger,
    mut on_progress: F,
) -> Result<GeneratedArtifact, ClassifiedError>
where
    F: FnMut(&str),
{
    if !ledger.can_afford() {
        return Err(ClassifiedError::new(ErrorKind::CreditsExhausted));
    }

    if assets.is_empty() && !config.has_meaningful_text() {
        return Err(ClassifiedError::new(ErrorKind::InsufficientInput));
    }

    info!(
        niche = %niche.id,
        has_product = assets.product_photo.is_some(),
        has_logo = assets.brand_logo.is_some(),
        has_reference = assets.style_reference.is_some(),
        "Generation attempt started"
    );

    on_progress(PROGRESS_CALIBRATING);
    let visual_dna = match &assets.style_reference {
        Some(reference) => extract_visual_dna(backend, reference).await,
        None => None,
    };

    on_progress(PROGRESS_COMPILING);
    let brief = compile_brief(niche, config, assets, visual_dna.as_ref());

    on_progress(PROGRESS_RENDERING);
    let attachments = assets.ordered_attachments();
    let image = backend
        .render_image(&brief, &attachments, config.aspect_ratio, config.quality)
        .await
        .map_err(|raw| classify(&raw))?
        .ok_or_else(|| ClassifiedError::new(ErrorKind::NoImageProduced))?;

    on_progress(PROGRESS_CAPTIONING);
    let caption = match backend.write_caption(niche, config).await {
        Ok(caption) => caption,
        Err(raw) => {
            // The image is the expensive deliverable; the caption is a bonus
            warn!(error = %raw, "Caption generation failed, returning image with empty caption");
            CaptionResult::default()
        }
    };

    let artifact = GeneratedArtifact {
        id: Uuid::new_v4().to_string(),
        url: image.to_data_url(),
        caption: caption.text,
        sources: caption.sources,
        niche: niche.name.clone(),
        created_at: Utc::now().to_rfc3339(),
        config: config.clone(),
    };

    info!(
        artifact_id = %artifact.id,
        with_dna = visual_dna.is_some(),
        caption_chars = artifact.caption.len(),
        "Generation attempt completed"
    );

    Ok(artifact)
}
