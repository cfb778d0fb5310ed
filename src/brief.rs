//! Brief compiler
//!
//! Deterministically merges the niche preset, user direction, price, asset
//! presence, and extracted visual DNA into a single structured instruction
//! document for the image model. Pure function, no I/O. Absent inputs omit
//! their clause entirely; the model must never see vacuous or contradictory
//! instructions.

use crate::assets::AssetBundle;
use crate::models::GenerationConfig;
use crate::niches::NicheProfile;
use crate::visual_dna::VisualDna;

/// Compile the creative brief handed to the image-generation call.
///
/// Clause order is fixed: role/quality directive, niche visual context,
/// scene, then the conditional price, logo, DNA, and asset-presence clauses.
pub fn compile_brief(
    niche: &NicheProfile,
    config: &GenerationConfig,
    assets: &AssetBundle,
    visual_dna: Option<&VisualDna>,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    clauses.push(format!(
        "Professional studio photography for {} brand. Style: high-end commercial, crisp details, 8k resolution.",
        niche.name
    ));

    clauses.push(format!("Atmosphere: {}.", niche.context.atmosphere));
    clauses.push(format!("Lighting: {}.", niche.context.lighting));
    clauses.push(format!("Color palette: {}.", niche.context.colors));
    clauses.push(format!("Composition: {}.", niche.context.composition));

    let scene = if config.has_meaningful_text() {
        config.text.trim()
    } else {
        niche.default_brief_text()
    };
    clauses.push(format!("Scene: {}.", scene));

    if config.has_price() {
        clauses.push(format!(
            "Mandatory: display the price \"{}\" prominently in bold promotional typography. \
The price must be clearly legible in the final image, not optional.",
            config.price.trim()
        ));
    }

    if assets.brand_logo.is_some() {
        clauses.push(
            "Mandatory: integrate the attached brand logo naturally into the scene, \
keeping it sharp, undistorted and clearly visible."
                .to_string(),
        );
    }

    if let Some(dna) = visual_dna {
        clauses.push(format!(
            "Replicate the reference aesthetic. Palette: background {}, primary {}, accent {}, text {}. \
Typography: {}. Composition blueprint: {}. Style: {}",
            dna.colors.background,
            dna.colors.primary,
            dna.colors.accent,
            dna.colors.text,
            dna.typography_style,
            dna.composition_blueprint,
            dna.image_generation_prompt_fragment
        ));
    }

    if assets.product_photo.is_some() {
        clauses.push(
            "The first attached image is the real product. Reproduce it faithfully as the hero of the composition."
                .to_string(),
        );
    }

    if assets.style_reference.is_some() {
        clauses.push(
            "One attached image is a style reference for mood and aesthetics only. Do not copy its subject."
                .to_string(),
        );
    }

    clauses.join("\n")
}
