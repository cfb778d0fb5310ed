//! Niche catalog
//!
//! Static registry of business-category presets. Each niche carries a default
//! briefing template and the visual context (lighting, atmosphere, colors,
//! composition) injected into the compiled brief. Loaded once at first use
//! and never mutated.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Visual-style parameters for a niche, phrased for the image model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualContext {
    pub lighting: String,
    pub atmosphere: String,
    pub colors: String,
    pub composition: String,
}

/// A business-category preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicheProfile {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Marketing description, doubles as the default briefing text
    pub description: String,
    pub context: VisualContext,
}

impl NicheProfile {
    fn new(
        id: &str,
        name: &str,
        icon: &str,
        description: &str,
        lighting: &str,
        atmosphere: &str,
        colors: &str,
        composition: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            context: VisualContext {
                lighting: lighting.to_string(),
                atmosphere: atmosphere.to_string(),
                colors: colors.to_string(),
                composition: composition.to_string(),
            },
        }
    }

    /// Default briefing text seeded into the editor when this niche is selected
    pub fn default_brief_text(&self) -> &str {
        &self.description
    }
}

static CATALOG: OnceLock<Vec<NicheProfile>> = OnceLock::new();

/// All registered niches, in presentation order
pub fn all() -> &'static [NicheProfile] {
    CATALOG.get_or_init(build_catalog)
}

/// Look up a niche by id
pub fn find(id: &str) -> Option<&'static NicheProfile> {
    all().iter().find(|n| n.id == id)
}

fn build_catalog() -> Vec<NicheProfile> {
    vec![
        NicheProfile::new(
            "pizzaria",
            "Pizzaria Gourmet",
            "\u{1F355}",
            "Destaque para queijo derretido e texturas rústicas de alta gastronomia.",
            "warm cinematic oven glow, directional spotlighting to highlight textures",
            "luxury artisan pizzeria, moody lighting, expensive ingredients",
            "deep san marzano red, charred crust gold, vibrant basil green",
            "extreme macro of the texture, 45-degree professional food photography angle",
        ),
        NicheProfile::new(
            "acaiteria",
            "Açaí Premium",
            "\u{1F367}",
            "Explosão de frescor tropical com estética clean e refrescante.",
            "bright high-key natural sunlight, crisp shadows, moisture droplets",
            "upscale tropical resort, clean modern presentation",
            "intense velvet purple, neon fruit highlights, clean white marble",
            "dynamic top-down flat lay with artistic topping placement",
        ),
        NicheProfile::new(
            "veiculos",
            "Concessionária de Luxo",
            "\u{1F697}",
            "Reflexos metálicos, profundidade e visual de comercial de TV.",
            "soft-box studio reflections, dramatic rim lighting, long exposure light trails",
            "high-tech minimalist hangar or modern architectural background",
            "metallic silver, carbon fiber black, deep sapphire blue",
            "hero perspective, low-wide angle, aggressive professional car photography",
        ),
        NicheProfile::new(
            "cosmeticos",
            "Cosméticos & Estética",
            "\u{1F484}",
            "Minimalismo, luxo silencioso e texturas impecáveis.",
            "soft diffused beauty lighting, ethereal glow, pearl-like reflections",
            "high-end clinical spa, minimalist laboratory, luxury vanity",
            "champagne gold, soft nude, silk white, rose quartz",
            "perfectly centered product symmetry, artistic liquid smears",
        ),
        NicheProfile::new(
            "roupas",
            "Moda Editorial",
            "\u{1F455}",
            "Estética de revista de moda (Vogue/GQ style).",
            "professional studio strobe lighting, high contrast, fashion show mood",
            "minimalist urban studio, industrial loft, high-end boutique",
            "neutral editorial palette, high saturation on garments",
            "full-length editorial pose, rule of thirds, dynamic movement",
        ),
        NicheProfile::new(
            "burger",
            "Burguer Artesanal",
            "\u{1F354}",
            "Suculência extrema e visual \"food porn\" profissional.",
            "warm side-lighting to reveal steam and texture, rim light on the bun",
            "modern industrial burger joint, urban nightlife vibe",
            "rich toasted browns, vibrant cheddar yellow, fresh organic greens",
            "monumental stack shot, macro focus on the melting cheese and dripping juices",
        ),
        NicheProfile::new(
            "joalheria",
            "Joalheria & Relógios",
            "\u{1F48D}",
            "Brilho facetado e luxo absoluto em macro.",
            "precise hard-point jewelry lights for star-burst flares and caustic reflections",
            "black velvet infinity background, sophisticated dark luxury",
            "24k gold, polished platinum, obsidian black",
            "extreme close-up macro, razor-sharp focus on details, shallow depth of field",
        ),
    ]
}
