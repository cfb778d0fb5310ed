//! Domain types shared across the pipeline: per-attempt generation settings
//! and the finished artifact handed back to the caller.

use serde::{Deserialize, Serialize};

use crate::niches::NicheProfile;

/// Output formats supported by the image model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Story => "9:16",
            AspectRatio::Portrait => "3:4",
        }
    }
}

/// Rendering tier: standard uses the fast image model, ultra the pro one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    #[default]
    Standard,
    Ultra,
}

/// User-editable settings for one generation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub niche_id: String,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub quality: Quality,
    /// Free-text creative direction; seeded from the niche template
    #[serde(default)]
    pub text: String,
    /// Display price, e.g. "R$ 49,90"; empty means no price in the creative
    #[serde(default)]
    pub price: String,
}

impl GenerationConfig {
    /// Defaults for a freshly selected niche
    pub fn for_niche(niche: &NicheProfile) -> Self {
        Self {
            niche_id: niche.id.clone(),
            aspect_ratio: AspectRatio::default(),
            quality: Quality::default(),
            text: niche.default_brief_text().to_string(),
            price: String::new(),
        }
    }

    /// Whether the free text is substantial enough to generate from on its own
    pub fn has_meaningful_text(&self) -> bool {
        self.text.trim().chars().count() > 3
    }

    pub fn has_price(&self) -> bool {
        !self.price.trim().is_empty()
    }
}

/// A grounding citation attached to a generated caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: Option<String>,
}

/// The finished deliverable of one successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub id: String,
    /// URI-embeddable encoded image (`data:image/...;base64,...`)
    pub url: String,
    /// Marketing caption; empty when the caption call failed
    pub caption: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
    /// Display name of the source niche
    pub niche: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub config: GenerationConfig,
}
