//! Campaign generation engine.
//!
//! Turns a product photo, brand logo, and optional style-reference image into
//! a finished advertising image plus a marketing caption by orchestrating
//! calls to the Gemini API. The crate covers the generation pipeline only:
//! niche catalog, asset handling, visual DNA extraction, brief compilation,
//! the generation orchestrator, error classification, the credit ledger, and
//! the Supabase persistence gateway. Session screens, admin panels, and
//! billing pages live in the frontend and are not modeled here.

pub mod assets;
pub mod brief;
pub mod config;
pub mod credits;
pub mod errors;
pub mod gemini_client;
pub mod logging;
pub mod models;
pub mod niches;
pub mod pipeline;
pub mod supabase;
pub mod visual_dna;

#[cfg(test)]
mod pipeline_tests;

pub use assets::{AssetBundle, AssetPayload};
pub use credits::CreditLedger;
pub use errors::{classify, ClassifiedError, ErrorKind};
pub use gemini_client::{GeminiClient, GenerativeBackend};
pub use models::{AspectRatio, GeneratedArtifact, GenerationConfig, Quality};
pub use niches::NicheProfile;
pub use pipeline::generate_campaign;
pub use visual_dna::VisualDna;
