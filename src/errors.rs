//! Error taxonomy and classifier
//!
//! The Gemini API surfaces failures as unstructured, provider-specific text.
//! The classifier normalizes any raised failure into a small fixed set of
//! kinds with a stable user-facing message (pt-BR, the product language), so
//! the rest of the system never string-matches upstream errors itself.

use serde::{Deserialize, Serialize};

/// Stable failure kinds surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No API key configured; detected locally, before any network call
    CredentialsMissing,
    /// Key rejected by the remote service, or the model reference was not found
    AuthInvalid,
    /// Local ledger shows no remaining credit; never inferred from a remote call
    CreditsExhausted,
    /// No asset and no meaningful briefing text; nothing to generate from
    InsufficientInput,
    /// Moderation / safety block
    ContentBlocked,
    /// Rate limit or quota exhaustion (HTTP 429 family)
    RateLimited,
    /// Malformed image payload or unsupported format
    AssetInvalid,
    /// The image call succeeded but returned zero inline image parts
    NoImageProduced,
    Unknown,
}

/// What the UI should offer the user for a given failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    Retry,
    ReconnectCredentials,
    ReviseContent,
    TopUp,
}

impl ErrorKind {
    /// Localized explanatory message for this kind
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::CredentialsMissing => {
                "Chave de API não configurada. Conecte suas credenciais para gerar campanhas."
            }
            ErrorKind::AuthInvalid => {
                "Chave de API inválida ou sem acesso ao modelo. Reconecte suas credenciais."
            }
            ErrorKind::CreditsExhausted => {
                "Seus créditos semanais acabaram. Faça um upgrade para continuar gerando."
            }
            ErrorKind::InsufficientInput => {
                "Envie uma foto do produto, uma referência visual ou descreva sua campanha antes de gerar."
            }
            ErrorKind::ContentBlocked => {
                "O conteúdo foi bloqueado pelos filtros de segurança. Ajuste o texto ou as imagens e tente novamente."
            }
            ErrorKind::RateLimited => {
                "Muitas solicitações no momento. Aguarde alguns instantes e tente novamente."
            }
            ErrorKind::AssetInvalid => {
                "Uma das imagens enviadas é inválida ou está em um formato não suportado."
            }
            ErrorKind::NoImageProduced => "Falha na renderização da imagem.",
            ErrorKind::Unknown => "Falha inesperada na engine de geração.",
        }
    }

    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            ErrorKind::RateLimited | ErrorKind::Unknown | ErrorKind::NoImageProduced => {
                RecoveryAction::Retry
            }
            ErrorKind::CredentialsMissing | ErrorKind::AuthInvalid => {
                RecoveryAction::ReconnectCredentials
            }
            ErrorKind::ContentBlocked | ErrorKind::InsufficientInput | ErrorKind::AssetInvalid => {
                RecoveryAction::ReviseContent
            }
            ErrorKind::CreditsExhausted => RecoveryAction::TopUp,
        }
    }
}

/// A raw upstream failure normalized into a stable kind plus message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
        }
    }
}

/// Ordered signature table: first match wins. Kept deliberately small; add a
/// signature here rather than string-matching at a call site.
const SIGNATURES: &[(&[&str], ErrorKind)] = &[
    (
        &["safety", "blocked", "moderation", "prohibited"],
        ErrorKind::ContentBlocked,
    ),
    (
        &["429", "rate limit", "quota", "resource exhausted", "resource_exhausted"],
        ErrorKind::RateLimited,
    ),
    (
        &[
            "api key",
            "api_key",
            "unauthorized",
            "unauthenticated",
            "401",
            "403",
            "permission denied",
            "not found",
            "credential",
        ],
        ErrorKind::AuthInvalid,
    ),
    (
        &[
            "unsupported mime",
            "invalid image",
            "image decoding",
            "unable to process input image",
            "invalid base64",
        ],
        ErrorKind::AssetInvalid,
    ),
];

/// Map an arbitrary upstream error message to a stable kind.
///
/// Total and panic-free: anything unrecognized becomes `Unknown` with the
/// lowercased raw text preserved for diagnosis.
pub fn classify(raw: &str) -> ClassifiedError {
    let lowered = raw.to_lowercase();
    for (needles, kind) in SIGNATURES {
        if needles.iter().any(|needle| lowered.contains(needle)) {
            return ClassifiedError::new(*kind);
        }
    }
    ClassifiedError {
        kind: ErrorKind::Unknown,
        message: format!("{} ({})", ErrorKind::Unknown.user_message(), lowered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rate_limit_signature() {
        let err = classify("429: Resource exhausted");
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_safety_block_signature() {
        let err = classify("Candidate was blocked due to SAFETY");
        assert_eq!(err.kind, ErrorKind::ContentBlocked);
    }

    #[test]
    fn test_auth_signature() {
        let err = classify("API key not found");
        assert_eq!(err.kind, ErrorKind::AuthInvalid);
    }

    #[test]
    fn test_asset_signature() {
        let err = classify("400: Unable to process input image");
        assert_eq!(err.kind, ErrorKind::AssetInvalid);
    }

    #[test]
    fn test_unknown_retains_raw_text() {
        let err = classify("Weird Proxy Timeout 504");
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(err.message.contains("weird proxy timeout 504"));
    }

    #[test]
    fn test_first_match_wins_over_later_signatures() {
        // Contains both a safety word and a quota word; safety is listed first
        let err = classify("request blocked: quota check skipped");
        assert_eq!(err.kind, ErrorKind::ContentBlocked);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify("RATE LIMIT hit").kind, ErrorKind::RateLimited);
        assert_eq!(classify("PERMISSION DENIED").kind, ErrorKind::AuthInvalid);
    }

    #[test]
    fn test_every_kind_has_message_and_action() {
        let kinds = [
            ErrorKind::CredentialsMissing,
            ErrorKind::AuthInvalid,
            ErrorKind::CreditsExhausted,
            ErrorKind::InsufficientInput,
            ErrorKind::ContentBlocked,
            ErrorKind::RateLimited,
            ErrorKind::AssetInvalid,
            ErrorKind::NoImageProduced,
            ErrorKind::Unknown,
        ];
        for kind in kinds {
            assert!(!kind.user_message().is_empty());
            // recovery_action is total; just exercise it
            let _ = kind.recovery_action();
        }
    }

    proptest! {
        #[test]
        fn prop_classify_is_total(raw in ".{0,200}") {
            let err = classify(&raw);
            prop_assert!(!err.message.is_empty());
        }

        #[test]
        fn prop_unmatched_text_is_preserved_lowercased(raw in "[a-z ]{1,40}") {
            let err = classify(&raw);
            if err.kind == ErrorKind::Unknown {
                prop_assert!(err.message.contains(&raw));
            }
        }
    }
}
