// Integration tests for the generation orchestrator
// These tests drive the full pipeline against a fake generative backend

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::assets::{AssetBundle, AssetPayload};
    use crate::credits::CreditLedger;
    use crate::errors::ErrorKind;
    use crate::gemini_client::{CaptionResult, GenerativeBackend, InlineImage};
    use crate::models::{AspectRatio, GenerationConfig, GroundingSource, Quality};
    use crate::niches::{self, NicheProfile};
    use crate::pipeline::{
        generate_campaign, PROGRESS_CALIBRATING, PROGRESS_CAPTIONING, PROGRESS_COMPILING,
        PROGRESS_RENDERING,
    };

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
    const WEBP_MAGIC: [u8; 12] = [
        0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50,
    ];

    fn png_asset() -> AssetPayload {
        AssetPayload::new(PNG_MAGIC.to_vec()).unwrap()
    }

    fn sample_dna_json() -> String {
        serde_json::json!({
            "colors": {
                "background": "#101820",
                "primary": "#f2aa4c",
                "accent": "#ffffff",
                "text": "#f8f8f8"
            },
            "typographyStyle": "serif display with wide tracking",
            "compositionBlueprint": "diagonal product sweep",
            "imageGenerationPromptFragment": "slate backdrop with amber glow"
        })
        .to_string()
    }

    /// Scriptable backend that records every call it receives
    struct FakeBackend {
        image: Result<Option<InlineImage>, String>,
        caption: Result<CaptionResult, String>,
        analysis: Result<String, String>,
        image_calls: AtomicUsize,
        caption_calls: AtomicUsize,
        analysis_calls: AtomicUsize,
        last_brief: Mutex<Option<String>>,
        last_attachment_mimes: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn happy() -> Self {
            Self {
                image: Ok(Some(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0KGgo=".to_string(),
                })),
                caption: Ok(CaptionResult {
                    text: "A melhor pizza da cidade! \u{1F355} #pizzaria".to_string(),
                    sources: vec![GroundingSource {
                        uri: "https://example.com/trends".to_string(),
                        title: Some("Food Trends".to_string()),
                    }],
                }),
                analysis: Ok(sample_dna_json()),
                image_calls: AtomicUsize::new(0),
                caption_calls: AtomicUsize::new(0),
                analysis_calls: AtomicUsize::new(0),
                last_brief: Mutex::new(None),
                last_attachment_mimes: Mutex::new(Vec::new()),
            }
        }

        fn total_calls(&self) -> usize {
            self.image_calls.load(Ordering::SeqCst)
                + self.caption_calls.load(Ordering::SeqCst)
                + self.analysis_calls.load(Ordering::SeqCst)
        }

        fn last_brief(&self) -> String {
            self.last_brief.lock().unwrap().clone().unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenerativeBackend for FakeBackend {
        async fn render_image(
            &self,
            brief: &str,
            attachments: &[&AssetPayload],
            _aspect_ratio: AspectRatio,
            _quality: Quality,
        ) -> Result<Option<InlineImage>, String> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_brief.lock().unwrap() = Some(brief.to_string());
            *self.last_attachment_mimes.lock().unwrap() = attachments
                .iter()
                .map(|a| a.mime_type().to_string())
                .collect();
            self.image.clone()
        }

        async fn write_caption(
            &self,
            _niche: &NicheProfile,
            _config: &GenerationConfig,
        ) -> Result<CaptionResult, String> {
            self.caption_calls.fetch_add(1, Ordering::SeqCst);
            self.caption.clone()
        }

        async fn analyze_style_reference(
            &self,
            _reference: &AssetPayload,
        ) -> Result<String, String> {
            self.analysis_calls.fetch_add(1, Ordering::SeqCst);
            self.analysis.clone()
        }
    }

    fn pizzaria() -> &'static NicheProfile {
        niches::find("pizzaria").unwrap()
    }

    fn config_with_text(text: &str) -> GenerationConfig {
        let mut config = GenerationConfig::for_niche(pizzaria());
        config.text = text.to_string();
        config
    }

    #[tokio::test]
    async fn test_insufficient_input_fails_fast_with_zero_network_calls() {
        let backend = FakeBackend::happy();
        let ledger = CreditLedger::new(3, 0, 0);
        let config = config_with_text("");

        let result = generate_campaign(
            &backend,
            pizzaria(),
            &AssetBundle::default(),
            &config,
            &ledger,
            |_| {},
        )
        .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::InsufficientInput);
        assert_eq!(backend.total_calls(), 0);
        assert_eq!(ledger.consumed(), 0);
    }

    #[tokio::test]
    async fn test_credits_checked_before_anything_else() {
        let backend = FakeBackend::happy();
        let ledger = CreditLedger::new(1, 0, 1);
        let assets = AssetBundle {
            product_photo: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("promoção de quinta-feira");

        let result =
            generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {}).await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::CreditsExhausted);
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_happy_path_reports_progress_and_returns_artifact() {
        let backend = FakeBackend::happy();
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            product_photo: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("pizza de calabresa artesanal");

        let mut progress: Vec<String> = Vec::new();
        let artifact = generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |msg| {
            progress.push(msg.to_string())
        })
        .await
        .unwrap();

        assert_eq!(artifact.url, "data:image/png;base64,iVBORw0KGgo=");
        assert!(artifact.caption.contains("melhor pizza"));
        assert_eq!(artifact.sources.len(), 1);
        assert_eq!(artifact.niche, "Pizzaria Gourmet");
        assert!(!artifact.id.is_empty());
        assert_eq!(
            progress,
            vec![
                PROGRESS_CALIBRATING,
                PROGRESS_COMPILING,
                PROGRESS_RENDERING,
                PROGRESS_CAPTIONING
            ]
        );
        // No style reference, so the DNA pre-stage must not run
        assert_eq!(backend.analysis_calls.load(Ordering::SeqCst), 0);
        // The orchestrator itself never debits
        assert_eq!(ledger.consumed(), 0);
    }

    #[tokio::test]
    async fn test_style_reference_feeds_dna_into_brief() {
        let backend = FakeBackend::happy();
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            style_reference: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("nova identidade visual");

        generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(backend.analysis_calls.load(Ordering::SeqCst), 1);
        let brief = backend.last_brief();
        assert!(brief.contains("Replicate the reference aesthetic"));
        assert!(brief.contains("slate backdrop with amber glow"));
    }

    #[tokio::test]
    async fn test_malformed_dna_output_degrades_to_no_dna() {
        let mut backend = FakeBackend::happy();
        backend.analysis = Ok("totally not json {".to_string());
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            style_reference: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("nova identidade visual");

        let artifact = generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {})
            .await
            .unwrap();

        assert!(!artifact.url.is_empty());
        assert!(!backend.last_brief().contains("Replicate the reference aesthetic"));
    }

    #[tokio::test]
    async fn test_dna_extraction_error_is_not_fatal() {
        let mut backend = FakeBackend::happy();
        backend.analysis = Err("vision model unavailable".to_string());
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            style_reference: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("nova identidade visual");

        let result =
            generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_caption_failure_keeps_the_rendered_image() {
        let mut backend = FakeBackend::happy();
        backend.caption = Err("503 service unavailable".to_string());
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            product_photo: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("pizza margherita");

        let artifact = generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(artifact.url, "data:image/png;base64,iVBORw0KGgo=");
        assert!(artifact.caption.is_empty());
        assert!(artifact.sources.is_empty());
    }

    #[tokio::test]
    async fn test_no_inline_image_is_no_image_produced() {
        let mut backend = FakeBackend::happy();
        backend.image = Ok(None);
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            product_photo: Some(png_asset()),
            ..Default::default()
        };
        let config = config_with_text("pizza quatro queijos");

        let result =
            generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {}).await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::NoImageProduced);
        // Caption stage must never start after the render failed
        assert_eq!(backend.caption_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_errors_are_classified() {
        for (raw, expected) in [
            ("429: Resource exhausted", ErrorKind::RateLimited),
            ("Candidate was blocked due to SAFETY", ErrorKind::ContentBlocked),
            ("API key not found", ErrorKind::AuthInvalid),
            ("weird proxy timeout 504", ErrorKind::Unknown),
        ] {
            let mut backend = FakeBackend::happy();
            backend.image = Err(raw.to_string());
            let ledger = CreditLedger::new(3, 0, 0);
            let assets = AssetBundle {
                product_photo: Some(png_asset()),
                ..Default::default()
            };
            let config = config_with_text("pizza de pepperoni");

            let err = generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {})
                .await
                .unwrap_err();
            assert_eq!(err.kind, expected, "raw error: {raw}");
        }
    }

    #[tokio::test]
    async fn test_attachments_sent_in_priority_order() {
        let backend = FakeBackend::happy();
        let ledger = CreditLedger::new(3, 0, 0);
        let assets = AssetBundle {
            product_photo: Some(AssetPayload::new(PNG_MAGIC.to_vec()).unwrap()),
            brand_logo: Some(AssetPayload::new(JPEG_MAGIC.to_vec()).unwrap()),
            style_reference: Some(AssetPayload::new(WEBP_MAGIC.to_vec()).unwrap()),
        };
        let config = config_with_text("combo completo");

        generate_campaign(&backend, pizzaria(), &assets, &config, &ledger, |_| {})
            .await
            .unwrap();

        let mimes = backend.last_attachment_mimes.lock().unwrap().clone();
        assert_eq!(mimes, vec!["image/png", "image/webp", "image/jpeg"]);
    }

    /// N concurrent attempts against an account with exactly one remaining
    /// credit: every attempt may render, but exactly one debit must win.
    #[tokio::test]
    async fn test_concurrent_attempts_cannot_overspend_last_credit() {
        let backend = Arc::new(FakeBackend::happy());
        let ledger = Arc::new(CreditLedger::new(1, 0, 0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let backend = backend.clone();
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let assets = AssetBundle {
                    product_photo: Some(AssetPayload::new(PNG_MAGIC.to_vec()).unwrap()),
                    ..Default::default()
                };
                let config = config_with_text("última campanha da semana");
                let generated = generate_campaign(
                    backend.as_ref(),
                    pizzaria(),
                    &assets,
                    &config,
                    &ledger,
                    |_| {},
                )
                .await
                .is_ok();
                // Caller-side debit, as the UI shell would do after success
                generated && ledger.try_debit().is_ok()
            }));
        }

        let mut debits = 0;
        for handle in handles {
            if handle.await.unwrap() {
                debits += 1;
            }
        }
        assert_eq!(debits, 1);
        assert_eq!(ledger.consumed(), 1);
    }
}
