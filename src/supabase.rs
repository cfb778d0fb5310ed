//! Supabase persistence gateway
//!
//! Boundary to the durable store behind the PostgREST API: generated-image
//! history in `generated_images`, credit counters in `profiles`. Each call is
//! independently atomic; the calls together are not transactional, so the
//! caller must tolerate "image rendered but save failed" without corrupting
//! the ledger. The consumed-credit write is a conditional update that only
//! matches when the pre-update counter still holds the expected value, which
//! closes the read/compute/write over-spend race across devices and tabs.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::credits::CreditLedger;
use crate::models::GeneratedArtifact;

/// Supabase local-dev API port; production projects configure their own URL
pub const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";

/// HTTP client timeout for Supabase requests
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Supabase error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Conditional update matched no rows (counter changed underneath us)")]
    DebitConflict,

    #[error("Invalid URL: {0}")]
    UrlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Row shape of the `profiles` table credit columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub credits_weekly: u32,
    pub credits_used: u32,
    pub credits_extra: u32,
}

impl ProfileRow {
    /// Seed a local ledger from the remote counters
    pub fn to_ledger(&self) -> CreditLedger {
        CreditLedger::new(self.credits_weekly, self.credits_extra, self.credits_used)
    }
}

/// Row shape of the `generated_images` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImageRow {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    pub niche: String,
    pub caption: String,
    pub config: serde_json::Value,
    pub created_at: String,
}

/// Supabase REST client for one project
#[derive(Debug)]
pub struct SupabaseClient {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, SupabaseError> {
        let cleaned_url = base_url.trim_end_matches('/');
        info!("Creating SupabaseClient with base_url: {}", cleaned_url);

        let parsed = url::Url::parse(cleaned_url)
            .map_err(|e| SupabaseError::UrlError(format!("Invalid URL '{}': {}", cleaned_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SupabaseError::UrlError(format!(
                "URL must use http or https scheme, got: {}",
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: cleaned_url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Persist one finished artifact for its owner
    pub async fn save_artifact(
        &self,
        artifact: &GeneratedArtifact,
        owner_id: &str,
    ) -> Result<(), SupabaseError> {
        let row = serde_json::json!({
            "id": artifact.id,
            "owner_id": owner_id,
            "url": artifact.url,
            "niche": artifact.niche,
            "caption": artifact.caption,
            "config": artifact.config,
            "created_at": artifact.created_at,
        });

        let response = self
            .authed(self.http_client.post(self.table_url("generated_images")))
            .json(&row)
            .send()
            .await?;

        self.expect_success(response).await?;
        info!(artifact_id = %artifact.id, "Artifact saved");
        Ok(())
    }

    /// Generation history for one owner, most recent first
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<GeneratedImageRow>, SupabaseError> {
        let response = self
            .authed(self.http_client.get(self.table_url("generated_images")))
            .query(&[
                ("owner_id", format!("eq.{}", owner_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        let body = self.expect_success(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn delete_artifact(&self, artifact_id: &str) -> Result<(), SupabaseError> {
        let response = self
            .authed(self.http_client.delete(self.table_url("generated_images")))
            .query(&[("id", format!("eq.{}", artifact_id))])
            .send()
            .await?;

        self.expect_success(response).await?;
        info!(artifact_id = %artifact_id, "Artifact deleted");
        Ok(())
    }

    /// Fetch the credit counters for one owner
    pub async fn fetch_profile(&self, owner_id: &str) -> Result<ProfileRow, SupabaseError> {
        let response = self
            .authed(self.http_client.get(self.table_url("profiles")))
            .query(&[("id", format!("eq.{}", owner_id))])
            .send()
            .await?;

        let body = self.expect_success(response).await?;
        let rows: Vec<ProfileRow> = serde_json::from_str(&body)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("profile {}", owner_id)))
    }

    /// Record one debit as a conditional increment.
    ///
    /// The update only matches while `credits_used` still equals
    /// `new_count - 1`; a concurrent debit from another device makes the
    /// filter miss and surfaces as [`SupabaseError::DebitConflict`] instead
    /// of a silent double-spend.
    pub async fn increment_consumed(
        &self,
        owner_id: &str,
        new_count: u32,
    ) -> Result<(), SupabaseError> {
        let Some(expected) = new_count.checked_sub(1) else {
            return Err(SupabaseError::DebitConflict);
        };

        let response = self
            .authed(self.http_client.patch(self.table_url("profiles")))
            .query(&[
                ("id", format!("eq.{}", owner_id)),
                ("credits_used", format!("eq.{}", expected)),
            ])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "credits_used": new_count }))
            .send()
            .await?;

        let body = self.expect_success(response).await?;
        let updated: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        if updated.is_empty() {
            return Err(SupabaseError::DebitConflict);
        }
        info!(owner_id = %owner_id, credits_used = new_count, "Credit debit recorded");
        Ok(())
    }

    async fn expect_success(&self, response: reqwest::Response) -> Result<String, SupabaseError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            status if status.is_success() => Ok(body),
            reqwest::StatusCode::NOT_FOUND => Err(SupabaseError::NotFound(body)),
            _ => Err(SupabaseError::Api { status, body }),
        }
    }
}
