//! API Token Sources
//!
//! The PowerDNS API key comes either straight from the command line /
//! environment or from Google Secret Manager using Application Default
//! Credentials (ADC):
//! - Local: `gcloud auth application-default login`
//! - GKE: Workload Identity

use anyhow::{bail, Context, Result};
use gcloud_sdk::google::cloud::secretmanager::v1::secret_manager_service_client::SecretManagerServiceClient;
use gcloud_sdk::google::cloud::secretmanager::v1::AccessSecretVersionRequest;
use gcloud_sdk::{GoogleApi, GoogleAuthMiddleware};
use tracing::{debug, info};

/// Where the PowerDNS API key is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Key given directly
    Inline(String),
    /// Latest version of a Secret Manager secret
    SecretManager { project: String, secret: String },
}

impl TokenSource {
    /// Pick a source from the CLI options; an inline key wins
    pub fn from_options(
        api_token: Option<String>,
        gcp_project: Option<String>,
        secret_name: &str,
    ) -> Result<Self> {
        match (api_token, gcp_project) {
            (Some(token), _) if !token.is_empty() => Ok(TokenSource::Inline(token)),
            (_, Some(project)) if !project.is_empty() => Ok(TokenSource::SecretManager {
                project,
                secret: secret_name.to_string(),
            }),
            _ => bail!("No API token: pass --api-token or --gcp-project"),
        }
    }

    /// Resolve the key
    pub async fn resolve(&self) -> Result<String> {
        match self {
            TokenSource::Inline(token) => Ok(token.clone()),
            TokenSource::SecretManager { project, secret } => fetch_secret(project, secret)
                .await
                .context("Failed to fetch PowerDNS API token from GSM"),
        }
    }
}

/// Resource name of the newest version of `secret`
fn latest_version(project: &str, secret: &str) -> String {
    format!("projects/{}/secrets/{}/versions/latest", project, secret)
}

async fn fetch_secret(project: &str, secret: &str) -> Result<String> {
    debug!(project, secret, "Connecting to Secret Manager");

    let client: GoogleApi<SecretManagerServiceClient<GoogleAuthMiddleware>> =
        GoogleApi::from_function(
            SecretManagerServiceClient::new,
            "https://secretmanager.googleapis.com",
            None,
        )
        .await
        .context("Failed to initialize GSM client")?;

    let response = client
        .get()
        .access_secret_version(AccessSecretVersionRequest {
            name: latest_version(project, secret),
        })
        .await
        .context("Failed to access secret version")?;

    let token = response
        .into_inner()
        .payload
        .context("Secret has no payload")?
        .data
        .as_sensitive_str()
        .trim()
        .to_string();

    if token.is_empty() {
        bail!("Secret {} is empty", secret);
    }

    info!(secret, bytes = token.len(), "API token retrieved");
    Ok(token)
}
