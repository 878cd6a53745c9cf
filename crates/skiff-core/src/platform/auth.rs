//! Access token resolution for platform calls.

use std::fmt;

use anyhow::Context;

/// A bearer token for the Google Cloud APIs.
///
/// Resolution order: an explicitly supplied token, the
/// `GOOGLE_ACCESS_TOKEN` environment variable, then the local gcloud
/// installation's application default credentials.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn resolve(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(token) = explicit {
            return Ok(Self(token.trim().to_string()));
        }

        if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN")
            && !token.trim().is_empty()
        {
            return Ok(Self(token.trim().to_string()));
        }

        Self::from_gcloud()
    }

    fn from_gcloud() -> anyhow::Result<Self> {
        let output = std::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .context("Failed to run gcloud; pass --token or set GOOGLE_ACCESS_TOKEN")?;

        if !output.status.success() {
            anyhow::bail!(
                "gcloud auth print-access-token failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let token = String::from_utf8(output.stdout)
            .context("gcloud returned a non-UTF-8 token")?
            .trim()
            .to_string();
        if token.is_empty() {
            anyhow::bail!("gcloud returned an empty access token");
        }

        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never log the token itself.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
