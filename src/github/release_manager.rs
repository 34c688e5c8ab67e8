//! GitHub Release management over the REST API

use super::{GitHubAsset, GitHubRelease, RemoteReleaseClient};
use crate::config::GitHubSettings;
use crate::error::{ReleaseError, RemoteError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue,
};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

const GITHUB_JSON: &str = "application/vnd.github+json";
const OCTET_STREAM: &str = "application/octet-stream";
const API_VERSION: &str = "2022-11-28";

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    draft: bool,
    prerelease: bool,
}

/// GitHub release manager
pub struct GitHubReleaseManager {
    /// HTTP client with authentication headers attached
    http: reqwest::Client,
    /// Repository and endpoint
    settings: GitHubSettings,
    /// Timeout for a single asset upload
    upload_timeout: Duration,
}

impl GitHubReleaseManager {
    /// Create new GitHub release manager
    pub fn new(settings: GitHubSettings, upload_timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token)).map_err(|e| {
            ReleaseError::Remote(RemoteError::Request {
                operation: "configure GitHub client".to_string(),
                reason: format!("token is not a valid header value: {}", e),
            })
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(concat!("delta_publish/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ReleaseError::Remote(RemoteError::Request {
                    operation: "configure GitHub client".to_string(),
                    reason: e.to_string(),
                })
            })?;

        Ok(Self {
            http,
            settings,
            upload_timeout,
        })
    }

    /// Repository-scoped API URL
    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.settings.api_url, self.settings.owner, self.settings.repo, tail
        )
    }

    /// Send a request and turn transport failures and non-2xx answers into errors
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        log::debug!("GitHub: {}", operation);

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::Remote(RemoteError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            }));
        }

        Ok(response)
    }

    async fn json<T: serde::de::DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            ReleaseError::Remote(RemoteError::InvalidResponse {
                operation: operation.to_string(),
                reason: e.to_string(),
            })
        })
    }
}

#[async_trait]
impl RemoteReleaseClient for GitHubReleaseManager {
    async fn list_releases(&self) -> Result<Vec<GitHubRelease>> {
        let operation = "list releases";
        let request = self
            .http
            .get(self.repo_url("releases"))
            .query(&[("per_page", "100")]);
        let response = self.send(operation, request, None).await?;
        Self::json(operation, response).await
    }

    async fn list_assets(&self, release_id: u64) -> Result<Vec<GitHubAsset>> {
        let operation = format!("list assets of release {}", release_id);
        let request = self
            .http
            .get(self.repo_url(&format!("releases/{}/assets", release_id)))
            .query(&[("per_page", "100")]);
        let response = self.send(&operation, request, None).await?;
        Self::json(&operation, response).await
    }

    async fn create_release(
        &self,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> Result<GitHubRelease> {
        let operation = format!("create release {}", name);
        let request = self.http.post(self.repo_url("releases")).json(&CreateReleaseBody {
            tag_name: name,
            name,
            draft,
            prerelease,
        });
        let response = self.send(&operation, request, None).await?;
        Self::json(&operation, response).await
    }

    async fn upload_asset(&self, release: &GitHubRelease, path: &Path) -> Result<()> {
        let asset_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            ReleaseError::Remote(RemoteError::Request {
                operation: "upload asset".to_string(),
                reason: format!("invalid asset file name: {}", path.display()),
            })
        })?;
        let operation = format!("upload {}", asset_name);
        let url = asset_upload_url(&release.upload_url, asset_name)?;

        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(file));

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(CONTENT_LENGTH, length)
            .timeout(self.upload_timeout)
            .body(body);
        self.send(&operation, request, Some(self.upload_timeout))
            .await?;

        log::info!("Uploaded {} ({} bytes)", asset_name, length);
        Ok(())
    }

    async fn download_asset(&self, asset_id: u64, destination: &Path) -> Result<()> {
        let operation = format!("download asset {}", asset_id);
        let request = self
            .http
            .get(self.repo_url(&format!("releases/assets/{}", asset_id)))
            .header(ACCEPT, OCTET_STREAM);
        let mut response = self.send(&operation, request, None).await?;

        let mut file = tokio::fs::File::create(destination).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(&operation, e, None))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        log::info!("Downloaded {}", destination.display());
        Ok(())
    }

    async fn fetch_raw_asset_content(&self, asset_id: u64) -> Result<Bytes> {
        let operation = format!("fetch asset {}", asset_id);
        let request = self
            .http
            .get(self.repo_url(&format!("releases/assets/{}", asset_id)))
            .header(ACCEPT, OCTET_STREAM);
        let response = self.send(&operation, request, None).await?;
        response
            .bytes()
            .await
            .map_err(|e| transport_error(&operation, e, None))
    }
}

/// Resolve a release's upload URL template for one asset.
///
/// `https://uploads.github.com/.../assets{?name,label}` becomes
/// `https://uploads.github.com/.../assets?name=<asset>`.
pub fn asset_upload_url(template: &str, asset_name: &str) -> Result<Url> {
    let base = template
        .split_once('{')
        .map_or(template, |(base, _)| base);
    let mut url = Url::parse(base).map_err(|e| {
        ReleaseError::Remote(RemoteError::InvalidResponse {
            operation: "resolve upload URL".to_string(),
            reason: format!("'{}': {}", template, e),
        })
    })?;
    url.query_pairs_mut().append_pair("name", asset_name);
    Ok(url)
}

fn transport_error(operation: &str, error: reqwest::Error, timeout: Option<Duration>) -> ReleaseError {
    if error.is_timeout() {
        return ReleaseError::Remote(RemoteError::Timeout {
            operation: operation.to_string(),
            seconds: timeout.map(|t| t.as_secs()).unwrap_or_default(),
        });
    }
    ReleaseError::Remote(RemoteError::Request {
        operation: operation.to_string(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url_strips_template() {
        let url = asset_upload_url(
            "https://uploads.github.com/repos/acme/app/releases/9/assets{?name,label}",
            "App-2024.115.0-full.nupkg",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/acme/app/releases/9/assets?name=App-2024.115.0-full.nupkg"
        );
    }

    #[test]
    fn test_upload_url_encodes_name() {
        let url = asset_upload_url("https://uploads.example/assets", "My App Setup.exe").unwrap();
        assert_eq!(url.query(), Some("name=My+App+Setup.exe"));
    }

    #[test]
    fn test_upload_url_rejects_garbage() {
        assert!(asset_upload_url("not a url{?name}", "x").is_err());
    }
}
