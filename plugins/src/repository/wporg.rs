use async_trait::async_trait;
use packager_core::api::{PackageDescriptor, PackageRepository, RepositoryError};
use serde::Deserialize;
use serde_json::Value;

use crate::http::{FallbackClient, HttpError, HttpErrorKind};

/// `plugin_information` response; unknown slugs come back as `{"error": ...}`.
#[derive(Debug, Deserialize)]
struct PluginInformation {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// Lookup against the public plugin directory API (`plugins/info/1.2`).
#[derive(Clone)]
pub struct DirectoryRepository {
    http: FallbackClient,
    url_info: String,
}

impl DirectoryRepository {
    pub fn new(base_url: &str, timeout_ms: u64, insecure_fallback: bool) -> anyhow::Result<Self> {
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            http: FallbackClient::new(timeout_ms, insecure_fallback)?,
            url_info: format!("{}/plugins/info/1.2/", normalized),
        })
    }

    fn describe(slug: &str, body: Value) -> Result<PackageDescriptor, RepositoryError> {
        let info: PluginInformation = serde_json::from_value(body)
            .map_err(|e| RepositoryError::Decode(format!("plugin_information for '{slug}': {e}")))?;
        if info.error.is_some() {
            return Err(RepositoryError::NotFound(slug.to_string()));
        }
        let download_link = info
            .download_link
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| RepositoryError::Decode(format!("no download_link for '{slug}'")))?;

        Ok(PackageDescriptor {
            slug: info.slug.unwrap_or_else(|| slug.to_string()),
            name: info.name.unwrap_or_default(),
            version: info.version,
            download_link,
        })
    }
}

fn map_http_error(slug: &str, err: HttpError) -> RepositoryError {
    match err.kind() {
        HttpErrorKind::Status if err.status() == Some(404) => {
            RepositoryError::NotFound(slug.to_string())
        }
        HttpErrorKind::Decode => RepositoryError::Decode(err.to_string()),
        _ => RepositoryError::Transport(err.to_string()),
    }
}

#[async_trait]
impl PackageRepository for DirectoryRepository {
    fn name(&self) -> &str {
        "directory"
    }

    async fn lookup(&self, slug: &str) -> Result<PackageDescriptor, RepositoryError> {
        tracing::debug!(target: "packager.repository", url = %self.url_info, slug = %slug, "lookup");
        let query = [
            ("action", "plugin_information".to_string()),
            ("request[slug]", slug.to_string()),
            ("request[fields][sections]", "0".to_string()),
        ];
        let body = self
            .http
            .get_json(&self.url_info, &query)
            .await
            .map_err(|err| map_http_error(slug, err))?;
        let package = Self::describe(slug, body)?;
        tracing::debug!(
            target: "packager.repository",
            slug = %package.slug,
            version = ?package.version,
            "resolved"
        );
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    async fn repo_for(server: &mockito::ServerGuard) -> DirectoryRepository {
        DirectoryRepository::new(&server.url(), 1_000, false).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_resolves_download_link() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/plugins/info/1.2/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "plugin_information".into()),
                Matcher::UrlEncoded("request[slug]".into(), "akismet".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name":"Akismet","slug":"akismet","version":"5.3",
                    "download_link":"https://downloads.test/akismet.5.3.zip"}"#,
            )
            .create_async()
            .await;

        let package = repo_for(&server).await.lookup("akismet").await.unwrap();
        assert_eq!(
            package,
            PackageDescriptor {
                slug: "akismet".into(),
                name: "Akismet".into(),
                version: Some("5.3".into()),
                download_link: "https://downloads.test/akismet.5.3.zip".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_error_body_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/plugins/info/1.2/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":"Plugin not found."}"#)
            .create_async()
            .await;

        let err = repo_for(&server).await.lookup("nope").await.unwrap_err();
        assert_eq!(err, RepositoryError::NotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_lookup_404_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/plugins/info/1.2/")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"Plugin not found."}"#)
            .create_async()
            .await;

        let err = repo_for(&server).await.lookup("nope").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_transport() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/plugins/info/1.2/")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = repo_for(&server).await.lookup("akismet").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transport(ref m) if m.contains("status=503")));
    }

    #[tokio::test]
    async fn test_lookup_without_link_is_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/plugins/info/1.2/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"slug":"closed-plugin","name":"Closed"}"#)
            .create_async()
            .await;

        let err = repo_for(&server)
            .await
            .lookup("closed-plugin")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));
    }

    #[test]
    fn test_describe_ignores_extra_fields_and_rejects_bad_shapes() {
        let body = serde_json::json!({
            "slug": "akismet",
            "download_link": "https://downloads.test/akismet.zip",
            "rating": 96,
            "sections": {"description": "..."}
        });
        let package = DirectoryRepository::describe("akismet", body).unwrap();
        assert_eq!(package.name, "");
        assert_eq!(package.version, None);

        let err = DirectoryRepository::describe("akismet", serde_json::json!(["not", "an", "object"]))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));
    }
}
