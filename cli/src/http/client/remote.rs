//! 远程客户端 - 通过 HTTP 驱动 `packager serve` 的 task endpoint

use anyhow::{Context, Result};
use async_trait::async_trait;
use packager_core::api::{ExecuteRequest, TaskExecutor, TaskOutcome};
use reqwest::Client;

use crate::http::models::BootstrapResponse;

/// 远程客户端
///
/// One client drives one queue: the nonce from [`RemoteClient::bootstrap`]
/// is reused for every task of the run.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    server_url: String,
    api_key: Option<String>,
    action: String,
    nonce: String,
}

impl RemoteClient {
    pub fn new(server_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            action: packager_core::api::INSTALL_ACTION.to_string(),
            nonce: String::new(),
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Fetch the page snapshot and keep its action and install nonce.
    pub async fn bootstrap(&mut self) -> Result<BootstrapResponse> {
        let url = format!("{}/api/v1/bootstrap", self.server_url);
        tracing::debug!(target: "packager.client", "GET {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("bootstrap request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("bootstrap failed with status {status}: {text}");
        }

        let boot: BootstrapResponse = response
            .json()
            .await
            .context("invalid bootstrap response")?;
        self.action = boot.action.clone();
        self.nonce = boot.nonce.clone();
        Ok(boot)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.server_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("health check against {url} failed"))?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl TaskExecutor for RemoteClient {
    fn name(&self) -> &str {
        "remote"
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<TaskOutcome> {
        let url = format!("{}/admin-ajax", self.server_url);
        let activate = if request.auto_activate { "1" } else { "0" };
        let form = [
            ("action", self.action.as_str()),
            ("slug", request.identifier.as_str()),
            ("activate", activate),
            ("nonce", self.nonce.as_str()),
        ];

        tracing::debug!(
            target: "packager.client",
            slug = %request.identifier,
            activate,
            "POST {}",
            url
        );

        let response = self
            .authorized(self.client.post(&url))
            .form(&form)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        // error bodies use the same {success, data} envelope
        let body = response.text().await.context("read response body")?;
        Ok(TaskOutcome::from_response_body(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn bootstrap_body() -> String {
        serde_json::json!({
            "action": "packager_install_plugin",
            "nonce": "n-123",
            "export_nonce": "e",
            "import_nonce": "i",
            "preset": {"name": "Default", "plugins": ["alpha", "beta"]},
            "auto_activate": true,
            "version": "1.1.2"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_bootstrap_then_execute_sends_nonce() {
        let mut server = Server::new_async().await;
        let _boot = server
            .mock("GET", "/api/v1/bootstrap")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(bootstrap_body())
            .create_async()
            .await;
        let install = server
            .mock("POST", "/admin-ajax")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "packager_install_plugin".into()),
                Matcher::UrlEncoded("slug".into(), "alpha".into()),
                Matcher::UrlEncoded("activate".into(), "1".into()),
                Matcher::UrlEncoded("nonce".into(), "n-123".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true,"data":"Completed: installed and activated."}"#)
            .create_async()
            .await;

        let mut client = RemoteClient::new(&server.url(), None, 5).unwrap();
        let boot = client.bootstrap().await.unwrap();
        assert_eq!(boot.preset.plugins, vec!["alpha", "beta"]);

        let outcome = client
            .execute(&ExecuteRequest::new("alpha", true))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TaskOutcome::succeeded("Completed: installed and activated.")
        );
        install.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_failure_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/admin-ajax")
            .with_status(200)
            .with_body(r#"{"success":false,"data":"Plugin not found in repository."}"#)
            .create_async()
            .await;

        let client = RemoteClient::new(&server.url(), None, 5).unwrap();
        let outcome = client
            .execute(&ExecuteRequest::new("beta", false))
            .await
            .unwrap();
        assert_eq!(outcome, TaskOutcome::failed("Plugin not found in repository."));
    }

    #[tokio::test]
    async fn test_execute_undecodable_body_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/admin-ajax")
            .with_status(500)
            .with_body("<html>fatal error</html>")
            .create_async()
            .await;

        let client = RemoteClient::new(&server.url(), None, 5).unwrap();
        let err = client
            .execute(&ExecuteRequest::new("alpha", false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to decode executor response"));
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/v1/bootstrap")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(bootstrap_body())
            .create_async()
            .await;

        let mut client = RemoteClient::new(&server.url(), Some("secret".into()), 5).unwrap();
        client.bootstrap().await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_bootstrap_forbidden() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v1/bootstrap")
            .with_status(403)
            .with_body(r#"{"success":false,"data":"nope"}"#)
            .create_async()
            .await;

        let mut client = RemoteClient::new(&server.url(), None, 5).unwrap();
        assert!(client.bootstrap().await.is_err());
    }
}
