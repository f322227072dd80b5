//! Minimal GigaChat client: OAuth token exchange and non-streaming chat
//! completions.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use reqwest::{Client, ClientBuilder, header::ACCEPT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ClassifierConfig;

pub const OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const CHAT_COMPLETIONS_URL: &str =
    "https://gigachat.devices.sberbank.ru/api/v1/chat/completions";

/// Anything that answers a single user prompt with text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Epoch millis.
    expires_at: Option<i64>,
}

pub fn parse_token_response(body: &str) -> anyhow::Result<AccessToken> {
    let response: TokenResponse =
        serde_json::from_str(body).context("token response is not the expected json")?;
    Ok(AccessToken {
        value: response.access_token,
        expires_at: response.expires_at.and_then(DateTime::from_timestamp_millis),
    })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    n: u32,
    stream: bool,
    max_tokens: u32,
    update_interval: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> ChatRequest<'a> {
    fn single_prompt(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
            top_p: 0.9,
            n: 1,
            stream: false,
            max_tokens: 10,
            update_interval: 0,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Pulls `choices[0].message.content` out of a completion response.
pub fn parse_chat_response(body: &str) -> anyhow::Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).context("completion response is not the expected json")?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .context("completion response has no choices")?;
    Ok(choice.message.content)
}

pub struct GigaChatClient {
    client: Client,
    token: AccessToken,
    model: String,
    completions_url: String,
}

impl GigaChatClient {
    fn http_client() -> anyhow::Result<Client> {
        // The GigaChat endpoints are signed by a CA most trust stores lack.
        let client = ClientBuilder::new()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(client)
    }

    /// Exchanges the configured credential for an access token.
    ///
    /// Returns `None` when there is no credential or the exchange fails; the
    /// failure is logged, never propagated.
    pub async fn authorize(config: &ClassifierConfig) -> Option<Self> {
        let Some(auth_token) = &config.auth_token else {
            info!("No GIGACHAT_AUTH_TOKEN configured");
            return None;
        };
        if let Some(client_id) = &config.client_id {
            info!("Requesting GigaChat token for client {client_id}");
        }
        let client = match Self::http_client() {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build GigaChat http client: {e:#}");
                return None;
            }
        };
        let token =
            fetch_access_token(&client, &config.oauth_url, auth_token, &config.scope).await?;
        Some(Self {
            client,
            token,
            model: config.model.clone(),
            completions_url: config.completions_url.clone(),
        })
    }
}

pub async fn fetch_access_token(
    client: &Client,
    oauth_url: &str,
    auth_token: &str,
    scope: &str,
) -> Option<AccessToken> {
    match try_fetch_access_token(client, oauth_url, auth_token, scope).await {
        Ok(token) => {
            match token.expires_at {
                Some(expires_at) => info!("Got GigaChat token, expires at {expires_at}"),
                None => info!("Got GigaChat token"),
            }
            Some(token)
        }
        Err(e) => {
            error!("Failed to get GigaChat token: {e:#}");
            None
        }
    }
}

async fn try_fetch_access_token(
    client: &Client,
    oauth_url: &str,
    auth_token: &str,
    scope: &str,
) -> anyhow::Result<AccessToken> {
    let body = client
        .post(oauth_url)
        .header(ACCEPT, "application/json")
        .header("RqUID", uuid::Uuid::new_v4().to_string())
        .header("Authorization", format!("Basic {auth_token}"))
        .form(&[("scope", scope)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_token_response(&body)
}

#[async_trait]
impl CompletionBackend for GigaChatClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request = ChatRequest::single_prompt(&self.model, prompt);
        let body = self
            .client
            .post(&self.completions_url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token.value)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_chat_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    fn config(
        auth_token: Option<&str>,
        oauth_url: &str,
        completions_url: &str,
    ) -> ClassifierConfig {
        ClassifierConfig {
            client_id: None,
            auth_token: auth_token.map(str::to_string),
            scope: "GIGACHAT_API_PERS".to_string(),
            model: "GigaChat".to_string(),
            oauth_url: oauth_url.to_string(),
            completions_url: completions_url.to_string(),
            classify_delay: Duration::ZERO,
        }
    }

    fn request_is_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= content_length
    }

    /// Answers a single http request with `body` and hands back the raw
    /// request it received.
    async fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_is_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });
        (url, handle)
    }

    /// A local url nothing is listening on.
    async fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    #[test]
    fn parses_token_with_expiry() {
        let token =
            parse_token_response(r#"{"access_token":"abc","expires_at":1706026848841}"#).unwrap();
        assert_eq!(token.value, "abc");
        assert_eq!(
            token.expires_at.unwrap().timestamp_millis(),
            1_706_026_848_841
        );
    }

    #[test]
    fn token_without_access_token_is_an_error() {
        assert!(parse_token_response(r#"{"message":"unauthorized"}"#).is_err());
    }

    #[test]
    fn parses_first_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"True"},"index":0}],"model":"GigaChat"}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "True");
        assert!(parse_chat_response(r#"{"choices":[]}"#).is_err());
    }

    #[test]
    fn request_body_has_fixed_sampling() {
        let request = ChatRequest::single_prompt("GigaChat", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "GigaChat");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["stream"], false);
        assert_eq!(json["max_tokens"], 10);
        assert_eq!(json["n"], 1);
    }

    #[tokio::test]
    async fn no_auth_token_means_no_client() {
        let url = closed_url().await;
        let config = config(None, &url, &url);
        assert!(GigaChatClient::authorize(&config).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_gives_none() {
        let url = closed_url().await;
        let client = GigaChatClient::http_client().unwrap();
        let token = fetch_access_token(&client, &url, "secret", "GIGACHAT_API_PERS").await;
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn garbled_token_response_gives_none() {
        let (oauth_url, server) = serve_once("<html>maintenance</html>").await;
        let config = config(Some("secret"), &oauth_url, &closed_url().await);

        assert!(GigaChatClient::authorize(&config).await.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn authorized_client_completes_with_bearer_token() {
        let (oauth_url, oauth_server) =
            serve_once(r#"{"access_token":"abc","expires_at":1706026848841}"#).await;
        let (completions_url, completions_server) =
            serve_once(r#"{"choices":[{"message":{"role":"assistant","content":"True"}}]}"#).await;
        let config = config(Some("secret"), &oauth_url, &completions_url);

        let client = GigaChatClient::authorize(&config).await.unwrap();
        let oauth_request = oauth_server.await.unwrap();
        assert!(oauth_request.starts_with("post /api"));
        assert!(oauth_request.contains("authorization: basic secret"));
        assert!(oauth_request.contains("rquid: "));
        assert!(oauth_request.contains("scope=gigachat_api_pers"));

        assert_eq!(client.complete("hello").await.unwrap(), "True");
        let completions_request = completions_server.await.unwrap();
        assert!(completions_request.contains("authorization: bearer abc"));
        assert!(completions_request.contains(r#""max_tokens":10"#));
    }
}
