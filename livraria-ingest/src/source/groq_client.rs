//! Groq chat-completions client
//!
//! Asks a web-search-enabled model for a `{"livros": [...]}` JSON document.
//! Non-2xx statuses and unusable bodies are `SourceUnavailable`; nothing is retried.

use super::BookSource;
use crate::parser::{strip_code_fence, RawCatalog};
use async_trait::async_trait;
use livraria_common::config::SourceConfig;
use livraria_common::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("livraria/", env!("CARGO_PKG_VERSION"));

pub const SYSTEM_PROMPT: &str = r#"Você é um assistente de catalogação de livros extremamente rápido e eficiente que utiliza busca na web para obter dados precisos e atualizados.
Sua resposta DEVE ser um objeto JSON válido e nada mais.
O JSON deve ter uma única chave "livros", que contém uma lista de objetos de livros.
Cada objeto de livro deve ter as seguintes chaves: "titulo", "autor", "genero", "sinopse", "anodepublicacao", "editora", "origem", "numerodepaginas", "ISBN".
Para o ISBN, forneça o ISBN-13 sempre que possível. Para o número de páginas, use uma edição comum como referência.
Exemplo de formato de saída:
{ "livros": [ { "titulo": "O Senhor dos Anéis", "autor": "J.R.R. Tolkien", "genero": "Fantasia", "sinopse": "Uma jornada para destruir um anel poderoso.", "anodepublicacao": 1954, "editora": "Allen & Unwin", "origem": "Reino Unido", "numerodepaginas": 423, "ISBN": "978-0618640157" } ] }
Não adicione nenhum texto, explicação ou formatação fora do objeto JSON principal e NÃO DEIXE FALTANDO NENHUM PARÂMETRO!"#;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Groq API client
pub struct GroqClient {
    http_client: reqwest::Client,
    config: SourceConfig,
    api_key: String,
}

impl GroqClient {
    /// Build a client; fails with a configuration error when no API key is set
    pub fn new(config: SourceConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    fn request_body(&self, query: &str) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": query },
            ],
            "compound_custom": {
                "tools": { "enabled_tools": ["web_search"] }
            },
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        })
    }
}

#[async_trait]
impl BookSource for GroqClient {
    async fn fetch_raw(&self, query: &str) -> Result<RawCatalog> {
        let url = &self.config.api_url;
        debug!(url = %url, model = %self.config.model, "Querying Groq API");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("POST {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "Groq API error {}: {}",
                status.as_u16(),
                body
            )));
        }

        debug!(bytes = body.len(), "Groq API response received");

        let chat: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            Error::SourceUnavailable(format!("unexpected Groq response format: {}", e))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::SourceUnavailable("Groq response contained no message content".to_string())
            })?;

        Ok(RawCatalog::Json(strip_code_fence(&content).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> SourceConfig {
        SourceConfig {
            api_key: Some("gsk_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let result = GroqClient::new(SourceConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let client = GroqClient::new(config_with_key()).unwrap();
        let body = client.request_body("cadastre todos os livros do autor Jorge Amado");

        assert_eq!(body["model"], "openai/gpt-oss-120b");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][1]["content"],
            "cadastre todos os livros do autor Jorge Amado"
        );
        assert_eq!(body["compound_custom"]["tools"]["enabled_tools"][0], "web_search");
        assert_eq!(body["max_tokens"], 8192);
        assert_eq!(body["stream"], false);
    }
}
