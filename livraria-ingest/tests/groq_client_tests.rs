//! Groq client against a local HTTP stub
//!
//! The stub answers one request with a canned status and body, and hands the
//! captured request back to the test.

use livraria_common::config::SourceConfig;
use livraria_common::Error;
use livraria_ingest::parser::RawCatalog;
use livraria_ingest::{BookSource, GroqClient};
use serde_json::{json, Value};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

struct CapturedRequest {
    authorization: Option<String>,
    body: Value,
}

struct GroqStub {
    url: String,
    captured: mpsc::Receiver<CapturedRequest>,
    handle: Option<thread::JoinHandle<()>>,
}

impl GroqStub {
    fn spawn(status: u16, reply: impl Into<String>) -> Self {
        let reply = reply.into();
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start groq stub server");
        let url = format!("http://{}/openai/v1/chat/completions", server.server_addr());
        let (tx, captured) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut request = match server.recv_timeout(Duration::from_secs(10)) {
                Ok(Some(req)) => req,
                _ => return,
            };

            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
            let _ = tx.send(CapturedRequest {
                authorization,
                body,
            });

            let _ = request.respond(tiny_http::Response::from_string(reply).with_status_code(status));
        });

        Self {
            url,
            captured,
            handle: Some(handle),
        }
    }

    fn client(&self) -> GroqClient {
        GroqClient::new(SourceConfig {
            api_url: self.url.clone(),
            api_key: Some("gsk_test_key".to_string()),
            timeout_secs: 5,
            ..Default::default()
        })
        .expect("build groq client")
    }

    fn request(&self) -> CapturedRequest {
        self.captured
            .recv_timeout(Duration::from_secs(5))
            .expect("stub received a request")
    }
}

impl Drop for GroqStub {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn chat_reply(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
    .to_string()
}

const CATALOG_JSON: &str = r#"{"livros": [{"titulo": "Gabriela, Cravo e Canela", "autor": "Jorge Amado", "genero": "Romance", "sinopse": "Ilhéus, 1925.", "anodepublicacao": 1958, "editora": "Martins", "origem": "Brasil", "numerodepaginas": 424, "ISBN": "978-85-359-0277-3"}]}"#;

#[tokio::test]
async fn test_fenced_reply_is_parsed() {
    let stub = GroqStub::spawn(200, chat_reply(&format!("```json\n{}\n```", CATALOG_JSON)));
    let client = stub.client();

    let books = client
        .search_books("cadastre todos os livros do autor Jorge Amado")
        .await
        .unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Gabriela, Cravo e Canela");
    assert_eq!(books[0].page_count, 424);
    assert_eq!(books[0].isbn, "978-85-359-0277-3");
}

#[tokio::test]
async fn test_request_shape() {
    let stub = GroqStub::spawn(200, chat_reply(CATALOG_JSON));
    let client = stub.client();

    let raw = client.fetch_raw("livros do Graciliano").await.unwrap();
    assert!(matches!(raw, RawCatalog::Json(_)));

    let request = stub.request();
    assert_eq!(request.authorization.as_deref(), Some("Bearer gsk_test_key"));
    assert_eq!(request.body["stream"], json!(false));
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][1]["content"], "livros do Graciliano");
    assert_eq!(
        request.body["compound_custom"]["tools"]["enabled_tools"],
        json!(["web_search"])
    );
}

#[tokio::test]
async fn test_error_status_is_source_unavailable() {
    let stub = GroqStub::spawn(500, "upstream exploded");
    let client = stub.client();

    match client.fetch_raw("qualquer").await {
        Err(Error::SourceUnavailable(msg)) => {
            assert!(msg.contains("500"), "message: {}", msg);
            assert!(msg.contains("upstream exploded"), "message: {}", msg);
        }
        other => panic!("Expected SourceUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_body_is_source_unavailable() {
    let stub = GroqStub::spawn(200, "<html>not json</html>");
    let client = stub.client();

    let result = client.fetch_raw("qualquer").await;
    assert!(matches!(result, Err(Error::SourceUnavailable(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_no_choices_is_source_unavailable() {
    let stub = GroqStub::spawn(200, json!({ "choices": [] }).to_string());
    let client = stub.client();

    let result = client.search_books("qualquer").await;
    assert!(matches!(result, Err(Error::SourceUnavailable(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_unreachable_server_is_source_unavailable() {
    // Bind then drop a listener to get a port with nothing behind it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = GroqClient::new(SourceConfig {
        api_url: format!("http://127.0.0.1:{}/openai/v1/chat/completions", port),
        api_key: Some("gsk_test_key".to_string()),
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap();

    let result = client.fetch_raw("qualquer").await;
    assert!(matches!(result, Err(Error::SourceUnavailable(_))), "got {:?}", result);
}

#[test]
fn test_missing_key_is_config_error() {
    let result = GroqClient::new(SourceConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));
}
