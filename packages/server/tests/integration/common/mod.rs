use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use common::config::StorageConfig;
use common::storage::{BlobStore, MemoryObjectStore, ObjectStore};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use journal_server::analysis::{AnalysisError, Sentiment, SentimentAnalyzer};
use journal_server::config::{
    AnalysisConfig, AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, UploadConfig,
};
use journal_server::journal::{JournalLifecycle, MemoryJournalRepository};
use journal_server::state::AppState;
use journal_server::utils::jwt;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const PUBLIC_BASE: &str = "https://storage.example.test";
pub const BUCKET: &str = "journal-media";

pub mod routes {
    pub const JOURNALS: &str = "/api/v1/journals";
    pub const MOOD_CALENDAR: &str = "/api/v1/journals/mood-calendar";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn journal(id: &str) -> String {
        format!("/api/v1/journals/{id}")
    }
}

/// Always reports the same mood.
struct CalmAnalyzer;

#[async_trait]
impl SentimentAnalyzer for CalmAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Option<Sentiment>, AnalysisError> {
        Ok(Some(Sentiment {
            emotion: "Calm".into(),
            expression: "😌".into(),
            confidence: 0.8,
        }))
    }
}

/// A running test server backed by in-memory stores.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryObjectStore>,
    pub repo: Arc<MemoryJournalRepository>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// `data.id` of a journal response.
    pub fn id(&self) -> String {
        self.body["data"]["id"]
            .as_str()
            .unwrap_or_else(|| panic!("Response has no data.id: {}", self.text))
            .to_string()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_max_file_size(50 * 1024 * 1024).await
    }

    pub async fn spawn_with_max_file_size(max_file_size: u64) -> Self {
        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            storage: StorageConfig::default(),
            analysis: AnalysisConfig {
                api_key: None,
                model: "test".to_string(),
                endpoint: "http://127.0.0.1:9".to_string(),
                timeout_secs: 1,
                min_text_len: 3,
            },
            upload: UploadConfig { max_file_size },
        };

        let store = Arc::new(MemoryObjectStore::new(BUCKET));
        let repo = Arc::new(MemoryJournalRepository::new());
        let blobs = BlobStore::new(store.clone(), PUBLIC_BASE);
        let lifecycle = JournalLifecycle::new(repo.clone(), Arc::new(blobs), Arc::new(CalmAnalyzer));

        let app = journal_server::build_router(AppState::new(app_config, lifecycle));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
            repo,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        jwt::sign(user_id, JWT_SECRET, chrono::Duration::hours(1)).expect("Failed to sign token")
    }

    /// Object keys currently stored under `prefix`.
    pub async fn blobs_under(&self, prefix: &str) -> Vec<String> {
        self.store.list(prefix).await.expect("Failed to list blobs")
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: Form, token: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path)).multipart(form);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let res = req.send().await.expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    pub async fn put_form(&self, path: &str, form: Form, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn patch_json(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Create a journal with the given media and return its id.
    pub async fn create_journal(&self, token: &str, title: &str, form: Form) -> String {
        let res = self
            .post_form(routes::JOURNALS, form.text("title", title.to_string()), Some(token))
            .await;
        assert_eq!(res.status, 201, "create_journal failed: {}", res.text);
        res.id()
    }
}

pub fn file_part(name: &str, mime: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .expect("Failed to set MIME type")
}

pub fn video_part() -> Part {
    file_part("clip.webm", "video/webm", b"\x1a\x45\xdf\xa3webm")
}

pub fn photo_part(name: &str) -> Part {
    file_part(name, "image/jpeg", b"\xff\xd8\xff\xe0jpeg")
}
