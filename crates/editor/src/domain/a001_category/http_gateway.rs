use async_trait::async_trait;
use contracts::domain::a001_category::Category;
use std::time::Duration;

use super::gateway::{CategoryGateway, GatewayError, SaveReceipt};
use crate::shared::api_utils::{api_url, category_path};
use crate::shared::config::ApiConfig;

/// Клиент REST API панели администратора для категорий
pub struct HttpCategoryGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCategoryGateway {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn category_url(&self, id: &str) -> String {
        api_url(&self.base_url, &category_path(id))
    }

    fn collection_url(&self) -> String {
        api_url(&self.base_url, "/api/category")
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Отправить запрос и вернуть тело успешного ответа
    async fn send(&self, request: reqwest::RequestBuilder, id: &str) -> Result<String, GatewayError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Category request failed: {}", e);
            GatewayError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error = classify_failure(status.as_u16(), id, &body);
            tracing::warn!("Category request rejected: {}", error);
            return Err(error);
        }

        Ok(body)
    }
}

#[async_trait]
impl CategoryGateway for HttpCategoryGateway {
    async fn fetch_category(&self, id: &str) -> Result<Category, GatewayError> {
        let url = self.category_url(id);
        tracing::info!("GET {}", url);

        let body = self.send(self.request(reqwest::Method::GET, &url), id).await?;
        Category::from_json(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn save_category(&self, id: &str, category: &Category) -> Result<SaveReceipt, GatewayError> {
        let url = self.category_url(id);
        tracing::info!("PUT {} ({} steps)", url, category.steps.len());

        let request = self.request(reqwest::Method::PUT, &url).json(category);
        let body = self.send(request, id).await?;
        Ok(parse_save_receipt(&body))
    }

    async fn create_category(&self, category: &Category) -> Result<String, GatewayError> {
        let url = self.collection_url();
        tracing::info!("POST {} ({} steps)", url, category.steps.len());

        let request = self.request(reqwest::Method::POST, &url).json(category);
        let body = self.send(request, "").await?;
        parse_created_id(&body)
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// Сопоставить неуспешный HTTP статус с ошибкой шлюза
pub(crate) fn classify_failure(status: u16, id: &str, body: &str) -> GatewayError {
    match status {
        404 => GatewayError::NotFound(id.to_string()),
        400 | 422 => GatewayError::Validation(rejection_messages(body)),
        _ => GatewayError::Unexpected {
            status,
            body: body.to_string(),
        },
    }
}

/// Сообщения серверной валидации: `errors`, `message` или тело как есть
pub(crate) fn rejection_messages(body: &str) -> Vec<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(errors) = value.get("errors").and_then(|e| e.as_array()) {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect();
            if !messages.is_empty() {
                return messages;
            }
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return vec![message.to_string()];
        }
    }

    let text = body.trim();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}

fn parse_save_receipt(body: &str) -> SaveReceipt {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .map(SaveReceipt::new)
        .unwrap_or_else(|| SaveReceipt::new(SaveReceipt::DEFAULT_MESSAGE))
}

fn parse_created_id(body: &str) -> Result<String, GatewayError> {
    let parsed: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    match &parsed["id"] {
        serde_json::Value::String(s) if !s.is_empty() => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(GatewayError::Decode("No id in response".to_string())),
    }
}
