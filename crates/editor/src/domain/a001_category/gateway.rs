use async_trait::async_trait;
use contracts::domain::a001_category::Category;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки обмена с хранилищем категорий
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Category not found: {0}")]
    NotFound(String),

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: HTTP {status}: {body}")]
    Unexpected { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Ответ сервера на успешное сохранение
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub message: String,
}

impl SaveReceipt {
    pub const DEFAULT_MESSAGE: &'static str = "Category saved";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Трейт для хранилища категорий
///
/// Сохранение всегда передаёт документ целиком: сервер заменяет его, а не
/// объединяет с сохранённым.
#[async_trait]
pub trait CategoryGateway: Send + Sync {
    /// Загрузить категорию по ID
    async fn fetch_category(&self, id: &str) -> Result<Category, GatewayError>;

    /// Заменить сохранённую категорию
    async fn save_category(&self, id: &str, category: &Category) -> Result<SaveReceipt, GatewayError>;

    /// Создать новую категорию, вернуть её ID
    async fn create_category(&self, category: &Category) -> Result<String, GatewayError>;
}
