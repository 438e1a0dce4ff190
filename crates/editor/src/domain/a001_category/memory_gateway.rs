use async_trait::async_trait;
use contracts::domain::a001_category::Category;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::gateway::{CategoryGateway, GatewayError, SaveReceipt};

/// Хранилище категорий в памяти (тесты и офлайн-проверка)
///
/// Сохранение проверяет схему так же, как сервер: при нарушениях возвращается
/// `GatewayError::Validation` с текстами нарушений.
pub struct InMemoryCategoryGateway {
    store: Mutex<HashMap<String, Category>>,
    offline: AtomicBool,
    next_id: AtomicU64,
}

impl InMemoryCategoryGateway {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Положить категорию в хранилище под заданным ID
    pub fn with_category(mut self, id: impl Into<String>, category: Category) -> Self {
        self.store.get_mut().insert(id.into(), category);
        self
    }

    /// В офлайн-режиме любой запрос завершается `GatewayError::Network`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn stored(&self, id: &str) -> Option<Category> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    fn ensure_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("Gateway is offline".to_string()));
        }
        Ok(())
    }

    fn check(category: &Category) -> Result<(), GatewayError> {
        category.validate().map_err(|violations| {
            GatewayError::Validation(violations.iter().map(|v| v.to_string()).collect())
        })
    }
}

impl Default for InMemoryCategoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryGateway for InMemoryCategoryGateway {
    async fn fetch_category(&self, id: &str) -> Result<Category, GatewayError> {
        self.ensure_online()?;
        self.store
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn save_category(&self, id: &str, category: &Category) -> Result<SaveReceipt, GatewayError> {
        self.ensure_online()?;
        Self::check(category)?;

        let mut store = self.store.lock().await;
        match store.get_mut(id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(SaveReceipt::new("Category updated successfully"))
            }
            None => Err(GatewayError::NotFound(id.to_string())),
        }
    }

    async fn create_category(&self, category: &Category) -> Result<String, GatewayError> {
        self.ensure_online()?;
        Self::check(category)?;

        let id = format!("cat-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.store.lock().await.insert(id.clone(), category.clone());
        Ok(id)
    }
}
