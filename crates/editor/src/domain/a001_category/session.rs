use contracts::domain::a001_category::{Category, Violation};
use std::collections::VecDeque;
use thiserror::Error;

use super::gateway::{CategoryGateway, GatewayError};
use crate::shared::config::EditorConfig;

/// Результат успешного сохранения
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Категория создана, сервер выдал ID
    Created { id: String },
    /// Сохранённая категория заменена
    Updated { message: String },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Category has {} validation error(s)", .0.len())]
    Invalid(Vec<Violation>),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Сессия редактирования категории
///
/// Хранит редактируемый снимок, последний сохранённый снимок и историю
/// undo/redo. Снимки разделяют неизменённые узлы, поэтому история дешёвая.
#[derive(Debug, Clone)]
pub struct CategoryEditorSession {
    category_id: Option<String>,
    current: Category,
    persisted: Category,
    undo: VecDeque<Category>,
    redo: Vec<Category>,
    history_limit: usize,
}

impl CategoryEditorSession {
    /// Новая пустая категория без ID
    pub fn new(history_limit: usize) -> Self {
        Self {
            category_id: None,
            current: Category::new(),
            persisted: Category::new(),
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.history_limit)
    }

    /// Сессия над готовой категорией без ID (например, прочитанной из файла)
    ///
    /// Категория считается исходной: история пуста, несохранённых изменений нет.
    pub fn with_category(history_limit: usize, category: Category) -> Self {
        Self {
            persisted: category.clone(),
            current: category,
            ..Self::new(history_limit)
        }
    }

    /// Загрузить категорию; при ошибке состояние сессии не меняется
    pub async fn load(&mut self, gateway: &dyn CategoryGateway, id: &str) -> Result<(), GatewayError> {
        let category = gateway.fetch_category(id).await?;
        tracing::debug!("Loaded category {} ({} steps)", id, category.steps.len());

        self.category_id = Some(id.to_string());
        self.persisted = category.clone();
        self.current = category;
        self.undo.clear();
        self.redo.clear();
        Ok(())
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub fn category(&self) -> &Category {
        &self.current
    }

    /// Применить операцию редактирования
    ///
    /// Возвращает `false`, если операция ничего не изменила (в историю
    /// ничего не пишется).
    pub fn apply(&mut self, op: impl FnOnce(&Category) -> Category) -> bool {
        let next = op(&self.current);
        if next == self.current {
            return false;
        }

        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push_back(previous);
        while self.undo.len() > self.history_limit {
            self.undo.pop_front();
        }
        self.redo.clear();
        tracing::debug!("Edit applied, undo depth {}", self.undo.len());
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo.push_back(current);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Есть несохранённые изменения
    pub fn is_dirty(&self) -> bool {
        self.current != self.persisted
    }

    pub fn violations(&self) -> Vec<Violation> {
        self.current.violations()
    }

    /// Проверить и сохранить категорию
    ///
    /// Без ID категория создаётся, иначе заменяется целиком. Схема с
    /// нарушениями на сервер не отправляется. При любой ошибке снимок, ID и
    /// история остаются прежними.
    pub async fn save(&mut self, gateway: &dyn CategoryGateway) -> Result<SaveOutcome, SaveError> {
        if let Err(violations) = self.current.validate() {
            tracing::warn!("Save refused: {} validation error(s)", violations.len());
            return Err(SaveError::Invalid(violations));
        }

        let snapshot = self.current.clone();
        let outcome = match self.category_id.clone() {
            Some(id) => {
                let receipt = gateway.save_category(&id, &snapshot).await?;
                SaveOutcome::Updated {
                    message: receipt.message,
                }
            }
            None => {
                let id = gateway.create_category(&snapshot).await?;
                self.category_id = Some(id.clone());
                SaveOutcome::Created { id }
            }
        };

        tracing::info!("Category saved: {:?}", outcome);
        self.persisted = snapshot;
        Ok(outcome)
    }
}

impl Default for CategoryEditorSession {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
