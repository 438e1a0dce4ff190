use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Идентификатор узла схемы (шаг, вопрос, вариант ответа, подкатегория)
///
/// Backend отдаёт идентификаторы и числами (в том числе дробными, вида
/// `Date.now() + Math.random()`), и строками. Форма, пришедшая с сервера,
/// сохраняется без изменений; новые узлы получают строковый UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(serde_json::Number),
    Text(String),
}

impl NodeId {
    /// Создать новый идентификатор (UUID v4)
    pub fn new_v4() -> Self {
        NodeId::Text(Uuid::new_v4().to_string())
    }

    /// Создать идентификатор, которого нет среди соседних узлов
    pub fn fresh_among<'a, I>(siblings: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeId> + Clone,
    {
        loop {
            let candidate = Self::new_v4();
            if !siblings.clone().into_iter().any(|id| *id == candidate) {
                return candidate;
            }
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            NodeId::Number(n) => n.to_string(),
            NodeId::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{}", n),
            NodeId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Number(value.into())
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Text(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Text(value)
    }
}
