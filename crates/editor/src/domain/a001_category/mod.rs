//! Категории: хранилище и сессия редактирования схемы формы

pub mod gateway;
pub mod http_gateway;
pub mod memory_gateway;
pub mod session;

pub use gateway::{CategoryGateway, GatewayError, SaveReceipt};
pub use http_gateway::HttpCategoryGateway;
pub use memory_gateway::InMemoryCategoryGateway;
pub use session::{CategoryEditorSession, SaveError, SaveOutcome};
