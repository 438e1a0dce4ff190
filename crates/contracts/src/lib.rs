//! Общие типы и чистая логика редактора категорий.
//!
//! Крейт не выполняет ввода-вывода: его используют и клиент редактора,
//! и любые другие потребители схемы категории.

pub mod domain;
