//! Редактор схем категорий: доступ к API панели администратора,
//! сессия редактирования с историей, конфигурация и логирование.

pub mod domain;
pub mod shared;
