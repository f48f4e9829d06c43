pub mod config_service;
pub mod json_order_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_order_repository::JsonOrderRepository;
pub use crate::paths::OrderdeskPaths;
