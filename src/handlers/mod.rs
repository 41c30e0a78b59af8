//! HTTP 处理器模块

pub mod auth;
pub mod extract;
pub mod health;

pub use extract::ValidJson;
