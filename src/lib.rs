pub mod academic;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod error_log;
pub mod games;
pub mod messages;
pub mod missed;
pub mod query;
pub mod report;
pub mod status;
pub mod storage;
pub mod users;
pub mod validate;
