pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod functions;
pub mod identity;
pub mod locale;
pub mod managers;
pub mod metrics;
pub mod migrator;
pub mod policy;
pub mod reports;
pub mod search;
pub mod store;
pub mod telemetry;

pub use error::AppError;
pub use sea_orm;
pub use redis;
