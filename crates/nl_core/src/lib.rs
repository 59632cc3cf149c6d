pub mod analytics;
pub mod clock;
pub mod db;
pub mod domain;
pub mod error;
pub mod history;
pub mod preferences;
pub mod session;
pub mod store;
