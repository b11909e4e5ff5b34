pub mod advisory;
pub mod alerts;
pub mod center;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod view;
