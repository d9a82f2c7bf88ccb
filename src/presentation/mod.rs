// Presentation layer - JSON HTTP surface driving the clone workflow
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod routes;
