// Application layer - Clone workflow use cases
pub mod bundle_extractor;
pub mod clone_service;
pub mod clone_session;
pub mod config_editor;
pub mod dashboard_service;
pub mod dataset_resolver;
pub mod paging;
pub mod platform_api;
