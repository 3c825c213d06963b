pub mod catalog_service;
pub mod file_service;
pub mod file_types;
pub mod filesystem_client;
pub mod notification_service;
pub mod upload_service;
