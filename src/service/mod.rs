pub mod aggregation;
pub mod blob_storage;
pub mod bookmark_service;
pub mod credentials;
pub mod error;
pub mod listing_service;
pub mod purpose;
pub mod visibility;
