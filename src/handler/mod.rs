pub mod agents;
pub mod chat;
pub mod favorites;
pub mod map;
pub mod properties;
pub mod users;
