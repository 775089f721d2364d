pub mod bookmarkdb;
pub mod chatdb;
pub mod db;
pub mod propertydb;
pub mod userdb;

pub use db::DBClient;
