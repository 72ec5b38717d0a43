pub mod export;
pub mod loader;
pub mod record;
pub mod schema;
pub mod table;
