pub mod error;
pub mod reader;
pub mod source;
pub mod sqlite;

pub use error::CacheError;
pub use reader::CacheReader;
pub use source::{CacheSource, MarketDataSource, StaticSource};
pub use sqlite::SqliteReader;
