pub mod pool;
pub mod repository;

pub use pool::DbPool;
pub use repository::Repository;
