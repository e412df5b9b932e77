pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager, OpenedStore};
pub use memory::MemoryUserRepository;
pub use repository::{PgUserRepository, UserRepository};
