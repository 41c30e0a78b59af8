//! Database repository layer

pub mod memory;
pub mod session_repo;
pub mod user_repo;

pub use memory::MemoryStore;
pub use session_repo::{SessionRepository, SessionStore};
pub use user_repo::{UserDirectory, UserRepository};
