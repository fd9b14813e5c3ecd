pub mod memory;
pub mod model;
pub mod repo;

pub use memory::InMemoryAccountStore;
pub use model::{Account, Role};
pub use repo::{AccountStore, PgAccountStore, StoreError};
