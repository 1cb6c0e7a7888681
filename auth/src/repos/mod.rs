pub mod account_repo;
pub mod error;
pub mod memory;
pub mod postgres;

pub use account_repo::{Account, AccountRepo, NewAccount};
pub use error::{RepoError, RepoResult};
pub use memory::MemoryAccountRepo;
pub use postgres::PgAccountRepo;
