pub mod error;
pub mod memory;
pub mod postgres;
pub mod profile_repo;

pub use error::{RepoError, RepoResult};
pub use memory::MemoryProfileRepo;
pub use postgres::PgProfileRepo;
pub use profile_repo::{Address, NewAddress, Profile, ProfileRepo, ProfileUpdate};
