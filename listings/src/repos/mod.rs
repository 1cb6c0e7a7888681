pub mod error;
pub mod listing_repo;
pub mod memory;
pub mod postgres;

pub use error::{RepoError, RepoResult};
pub use listing_repo::{Listing, ListingFilter, ListingRepo, ListingStatus, NewListing};
pub use memory::MemoryListingRepo;
pub use postgres::PgListingRepo;
