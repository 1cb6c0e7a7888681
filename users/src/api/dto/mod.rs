pub mod address;
pub mod profile;
