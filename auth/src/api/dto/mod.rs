pub mod credentials;
pub mod responses;
