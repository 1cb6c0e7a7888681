use std::sync::Arc;

use crate::repos::ListingRepo;

#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<dyn ListingRepo>,
}

impl AppState {
    pub fn new(listings: Arc<dyn ListingRepo>) -> Self {
        Self { listings }
    }
}
