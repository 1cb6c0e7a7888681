use std::sync::Arc;

use crate::repos::ProfileRepo;

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileRepo>,
}

impl AppState {
    pub fn new(profiles: Arc<dyn ProfileRepo>) -> Self {
        Self { profiles }
    }
}
