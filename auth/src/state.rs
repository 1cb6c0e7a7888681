use std::sync::Arc;

use crate::services::account_service::AccountService;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(accounts: Arc<AccountService>) -> Self {
        Self { accounts }
    }
}
