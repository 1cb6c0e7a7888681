use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::account_repo::{Account, AccountRepo, NewAccount};
use crate::repos::error::{RepoError, RepoResult};

/// Process-local store used when no DATABASE_URL is configured.
#[derive(Debug, Default)]
pub struct MemoryAccountRepo {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepo for MemoryAccountRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, new: NewAccount) -> RepoResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == new.email) {
            return Err(RepoError::Conflict);
        }

        let account = Account {
            id: accounts.len() as i64 + 1,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity::Role;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_emails_unique() {
        let repo = MemoryAccountRepo::new();
        let a = repo.create(new_account("a@example.com")).await.unwrap();
        let b = repo.create(new_account("b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let dup = repo.create(new_account("a@example.com")).await;
        assert!(matches!(dup, Err(RepoError::Conflict)));

        assert_eq!(
            repo.find_by_email("b@example.com").await.unwrap().map(|a| a.id),
            Some(2)
        );
        assert!(repo.find_by_id(3).await.unwrap().is_none());
    }
}
