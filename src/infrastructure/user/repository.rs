//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{
    email_not_found, email_taken, user_not_found, NewUser, User, UserId, UserRepository,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
///
/// Both maps live behind one lock so the email uniqueness check and the
/// insert are a single atomic step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError> {
        let tables = self.tables.read().await;
        tables.users.get(&id).cloned().ok_or_else(|| user_not_found(id))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let tables = self.tables.read().await;

        tables
            .email_index
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or_else(|| email_not_found(email))
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.email_index.contains_key(user.email()) {
            return Err(email_taken(user.email()));
        }

        let id = UserId::new(tables.last_id + 1)
            .ok_or_else(|| DomainError::internal("user id sequence overflowed"))?;
        tables.last_id = id.value();

        let user = user.with_id(id);
        tables.email_index.insert(user.email().to_string(), id);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        let id = user.id();

        let old_email = match tables.users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => return Err(user_not_found(id)),
        };

        if old_email != user.email() {
            if tables.email_index.contains_key(user.email()) {
                return Err(email_taken(user.email()));
            }

            tables.email_index.remove(&old_email);
            tables.email_index.insert(user.email().to_string(), id);
        }

        tables.users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;

        match tables.users.remove(&id) {
            Some(user) => {
                tables.email_index.remove(user.email());
                Ok(())
            }
            None => Err(user_not_found(id)),
        }
    }

    async fn list(&self, limit: u32, offset: u64) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().await;

        let mut users: Vec<&User> = tables.users.values().collect();
        users.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);

        Ok(users
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::new(name, email).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("A", "a@example.com")).await.unwrap();
        let second = repo.create(new_user("B", "b@example.com")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("A", "a@example.com")).await.unwrap();

        let by_id = repo.get_by_id(user.id()).await.unwrap();
        assert_eq!(by_id, user);

        let by_email = repo.get_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email, user);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryUserRepository::new();

        let err = repo.get_by_id(UserId::new(9).unwrap()).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("A", "a@example.com")).await.unwrap();

        assert!(repo.get_by_email("A@example.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("A", "a@example.com")).await.unwrap();

        let err = repo.create(new_user("B", "a@example.com")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_reindexes_email() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("A", "a@example.com")).await.unwrap();

        user.set_email("z@example.com");
        repo.update(&user).await.unwrap();

        assert!(repo.get_by_email("a@example.com").await.unwrap_err().is_not_found());
        assert_eq!(repo.get_by_email("z@example.com").await.unwrap().id(), user.id());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("A", "a@example.com")).await.unwrap();
        let mut b = repo.create(new_user("B", "b@example.com")).await.unwrap();

        b.set_email("a@example.com");
        assert!(repo.update(&b).await.unwrap_err().is_conflict());

        let stored = repo.get_by_id(b.id()).await.unwrap();
        assert_eq!(stored.email(), "b@example.com");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let ghost = new_user("G", "g@example.com").with_id(UserId::new(42).unwrap());

        assert!(repo.update(&ghost).await.unwrap_err().is_not_found());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("A", "a@example.com")).await.unwrap();

        repo.delete(user.id()).await.unwrap();

        assert!(repo.get_by_id(user.id()).await.unwrap_err().is_not_found());
        assert!(repo.delete(user.id()).await.unwrap_err().is_not_found());

        // The email is free again after deletion
        repo.create(new_user("A2", "a@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("A", "a@example.com")).await.unwrap();
        repo.delete(first.id()).await.unwrap();

        let second = repo.create(new_user("B", "b@example.com")).await.unwrap();
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let repo = InMemoryUserRepository::new();

        for i in 0..5 {
            repo.create(new_user(&format!("U{i}"), &format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let all = repo.list(10, 0).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|u| u.id().value()).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);

        let page = repo.list(2, 1).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|u| u.id().value()).collect();
        assert_eq!(ids, vec![4, 3]);

        assert!(repo.list(10, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_email() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(new_user(&format!("U{i}"), "same@example.com")).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.len().await, 1);
    }
}
