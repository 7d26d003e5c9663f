use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Device owner and alert recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Repository input for creating a user (password already hashed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRepoInput {
    pub email: String,
    pub password_hash: String,
}

/// Input for getting a user by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserInput {
    pub user_id: i64,
}

/// Input for getting a user by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserByEmailInput {
    pub email: String,
}

/// Input for paging through users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListUsersRepoInput {
    pub offset: i64,
    pub limit: i64,
}

/// Repository trait for user storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; fails with `UserAlreadyExists` on a duplicate email
    async fn create_user(&self, input: CreateUserRepoInput) -> DomainResult<User>;

    /// Get a user by ID
    async fn get_user(&self, input: GetUserInput) -> DomainResult<Option<User>>;

    /// Get a user by email
    async fn get_user_by_email(&self, input: GetUserByEmailInput) -> DomainResult<Option<User>>;

    /// List users ordered by ID
    async fn list_users(&self, input: ListUsersRepoInput) -> DomainResult<Vec<User>>;
}

/// Hashes plaintext passwords before they reach storage
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> DomainResult<String>;
}
