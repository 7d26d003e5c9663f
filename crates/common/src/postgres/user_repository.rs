use crate::domain::{
    CreateUserRepoInput, DomainError, DomainResult, GetUserByEmailInput, GetUserInput,
    ListUsersRepoInput, User, UserRepository,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::{debug, instrument};

/// User row for PostgreSQL storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
}

impl From<&Row> for UserRow {
    fn from(row: &Row) -> Self {
        UserRow {
            id: row.get(0),
            email: row.get(1),
            hashed_password: row.get(2),
            is_active: row.get(3),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.hashed_password,
            is_active: row.is_active,
        }
    }
}

/// PostgreSQL implementation of UserRepository trait
#[derive(Clone)]
pub struct PostgresUserRepository {
    client: PostgresClient,
}

impl PostgresUserRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create_user(&self, input: CreateUserRepoInput) -> DomainResult<User> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let result = conn
            .query_one(
                "INSERT INTO users (email, hashed_password)
                 VALUES ($1, $2)
                 RETURNING id, email, hashed_password, is_active",
                &[&input.email, &input.password_hash],
            )
            .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                if let Some(db_err) = e.as_db_error() {
                    // PostgreSQL error code 23505 is unique_violation
                    if db_err.code().code() == "23505" {
                        return Err(DomainError::UserAlreadyExists(input.email));
                    }
                }
                return Err(DomainError::RepositoryError(e.into()));
            }
        };

        let user: User = UserRow::from(&row).into();
        debug!(user_id = user.id, "user created in database");

        Ok(user)
    }

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    async fn get_user(&self, input: GetUserInput) -> DomainResult<Option<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT id, email, hashed_password, is_active FROM users WHERE id = $1",
                &[&input.user_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| UserRow::from(&row).into()))
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn get_user_by_email(&self, input: GetUserByEmailInput) -> DomainResult<Option<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT id, email, hashed_password, is_active FROM users WHERE email = $1",
                &[&input.email],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| UserRow::from(&row).into()))
    }

    #[instrument(skip(self, input), fields(offset = input.offset, limit = input.limit))]
    async fn list_users(&self, input: ListUsersRepoInput) -> DomainResult<Vec<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT id, email, hashed_password, is_active FROM users
                 ORDER BY id OFFSET $1 LIMIT $2",
                &[&input.offset, &input.limit],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let users: Vec<User> = rows.iter().map(|row| UserRow::from(row).into()).collect();
        debug!("found {} users", users.len());

        Ok(users)
    }
}
