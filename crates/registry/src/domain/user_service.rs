use crate::domain::PageRequest;
use common::domain::{
    CreateUserRepoInput, DomainError, DomainResult, GetUserByEmailInput, GetUserInput,
    ListUsersRepoInput, PasswordHasher, User, UserRepository,
};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Request to register a user
#[derive(Debug, Clone, Validate)]
pub struct RegisterUserRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// Domain service for user registration and lookup
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Register a new user with a hashed password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_user(&self, request: RegisterUserRequest) -> DomainResult<User> {
        common::garde::validate(&request)?;

        debug!(email = %request.email, "registering new user");

        let existing = self
            .user_repository
            .get_user_by_email(GetUserByEmailInput {
                email: request.email.clone(),
            })
            .await?;
        if existing.is_some() {
            return Err(DomainError::UserAlreadyExists(request.email));
        }

        let password_hash = self.password_hasher.hash_password(&request.password)?;

        let user = self
            .user_repository
            .create_user(CreateUserRepoInput {
                email: request.email,
                password_hash,
            })
            .await?;

        debug!(user_id = user.id, "user registered successfully");
        Ok(user)
    }

    /// Get user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64) -> DomainResult<User> {
        self.user_repository
            .get_user(GetUserInput { user_id })
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))
    }

    #[instrument(skip(self, page), fields(offset = page.offset, limit = page.limit()))]
    pub async fn list_users(&self, page: PageRequest) -> DomainResult<Vec<User>> {
        common::garde::validate(&page)?;

        self.user_repository
            .list_users(ListUsersRepoInput {
                offset: page.offset,
                limit: page.limit(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{MockPasswordHasher, MockUserRepository};

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
            password_hash: "hashed-password".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_register_user_success() {
        let mut mock_repo = MockUserRepository::new();
        let mut mock_hasher = MockPasswordHasher::new();

        mock_repo
            .expect_get_user_by_email()
            .withf(|input: &GetUserByEmailInput| input.email == "a@b.com")
            .times(1)
            .return_once(|_| Ok(None));

        mock_hasher
            .expect_hash_password()
            .withf(|password: &str| password == "hunter22")
            .times(1)
            .return_once(|_| Ok("hashed-password".to_string()));

        mock_repo
            .expect_create_user()
            .withf(|input: &CreateUserRepoInput| {
                input.email == "a@b.com" && input.password_hash == "hashed-password"
            })
            .times(1)
            .return_once(|input| Ok(user(1, &input.email)));

        let service = UserService::new(Arc::new(mock_repo), Arc::new(mock_hasher));
        let created = service
            .register_user(RegisterUserRequest {
                email: "a@b.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_register_user_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        let mut mock_hasher = MockPasswordHasher::new();

        mock_repo
            .expect_get_user_by_email()
            .return_once(|_| Ok(Some(user(1, "a@b.com"))));
        mock_repo.expect_create_user().times(0);
        mock_hasher.expect_hash_password().times(0);

        let service = UserService::new(Arc::new(mock_repo), Arc::new(mock_hasher));
        let result = service
            .register_user(RegisterUserRequest {
                email: "a@b.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::UserAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_user_invalid_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_user_by_email().times(0);

        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockPasswordHasher::new()));
        let result = service
            .register_user(RegisterUserRequest {
                email: "not-an-email".to_string(),
                password: "hunter22".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_user_empty_password() {
        let service = UserService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPasswordHasher::new()),
        );
        let result = service
            .register_user(RegisterUserRequest {
                email: "a@b.com".to_string(),
                password: String::new(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::ValidationError(ref m)) if m.contains("password")));
    }

    #[tokio::test]
    async fn test_register_user_hashing_failure() {
        let mut mock_repo = MockUserRepository::new();
        let mut mock_hasher = MockPasswordHasher::new();

        mock_repo.expect_get_user_by_email().return_once(|_| Ok(None));
        mock_hasher
            .expect_hash_password()
            .return_once(|_| Err(DomainError::PasswordHashingError("bad salt".to_string())));
        mock_repo.expect_create_user().times(0);

        let service = UserService::new(Arc::new(mock_repo), Arc::new(mock_hasher));
        let result = service
            .register_user(RegisterUserRequest {
                email: "a@b.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::PasswordHashingError(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_user()
            .withf(|input: &GetUserInput| input.user_id == 42)
            .return_once(|_| Ok(None));

        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockPasswordHasher::new()));
        let result = service.get_user(42).await;

        assert!(matches!(result, Err(DomainError::UserNotFound(ref id)) if id == "42"));
    }

    #[tokio::test]
    async fn test_list_users_uses_default_limit() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_list_users()
            .withf(|input: &ListUsersRepoInput| input.offset == 0 && input.limit == 100)
            .times(1)
            .return_once(|_| Ok(vec![user(1, "a@b.com"), user(2, "c@d.com")]));

        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockPasswordHasher::new()));
        let users = service.list_users(PageRequest::default()).await.unwrap();

        assert_eq!(users.len(), 2);
    }
}
