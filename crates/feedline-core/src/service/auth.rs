//! Signup and login.

use std::sync::Arc;

use bson::oid::ObjectId;
use validator::Validate;

use crate::DomainError;
use crate::domain::User;
use crate::ports::{PasswordService, TokenService, UserRepository};

/// Validated signup input.
#[derive(Debug, Validate)]
pub struct Signup {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
}

/// A successful login: the bearer token and the user it identifies.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: ObjectId,
}

/// Account creation and credential checks.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Register a new account. Duplicate emails fail validation and create
    /// no record.
    pub async fn signup(&self, input: Signup) -> Result<User, DomainError> {
        input.validate()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Validation(vec![
                "email: already registered".to_string(),
            ]));
        }

        let password_hash = self.passwords.hash(&input.password)?;
        let user = User::new(input.email, password_hash, input.name);
        self.users.insert(&user).await?;

        tracing::debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Exchange credentials for a bearer token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(DomainError::Unauthenticated);
        }

        let token = self.tokens.generate_token(user.id, &user.email)?;
        Ok(Session {
            token,
            user_id: user.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::{MemoryUsers, PlainPasswords, StaticTokens};

    fn service() -> (AuthService, Arc<MemoryUsers>) {
        let users = Arc::new(MemoryUsers::default());
        let service = AuthService::new(users.clone(), Arc::new(PlainPasswords), Arc::new(StaticTokens));
        (service, users)
    }

    fn signup_input() -> Signup {
        Signup {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
            name: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn signup_then_login_returns_same_user_id() {
        let (service, _) = service();

        let user = service
            .signup(Signup {
                name: "Anna".to_string(),
                ..signup_input()
            })
            .await
            .unwrap();

        let session = service.login("a@b.com", "secret1").await.unwrap();
        assert_eq!(session.user_id, user.id);

        let claims = StaticTokens.validate_token(&session.token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "a@b.com");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email_and_creates_nothing() {
        let (service, users) = service();

        service
            .signup(Signup {
                name: "First".to_string(),
                ..signup_input()
            })
            .await
            .unwrap();

        let err = service
            .signup(Signup {
                name: "Second".to_string(),
                ..signup_input()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(users.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn signup_rejects_invalid_input() {
        let (service, users) = service();

        let err = service
            .signup(Signup {
                email: "nope".to_string(),
                password: "abc".to_string(),
                name: "X".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            DomainError::Validation(messages) => assert_eq!(messages.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(users.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthenticated() {
        let (service, _) = service();
        service
            .signup(Signup {
                name: "Anna".to_string(),
                ..signup_input()
            })
            .await
            .unwrap();

        let err = service.login("a@b.com", "wrong-password").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_unauthenticated() {
        let (service, _) = service();

        let err = service.login("ghost@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let (service, users) = service();
        service
            .signup(Signup {
                name: "Anna".to_string(),
                ..signup_input()
            })
            .await
            .unwrap();

        let stored = users.0.lock().unwrap()[0].password_hash.clone();
        assert_ne!(stored, "secret1");
    }
}
