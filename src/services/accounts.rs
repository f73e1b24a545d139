use crate::{
    auth::{AccessToken, AuthService},
    entities::{user, User, UserModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Account service: registration and credential verification.
///
/// Duplicate usernames and emails are rejected by explicit lookup with
/// distinct messages rather than surfaced as constraint violations.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            auth,
        }
    }

    /// Registers a new user.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserModel, ServiceError> {
        if input.password != input.password_confirm {
            return Err(ServiceError::ValidationError(
                "Passwords do not match.".to_string(),
            ));
        }

        let username_taken = User::find()
            .filter(user::Column::Username.eq(&input.username))
            .one(&*self.db)
            .await?
            .is_some();
        if username_taken {
            return Err(ServiceError::ValidationError(
                "Username already exists.".to_string(),
            ));
        }

        let email_taken = User::find()
            .filter(user::Column::Email.eq(&input.email))
            .one(&*self.db)
            .await?
            .is_some();
        if email_taken {
            return Err(ServiceError::ValidationError(
                "Email already exists.".to_string(),
            ));
        }

        let password_hash = self
            .auth
            .hash_password(&input.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let user_id = Uuid::new_v4();
        let account = user::ActiveModel {
            id: Set(user_id),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            created_at: Set(Utc::now()),
        };
        let account = account.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user_id))
            .await;

        info!("User registered: {}", user_id);
        Ok(account)
    }

    /// Verifies credentials and issues an access token.
    ///
    /// Unknown usernames and wrong passwords produce the same message so
    /// the response does not reveal which part failed.
    #[instrument(skip(self, credentials))]
    pub async fn login(
        &self,
        credentials: LoginInput,
    ) -> Result<(UserModel, AccessToken), ServiceError> {
        let account = User::find()
            .filter(user::Column::Username.eq(&credentials.username))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("Invalid username or password".to_string()))?;

        let valid = self
            .auth
            .verify_password(&credentials.password, &account.password_hash)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        if !valid {
            return Err(ServiceError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self
            .auth
            .generate_token(&account)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        Ok((account, token))
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserModel, ServiceError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }
}

/// Input for registration
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
}

/// Input for login
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}
