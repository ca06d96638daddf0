//! Organizer accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use eventz_common::{AppError, AppResult, IdGenerator};
use eventz_db::{entities::organizer, repositories::OrganizerRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::{EmailService, TokenService, templates::EmailTemplate};

/// Reply to every forgot-password request, whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Input for organizer signup.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrganizerInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 4, max = 128))]
    pub password: String,
}

/// Input for organizer login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Profile fields an organizer may change.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(url)]
    pub photo_url: Option<String>,
}

/// Input for changing a known password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 4, max = 128))]
    pub new_password: String,
}

/// Input for requesting a reset link.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordInput {
    #[validate(email)]
    pub email: String,
}

/// Input for completing a reset.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordInput {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 4, max = 128))]
    pub new_password: String,
}

/// Access token plus the organizer it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub organizer: organizer::Model,
}

/// Organizer service for business logic.
#[derive(Clone)]
pub struct OrganizerService {
    organizer_repo: OrganizerRepository,
    tokens: TokenService,
    email: EmailService,
    id_gen: IdGenerator,
    frontend_url: String,
}

impl OrganizerService {
    /// Create a new organizer service.
    #[must_use]
    pub fn new(
        organizer_repo: OrganizerRepository,
        tokens: TokenService,
        email: EmailService,
        frontend_url: &str,
    ) -> Self {
        Self {
            organizer_repo,
            tokens,
            email,
            id_gen: IdGenerator::new(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sign up and log in.
    pub async fn register(&self, input: RegisterOrganizerInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.organizer_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let model = organizer::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            password_hash: Set(hash_password(&input.password)?),
            name: Set(input.name.trim().to_string()),
            role: Set(organizer::ROLE_ORGANIZER.to_string()),
            photo_url: Set(None),
            password_reset_token: Set(None),
            password_reset_expires: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let organizer = self.organizer_repo.create(model).await?;
        info!(organizer_id = %organizer.id, "Organizer registered");

        self.session(organizer)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let organizer = self
            .organizer_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&input.password, &organizer.password_hash)? {
            return Err(invalid());
        }

        self.session(organizer)
    }

    /// Resolve a bearer token to a live organizer.
    pub async fn authenticate(&self, token: &str) -> AppResult<organizer::Model> {
        let claims = self.tokens.verify(token)?;
        self.organizer_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
    }

    pub async fn get_profile(&self, organizer_id: &str) -> AppResult<organizer::Model> {
        self.organizer_repo.get_by_id(organizer_id).await
    }

    pub async fn update_profile(
        &self,
        organizer_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<organizer::Model> {
        input.validate()?;

        let organizer = self.organizer_repo.get_by_id(organizer_id).await?;
        let mut active: organizer::ActiveModel = organizer.into();

        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }

        if let Some(email) = input.email {
            let email = email.trim().to_lowercase();
            if self
                .organizer_repo
                .email_taken_by_other(&email, organizer_id)
                .await?
            {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
            active.email = Set(email);
        }

        if let Some(photo_url) = input.photo_url {
            active.photo_url = Set(Some(photo_url));
        }

        active.updated_at = Set(Some(Utc::now().into()));
        self.organizer_repo.update(active).await
    }

    pub async fn change_password(
        &self,
        organizer_id: &str,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        input.validate()?;

        let organizer = self.organizer_repo.get_by_id(organizer_id).await?;
        if !verify_password(&input.current_password, &organizer.password_hash)? {
            return Err(AppError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let email = organizer.email.clone();
        let name = organizer.name.clone();

        let mut active: organizer::ActiveModel = organizer.into();
        active.password_hash = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Some(Utc::now().into()));
        self.organizer_repo.update(active).await?;

        if let Err(e) = self
            .email
            .send_template(&email, &EmailTemplate::PasswordChanged { name: &name }, Vec::new())
            .await
        {
            warn!(error = %e, organizer_id = %organizer_id, "Failed to send password change notice");
        }

        Ok(())
    }

    /// Start a reset. The reply never reveals whether the account exists.
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> AppResult<&'static str> {
        input.validate()?;

        let Some(organizer) = self.organizer_repo.find_by_email(input.email.trim()).await? else {
            return Ok(FORGOT_PASSWORD_MESSAGE);
        };

        let token = self.id_gen.generate_token();
        let email = organizer.email.clone();
        let name = organizer.name.clone();

        let mut active: organizer::ActiveModel = organizer.into();
        active.password_reset_token = Set(Some(token.clone()));
        active.password_reset_expires =
            Set(Some((Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS)).into()));
        self.organizer_repo.update(active).await?;

        let reset_url = format!(
            "{}/organizer/reset-password?token={token}",
            self.frontend_url
        );
        if let Err(e) = self
            .email
            .send_template(
                &email,
                &EmailTemplate::PasswordReset {
                    name: &name,
                    reset_url: &reset_url,
                },
                Vec::new(),
            )
            .await
        {
            warn!(error = %e, "Failed to send password reset email");
        }

        Ok(FORGOT_PASSWORD_MESSAGE)
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> AppResult<()> {
        input.validate()?;

        let invalid = || AppError::BadRequest("Invalid or expired reset token".to_string());

        let organizer = self
            .organizer_repo
            .find_by_reset_token(&input.token)
            .await?
            .ok_or_else(invalid)?;

        let still_valid = organizer
            .password_reset_expires
            .is_some_and(|expires| expires > Utc::now());
        if !still_valid {
            return Err(invalid());
        }

        let email = organizer.email.clone();
        let name = organizer.name.clone();

        let mut active: organizer::ActiveModel = organizer.into();
        active.password_hash = Set(hash_password(&input.new_password)?);
        active.password_reset_token = Set(None);
        active.password_reset_expires = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        let organizer = self.organizer_repo.update(active).await?;
        info!(organizer_id = %organizer.id, "Password reset");

        if let Err(e) = self
            .email
            .send_template(&email, &EmailTemplate::PasswordUpdated { name: &name }, Vec::new())
            .await
        {
            warn!(error = %e, "Failed to send password updated email");
        }

        Ok(())
    }

    /// Delete the account and, by cascade, its events.
    pub async fn delete_account(&self, organizer_id: &str) -> AppResult<()> {
        self.organizer_repo.get_by_id(organizer_id).await?;
        self.organizer_repo.delete(organizer_id).await?;
        info!(organizer_id = %organizer_id, "Organizer account deleted");
        Ok(())
    }

    fn session(&self, organizer: organizer::Model) -> AppResult<AuthSession> {
        let access_token = self.tokens.issue(&organizer.id, &organizer.role)?;
        Ok(AuthSession {
            access_token,
            organizer,
        })
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> (OrganizerService, crate::services::MemoryTransport) {
        let (email, outbox) = test_fixtures::mailer();
        let service = OrganizerService::new(
            OrganizerRepository::new(Arc::new(db.into_connection())),
            TokenService::new("test-secret", Duration::hours(1)),
            email,
            "https://eventz.test/",
        );
        (service, outbox)
    }

    fn with_password(id: &str, password: &str) -> organizer::Model {
        organizer::Model {
            password_hash: hash_password(password).unwrap(),
            ..test_fixtures::organizer(id)
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::organizer("org1")]]);
        let (service, _) = service(db);

        let result = service
            .register(RegisterOrganizerInput {
                name: "Asha".to_string(),
                email: "org1@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let created = test_fixtures::organizer("org1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organizer::Model>::new()])
            .append_query_results([[created.clone()]]);
        let (service, _) = service(db);

        let session = service
            .register(RegisterOrganizerInput {
                name: "Asha".to_string(),
                email: "Org1@Example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.organizer.id, "org1");
        let claims = TokenService::new("test-secret", Duration::hours(1))
            .verify(&session.access_token)
            .unwrap();
        assert_eq!(claims.sub, "org1");
    }

    #[tokio::test]
    async fn test_register_validates_password_length() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .register(RegisterOrganizerInput {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "abc".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[with_password("org1", "right-password")]]);
        let (service, _) = service(db);

        let result = service
            .login(LoginInput {
                email: "org1@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organizer::Model>::new()]);
        let (service, _) = service(db);

        let result = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_success() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[with_password("org1", "right-password")]]);
        let (service, _) = service(db);

        let session = service
            .login(LoginInput {
                email: "org1@example.com".to_string(),
                password: "right-password".to_string(),
            })
            .await
            .unwrap();

        assert!(!session.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_email_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::organizer("org1")]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1)),
            }]]);
        let (service, _) = service(db);

        let result = service
            .update_profile(
                "org1",
                UpdateProfileInput {
                    email: Some("taken@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_change_password_sends_notice() {
        let current = with_password("org1", "old-password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[current.clone()]])
            .append_query_results([[current]]);
        let (service, outbox) = service(db);

        service
            .change_password(
                "org1",
                ChangePasswordInput {
                    current_password: "old-password".to_string(),
                    new_password: "new-password".to_string(),
                },
            )
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Password Changed - Eventz");
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[with_password("org1", "old-password")]]);
        let (service, outbox) = service(db);

        let result = service
            .change_password(
                "org1",
                ChangePasswordInput {
                    current_password: "nope".to_string(),
                    new_password: "new-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_silent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organizer::Model>::new()]);
        let (service, outbox) = service(db);

        let message = service
            .forgot_password(ForgotPasswordInput {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(message, FORGOT_PASSWORD_MESSAGE);
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_emails_link() {
        let organizer = test_fixtures::organizer("org1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[organizer.clone()]])
            .append_query_results([[organizer]]);
        let (service, outbox) = service(db);

        let message = service
            .forgot_password(ForgotPasswordInput {
                email: "org1@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(message, FORGOT_PASSWORD_MESSAGE);
        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert!(
            sent[0]
                .text_body
                .contains("https://eventz.test/organizer/reset-password?token=")
        );
    }

    #[tokio::test]
    async fn test_reset_password_expired_token() {
        let organizer = organizer::Model {
            password_reset_token: Some("tok".to_string()),
            password_reset_expires: Some((Utc::now() - Duration::minutes(1)).into()),
            ..test_fixtures::organizer("org1")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[organizer]]);
        let (service, _) = service(db);

        let result = service
            .reset_password(ResetPasswordInput {
                token: "tok".to_string(),
                new_password: "new-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_reset_password_success() {
        let organizer = organizer::Model {
            password_reset_token: Some("tok".to_string()),
            password_reset_expires: Some((Utc::now() + Duration::minutes(30)).into()),
            ..test_fixtures::organizer("org1")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[organizer.clone()]])
            .append_query_results([[organizer]]);
        let (service, outbox) = service(db);

        service
            .reset_password(ResetPasswordInput {
                token: "tok".to_string(),
                new_password: "new-password".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outbox.sent()[0].subject, "Password Updated - Eventz");
    }

    #[tokio::test]
    async fn test_delete_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::organizer("org1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let (service, _) = service(db);

        service.delete_account("org1").await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_resolves_organizer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::organizer("org1")]]);
        let (service, _) = service(db);

        let token = TokenService::new("test-secret", Duration::hours(1))
            .issue("org1", "ORGANIZER")
            .unwrap();
        let organizer = service.authenticate(&token).await.unwrap();
        assert_eq!(organizer.id, "org1");
    }
}
