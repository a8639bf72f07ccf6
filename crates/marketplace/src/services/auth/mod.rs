//! Authentication service.
//!
//! Handles registration, activation-by-email, and password login.

mod error;
mod token;

pub use error::AuthError;
pub use token::{ActivationTokens, decode_uid, encode_uid};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use plateful_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::profiles::ProfileRepository;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validated-at-the-edge registration input.
#[derive(Debug)]
pub struct Registration<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Authentication service.
///
/// Registration creates the account inactive together with its empty
/// profile; the account only becomes usable through the emailed activation
/// link.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    profiles: ProfileRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Register a new account with the given marketplace role.
    ///
    /// The account starts inactive and gets an empty profile row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidRegistration` if a required field is empty.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email or username is taken.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;

        validate_required("first name", registration.first_name)?;
        validate_required("last name", registration.last_name)?;
        validate_required("username", registration.username)?;
        validate_password(registration.password)?;

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(&NewUser {
                first_name: registration.first_name.trim(),
                last_name: registration.last_name.trim(),
                username: registration.username.trim(),
                email: &email,
                password_hash: &password_hash,
                role: Some(registration.role),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.profiles.create_empty(user.id).await?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Records the login timestamp on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountInactive` for a correct password on an
    /// account that hasn't been activated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.users.record_login(user.id).await?;

        Ok(user)
    }

    /// Activate an account from an emailed link.
    ///
    /// The token binds the account's pre-activation state, so a link can be
    /// used at most once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidActivationLink` if the uid or token doesn't
    /// check out.
    pub async fn activate(
        &self,
        tokens: &ActivationTokens,
        encoded_uid: &str,
        token: &str,
    ) -> Result<User, AuthError> {
        let user_id = decode_uid(encoded_uid).ok_or(AuthError::InvalidActivationLink)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidActivationLink)?;

        if !tokens.verify(&user, token) {
            return Err(AuthError::InvalidActivationLink);
        }

        self.users.activate(user.id).await?;

        self.users
            .get_by_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: plateful_core::UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Reject empty or whitespace-only required fields.
fn validate_required(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidRegistration(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").expect("hashes");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_blank_required_field_rejected() {
        assert!(matches!(
            validate_required("first name", "   "),
            Err(AuthError::InvalidRegistration(_))
        ));
        assert!(validate_required("first name", "Asha").is_ok());
    }
}
