use infra::models::{Role, User};
use infra::repos::{NewUser, UserRepo};
use tracing::info;

use crate::auth::password::{check_strength, hash_password, verify_password};
use crate::error::AppError;
use crate::state::AppState;

/// A signed-in user and the bearer token for them.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
) -> Result<SignedIn, AppError> {
    let email = email.trim();
    if !email.contains('@') {
        return Err(AppError::BadRequest("email address is not valid".into()));
    }
    check_strength(password)?;
    let role = if state.config.is_super_admin_email(email) {
        Role::SuperAdmin
    } else {
        Role::Participant
    };

    let user = UserRepo::new(state.store.clone())
        .create(
            NewUser {
                email: email.to_string(),
                name: name.trim().to_string(),
                password_hash: Some(hash_password(password)?),
                role,
            },
            state.clock.now(),
        )
        .await?;
    info!(user_id = %user.id, role = %user.role, "registered user");

    let token = state.jwt_service().create_token(user.id, user.email.clone())?;
    Ok(SignedIn { user, token })
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<SignedIn, AppError> {
    let invalid = || AppError::Unauthorized("invalid email or password".into());

    let user = UserRepo::new(state.store.clone())
        .get_by_email(email.trim())
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(password, hash)? {
        return Err(invalid());
    }

    let token = state.jwt_service().create_token(user.id, user.email.clone())?;
    Ok(SignedIn { user, token })
}
