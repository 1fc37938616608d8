use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, EditUserRequest, EditUserResponse, LoginRequest, PublicUser, RegisterRequest},
    repo_types::{NewUser, UserChanges},
    validation::{normalize_email, optional_secret, required, required_secret},
};
use crate::{error::AppError, state::AppState};

fn authenticated(st: &AppState, user_id: Uuid) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        message: "authenticated".into(),
        token: st.credentials.issue_token(user_id)?,
        user_id,
    })
}

/// Registers a user and signs them in.
///
/// Fields are checked in a fixed order and the first failure is reported:
/// name, email, phone, password, confirmpassword. Then the password must
/// match its confirmation, then the email must be free.
#[instrument(skip(st, req))]
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<AuthResponse, AppError> {
    let name = required(&req.name, "name")?;
    let email = normalize_email(required(&req.email, "email")?)?;
    let phone = required(&req.phone, "phone")?;
    let password = required_secret(&req.password, "password")?;
    let confirm = required_secret(&req.confirmpassword, "confirmpassword")?;

    if password != confirm {
        warn!("password confirmation mismatch");
        return Err(AppError::PasswordMismatch);
    }

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = st.credentials.hash_password(password).await?;
    let user = st
        .users
        .insert(NewUser {
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    authenticated(st, user.id)
}

#[instrument(skip(st, req))]
pub async fn login(st: &AppState, req: LoginRequest) -> Result<AuthResponse, AppError> {
    let email = required(&req.email, "email")?.to_lowercase();
    let password = required_secret(&req.password, "password")?;

    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::UserNotFound);
    };

    if !st
        .credentials
        .verify_password(password, &user.password_hash)
        .await?
    {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    authenticated(st, user.id)
}

/// Applies a profile edit for the user the token was issued to.
///
/// The email uniqueness check ignores the acting user, so resubmitting the
/// current email is fine. The password changes only when `password` or
/// `confirmpassword` is supplied, and then both must match.
#[instrument(skip(st, req))]
pub async fn edit_user(
    st: &AppState,
    user_id: Uuid,
    req: EditUserRequest,
) -> Result<EditUserResponse, AppError> {
    let user = st
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let name = required(&req.name, "name")?;
    let email = normalize_email(required(&req.email, "email")?)?;
    let phone = required(&req.phone, "phone")?;

    if email != user.email {
        if let Some(other) = st.users.find_by_email(&email).await? {
            if other.id != user.id {
                warn!(user_id = %user.id, email = %email, "email taken by another user");
                return Err(AppError::DuplicateEmail);
            }
        }
    }

    let password = optional_secret(&req.password);
    let confirm = optional_secret(&req.confirmpassword);
    let password_hash = match (password, confirm) {
        (None, None) => user.password_hash,
        (Some(p), Some(c)) if p == c => {
            info!(user_id = %user.id, "password changed");
            st.credentials.hash_password(p).await?
        }
        _ => {
            warn!(user_id = %user.id, "password confirmation mismatch");
            return Err(AppError::PasswordMismatch);
        }
    };

    let image = req
        .image
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .or(user.image);

    let updated = st
        .users
        .update_by_id(
            user.id,
            UserChanges {
                name: name.to_string(),
                email,
                phone: phone.to_string(),
                password_hash,
                image,
            },
        )
        .await?
        .ok_or(AppError::UserNotFound)?;

    info!(user_id = %updated.id, "user updated");
    Ok(EditUserResponse {
        message: "user updated".into(),
        user: updated.into(),
    })
}

#[instrument(skip(st))]
pub async fn get_user(st: &AppState, id: &str) -> Result<PublicUser, AppError> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::Validation("invalid user id".into()))?;
    let user = st
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(user.into())
}

/// Resolves the caller's own profile; anonymous callers get `None`.
#[instrument(skip(st))]
pub async fn check_user(st: &AppState, user_id: Option<Uuid>) -> Result<Option<PublicUser>, AppError> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let user = st
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(Some(user.into()))
}
