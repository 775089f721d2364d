use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::userdb::{NewUser, UserExt},
    dtos::userdtos::{
        is_valid_gmail, FilterUserDto, LoginUserDto, NameUpdateDto, SignupUserDto,
        UpdateProfileDto, UserData, UserResponseDto,
    },
    error::{ErrorMessage, HttpError},
    models::usermodel::{User, UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/update-name", put(update_user_name))
        .route("/agents", get(get_agent_users))
        .route("/:user_id", get(get_user))
        .route("/:user_id/profile", put(update_profile))
        .route("/:user_id/profile-picture", put(update_profile_picture))
}

/// Signup and login compare addresses in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_response(user: &User) -> Json<UserResponseDto> {
    Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(user),
        },
    })
}

async fn find_user(app_state: &AppState, user_id: Uuid) -> Result<User, HttpError> {
    app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))
}

pub async fn signup(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(mut body): Json<SignupUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.email = normalize_email(&body.email);
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let role = match body.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => UserRole::parse(raw)
            .ok_or_else(|| HttpError::bad_request(format!("Unknown role '{}'", raw)))?,
        None => UserRole::Buyer,
    };

    let email = body.email;

    let existing = app_state
        .db_client
        .get_user(None, Some(email.as_str()))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing.is_some() {
        return Err(HttpError::conflict(ErrorMessage::EmailExist.to_string()));
    }

    let password = app_state.credentials.hash(&body.password)?;

    let result = app_state
        .db_client
        .save_user(NewUser {
            name: body.name.trim().to_string(),
            email,
            password,
            role,
            phone: body.phone,
            city: body.city,
            pincode: body.pincode,
            bio: body.bio,
            agency_name: body.agency_name,
            experience: body.experience,
            specialties: body.specialties,
        })
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = user.role.to_str(), "user registered");
            Ok(user_response(&user))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(HttpError::conflict(ErrorMessage::EmailExist.to_string()))
        }
        Err(e) => Err(HttpError::server_error(e.to_string())),
    }
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(HttpError::bad_request(ErrorMessage::EmptyPassword.to_string()));
    }

    let email = normalize_email(email);
    if !is_valid_gmail(&email) {
        return Err(HttpError::bad_request(ErrorMessage::InvalidEmailFormat.to_string()));
    }

    let user = app_state
        .db_client
        .get_user(None, Some(email.as_str()))
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::Unauthorized(ErrorMessage::WrongEmail.to_string()))?;

    if !app_state.credentials.verify(password, &user.password)? {
        tracing::warn!(user_id = %user.id, "failed login");
        return Err(ServiceError::Unauthorized(ErrorMessage::WrongPassword.to_string()).into());
    }

    Ok(user_response(&user))
}

pub async fn update_user_name(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<NameUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let name = body.name.as_deref().map(str::trim).unwrap_or_default();

    if email.is_empty() || name.is_empty() {
        return Err(HttpError::bad_request("Email and name are required"));
    }

    let user = app_state
        .db_client
        .update_user_name(email, name)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(user_response(&user))
}

pub async fn get_user(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = find_user(&app_state, user_id).await?;
    Ok(user_response(&user))
}

pub async fn get_agent_users(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let agents = app_state
        .db_client
        .get_agents()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "users": agents,
            "total": agents.len()
        }
    })))
}

pub async fn update_profile(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = find_user(&app_state, user_id).await?;
    if !user.is_agent() && body.touches_professional_fields() {
        return Err(HttpError::bad_request(
            "Agency name, experience and specialties are only for agents",
        ));
    }

    let updated = app_state
        .db_client
        .update_user_profile(user_id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(user_response(&updated))
}

pub async fn update_profile_picture(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    find_user(&app_state, user_id).await?;

    let mut stored: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.to_string()))?;

        stored = Some(app_state.photo_storage.store(file_name.as_deref(), &bytes).await?);
        break;
    }

    let picture = stored.ok_or_else(|| HttpError::bad_request("No file uploaded"))?;

    let user = app_state
        .db_client
        .update_profile_picture(user_id, &picture)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(user_response(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_case_gmail_is_accepted_once_normalized() {
        let email = normalize_email("  Asha@Gmail.com ");
        assert_eq!(email, "asha@gmail.com");
        assert!(is_valid_gmail(&email));
    }
}
