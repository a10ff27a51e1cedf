use std::collections::HashMap;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    catalog,
    db::DbPool,
    dto::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, STORE_TYPES, User},
    response::ApiResponse,
};

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let mut errors = HashMap::new();
    if payload.username.len() < 3 {
        errors.insert("username".into(), "must be at least 3 characters".into());
    }
    if !payload.email.contains('@') {
        errors.insert("email".into(), "must be a valid email address".into());
    }
    if payload.password.len() < 6 {
        errors.insert("password".into(), "must be at least 6 characters".into());
    }
    if payload.phone.is_empty() {
        errors.insert("phone".into(), "is required".into());
    }
    if payload.address.is_empty() {
        errors.insert("address".into(), "is required".into());
    }
    let role = match payload.role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(()) => {
            errors.insert("role".into(), "must be one of: customer, vendor".into());
            None
        }
    };
    let store_type = payload.store_type.unwrap_or_else(|| "general".to_string());
    if !STORE_TYPES.contains(&store_type.as_str()) {
        errors.insert(
            "store_type".into(),
            format!("must be one of: {}", STORE_TYPES.join(", ")),
        );
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let role = role.unwrap_or(Role::Customer);

    let email = payload.email.to_lowercase();
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(payload.username.as_str())
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, phone, address, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.username.as_str())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(payload.phone.as_str())
    .bind(payload.address.as_str())
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    // Vendors can open their store in the same call.
    if role == Role::Vendor
        && let Some(store_name) = payload.store_name.filter(|name| !name.is_empty())
    {
        sqlx::query(
            r#"
            INSERT INTO stores (id, owner_id, name, store_type, gst_number, address, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(store_name)
        .bind(store_type.as_str())
        .bind(payload.gst_number.unwrap_or_default())
        .bind(user.address.as_str())
        .bind(user.phone.as_str())
        .bind(user.email.as_str())
        .execute(pool)
        .await?;
    }

    let token = issue_token(user.id, role)?;
    tracing::info!(user_id = %user.id, role = %role, "user registered");

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthResponse { token, user },
    ))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(payload.username.as_str())
        .fetch_optional(pool)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid credentials".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid credentials".into()));
    }

    let role = user
        .role
        .parse::<Role>()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Unknown role stored for user")))?;
    let token = issue_token(user.id, role)?;

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse { token, user },
    ))
}

pub async fn current_user(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = catalog::find_user(pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;
    Ok(ApiResponse::success("OK", found))
}

fn issue_token(user_id: Uuid, role: Role) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
