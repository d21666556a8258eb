use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::user::User;
use crate::users;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub exp: usize,
}

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| ApiError::Internal)?
        .to_string())
}

pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(subject: &str, ttl: Duration, cfg: &Config) -> Result<String, ApiError> {
    let exp = (Utc::now() + ttl).timestamp() as usize;
    let claims = Claims {
        sub: subject.to_string(),
        exp,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_bytes()),
    )
    .map_err(|_| ApiError::Internal)
}

pub fn create_access_token(username: &str, cfg: &Config) -> Result<String, ApiError> {
    issue_token(username, Duration::minutes(cfg.token_ttl_minutes), cfg)
}

pub fn verify_access_token(token: &str, cfg: &Config) -> Result<Claims, ApiError> {
    let mut v = Validation::new(Algorithm::HS256);
    // no leeway, so a token is rejected the instant it expires
    v.leeway = 0;
    v.set_required_spec_claims(&["exp", "sub"]);
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(cfg.jwt_secret_bytes()), &v)
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized)
}

/// Bearer-token extractor. Resolves the Authorization header to an active
/// user before the handler runs; missing header, bad token, unknown subject
/// and disabled accounts all stop the request here.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let cfg = req.app_data::<web::Data<Config>>().cloned();
        let db = req.app_data::<web::Data<Db>>().cloned();
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let (cfg, db) = match (cfg, db) {
                (Some(c), Some(d)) => (c, d),
                _ => return Err(ApiError::Internal),
            };
            let token = header
                .as_deref()
                .and_then(|s| s.strip_prefix("Bearer "))
                .ok_or(ApiError::Unauthorized)?;
            let claims = verify_access_token(token, &cfg)?;
            let user = users::find_user(&db, &claims.sub)
                .await?
                .ok_or(ApiError::Unauthorized)?;
            if user.disabled {
                return Err(ApiError::Inactive);
            }
            Ok(AuthUser(user))
        })
    }
}
