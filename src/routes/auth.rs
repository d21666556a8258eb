use crate::{auth, config::Config, db::Db, errors::ApiError, users};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct TokenReq {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResp {
    access_token: String,
    token_type: String,
}

/// OAuth2-style password grant: form-encoded credentials in, bearer token
/// out. Failures are a single generic 401 with a WWW-Authenticate challenge.
pub async fn token(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    form: web::Form<TokenReq>,
) -> Result<HttpResponse, ApiError> {
    let user = users::authenticate(&db, &form.username, &form.password)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let access_token = auth::create_access_token(&user.username, &cfg)?;
    Ok(HttpResponse::Ok().json(TokenResp {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[derive(Deserialize)]
pub struct RegisterReq {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: String,
}

pub async fn register(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    body: web::Json<RegisterReq>,
) -> Result<HttpResponse, ApiError> {
    if body.username.len() < 3 || body.password.len() < 8 {
        return Err(ApiError::BadRequest("invalid username/password".into()));
    }

    let user = users::create_user(
        &db,
        &body.username,
        body.email.as_deref(),
        body.full_name.as_deref(),
        &body.password,
    )
    .await?;

    let access_token = auth::create_access_token(&user.username, &cfg)?;
    Ok(HttpResponse::Ok().json(TokenResp {
        access_token,
        token_type: "bearer".into(),
    }))
}
