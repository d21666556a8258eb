use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::user::Profile;
use actix_web::HttpResponse;

pub async fn me(user: AuthUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(Profile::from(user.0)))
}
