use crate::{auth::AuthUser, config::Config, db::Db, errors::ApiError, projects};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub async fn list_projects(
    db: web::Data<Db>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let list = projects::list_projects(&db, &user.0).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[derive(Deserialize)]
pub struct CreateProjectReq {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_project(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    body: web::Json<CreateProjectReq>,
) -> Result<HttpResponse, ApiError> {
    let project =
        projects::create_project(&db, &cfg, &user.0, &body.name, body.description.as_deref())
            .await?;
    Ok(HttpResponse::Ok().json(project))
}

pub async fn delete_project(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let project = projects::get_project(&db, &user.0, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    projects::delete_project(&db, &cfg, &project).await?;
    Ok(HttpResponse::Ok().finish())
}
