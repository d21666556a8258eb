use crate::{auth::AuthUser, config::Config, db::Db, errors::ApiError, projects};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::TryStreamExt as _;

pub async fn list_files(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let project = projects::get_project(&db, &user.0, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;
    let files = projects::list_files(&cfg, &project)?;
    Ok(HttpResponse::Ok().json(files))
}

pub async fn upload_files(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let project = projects::get_project(&db, &user.0, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut saved = Vec::new();
    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("invalid multipart".into()))?
    {
        saved.push(projects::save_upload(&cfg, &project, field).await?);
    }
    if saved.is_empty() {
        return Err(ApiError::BadRequest("no file part".into()));
    }
    Ok(HttpResponse::Ok().json(saved))
}

pub async fn download_file(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, name) = path.into_inner();
    let project = projects::get_project(&db, &user.0, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let file_path = projects::stored_file_path(&cfg, &project, &name)?;
    if !file_path.is_file() {
        return Err(ApiError::NotFound);
    }
    let named = actix_files::NamedFile::open_async(file_path)
        .await
        .map_err(|_| ApiError::Internal)?
        .use_last_modified(true)
        .prefer_utf8(true);
    Ok(named.into_response(&req))
}

pub async fn delete_file(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, name) = path.into_inner();
    let project = projects::get_project(&db, &user.0, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    projects::delete_file(&cfg, &project, &name)?;
    Ok(HttpResponse::Ok().finish())
}

/// Uploads that are not tied to a project land in the storage root under a
/// randomized name.
pub async fn upload_root(
    cfg: web::Data<Config>,
    _user: AuthUser,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut saved = Vec::new();
    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("invalid multipart".into()))?
    {
        saved.push(projects::save_root_upload(&cfg, field).await?);
    }
    if saved.is_empty() {
        return Err(ApiError::BadRequest("no file part".into()));
    }
    Ok(HttpResponse::Ok().json(saved))
}
