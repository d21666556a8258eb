use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::file::FileEntry;
use crate::models::project::Project;
use crate::models::user::User;
use actix_multipart::Field;
use chrono::Utc;
use futures_util::TryStreamExt as _;
use sanitize_filename::sanitize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::io::Write as _;
use std::path::PathBuf;

pub fn project_dir(cfg: &Config, project_id: i64) -> PathBuf {
    PathBuf::from(&cfg.storage_dir).join(project_id.to_string())
}

fn project_from_row(row: &SqliteRow) -> Project {
    Project {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

/// Insert the row and commit first so the id is durable, then create the
/// storage directory. If the directory cannot be created the row is deleted
/// again, so a project never exists without its directory.
///
/// The duplicate-name check is application-level; two concurrent creates for
/// the same (owner, name) can still race past it.
pub async fn create_project(
    db: &Db,
    cfg: &Config,
    owner: &User,
    name: &str,
    description: Option<&str>,
) -> Result<Project, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("project name cannot be empty".into()));
    }

    let existing = sqlx::query("SELECT 1 FROM projects WHERE owner_id = ? AND name = ?")
        .bind(&owner.id)
        .bind(name)
        .fetch_optional(&db.0)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(format!(
            "project '{name}' already exists"
        )));
    }

    let now = Utc::now();
    let res = sqlx::query(
        "INSERT INTO projects(owner_id, name, description, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&owner.id)
    .bind(name)
    .bind(description)
    .bind(now)
    .execute(&db.0)
    .await?;
    let id = res.last_insert_rowid();

    let dir = project_dir(cfg, id);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        log::error!("create dir {} failed: {e}", dir.display());
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&db.0)
            .await?;
        return Err(ApiError::Internal);
    }

    Ok(Project {
        id,
        owner_id: owner.id.clone(),
        name: name.to_string(),
        description: description.map(str::to_string),
        created_at: now,
    })
}

pub async fn list_projects(db: &Db, owner: &User) -> Result<Vec<Project>, ApiError> {
    let rows = sqlx::query(
        "SELECT id, owner_id, name, description, created_at FROM projects WHERE owner_id = ?",
    )
    .bind(&owner.id)
    .fetch_all(&db.0)
    .await?;
    Ok(rows.iter().map(project_from_row).collect())
}

pub async fn get_project(db: &Db, owner: &User, id: i64) -> Result<Option<Project>, ApiError> {
    let row = sqlx::query(
        "SELECT id, owner_id, name, description, created_at FROM projects WHERE id = ? AND owner_id = ?",
    )
    .bind(id)
    .bind(&owner.id)
    .fetch_optional(&db.0)
    .await?;
    Ok(row.as_ref().map(project_from_row))
}

/// Removes the row and the storage directory with everything in it.
pub async fn delete_project(db: &Db, cfg: &Config, project: &Project) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project.id)
        .execute(&db.0)
        .await?;

    // row is already gone at this point; directory removal is best-effort
    let dir = project_dir(cfg, project.id);
    if dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            log::warn!("failed to remove dir {}: {e}", dir.display());
        }
    }
    Ok(())
}

pub fn list_files(cfg: &Config, project: &Project) -> Result<Vec<FileEntry>, ApiError> {
    let dir = project_dir(cfg, project.id);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_string_lossy().into_owned(),
            size_bytes: meta.len() as i64,
        });
    }
    Ok(entries)
}

/// Path of a stored file, after checking the name cannot escape the
/// project directory.
pub fn stored_file_path(cfg: &Config, project: &Project, name: &str) -> Result<PathBuf, ApiError> {
    if name.is_empty() || sanitize(name) != name {
        return Err(ApiError::BadRequest("invalid filename".into()));
    }
    Ok(project_dir(cfg, project.id).join(name))
}

async fn read_field(cfg: &Config, field: &mut Field) -> Result<Vec<u8>, ApiError> {
    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("upload read error".into()))?
    {
        data.extend_from_slice(&chunk);
        if data.len() > cfg.max_upload_size {
            return Err(ApiError::BadRequest("file too large".into()));
        }
    }
    Ok(data)
}

/// The destination keeps the upload's own base name, so a second upload of
/// the same name replaces the first.
pub async fn save_upload(
    cfg: &Config,
    project: &Project,
    mut field: Field,
) -> Result<FileEntry, ApiError> {
    let original = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|s| s.to_string()))
        .unwrap_or_else(|| "upload.bin".into());
    let dest_name = sanitize(&original);
    if dest_name.is_empty() {
        return Err(ApiError::BadRequest("invalid filename".into()));
    }

    let data = read_field(cfg, &mut field).await?;
    let path = project_dir(cfg, project.id).join(&dest_name);
    let mut f = std::fs::File::create(&path)?;
    f.write_all(&data)?;

    Ok(FileEntry {
        name: dest_name,
        path: path.to_string_lossy().into_owned(),
        size_bytes: data.len() as i64,
    })
}

/// Upload into the storage root rather than a project directory. Here the
/// name gets a random prefix instead, so root uploads never collide.
pub async fn save_root_upload(cfg: &Config, mut field: Field) -> Result<FileEntry, ApiError> {
    let original = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|s| s.to_string()))
        .unwrap_or_else(|| "upload.bin".into());
    let original_safe = sanitize(&original);
    if original_safe.is_empty() {
        return Err(ApiError::BadRequest("invalid filename".into()));
    }

    let data = read_field(cfg, &mut field).await?;
    let stored_name = format!("{}_{}", uuid::Uuid::new_v4().simple(), original_safe);
    let path = PathBuf::from(&cfg.storage_dir).join(&stored_name);
    let mut f = std::fs::File::create(&path)?;
    f.write_all(&data)?;

    Ok(FileEntry {
        name: stored_name,
        path: path.to_string_lossy().into_owned(),
        size_bytes: data.len() as i64,
    })
}

pub fn delete_file(cfg: &Config, project: &Project, name: &str) -> Result<(), ApiError> {
    let path = stored_file_path(cfg, project, name)?;
    if !path.is_file() {
        return Err(ApiError::NotFound);
    }
    std::fs::remove_file(&path)?;
    Ok(())
}
