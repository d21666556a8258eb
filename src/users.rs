use crate::auth;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::user::User;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        disabled: row.get::<i64, _>("disabled") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn find_user(db: &Db, username: &str) -> Result<Option<User>, ApiError> {
    let row = sqlx::query(
        "SELECT id, username, email, full_name, disabled, created_at, updated_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&db.0)
    .await?;
    Ok(row.as_ref().map(user_from_row))
}

/// Unknown username and wrong password both come back as a plain `None`,
/// so callers cannot tell the two apart.
pub async fn authenticate(db: &Db, username: &str, password: &str) -> Result<Option<User>, ApiError> {
    let row = sqlx::query(
        "SELECT id, username, email, full_name, disabled, password_hash, created_at, updated_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&db.0)
    .await?;

    let row = match row {
        Some(r) => r,
        None => return Ok(None),
    };
    let hash: String = row.get("password_hash");
    if !auth::verify_password(&hash, password) {
        return Ok(None);
    }
    Ok(Some(user_from_row(&row)))
}

pub async fn create_user(
    db: &Db,
    username: &str,
    email: Option<&str>,
    full_name: Option<&str>,
    password: &str,
) -> Result<User, ApiError> {
    let hash = auth::hash_password(password)?;
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();

    let res = sqlx::query(
        "INSERT INTO users(id, username, email, full_name, disabled, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(&hash)
    .bind(now)
    .bind(now)
    .execute(&db.0)
    .await;

    if let Err(e) = res {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.message().contains("UNIQUE") {
                return Err(ApiError::Conflict("username or email already exists".into()));
            }
        }
        return Err(e.into());
    }

    Ok(User {
        id,
        username: username.to_string(),
        email: email.map(str::to_string),
        full_name: full_name.map(str::to_string),
        disabled: false,
        created_at: now,
        updated_at: now,
    })
}
