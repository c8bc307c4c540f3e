use libsql::{Connection, Row};
use tracing::info;

use crate::model::user::User;

const USER_COLUMNS: &str =
    "id, name, email, hashed_password, is_active, is_admin, role, created_at, updated_at";

/// Fields written on create and update.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub is_active: bool,
    pub is_admin: bool,
    pub role: &'a str,
}

pub struct UserDao;

impl UserDao {
    pub async fn list_users(
        &self,
        db: &Connection,
        skip: u32,
        limit: u32,
    ) -> anyhow::Result<Vec<User>> {
        let mut rows = db
            .query(
                &format!(
                    "SELECT {} FROM users ORDER BY id LIMIT ? OFFSET ?",
                    USER_COLUMNS
                ),
                libsql::params![i64::from(limit), i64::from(skip)],
            )
            .await?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(user_from_row(&row)?);
        }

        Ok(users)
    }

    pub async fn get_user(&self, db: &Connection, id: i64) -> anyhow::Result<Option<User>> {
        let mut rows = db
            .query(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                libsql::params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(
        &self,
        db: &Connection,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut rows = db
            .query(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                libsql::params![email],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn create_user(
        &self,
        db: &Connection,
        user: NewUser<'_>,
        hashed_password: &str,
    ) -> anyhow::Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        info!(
            "Creating user with email: {} name: {} role: {}",
            user.email, user.name, user.role
        );

        db.execute(
            "INSERT INTO users (name, email, hashed_password, is_active, is_admin, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                user.name,
                user.email,
                hashed_password,
                i64::from(user.is_active),
                i64::from(user.is_admin),
                user.role,
                now.clone(),
                now
            ],
        )
        .await?;

        let id = db.last_insert_rowid();
        self.get_user(db, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", id))
    }

    /// Overwrites a user's profile, and its password when one is given, in a
    /// single statement. Returns `None` when no user has this id.
    pub async fn update_user(
        &self,
        db: &Connection,
        id: i64,
        user: NewUser<'_>,
        hashed_password: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let now = chrono::Utc::now().to_rfc3339();

        let updated = db
            .execute(
                "UPDATE users
                 SET name = ?, email = ?, is_active = ?, is_admin = ?, role = ?,
                     hashed_password = COALESCE(?, hashed_password), updated_at = ?
                 WHERE id = ?",
                libsql::params![
                    user.name,
                    user.email,
                    i64::from(user.is_active),
                    i64::from(user.is_admin),
                    user.role,
                    hashed_password,
                    now,
                    id
                ],
            )
            .await?;

        if updated == 0 {
            return Ok(None);
        }

        self.get_user(db, id).await
    }

    /// Deletes a user and returns it as it was.
    pub async fn delete_user(&self, db: &Connection, id: i64) -> anyhow::Result<Option<User>> {
        let Some(user) = self.get_user(db, id).await? else {
            return Ok(None);
        };

        info!("Deleting user {} ({})", user.id, user.email);

        db.execute("DELETE FROM users WHERE id = ?", libsql::params![id])
            .await?;

        Ok(Some(user))
    }
}

fn user_from_row(row: &Row) -> anyhow::Result<User> {
    let is_active: i64 = row.get(4)?;
    let is_admin: i64 = row.get(5)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        is_active: is_active != 0,
        is_admin: is_admin != 0,
        role: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
