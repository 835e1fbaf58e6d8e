//! Role store: which role names are assigned to a user

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::errors::GateError;

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Names of every role assigned to the user; empty when none are
    async fn roles_for_user(&self, user_id: &str) -> Result<Vec<String>, GateError>;
}

/// Reads assignments through the `user_roles` → `roles` join
pub struct SqlRoleStore {
    db: SqlitePool,
}

impl SqlRoleStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleStore for SqlRoleStore {
    async fn roles_for_user(&self, user_id: &str) -> Result<Vec<String>, GateError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(names)
    }
}
