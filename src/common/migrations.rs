// src/common/migrations.rs
//! Creates the tables this service reads and writes when they are absent

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Role names that carry meaning for the admin area
const SEEDED_ROLES: [&str; 2] = ["admin", "editor"];

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB environment variable is set to "true"
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    create_schema(pool).await?;
    seed_roles(pool).await?;

    info!("✅ Database migration completed successfully!");

    Ok(())
}

/// Grants the admin role to every listed user id; existing grants are left alone
pub async fn grant_bootstrap_admins(
    pool: &SqlitePool,
    user_ids: &[String],
) -> Result<(), sqlx::Error> {
    for user_id in user_ids {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_roles (user_id, role_id)
            SELECT ?, id FROM roles WHERE name = 'admin'
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(user_id = %user_id, "Granted admin role from ADMIN_USER_IDS");
        }
    }

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Reverse dependency order
    let tables = [
        "testimonials",
        "bookings",
        "tours",
        "regions",
        "user_roles",
        "role_permissions",
        "permissions",
        "roles",
    ];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS role_permissions (
            role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            permission_id INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
            PRIMARY KEY (role_id, permission_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id TEXT NOT NULL,
            role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, role_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS regions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS tours (
            id TEXT PRIMARY KEY,
            region_id TEXT REFERENCES regions(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            summary TEXT,
            description TEXT,
            duration_days INTEGER NOT NULL,
            price_cents INTEGER NOT NULL,
            published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            tour_id TEXT REFERENCES tours(id) ON DELETE SET NULL,
            kind TEXT NOT NULL CHECK (kind IN ('tour', 'custom')),
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            travelers INTEGER NOT NULL,
            travel_date TEXT,
            message TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'cancelled')),
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS testimonials (
            id TEXT PRIMARY KEY,
            author_name TEXT NOT NULL,
            country TEXT,
            content TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            approved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_user_roles_user ON user_roles(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_tours_region ON tours(region_id)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

async fn seed_roles(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for name in SEEDED_ROLES {
        sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    Ok(())
}
