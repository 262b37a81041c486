use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use sweetshop_db::Database;
use sweetshop_types::models::Role;

/// Admin account to provision at startup. There is no HTTP route that
/// grants the admin role; this is the only supported path besides
/// editing the database directly.
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Build the seed from SWEETSHOP_ADMIN_USERNAME / _EMAIL / _PASSWORD.
/// Returns None unless all three are set.
pub fn admin_from_env() -> Option<AdminSeed> {
    let username = std::env::var("SWEETSHOP_ADMIN_USERNAME").ok()?;
    let email = std::env::var("SWEETSHOP_ADMIN_EMAIL").ok()?;
    let password = std::env::var("SWEETSHOP_ADMIN_PASSWORD").ok()?;
    Some(AdminSeed {
        username,
        email,
        password,
    })
}

/// Create the configured admin account if it is not already present.
/// Idempotent across restarts.
pub fn ensure_admin(db: &Database, seed: &AdminSeed) -> Result<()> {
    if db.user_by_email(&seed.email)?.is_some() {
        info!("Admin account {} already present", seed.email);
        return Ok(());
    }

    let password_hash = sweetshop_api::auth::hash_password(&seed.password)?;
    db.create_user(
        &Uuid::new_v4().to_string(),
        &seed.username,
        &seed.email,
        &password_hash,
        Role::Admin.as_str(),
    )?;

    info!("Admin account {} created", seed.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn ensure_admin_is_idempotent() {
        let db = Database::open(Path::new(":memory:")).unwrap();
        let seed = AdminSeed {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "password123".into(),
        };

        ensure_admin(&db, &seed).unwrap();
        ensure_admin(&db, &seed).unwrap();

        let row = db.user_by_email("admin@example.com").unwrap().unwrap();
        assert_eq!(row.role, "admin");
        assert_ne!(row.password, "password123");
    }
}
