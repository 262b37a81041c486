use crate::Database;
use crate::models::{PurchaseOutcome, SweetRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, email, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Sweets --

    pub fn insert_sweet(
        &self,
        id: &str,
        name: &str,
        category: &str,
        price: f64,
        quantity: i64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sweets (id, name, category, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, name, category, price, quantity],
            )?;
            Ok(())
        })
    }

    pub fn sweet_by_id(&self, id: &str) -> Result<Option<SweetRow>> {
        self.with_conn(|conn| query_sweet_by_id(conn, id))
    }

    pub fn sweet_by_name(&self, name: &str) -> Result<Option<SweetRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE name = ?1"))?;
            let row = stmt.query_row([name], sweet_from_row).optional()?;
            Ok(row)
        })
    }

    /// All sweets, newest first.
    pub fn list_sweets(&self) -> Result<Vec<SweetRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SWEET_COLUMNS} FROM sweets ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([], sweet_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Filtered listing. Name and category match as case-insensitive
    /// substrings; prices bound the range inclusively.
    pub fn search_sweets(
        &self,
        name: Option<&str>,
        category: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Vec<SweetRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(name) = name {
                params.push(Box::new(name.to_string()));
                clauses.push(format!(
                    "instr(lower(name), lower(?{})) > 0",
                    params.len()
                ));
            }
            if let Some(category) = category {
                params.push(Box::new(category.to_string()));
                clauses.push(format!(
                    "instr(lower(category), lower(?{})) > 0",
                    params.len()
                ));
            }
            if let Some(min) = min_price {
                params.push(Box::new(min));
                clauses.push(format!("price >= ?{}", params.len()));
            }
            if let Some(max) = max_price {
                params.push(Box::new(max));
                clauses.push(format!("price <= ?{}", params.len()));
            }

            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };
            let sql = format!(
                "SELECT {SWEET_COLUMNS} FROM sweets {where_sql} ORDER BY created_at DESC, rowid DESC"
            );

            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(param_refs.as_slice(), sweet_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Replace every mutable field. Returns the updated row, or None
    /// if no sweet has this id.
    pub fn update_sweet(
        &self,
        id: &str,
        name: &str,
        category: &str,
        price: f64,
        quantity: i64,
    ) -> Result<Option<SweetRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sweets
                 SET name = ?2, category = ?3, price = ?4, quantity = ?5,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, name, category, price, quantity],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_sweet_by_id(conn, id)
        })
    }

    /// Returns false if no sweet has this id.
    pub fn delete_sweet(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM sweets WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Decrement stock by one, refusing to go below zero. The guard
    /// lives in the UPDATE itself so two concurrent purchases of the
    /// last item cannot both succeed.
    pub fn purchase_sweet(&self, id: &str) -> Result<PurchaseOutcome> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sweets
                 SET quantity = quantity - 1, updated_at = datetime('now')
                 WHERE id = ?1 AND quantity > 0",
                [id],
            )?;
            if changed == 1 {
                let row = query_sweet_by_id(conn, id)?
                    .ok_or_else(|| anyhow::anyhow!("Sweet {} vanished mid-purchase", id))?;
                return Ok(PurchaseOutcome::Purchased(row));
            }
            match query_sweet_by_id(conn, id)? {
                Some(_) => Ok(PurchaseOutcome::OutOfStock),
                None => Ok(PurchaseOutcome::NotFound),
            }
        })
    }

    /// Increment stock by a positive amount. Returns the updated row,
    /// or None if no sweet has this id.
    pub fn restock_sweet(&self, id: &str, amount: i64) -> Result<Option<SweetRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sweets
                 SET quantity = quantity + ?2, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, amount],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_sweet_by_id(conn, id)
        })
    }
}

const SWEET_COLUMNS: &str = "id, name, category, price, quantity, created_at, updated_at";

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is one of the fixed identifiers above, never user input.
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, role, created_at FROM users WHERE {column} = ?1"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                role: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_sweet_by_id(conn: &Connection, id: &str) -> Result<Option<SweetRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE id = ?1"))?;
    let row = stmt.query_row([id], sweet_from_row).optional()?;
    Ok(row)
}

fn sweet_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<SweetRow, rusqlite::Error> {
    Ok(SweetRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
