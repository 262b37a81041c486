/// Database row types — these map directly to SQLite rows.
/// Distinct from the sweetshop-types API models to keep the DB layer
/// independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct SweetRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Result of the guarded stock decrement.
pub enum PurchaseOutcome {
    Purchased(SweetRow),
    OutOfStock,
    NotFound,
}
