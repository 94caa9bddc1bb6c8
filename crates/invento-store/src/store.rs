//! Queries over the Invento database.

use std::path::Path;
use std::str::FromStr;

use invento_core::{
    InventoryItem, LoginAttempt, NewItem, NewRequest, RequestAction, RequestStatus, RequestSummary,
    RestockRequest, Role, User, ValidationError, parse_approval_price,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::password;

/// Tables the application cannot run without.
pub const REQUIRED_TABLES: [&str; 3] = ["inventory", "users", "requests"];

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    quantity: i64,
    price: f64,
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| StoreError::Corrupt(format!("user {} has role {:?}", row.id, row.role)))?;
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    item_name: String,
    quantity: i64,
    status: String,
    user_id: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    item_name: String,
    quantity: i64,
    status: String,
    username: String,
}

fn parse_status(id: i64, raw: &str) -> Result<RequestStatus, StoreError> {
    RequestStatus::parse(raw)
        .ok_or_else(|| StoreError::Corrupt(format!("request {id} has status {raw:?}")))
}

/// What an approval did to the inventory table.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryChange {
    /// An existing row gained stock and took the new price.
    Restocked { item_id: i64, quantity: i64, price: f64 },
    /// No row had the requested name, so one was created.
    Created { item_id: i64, quantity: i64, price: f64 },
}

/// Result of approving or rejecting a restock request.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub request: RestockRequest,
    /// Set only for approvals.
    pub inventory: Option<InventoryChange>,
}

/// Handle on the SQLite database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `path` and bring the
    /// schema up to date.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self::connect(path).await?;
        sqlx::migrate!("./migrations").run(&store.pool).await?;
        Ok(store)
    }

    /// Open an existing database without touching its schema.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- inventory ----

    /// All inventory rows, oldest first.
    pub async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows: Vec<ItemRow> =
            sqlx::query_as("SELECT id, name, quantity, price FROM inventory ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    pub async fn add_item(&self, item: &NewItem) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO inventory (name, quantity, price) VALUES (?, ?, ?)")
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete an inventory row, returning it.
    pub async fn delete_item(&self, id: i64) -> Result<InventoryItem, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ItemRow> =
            sqlx::query_as("SELECT id, name, quantity, price FROM inventory WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let row = row.ok_or(StoreError::NotFound("Item"))?;

        sqlx::query("DELETE FROM inventory WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(row.into())
    }

    // ---- users ----

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password, role FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    /// Check a username, password and role triple.
    ///
    /// Returns `None` when any of the three does not match.
    pub async fn authenticate(&self, attempt: &LoginAttempt) -> Result<Option<User>, StoreError> {
        let Some(user) = self.find_user_by_username(&attempt.username).await? else {
            return Ok(None);
        };

        let candidate = attempt.password.clone();
        let hash = user.password_hash.clone();
        let verified = verification_outcome(
            &attempt.username,
            tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash)).await,
        );

        if verified && user.role == attempt.role {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Insert a user with a freshly hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<i64, StoreError> {
        let hash = password::hash_password(password)?;
        let result = sqlx::query("INSERT INTO users (username, password, role) VALUES (?, ?, ?)")
            .bind(username)
            .bind(hash)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    // ---- requests ----

    pub async fn create_request(&self, request: &NewRequest, user_id: i64) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO requests (item_name, quantity, status, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.item_name)
        .bind(request.quantity)
        .bind(RequestStatus::Pending.as_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Every request whose submitter still exists, with the submitter's
    /// username.
    pub async fn list_requests(&self) -> Result<Vec<RequestSummary>, StoreError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT r.id, r.item_name, r.quantity, r.status, u.username \
             FROM requests r JOIN users u ON r.user_id = u.id \
             ORDER BY r.id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(RequestSummary {
                    status: parse_status(row.id, &row.status)?,
                    id: row.id,
                    item_name: row.item_name,
                    quantity: row.quantity,
                    username: row.username,
                })
            })
            .collect()
    }

    /// Approve or reject a pending request in a single transaction.
    ///
    /// Approval adds the requested quantity to the first inventory row with
    /// the same name (setting its price), or creates that row. Any error
    /// leaves the database untouched.
    pub async fn decide_request(
        &self,
        request_id: i64,
        action: RequestAction,
        raw_price: Option<&str>,
    ) -> Result<DecisionOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<RequestRow> = sqlx::query_as(
            "SELECT id, item_name, quantity, status, user_id FROM requests WHERE id = ?",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;
        let row = row.ok_or(StoreError::NotFound("Request"))?;

        let user_id = row.user_id.ok_or(StoreError::InvalidRequestUser)?;
        let user_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if user_exists.is_none() {
            return Err(StoreError::InvalidRequestUser);
        }

        if parse_status(row.id, &row.status)? != RequestStatus::Pending {
            return Err(StoreError::AlreadyDecided);
        }

        let inventory = match action {
            RequestAction::Approve => {
                let price = parse_approval_price(raw_price)?;
                let existing: Option<(i64, i64)> = sqlx::query_as(
                    "SELECT id, quantity FROM inventory WHERE name = ? ORDER BY id LIMIT 1",
                )
                .bind(&row.item_name)
                .fetch_optional(&mut *tx)
                .await?;

                let change = match existing {
                    Some((item_id, current)) => {
                        let quantity = current
                            .checked_add(row.quantity)
                            .ok_or(ValidationError::QUANTITY_TOO_LARGE)?;
                        sqlx::query("UPDATE inventory SET quantity = ?, price = ? WHERE id = ?")
                            .bind(quantity)
                            .bind(price)
                            .bind(item_id)
                            .execute(&mut *tx)
                            .await?;
                        InventoryChange::Restocked { item_id, quantity, price }
                    }
                    None => {
                        let result = sqlx::query(
                            "INSERT INTO inventory (name, quantity, price) VALUES (?, ?, ?)",
                        )
                        .bind(&row.item_name)
                        .bind(row.quantity)
                        .bind(price)
                        .execute(&mut *tx)
                        .await?;
                        InventoryChange::Created {
                            item_id: result.last_insert_rowid(),
                            quantity: row.quantity,
                            price,
                        }
                    }
                };
                Some(change)
            }
            RequestAction::Reject => None,
        };

        let status = action.target_status();
        sqlx::query("UPDATE requests SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(DecisionOutcome {
            request: RestockRequest {
                id: row.id,
                item_name: row.item_name,
                quantity: row.quantity,
                status,
                user_id,
            },
            inventory,
        })
    }

    // ---- maintenance ----

    /// Required tables absent from the schema.
    pub async fn missing_tables(&self) -> Result<Vec<&'static str>, StoreError> {
        let present: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&self.pool)
                .await?;
        Ok(REQUIRED_TABLES
            .into_iter()
            .filter(|t| !present.iter().any(|(name,)| name == t))
            .collect())
    }

    /// Run `PRAGMA integrity_check`.
    pub async fn integrity_check(&self) -> Result<(), StoreError> {
        let (result,): (String,) = sqlx::query_as("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;
        if result == "ok" {
            Ok(())
        } else {
            Err(StoreError::Integrity(result))
        }
    }

    pub async fn count_rows(&self, table: &'static str) -> Result<i64, StoreError> {
        // Table names come from REQUIRED_TABLES only.
        if !REQUIRED_TABLES.contains(&table) {
            return Err(StoreError::Corrupt(format!("unknown table {table}")));
        }
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// A verification task that panicked or was cancelled counts as a mismatch.
fn verification_outcome(username: &str, joined: Result<bool, tokio::task::JoinError>) -> bool {
    joined.unwrap_or_else(|e| {
        tracing::error!(error = %e, username, "password verification task failed");
        false
    })
}
