//! Transactional persistence for loyalty accounts.
//!
//! All concurrency control is the database's row lock: `add_loyalty` takes
//! `SELECT … FOR UPDATE` on the account row, so mutations of one account
//! serialize behind each other while distinct accounts proceed in parallel.
//! There is no retry logic here — callers simply wait on the lock.

use async_trait::async_trait;
use log::debug;
use perka_commons::config::LedgerSettings;
use perka_commons::UserId;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::LoyaltyAccount;
use crate::operation::Operation;

/// Postgres SQLSTATE for a CHECK constraint violation.
const CHECK_VIOLATION: &str = "23514";

/// Capability trait over ledger persistence.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Applies one mutation under the account's row lock.
    ///
    /// - no row + `Registration`: creates the account with `balance = amount`
    ///   and a "d" log row — the sole account-creation path
    /// - no row otherwise: `UserNotFound`
    /// - row + `Deposit`/`Withdraw`: adjusts the balance; a CHECK violation
    ///   rolls back and surfaces `NegativeBalance`
    /// - row + `Registration`: `WrongParamType`
    ///
    /// Exactly one transaction-log row is written per successful mutation,
    /// in the same transaction as the balance change.
    async fn add_loyalty(
        &self,
        target: UserId,
        operation: Operation,
        amount: i64,
        comment: &str,
    ) -> LedgerResult<LoyaltyAccount>;

    /// Current balance; `UserNotFound` when no account exists.
    async fn get_loyalty(&self, target: UserId) -> LedgerResult<LoyaltyAccount>;

    /// Ping-style connectivity probe.
    async fn health_check(&self) -> LedgerResult<()>;
}

/// Postgres-backed ledger store.
///
/// Writes (the transactional `add_loyalty` path) always go to the master;
/// reads go to the replica when one is configured.
pub struct PgLedgerStore {
    read: PgPool,
    write: PgPool,
}

impl PgLedgerStore {
    /// Connects both pools and verifies connectivity.
    pub async fn connect(settings: &LedgerSettings) -> LedgerResult<Self> {
        let write = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.master_dsn)
            .await
            .map_err(|e| LedgerError::Storage(format!("couldn't open master pool: {}", e)))?;

        let read = match &settings.replica_dsn {
            Some(dsn) => PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(dsn)
                .await
                .map_err(|e| LedgerError::Storage(format!("couldn't open replica pool: {}", e)))?,
            None => write.clone(),
        };

        Ok(Self { read, write })
    }

    /// Wraps existing pools (tests, shared pool setups).
    pub fn from_pools(read: PgPool, write: PgPool) -> Self {
        Self { read, write }
    }

    fn map_update_error(e: sqlx::Error) -> LedgerError {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(CHECK_VIOLATION) {
                return LedgerError::NegativeBalance;
            }
        }
        LedgerError::Storage(e.to_string())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn add_loyalty(
        &self,
        target: UserId,
        operation: Operation,
        amount: i64,
        comment: &str,
    ) -> LedgerResult<LoyaltyAccount> {
        let uuid = target.as_uuid();
        let mut tx = self
            .write
            .begin()
            .await
            .map_err(|e| LedgerError::Storage(format!("failed to begin transaction: {}", e)))?;

        // Lock the account row for the rest of the transaction.
        let locked: Option<(Uuid, i64)> = sqlx::query_as(
            "SELECT uuid, balance FROM loyalty_app.accounts WHERE uuid = $1 FOR UPDATE",
        )
        .bind(uuid)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let balance = match locked {
            None => {
                if operation != Operation::Registration {
                    // Deposit/withdraw against a nonexistent account.
                    return Err(LedgerError::UserNotFound);
                }
                sqlx::query("INSERT INTO loyalty_app.accounts (uuid, balance) VALUES ($1, $2)")
                    .bind(uuid)
                    .bind(amount)
                    .execute(&mut *tx)
                    .await
                    .map_err(Self::map_update_error)?;
                debug!("loyalty account created for {}", target);

                sqlx::query(
                    "INSERT INTO loyalty_app.loyalty_transactions \
                     (account_uuid, transaction_amount, transaction_type, comment) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(uuid)
                .bind(amount)
                .bind(Operation::Deposit.code())
                .bind(comment)
                .execute(&mut *tx)
                .await
                .map_err(|e| LedgerError::Storage(e.to_string()))?;

                amount
            }
            Some(_) => {
                let query = match operation {
                    Operation::Deposit => {
                        "UPDATE loyalty_app.accounts SET balance = balance + $1 \
                         WHERE uuid = $2 RETURNING balance"
                    }
                    Operation::Withdraw => {
                        "UPDATE loyalty_app.accounts SET balance = balance - $1 \
                         WHERE uuid = $2 RETURNING balance"
                    }
                    // Account creation is meaningful exactly once.
                    Operation::Registration => return Err(LedgerError::WrongParamType),
                };

                let (balance,): (i64,) = sqlx::query_as(query)
                    .bind(amount)
                    .bind(uuid)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(Self::map_update_error)?;

                sqlx::query(
                    "INSERT INTO loyalty_app.loyalty_transactions \
                     (account_uuid, transaction_amount, transaction_type, comment) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(uuid)
                .bind(amount)
                .bind(operation.code())
                .bind(comment)
                .execute(&mut *tx)
                .await
                .map_err(|e| LedgerError::Storage(e.to_string()))?;

                balance
            }
        };

        tx.commit()
            .await
            .map_err(|e| LedgerError::Storage(format!("failed to commit: {}", e)))?;

        Ok(LoyaltyAccount {
            uuid: target,
            balance,
        })
    }

    async fn get_loyalty(&self, target: UserId) -> LedgerResult<LoyaltyAccount> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM loyalty_app.accounts WHERE uuid = $1")
                .bind(target.as_uuid())
                .fetch_optional(&self.read)
                .await
                .map_err(|e| LedgerError::Storage(e.to_string()))?;

        match row {
            Some((balance,)) => Ok(LoyaltyAccount {
                uuid: target,
                balance,
            }),
            None => Err(LedgerError::UserNotFound),
        }
    }

    async fn health_check(&self) -> LedgerResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.write)
            .await
            .map_err(|e| LedgerError::Storage(format!("couldn't ping database: {}", e)))?;
        Ok(())
    }
}
