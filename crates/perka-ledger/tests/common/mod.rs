//! In-memory fakes mirroring the ledger's external collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use perka_commons::UserId;
use perka_ledger::{LedgerError, LedgerResult, LedgerStore, LoyaltyAccount, Operation};
use perka_sso_client::SsoGateway;

#[derive(Default)]
struct AccountRow {
    exists: bool,
    balance: i64,
}

/// One transaction-log row, as the store would persist it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub account: UserId,
    pub amount: i64,
    pub kind: &'static str,
    pub comment: String,
}

/// In-memory ledger store mirroring the Postgres row-lock semantics: one
/// async mutex per account plays the part of `SELECT … FOR UPDATE`, held
/// for the whole mutation, so same-account operations serialize while
/// distinct accounts run in parallel.
pub struct MemoryLedgerStore {
    rows: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<AccountRow>>>>,
    log: Mutex<Vec<LogEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn log_for(&self, account: UserId) -> Vec<LogEntry> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.account == account)
            .cloned()
            .collect()
    }

    fn push_log(&self, account: UserId, amount: i64, kind: &'static str, comment: &str) {
        self.log.lock().unwrap().push(LogEntry {
            account,
            amount,
            kind,
            comment: comment.to_string(),
        });
    }

    fn row(&self, target: UserId) -> Arc<tokio::sync::Mutex<AccountRow>> {
        self.rows
            .lock()
            .unwrap()
            .entry(target)
            .or_default()
            .clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn add_loyalty(
        &self,
        target: UserId,
        operation: Operation,
        amount: i64,
        comment: &str,
    ) -> LedgerResult<LoyaltyAccount> {
        let row = self.row(target);
        // Held until return: the row lock.
        let mut guard = row.lock().await;

        if !guard.exists {
            if operation != Operation::Registration {
                return Err(LedgerError::UserNotFound);
            }
            if amount < 0 {
                return Err(LedgerError::NegativeBalance);
            }
            guard.exists = true;
            guard.balance = amount;
            self.push_log(target, amount, Operation::Deposit.code(), comment);
        } else {
            match operation {
                Operation::Registration => return Err(LedgerError::WrongParamType),
                Operation::Deposit => {
                    guard.balance += amount;
                    self.push_log(target, amount, operation.code(), comment);
                }
                Operation::Withdraw => {
                    if guard.balance - amount < 0 {
                        return Err(LedgerError::NegativeBalance);
                    }
                    guard.balance -= amount;
                    self.push_log(target, amount, operation.code(), comment);
                }
            }
        }

        Ok(LoyaltyAccount {
            uuid: target,
            balance: guard.balance,
        })
    }

    async fn get_loyalty(&self, target: UserId) -> LedgerResult<LoyaltyAccount> {
        let row = self.row(target);
        let guard = row.lock().await;
        if !guard.exists {
            return Err(LedgerError::UserNotFound);
        }
        Ok(LoyaltyAccount {
            uuid: target,
            balance: guard.balance,
        })
    }

    async fn health_check(&self) -> LedgerResult<()> {
        Ok(())
    }
}

/// Scriptable SSO gateway.
pub struct StubGateway {
    valid: AtomicBool,
    admins: Mutex<HashSet<UserId>>,
    admin_calls: AtomicUsize,
}

impl StubGateway {
    pub fn new(valid: bool) -> Self {
        Self {
            valid: AtomicBool::new(valid),
            admins: Mutex::new(HashSet::new()),
            admin_calls: AtomicUsize::new(0),
        }
    }

    pub fn grant_admin(&self, user_id: UserId) {
        self.admins.lock().unwrap().insert(user_id);
    }

    pub fn admin_calls(&self) -> usize {
        self.admin_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SsoGateway for StubGateway {
    async fn is_jwt_valid(&self, _token: &str) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    async fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_calls.fetch_add(1, Ordering::SeqCst);
        self.admins.lock().unwrap().contains(&user_id)
    }
}

/// Signs a minimal token carrying `uid`/`email` claims, for the facade's
/// local claim extraction.
pub fn token_for(uid: UserId) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    #[derive(serde::Serialize)]
    struct Claims {
        token_type: &'static str,
        uid: String,
        email: String,
        exp: i64,
    }

    let claims = Claims {
        token_type: "access",
        uid: uid.to_string(),
        email: "member@example.com".to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"ledger-test-secret"),
    )
    .unwrap()
}
