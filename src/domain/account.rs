use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{Cents, format_cents};
use crate::remote::{RandomSource, ThreadRngSource};

pub type AccountId = Uuid;

/// Upper bound for balances reported by the simulated remote ledger.
const REMOTE_BALANCE_MAX: Cents = 10_000;

/// A ledger account holding a single non-negative balance.
///
/// `Account` is a cheap handle: cloning it yields another handle to the same
/// account, and all handles observe the same balance. Synchronous operations
/// (deposit, withdraw, transfer) validate their invariants before mutating;
/// `synchronize_balance` overwrites the balance with whatever the remote
/// source reports, since reconciliation is authoritative.
///
/// Construction does not validate the initial balance. Callers opening
/// accounts on behalf of users are expected to check it (see
/// `LedgerService::open_account`).
#[derive(Clone)]
pub struct Account {
    id: AccountId,
    balance: Arc<Mutex<Cents>>,
    source: Arc<dyn RandomSource>,
}

impl Account {
    /// Create an account backed by the production randomness source.
    pub fn new(initial_balance: Cents) -> Self {
        Self::with_source(initial_balance, Arc::new(ThreadRngSource))
    }

    /// Create an account drawing remote balances from the given source.
    pub fn with_source(initial_balance: Cents, source: Arc<dyn RandomSource>) -> Self {
        Self {
            id: Uuid::new_v4(),
            balance: Arc::new(Mutex::new(initial_balance)),
            source,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Current balance. Never fails.
    pub fn balance(&self) -> Cents {
        *self.lock()
    }

    /// Returns true if both handles refer to the same account.
    pub fn same_account(&self, other: &Account) -> bool {
        Arc::ptr_eq(&self.balance, &other.balance)
    }

    /// Increase the balance by `amount`. Rejects non-positive amounts.
    pub fn deposit(&self, amount: Cents) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }
        *self.lock() += amount;
        Ok(())
    }

    /// Decrease the balance by `amount`. Rejects non-positive amounts and
    /// debits that would take the balance below zero.
    pub fn withdraw(&self, amount: Cents) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }
        let mut balance = self.lock();
        if amount > *balance {
            return Err(AccountError::InsufficientFunds {
                balance: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    /// Move `amount` from this account to `destination` as one atomic step.
    ///
    /// Transfers to the same account are always rejected, before any other
    /// check. Both balances are updated under both locks, so no intermediate
    /// state is observable from other handles.
    pub fn transfer(&self, amount: Cents, destination: &Account) -> Result<(), AccountError> {
        if self.same_account(destination) {
            return Err(AccountError::TransferFailed);
        }
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }

        // Lock both accounts in a stable address order so concurrent
        // opposite-direction transfers cannot deadlock.
        let (mut from, mut to) =
            if Arc::as_ptr(&self.balance) < Arc::as_ptr(&destination.balance) {
                let from = self.lock();
                let to = destination.lock();
                (from, to)
            } else {
                let to = destination.lock();
                let from = self.lock();
                (from, to)
            };

        if amount > *from {
            return Err(AccountError::InsufficientFunds {
                balance: *from,
                requested: amount,
            });
        }
        *from -= amount;
        *to += amount;
        Ok(())
    }

    /// Simulate an unreliable read of the remote balance.
    ///
    /// Draws a balance, then a coin flip deciding whether the request made it
    /// through. A failed request resolves to `None`; this never errors.
    pub async fn fetch_balance(&self) -> Option<Cents> {
        let remote = self.source.draw(0, REMOTE_BALANCE_MAX).await;
        let request_failed = self.source.draw(0, 1).await == 0;
        if request_failed { None } else { Some(remote) }
    }

    /// Overwrite the local balance with the remote one.
    ///
    /// The fetched value is authoritative and bypasses the deposit/withdraw
    /// checks. A failed fetch leaves the balance untouched.
    pub async fn synchronize_balance(&self) -> Result<(), AccountError> {
        debug!("fetching remote balance for account {}", self.id);
        match self.fetch_balance().await {
            Some(remote) => {
                let mut balance = self.lock();
                debug!(
                    "account {} resynchronized: {} -> {}",
                    self.id,
                    format_cents(*balance),
                    format_cents(remote)
                );
                *balance = remote;
                Ok(())
            }
            None => {
                warn!("balance synchronization failed for account {}", self.id);
                Err(AccountError::SynchronizationFailed)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cents> {
        self.balance.lock().expect("account balance lock poisoned")
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("balance", &self.balance())
            .finish()
    }
}

/// Failures raised by account operations. A failed operation never leaves a
/// partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// A debit would take the balance below zero. Recoverable by the caller.
    InsufficientFunds { balance: Cents, requested: Cents },
    /// Source and destination of a transfer are the same account.
    TransferFailed,
    /// The simulated remote fetch signaled failure. Retrying is the caller's call.
    SynchronizationFailed,
    /// A non-positive amount was passed to deposit, withdraw or transfer.
    InvalidAmount(Cents),
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::InsufficientFunds { balance, requested } => {
                write!(
                    f,
                    "insufficient funds: balance {}, requested {}",
                    format_cents(*balance),
                    format_cents(*requested)
                )
            }
            AccountError::TransferFailed => {
                write!(f, "transfer failed: source and destination are the same account")
            }
            AccountError::SynchronizationFailed => write!(f, "balance synchronization failed"),
            AccountError::InvalidAmount(amount) => {
                write!(f, "invalid amount: {}", format_cents(*amount))
            }
        }
    }
}

impl std::error::Error for AccountError {}
