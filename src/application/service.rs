use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Account, AccountId, Cents};
use crate::io::{ScriptCommand, ScriptLine};
use crate::remote::{RandomSource, ThreadRngSource};

use super::AppError;

/// Application service managing named in-memory accounts.
/// This is the primary interface for any client (CLI, scripts, tests).
pub struct LedgerService {
    accounts: HashMap<String, Account>,
    source: Arc<dyn RandomSource>,
}

/// Balance of a single named account.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceEntry {
    pub account: String,
    pub balance_cents: Cents,
}

/// Outcome of one executed script operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OpOutcome {
    /// The operation applied; `balance_cents` is the primary account's
    /// balance afterwards.
    Applied { balance_cents: Cents },
    Rejected { error: String },
}

/// One line of the operation log produced by a script run.
#[derive(Debug, Clone, Serialize)]
pub struct OpRecord {
    pub line: usize,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    #[serde(flatten)]
    pub outcome: OpOutcome,
}

impl LedgerService {
    /// Create a service drawing remote balances from the production source.
    pub fn new() -> Self {
        Self::with_source(Arc::new(ThreadRngSource))
    }

    /// Create a service with an injected randomness source.
    pub fn with_source(source: Arc<dyn RandomSource>) -> Self {
        Self {
            accounts: HashMap::new(),
            source,
        }
    }

    /// Open a new named account.
    ///
    /// Unlike raw `Account` construction, this validates the initial balance:
    /// the service is the caller responsible for never seeding a negative one.
    pub fn open_account(&mut self, name: &str, initial_balance: Cents) -> Result<AccountId, AppError> {
        if self.accounts.contains_key(name) {
            return Err(AppError::AccountAlreadyExists(name.to_string()));
        }
        if initial_balance < 0 {
            return Err(AppError::InvalidAmount(
                "initial balance must not be negative".to_string(),
            ));
        }

        let account = Account::with_source(initial_balance, Arc::clone(&self.source));
        let id = account.id();
        self.accounts.insert(name.to_string(), account);
        Ok(id)
    }

    /// Get an account handle by name.
    pub fn account(&self, name: &str) -> Result<&Account, AppError> {
        self.accounts
            .get(name)
            .ok_or_else(|| AppError::AccountNotFound(name.to_string()))
    }

    /// Balance of a single account.
    pub fn balance(&self, name: &str) -> Result<Cents, AppError> {
        Ok(self.account(name)?.balance())
    }

    /// Balances of all accounts, sorted by name.
    pub fn balances(&self) -> Vec<BalanceEntry> {
        let mut entries: Vec<BalanceEntry> = self
            .accounts
            .iter()
            .map(|(name, account)| BalanceEntry {
                account: name.clone(),
                balance_cents: account.balance(),
            })
            .collect();
        entries.sort_by(|a, b| a.account.cmp(&b.account));
        entries
    }

    /// Deposit into a named account; returns the new balance.
    pub fn deposit(&self, name: &str, amount: Cents) -> Result<Cents, AppError> {
        let account = self.account(name)?;
        account.deposit(amount)?;
        Ok(account.balance())
    }

    /// Withdraw from a named account; returns the new balance.
    pub fn withdraw(&self, name: &str, amount: Cents) -> Result<Cents, AppError> {
        let account = self.account(name)?;
        account.withdraw(amount)?;
        Ok(account.balance())
    }

    /// Transfer between two named accounts; returns the source's new balance.
    pub fn transfer(&self, from: &str, to: &str, amount: Cents) -> Result<Cents, AppError> {
        let from_account = self.account(from)?;
        let to_account = self.account(to)?;
        from_account.transfer(amount, to_account)?;
        Ok(from_account.balance())
    }

    /// Reconcile a named account against the remote source; returns the new
    /// balance.
    pub async fn synchronize(&self, name: &str) -> Result<Cents, AppError> {
        let account = self.account(name)?;
        account.synchronize_balance().await?;
        Ok(account.balance())
    }

    /// Execute a parsed operation script.
    ///
    /// Failed operations are recorded in the log and do not stop the run.
    pub async fn run_script(&mut self, script: &[ScriptLine]) -> Vec<OpRecord> {
        let mut records = Vec::with_capacity(script.len());
        for line in script {
            let outcome = match self.execute(&line.command).await {
                Ok(balance_cents) => OpOutcome::Applied { balance_cents },
                Err(error) => OpOutcome::Rejected {
                    error: error.to_string(),
                },
            };
            records.push(OpRecord {
                line: line.number,
                timestamp: Utc::now(),
                operation: line.command.to_string(),
                outcome,
            });
        }
        records
    }

    async fn execute(&mut self, command: &ScriptCommand) -> Result<Cents, AppError> {
        match command {
            ScriptCommand::Open { account, initial } => {
                self.open_account(account, *initial)?;
                self.balance(account)
            }
            ScriptCommand::Deposit { account, amount } => self.deposit(account, *amount),
            ScriptCommand::Withdraw { account, amount } => self.withdraw(account, *amount),
            ScriptCommand::Transfer { from, to, amount } => self.transfer(from, to, *amount),
            ScriptCommand::Sync { account } => self.synchronize(account).await,
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
