use std::fmt;

use crate::application::AppError;
use crate::domain::{Cents, format_cents, parse_cents};

/// One ledger operation from a script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Open { account: String, initial: Cents },
    Deposit { account: String, amount: Cents },
    Withdraw { account: String, amount: Cents },
    Transfer { from: String, to: String, amount: Cents },
    Sync { account: String },
}

/// A parsed command together with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub number: usize,
    pub command: ScriptCommand,
}

/// Parse an operation script.
///
/// One command per line; blank lines and `#` comments are skipped. Amounts use
/// the usual decimal money format ("50.00" or "50").
///
/// ```text
/// open checking 100.00
/// open savings 50
/// transfer checking savings 25.00
/// sync checking
/// ```
pub fn parse_script(input: &str) -> Result<Vec<ScriptLine>, AppError> {
    let mut lines = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let command = match fields.as_slice() {
            ["open", account, amount] => ScriptCommand::Open {
                account: account.to_string(),
                initial: parse_amount(amount, number)?,
            },
            ["deposit", account, amount] => ScriptCommand::Deposit {
                account: account.to_string(),
                amount: parse_amount(amount, number)?,
            },
            ["withdraw", account, amount] => ScriptCommand::Withdraw {
                account: account.to_string(),
                amount: parse_amount(amount, number)?,
            },
            ["transfer", from, to, amount] => ScriptCommand::Transfer {
                from: from.to_string(),
                to: to.to_string(),
                amount: parse_amount(amount, number)?,
            },
            ["sync", account] => ScriptCommand::Sync {
                account: account.to_string(),
            },
            _ => {
                return Err(AppError::Script {
                    line: number,
                    message: format!("unrecognized command: {}", line),
                });
            }
        };

        lines.push(ScriptLine { number, command });
    }

    Ok(lines)
}

fn parse_amount(raw: &str, line: usize) -> Result<Cents, AppError> {
    parse_cents(raw).map_err(|_| AppError::Script {
        line,
        message: format!("invalid amount: {}", raw),
    })
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Open { account, initial } => {
                write!(f, "open {} {}", account, format_cents(*initial))
            }
            ScriptCommand::Deposit { account, amount } => {
                write!(f, "deposit {} {}", account, format_cents(*amount))
            }
            ScriptCommand::Withdraw { account, amount } => {
                write!(f, "withdraw {} {}", account, format_cents(*amount))
            }
            ScriptCommand::Transfer { from, to, amount } => {
                write!(f, "transfer {} {} {}", from, to, format_cents(*amount))
            }
            ScriptCommand::Sync { account } => write!(f, "sync {}", account),
        }
    }
}
