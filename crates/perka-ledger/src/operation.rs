//! Ledger operation codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// What a ledger mutation does.
///
/// Wire codes: "registration" creates the account, "d" deposits, "w"
/// withdraws. Anything else is rejected before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "registration")]
    Registration,
    #[serde(rename = "d")]
    Deposit,
    #[serde(rename = "w")]
    Withdraw,
}

impl Operation {
    /// The wire/storage code for this operation.
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Registration => "registration",
            Operation::Deposit => "d",
            Operation::Withdraw => "w",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "registration" => Ok(Operation::Registration),
            "d" => Ok(Operation::Deposit),
            "w" => Ok(Operation::Withdraw),
            _ => Err(LedgerError::WrongParamType),
        }
    }
}
