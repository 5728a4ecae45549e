use crate::types::IncomeType;
use soroban_sdk::{contracttype, symbol_short, Address, Symbol};

// Income credited to a member.
pub const INCOME: Symbol = symbol_short!("income");

// A global cycle filled up.
pub const CYCLE: Symbol = symbol_short!("cycle");

// A batch of cycle seats was paid.
pub const PAYOUT: Symbol = symbol_short!("payout");

// A cycle leader advanced to the next rank.
pub const AUTO_TOPUP: Symbol = symbol_short!("autotopup");

// A RE-ID was issued at the top rank.
pub const REENTRY: Symbol = symbol_short!("reentry");

pub const REGISTER: Symbol = symbol_short!("register");
pub const ACTIVATE: Symbol = symbol_short!("activate");
pub const RETOPUP: Symbol = symbol_short!("retopup");
pub const WITHDRAW: Symbol = symbol_short!("withdraw");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncomeCredited {
    pub income_id: u64,
    pub income_type: IncomeType,
    pub amount: i128,
    pub source_uid: Address,
    pub level: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleCompleted {
    pub cycle_id: u64,
    pub participants: u32,
    pub completed_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CyclePayoutProgress {
    pub cycle_id: u64,
    pub paid_through: u32,
    pub seats: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AutoTopupApplied {
    pub transaction_id: u64,
    pub from_rank: Symbol,
    pub to_rank: Symbol,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReEntryCreated {
    pub reentry_id: u64,
    pub rank: Symbol,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawalUpdated {
    pub transaction_id: u64,
    pub amount: i128,
    pub status: crate::types::TransactionStatus,
}
