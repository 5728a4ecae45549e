use crate::types::{
    CycleSlot, Error, GlobalCycle, IncomeConfig, IncomeRecord, Rank, ReEntry, Transaction, User,
};
use soroban_sdk::{Address, Env, String, Symbol, Vec};

/// Manages administrative operations
pub trait AdminOperations {
    /// Initialize contract with admin address and rank table
    fn initialize(env: &Env, admin: &Address, ranks: Vec<Rank>) -> Result<(), Error>;

    /// get admin address
    fn get_admin(env: &Env) -> Result<Address, Error>;

    /// Transfer admin rights to new address
    fn transfer_admin(env: &Env, new_admin: &Address) -> Result<(), Error>;

    /// Pause contract operations (emergency)
    fn pause_contract(env: &Env) -> Result<(), Error>;

    /// Resume contract operations
    fn resume_contract(env: &Env) -> Result<(), Error>;

    /// Check if contract is paused
    fn get_paused_state(env: &Env) -> Result<bool, Error>;

    /// Replace commission rates and cycle parameters
    fn set_income_config(env: &Env, config: IncomeConfig) -> Result<(), Error>;

    fn get_income_config(env: &Env) -> Result<IncomeConfig, Error>;

    /// Replace the rank table
    fn set_ranks(env: &Env, ranks: Vec<Rank>) -> Result<(), Error>;

    /// Move an income record from pending to processed
    fn settle_income(env: &Env, income_id: u64) -> Result<IncomeRecord, Error>;
}

/// Read access to the rank table
pub trait RankOperations {
    fn get_ranks(env: &Env) -> Result<Vec<Rank>, Error>;

    fn get_rank(env: &Env, name: &Symbol) -> Result<Rank, Error>;

    /// The rank one index above `name`, if any
    fn get_next_rank(env: &Env, name: &Symbol) -> Result<Option<Rank>, Error>;
}

/// Member lifecycle and wallet operations
pub trait MembershipOperations {
    /// Register a new member under an existing sponsor
    fn register(env: &Env, user: &Address, sponsor: &Address) -> Result<(), Error>;

    /// First activation at `rank`, then income distribution
    fn activate(env: &Env, user: &Address, rank: &Symbol, transaction_id: &String)
        -> Result<(), Error>;

    /// Repeat purchase by an active member, then income distribution
    fn retopup(env: &Env, user: &Address, rank: &Symbol, transaction_id: &String)
        -> Result<(), Error>;

    /// Debit the balance and queue a withdrawal for review
    fn request_withdrawal(env: &Env, user: &Address, amount: i128) -> Result<u64, Error>;

    fn approve_withdrawal(env: &Env, transaction_id: u64) -> Result<(), Error>;

    /// Reject a queued withdrawal and return the funds
    fn reject_withdrawal(env: &Env, transaction_id: u64) -> Result<(), Error>;

    fn get_user(env: &Env, user: &Address) -> Result<User, Error>;

    fn is_registered(env: &Env, user: &Address) -> Result<bool, Error>;

    fn get_balance(env: &Env, user: &Address) -> Result<i128, Error>;

    /// Page of a member's income records, oldest first
    fn get_user_incomes(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<IncomeRecord>, Error>;

    fn get_user_income_count(env: &Env, user: &Address) -> Result<u32, Error>;

    /// Page of a member's history, oldest first
    fn get_user_transactions(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, Error>;

    fn get_user_transaction_count(env: &Env, user: &Address) -> Result<u32, Error>;

    fn get_income(env: &Env, income_id: u64) -> Result<IncomeRecord, Error>;

    fn get_transaction(env: &Env, transaction_id: u64) -> Result<Transaction, Error>;

    fn get_reentries(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ReEntry>, Error>;

    fn get_reentry_count(env: &Env, user: &Address) -> Result<u32, Error>;
}

/// Income distribution
pub trait IncomeOperations {
    /// Pay referral (or re-topup), level and global income for one activation
    fn process_all_incomes(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Symbol,
        is_retopup: bool,
    ) -> Result<(), Error>;

    /// Sponsors above `user`, nearest first, at most `depth` of them
    fn get_upline_chain(env: &Env, user: &Address, depth: u32) -> Vec<Address>;

    fn check_level_income_eligibility(env: &Env, user: &Address) -> bool;

    fn check_global_income_eligibility(env: &Env, rank: &Symbol) -> Result<bool, Error>;

    fn is_transaction_processed(env: &Env, transaction_id: &String) -> bool;
}

/// Global cycle payouts and reads
pub trait CycleOperations {
    /// Pay up to `max_seats` more seats of a completed cycle
    fn process_cycle_payout(env: &Env, cycle_id: u64, max_seats: u32) -> Result<(), Error>;

    fn get_cycle(env: &Env, cycle_id: u64) -> Result<GlobalCycle, Error>;

    fn get_active_cycle(env: &Env, rank: &Symbol) -> Option<GlobalCycle>;

    fn get_cycle_participants(env: &Env, cycle_id: u64) -> Result<Vec<Address>, Error>;

    fn get_cycle_slot(env: &Env, cycle_id: u64, position: u32) -> Result<CycleSlot, Error>;
}

/// Handles system metrics and monitoring
pub trait MetricsOperations {
    /// Get total registered users
    fn get_total_users(env: &Env) -> Result<u32, Error>;

    /// Get total income credited
    fn get_total_distributed(env: &Env) -> Result<i128, Error>;

    /// Get system statistics
    fn get_system_metrics(env: &Env) -> Result<Vec<(String, i128)>, Error>;
}
