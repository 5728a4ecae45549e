#![no_std]
use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol, Vec};

pub mod admin;
pub mod cycle;
pub mod events;
pub mod helpers;
pub mod income;
pub mod interface;
pub mod ledger;
pub mod membership;
pub mod metrics;
pub mod money;
pub mod ranks;
pub mod types;

use admin::AdminModule;
use cycle::GlobalCycleManager;
use income::IncomeEngine;
use interface::*;
use membership::MembershipModule;
use metrics::MetricsModule;
use ranks::RankTable;
pub use types::*;

#[contract]
pub struct IncomeEngineContract;

#[contractimpl]
impl IncomeEngineContract {
    /// Initializes the contract with an admin address and the rank table.
    /// The admin becomes the root member every sponsor chain ends at.
    ///
    /// # Arguments
    /// * `admin` - The address of the contract administrator
    /// * `ranks` - Ordered rank table (indexes 1..N, increasing amounts)
    pub fn initialize(env: Env, admin: Address, ranks: Vec<Rank>) -> Result<(), Error> {
        AdminModule::initialize(&env, &admin, ranks)
    }

    /// get admin address
    pub fn get_admin(env: Env) -> Result<Address, Error> {
        AdminModule::get_admin(&env)
    }

    /// Transfers admin rights to a new address
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        AdminModule::transfer_admin(&env, &new_admin)
    }

    /// Pauses all member-facing operations
    pub fn pause_contract(env: Env) -> Result<(), Error> {
        AdminModule::pause_contract(&env)
    }

    /// Resumes contract operations after being paused
    pub fn resume_contract(env: Env) -> Result<(), Error> {
        AdminModule::resume_contract(&env)
    }

    pub fn get_paused_state(env: Env) -> Result<bool, Error> {
        AdminModule::get_paused_state(&env)
    }

    /// Replaces commission rates and cycle parameters
    ///
    /// # Arguments
    /// * `config` - Rates in basis points plus cycle size, payout levels and re-entry switch
    pub fn set_income_config(env: Env, config: IncomeConfig) -> Result<(), Error> {
        AdminModule::set_income_config(&env, config)
    }

    pub fn get_income_config(env: Env) -> Result<IncomeConfig, Error> {
        AdminModule::get_income_config(&env)
    }

    /// Replaces the rank table
    pub fn set_ranks(env: Env, ranks: Vec<Rank>) -> Result<(), Error> {
        AdminModule::set_ranks(&env, ranks)
    }

    pub fn get_ranks(env: Env) -> Result<Vec<Rank>, Error> {
        RankTable::get_ranks(&env)
    }

    pub fn get_rank(env: Env, name: Symbol) -> Result<Rank, Error> {
        RankTable::get_rank(&env, &name)
    }

    pub fn get_next_rank(env: Env, name: Symbol) -> Result<Option<Rank>, Error> {
        RankTable::get_next_rank(&env, &name)
    }

    /// Marks a pending income record as processed
    pub fn settle_income(env: Env, income_id: u64) -> Result<IncomeRecord, Error> {
        AdminModule::settle_income(&env, income_id)
    }

    /// Registers a new member under an existing sponsor
    ///
    /// # Arguments
    /// * `user` - The address of the new member
    /// * `sponsor` - The address of the referring member
    pub fn register(env: Env, user: Address, sponsor: Address) -> Result<(), Error> {
        MembershipModule::register(&env, &user, &sponsor)
    }

    /// Activates a member at `rank` once payment has cleared, then pays
    /// commissions for the activation
    ///
    /// # Arguments
    /// * `user` - The member being activated
    /// * `rank` - Rank purchased
    /// * `transaction_id` - Payment reference; each one is processed once
    pub fn activate(
        env: Env,
        user: Address,
        rank: Symbol,
        transaction_id: String,
    ) -> Result<(), Error> {
        MembershipModule::activate(&env, &user, &rank, &transaction_id)
    }

    /// Re-purchase by an active member; the sponsor earns re-topup income
    pub fn retopup(
        env: Env,
        user: Address,
        rank: Symbol,
        transaction_id: String,
    ) -> Result<(), Error> {
        MembershipModule::retopup(&env, &user, &rank, &transaction_id)
    }

    /// Debits `amount` and queues a withdrawal for admin review
    pub fn request_withdrawal(env: Env, user: Address, amount: i128) -> Result<u64, Error> {
        MembershipModule::request_withdrawal(&env, &user, amount)
    }

    pub fn approve_withdrawal(env: Env, transaction_id: u64) -> Result<(), Error> {
        MembershipModule::approve_withdrawal(&env, transaction_id)
    }

    /// Rejects a queued withdrawal and returns the funds to the balance
    pub fn reject_withdrawal(env: Env, transaction_id: u64) -> Result<(), Error> {
        MembershipModule::reject_withdrawal(&env, transaction_id)
    }

    pub fn get_user(env: Env, user: Address) -> Result<User, Error> {
        MembershipModule::get_user(&env, &user)
    }

    pub fn is_registered(env: Env, user: Address) -> Result<bool, Error> {
        MembershipModule::is_registered(&env, &user)
    }

    pub fn get_balance(env: Env, user: Address) -> Result<i128, Error> {
        MembershipModule::get_balance(&env, &user)
    }

    /// Page of a member's income records, oldest first. At most 100 per call.
    pub fn get_user_incomes(
        env: Env,
        user: Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<IncomeRecord>, Error> {
        MembershipModule::get_user_incomes(&env, &user, offset, limit)
    }

    pub fn get_user_income_count(env: Env, user: Address) -> Result<u32, Error> {
        MembershipModule::get_user_income_count(&env, &user)
    }

    /// Page of a member's history, oldest first. At most 100 per call.
    pub fn get_user_transactions(
        env: Env,
        user: Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, Error> {
        MembershipModule::get_user_transactions(&env, &user, offset, limit)
    }

    pub fn get_user_transaction_count(env: Env, user: Address) -> Result<u32, Error> {
        MembershipModule::get_user_transaction_count(&env, &user)
    }

    pub fn get_income(env: Env, income_id: u64) -> Result<IncomeRecord, Error> {
        MembershipModule::get_income(&env, income_id)
    }

    pub fn get_transaction(env: Env, transaction_id: u64) -> Result<Transaction, Error> {
        MembershipModule::get_transaction(&env, transaction_id)
    }

    pub fn get_reentries(
        env: Env,
        user: Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ReEntry>, Error> {
        MembershipModule::get_reentries(&env, &user, offset, limit)
    }

    pub fn get_reentry_count(env: Env, user: Address) -> Result<u32, Error> {
        MembershipModule::get_reentry_count(&env, &user)
    }

    /// Distributes referral (or re-topup), level and global income for one
    /// activation event. Admin only.
    ///
    /// # Arguments
    /// * `activator` - Member whose purchase generates the income
    /// * `activation_amount` - Purchase amount in cents
    /// * `transaction_id` - Payment reference; a repeat is rejected
    /// * `rank` - Rank purchased
    /// * `is_retopup` - Pay re-topup instead of referral income to the sponsor
    pub fn process_all_incomes(
        env: Env,
        activator: Address,
        activation_amount: i128,
        transaction_id: String,
        rank: Symbol,
        is_retopup: bool,
    ) -> Result<(), Error> {
        IncomeEngine::process_all_incomes(
            &env,
            &activator,
            activation_amount,
            &transaction_id,
            &rank,
            is_retopup,
        )
    }

    /// Sponsors above `user`, nearest first
    pub fn get_upline_chain(env: Env, user: Address, depth: u32) -> Vec<Address> {
        IncomeEngine::get_upline_chain(&env, &user, depth)
    }

    pub fn check_level_income_eligibility(env: Env, user: Address) -> bool {
        IncomeEngine::check_level_income_eligibility(&env, &user)
    }

    pub fn check_global_income_eligibility(env: Env, rank: Symbol) -> Result<bool, Error> {
        IncomeEngine::check_global_income_eligibility(&env, &rank)
    }

    pub fn is_transaction_processed(env: Env, transaction_id: String) -> bool {
        IncomeEngine::is_transaction_processed(&env, &transaction_id)
    }

    pub fn calculate_referral_income(env: Env, activation_amount: i128) -> Result<i128, Error> {
        let config = AdminModule::get_income_config(&env)?;
        Ok(money::calculate_referral_income(activation_amount, &config))
    }

    pub fn calculate_retopup_income(env: Env, activation_amount: i128) -> Result<i128, Error> {
        let config = AdminModule::get_income_config(&env)?;
        Ok(money::calculate_retopup_income(activation_amount, &config))
    }

    pub fn calculate_level_income(
        env: Env,
        level: u32,
        activation_amount: i128,
    ) -> Result<i128, Error> {
        let config = AdminModule::get_income_config(&env)?;
        Ok(money::calculate_level_income(level, activation_amount, &config))
    }

    pub fn calculate_global_income(total_amount: i128, level: u32, total_levels: u32) -> i128 {
        money::calculate_global_income(total_amount, level, total_levels)
    }

    /// Pays the next batch of seats of a completed cycle. The leader is
    /// advanced once the last seat is paid. Admin only.
    ///
    /// # Arguments
    /// * `cycle_id` - Completed cycle with seats still unpaid
    /// * `max_seats` - Seats to settle in this call
    pub fn process_cycle_payout(env: Env, cycle_id: u64, max_seats: u32) -> Result<(), Error> {
        GlobalCycleManager::process_cycle_payout(&env, cycle_id, max_seats)
    }

    pub fn get_cycle(env: Env, cycle_id: u64) -> Result<GlobalCycle, Error> {
        GlobalCycleManager::get_cycle(&env, cycle_id)
    }

    /// The open cycle for `rank`, if one exists
    pub fn get_active_cycle(env: Env, rank: Symbol) -> Option<GlobalCycle> {
        GlobalCycleManager::get_active_cycle(&env, &rank)
    }

    /// Participants of a cycle in seat order
    pub fn get_cycle_participants(env: Env, cycle_id: u64) -> Result<Vec<Address>, Error> {
        GlobalCycleManager::get_cycle_participants(&env, cycle_id)
    }

    pub fn get_cycle_slot(env: Env, cycle_id: u64, position: u32) -> Result<CycleSlot, Error> {
        GlobalCycleManager::get_cycle_slot(&env, cycle_id, position)
    }

    /// Gets the total number of registered members
    pub fn get_total_users(env: Env) -> Result<u32, Error> {
        MetricsModule::get_total_users(&env)
    }

    /// Gets the total income credited across all members
    pub fn get_total_distributed(env: Env) -> Result<i128, Error> {
        MetricsModule::get_total_distributed(&env)
    }

    /// total_users, total_distributed, average_earnings_per_user
    pub fn get_system_metrics(env: Env) -> Result<Vec<(String, i128)>, Error> {
        MetricsModule::get_system_metrics(&env)
    }
}
