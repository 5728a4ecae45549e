use crate::helpers::verify_admin;
use crate::interface::AdminOperations;
use crate::ledger;
use crate::metrics::MetricsModule;
use crate::ranks::RankTable;
use crate::types::{DataKey, Error, IncomeConfig, IncomeRecord, IncomeStatus, Rank, User};
use soroban_sdk::{Address, Env, Vec};

pub const DEFAULT_REFERRAL_BPS: u32 = 5_000;
pub const DEFAULT_LEVEL_BPS: [u32; 6] = [500, 400, 300, 100, 100, 100];
pub const DEFAULT_GLOBAL_BPS: u32 = 1_000;
pub const DEFAULT_CYCLE_SIZE: u32 = 1_024;
pub const DEFAULT_PAYOUT_LEVELS: u32 = 10;

// Deepest binary-tree level a cycle position can address with u32 positions.
const MAX_PAYOUT_LEVELS: u32 = 32;

pub struct AdminModule;

impl AdminOperations for AdminModule {
    fn initialize(env: &Env, admin: &Address, ranks: Vec<Rank>) -> Result<(), Error> {
        // Check if contract is already initialized
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        if !RankTable::validate(&ranks) {
            return Err(Error::InvalidRankTable);
        }
        let entry_rank = RankTable::first_rank(&ranks).ok_or(Error::InvalidRankTable)?;

        env.storage().instance().set(&DataKey::Admin, admin);
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &false);
        env.storage()
            .instance()
            .set(&DataKey::Config, &Self::default_config(env));
        env.storage().instance().set(&DataKey::Ranks, &ranks);
        ledger::bump_instance(env);

        // The admin is the root of every sponsor chain
        let now = env.ledger().timestamp();
        ledger::save_user(
            env,
            &User {
                address: admin.clone(),
                sponsor: None,
                current_rank: Some(entry_rank.name),
                is_active: true,
                available_balance: 0,
                total_earnings: 0,
                direct_referrals: 0,
                team_size: 0,
                joined_at: now,
                updated_at: now,
            },
        );
        MetricsModule::increment_total_users(env);

        Ok(())
    }

    fn get_admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    fn transfer_admin(env: &Env, new_admin: &Address) -> Result<(), Error> {
        verify_admin(env)?;
        env.storage().instance().set(&DataKey::Admin, new_admin);
        Ok(())
    }

    fn pause_contract(env: &Env) -> Result<(), Error> {
        verify_admin(env)?;
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &true);
        Ok(())
    }

    fn resume_contract(env: &Env) -> Result<(), Error> {
        verify_admin(env)?;
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &false);
        Ok(())
    }

    fn get_paused_state(env: &Env) -> Result<bool, Error> {
        Ok(Self::is_contract_paused(env))
    }

    fn set_income_config(env: &Env, config: IncomeConfig) -> Result<(), Error> {
        verify_admin(env)?;

        if !Self::validate_config(&config) {
            return Err(Error::InvalidConfig);
        }

        env.storage().instance().set(&DataKey::Config, &config);
        ledger::bump_instance(env);
        Ok(())
    }

    fn get_income_config(env: &Env) -> Result<IncomeConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    fn set_ranks(env: &Env, ranks: Vec<Rank>) -> Result<(), Error> {
        verify_admin(env)?;

        if !RankTable::validate(&ranks) {
            return Err(Error::InvalidRankTable);
        }

        env.storage().instance().set(&DataKey::Ranks, &ranks);
        ledger::bump_instance(env);
        Ok(())
    }

    fn settle_income(env: &Env, income_id: u64) -> Result<IncomeRecord, Error> {
        verify_admin(env)?;

        let mut record = ledger::find_income(env, income_id).ok_or(Error::IncomeNotFound)?;
        if record.status != IncomeStatus::Pending {
            return Err(Error::IncomeAlreadyProcessed);
        }

        record.status = IncomeStatus::Processed;
        record.processed_at = Some(env.ledger().timestamp());
        ledger::save_income(env, &record);

        Ok(record)
    }
}

// Helper functions
impl AdminModule {
    pub fn is_contract_paused(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::ContractPaused)
            .unwrap_or(false)
    }

    pub fn default_config(env: &Env) -> IncomeConfig {
        IncomeConfig {
            referral_bps: DEFAULT_REFERRAL_BPS,
            level_bps: Vec::from_array(env, DEFAULT_LEVEL_BPS),
            global_bps: DEFAULT_GLOBAL_BPS,
            cycle_size: DEFAULT_CYCLE_SIZE,
            payout_levels: DEFAULT_PAYOUT_LEVELS,
            reentry_enabled: true,
        }
    }

    fn validate_config(config: &IncomeConfig) -> bool {
        let max_bps = crate::money::BPS_DENOMINATOR as u32;

        if config.referral_bps > max_bps || config.global_bps > max_bps {
            return false;
        }

        if config.level_bps.is_empty() || config.level_bps.iter().any(|bps| bps > max_bps) {
            return false;
        }

        config.cycle_size >= 1
            && config.payout_levels >= 1
            && config.payout_levels <= MAX_PAYOUT_LEVELS
    }
}
