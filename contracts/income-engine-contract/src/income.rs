use crate::admin::AdminModule;
use crate::cycle::GlobalCycleManager;
use crate::helpers::{ensure_contract_active, verify_admin};
use crate::interface::{AdminOperations, IncomeOperations, RankOperations};
use crate::ledger::{self, IncomeCredit};
use crate::money::{calculate_level_income, calculate_referral_income, calculate_retopup_income};
use crate::ranks::RankTable;
use crate::types::{Error, IncomeConfig, IncomeMetadata, IncomeType, Rank, User};
use soroban_sdk::{log, Address, Env, String, Symbol, Vec};

/// Where a processing run's reference comes from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    /// Payment reference supplied by the caller
    External,
    /// Transaction generated when a cycle leader is topped up; `depth`
    /// counts the auto top-ups in the chain
    AutoTopup { topup_id: u64, depth: u32 },
}

impl Origin {
    fn depth(self) -> u32 {
        match self {
            Origin::External => 0,
            Origin::AutoTopup { depth, .. } => depth,
        }
    }
}

pub struct IncomeEngine;

impl IncomeOperations for IncomeEngine {
    fn process_all_incomes(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Symbol,
        is_retopup: bool,
    ) -> Result<(), Error> {
        ensure_contract_active(env)?;
        verify_admin(env)?;
        ledger::bump_instance(env);
        Self::process_from(
            env,
            activator,
            activation_amount,
            transaction_id,
            rank,
            is_retopup,
            Origin::External,
        )
    }

    fn get_upline_chain(env: &Env, user: &Address, depth: u32) -> Vec<Address> {
        let mut chain = Vec::new(env);
        let mut current = match ledger::find_user(env, user) {
            Some(data) => data,
            None => return chain,
        };

        while chain.len() < depth {
            let sponsor = match current.sponsor.clone() {
                Some(sponsor) => sponsor,
                None => break,
            };
            match ledger::find_user(env, &sponsor) {
                Some(data) => {
                    chain.push_back(sponsor);
                    current = data;
                }
                None => break,
            }
        }

        chain
    }

    fn check_level_income_eligibility(env: &Env, user: &Address) -> bool {
        ledger::find_user(env, user)
            .map_or(false, |data| data.is_active && data.current_rank.is_some())
    }

    fn check_global_income_eligibility(env: &Env, rank: &Symbol) -> Result<bool, Error> {
        let rank = RankTable::get_rank(env, rank)?;
        Ok(Self::rank_has_global_income(&rank))
    }

    fn is_transaction_processed(env: &Env, transaction_id: &String) -> bool {
        ledger::is_transaction_processed(env, transaction_id)
    }
}

// Helper functions
impl IncomeEngine {
    /// Entry for both external activations and auto top-ups.
    pub(crate) fn process_from(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Symbol,
        is_retopup: bool,
        origin: Origin,
    ) -> Result<(), Error> {
        log!(
            env,
            "process_all_incomes activator={} amount={} tx={} rank={} retopup={} depth={}",
            activator.clone(),
            activation_amount,
            transaction_id.clone(),
            rank.clone(),
            is_retopup,
            origin.depth()
        );

        let result = Self::distribute(
            env,
            activator,
            activation_amount,
            transaction_id,
            rank,
            is_retopup,
            origin,
        );

        if let Err(err) = result {
            log!(
                env,
                "process_all_incomes failed activator={} amount={} tx={} rank={} error={}",
                activator.clone(),
                activation_amount,
                transaction_id.clone(),
                rank.clone(),
                err as u32
            );
        }

        result
    }

    fn distribute(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Symbol,
        is_retopup: bool,
        origin: Origin,
    ) -> Result<(), Error> {
        let depth = origin.depth();
        let ranks = RankTable::get_ranks(env)?;
        if depth > ranks.len() {
            return Err(Error::CascadeDepthExceeded);
        }
        if activation_amount < 0 {
            return Err(Error::InvalidAmount);
        }
        let rank_data = RankTable::find_rank(&ranks, rank).ok_or(Error::RankNotFound)?;
        let activator_data = ledger::get_user(env, activator)?;
        match origin {
            Origin::External => {
                if ledger::is_transaction_processed(env, transaction_id) {
                    return Err(Error::TransactionAlreadyProcessed);
                }
                ledger::mark_transaction_processed(env, transaction_id);
            }
            Origin::AutoTopup { topup_id, .. } => {
                if ledger::is_auto_topup_processed(env, topup_id) {
                    return Err(Error::TransactionAlreadyProcessed);
                }
                ledger::mark_auto_topup_processed(env, topup_id);
            }
        }

        let config = AdminModule::get_income_config(env)?;

        Self::process_referral_income(
            env,
            &activator_data,
            activation_amount,
            transaction_id,
            &rank_data,
            is_retopup,
            &config,
        )?;
        Self::process_level_income(
            env,
            activator,
            activation_amount,
            transaction_id,
            &rank_data,
            &config,
        )?;
        Self::process_global_income(
            env,
            activator,
            activation_amount,
            transaction_id,
            &rank_data,
            &config,
            depth,
        )
    }

    fn process_referral_income(
        env: &Env,
        activator: &User,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Rank,
        is_retopup: bool,
        config: &IncomeConfig,
    ) -> Result<(), Error> {
        let sponsor = match activator.sponsor.clone() {
            Some(sponsor) => sponsor,
            None => return Ok(()),
        };

        let (income_type, amount) = if is_retopup {
            (
                IncomeType::Retopup,
                calculate_retopup_income(activation_amount, config),
            )
        } else {
            (
                IncomeType::Referral,
                calculate_referral_income(activation_amount, config),
            )
        };

        if amount <= 0 {
            log!(env, "referral income skipped: zero amount tx={}", transaction_id.clone());
            return Ok(());
        }

        ledger::credit_income(
            env,
            IncomeCredit {
                recipient: sponsor,
                income_type,
                amount,
                source_uid: activator.address.clone(),
                source_transaction_id: transaction_id.clone(),
                level: None,
                rank: rank.name.clone(),
                metadata: IncomeMetadata {
                    percentage_bps: config.referral_bps,
                    activation_amount,
                    cycle_id: None,
                },
            },
        )?;

        Ok(())
    }

    fn process_level_income(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Rank,
        config: &IncomeConfig,
    ) -> Result<(), Error> {
        let upline = Self::get_upline_chain(env, activator, config.level_bps.len());

        for (index, upline_user) in upline.iter().enumerate() {
            let level = index as u32 + 1;

            if !Self::check_level_income_eligibility(env, &upline_user) {
                log!(env, "level income skipped: ineligible user={} level={}", upline_user, level);
                continue;
            }

            let amount = calculate_level_income(level, activation_amount, config);
            if amount <= 0 {
                log!(env, "level income skipped: zero amount level={}", level);
                continue;
            }

            ledger::credit_income(
                env,
                IncomeCredit {
                    recipient: upline_user,
                    income_type: IncomeType::Level,
                    amount,
                    source_uid: activator.clone(),
                    source_transaction_id: transaction_id.clone(),
                    level: Some(level),
                    rank: rank.name.clone(),
                    metadata: IncomeMetadata {
                        percentage_bps: config.level_bps.get(level - 1).unwrap_or(0),
                        activation_amount,
                        cycle_id: None,
                    },
                },
            )?;
        }

        Ok(())
    }

    fn process_global_income(
        env: &Env,
        activator: &Address,
        activation_amount: i128,
        transaction_id: &String,
        rank: &Rank,
        config: &IncomeConfig,
        depth: u32,
    ) -> Result<(), Error> {
        if !Self::rank_has_global_income(rank) {
            return Ok(());
        }

        let entry = GlobalCycleManager::add_to_global_cycle(
            env,
            activator,
            &rank.name,
            activation_amount,
            config,
        )?;

        if entry.is_complete {
            GlobalCycleManager::process_global_cycle_payout(
                env,
                entry.cycle_id,
                activator,
                transaction_id,
                config,
                depth,
            )?;
        }

        Ok(())
    }

    fn rank_has_global_income(rank: &Rank) -> bool {
        rank.benefits.global_income
    }
}
