use crate::events::{self, WithdrawalUpdated};
use crate::helpers::{ensure_contract_active, format_text, verify_admin};
use crate::income::{IncomeEngine, Origin};
use crate::interface::{MembershipOperations, RankOperations};
use crate::ledger::{self, BalanceOp};
use crate::metrics::MetricsModule;
use crate::money::Amount;
use crate::ranks::RankTable;
use crate::types::{
    Error, IncomeRecord, ReEntry, Transaction, TransactionKind, TransactionStatus, User,
};
use soroban_sdk::{Address, Env, String, Symbol, Vec};

pub struct MembershipModule;

impl MembershipOperations for MembershipModule {
    fn register(env: &Env, user: &Address, sponsor: &Address) -> Result<(), Error> {
        ensure_contract_active(env)?;
        user.require_auth();
        ledger::bump_instance(env);

        // Check if user already exists
        if ledger::user_exists(env, user) {
            return Err(Error::AlreadyRegistered);
        }

        // Sponsors must already be registered, which keeps every chain acyclic
        let mut sponsor_data = ledger::find_user(env, sponsor).ok_or(Error::SponsorNotFound)?;

        let now = env.ledger().timestamp();
        ledger::save_user(
            env,
            &User {
                address: user.clone(),
                sponsor: Some(sponsor.clone()),
                current_rank: None,
                is_active: false,
                available_balance: 0,
                total_earnings: 0,
                direct_referrals: 0,
                team_size: 0,
                joined_at: now,
                updated_at: now,
            },
        );

        sponsor_data.direct_referrals += 1;
        sponsor_data.team_size += 1;
        sponsor_data.updated_at = now;
        ledger::save_user(env, &sponsor_data);

        Self::update_upline_team_size(env, sponsor_data.sponsor, now);

        MetricsModule::increment_total_users(env);

        env.events()
            .publish((events::REGISTER, user.clone()), sponsor.clone());

        Ok(())
    }

    fn activate(
        env: &Env,
        user: &Address,
        rank: &Symbol,
        transaction_id: &String,
    ) -> Result<(), Error> {
        ensure_contract_active(env)?;
        verify_admin(env)?;
        ledger::bump_instance(env);

        let rank_data = RankTable::get_rank(env, rank)?;
        let mut user_data = ledger::get_user(env, user)?;
        if user_data.is_active {
            return Err(Error::AlreadyActive);
        }

        Self::record_purchase(
            env,
            &mut user_data,
            TransactionKind::Activation,
            rank,
            rank_data.activation_amount,
            transaction_id,
        );

        env.events().publish(
            (events::ACTIVATE, user.clone()),
            (rank.clone(), rank_data.activation_amount),
        );

        IncomeEngine::process_from(
            env,
            user,
            rank_data.activation_amount,
            transaction_id,
            rank,
            false,
            Origin::External,
        )
    }

    fn retopup(
        env: &Env,
        user: &Address,
        rank: &Symbol,
        transaction_id: &String,
    ) -> Result<(), Error> {
        ensure_contract_active(env)?;
        verify_admin(env)?;
        ledger::bump_instance(env);

        let rank_data = RankTable::get_rank(env, rank)?;
        let mut user_data = ledger::get_user(env, user)?;
        if !user_data.is_active {
            return Err(Error::UserNotActive);
        }

        Self::record_purchase(
            env,
            &mut user_data,
            TransactionKind::Retopup,
            rank,
            rank_data.activation_amount,
            transaction_id,
        );

        env.events().publish(
            (events::RETOPUP, user.clone()),
            (rank.clone(), rank_data.activation_amount),
        );

        IncomeEngine::process_from(
            env,
            user,
            rank_data.activation_amount,
            transaction_id,
            rank,
            true,
            Origin::External,
        )
    }

    fn request_withdrawal(env: &Env, user: &Address, amount: i128) -> Result<u64, Error> {
        ensure_contract_active(env)?;
        user.require_auth();
        ledger::bump_instance(env);

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let user_data = ledger::get_user(env, user)?;
        if user_data.available_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        ledger::update_balance(env, user, amount, BalanceOp::Subtract)?;

        let transaction_id = ledger::create_transaction(
            env,
            Transaction {
                id: 0,
                uid: user.clone(),
                kind: TransactionKind::Withdrawal,
                sub_type: None,
                amount,
                rank: None,
                status: TransactionStatus::Pending,
                description: format_text(env, format_args!("Withdrawal of {}", Amount(amount))),
                income_id: None,
                auto_generated: false,
                reference: String::from_str(env, ""),
                created_at: env.ledger().timestamp(),
            },
        );

        Self::publish_withdrawal(env, user, transaction_id, amount, TransactionStatus::Pending);

        Ok(transaction_id)
    }

    fn approve_withdrawal(env: &Env, transaction_id: u64) -> Result<(), Error> {
        verify_admin(env)?;
        ledger::bump_instance(env);

        let mut tx = Self::pending_withdrawal(env, transaction_id)?;
        tx.status = TransactionStatus::Completed;
        ledger::save_transaction(env, &tx);

        Self::publish_withdrawal(env, &tx.uid, tx.id, tx.amount, tx.status);
        Ok(())
    }

    fn reject_withdrawal(env: &Env, transaction_id: u64) -> Result<(), Error> {
        verify_admin(env)?;
        ledger::bump_instance(env);

        let mut tx = Self::pending_withdrawal(env, transaction_id)?;
        tx.status = TransactionStatus::Rejected;
        ledger::save_transaction(env, &tx);

        ledger::update_balance(env, &tx.uid, tx.amount, BalanceOp::Restore)?;

        Self::publish_withdrawal(env, &tx.uid, tx.id, tx.amount, tx.status);
        Ok(())
    }

    fn get_user(env: &Env, user: &Address) -> Result<User, Error> {
        ledger::get_user(env, user)
    }

    fn is_registered(env: &Env, user: &Address) -> Result<bool, Error> {
        Ok(ledger::user_exists(env, user))
    }

    fn get_balance(env: &Env, user: &Address) -> Result<i128, Error> {
        Ok(ledger::get_user(env, user)?.available_balance)
    }

    fn get_user_incomes(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<IncomeRecord>, Error> {
        Ok(ledger::user_incomes(env, user, offset, limit))
    }

    fn get_user_income_count(env: &Env, user: &Address) -> Result<u32, Error> {
        Ok(ledger::user_income_count(env, user))
    }

    fn get_user_transactions(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, Error> {
        Ok(ledger::user_transactions(env, user, offset, limit))
    }

    fn get_user_transaction_count(env: &Env, user: &Address) -> Result<u32, Error> {
        Ok(ledger::user_transaction_count(env, user))
    }

    fn get_income(env: &Env, income_id: u64) -> Result<IncomeRecord, Error> {
        ledger::find_income(env, income_id).ok_or(Error::IncomeNotFound)
    }

    fn get_transaction(env: &Env, transaction_id: u64) -> Result<Transaction, Error> {
        ledger::find_transaction(env, transaction_id).ok_or(Error::TransactionNotFound)
    }

    fn get_reentries(
        env: &Env,
        user: &Address,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ReEntry>, Error> {
        Ok(ledger::user_reentries(env, user, offset, limit))
    }

    fn get_reentry_count(env: &Env, user: &Address) -> Result<u32, Error> {
        Ok(ledger::user_reentry_count(env, user))
    }
}

// Helper functions
impl MembershipModule {
    fn update_upline_team_size(env: &Env, mut ancestor: Option<Address>, now: u64) {
        while let Some(address) = ancestor {
            let mut data = match ledger::find_user(env, &address) {
                Some(data) => data,
                None => break,
            };
            data.team_size += 1;
            data.updated_at = now;
            ledger::save_user(env, &data);
            ancestor = data.sponsor;
        }
    }

    fn record_purchase(
        env: &Env,
        user: &mut User,
        kind: TransactionKind,
        rank: &Symbol,
        amount: i128,
        transaction_id: &String,
    ) {
        let now = env.ledger().timestamp();
        ledger::create_transaction(
            env,
            Transaction {
                id: 0,
                uid: user.address.clone(),
                kind,
                sub_type: None,
                amount,
                rank: Some(rank.clone()),
                status: TransactionStatus::Completed,
                description: match kind {
                    TransactionKind::Retopup => {
                        format_text(env, format_args!("Re-topup of {}", Amount(amount)))
                    }
                    _ => format_text(env, format_args!("Activation of {}", Amount(amount))),
                },
                income_id: None,
                auto_generated: false,
                reference: transaction_id.clone(),
                created_at: now,
            },
        );

        user.is_active = true;
        user.current_rank = Some(rank.clone());
        user.updated_at = now;
        ledger::save_user(env, user);
    }

    fn pending_withdrawal(env: &Env, transaction_id: u64) -> Result<Transaction, Error> {
        let tx = ledger::find_transaction(env, transaction_id).ok_or(Error::TransactionNotFound)?;
        if tx.kind != TransactionKind::Withdrawal || tx.status != TransactionStatus::Pending {
            return Err(Error::InvalidTransactionState);
        }
        Ok(tx)
    }

    fn publish_withdrawal(
        env: &Env,
        user: &Address,
        transaction_id: u64,
        amount: i128,
        status: TransactionStatus,
    ) {
        env.events().publish(
            (events::WITHDRAW, user.clone()),
            WithdrawalUpdated {
                transaction_id,
                amount,
                status,
            },
        );
    }
}
