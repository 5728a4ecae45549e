//! Rank-scoped global cycles.
//!
//! Participants fill a cycle in insertion order and are read as a binary
//! tree: position `p` sits on level `floor(log2(p)) + 1`, so level `k` holds
//! positions `2^(k-1) ..= 2^k - 1`. When the cycle reaches `cycle_size` the
//! first `payout_levels` levels are paid and the cycle leader advances.
//! Large cycles are paid in batches: the completing activation settles the
//! first seats and the admin drives the rest through `process_cycle_payout`.

use crate::admin::AdminModule;
use crate::events::{self, AutoTopupApplied, CycleCompleted, CyclePayoutProgress, ReEntryCreated};
use crate::helpers::{ensure_contract_active, format_text, verify_admin};
use crate::income::{IncomeEngine, Origin};
use crate::interface::{AdminOperations, CycleOperations, RankOperations};
use crate::ledger::{self, IncomeCredit};
use crate::money::{calculate_global_income, percent_of, Amount};
use crate::ranks::RankTable;
use crate::types::{
    CycleSlot, CyclePayout, Error, GlobalCycle, IncomeConfig, IncomeMetadata, IncomeType,
    Transaction, TransactionKind, TransactionStatus,
};
use soroban_sdk::{log, Address, Env, String, Symbol, Vec};

/// Outcome of seating a member in a cycle
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleEntry {
    pub cycle_id: u64,
    pub position: u32,
    pub level: u32,
    pub is_complete: bool,
    /// false when the member already held a seat in the open cycle
    pub added: bool,
}

/// Binary-tree level of a 1-based position; 0 for position 0.
pub fn level_for_position(position: u32) -> u32 {
    u32::BITS - position.leading_zeros()
}

/// Inclusive 1-based position range of `level` (level >= 1).
pub fn positions_at_level(level: u32) -> (u32, u32) {
    let start = 1u64 << (level - 1);
    let end = (1u64 << level) - 1;
    (start as u32, end.min(u32::MAX as u64) as u32)
}

/// Seats paid inside the invocation that completes a cycle.
pub const INLINE_PAYOUT_SEATS: u32 = 16;

pub struct GlobalCycleManager;

impl CycleOperations for GlobalCycleManager {
    fn process_cycle_payout(env: &Env, cycle_id: u64, max_seats: u32) -> Result<(), Error> {
        ensure_contract_active(env)?;
        verify_admin(env)?;
        ledger::bump_instance(env);

        if max_seats == 0 {
            return Err(Error::InvalidBatchSize);
        }

        let cycle = ledger::get_cycle(env, cycle_id)?;
        if !cycle.is_complete || cycle.payout.is_none() {
            return Err(Error::CycleNotComplete);
        }
        if cycle.payout_processed {
            return Err(Error::CyclePayoutAlreadyProcessed);
        }

        Self::pay_seats(env, cycle, max_seats)
    }

    fn get_cycle(env: &Env, cycle_id: u64) -> Result<GlobalCycle, Error> {
        ledger::get_cycle(env, cycle_id)
    }

    fn get_active_cycle(env: &Env, rank: &Symbol) -> Option<GlobalCycle> {
        ledger::query_active_cycle(env, rank)
    }

    fn get_cycle_participants(env: &Env, cycle_id: u64) -> Result<Vec<Address>, Error> {
        let cycle = ledger::get_cycle(env, cycle_id)?;
        ledger::cycle_participants(env, &cycle)
    }

    fn get_cycle_slot(env: &Env, cycle_id: u64, position: u32) -> Result<CycleSlot, Error> {
        ledger::get_cycle_slot(env, cycle_id, position)
    }
}

impl GlobalCycleManager {
    /// Seats `user` in the open cycle for `rank`, opening one if needed.
    /// A member already seated in that cycle keeps their seat.
    pub fn add_to_global_cycle(
        env: &Env,
        user: &Address,
        rank: &Symbol,
        amount: i128,
        config: &IncomeConfig,
    ) -> Result<CycleEntry, Error> {
        let (mut cycle, slot) = match ledger::query_active_cycle(env, rank) {
            None => ledger::create_cycle(env, rank, user),
            Some(mut cycle) => {
                if let Some(position) = ledger::cycle_position_of(env, cycle.id, user) {
                    log!(env, "global cycle add ignored: user={} already at position={}", user.clone(), position);
                    return Ok(CycleEntry {
                        cycle_id: cycle.id,
                        position,
                        level: level_for_position(position),
                        is_complete: false,
                        added: false,
                    });
                }
                let slot = ledger::append_participant(env, &mut cycle, user);
                (cycle, slot)
            }
        };

        cycle.total_amount += amount;

        let is_complete = cycle.participant_count >= config.cycle_size;
        if is_complete {
            ledger::mark_cycle_complete(env, &mut cycle);
            env.events().publish(
                (events::CYCLE, cycle.rank.clone()),
                CycleCompleted {
                    cycle_id: cycle.id,
                    participants: cycle.participant_count,
                    completed_at: cycle.completed_at.unwrap_or_default(),
                },
            );
        } else {
            ledger::save_cycle(env, &cycle);
        }

        Ok(CycleEntry {
            cycle_id: cycle.id,
            position: slot.position,
            level: slot.level,
            is_complete,
            added: true,
        })
    }

    /// Snapshots the payout of a freshly completed cycle and pays the first
    /// `INLINE_PAYOUT_SEATS` seats. Seats on levels `1..=payout_levels`
    /// each receive an equal per-level share of the rank's global pool.
    pub fn process_global_cycle_payout(
        env: &Env,
        cycle_id: u64,
        source_uid: &Address,
        source_transaction_id: &String,
        config: &IncomeConfig,
        depth: u32,
    ) -> Result<(), Error> {
        let mut cycle = ledger::get_cycle(env, cycle_id)?;
        if !cycle.is_complete {
            return Err(Error::CycleNotComplete);
        }
        if cycle.payout_processed || cycle.payout.is_some() {
            return Err(Error::CyclePayoutAlreadyProcessed);
        }

        let rank = RankTable::get_rank(env, &cycle.rank)?;
        let (_, deepest_position) = positions_at_level(config.payout_levels);
        cycle.payout = Some(CyclePayout {
            activation_amount: rank.activation_amount,
            percentage_bps: config.global_bps,
            amount: percent_of(rank.activation_amount, config.global_bps),
            levels: config.payout_levels,
            seats: deepest_position.min(cycle.participant_count),
            paid_through: 0,
            source_uid: source_uid.clone(),
            source_transaction_id: source_transaction_id.clone(),
            depth,
        });

        Self::pay_seats(env, cycle, INLINE_PAYOUT_SEATS)
    }

    /// Pays the next `max_seats` seats of a completed cycle, advancing the
    /// leader once the last seat is settled.
    fn pay_seats(env: &Env, mut cycle: GlobalCycle, max_seats: u32) -> Result<(), Error> {
        let mut payout = cycle.payout.clone().ok_or(Error::CycleNotComplete)?;
        let last = payout
            .seats
            .min(payout.paid_through.saturating_add(max_seats));

        for position in payout.paid_through + 1..=last {
            let level = level_for_position(position);
            let share = calculate_global_income(payout.amount, level, payout.levels);
            if share <= 0 {
                log!(env, "global income skipped: zero share cycle={} level={}", cycle.id, level);
                continue;
            }

            let slot = ledger::get_cycle_slot(env, cycle.id, position)?;
            ledger::credit_income(
                env,
                IncomeCredit {
                    recipient: slot.user,
                    income_type: IncomeType::Global,
                    amount: share,
                    source_uid: payout.source_uid.clone(),
                    source_transaction_id: payout.source_transaction_id.clone(),
                    level: Some(level),
                    rank: cycle.rank.clone(),
                    metadata: IncomeMetadata {
                        percentage_bps: payout.percentage_bps,
                        activation_amount: payout.activation_amount,
                        cycle_id: Some(cycle.id),
                    },
                },
            )?;
        }

        payout.paid_through = last;
        cycle.payout_processed = last >= payout.seats;
        cycle.payout = Some(payout.clone());
        ledger::save_cycle(env, &cycle);

        env.events().publish(
            (events::PAYOUT, cycle.rank.clone()),
            CyclePayoutProgress {
                cycle_id: cycle.id,
                paid_through: last,
                seats: payout.seats,
            },
        );

        if cycle.payout_processed {
            Self::process_auto_topup_and_reid(env, &cycle, payout.depth)?;
        }
        Ok(())
    }

    /// Moves the cycle leader up one rank and reruns income processing for
    /// them, or issues a RE-ID when there is no higher rank.
    pub fn process_auto_topup_and_reid(
        env: &Env,
        cycle: &GlobalCycle,
        depth: u32,
    ) -> Result<(), Error> {
        let leader = ledger::get_cycle_slot(env, cycle.id, 1)?.user;
        let ranks = RankTable::get_ranks(env)?;
        let current = RankTable::find_rank(&ranks, &cycle.rank).ok_or(Error::RankNotFound)?;

        let next = match RankTable::next_rank(&ranks, &current) {
            Some(next) => next,
            None => {
                if AdminModule::get_income_config(env)?.reentry_enabled {
                    let reentry = ledger::create_reentry(env, &leader, &cycle.rank);
                    env.events().publish(
                        (events::REENTRY, leader),
                        ReEntryCreated {
                            reentry_id: reentry.id,
                            rank: reentry.rank,
                        },
                    );
                } else {
                    log!(env, "re-entry disabled: cycle={} leader={}", cycle.id, leader);
                }
                return Ok(());
            }
        };

        let now = env.ledger().timestamp();
        let topup_id = ledger::create_transaction(
            env,
            Transaction {
                id: 0,
                uid: leader.clone(),
                kind: TransactionKind::AutoTopup,
                sub_type: None,
                amount: next.activation_amount,
                rank: Some(next.name.clone()),
                status: TransactionStatus::Completed,
                description: format_text(
                    env,
                    format_args!("Auto top-up of {} from global cycle {}", Amount(next.activation_amount), cycle.id),
                ),
                income_id: None,
                auto_generated: true,
                reference: format_text(env, format_args!("cycle-{}", cycle.id)),
                created_at: now,
            },
        );

        let mut leader_data = ledger::get_user(env, &leader)?;
        leader_data.current_rank = Some(next.name.clone());
        leader_data.is_active = true;
        leader_data.updated_at = now;
        ledger::save_user(env, &leader_data);

        env.events().publish(
            (events::AUTO_TOPUP, leader.clone()),
            AutoTopupApplied {
                transaction_id: topup_id,
                from_rank: cycle.rank.clone(),
                to_rank: next.name.clone(),
                amount: next.activation_amount,
            },
        );

        let reference = format_text(env, format_args!("auto-{}", topup_id));
        IncomeEngine::process_from(
            env,
            &leader,
            next.activation_amount,
            &reference,
            &next.name,
            false,
            Origin::AutoTopup {
                topup_id,
                depth: depth + 1,
            },
        )
    }
}
