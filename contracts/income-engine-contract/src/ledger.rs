//! Balance, income and cycle documents.
//!
//! Everything here runs inside the calling invocation, so a failed
//! invocation leaves none of these writes behind.

use crate::events::{self, IncomeCredited};
use crate::helpers::format_text;
use crate::metrics::MetricsModule;
use crate::money::{safe_add, safe_subtract, Amount};
use crate::types::{
    CycleSlot, DataKey, Error, GlobalCycle, IncomeMetadata, IncomeRecord, IncomeStatus,
    IncomeType, ReEntry, Transaction, TransactionKind, TransactionStatus, User,
};
use core::ops::Range;
use soroban_sdk::{Address, Env, IntoVal, String, Symbol, TryFromVal, Val, Vec};

const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Largest page the history queries return
pub const MAX_PAGE_SIZE: u32 = 100;

pub enum BalanceOp {
    /// Credit: raises balance and total earnings
    Add,
    /// Debit: lowers balance, floored at zero
    Subtract,
    /// Returns a debit (e.g. rejected withdrawal); balance only
    Restore,
}

/// One commission to pay out
pub struct IncomeCredit {
    pub recipient: Address,
    pub income_type: IncomeType,
    pub amount: i128,
    pub source_uid: Address,
    pub source_transaction_id: String,
    pub level: Option<u32>,
    pub rank: Symbol,
    pub metadata: IncomeMetadata,
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn put<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

fn get<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
    env.storage().persistent().get(key)
}

fn next_id(env: &Env, counter: DataKey) -> u64 {
    let id = env
        .storage()
        .instance()
        .get::<_, u64>(&counter)
        .unwrap_or(0)
        + 1;
    env.storage().instance().set(&counter, &id);
    id
}

/// Reserves the next slot of a per-member index and returns it.
fn next_index(env: &Env, count_key: &DataKey) -> u32 {
    let count: u32 = get(env, count_key).unwrap_or(0);
    put(env, count_key, &(count + 1));
    count
}

fn page_range(count: u32, offset: u32, limit: u32) -> Range<u32> {
    let start = offset.min(count);
    let end = start.saturating_add(limit.min(MAX_PAGE_SIZE)).min(count);
    start..end
}

// Users

pub fn user_exists(env: &Env, user: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::User(user.clone()))
}

pub fn find_user(env: &Env, user: &Address) -> Option<User> {
    get(env, &DataKey::User(user.clone()))
}

pub fn get_user(env: &Env, user: &Address) -> Result<User, Error> {
    find_user(env, user).ok_or(Error::UserNotFound)
}

pub fn save_user(env: &Env, user: &User) {
    put(env, &DataKey::User(user.address.clone()), user);
}

pub fn update_balance(env: &Env, user: &Address, amount: i128, op: BalanceOp) -> Result<User, Error> {
    let mut data = get_user(env, user)?;
    match op {
        BalanceOp::Add => {
            data.available_balance = safe_add(&[data.available_balance, amount]);
            data.total_earnings = safe_add(&[data.total_earnings, amount]);
        }
        BalanceOp::Subtract => {
            data.available_balance = safe_subtract(data.available_balance, amount).max(0);
        }
        BalanceOp::Restore => {
            data.available_balance = safe_add(&[data.available_balance, amount]);
        }
    }
    data.updated_at = env.ledger().timestamp();
    save_user(env, &data);
    Ok(data)
}

// Income records and transactions

pub fn create_income_record(env: &Env, mut record: IncomeRecord) -> u64 {
    record.id = next_id(env, DataKey::IncomeCounter);
    put(env, &DataKey::Income(record.id), &record);
    let slot = next_index(env, &DataKey::UserIncomeCount(record.uid.clone()));
    put(env, &DataKey::UserIncome(record.uid.clone(), slot), &record.id);
    record.id
}

pub fn find_income(env: &Env, income_id: u64) -> Option<IncomeRecord> {
    get(env, &DataKey::Income(income_id))
}

pub fn save_income(env: &Env, record: &IncomeRecord) {
    put(env, &DataKey::Income(record.id), record);
}

pub fn create_transaction(env: &Env, mut tx: Transaction) -> u64 {
    tx.id = next_id(env, DataKey::TransactionCounter);
    put(env, &DataKey::Transaction(tx.id), &tx);
    let slot = next_index(env, &DataKey::UserTransactionCount(tx.uid.clone()));
    put(env, &DataKey::UserTransaction(tx.uid.clone(), slot), &tx.id);
    tx.id
}

pub fn find_transaction(env: &Env, transaction_id: u64) -> Option<Transaction> {
    get(env, &DataKey::Transaction(transaction_id))
}

pub fn save_transaction(env: &Env, tx: &Transaction) {
    put(env, &DataKey::Transaction(tx.id), tx);
}

pub fn user_income_count(env: &Env, user: &Address) -> u32 {
    get(env, &DataKey::UserIncomeCount(user.clone())).unwrap_or(0)
}

/// Income records of `user`, oldest first, starting at `offset`.
pub fn user_incomes(env: &Env, user: &Address, offset: u32, limit: u32) -> Vec<IncomeRecord> {
    let mut records = Vec::new(env);
    for slot in page_range(user_income_count(env, user), offset, limit) {
        let id: Option<u64> = get(env, &DataKey::UserIncome(user.clone(), slot));
        if let Some(record) = id.and_then(|id| find_income(env, id)) {
            records.push_back(record);
        }
    }
    records
}

pub fn user_transaction_count(env: &Env, user: &Address) -> u32 {
    get(env, &DataKey::UserTransactionCount(user.clone())).unwrap_or(0)
}

pub fn user_transactions(env: &Env, user: &Address, offset: u32, limit: u32) -> Vec<Transaction> {
    let mut entries = Vec::new(env);
    for slot in page_range(user_transaction_count(env, user), offset, limit) {
        let id: Option<u64> = get(env, &DataKey::UserTransaction(user.clone(), slot));
        if let Some(tx) = id.and_then(|id| find_transaction(env, id)) {
            entries.push_back(tx);
        }
    }
    entries
}

fn describe_income(env: &Env, credit: &IncomeCredit) -> String {
    let amount = Amount(credit.amount);
    match (credit.income_type, credit.level) {
        (IncomeType::Referral, _) => {
            format_text(env, format_args!("Referral income of {}", amount))
        }
        (IncomeType::Retopup, _) => {
            format_text(env, format_args!("Re-topup income of {}", amount))
        }
        (IncomeType::Level, Some(level)) => {
            format_text(env, format_args!("Level {} income of {}", level, amount))
        }
        (IncomeType::Global, Some(level)) => format_text(
            env,
            format_args!("Global cycle income of {} (level {})", amount, level),
        ),
        (_, None) => format_text(env, format_args!("Income of {}", amount)),
    }
}

/// Writes the income record, credits the recipient and logs the matching
/// history entry. Returns the income record id.
pub fn credit_income(env: &Env, credit: IncomeCredit) -> Result<u64, Error> {
    let now = env.ledger().timestamp();
    let income_id = create_income_record(
        env,
        IncomeRecord {
            id: 0,
            uid: credit.recipient.clone(),
            income_type: credit.income_type,
            amount: credit.amount,
            source_uid: credit.source_uid.clone(),
            source_transaction_id: credit.source_transaction_id.clone(),
            level: credit.level,
            rank: credit.rank.clone(),
            status: IncomeStatus::Pending,
            created_at: now,
            processed_at: None,
            metadata: credit.metadata.clone(),
        },
    );

    update_balance(env, &credit.recipient, credit.amount, BalanceOp::Add)?;

    create_transaction(
        env,
        Transaction {
            id: 0,
            uid: credit.recipient.clone(),
            kind: TransactionKind::Income,
            sub_type: Some(credit.income_type),
            amount: credit.amount,
            rank: Some(credit.rank.clone()),
            status: TransactionStatus::Completed,
            description: describe_income(env, &credit),
            income_id: Some(income_id),
            auto_generated: false,
            reference: credit.source_transaction_id.clone(),
            created_at: now,
        },
    );

    MetricsModule::add_distributed(env, credit.amount);

    env.events().publish(
        (events::INCOME, credit.recipient),
        IncomeCredited {
            income_id,
            income_type: credit.income_type,
            amount: credit.amount,
            source_uid: credit.source_uid,
            level: credit.level,
        },
    );

    Ok(income_id)
}

// Idempotency

pub fn is_transaction_processed(env: &Env, transaction_id: &String) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ProcessedTransaction(transaction_id.clone()))
}

pub fn mark_transaction_processed(env: &Env, transaction_id: &String) {
    put(
        env,
        &DataKey::ProcessedTransaction(transaction_id.clone()),
        &true,
    );
}

/// Generated auto top-ups are keyed by their transaction id, apart from
/// caller references.
pub fn is_auto_topup_processed(env: &Env, topup_id: u64) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ProcessedAutoTopup(topup_id))
}

pub fn mark_auto_topup_processed(env: &Env, topup_id: u64) {
    put(env, &DataKey::ProcessedAutoTopup(topup_id), &true);
}

// Global cycles

pub fn find_cycle(env: &Env, cycle_id: u64) -> Option<GlobalCycle> {
    get(env, &DataKey::Cycle(cycle_id))
}

pub fn get_cycle(env: &Env, cycle_id: u64) -> Result<GlobalCycle, Error> {
    find_cycle(env, cycle_id).ok_or(Error::CycleNotFound)
}

pub fn save_cycle(env: &Env, cycle: &GlobalCycle) {
    put(env, &DataKey::Cycle(cycle.id), cycle);
}

pub fn query_active_cycle(env: &Env, rank: &Symbol) -> Option<GlobalCycle> {
    let cycle_id: u64 = get(env, &DataKey::ActiveCycle(rank.clone()))?;
    find_cycle(env, cycle_id)
}

/// Opens a cycle for `rank` seated with `first_participant`. The caller
/// saves the returned cycle.
pub fn create_cycle(env: &Env, rank: &Symbol, first_participant: &Address) -> (GlobalCycle, CycleSlot) {
    let mut cycle = GlobalCycle {
        id: next_id(env, DataKey::CycleCounter),
        rank: rank.clone(),
        participant_count: 0,
        total_amount: 0,
        is_complete: false,
        payout_processed: false,
        created_at: env.ledger().timestamp(),
        completed_at: None,
        payout: None,
    };
    put(env, &DataKey::ActiveCycle(rank.clone()), &cycle.id);
    let slot = append_participant(env, &mut cycle, first_participant);
    (cycle, slot)
}

/// Seats `user` at the next position. The caller saves the cycle.
pub fn append_participant(env: &Env, cycle: &mut GlobalCycle, user: &Address) -> CycleSlot {
    cycle.participant_count += 1;
    let position = cycle.participant_count;
    let slot = CycleSlot {
        cycle_id: cycle.id,
        user: user.clone(),
        position,
        level: crate::cycle::level_for_position(position),
        joined_at: env.ledger().timestamp(),
    };
    put(env, &DataKey::CycleSlot(cycle.id, position), &slot);
    put(env, &DataKey::CycleMember(cycle.id, user.clone()), &position);
    slot
}

pub fn cycle_position_of(env: &Env, cycle_id: u64, user: &Address) -> Option<u32> {
    get(env, &DataKey::CycleMember(cycle_id, user.clone()))
}

pub fn get_cycle_slot(env: &Env, cycle_id: u64, position: u32) -> Result<CycleSlot, Error> {
    get(env, &DataKey::CycleSlot(cycle_id, position)).ok_or(Error::CycleNotFound)
}

pub fn mark_cycle_complete(env: &Env, cycle: &mut GlobalCycle) {
    cycle.is_complete = true;
    cycle.completed_at = Some(env.ledger().timestamp());
    env.storage()
        .persistent()
        .remove(&DataKey::ActiveCycle(cycle.rank.clone()));
    save_cycle(env, cycle);
}

pub fn cycle_participants(env: &Env, cycle: &GlobalCycle) -> Result<Vec<Address>, Error> {
    let mut participants = Vec::new(env);
    for position in 1..=cycle.participant_count {
        participants.push_back(get_cycle_slot(env, cycle.id, position)?.user);
    }
    Ok(participants)
}

// RE-IDs

pub fn create_reentry(env: &Env, original_uid: &Address, rank: &Symbol) -> ReEntry {
    let reentry = ReEntry {
        id: next_id(env, DataKey::ReEntryCounter),
        original_uid: original_uid.clone(),
        rank: rank.clone(),
        is_active: true,
        cycle_count: 1,
        total_earnings: 0,
        created_at: env.ledger().timestamp(),
    };
    put(env, &DataKey::ReEntry(reentry.id), &reentry);
    let slot = next_index(env, &DataKey::UserReEntryCount(original_uid.clone()));
    put(env, &DataKey::UserReEntry(original_uid.clone(), slot), &reentry.id);
    reentry
}

pub fn user_reentry_count(env: &Env, user: &Address) -> u32 {
    get(env, &DataKey::UserReEntryCount(user.clone())).unwrap_or(0)
}

pub fn user_reentries(env: &Env, user: &Address, offset: u32, limit: u32) -> Vec<ReEntry> {
    let mut entries = Vec::new(env);
    for slot in page_range(user_reentry_count(env, user), offset, limit) {
        let id: Option<u64> = get(env, &DataKey::UserReEntry(user.clone(), slot));
        if let Some(entry) = id.and_then(|id| get::<ReEntry>(env, &DataKey::ReEntry(id))) {
            entries.push_back(entry);
        }
    }
    entries
}
