use soroban_sdk::{contracterror, contracttype, Address, String, Symbol, Vec};

/// Which income streams a rank unlocks
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankBenefits {
    pub referral_income: bool,
    pub level_income: bool,
    pub global_income: bool,
    pub retopup_income: bool,
}

/// Qualification targets shown to members. Informational only.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankRequirements {
    pub direct_referrals: u32,
    pub team_size: u32,
    pub total_business: i128,
}

/// One row of the rank table
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rank {
    pub name: Symbol,
    pub index: u32,             // 1..N, consecutive
    pub activation_amount: i128, // cents, strictly increasing with index
    pub benefits: RankBenefits,
    pub requirements: RankRequirements,
}

/// Commission percentages and cycle parameters
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncomeConfig {
    pub referral_bps: u32,     // referral and re-topup rate (basis points)
    pub level_bps: Vec<u32>,   // upline rates, index 0 = level 1
    pub global_bps: u32,       // share of the rank amount paid per completed cycle
    pub cycle_size: u32,       // participants needed to complete a cycle
    pub payout_levels: u32,    // binary-tree levels paid on completion
    pub reentry_enabled: bool, // issue a RE-ID when the top rank cycles
}

/// Member account
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub address: Address,
    pub sponsor: Option<Address>, // None only for the root account
    pub current_rank: Option<Symbol>,
    pub is_active: bool,
    pub available_balance: i128,
    pub total_earnings: i128,
    pub direct_referrals: u32,
    pub team_size: u32,
    pub joined_at: u64,
    pub updated_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncomeType {
    Referral = 0,
    Level = 1,
    Global = 2,
    Retopup = 3,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncomeStatus {
    Pending = 0,
    Processed = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncomeMetadata {
    pub percentage_bps: u32,
    pub activation_amount: i128,
    pub cycle_id: Option<u64>,
}

/// Append-only commission ledger entry
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncomeRecord {
    pub id: u64,
    pub uid: Address,
    pub income_type: IncomeType,
    pub amount: i128,
    pub source_uid: Address,
    pub source_transaction_id: String,
    pub level: Option<u32>, // level and global incomes only
    pub rank: Symbol,
    pub status: IncomeStatus,
    pub created_at: u64,
    pub processed_at: Option<u64>,
    pub metadata: IncomeMetadata,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionKind {
    Income = 0,
    AutoTopup = 1,
    Activation = 2,
    Retopup = 3,
    Withdrawal = 4,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Pending = 0,
    Completed = 1,
    Rejected = 2,
}

/// User-facing history entry
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub uid: Address,
    pub kind: TransactionKind,
    pub sub_type: Option<IncomeType>,
    pub amount: i128,
    pub rank: Option<Symbol>,
    pub status: TransactionStatus,
    pub description: String,
    pub income_id: Option<u64>,
    pub auto_generated: bool,
    pub reference: String,
    pub created_at: u64,
}

/// Rank-scoped participant queue
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalCycle {
    pub id: u64,
    pub rank: Symbol,
    pub participant_count: u32,
    pub total_amount: i128,
    pub is_complete: bool,
    pub payout_processed: bool,
    pub created_at: u64,
    pub completed_at: Option<u64>,
    pub payout: Option<CyclePayout>, // set on completion
}

/// Payout snapshot taken when a cycle completes. Seats are paid in
/// position order and `paid_through` is the last position settled.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CyclePayout {
    pub activation_amount: i128, // rank amount the pool is drawn from
    pub percentage_bps: u32,     // global rate at completion
    pub amount: i128,            // pool split across `levels`
    pub levels: u32,
    pub seats: u32,              // positions 1..=seats are paid
    pub paid_through: u32,
    pub source_uid: Address,     // activator that filled the cycle
    pub source_transaction_id: String,
    pub depth: u32,              // auto top-ups that led to the completing activation
}

/// A participant's seat in a cycle. Position is 1-based insertion order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleSlot {
    pub cycle_id: u64,
    pub user: Address,
    pub position: u32,
    pub level: u32,
    pub joined_at: u64,
}

/// Re-entry identity issued when a member cycles out of the top rank
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReEntry {
    pub id: u64,
    pub original_uid: Address,
    pub rank: Symbol,
    pub is_active: bool,
    pub cycle_count: u32,
    pub total_earnings: i128,
    pub created_at: u64,
}

/// Storage keys for contract data
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,                          // Contract administrator
    ContractPaused,                 // Pause flag
    Config,                         // IncomeConfig
    Ranks,                          // Ordered rank table
    TotalUsers,                     // Registered members
    TotalDistributed,               // Sum of all income credited
    IncomeCounter,                  // Last income record id
    TransactionCounter,             // Last transaction id
    CycleCounter,                   // Last cycle id
    ReEntryCounter,                 // Last RE-ID
    User(Address),                  // Member account
    Income(u64),                    // IncomeRecord
    Transaction(u64),               // Transaction
    UserIncome(Address, u32),       // (member, nth income) -> income id
    UserIncomeCount(Address),       // Income records per member
    UserTransaction(Address, u32),  // (member, nth entry) -> transaction id
    UserTransactionCount(Address),  // History entries per member
    ProcessedTransaction(String),   // Idempotency set for caller references
    ProcessedAutoTopup(u64),        // Idempotency set for generated top-ups
    ActiveCycle(Symbol),            // Open cycle id per rank
    Cycle(u64),                     // GlobalCycle
    CycleSlot(u64, u32),            // (cycle id, position)
    CycleMember(u64, Address),      // (cycle id, member) -> position
    ReEntry(u64),                   // ReEntry
    UserReEntry(Address, u32),      // (member, nth RE-ID) -> RE-ID
    UserReEntryCount(Address),      // RE-IDs per member
}

/// Contract error types
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,              // Contract not initialized
    AlreadyInitialized = 2,          // Contract already setup
    Unauthorized = 3,                // Caller lacks permission
    AlreadyRegistered = 4,           // User already exists
    UserNotFound = 5,                // User doesn't exist
    SponsorNotFound = 6,             // Sponsor doesn't exist
    RankNotFound = 7,                // Rank missing from the table
    InvalidAmount = 8,               // Negative or zero amount
    InvalidRankTable = 9,            // Rank table fails validation
    InvalidConfig = 10,              // Income config fails validation
    ContractPaused = 11,             // Contract is paused
    TransactionAlreadyProcessed = 12, // Transaction id seen before
    CycleNotFound = 13,              // Cycle doesn't exist
    CyclePayoutAlreadyProcessed = 14, // Cycle was already paid out
    CascadeDepthExceeded = 15,       // Auto top-up chain ran past the rank table
    IncomeNotFound = 16,             // Income record doesn't exist
    IncomeAlreadyProcessed = 17,     // Income already settled
    InsufficientBalance = 18,        // Withdrawal exceeds balance
    TransactionNotFound = 19,        // Transaction doesn't exist
    InvalidTransactionState = 20,    // Transaction kind/status mismatch
    UserNotActive = 21,              // Member has not activated
    AlreadyActive = 22,              // Member already activated
    CycleNotComplete = 23,           // Payout requested for an open cycle
    InvalidBatchSize = 24,           // Payout batch of zero seats
}
