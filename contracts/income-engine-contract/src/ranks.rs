use crate::interface::RankOperations;
use crate::types::{DataKey, Error, Rank};
use soroban_sdk::{Env, Symbol, Vec};

pub struct RankTable;

impl RankOperations for RankTable {
    fn get_ranks(env: &Env) -> Result<Vec<Rank>, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Ranks)
            .ok_or(Error::NotInitialized)
    }

    fn get_rank(env: &Env, name: &Symbol) -> Result<Rank, Error> {
        let ranks = Self::get_ranks(env)?;
        Self::find_rank(&ranks, name).ok_or(Error::RankNotFound)
    }

    fn get_next_rank(env: &Env, name: &Symbol) -> Result<Option<Rank>, Error> {
        let ranks = Self::get_ranks(env)?;
        let current = Self::find_rank(&ranks, name).ok_or(Error::RankNotFound)?;
        Ok(Self::next_rank(&ranks, &current))
    }
}

// Helper functions
impl RankTable {
    pub fn find_rank(ranks: &Vec<Rank>, name: &Symbol) -> Option<Rank> {
        ranks.iter().find(|rank| rank.name == *name)
    }

    pub fn next_rank(ranks: &Vec<Rank>, current: &Rank) -> Option<Rank> {
        ranks.iter().find(|rank| rank.index == current.index + 1)
    }

    pub fn first_rank(ranks: &Vec<Rank>) -> Option<Rank> {
        ranks.iter().find(|rank| rank.index == 1)
    }

    /// Indexes run 1..N in order, amounts strictly increase, names are unique.
    pub fn validate(ranks: &Vec<Rank>) -> bool {
        if ranks.is_empty() {
            return false;
        }

        let mut previous_amount = 0i128;
        for (position, rank) in ranks.iter().enumerate() {
            if rank.index != position as u32 + 1 {
                return false;
            }
            if rank.activation_amount <= previous_amount {
                return false;
            }
            if ranks.iter().filter(|other| other.name == rank.name).count() != 1 {
                return false;
            }
            previous_amount = rank.activation_amount;
        }

        true
    }
}
