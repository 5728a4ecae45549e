use crate::interface::MetricsOperations;
use crate::types::{DataKey, Error};
use soroban_sdk::{Env, String, Vec};

pub struct MetricsModule;

impl MetricsOperations for MetricsModule {
    fn get_total_users(env: &Env) -> Result<u32, Error> {
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::TotalUsers)
            .unwrap_or(0))
    }

    fn get_total_distributed(env: &Env) -> Result<i128, Error> {
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::TotalDistributed)
            .unwrap_or(0))
    }

    fn get_system_metrics(env: &Env) -> Result<Vec<(String, i128)>, Error> {
        let mut metrics = Vec::new(env);

        let total_users = Self::get_total_users(env)? as i128;
        metrics.push_back((String::from_str(env, "total_users"), total_users));

        let total_distributed = Self::get_total_distributed(env)?;
        metrics.push_back((
            String::from_str(env, "total_distributed"),
            total_distributed,
        ));

        let average = if total_users > 0 {
            total_distributed / total_users
        } else {
            0
        };
        metrics.push_back((String::from_str(env, "average_earnings_per_user"), average));

        Ok(metrics)
    }
}

// Helper functions
impl MetricsModule {
    pub fn increment_total_users(env: &Env) {
        let current: u32 = env
            .storage()
            .instance()
            .get(&DataKey::TotalUsers)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::TotalUsers, &(current + 1));
    }

    pub fn add_distributed(env: &Env, amount: i128) {
        let current: i128 = env
            .storage()
            .instance()
            .get(&DataKey::TotalDistributed)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::TotalDistributed, &(current + amount));
    }
}
