use shared::constants::{
    HOLDER_BUMP_AMOUNT, HOLDER_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD,
};
use shared::errors::Error;
use shared::types::{DividendPool, HolderPosition, PropertyConfig, SaleState};
use soroban_sdk::{contracttype, Address, Env};

/// Storage keys for the property token
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Address allowed to deposit dividends and withdraw proceeds
    Owner,
    /// Immutable deployment parameters
    Config,
    /// Units sold and undrawn proceeds
    Sale,
    /// Dividend accumulator
    Pool,
    /// Fraction balance and dividend position per holder
    Holder(Address),
}

/// Keep contract-wide state alive
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Check if the property has been initialized
pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Fail with `NotInit` before `initialize`
pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if is_initialized(env) {
        Ok(())
    } else {
        Err(Error::NotInit)
    }
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub fn get_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get::<DataKey, Address>(&DataKey::Owner)
        .ok_or(Error::NotInit)
}

pub fn set_config(env: &Env, config: &PropertyConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_config(env: &Env) -> Result<PropertyConfig, Error> {
    env.storage()
        .instance()
        .get::<DataKey, PropertyConfig>(&DataKey::Config)
        .ok_or(Error::NotInit)
}

pub fn set_sale(env: &Env, sale: &SaleState) {
    env.storage().instance().set(&DataKey::Sale, sale);
}

pub fn get_sale(env: &Env) -> SaleState {
    env.storage()
        .instance()
        .get::<DataKey, SaleState>(&DataKey::Sale)
        .unwrap_or_default()
}

pub fn set_pool(env: &Env, pool: &DividendPool) {
    env.storage().instance().set(&DataKey::Pool, pool);
}

pub fn get_pool(env: &Env) -> DividendPool {
    env.storage()
        .instance()
        .get::<DataKey, DividendPool>(&DataKey::Pool)
        .unwrap_or_default()
}

/// Store a holder position and extend its lifetime
pub fn set_holder(env: &Env, holder: &Address, position: &HolderPosition) {
    let key = DataKey::Holder(holder.clone());
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, HOLDER_LIFETIME_THRESHOLD, HOLDER_BUMP_AMOUNT);
}

/// Retrieve a holder position, empty for addresses that never held fractions
pub fn get_holder(env: &Env, holder: &Address) -> HolderPosition {
    env.storage()
        .persistent()
        .get::<DataKey, HolderPosition>(&DataKey::Holder(holder.clone()))
        .unwrap_or_default()
}
