use shared::constants::MAX_LABEL_LEN;
use shared::errors::Error;
use shared::types::{Amount, Fractions, PropertyConfig};
use soroban_sdk::{Address, Env, String};

use crate::storage::get_owner;

fn validate_label(label: &String) -> Result<(), Error> {
    if label.len() == 0 || label.len() > MAX_LABEL_LEN {
        return Err(Error::InvInput);
    }
    Ok(())
}

/// Deployment parameters are checked once, here
pub fn validate_config(config: &PropertyConfig) -> Result<(), Error> {
    validate_label(&config.name)?;
    validate_label(&config.symbol)?;

    if config.max_fractions == 0 || config.price_per_fraction <= 0 {
        return Err(Error::InvInput);
    }

    // cost of the whole issue must be representable
    config
        .price_per_fraction
        .checked_mul(config.max_fractions as Amount)
        .ok_or(Error::InvInput)?;

    Ok(())
}

/// Caller must be the stored owner and must have signed
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
    let owner = get_owner(env)?;
    if owner != *caller {
        return Err(Error::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

pub fn require_positive(amount: Amount) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvAmount);
    }
    Ok(())
}

pub fn require_fractions(count: Fractions) -> Result<(), Error> {
    if count == 0 {
        return Err(Error::InvCount);
    }
    Ok(())
}
