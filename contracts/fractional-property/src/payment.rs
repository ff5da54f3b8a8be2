//! How money moves between payers and the property contract.
//!
//! `NativeValue` mirrors attaching call value: the payer signs a direct
//! transfer of the exact amount inside the same invocation.
//! `AllowanceTransfer` is approve-then-spend: the payer grants the contract
//! an allowance first, the contract pulls the amount with `transfer_from`.
//! Payouts are plain transfers from the contract on both rails.

use shared::errors::Error;
use shared::types::{Amount, PaymentAsset};
use soroban_sdk::{token::TokenClient, Address, Env};

pub trait PaymentRail {
    fn token(&self) -> &Address;

    /// Move `amount` from `from` into the contract
    fn collect(&self, env: &Env, from: &Address, amount: Amount) -> Result<(), Error>;

    /// Move `amount` held by the contract to `to`
    fn pay_out(&self, env: &Env, to: &Address, amount: Amount) -> Result<(), Error> {
        let client = TokenClient::new(env, self.token());
        let contract = env.current_contract_address();
        if client.balance(&contract) < amount {
            return Err(Error::InsufFunds);
        }
        client.transfer(&contract, to, &amount);
        Ok(())
    }
}

pub struct NativeValue<'a> {
    token: &'a Address,
}

impl PaymentRail for NativeValue<'_> {
    fn token(&self) -> &Address {
        self.token
    }

    fn collect(&self, env: &Env, from: &Address, amount: Amount) -> Result<(), Error> {
        let client = TokenClient::new(env, self.token);
        if client.balance(from) < amount {
            return Err(Error::InsufPay);
        }
        client.transfer(from, &env.current_contract_address(), &amount);
        Ok(())
    }
}

pub struct AllowanceTransfer<'a> {
    token: &'a Address,
}

impl PaymentRail for AllowanceTransfer<'_> {
    fn token(&self) -> &Address {
        self.token
    }

    fn collect(&self, env: &Env, from: &Address, amount: Amount) -> Result<(), Error> {
        let client = TokenClient::new(env, self.token);
        let contract = env.current_contract_address();
        if client.allowance(from, &contract) < amount {
            return Err(Error::InsufAllow);
        }
        if client.balance(from) < amount {
            return Err(Error::InsufPay);
        }
        client.transfer_from(&contract, from, &contract, &amount);
        Ok(())
    }
}

pub enum Rail<'a> {
    Native(NativeValue<'a>),
    Allowance(AllowanceTransfer<'a>),
}

impl PaymentRail for Rail<'_> {
    fn token(&self) -> &Address {
        match self {
            Rail::Native(rail) => rail.token(),
            Rail::Allowance(rail) => rail.token(),
        }
    }

    fn collect(&self, env: &Env, from: &Address, amount: Amount) -> Result<(), Error> {
        match self {
            Rail::Native(rail) => rail.collect(env, from, amount),
            Rail::Allowance(rail) => rail.collect(env, from, amount),
        }
    }
}

/// Pick the rail a property was configured with
pub fn rail_for(asset: &PaymentAsset) -> Rail<'_> {
    match asset {
        PaymentAsset::Native(token) => Rail::Native(NativeValue { token }),
        PaymentAsset::Token(token) => Rail::Allowance(AllowanceTransfer { token }),
    }
}
