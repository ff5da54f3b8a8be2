#![no_std]

use shared::{
    constants::FRACTION_DECIMALS,
    dividends,
    errors::Error,
    events::*,
    types::{
        Amount, DividendPool, Fractions, PaymentAsset, PropertyConfig, PropertyInfo, SaleState,
    },
};
use soroban_sdk::{contract, contractimpl, contractmeta, log, Address, Env, String};
use soroban_token_sdk::{metadata::TokenMetadata, TokenUtils};

mod payment;
mod storage;
mod validation;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;


use payment::{rail_for, PaymentRail};
use storage::*;

contractmeta!(key = "name", val = "Fractional Property Token");

#[contract]
pub struct FractionalPropertyContract;

#[contractimpl]
impl FractionalPropertyContract {
    /// Deploy-time setup of a tokenized property
    ///
    /// # Arguments
    /// * `owner` - Address that deposits rental income and collects sale proceeds
    /// * `config` - Name, symbol, cap, price, property details and payment asset
    ///
    /// # Errors
    /// * `AlreadyInit` - Property was already initialized
    /// * `InvInput` - Empty labels, zero cap or non-positive price
    pub fn initialize(env: Env, owner: Address, config: PropertyConfig) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInit);
        }
        owner.require_auth();
        validation::validate_config(&config)?;

        TokenUtils::new(&env).metadata().set_metadata(&TokenMetadata {
            decimal: FRACTION_DECIMALS,
            name: config.name.clone(),
            symbol: config.symbol.clone(),
        });

        set_owner(&env, &owner);
        set_config(&env, &config);
        set_sale(&env, &SaleState::default());
        set_pool(&env, &DividendPool::default());
        bump_instance(&env);

        env.events().publish(
            (PROPERTY_INITIALIZED, owner),
            (
                config.max_fractions,
                config.price_per_fraction,
                config.payment,
            ),
        );

        Ok(())
    }

    /// Buy whole fractions at the fixed price
    ///
    /// On a native-coin property the buyer pays `price * fraction_count`
    /// directly within this call. On a token property the buyer must have
    /// approved at least that amount to this contract beforehand.
    ///
    /// # Returns
    /// * The amount debited from the buyer
    ///
    /// # Errors
    /// * `InvCount` - Zero fractions requested
    /// * `SoldOut` - Purchase would exceed the fraction cap
    /// * `InsufAllow` - Token allowance below cost
    /// * `InsufPay` - Buyer balance below cost
    pub fn buy(env: Env, buyer: Address, fraction_count: Fractions) -> Result<Amount, Error> {
        buyer.require_auth();
        validation::require_fractions(fraction_count)?;

        let config = get_config(&env)?;
        let mut sale = get_sale(&env);

        let units_sold = sale
            .units_sold
            .checked_add(fraction_count)
            .ok_or(Error::SoldOut)?;
        if units_sold > config.max_fractions {
            return Err(Error::SoldOut);
        }

        let cost = config
            .price_per_fraction
            .checked_mul(fraction_count as Amount)
            .ok_or(Error::Overflow)?;

        rail_for(&config.payment).collect(&env, &buyer, cost)?;

        // new fractions only earn dividends deposited after this point
        let pool = dividends::close_round(&get_pool(&env), sale.units_sold)?;
        let mut position = dividends::settle(&get_holder(&env, &buyer), &pool, units_sold)?;
        position.balance = position
            .balance
            .checked_add(fraction_count)
            .ok_or(Error::Overflow)?;
        set_holder(&env, &buyer, &position);
        set_pool(&env, &pool);

        sale.units_sold = units_sold;
        sale.proceeds = sale.proceeds.checked_add(cost).ok_or(Error::Overflow)?;
        set_sale(&env, &sale);
        bump_instance(&env);

        TokenUtils::new(&env).events().mint(
            env.current_contract_address(),
            buyer.clone(),
            fraction_count as Amount,
        );
        env.events()
            .publish((FRACTIONS_SOLD, buyer), (fraction_count, cost, units_sold));

        Ok(cost)
    }

    /// Deposit rental income, split pro-rata over current fraction balances
    ///
    /// # Arguments
    /// * `caller` - Must be the owner
    /// * `amount` - Income in the payment asset's smallest unit
    ///
    /// # Errors
    /// * `Unauthorized` - Caller is not the owner
    /// * `InvAmount` - Amount is zero or negative
    /// * `NoHolders` - No fractions sold yet
    /// * `InsufAllow` / `InsufPay` - Payment could not be collected
    pub fn deposit_dividends(env: Env, caller: Address, amount: Amount) -> Result<(), Error> {
        validation::require_owner(&env, &caller)?;
        validation::require_positive(amount)?;

        let config = get_config(&env)?;
        let sale = get_sale(&env);
        let pool = dividends::distribute(&get_pool(&env), amount, sale.units_sold)?;

        rail_for(&config.payment).collect(&env, &caller, amount)?;

        set_pool(&env, &pool);
        bump_instance(&env);

        env.events().publish(
            (DIVIDENDS_DEPOSITED, caller),
            (amount, sale.units_sold, pool.total_deposited),
        );

        Ok(())
    }

    /// Withdraw everything the holder has accrued
    ///
    /// Returns 0 and changes nothing when there is nothing to claim.
    pub fn claim(env: Env, holder: Address) -> Result<Amount, Error> {
        holder.require_auth();

        let config = get_config(&env)?;
        let mut pool = get_pool(&env);
        let units_sold = get_sale(&env).units_sold;
        let (position, amount) =
            dividends::take_claimable(&get_holder(&env, &holder), &pool, units_sold)?;

        if amount == 0 {
            log!(&env, "nothing to claim", holder);
            return Ok(0);
        }

        pool.total_claimed = pool
            .total_claimed
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        set_holder(&env, &holder, &position);
        set_pool(&env, &pool);
        bump_instance(&env);

        rail_for(&config.payment).pay_out(&env, &holder, amount)?;

        env.events().publish(
            (DIVIDENDS_CLAIMED, holder),
            (amount, position.total_claimed),
        );

        Ok(amount)
    }

    /// Move fractions between holders
    ///
    /// Dividends accrued before the transfer stay with the sender. A sender
    /// left with no fractions keeps its whole unclaimed units; the sub-unit
    /// remainder moves to the receiver.
    ///
    /// # Errors
    /// * `InvCount` - Zero fractions
    /// * `SelfTransfer` - Sender and recipient are the same
    /// * `InsufBal` - Sender holds fewer fractions than requested
    pub fn transfer(env: Env, from: Address, to: Address, count: Fractions) -> Result<(), Error> {
        from.require_auth();
        validation::require_fractions(count)?;
        require_initialized(&env)?;
        if from == to {
            return Err(Error::SelfTransfer);
        }

        let pool = get_pool(&env);
        let units_sold = get_sale(&env).units_sold;
        let mut sender = dividends::settle(&get_holder(&env, &from), &pool, units_sold)?;
        if sender.balance < count {
            return Err(Error::InsufBal);
        }
        let mut receiver = dividends::settle(&get_holder(&env, &to), &pool, units_sold)?;

        sender.balance -= count;
        receiver.balance = receiver
            .balance
            .checked_add(count)
            .ok_or(Error::Overflow)?;
        let (sender, receiver) = dividends::pass_remainder(&sender, &receiver, units_sold)?;

        set_holder(&env, &from, &sender);
        set_holder(&env, &to, &receiver);
        bump_instance(&env);

        TokenUtils::new(&env)
            .events()
            .transfer(from, to, count as Amount);

        Ok(())
    }

    /// Withdraw sale proceeds (owner only). Deposited dividends are not
    /// reachable through this call.
    pub fn withdraw_proceeds(
        env: Env,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), Error> {
        validation::require_owner(&env, &caller)?;
        validation::require_positive(amount)?;

        let config = get_config(&env)?;
        let mut sale = get_sale(&env);
        if amount > sale.proceeds {
            return Err(Error::InsufFunds);
        }

        sale.proceeds -= amount;
        set_sale(&env, &sale);
        bump_instance(&env);

        rail_for(&config.payment).pay_out(&env, &to, amount)?;

        env.events()
            .publish((PROCEEDS_WITHDRAWN, caller), (to, amount, sale.proceeds));

        Ok(())
    }

    /// Hand the owner role to another address
    pub fn transfer_ownership(env: Env, caller: Address, new_owner: Address) -> Result<(), Error> {
        validation::require_owner(&env, &caller)?;
        set_owner(&env, &new_owner);
        bump_instance(&env);

        env.events().publish((OWNER_CHANGED, caller), new_owner);

        Ok(())
    }

    // ==================== Queries ====================

    pub fn name(env: Env) -> Result<String, Error> {
        require_initialized(&env)?;
        Ok(TokenUtils::new(&env).metadata().get_metadata().name)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        require_initialized(&env)?;
        Ok(TokenUtils::new(&env).metadata().get_metadata().symbol)
    }

    pub fn decimals(env: Env) -> Result<u32, Error> {
        require_initialized(&env)?;
        Ok(TokenUtils::new(&env).metadata().get_metadata().decimal)
    }

    /// Price of one fraction in the payment asset's smallest unit
    pub fn get_price(env: Env) -> Result<Amount, Error> {
        Ok(get_config(&env)?.price_per_fraction)
    }

    pub fn max_fractions(env: Env) -> Result<Fractions, Error> {
        Ok(get_config(&env)?.max_fractions)
    }

    pub fn units_sold(env: Env) -> Result<Fractions, Error> {
        require_initialized(&env)?;
        Ok(get_sale(&env).units_sold)
    }

    pub fn unsold_fractions(env: Env) -> Result<Fractions, Error> {
        let config = get_config(&env)?;
        Ok(config.max_fractions - get_sale(&env).units_sold)
    }

    pub fn balance_of(env: Env, holder: Address) -> Result<Fractions, Error> {
        require_initialized(&env)?;
        Ok(get_holder(&env, &holder).balance)
    }

    /// Dividend the holder could withdraw right now
    pub fn claimable(env: Env, holder: Address) -> Result<Amount, Error> {
        require_initialized(&env)?;
        dividends::claimable(
            &get_holder(&env, &holder),
            &get_pool(&env),
            get_sale(&env).units_sold,
        )
    }

    pub fn total_deposited(env: Env) -> Result<Amount, Error> {
        require_initialized(&env)?;
        Ok(get_pool(&env).total_deposited)
    }

    pub fn total_claimed(env: Env) -> Result<Amount, Error> {
        require_initialized(&env)?;
        Ok(get_pool(&env).total_claimed)
    }

    /// Sale revenue not yet withdrawn by the owner
    pub fn proceeds(env: Env) -> Result<Amount, Error> {
        require_initialized(&env)?;
        Ok(get_sale(&env).proceeds)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        get_owner(&env)
    }

    pub fn payment_asset(env: Env) -> Result<PaymentAsset, Error> {
        Ok(get_config(&env)?.payment)
    }

    pub fn property_info(env: Env) -> Result<PropertyInfo, Error> {
        let config = get_config(&env)?;
        let sale = get_sale(&env);
        Ok(PropertyInfo {
            owner: get_owner(&env)?,
            units_sold: sale.units_sold,
            unsold: config.max_fractions - sale.units_sold,
            config,
        })
    }
}
