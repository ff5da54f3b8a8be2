//! In-memory replay of the buyer/owner flow against a property token.
//!
//! Each step returns a `StepResult` so a run halts on the first rejected
//! call instead of panicking. `Scenario::run` executes the whole sequence:
//! read state, buy, deposit dividends, check claimable, claim, report.

use shared::constants::{MICRO_PER_UNIT, SUN_PER_COIN};
use shared::errors::Error;
use shared::types::{Amount, Fractions, PaymentAsset, PropertyConfig};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String,
};

use crate::{FractionalPropertyContract, FractionalPropertyContractClient};

/// Ledgers an allowance granted by the harness stays valid for
pub const APPROVAL_LEDGERS: u32 = 1_000;

/// Payment asset balance handed to the owner and the buyer at deployment
pub const STARTING_FUNDS: Amount = 1_000_000 * SUN_PER_COIN;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepError {
    /// The property contract rejected the call
    Contract(Error),
    /// The host aborted the call (failed auth, token trap)
    Host,
    /// The call succeeded but its return value did not decode
    Decode,
}

pub type StepResult<T> = Result<T, StepError>;

/// Flatten the nested result of a `try_*` call on the property contract
pub fn settle_call<T, C, H>(result: Result<Result<T, C>, Result<Error, H>>) -> StepResult<T> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(StepError::Decode),
        Err(Ok(error)) => Err(StepError::Contract(error)),
        Err(Err(_)) => Err(StepError::Host),
    }
}

/// Flatten the nested result of a `try_*` call on a token contract
fn settle_token_call<T, C, E>(result: Result<Result<T, C>, E>) -> StepResult<T> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(StepError::Decode),
        Err(_) => Err(StepError::Host),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaymentKind {
    /// Priced in native coin, paid within the purchase call
    Native,
    /// Priced in a 6-decimal stablecoin, paid through an allowance
    Stablecoin,
}

/// Register a Stellar asset to act as the payment asset
pub fn deploy_payment_asset(env: &Env, admin: &Address) -> Address {
    env.register_stellar_asset_contract_v2(admin.clone())
        .address()
}

pub fn payment_asset(kind: PaymentKind, token: &Address) -> PaymentAsset {
    match kind {
        PaymentKind::Native => PaymentAsset::Native(token.clone()),
        PaymentKind::Stablecoin => PaymentAsset::Token(token.clone()),
    }
}

/// 1,000 fractions of a condo at 50 coin each, paid in native coin
pub fn city_center_condo(env: &Env, token: &Address) -> PropertyConfig {
    PropertyConfig {
        name: String::from_str(env, "CityCenter Condo Fraction"),
        symbol: String::from_str(env, "CCCF"),
        max_fractions: 1_000,
        price_per_fraction: 50 * SUN_PER_COIN,
        property_address: String::from_str(env, "456 CityCenter Blvd, Chicago IL"),
        metadata_uri: String::from_str(env, "ipfs://QmYourJson"),
        payment: PaymentAsset::Native(token.clone()),
    }
}

/// 1,000 fractions of a house at 100 USDT each, paid through an allowance
pub fn lakeview(env: &Env, token: &Address) -> PropertyConfig {
    PropertyConfig {
        name: String::from_str(env, "Lakeview Fractional"),
        symbol: String::from_str(env, "LVF"),
        max_fractions: 1_000,
        price_per_fraction: 100 * MICRO_PER_UNIT,
        property_address: String::from_str(env, "123 Lakeview Dr, Austin TX"),
        metadata_uri: String::from_str(env, "ipfs://Qm"),
        payment: PaymentAsset::Token(token.clone()),
    }
}

/// What a run buys and deposits
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Plan {
    pub fractions_to_buy: Fractions,
    pub dividend: Amount,
}

impl Plan {
    /// Two fractions, then 100 whole units of rental income
    pub fn standard() -> Self {
        Plan {
            fractions_to_buy: 2,
            dividend: 100 * SUN_PER_COIN,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleSnapshot {
    pub name: String,
    pub unsold: Fractions,
    pub price: Amount,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FinalBalances {
    pub fractions: Fractions,
    pub wallet: Amount,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    pub snapshot: SaleSnapshot,
    pub cost: Amount,
    pub pending: Amount,
    /// `None` when there was nothing to claim
    pub claimed: Option<Amount>,
    pub balances: FinalBalances,
}

pub struct Scenario {
    pub env: Env,
    pub kind: PaymentKind,
    pub owner: Address,
    pub buyer: Address,
    pub property: FractionalPropertyContractClient<'static>,
    pub payment: TokenClient<'static>,
}

impl Scenario {
    /// Fresh ledger with a funded owner and buyer and a property priced in
    /// the chosen payment asset
    pub fn deploy(kind: PaymentKind) -> StepResult<Self> {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(1_000);

        let owner = Address::generate(&env);
        let buyer = Address::generate(&env);

        let token = deploy_payment_asset(&env, &owner);
        let minter = StellarAssetClient::new(&env, &token);
        settle_token_call(minter.try_mint(&owner, &STARTING_FUNDS))?;
        settle_token_call(minter.try_mint(&buyer, &STARTING_FUNDS))?;

        let config = match kind {
            PaymentKind::Native => city_center_condo(&env, &token),
            PaymentKind::Stablecoin => lakeview(&env, &token),
        };
        Self::deploy_with(env, kind, owner, buyer, token, config)
    }

    /// Deploy a property with an explicit config on an existing ledger
    pub fn deploy_with(
        env: Env,
        kind: PaymentKind,
        owner: Address,
        buyer: Address,
        token: Address,
        config: PropertyConfig,
    ) -> StepResult<Self> {
        let contract_id = env.register_contract(None, FractionalPropertyContract);
        let property = FractionalPropertyContractClient::new(&env, &contract_id);
        settle_call(property.try_initialize(&owner, &config))?;

        let payment = TokenClient::new(&env, &token);
        Ok(Scenario {
            env,
            kind,
            owner,
            buyer,
            property,
            payment,
        })
    }

    /// Grant the property contract an allowance when the rail needs one
    fn authorize_spend(&self, from: &Address, amount: Amount) -> StepResult<()> {
        if self.kind == PaymentKind::Native {
            return Ok(());
        }
        let expiration = self.env.ledger().sequence() + APPROVAL_LEDGERS;
        settle_token_call(self.payment.try_approve(
            from,
            &self.property.address,
            &amount,
            &expiration,
        ))
    }

    pub fn read_state(&self) -> StepResult<SaleSnapshot> {
        Ok(SaleSnapshot {
            name: settle_call(self.property.try_name())?,
            unsold: settle_call(self.property.try_unsold_fractions())?,
            price: settle_call(self.property.try_get_price())?,
        })
    }

    pub fn buy(&self, fractions: Fractions) -> StepResult<Amount> {
        let price = settle_call(self.property.try_get_price())?;
        let cost = price
            .checked_mul(fractions as Amount)
            .ok_or(StepError::Contract(Error::Overflow))?;
        self.authorize_spend(&self.buyer, cost)?;
        settle_call(self.property.try_buy(&self.buyer, &fractions))
    }

    pub fn deposit_dividends(&self, amount: Amount) -> StepResult<()> {
        self.authorize_spend(&self.owner, amount)?;
        settle_call(self.property.try_deposit_dividends(&self.owner, &amount))
    }

    pub fn query_claimable(&self) -> StepResult<Amount> {
        settle_call(self.property.try_claimable(&self.buyer))
    }

    /// Claim only when something is pending
    pub fn claim(&self) -> StepResult<Option<Amount>> {
        if self.query_claimable()? == 0 {
            return Ok(None);
        }
        settle_call(self.property.try_claim(&self.buyer)).map(Some)
    }

    pub fn final_balances(&self) -> StepResult<FinalBalances> {
        Ok(FinalBalances {
            fractions: settle_call(self.property.try_balance_of(&self.buyer))?,
            wallet: settle_token_call(self.payment.try_balance(&self.buyer))?,
        })
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(&self, plan: &Plan) -> StepResult<Report> {
        let snapshot = self.read_state()?;
        let cost = self.buy(plan.fractions_to_buy)?;
        self.deposit_dividends(plan.dividend)?;
        let pending = self.query_claimable()?;
        let claimed = self.claim()?;
        let balances = self.final_balances()?;

        Ok(Report {
            snapshot,
            cost,
            pending,
            claimed,
            balances,
        })
    }
}
