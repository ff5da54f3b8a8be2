use soroban_sdk::{contracttype, Address, String};

/// Amount of the payment asset, in its smallest unit
pub type Amount = i128;

/// Whole-unit fraction count
pub type Fractions = u32;

/// Asset buyers pay with and dividends are paid in
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PaymentAsset {
    /// Chain native coin; the payer authorizes a direct transfer in the same call
    Native(Address),
    /// Standard fungible token spent through a prior `approve`
    Token(Address),
}

impl PaymentAsset {
    pub fn address(&self) -> &Address {
        match self {
            PaymentAsset::Native(token) | PaymentAsset::Token(token) => token,
        }
    }
}

/// Immutable parameters a property token is deployed with
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyConfig {
    pub name: String,
    pub symbol: String,
    pub max_fractions: Fractions,
    pub price_per_fraction: Amount,
    pub property_address: String,
    pub metadata_uri: String,
    pub payment: PaymentAsset,
}

/// Read-only projection of a property token
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyInfo {
    pub config: PropertyConfig,
    pub owner: Address,
    pub units_sold: Fractions,
    pub unsold: Fractions,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SaleState {
    pub units_sold: Fractions,
    /// Sale revenue held by the contract until the owner withdraws it
    pub proceeds: Amount,
}

/// Dividend ledger. Points are payment units scaled by `DIVIDEND_SCALE`.
///
/// Deposits land in the open round, which is shared by the fractions sold
/// while it lasts. A sale changes the fraction count and so closes the round,
/// folding its points into `per_fraction`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DividendPool {
    pub total_deposited: Amount,
    pub total_claimed: Amount,
    /// Points per fraction from closed rounds
    pub per_fraction: i128,
    /// Id of the open round
    pub round: u32,
    /// Points deposited into the open round, shared by all sold fractions
    pub round_points: i128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HolderPosition {
    pub balance: Fractions,
    /// Round of the last settlement
    pub round: u32,
    /// Pool `per_fraction` at the last settlement
    pub base_per_fraction: i128,
    /// Pool `round_points` at the last settlement
    pub base_points: i128,
    /// Fractions sold at the last settlement
    pub base_units: Fractions,
    /// Points earned up to the last settlement, claimed ones included
    pub accrued: i128,
    /// Fraction of a point earned in the settlement round, over `base_units`
    pub remainder: i128,
    pub total_claimed: Amount,
}
