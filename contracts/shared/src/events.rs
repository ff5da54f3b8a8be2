use soroban_sdk::{symbol_short, Symbol};

// Property lifecycle
pub const PROPERTY_INITIALIZED: Symbol = symbol_short!("prop_init");
pub const OWNER_CHANGED: Symbol = symbol_short!("own_set");

// Sale
pub const FRACTIONS_SOLD: Symbol = symbol_short!("frac_sold");
pub const PROCEEDS_WITHDRAWN: Symbol = symbol_short!("proc_wdr");

// Dividends
pub const DIVIDENDS_DEPOSITED: Symbol = symbol_short!("div_dep");
pub const DIVIDENDS_CLAIMED: Symbol = symbol_short!("div_claim");
