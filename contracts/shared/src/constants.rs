/// Fixed-point scale of dividend points (one payment unit = `DIVIDEND_SCALE` points)
pub const DIVIDEND_SCALE: i128 = 1_000_000_000_000;

/// Fractions are whole units
pub const FRACTION_DECIMALS: u32 = 0;

/// Smallest units per whole native coin
pub const SUN_PER_COIN: i128 = 1_000_000;

/// Stablecoin micro-units per whole unit (6 decimals)
pub const MICRO_PER_UNIT: i128 = 1_000_000;

// Storage TTL, in ledgers (~5s each)
pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const HOLDER_BUMP_AMOUNT: u32 = 90 * DAY_IN_LEDGERS;
pub const HOLDER_LIFETIME_THRESHOLD: u32 = HOLDER_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Upper bound on name/symbol length accepted at initialization
pub const MAX_LABEL_LEN: u32 = 64;
