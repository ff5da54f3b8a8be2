use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum Error {
    NotInit = 1,
    AlreadyInit = 2,
    Unauthorized = 3,
    InvInput = 4,

    // Sale errors
    SoldOut = 5,
    InvCount = 6,
    InsufPay = 7,
    InsufAllow = 8,

    // Dividend errors
    InvAmount = 9,
    NoHolders = 10,

    // Holder errors
    InsufBal = 11,
    SelfTransfer = 12,

    // Treasury errors
    InsufFunds = 13,

    Overflow = 14,
}
