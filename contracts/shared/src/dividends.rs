//! Pro-rata dividend accounting.
//!
//! Deposits are counted in points (payment units scaled by `DIVIDEND_SCALE`)
//! and land in the pool's open round. While a round is open the number of
//! sold fractions is fixed, so a holder's share is `balance * points /
//! units_sold` with a single division whose remainder the position keeps.
//! A sale closes the round: its points are folded into the per-fraction total
//! of closed rounds and the division remainder opens the next round.
//!
//! Positions are settled before their balance changes. A holder's
//! entitlement only grows; claims record what was paid instead of shrinking
//! it, so sub-unit remainders survive between claims. A sender emptied by a
//! transfer hands its sub-unit remainder to the receiver.

use crate::constants::DIVIDEND_SCALE;
use crate::errors::Error;
use crate::types::{Amount, DividendPool, Fractions, HolderPosition};

/// `numerator / units` as whole points and remainder
fn split(numerator: i128, units: Fractions) -> Result<(i128, i128), Error> {
    let units = units as i128;
    Ok((
        numerator.checked_div(units).ok_or(Error::Overflow)?,
        numerator.checked_rem(units).ok_or(Error::Overflow)?,
    ))
}

/// `balance * points / units`, rounded up
fn share_ceil(balance: i128, points: i128, units: Fractions) -> Result<i128, Error> {
    if units == 0 {
        return Ok(0);
    }
    let units = units as i128;
    balance
        .checked_mul(points)
        .and_then(|p| p.checked_add(units - 1))
        .and_then(|p| p.checked_div(units))
        .ok_or(Error::Overflow)
}

/// Add `amount` to the open round, shared by `units_sold` fractions.
pub fn distribute(
    pool: &DividendPool,
    amount: Amount,
    units_sold: Fractions,
) -> Result<DividendPool, Error> {
    if amount <= 0 {
        return Err(Error::InvAmount);
    }
    if units_sold == 0 {
        return Err(Error::NoHolders);
    }

    let points = amount.checked_mul(DIVIDEND_SCALE).ok_or(Error::Overflow)?;

    Ok(DividendPool {
        total_deposited: pool
            .total_deposited
            .checked_add(amount)
            .ok_or(Error::Overflow)?,
        round_points: pool
            .round_points
            .checked_add(points)
            .ok_or(Error::Overflow)?,
        ..pool.clone()
    })
}

/// Close the open round before the number of sold fractions changes.
pub fn close_round(pool: &DividendPool, units_sold: Fractions) -> Result<DividendPool, Error> {
    let mut next = pool.clone();
    if units_sold > 0 {
        let (per_fraction, left) = split(pool.round_points, units_sold)?;
        next.per_fraction = pool
            .per_fraction
            .checked_add(per_fraction)
            .ok_or(Error::Overflow)?;
        next.round_points = left;
    }
    next.round = pool.round.checked_add(1).ok_or(Error::Overflow)?;
    Ok(next)
}

/// Points earned since the last settlement, with the remainder over
/// `units_sold` that is not a whole point yet
fn earned(
    position: &HolderPosition,
    pool: &DividendPool,
    units_sold: Fractions,
) -> Result<(i128, i128), Error> {
    if units_sold == 0 {
        return Ok((0, 0));
    }
    let balance = position.balance as i128;

    if position.round == pool.round {
        let numerator = pool
            .round_points
            .checked_sub(position.base_points)
            .and_then(|p| p.checked_mul(balance))
            .and_then(|p| p.checked_add(position.remainder))
            .ok_or(Error::Overflow)?;
        return split(numerator, units_sold);
    }
    if balance == 0 {
        return Ok((0, 0));
    }

    // closed rounds since the settlement, less what the settlement round
    // had already collected, plus the open round
    let closed = pool
        .per_fraction
        .checked_sub(position.base_per_fraction)
        .and_then(|d| d.checked_mul(balance))
        .ok_or(Error::Overflow)?;
    let collected = share_ceil(balance, position.base_points, position.base_units)?;
    let (open, remainder) = split(
        balance
            .checked_mul(pool.round_points)
            .ok_or(Error::Overflow)?,
        units_sold,
    )?;

    let total = closed
        .checked_sub(collected)
        .and_then(|t| t.checked_add(open))
        .ok_or(Error::Overflow)?;
    Ok((total.max(0), remainder))
}

/// Points a holder has earned over its lifetime, claimed ones included.
pub fn entitlement(
    position: &HolderPosition,
    pool: &DividendPool,
    units_sold: Fractions,
) -> Result<i128, Error> {
    let (points, _) = earned(position, pool, units_sold)?;
    position.accrued.checked_add(points).ok_or(Error::Overflow)
}

/// Bring a position up to date. Must run before its balance changes, with
/// `units_sold` as it stands once the open round is current.
pub fn settle(
    position: &HolderPosition,
    pool: &DividendPool,
    units_sold: Fractions,
) -> Result<HolderPosition, Error> {
    let (points, remainder) = earned(position, pool, units_sold)?;
    Ok(HolderPosition {
        balance: position.balance,
        round: pool.round,
        base_per_fraction: pool.per_fraction,
        base_points: pool.round_points,
        base_units: units_sold,
        accrued: position.accrued.checked_add(points).ok_or(Error::Overflow)?,
        remainder,
        total_claimed: position.total_claimed,
    })
}

/// Whole units a holder could withdraw now.
pub fn claimable(
    position: &HolderPosition,
    pool: &DividendPool,
    units_sold: Fractions,
) -> Result<Amount, Error> {
    let whole = entitlement(position, pool, units_sold)? / DIVIDEND_SCALE;
    whole
        .checked_sub(position.total_claimed)
        .ok_or(Error::Overflow)
}

/// Record a withdrawal of everything claimable. The unpaid sub-unit part of
/// the entitlement stays with the position.
pub fn take_claimable(
    position: &HolderPosition,
    pool: &DividendPool,
    units_sold: Fractions,
) -> Result<(HolderPosition, Amount), Error> {
    let amount = claimable(position, pool, units_sold)?;
    let remaining = HolderPosition {
        total_claimed: position
            .total_claimed
            .checked_add(amount)
            .ok_or(Error::Overflow)?,
        ..position.clone()
    };
    Ok((remaining, amount))
}

/// Move the sub-unit remainder of a sender left without fractions to the
/// receiver. Both positions must be settled against the same round.
/// Unclaimed whole units stay with the sender.
pub fn pass_remainder(
    from: &HolderPosition,
    to: &HolderPosition,
    units_sold: Fractions,
) -> Result<(HolderPosition, HolderPosition), Error> {
    if from.balance != 0 {
        return Ok((from.clone(), to.clone()));
    }

    let paid = from
        .total_claimed
        .checked_mul(DIVIDEND_SCALE)
        .ok_or(Error::Overflow)?;
    let dust = from.accrued.checked_sub(paid).ok_or(Error::Overflow)? % DIVIDEND_SCALE;
    let (carried, remainder) = split(
        to.remainder
            .checked_add(from.remainder)
            .ok_or(Error::Overflow)?,
        units_sold,
    )?;

    let sender = HolderPosition {
        accrued: from.accrued - dust,
        remainder: 0,
        ..from.clone()
    };
    let receiver = HolderPosition {
        accrued: to
            .accrued
            .checked_add(dust)
            .and_then(|a| a.checked_add(carried))
            .ok_or(Error::Overflow)?,
        remainder,
        ..to.clone()
    };
    Ok((sender, receiver))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives the pool the way the contract does
    #[derive(Default)]
    struct Book {
        pool: DividendPool,
        sold: Fractions,
    }

    impl Book {
        fn buy(&mut self, position: &HolderPosition, count: Fractions) -> HolderPosition {
            self.pool = close_round(&self.pool, self.sold).unwrap();
            self.sold += count;
            let mut settled = settle(position, &self.pool, self.sold).unwrap();
            settled.balance += count;
            settled
        }

        fn deposit(&mut self, amount: Amount) {
            self.pool = distribute(&self.pool, amount, self.sold).unwrap();
        }

        fn claimable(&self, position: &HolderPosition) -> Amount {
            claimable(position, &self.pool, self.sold).unwrap()
        }

        fn claim(&mut self, position: &HolderPosition) -> (HolderPosition, Amount) {
            let (after, paid) = take_claimable(position, &self.pool, self.sold).unwrap();
            self.pool.total_claimed += paid;
            (after, paid)
        }

        fn transfer(
            &mut self,
            from: &HolderPosition,
            to: &HolderPosition,
            count: Fractions,
        ) -> (HolderPosition, HolderPosition) {
            let mut sender = settle(from, &self.pool, self.sold).unwrap();
            let mut receiver = settle(to, &self.pool, self.sold).unwrap();
            sender.balance -= count;
            receiver.balance += count;
            pass_remainder(&sender, &receiver, self.sold).unwrap()
        }

        fn entitlement(&self, position: &HolderPosition) -> i128 {
            entitlement(position, &self.pool, self.sold).unwrap()
        }
    }

    fn fresh() -> HolderPosition {
        HolderPosition::default()
    }

    #[test]
    fn test_equal_holders_split_deposit_evenly() {
        for lot in [1, 3, 7] {
            let mut book = Book::default();
            let alice = book.buy(&fresh(), lot);
            let bob = book.buy(&fresh(), lot);
            book.deposit(200_000_000);

            assert_eq!(book.pool.total_deposited, 200_000_000);
            assert_eq!(book.claimable(&alice), 100_000_000);
            assert_eq!(book.claimable(&bob), 100_000_000);
        }
    }

    #[test]
    fn test_exact_shares_across_balance_splits() {
        let splits: [&[Fractions]; 6] = [
            &[3, 3],
            &[1, 4, 5],
            &[2, 3, 5, 7],
            &[7, 13],
            &[6, 6, 6, 6],
            &[999, 1],
        ];

        for split in splits {
            let sold: Fractions = split.iter().sum();
            let mut book = Book::default();
            let holders: [HolderPosition; 4] = core::array::from_fn(|i| match split.get(i) {
                Some(lot) => book.buy(&fresh(), *lot),
                None => fresh(),
            });

            // per-fraction dividend of 1_000_003 then 7 units
            book.deposit(sold as Amount * 1_000_003);
            book.deposit(sold as Amount * 7);

            for (position, lot) in holders.iter().zip(split.iter()) {
                assert_eq!(book.claimable(position), *lot as Amount * 1_000_010);
            }
        }
    }

    #[test]
    fn test_share_follows_balance() {
        let mut book = Book::default();
        let big = book.buy(&fresh(), 7);
        let small = book.buy(&fresh(), 3);
        book.deposit(1_000);

        assert_eq!(book.claimable(&big), 700);
        assert_eq!(book.claimable(&small), 300);
    }

    #[test]
    fn test_rejects_empty_pool_and_bad_amounts() {
        let pool = DividendPool::default();
        assert_eq!(distribute(&pool, 100, 0), Err(Error::NoHolders));
        assert_eq!(distribute(&pool, 0, 5), Err(Error::InvAmount));
        assert_eq!(distribute(&pool, -1, 5), Err(Error::InvAmount));
    }

    #[test]
    fn test_rounding_dust_is_paid_on_later_deposits() {
        // three holders of one fraction each
        let mut book = Book::default();
        let mut holders: [HolderPosition; 3] = core::array::from_fn(|_| book.buy(&fresh(), 1));

        book.deposit(10);
        for position in holders.iter_mut() {
            let (after, paid) = book.claim(position);
            assert_eq!(paid, 3);
            *position = after;
        }

        book.deposit(2);
        for position in holders.iter_mut() {
            let (after, paid) = book.claim(position);
            assert_eq!(paid, 1);
            assert_eq!(after.total_claimed, 4);
            *position = after;
        }
        assert_eq!(book.pool.total_claimed, book.pool.total_deposited);
    }

    #[test]
    fn test_late_buyer_skips_earlier_rounds() {
        let mut book = Book::default();
        let early = book.buy(&fresh(), 10);
        book.deposit(1_000);
        let late = book.buy(&fresh(), 10);
        assert_eq!(book.claimable(&late), 0);

        book.deposit(1_000);
        assert_eq!(book.claimable(&early), 1_500);
        assert_eq!(book.claimable(&late), 500);
    }

    #[test]
    fn test_emptied_position_hands_remainder_to_receiver() {
        let mut book = Book::default();
        let alice = book.buy(&fresh(), 1);
        let bob = book.buy(&fresh(), 1);
        book.deposit(3);

        let (alice, paid) = book.claim(&alice);
        assert_eq!(paid, 1);

        // alice's half unit travels with her fraction to bob
        let (alice, bob) = book.transfer(&alice, &bob, 1);
        assert_eq!(alice.balance, 0);
        assert_eq!(book.claimable(&alice), 0);
        assert_eq!(book.claimable(&bob), 2);

        let (bob, paid) = book.claim(&bob);
        assert_eq!(paid, 2);
        assert_eq!(book.pool.total_claimed, book.pool.total_deposited);

        book.deposit(5);
        assert_eq!(book.claimable(&alice), 0);
        assert_eq!(book.claimable(&bob), 5);
    }

    #[test]
    fn test_remainder_kept_while_balance_remains() {
        let mut book = Book::default();
        let alice = book.buy(&fresh(), 2);
        let bob = book.buy(&fresh(), 1);
        book.deposit(10);

        let (alice, _) = book.transfer(&alice, &bob, 1);
        assert_eq!(alice.accrued, book.entitlement(&alice));
        assert_eq!(alice.accrued, 6_666_666_666_666);
        assert_eq!(alice.remainder, 2);
    }

    #[test]
    fn test_distribution_never_exceeds_deposit() {
        let mut book = Book::default();
        let a = book.buy(&fresh(), 1);
        let b = book.buy(&fresh(), 2);
        book.deposit(7);
        let c = book.buy(&fresh(), 4);
        book.deposit(1_001);
        let (a, _) = book.claim(&a);
        let (b, d) = book.transfer(&b, &fresh(), 2);
        book.deposit(333);
        let d = book.buy(&d, 6);
        let (c, _) = book.claim(&c);
        book.deposit(99_999);
        let (d, c) = book.transfer(&d, &c, 3);

        let points: i128 = [&a, &b, &c, &d].iter().map(|p| book.entitlement(p)).sum();
        let deposited = book.pool.total_deposited * DIVIDEND_SCALE;
        assert!(points <= deposited);
        assert!(deposited - points < DIVIDEND_SCALE);

        let owed: Amount = [&a, &b, &c, &d].iter().map(|p| book.claimable(p)).sum();
        assert!(owed + book.pool.total_claimed <= book.pool.total_deposited);
    }

    #[test]
    fn test_settled_position_earns_nothing_twice() {
        let mut book = Book::default();
        let holder = book.buy(&fresh(), 5);
        book.deposit(500);

        let settled = settle(&holder, &book.pool, book.sold).unwrap();
        let again = settle(&settled, &book.pool, book.sold).unwrap();
        assert_eq!(settled, again);

        let (drained, paid) = book.claim(&again);
        assert_eq!(paid, 500);
        assert_eq!(book.claimable(&drained), 0);
    }

    #[test]
    fn test_closing_round_folds_points() {
        let pool = DividendPool {
            round_points: 10 * DIVIDEND_SCALE + 2,
            ..DividendPool::default()
        };
        let closed = close_round(&pool, 4).unwrap();
        assert_eq!(closed.round, 1);
        assert_eq!(closed.per_fraction, 2_500_000_000_000);
        assert_eq!(closed.round_points, 2);

        let empty = close_round(&DividendPool::default(), 0).unwrap();
        assert_eq!(empty.round, 1);
        assert_eq!(empty.per_fraction, 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            distribute(&DividendPool::default(), i128::MAX, 1),
            Err(Error::Overflow)
        );
    }
}
