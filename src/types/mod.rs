//! Core value types shared across the crate.

mod address;

pub use address::{Address, AddressError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Content-derived identifier
pub type Id = crate::crypto::Hash;

/// One hour in milliseconds
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Current wall-clock time in milliseconds
#[must_use]
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Base units per whole coin
pub const UNITS_PER_COIN: u128 = 1_000_000_000_000_000_000;

/// A native-currency amount in base units (1 coin = 10^18 units)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// From raw base units
    #[must_use]
    pub const fn from_raw(units: u128) -> Self {
        Self(units)
    }

    /// From whole coins
    #[must_use]
    pub const fn from_coins(coins: u64) -> Self {
        Self(coins as u128 * UNITS_PER_COIN)
    }

    /// From thousandths of a coin
    #[must_use]
    pub const fn from_millicoins(milli: u64) -> Self {
        Self(milli as u128 * (UNITS_PER_COIN / 1_000))
    }

    /// Raw base units
    #[must_use]
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Whole coins, truncated
    #[must_use]
    pub const fn whole_coins(&self) -> u128 {
        self.0 / UNITS_PER_COIN
    }

    /// True if zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating addition
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_COIN;
        let frac = self.0 % UNITS_PER_COIN;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac = format!("{frac:018}");
            write!(f, "{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}
