//! Players and prices

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use crate::position::Position;

/// Catalog identifier of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A price in tenths of a million (`Price::from_tenths(45)` is £4.5m)
///
/// Signed so that the remaining budget of an over-budget squad can be
/// represented. On the wire it is a plain decimal number of millions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(i32);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    /// Rounds to the nearest tenth
    pub fn from_millions(millions: f64) -> Self {
        Self((millions * 10.0).round() as i32)
    }

    pub const fn tenths(self) -> i32 {
        self.0
    }

    pub fn as_millions(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}£{}.{}m", sign, abs / 10, abs % 10)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_millions())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let millions = f64::deserialize(deserializer)?;
        if !millions.is_finite() {
            return Err(serde::de::Error::custom("price must be a finite number"));
        }
        Ok(Price::from_millions(millions))
    }
}

/// A catalog player; immutable reference data once seeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub club: String,
    pub position: Position,
    pub price: Price,
    pub nationality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u8>,
}
