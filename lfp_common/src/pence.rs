use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------        Pence         ---------------------------------------------------------
/// A sterling amount, held as a whole number of pence.
///
/// The finance ledger and the payment provider both talk in decimal pounds (`150`, `150.5`). Those values are converted
/// to pence at the serde boundary so that every comparison inside the service is exact.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Pence(i64);

op!(binary Pence, Add, add);
op!(binary Pence, Sub, sub);
op!(inplace Pence, SubAssign, sub_assign);
op!(unary Pence, Neg, neg);

impl Sum for Pence {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Pence> for Pence {
    fn sum<I: Iterator<Item = &'a Pence>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in pence: {0}")]
pub struct PenceConversionError(String);

impl From<i64> for Pence {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Pence {
    type Error = PenceConversionError;

    /// Converts a decimal pounds value into pence. Values with a fraction of a penny are rejected. Only the error
    /// that comes from representing pounds as a float is tolerated.
    fn try_from(pounds: f64) -> Result<Self, Self::Error> {
        if !pounds.is_finite() {
            return Err(PenceConversionError(format!("{pounds} is not a finite amount")));
        }
        let scaled = pounds * 100.0;
        let pence = scaled.round();
        if pence.abs() > i64::MAX as f64 {
            return Err(PenceConversionError(format!("{pounds} is too large")));
        }
        let tolerance = (4.0 * f64::EPSILON * scaled.abs()).max(1e-6);
        if (scaled - pence).abs() > tolerance {
            return Err(PenceConversionError(format!("{pounds} is not a whole number of pence")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(pence as i64))
    }
}

impl FromStr for Pence {
    type Err = PenceConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pounds = s.trim().parse::<f64>().map_err(|e| PenceConversionError(format!("{s}: {e}")))?;
        Self::try_from(pounds)
    }
}

impl Display for Pence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}£{}.{:02}", abs / 100, abs % 100)
    }
}

impl Pence {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_pounds(pounds: i64) -> Self {
        Self(pounds * 100)
    }

    /// The amount in pounds, as a float. Only use this at the edges (wire formats).
    pub fn as_pounds(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Shortest decimal representation of the amount in pounds, e.g. `150`, `150.5` or `0.05`.
    pub fn to_pounds_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (pounds, pence) = (abs / 100, abs % 100);
        match pence {
            0 => format!("{sign}{pounds}"),
            p if p % 10 == 0 => format!("{sign}{pounds}.{}", p / 10),
            p => format!("{sign}{pounds}.{p:02}"),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Serialize for Pence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_pounds())
    }
}

impl<'de> Deserialize<'de> for Pence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pounds = f64::deserialize(deserializer)?;
        Pence::try_from(pounds).map_err(serde::de::Error::custom)
    }
}
