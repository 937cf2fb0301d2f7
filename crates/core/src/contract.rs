//! Futures contract codes and expiry dates.
//!
//! A contract code is a symbol followed by a two-digit year and a two-digit
//! delivery month, e.g. `ag2103`. Codes come from file names such as
//! `ag2103_20210104.csv`.

use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

/// A futures contract code taken from a file-name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractCode(String);

impl ContractCode {
    /// Wrap an already-extracted code. Codes are compared lowercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    /// Extract the code from a file name: everything before the first `_`.
    pub fn from_file_name(file_name: &str) -> Self {
        let prefix = file_name.split('_').next().unwrap_or(file_name);
        let prefix = prefix.split('.').next().unwrap_or(prefix);
        Self::new(prefix)
    }

    /// The code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol part: the leading non-digit run.
    pub fn symbol(&self) -> &str {
        let end = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Two-digit year and month following the symbol.
    pub fn year_month(&self) -> Result<(i32, u32)> {
        let digits = &self.0[self.symbol().len()..];
        let yy = digits
            .get(0..2)
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| Error::unparseable_contract(self.as_str()))?;
        let mm = digits
            .get(2..4)
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| Error::unparseable_contract(self.as_str()))?;

        let year = 2000 + yy.parse::<i32>().map_err(|_| Error::unparseable_contract(self.as_str()))?;
        let month = mm
            .parse::<u32>()
            .map_err(|_| Error::unparseable_contract(self.as_str()))?;
        if !(1..=12).contains(&month) {
            return Err(Error::unparseable_contract(self.as_str()));
        }
        Ok((year, month))
    }

    /// Calendar expiry: last day of the delivery month.
    pub fn expiry(&self) -> Result<NaiveDate> {
        let (year, month) = self.year_month()?;
        expiry_date(year, month).ok_or_else(|| Error::unparseable_contract(self.as_str()))
    }

    /// Sort key: resolvable expiries ascending, unresolvable last, code text on ties.
    pub fn expiry_order(&self, other: &Self) -> Ordering {
        match (self.expiry().ok(), other.expiry().ok()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for ContractCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last day of `month` in `year`. December is pinned to the 31st.
pub fn expiry_date(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}

/// Sort contract codes into rollover order.
pub fn sort_by_expiry(codes: &mut [ContractCode]) {
    codes.sort_by(|a, b| a.expiry_order(b));
}

/// Nominal rollover date: `rollover_days` calendar days before expiry.
///
/// Reported only; series assembly never truncates on it.
pub fn rollover_date(code: &ContractCode, rollover_days: u32) -> Result<NaiveDate> {
    let expiry = code.expiry()?;
    expiry
        .checked_sub_days(Days::new(u64::from(rollover_days)))
        .ok_or_else(|| Error::unparseable_contract(code.as_str()))
}
