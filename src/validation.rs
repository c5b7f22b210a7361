//! Client-side validation of credit card expiration dates.
//!
//! Card forms carry two-digit years, so near the end of a century a year that
//! looks "past" (e.g. `01` while it is 2099) is really a near-future year of
//! the next century. [`ExpiryValidator`] accepts such years as long as they
//! fall within [`MAXIMUM_VALID_YEAR_DIFFERENCE`] years of the current one.
//!
//! ```
//! use chrono::NaiveDate;
//! use univapay_core::validation::{ExpiryValidator, FixedClock};
//!
//! let today = NaiveDate::from_ymd_opt(2099, 6, 1).unwrap();
//! let validator = ExpiryValidator::with_clock(FixedClock(today));
//!
//! assert!(validator.is_valid("01", "05"));
//! assert!(validator.is_valid("06", "2099"));
//! assert!(!validator.is_valid("05", "99"));
//! assert!(!validator.is_valid("13", "25"));
//! ```

use chrono::{Datelike, Local, NaiveDate};

/// Maximum number of years in advance an expiration date is trusted to be valid.
pub const MAXIMUM_VALID_YEAR_DIFFERENCE: u32 = 20;

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Validates credit card expiration dates against a reference clock.
#[derive(Debug, Clone, Default)]
pub struct ExpiryValidator<C: Clock = SystemClock> {
    clock: C,
}

impl ExpiryValidator<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> ExpiryValidator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Whether `month` / `year` form a usable card expiration date.
    ///
    /// `month` is a one or two digit month, `year` is a two or four digit year.
    /// Every failure, structural or not, yields `false`.
    pub fn is_valid(&self, month: &str, year: &str) -> bool {
        let Some(month) = parse_digits(month) else {
            reject("month is empty or not numeric");
            return false;
        };
        if !(1..=12).contains(&month) {
            reject("month out of range");
            return false;
        }

        // Four digit years drop their century.
        let year = match year.len() {
            2 => parse_digits(year),
            4 => parse_digits(year).map(|y| y % 100),
            _ => None,
        };
        let Some(year) = year else {
            reject("year is not two or four digits");
            return false;
        };

        let today = self.clock.today();
        let current_year = today.year().rem_euclid(100) as u32;
        let current_month = today.month();

        if year == current_year && month < current_month {
            reject("expired earlier this year");
            return false;
        }

        if year < current_year {
            // A two digit year behind the current one may belong to the next century.
            let adjusted_year = year + 100;
            if adjusted_year - current_year > MAXIMUM_VALID_YEAR_DIFFERENCE {
                reject("year is in the past");
                return false;
            }
        }

        if year > current_year + MAXIMUM_VALID_YEAR_DIFFERENCE {
            reject("year is too far in the future");
            return false;
        }

        true
    }
}

/// Checks an expiration date against the system clock.
pub fn is_valid_expiry(month: &str, year: &str) -> bool {
    ExpiryValidator::new().is_valid(month, year)
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn reject(reason: &str) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Expiry date rejected: {reason}");
}
