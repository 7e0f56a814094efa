// 🎂 Age Calculator - Whole years at the competition reference date
// Calendar dates only: no timezone is involved on either side.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Age limits are checked on 1 October of the competition year
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy)]
pub struct AgeCalculator {
    reference_date: NaiveDate,
}

impl AgeCalculator {
    pub fn new(reference_date: NaiveDate) -> Self {
        AgeCalculator { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Age in whole years, None if the birth date is missing or unparsable
    ///
    /// A birth date after the reference date is treated as bad data.
    pub fn age_years(&self, birth_date: Option<&str>) -> Option<u32> {
        let birth = parse_birth_date(birth_date?)?;
        let reference = self.reference_date;

        let mut age = reference.year() - birth.year();
        if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }

        u32::try_from(age).ok()
    }
}

impl Default for AgeCalculator {
    fn default() -> Self {
        Self::new(default_reference_date())
    }
}

/// Parse date from string (supports YYYY-MM-DD, YYYY/MM/DD and ISO datetimes, `T` or space separated)
pub fn parse_birth_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y/%m/%d") {
        return Some(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(dt.date());
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
