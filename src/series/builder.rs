//! Daily series construction.
//!
//! Same-day observations are summed, days are sorted, and the calendar between
//! the first and last observed day is filled in with zero demand.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{DailySeries, SalesObservation};
use crate::error::InputError;

/// Build the gap-filled daily series for a non-empty history.
pub fn build_daily_series(history: &[SalesObservation]) -> Result<DailySeries, InputError> {
    if history.is_empty() {
        return Err(InputError::EmptyHistory);
    }

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (idx, obs) in history.iter().enumerate() {
        if !(obs.quantity.is_finite() && obs.quantity >= 0.0) {
            return Err(InputError::InvalidQuantity {
                index: idx,
                value: obs.quantity,
            });
        }
        *by_day.entry(obs.date).or_insert(0.0) += obs.quantity;
    }

    let (&start, _) = by_day.first_key_value().ok_or(InputError::EmptyHistory)?;
    let (&end, _) = by_day.last_key_value().ok_or(InputError::EmptyHistory)?;

    let len = (end - start).num_days() as usize + 1;
    let mut values = vec![0.0; len];
    for (date, qty) in by_day {
        let idx = (date - start).num_days() as usize;
        values[idx] = qty;
    }

    DailySeries::new(start, values, end).ok_or(InputError::EmptyHistory)
}
