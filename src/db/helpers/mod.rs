use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

use crate::{error::StorageError, models::ActivityState, utils::clock::parse_timestamp};

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_row_timestamp(id: i64, value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).map_err(|err| {
        StorageError::CorruptRow {
            id,
            reason: err.to_string(),
        }
        .into()
    })
}

pub fn parse_row_state(id: i64, value: &str) -> Result<ActivityState> {
    match value.parse::<ActivityState>() {
        Ok(state) if state.is_accounted() => Ok(state),
        Ok(state) => Err(StorageError::CorruptRow {
            id,
            reason: format!("state {state} is never persisted"),
        }
        .into()),
        Err(err) => Err(StorageError::CorruptRow {
            id,
            reason: err.to_string(),
        }
        .into()),
    }
}
