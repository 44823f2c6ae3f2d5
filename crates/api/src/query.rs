//! Query parameter types for the `/checks` handlers.

use bounce_core::check::CheckStatus;
use bounce_core::search::CheckFilter;
use bounce_core::types::{parse_day, today, Day};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?q=&status=&fallback=` on the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    /// A status name; blank or `all` means no status filter.
    pub status: Option<String>,
    /// `cache` allows serving the last snapshot when the store is down.
    pub fallback: Option<String>,
}

impl ListParams {
    pub fn filter(&self) -> AppResult<CheckFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(
                raw.parse::<CheckStatus>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
        };
        Ok(CheckFilter {
            q: self.q.clone(),
            status,
        })
    }

    pub fn allows_cache(&self) -> AppResult<bool> {
        match self.fallback.as_deref().map(str::trim) {
            None | Some("") | Some("none") => Ok(false),
            Some("cache") => Ok(true),
            Some(other) => Err(AppError::BadRequest(format!(
                "unknown fallback '{other}', expected 'cache' or 'none'"
            ))),
        }
    }
}

/// `?as_of=yyyy-mm-dd` for endpoints that depend on "today".
#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
    pub as_of: Option<String>,
}

impl AsOfParams {
    /// The requested day, or the current UTC day when absent.
    pub fn day(&self) -> AppResult<Day> {
        match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Ok(today()),
            Some(raw) => parse_day(raw)
                .ok_or_else(|| AppError::BadRequest(format!("invalid as_of date '{raw}'"))),
        }
    }
}
