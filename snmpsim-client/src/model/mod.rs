//! Wire types of the REST API.

pub mod entities;
pub mod filter;
pub mod metrics;

use serde::{Deserialize, Deserializer, Serialize};

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: u16,
}

/// Decode `null` as `T::default()`. The server sends `null` for empty
/// containers and unset strings.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
