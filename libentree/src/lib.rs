//! This is a library that provides the content model of the Entree youth-houses
//! network, access to the headless CMS that stores it, and the pipeline that
//! turns youth-house records into markers on an interactive map.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

pub mod cosmic;
pub mod error;
pub mod map;
pub mod record;
pub mod source;
pub mod text;

pub use error::Error;
pub use error::Result;

/// Deserialize an optional value, treating an empty (or whitespace-only) string
/// as `None`. The CMS sends `""` for fields that were never filled in.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => FromStr::from_str(s)
            .map_err(serde::de::Error::custom)
            .map(Some),
    }
}
