//! Reading JSON `null` as the default value
//!
//! Files written by the editor store unset strings and lists as `null`. Use
//! with `#[serde(deserialize_with = "crate::core::nullable::deserialize", default)]`
//! so that both a missing key and `null` give `T::default()`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + Default,
    D: Deserializer<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
