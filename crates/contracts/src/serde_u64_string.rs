//! Optional seed that accepts either a JSON string or number.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(seed) => serializer.serialize_str(&seed.to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedInput {
        String(String),
        Number(u64),
        Null(()),
    }

    match SeedInput::deserialize(deserializer)? {
        SeedInput::String(raw) if raw.trim().is_empty() => Ok(None),
        SeedInput::String(raw) => raw.trim().parse::<u64>().map(Some).map_err(D::Error::custom),
        SeedInput::Number(value) => Ok(Some(value)),
        SeedInput::Null(()) => Ok(None),
    }
}
