//! Deserializers for closed-taxonomy collections that drop unknown keys.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

pub fn key_set<'de, D, K>(deserializer: D) -> Result<BTreeSet<K>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SetInput {
        List(Vec<String>),
        Single(String),
        Null(()),
    }

    let raw = match SetInput::deserialize(deserializer)? {
        SetInput::List(values) => values,
        SetInput::Single(value) => vec![value],
        SetInput::Null(()) => Vec::new(),
    };
    Ok(raw
        .iter()
        .filter_map(|value| value.parse::<K>().ok())
        .collect())
}

pub fn key_map<'de, D, K>(deserializer: D) -> Result<BTreeMap<K, f64>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
{
    let raw = Option::<BTreeMap<String, Option<f64>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| Some((key.parse::<K>().ok()?, value?)))
        .collect())
}
