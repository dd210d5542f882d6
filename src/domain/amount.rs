//! Custom serde module for token amounts written as decimal strings or integers.

use num_bigint::BigUint;
use serde::{self, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(u64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => Ok(BigUint::from(n)),
        RawAmount::Text(s) => parse_amount(&s).map_err(serde::de::Error::custom),
    }
}

fn parse_amount(s: &str) -> Result<BigUint, String> {
    let s = s.trim().replace('_', "");
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    s.parse::<BigUint>()
        .map_err(|_| format!("invalid amount: {}", s))
}
