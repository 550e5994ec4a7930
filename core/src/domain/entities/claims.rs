//! Claim set carried in the signed token payload.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique token identifier
pub const JTI: &str = "jti";
/// Issued-at timestamp
pub const IAT: &str = "iat";
/// Not-before timestamp
pub const NBF: &str = "nbf";
/// Expiry timestamp
pub const EXP: &str = "exp";
/// Issuer
pub const ISS: &str = "iss";
/// Audience
pub const AUD: &str = "aud";
/// Configuration version tag
pub const VER: &str = "ver";

/// Claims that rotation never carries over to the successor token
pub const ROTATION_EXCLUDED: [&str; 6] = [ISS, AUD, EXP, NBF, IAT, JTI];

/// Mapping from claim name to JSON value
///
/// Reserved lifecycle claims have typed accessors; everything else is
/// application payload and stays opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set a claim, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Builder-style `insert`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a timestamp claim as integer epoch seconds
    pub fn set_time(&mut self, name: impl Into<String>, at: DateTime<Utc>) {
        self.insert(name, at.timestamp());
    }

    /// Merge `other` into this set; values from `other` win
    pub fn merge(&mut self, other: ClaimSet) {
        for (name, value) in other.0 {
            self.0.insert(name, value);
        }
    }

    /// Copy of this set without the named claims
    pub fn without(&self, names: &[&str]) -> ClaimSet {
        self.0
            .iter()
            .filter(|(name, _)| !names.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Copy of this set with null-valued claims dropped
    pub fn compact(&self) -> ClaimSet {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Rewrite a timestamp claim to integer epoch seconds
    ///
    /// Accepts RFC 3339 strings and fractional numbers. Values that cannot
    /// be read as a time are left untouched for the verifier to reject.
    pub fn normalize_time(&mut self, name: &str) {
        let normalized = match self.0.get(name) {
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|at| at.timestamp()),
            Some(Value::Number(n)) if !n.is_i64() && !n.is_u64() => n.as_f64().map(|f| f.trunc() as i64),
            _ => None,
        };
        if let Some(seconds) = normalized {
            self.0.insert(name.to_string(), Value::from(seconds));
        }
    }

    pub fn jti(&self) -> Option<&str> {
        self.str_claim(JTI)
    }

    pub fn iss(&self) -> Option<&str> {
        self.str_claim(ISS)
    }

    /// Audience when carried as a single string
    pub fn aud(&self) -> Option<&str> {
        self.str_claim(AUD)
    }

    pub fn ver(&self) -> Option<&Value> {
        self.0.get(VER).filter(|v| !v.is_null())
    }

    pub fn exp(&self) -> Option<i64> {
        self.int_claim(EXP)
    }

    pub fn iat(&self) -> Option<i64> {
        self.int_claim(IAT)
    }

    pub fn nbf(&self) -> Option<i64> {
        self.int_claim(NBF)
    }

    /// Expiry as a time value
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp().and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    fn int_claim(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
