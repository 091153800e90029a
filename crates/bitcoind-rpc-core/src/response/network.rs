use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ResponseParseError;

use super::parsing::FieldReader;

static SUBVERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?-u:[\w\s])+:(?-u:[\w.()])+/$").expect("static subversion pattern"));

/// The subset of `getnetworkinfo` this crate relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub version: u64,
    /// User agent, e.g. `/Satoshi:0.18.0/`.
    pub subversion: String,
    pub protocol_version: u64,
    pub connections: u64,
}

impl NetworkInfo {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ResponseParseError> {
        let r = FieldReader::new("Network info", value)?;
        let version = r.positive_integer("version")?;

        let subversion = r.string("subversion")?;
        if !SUBVERSION.is_match(&subversion) {
            return Err(r.error(
                "subversion",
                "/name:version/",
                &serde_json::Value::String(subversion),
            ));
        }

        Ok(Self {
            version,
            subversion,
            protocol_version: r.positive_integer("protocolversion")?,
            connections: r.integer("connections")?,
        })
    }

    /// Daemon name and version from the user agent: `("Satoshi", "0.18.0")`.
    pub fn agent(&self) -> (&str, &str) {
        let trimmed = self.subversion.trim_matches('/');
        trimmed.split_once(':').unwrap_or((trimmed, ""))
    }
}
