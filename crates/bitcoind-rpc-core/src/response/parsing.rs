use bitcoin::{BlockHash, Txid, Wtxid};

use crate::amount::Amount;
use crate::error::ResponseParseError;
use crate::validator::is_hash;

use super::json_type;

const HASH_LEN: usize = 64;

pub(crate) static NULL: serde_json::Value = serde_json::Value::Null;

/// Typed field access over one JSON object with a fixed error context.
///
/// Missing and `null` fields are treated alike. Every failure names the
/// field, the expected shape and the JSON type actually found.
pub(crate) struct FieldReader<'a> {
    context: &'a str,
    prefix: String,
    map: &'a serde_json::Map<String, serde_json::Value>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(
        context: &'a str,
        value: &'a serde_json::Value,
    ) -> Result<Self, ResponseParseError> {
        Self::with_prefix(context, String::new(), "result", value)
    }

    /// Reader for an object nested under `field` of this one.
    pub(crate) fn nested(
        &self,
        field: &str,
        value: &'a serde_json::Value,
    ) -> Result<FieldReader<'a>, ResponseParseError> {
        let path = format!("{}{field}", self.prefix);
        Self::with_prefix(self.context, format!("{path}."), &path, value)
    }

    fn with_prefix(
        context: &'a str,
        prefix: String,
        field: &str,
        value: &'a serde_json::Value,
    ) -> Result<Self, ResponseParseError> {
        match value.as_object() {
            Some(map) => Ok(Self {
                context,
                prefix,
                map,
            }),
            None => Err(ResponseParseError {
                context: context.to_owned(),
                field: field.to_owned(),
                expected: "object",
                got: json_type(value),
            }),
        }
    }

    pub(crate) fn error(
        &self,
        field: &str,
        expected: &'static str,
        got: &serde_json::Value,
    ) -> ResponseParseError {
        ResponseParseError {
            context: self.context.to_owned(),
            field: format!("{}{field}", self.prefix),
            expected,
            got: json_type(got),
        }
    }

    /// The field's value, `None` when missing or `null`.
    pub(crate) fn raw(&self, field: &str) -> Option<&'a serde_json::Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn required(
        &self,
        field: &str,
        expected: &'static str,
    ) -> Result<&'a serde_json::Value, ResponseParseError> {
        self.raw(field)
            .ok_or_else(|| self.error(field, expected, &serde_json::Value::Null))
    }

    pub(crate) fn string(&self, field: &str) -> Result<String, ResponseParseError> {
        let value = self.required(field, "string")?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.error(field, "string", value))
    }

    pub(crate) fn opt_string(&self, field: &str) -> Result<Option<String>, ResponseParseError> {
        match self.raw(field) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_owned()))
                .ok_or_else(|| self.error(field, "string", value)),
        }
    }

    pub(crate) fn bool(&self, field: &str) -> Result<bool, ResponseParseError> {
        let value = self.required(field, "bool")?;
        value.as_bool().ok_or_else(|| self.error(field, "bool", value))
    }

    pub(crate) fn opt_bool(&self, field: &str) -> Result<Option<bool>, ResponseParseError> {
        match self.raw(field) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.error(field, "bool", value)),
        }
    }

    pub(crate) fn integer<T>(&self, field: &str) -> Result<T, ResponseParseError>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let value = self.required(field, "int")?;
        parse_integer(value).ok_or_else(|| self.error(field, "int", value))
    }

    pub(crate) fn opt_integer<T>(&self, field: &str) -> Result<Option<T>, ResponseParseError>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        match self.raw(field) {
            None => Ok(None),
            Some(value) => parse_integer(value)
                .map(Some)
                .ok_or_else(|| self.error(field, "int", value)),
        }
    }

    /// Strictly positive integer.
    pub(crate) fn positive_integer(&self, field: &str) -> Result<u64, ResponseParseError> {
        let value = self.required(field, "int > 0")?;
        value
            .as_u64()
            .filter(|n| *n > 0)
            .ok_or_else(|| self.error(field, "int > 0", value))
    }

    /// The exact decimal text of a JSON number.
    pub(crate) fn number_text(&self, field: &str) -> Result<String, ResponseParseError> {
        let value = self.required(field, "number")?;
        match value {
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(self.error(field, "number", other)),
        }
    }

    pub(crate) fn amount(&self, field: &str, scale: u32) -> Result<Amount, ResponseParseError> {
        let value = self.required(field, "amount")?;
        Amount::from_json(value, scale).ok_or_else(|| self.error(field, "amount", value))
    }

    /// A 64-character lowercase hex hash, kept as text.
    pub(crate) fn hash(&self, field: &str) -> Result<String, ResponseParseError> {
        let value = self.required(field, "hash")?;
        match value.as_str() {
            Some(s) if is_hash(s, HASH_LEN) => Ok(s.to_owned()),
            _ => Err(self.error(field, "hash", value)),
        }
    }

    pub(crate) fn txid(&self, field: &str) -> Result<Txid, ResponseParseError> {
        self.typed_hash(field)
    }

    pub(crate) fn wtxid(&self, field: &str) -> Result<Wtxid, ResponseParseError> {
        self.typed_hash(field)
    }

    pub(crate) fn block_hash(&self, field: &str) -> Result<BlockHash, ResponseParseError> {
        self.typed_hash(field)
    }

    pub(crate) fn opt_block_hash(
        &self,
        field: &str,
    ) -> Result<Option<BlockHash>, ResponseParseError> {
        match self.raw(field) {
            None => Ok(None),
            Some(_) => self.block_hash(field).map(Some),
        }
    }

    fn typed_hash<H: std::str::FromStr>(&self, field: &str) -> Result<H, ResponseParseError> {
        let text = self.hash(field)?;
        text.parse().map_err(|_| {
            self.error(field, "hash", &serde_json::Value::String(text.clone()))
        })
    }

    /// Non-empty hex string of whole bytes.
    pub(crate) fn hex(&self, field: &str) -> Result<String, ResponseParseError> {
        let value = self.required(field, "hex string")?;
        match value.as_str() {
            Some(s) if is_hex(s) => Ok(s.to_owned()),
            _ => Err(self.error(field, "hex string", value)),
        }
    }

    pub(crate) fn array(&self, field: &str) -> Result<&'a Vec<serde_json::Value>, ResponseParseError> {
        let value = self.required(field, "array")?;
        value.as_array().ok_or_else(|| self.error(field, "array", value))
    }
}

fn parse_integer<T>(value: &serde_json::Value) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(n) = value.as_u64() {
        return T::try_from(n).ok();
    }
    value.as_i64().and_then(|n| T::try_from(n).ok())
}

pub(crate) fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `["abcdef12..."]`, the short form used in error contexts.
pub(crate) fn short_id(hash: Option<&str>) -> String {
    match hash {
        Some(h) if h.len() >= 8 && h.is_char_boundary(8) => format!("[\"{}...\"]", &h[..8]),
        Some(h) => format!("[\"{h}\"]"),
        None => "[unknown]".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reports_null() {
        let value = serde_json::json!({"a": 1});
        let reader = FieldReader::new("Ctx", &value).unwrap();
        let err = reader.string("b").unwrap_err();
        assert_eq!(err.field, "b");
        assert_eq!(err.expected, "string");
        assert_eq!(err.got, "null");
    }

    #[test]
    fn nested_fields_carry_their_path() {
        let value = serde_json::json!({"vin": [{"sequence": "x"}]});
        let reader = FieldReader::new("Ctx", &value).unwrap();
        let inner = reader.nested("vin[0]", &reader.array("vin").unwrap()[0]).unwrap();
        let err = inner.integer::<u32>("sequence").unwrap_err();
        assert_eq!(err.field, "vin[0].sequence");
        assert_eq!(err.got, "string");
    }

    #[test]
    fn integers_respect_target_range() {
        let value = serde_json::json!({"neg": -1, "big": 5_000_000_000u64, "ok": 7});
        let reader = FieldReader::new("Ctx", &value).unwrap();
        assert!(reader.integer::<u32>("neg").is_err());
        assert_eq!(reader.integer::<i64>("neg").unwrap(), -1);
        assert!(reader.integer::<u32>("big").is_err());
        assert_eq!(reader.integer::<u32>("ok").unwrap(), 7);
        assert!(reader.positive_integer("neg").is_err());
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id(Some("0123456789abcdef")), "[\"01234567...\"]");
        assert_eq!(short_id(None), "[unknown]");
    }
}
