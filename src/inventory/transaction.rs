use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a stock movement.
///
/// `Adjust` counts as an addition when totals are computed. Any other value in
/// the `type` field, or no string at all, parses as `Unknown` and contributes
/// to neither total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum TransactionKind {
    #[serde(rename = "IN", alias = "in")]
    In,
    #[serde(rename = "OUT", alias = "out")]
    Out,
    #[serde(rename = "ADJUST", alias = "adjust")]
    Adjust,
    #[default]
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl TransactionKind {
    /// Case-insensitive label lookup; unrecognized labels map to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "IN" => TransactionKind::In,
            "OUT" => TransactionKind::Out,
            "ADJUST" => TransactionKind::Adjust,
            _ => TransactionKind::Unknown,
        }
    }

    /// True for movements that add stock
    pub fn is_inbound(self) -> bool {
        matches!(self, TransactionKind::In | TransactionKind::Adjust)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::In => "IN",
            TransactionKind::Out => "OUT",
            TransactionKind::Adjust => "ADJUST",
            TransactionKind::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// One inventory movement, as stored in the ledger or exported by the data store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: TransactionKind,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: f64,
    /// Timestamp as written by the producer; only its calendar day matters
    #[serde(
        default,
        alias = "checkin_date",
        alias = "date",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
}

/// Strings come through as-is; null, numbers, booleans, arrays and objects
/// become None.
struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(TextVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TextVisitor)
}

/// Anything that is not a string becomes "", which no day policy can parse.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<TransactionKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?
        .map(|label| TransactionKind::from_label(&label))
        .unwrap_or_default())
}

/// Accepts numbers, numeric strings and null; everything else becomes 0.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct QuantityVisitor;

    impl<'de> Visitor<'de> for QuantityVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a quantity")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(if v.is_finite() { v } else { 0.0 })
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            Ok(v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|q| q.is_finite())
                .unwrap_or(0.0))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<f64, D::Error> {
            d.deserialize_any(QuantityVisitor)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<f64, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<f64, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(QuantityVisitor)
}
