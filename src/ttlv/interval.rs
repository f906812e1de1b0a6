//! `#[serde(with = "…")]` helpers mapping `u32` second counts onto the
//! TTLV Interval type instead of the Integer type serde would infer.

use serde::{de, Deserializer, Serializer};

/// Marker name understood by the TTLV serde codec.
pub(crate) const INTERVAL_NEWTYPE: &str = "$Interval";

pub fn serialize<S>(seconds: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_newtype_struct(INTERVAL_NEWTYPE, seconds)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_newtype_struct(INTERVAL_NEWTYPE, SecondsVisitor)
}

struct SecondsVisitor;

impl de::Visitor<'_> for SecondsVisitor {
    type Value = u32;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("an interval as an unsigned 32-bit second count")
    }

    fn visit_u32<E>(self, v: u32) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(v)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u32::try_from(v).map_err(E::custom)
    }
}

/// Same mapping for `Option<u32>` fields.
pub mod option {
    use serde::{Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(seconds: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match seconds {
            Some(s) => super::serialize(s, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize(deserializer).map(Some)
    }
}
