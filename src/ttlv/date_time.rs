//! `#[serde(with = "…")]` helpers mapping `time::OffsetDateTime` fields
//! onto the TTLV DateTime type (signed POSIX seconds). The sentinel
//! newtype name tells the TTLV serde codec to re-type the long integer
//! it would otherwise produce.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

/// Marker name understood by the TTLV serde codec.
pub(crate) const DATE_TIME_NEWTYPE: &str = "$DateTime";

/// Marker name for the microsecond-precision DateTimeExtended type.
pub(crate) const DATE_TIME_EXTENDED_NEWTYPE: &str = "$DateTimeExtended";

pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_newtype_struct(DATE_TIME_NEWTYPE, &dt.unix_timestamp())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds =
        deserializer.deserialize_newtype_struct(DATE_TIME_NEWTYPE, TimestampVisitor)?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(de::Error::custom)
}

struct TimestampVisitor;

impl de::Visitor<'_> for TimestampVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a POSIX timestamp as a signed 64-bit integer")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(v)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(v).map_err(E::custom)
    }
}

/// Same mapping for `Option<OffsetDateTime>` fields.
pub mod option {
    use serde::{Deserializer, Serializer};
    use time::OffsetDateTime;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(dt: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize(deserializer).map(Some)
    }
}

/// Microsecond-precision DateTimeExtended mapping.
pub mod extended {
    use serde::{de, Deserializer, Serializer};
    use time::OffsetDateTime;

    use super::{TimestampVisitor, DATE_TIME_EXTENDED_NEWTYPE};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros = i64::try_from(dt.unix_timestamp_nanos() / 1000)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_newtype_struct(DATE_TIME_EXTENDED_NEWTYPE, &micros)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = deserializer
            .deserialize_newtype_struct(DATE_TIME_EXTENDED_NEWTYPE, TimestampVisitor)?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1000)
            .map_err(de::Error::custom)
    }
}

/// A plain serializable carrier for a DateTime value, used where a
/// timestamp travels outside a struct field (e.g. attribute values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmipDateTime(pub OffsetDateTime);

impl Serialize for KmipDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for KmipDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Self)
    }
}
