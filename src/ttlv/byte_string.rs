//! `#[serde(with = "…")]` helpers mapping `Vec<u8>` fields onto the
//! TTLV ByteString type. Without them, serde walks a `Vec<u8>` as a
//! sequence of integers.

use serde::{de, Deserializer, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_bytes(bytes)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_byte_buf(ByteStringVisitor)
}

struct ByteStringVisitor;

impl de::Visitor<'_> for ByteStringVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a TTLV ByteString")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(v)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        hex::decode(v).map_err(E::custom)
    }
}

/// Serializes a byte slice as a TTLV ByteString from hand-written
/// `SerializeStruct` implementations.
pub(crate) struct ByteStringSer<'a>(pub(crate) &'a [u8]);

impl serde::Serialize for ByteStringSer<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0)
    }
}

/// Owned ByteString carrier for hand-written map visitors.
pub(crate) struct ByteStringDe(pub(crate) Vec<u8>);

impl<'de> serde::Deserialize<'de> for ByteStringDe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Self)
    }
}

/// Same mapping for `Option<Vec<u8>>` fields.
pub mod option {
    use serde::{Deserializer, Serializer};

    use super::ByteStringVisitor;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_bytes(b),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_byte_buf(ByteStringVisitor).map(Some)
    }
}
