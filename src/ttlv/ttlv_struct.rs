use time::OffsetDateTime;

use super::{big_int::KmipBigInt, error::TtlvError};

/// One node of the TTLV tree.
///
/// The tag is held by name: the normalized KMIP name when the registry
/// knows the tag, otherwise the `0xHHHHHH` hex form. Names are resolved
/// back to numeric tags by the wire codec.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TTLV {
    pub tag: String,
    pub value: TTLValue,
}

impl TTLV {
    #[must_use]
    pub fn new(tag: impl Into<String>, value: TTLValue) -> Self {
        Self {
            tag: tag.into(),
            value,
        }
    }

    /// The children of a Structure node, if this node is one.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        match &self.value {
            TTLValue::Structure(items) => Some(items),
            _ => None,
        }
    }

    /// First child of a Structure node carrying `tag`.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&Self> {
        self.children()?.iter().find(|c| c.tag == tag)
    }
}

#[derive(Debug, Clone)]
pub enum TTLValue {
    Structure(Vec<TTLV>),
    Integer(i32),
    LongInteger(i64),
    BigInteger(KmipBigInt),
    Enumeration(KmipEnumerationVariant),
    Boolean(bool),
    TextString(String),
    ByteString(Vec<u8>),
    DateTime(OffsetDateTime),
    Interval(u32),
    DateTimeExtended(OffsetDateTime),
}

impl Default for TTLValue {
    fn default() -> Self {
        Self::TextString(String::default())
    }
}

impl TTLValue {
    #[must_use]
    pub const fn ttlv_type(&self) -> TtlvType {
        match self {
            Self::Structure(_) => TtlvType::Structure,
            Self::Integer(_) => TtlvType::Integer,
            Self::LongInteger(_) => TtlvType::LongInteger,
            Self::BigInteger(_) => TtlvType::BigInteger,
            Self::Enumeration(_) => TtlvType::Enumeration,
            Self::Boolean(_) => TtlvType::Boolean,
            Self::TextString(_) => TtlvType::TextString,
            Self::ByteString(_) => TtlvType::ByteString,
            Self::DateTime(_) => TtlvType::DateTime,
            Self::Interval(_) => TtlvType::Interval,
            Self::DateTimeExtended(_) => TtlvType::DateTimeExtended,
        }
    }
}

impl PartialEq for TTLValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Structure(l), Self::Structure(r)) => l == r,
            (Self::Integer(l), Self::Integer(r)) => l == r,
            (Self::LongInteger(l), Self::LongInteger(r)) => l == r,
            (Self::BigInteger(l), Self::BigInteger(r)) => l == r,
            (Self::Enumeration(l), Self::Enumeration(r)) => l.value == r.value,
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::TextString(l), Self::TextString(r)) => l == r,
            (Self::ByteString(l), Self::ByteString(r)) => l == r,
            // wire precision is seconds resp. microseconds
            (Self::DateTime(l), Self::DateTime(r)) => l.unix_timestamp() == r.unix_timestamp(),
            (Self::Interval(l), Self::Interval(r)) => l == r,
            (Self::DateTimeExtended(l), Self::DateTimeExtended(r)) => {
                l.unix_timestamp_nanos() / 1000 == r.unix_timestamp_nanos() / 1000
            }
            (_, _) => false,
        }
    }
}

/// An Enumeration value together with the normalized name the registry
/// knows it by. The name is empty when the value is not registered for
/// the enclosing tag; only the value ever reaches the wire.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct KmipEnumerationVariant {
    pub value: u32,
    pub name: String,
}

/// The TTLV item types, with their wire byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TtlvType {
    Structure = 0x01,
    Integer = 0x02,
    LongInteger = 0x03,
    BigInteger = 0x04,
    Enumeration = 0x05,
    Boolean = 0x06,
    TextString = 0x07,
    ByteString = 0x08,
    DateTime = 0x09,
    Interval = 0x0A,
    DateTimeExtended = 0x0B,
}

impl TtlvType {
    // idiomatic for #[repr(u8)] enums
    #[allow(clippy::as_conversions)]
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Integer => "Integer",
            Self::LongInteger => "LongInteger",
            Self::BigInteger => "BigInteger",
            Self::Enumeration => "Enumeration",
            Self::Boolean => "Boolean",
            Self::TextString => "TextString",
            Self::ByteString => "ByteString",
            Self::DateTime => "DateTime",
            Self::Interval => "Interval",
            Self::DateTimeExtended => "DateTimeExtended",
        }
    }
}

impl std::fmt::Display for TtlvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for TtlvType {
    type Error = TtlvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Structure),
            0x02 => Ok(Self::Integer),
            0x03 => Ok(Self::LongInteger),
            0x04 => Ok(Self::BigInteger),
            0x05 => Ok(Self::Enumeration),
            0x06 => Ok(Self::Boolean),
            0x07 => Ok(Self::TextString),
            0x08 => Ok(Self::ByteString),
            0x09 => Ok(Self::DateTime),
            0x0A => Ok(Self::Interval),
            0x0B => Ok(Self::DateTimeExtended),
            other => Err(TtlvError::InvalidType(other)),
        }
    }
}
