use serde::{de, ser};
use thiserror::Error;

/// Failures of the TTLV codec layers: the primitive byte codec, the
/// framer, and the serde codec over the tree representation.
#[derive(Error, Debug)]
pub enum TtlvError {
    #[error("truncated TTLV item: {0}")]
    Truncated(String),

    #[error("TTLV item of {size} bytes exceeds the maximum message size of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    #[error("invalid TTLV type byte: {0:#04X}")]
    InvalidType(u8),

    #[error("invalid length {length} for TTLV type {type_name}")]
    InvalidLength { type_name: &'static str, length: usize },

    #[error("non-zero TTLV padding byte")]
    InvalidPadding,

    #[error("invalid TTLV Boolean value bytes")]
    InvalidBoolean,

    #[error("TextString value is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("integer overflow: {0}")]
    Overflow(String),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("unexpected TTLV type: expected {expected}, got {got}")]
    UnexpectedType {
        expected: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl TtlvError {
    #[must_use]
    pub fn custom(s: impl Into<String>) -> Self {
        Self::Custom(s.into())
    }
}

impl ser::Error for TtlvError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Custom(msg.to_string())
    }
}

impl de::Error for TtlvError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Custom(msg.to_string())
    }
}

impl From<String> for TtlvError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for TtlvError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_owned())
    }
}

impl From<std::string::FromUtf8Error> for TtlvError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8(e.to_string())
    }
}

impl From<std::num::TryFromIntError> for TtlvError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Overflow(e.to_string())
    }
}

impl From<time::error::ComponentRange> for TtlvError {
    fn from(e: time::error::ComponentRange) -> Self {
        Self::Custom(e.to_string())
    }
}
