use serde::{de, Deserialize, Serialize};

/// Marker name understood by the TTLV serde codec: the wrapped value is
/// a KMIP Big Integer, not a plain byte string.
pub(crate) const BIG_INTEGER_NEWTYPE: &str = "$BigInteger";

/// A wrapper over `num_bigint_dig::BigInt` owning the KMIP Big Integer
/// encoding: two's complement, big-endian, sign-extended to a multiple
/// of eight bytes. The padding bytes are part of the item value and are
/// counted in the item length.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KmipBigInt(num_bigint_dig::BigInt);

impl From<num_bigint_dig::BigInt> for KmipBigInt {
    fn from(big_int: num_bigint_dig::BigInt) -> Self {
        Self(big_int)
    }
}

impl From<KmipBigInt> for num_bigint_dig::BigInt {
    fn from(val: KmipBigInt) -> Self {
        val.0
    }
}

impl From<i64> for KmipBigInt {
    fn from(v: i64) -> Self {
        Self(num_bigint_dig::BigInt::from(v))
    }
}

impl KmipBigInt {
    /// The KMIP wire encoding: two's complement big-endian, sign-extended
    /// with leading `0x00`/`0xFF` bytes to a multiple of eight.
    #[must_use]
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let mut bytes = self.0.to_signed_bytes_be();
        let len = bytes.len();
        if len % 8 != 0 {
            let padding = 8 - len % 8;
            let mut padded = match self.0.sign() {
                num_bigint_dig::Sign::Minus => vec![255_u8; padding],
                num_bigint_dig::Sign::NoSign | num_bigint_dig::Sign::Plus => vec![0_u8; padding],
            };
            padded.append(&mut bytes);
            padded
        } else {
            bytes
        }
    }

    #[must_use]
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(num_bigint_dig::BigInt::from_signed_bytes_be(bytes))
    }

    /// -1, 0 or 1.
    #[must_use]
    pub fn sign(&self) -> i8 {
        match self.0.sign() {
            num_bigint_dig::Sign::Minus => -1,
            num_bigint_dig::Sign::NoSign => 0,
            num_bigint_dig::Sign::Plus => 1,
        }
    }
}

impl Serialize for KmipBigInt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct(BIG_INTEGER_NEWTYPE, &SignedBytes(self.to_bytes_be()))
    }
}

struct SignedBytes(Vec<u8>);

impl Serialize for SignedBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for KmipBigInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BigIntVisitor;

        impl de::Visitor<'_> for BigIntVisitor {
            type Value = KmipBigInt;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a KMIP Big Integer as signed big-endian bytes")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(KmipBigInt::from_bytes_be(v))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(KmipBigInt::from_bytes_be(&v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                // hex form used by text encodings
                let hex_str = v
                    .strip_prefix("0x")
                    .ok_or_else(|| E::custom("Big Integer string must start with '0x'"))?;
                let bytes = hex::decode(hex_str).map_err(E::custom)?;
                Ok(KmipBigInt::from_bytes_be(&bytes))
            }
        }

        deserializer.deserialize_newtype_struct(BIG_INTEGER_NEWTYPE, BigIntVisitor)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use num_bigint_dig::BigInt;

    use super::KmipBigInt;

    #[test]
    fn test_sign_extension() {
        let values = [
            BigInt::from(0),
            BigInt::from(-1),
            BigInt::from(1),
            BigInt::from(-4),
            BigInt::from(255),
            BigInt::from(-256),
            BigInt::from(-123_456_789),
            BigInt::from(123_456_789),
            BigInt::from(i64::MAX),
            BigInt::from(i64::MIN),
            BigInt::from(i128::MAX),
            BigInt::from(i128::MIN),
        ];
        for value in values {
            let big_int = KmipBigInt::from(value);
            let bytes = big_int.to_bytes_be();
            assert_eq!(bytes.len() % 8, 0);
            assert_eq!(KmipBigInt::from_bytes_be(&bytes), big_int);
        }
    }

    #[test]
    fn test_minus_one_is_eight_ff_bytes() {
        let bytes = KmipBigInt::from(-1).to_bytes_be();
        assert_eq!(bytes, vec![0xFF; 8]);
    }
}
