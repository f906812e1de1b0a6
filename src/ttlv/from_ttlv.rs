use serde::{
    de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor},
    forward_to_deserialize_any, Deserialize,
};

use super::{
    big_int::BIG_INTEGER_NEWTYPE,
    date_time::{DATE_TIME_EXTENDED_NEWTYPE, DATE_TIME_NEWTYPE},
    error::TtlvError,
    interval::INTERVAL_NEWTYPE,
    ttlv_struct::{TTLValue, TTLV},
    ENUMERATION_NEWTYPE,
};

type Result<T> = std::result::Result<T, TtlvError>;

/// Deserialize a typed value from a TTLV tree.
///
/// Struct fields are located by tag; consecutive children sharing a tag
/// group back into sequences; a type mismatch between the tree and the
/// target field fails with an `UnexpectedType` error.
pub fn from_ttlv<'a, T>(ttlv: TTLV) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = TtlvDeserializer {
        node: Node::One(ttlv),
    };
    T::deserialize(&mut deserializer)
}

/// The input position of a deserializer: a single element, or a run of
/// consecutive same-tag siblings read back as a sequence.
#[derive(Debug)]
enum Node {
    One(TTLV),
    Run(Vec<TTLV>),
}

#[derive(Debug)]
struct TtlvDeserializer {
    node: Node,
}

impl TtlvDeserializer {
    const fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn one(&self) -> Result<&TTLV> {
        match &self.node {
            Node::One(t) => Ok(t),
            Node::Run(items) => Err(TtlvError::custom(format!(
                "{} repeated {} items where a single value was expected",
                items.len(),
                items.first().map_or("", |t| t.tag.as_str())
            ))),
        }
    }

    fn unexpected(&self, expected: &'static str) -> TtlvError {
        match self.one() {
            Ok(t) => TtlvError::UnexpectedType {
                expected,
                got: t.value.ttlv_type().name(),
            },
            Err(e) => e,
        }
    }

    fn integer(&self) -> Result<i32> {
        match &self.one()?.value {
            TTLValue::Integer(v) => Ok(*v),
            _ => Err(self.unexpected("Integer")),
        }
    }
}

impl<'de> de::Deserializer<'de> for &mut TtlvDeserializer {
    type Error = TtlvError;

    /// Self-describing entry point used by lenient consumers (ignored
    /// fields, dynamic attribute values). Each TTLV type gets a distinct
    /// visitor slot so a by-content decoder can recover the type:
    /// DateTime arrives as `visit_i128` seconds and Interval as
    /// `visit_u64` to keep them apart from LongInteger and Enumeration.
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if matches!(self.node, Node::Run(_)) {
            return self.deserialize_seq(visitor);
        }
        if matches!(&self.one()?.value, TTLValue::Structure(_)) {
            return self.deserialize_struct("", &[], visitor);
        }
        let value = self.one()?.value.clone();
        match value {
            TTLValue::Structure(_) => Err(self.unexpected("scalar")),
            TTLValue::Integer(v) => visitor.visit_i32(v),
            TTLValue::LongInteger(v) => visitor.visit_i64(v),
            TTLValue::BigInteger(v) => visitor.visit_byte_buf(v.to_bytes_be()),
            TTLValue::Enumeration(e) => visitor.visit_u32(e.value),
            TTLValue::Boolean(v) => visitor.visit_bool(v),
            TTLValue::TextString(v) => visitor.visit_str(&v),
            TTLValue::ByteString(v) => visitor.visit_byte_buf(v),
            TTLValue::DateTime(v) => visitor.visit_i128(i128::from(v.unix_timestamp())),
            TTLValue::Interval(v) => visitor.visit_u64(u64::from(v)),
            TTLValue::DateTimeExtended(v) => {
                let micros = i64::try_from(v.unix_timestamp_nanos() / 1000)?;
                visitor.visit_i64(micros)
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::Boolean(v) => visitor.visit_bool(*v),
            _ => Err(self.unexpected("Boolean")),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i8(i8::try_from(self.integer()?)?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i16(i16::try_from(self.integer()?)?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i32(self.integer()?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::LongInteger(v) => visitor.visit_i64(*v),
            _ => Err(self.unexpected("LongInteger")),
        }
    }

    fn deserialize_i128<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("i128 is not representable in TTLV"))
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u8(u8::try_from(self.integer()?)?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u16(u16::try_from(self.integer()?)?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::Integer(v) => visitor.visit_u32(u32::try_from(*v)?),
            TTLValue::Enumeration(e) => visitor.visit_u32(e.value),
            _ => Err(self.unexpected("Integer")),
        }
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::LongInteger(v) => visitor.visit_u64(u64::try_from(*v)?),
            _ => Err(self.unexpected("LongInteger")),
        }
    }

    fn deserialize_u128<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("u128 is not representable in TTLV"))
    }

    fn deserialize_f32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("f32 is not representable in TTLV"))
    }

    fn deserialize_f64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("f64 is not representable in TTLV"))
    }

    fn deserialize_char<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("char is not representable in TTLV"))
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::TextString(v) => visitor.visit_str(v),
            _ => Err(self.unexpected("TextString")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::ByteString(v) => visitor.visit_bytes(v),
            _ => Err(self.unexpected("ByteString")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::ByteString(v) => visitor.visit_byte_buf(v.clone()),
            _ => Err(self.unexpected("ByteString")),
        }
    }

    /// Absent optional fields never reach the deserializer, so any value
    /// present is `Some`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom("the unit value is not representable in TTLV"))
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom(format!(
            "the unit struct {name} is not representable in TTLV"
        )))
    }

    /// The sentinel newtype names are the inverse of the serializer's
    /// re-typing: they require the matching TTLV type and hand the
    /// visitor its primitive representation.
    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match name {
            DATE_TIME_NEWTYPE => match &self.one()?.value {
                TTLValue::DateTime(dt) => visitor.visit_i64(dt.unix_timestamp()),
                _ => Err(self.unexpected("DateTime")),
            },
            DATE_TIME_EXTENDED_NEWTYPE => match &self.one()?.value {
                TTLValue::DateTimeExtended(dt) => {
                    let micros = i64::try_from(dt.unix_timestamp_nanos() / 1000)?;
                    visitor.visit_i64(micros)
                }
                _ => Err(self.unexpected("DateTimeExtended")),
            },
            INTERVAL_NEWTYPE => match &self.one()?.value {
                TTLValue::Interval(v) => visitor.visit_u32(*v),
                _ => Err(self.unexpected("Interval")),
            },
            ENUMERATION_NEWTYPE => match &self.one()?.value {
                TTLValue::Enumeration(e) => visitor.visit_u32(e.value),
                _ => Err(self.unexpected("Enumeration")),
            },
            BIG_INTEGER_NEWTYPE => match &self.one()?.value {
                TTLValue::BigInteger(b) => visitor.visit_byte_buf(b.to_bytes_be()),
                _ => Err(self.unexpected("BigInteger")),
            },
            _ => visitor.visit_newtype_struct(self),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let node = std::mem::replace(&mut self.node, Node::Run(Vec::new()));
        let items = match node {
            Node::Run(items) => items,
            Node::One(item) => vec![item],
        };
        visitor.visit_seq(SeqWalker {
            iter: items.into_iter(),
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_struct("", &[], visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.one()?.value {
            TTLValue::Structure(children) => visitor.visit_map(StructWalker {
                children,
                pos: 0,
                pending: None,
            }),
            _ => Err(self.unexpected("Structure")),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(TtlvError::custom(format!(
            "enum {name} must deserialize through deserialize_any"
        )))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(&self.one()?.tag)
    }

    /// The tree is already fully parsed, so skipping a value needs no
    /// traversal.
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    #[inline]
    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Walks the children of a Structure as a map of tag to value,
/// grouping consecutive same-tag children into one sequence entry.
struct StructWalker<'a> {
    children: &'a [TTLV],
    pos: usize,
    pending: Option<Node>,
}

impl<'de> MapAccess<'de> for StructWalker<'_> {
    type Error = TtlvError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        let Some(child) = self.children.get(self.pos) else {
            return Ok(None);
        };
        let run_len = self.children[self.pos..]
            .iter()
            .take_while(|c| c.tag == child.tag)
            .count();
        let tag = child.tag.clone();
        self.pending = if run_len > 1 {
            Some(Node::Run(
                self.children[self.pos..self.pos + run_len].to_vec(),
            ))
        } else {
            Some(Node::One(child.clone()))
        };
        self.pos += run_len;
        seed.deserialize(KeyDeserializer { key: tag }).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let node = self
            .pending
            .take()
            .ok_or_else(|| TtlvError::custom("value requested before key"))?;
        let mut deserializer = TtlvDeserializer::from_node(node);
        seed.deserialize(&mut deserializer)
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.children.len().saturating_sub(self.pos))
    }
}

struct SeqWalker {
    iter: std::vec::IntoIter<TTLV>,
}

impl<'de> SeqAccess<'de> for SeqWalker {
    type Error = TtlvError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        let Some(item) = self.iter.next() else {
            return Ok(None);
        };
        let mut deserializer = TtlvDeserializer::from_node(Node::One(item));
        seed.deserialize(&mut deserializer).map(Some)
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Hands a struct field tag to serde's field-identifier machinery.
struct KeyDeserializer {
    key: String,
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = TtlvError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(&self.key)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}
