use serde::{
    ser::{
        self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
        SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
    },
    Serialize,
};
use time::OffsetDateTime;

use super::{
    big_int::{KmipBigInt, BIG_INTEGER_NEWTYPE},
    date_time::{DATE_TIME_EXTENDED_NEWTYPE, DATE_TIME_NEWTYPE},
    error::TtlvError,
    interval::INTERVAL_NEWTYPE,
    ttlv_struct::{KmipEnumerationVariant, TTLValue, TTLV},
    ENUMERATION_NEWTYPE,
};

type Result<T> = std::result::Result<T, TtlvError>;

/// Serialize a typed value into a TTLV tree.
///
/// The root must map to a Structure; its tag is the serde name of the
/// struct. Field tags are the serde field names (PascalCase, matching
/// the registry's normalized tag names). Sequences flatten into
/// repeated sibling items sharing the field tag.
pub fn to_ttlv<T>(value: &T) -> Result<TTLV>
where
    T: Serialize + ?Sized,
{
    let mut ser = TtlvSerializer {
        stack: Vec::new(),
        seq_markers: Vec::new(),
    };
    value.serialize(&mut ser)?;
    let root = ser
        .stack
        .pop()
        .ok_or_else(|| TtlvError::custom("serialization produced no TTLV element"))?;
    if !ser.stack.is_empty() {
        return Err(TtlvError::custom(
            "serialization left unfinished TTLV elements",
        ));
    }
    Ok(root)
}

/// Builds the tree on an explicit stack: `serialize_field` pushes a
/// tagged placeholder, the value serializers fill the top element, and
/// the field is then attached to (or, for flattened sequences, spliced
/// into) its parent Structure.
struct TtlvSerializer {
    stack: Vec<TTLV>,
    /// Stack indices of elements whose Structure value was produced by
    /// `serialize_seq`. Their children splice into the parent as
    /// siblings, so a zero-element sequence contributes zero items.
    seq_markers: Vec<usize>,
}

impl TtlvSerializer {
    fn top(&mut self) -> Result<&mut TTLV> {
        self.stack
            .last_mut()
            .ok_or_else(|| TtlvError::custom("no enclosing TTLV element"))
    }

    /// Consume any sequence markers at or above `index`; true when the
    /// node that lived at `index` was itself a sequence.
    fn take_seq_marker(&mut self, index: usize) -> bool {
        let flattened = self.seq_markers.last() == Some(&index);
        while self.seq_markers.last().is_some_and(|m| *m >= index) {
            self.seq_markers.pop();
        }
        flattened
    }

    fn set_value(&mut self, value: TTLValue) -> Result<()> {
        self.top()?.value = value;
        Ok(())
    }

    fn pop(&mut self) -> Result<TTLV> {
        self.stack
            .pop()
            .ok_or_else(|| TtlvError::custom("unbalanced TTLV serializer stack"))
    }

    fn top_children(&mut self) -> Result<&mut Vec<TTLV>> {
        match &mut self.top()?.value {
            TTLValue::Structure(children) => Ok(children),
            _ => Err(TtlvError::custom(
                "the enclosing TTLV element is not a Structure",
            )),
        }
    }

    /// Current value as an unsigned 32-bit quantity; values beyond
    /// `i32::MAX` arrive as LongInteger from `serialize_u32`.
    fn take_u32(&mut self) -> Result<u32> {
        let v = match &self.top()?.value {
            TTLValue::Integer(v) => u32::try_from(*v)
                .map_err(|_e| TtlvError::Overflow(format!("negative value: {v}")))?,
            TTLValue::LongInteger(v) => u32::try_from(*v)
                .map_err(|_e| TtlvError::Overflow(format!("value out of u32 range: {v}")))?,
            other => {
                return Err(TtlvError::UnexpectedType {
                    expected: "Integer",
                    got: other.ttlv_type().name(),
                })
            }
        };
        Ok(v)
    }
}

impl<'a> ser::Serializer for &'a mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();
    type SerializeMap = &'a mut TtlvSerializer;
    type SerializeSeq = &'a mut TtlvSerializer;
    type SerializeStruct = &'a mut TtlvSerializer;
    type SerializeStructVariant = &'a mut TtlvSerializer;
    type SerializeTuple = &'a mut TtlvSerializer;
    type SerializeTupleStruct = &'a mut TtlvSerializer;
    type SerializeTupleVariant = &'a mut TtlvSerializer;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.set_value(TTLValue::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.set_value(TTLValue::Integer(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.set_value(TTLValue::LongInteger(v))
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        match i32::try_from(v) {
            Ok(v32) => self.serialize_i32(v32),
            Err(_) => self.serialize_i64(i64::from(v)),
        }
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        let v = i64::try_from(v)
            .map_err(|_e| TtlvError::Overflow(format!("value out of i64 range: {v}")))?;
        self.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        let v = i64::try_from(v)
            .map_err(|_e| TtlvError::Overflow(format!("value out of i64 range: {v}")))?;
        self.serialize_i64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        let v = i64::try_from(v)
            .map_err(|_e| TtlvError::Overflow(format!("value out of i64 range: {v}")))?;
        self.serialize_i64(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(TtlvError::custom("f32 is not representable in TTLV"))
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(TtlvError::custom("f64 is not representable in TTLV"))
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.set_value(TTLValue::TextString(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.set_value(TTLValue::TextString(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.set_value(TTLValue::ByteString(v.to_vec()))
    }

    /// TTLV has no encoding for an absent value; optional fields must be
    /// skipped with `#[serde(skip_serializing_if = "Option::is_none")]`.
    fn serialize_none(self) -> Result<()> {
        Err(TtlvError::custom(
            "Option::None is not representable in TTLV; skip the field instead",
        ))
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(TtlvError::custom("the unit value is not representable in TTLV"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        Err(TtlvError::custom(format!(
            "the unit struct {name} is not representable in TTLV"
        )))
    }

    /// Unit enum variants carry the KMIP enumeration value as the serde
    /// variant index (see the `kmip_enum!` macro).
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.set_value(TTLValue::Enumeration(KmipEnumerationVariant {
            value: variant_index,
            name: variant.to_owned(),
        }))
    }

    /// Sentinel newtype names re-type the value the inner serialization
    /// produced; any other newtype is a transparent wrapper.
    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self)?;
        match name {
            DATE_TIME_NEWTYPE => {
                let seconds = match &self.top()?.value {
                    TTLValue::LongInteger(v) => *v,
                    other => {
                        return Err(TtlvError::UnexpectedType {
                            expected: "LongInteger",
                            got: other.ttlv_type().name(),
                        })
                    }
                };
                let dt = OffsetDateTime::from_unix_timestamp(seconds)?;
                self.set_value(TTLValue::DateTime(dt))?;
            }
            DATE_TIME_EXTENDED_NEWTYPE => {
                let micros = match &self.top()?.value {
                    TTLValue::LongInteger(v) => *v,
                    other => {
                        return Err(TtlvError::UnexpectedType {
                            expected: "LongInteger",
                            got: other.ttlv_type().name(),
                        })
                    }
                };
                let dt = OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1000)?;
                self.set_value(TTLValue::DateTimeExtended(dt))?;
            }
            INTERVAL_NEWTYPE => {
                let seconds = self.take_u32()?;
                self.set_value(TTLValue::Interval(seconds))?;
            }
            ENUMERATION_NEWTYPE => {
                let value = self.take_u32()?;
                self.set_value(TTLValue::Enumeration(KmipEnumerationVariant {
                    value,
                    name: String::new(),
                }))?;
            }
            BIG_INTEGER_NEWTYPE => {
                let bytes = match &self.top()?.value {
                    TTLValue::ByteString(b) => b.clone(),
                    other => {
                        return Err(TtlvError::UnexpectedType {
                            expected: "ByteString",
                            got: other.ttlv_type().name(),
                        })
                    }
                };
                self.set_value(TTLValue::BigInteger(KmipBigInt::from_bytes_be(&bytes)))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(TtlvError::custom(format!(
            "newtype variant {name}::{variant} is not representable in TTLV; \
             implement Serialize by delegating to the variant payload"
        )))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        if self.stack.is_empty() {
            return Err(TtlvError::custom(
                "a sequence cannot be the top-level TTLV element",
            ));
        }
        self.seq_markers.push(self.stack.len() - 1);
        self.set_value(TTLValue::Structure(Vec::with_capacity(len.unwrap_or(0))))?;
        Ok(self)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(TtlvError::custom(format!(
            "tuple variant {name}::{variant} is not representable in TTLV"
        )))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(TtlvError::custom("maps are not representable in TTLV"))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        if self.stack.is_empty() {
            // the root element takes the struct name as its tag
            self.stack.push(TTLV {
                tag: name.to_owned(),
                value: TTLValue::Structure(Vec::with_capacity(len)),
            });
        } else {
            self.set_value(TTLValue::Structure(Vec::with_capacity(len)))?;
        }
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.serialize_struct(name, len)
    }

    #[inline]
    fn is_human_readable(&self) -> bool {
        false
    }
}

impl SerializeSeq for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // each element carries the tag of the field holding the sequence
        let tag = self.top()?.tag.clone();
        self.stack.push(TTLV {
            tag,
            value: TTLValue::default(),
        });
        value.serialize(&mut **self)?;
        let element = self.pop()?;
        if self.take_seq_marker(self.stack.len()) {
            // a sequence element that is itself a sequence has no field
            // tag of its own to repeat under
            return Err(TtlvError::custom(
                "nested sequences are not representable in TTLV",
            ));
        }
        self.top_children()?.push(element);
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeTuple for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        <&mut TtlvSerializer as SerializeSeq>::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeTupleStruct for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        <&mut TtlvSerializer as SerializeSeq>::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeTupleVariant for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(TtlvError::custom("tuple variants are not representable in TTLV"))
    }

    fn end(self) -> Result<()> {
        Err(TtlvError::custom("tuple variants are not representable in TTLV"))
    }
}

impl SerializeMap for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_key<T>(&mut self, _key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(TtlvError::custom("maps are not representable in TTLV"))
    }

    fn serialize_value<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(TtlvError::custom("maps are not representable in TTLV"))
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeStruct for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.stack.push(TTLV {
            tag: key.to_owned(),
            value: TTLValue::default(),
        });
        value.serialize(&mut **self)?;
        let field = self.pop()?;
        // a field that serialized as a sequence splices its elements in
        // as siblings; an empty sequence contributes nothing
        if self.take_seq_marker(self.stack.len()) {
            match field.value {
                TTLValue::Structure(children) => self.top_children()?.extend(children),
                _ => {
                    return Err(TtlvError::custom(
                        "sequence serialization left a non-Structure value",
                    ))
                }
            }
        } else {
            self.top_children()?.push(field);
        }
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeStructVariant for &mut TtlvSerializer {
    type Error = TtlvError;
    type Ok = ();

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        <&mut TtlvSerializer as SerializeStruct>::serialize_field(self, key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}
