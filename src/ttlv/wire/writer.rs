use crate::{
    registry::{Registry, Tag},
    ttlv::{error::TtlvError, ttlv_struct::TTLValue, TTLV},
};

use super::encoder::TtlvEncoder;

/// Encodes a TTLV tree into its wire form, resolving tag names through
/// a [`Registry`]. Hex-form tag names (`0xHHHHHH`) encode without being
/// registered, so unknown tags round-trip.
pub struct TtlvWireWriter<'r> {
    registry: &'r Registry,
}

impl<'r> TtlvWireWriter<'r> {
    #[must_use]
    pub const fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn to_bytes(&self, ttlv: &TTLV) -> Result<Vec<u8>, TtlvError> {
        let mut encoder = TtlvEncoder::new();
        self.write_item(&mut encoder, ttlv)?;
        Ok(encoder.into_bytes())
    }

    fn resolve_tag(&self, name: &str) -> Result<u32, TtlvError> {
        let tag = self
            .registry
            .parse_tag(name)
            .map_err(|e| TtlvError::UnknownTag(e.to_string()))?;
        if tag == Tag::NONE {
            return Err(TtlvError::UnknownTag(name.to_owned()));
        }
        Ok(tag.value())
    }

    fn write_item(&self, encoder: &mut TtlvEncoder, ttlv: &TTLV) -> Result<(), TtlvError> {
        let tag = self.resolve_tag(&ttlv.tag)?;
        match &ttlv.value {
            TTLValue::Structure(children) => encoder.structure(tag, |e| {
                for child in children {
                    self.write_item(e, child)?;
                }
                Ok(())
            }),
            TTLValue::Integer(v) => encoder.integer(tag, *v),
            TTLValue::LongInteger(v) => encoder.long_integer(tag, *v),
            TTLValue::BigInteger(v) => encoder.big_integer(tag, v),
            TTLValue::Enumeration(e) => encoder.enumeration(tag, e.value),
            TTLValue::Boolean(v) => encoder.boolean(tag, *v),
            TTLValue::TextString(v) => encoder.text_string(tag, v),
            TTLValue::ByteString(v) => encoder.byte_string(tag, v),
            TTLValue::DateTime(v) => encoder.date_time(tag, v.unix_timestamp()),
            TTLValue::Interval(v) => encoder.interval(tag, *v),
            TTLValue::DateTimeExtended(v) => {
                let micros = i64::try_from(v.unix_timestamp_nanos() / 1000)?;
                encoder.date_time_extended(tag, micros)
            }
        }
    }
}
