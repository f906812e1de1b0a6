use time::OffsetDateTime;

use crate::{
    registry::{Registry, Tag},
    ttlv::{
        error::TtlvError,
        ttlv_struct::{KmipEnumerationVariant, TTLValue, TtlvType},
        TTLV,
    },
};

use super::view::TtlvView;

/// Decodes wire bytes into a TTLV tree, naming tags through a
/// [`Registry`]. Unknown tags keep their `0xHHHHHH` hex name;
/// enumeration values additionally pick up the normalized name the
/// registry knows for their tag.
pub struct TtlvWireReader<'r> {
    registry: &'r Registry,
    strict: bool,
}

impl<'r> TtlvWireReader<'r> {
    #[must_use]
    pub const fn new(registry: &'r Registry, strict: bool) -> Self {
        Self { registry, strict }
    }

    /// Decode exactly one item spanning the whole input.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<TTLV, TtlvError> {
        let view = TtlvView::parse(bytes)?;
        if view.full_len() != bytes.len() {
            return Err(TtlvError::custom(format!(
                "{} trailing bytes after the TTLV item",
                bytes.len() - view.full_len()
            )));
        }
        view.validate(self.strict)?;
        self.read_item(view)
    }

    fn read_item(&self, view: TtlvView<'_>) -> Result<TTLV, TtlvError> {
        let tag = Tag::new(view.tag());
        let value = match view.item_type()? {
            TtlvType::Structure => {
                let mut children = Vec::new();
                for child in view.children()? {
                    children.push(self.read_item(child?)?);
                }
                TTLValue::Structure(children)
            }
            TtlvType::Integer => TTLValue::Integer(view.value_integer()?),
            TtlvType::LongInteger => TTLValue::LongInteger(view.value_long_integer()?),
            TtlvType::BigInteger => TTLValue::BigInteger(view.value_big_integer()?),
            TtlvType::Enumeration => {
                let value = view.value_enumeration()?;
                let name = self
                    .registry
                    .enum_for_tag(tag)
                    .and_then(|map| map.name(value))
                    .unwrap_or_default()
                    .to_owned();
                TTLValue::Enumeration(KmipEnumerationVariant { value, name })
            }
            TtlvType::Boolean => TTLValue::Boolean(view.value_boolean()?),
            TtlvType::TextString => TTLValue::TextString(view.value_text_string()?.to_owned()),
            TtlvType::ByteString => TTLValue::ByteString(view.value_byte_string()?.to_vec()),
            TtlvType::DateTime => {
                TTLValue::DateTime(OffsetDateTime::from_unix_timestamp(view.value_date_time()?)?)
            }
            TtlvType::Interval => TTLValue::Interval(view.value_interval()?),
            TtlvType::DateTimeExtended => {
                let micros = view.value_date_time_extended()?;
                TTLValue::DateTimeExtended(OffsetDateTime::from_unix_timestamp_nanos(
                    i128::from(micros) * 1000,
                )?)
            }
        };
        Ok(TTLV {
            tag: self.registry.format_tag(tag),
            value,
        })
    }
}
