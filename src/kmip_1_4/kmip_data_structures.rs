use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeStruct,
    Deserialize, Serialize,
};
use time::OffsetDateTime;

use super::kmip_types::{
    CryptographicAlgorithm, KeyCompressionType, KeyFormatType,
};
use crate::ttlv::{date_time::KmipDateTime, ENUMERATION_NEWTYPE};

/// Template-Attribute structure: the attribute list carried by Create
/// and friends. The Name list of the 1.x spec is not carried; servers
/// ignore it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Vec<Attribute>>,
}

impl TemplateAttribute {
    #[must_use]
    pub fn with_attributes(attributes: Vec<Attribute>) -> Self {
        Self {
            attribute: Some(attributes),
        }
    }

    /// First attribute named `name`, if present.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&Attribute> {
        self.attribute
            .as_deref()?
            .iter()
            .find(|a| a.attribute_name == name)
    }
}

/// A KMIP 1.4 attribute: a name, an optional index for multi-valued
/// attributes, and a value whose TTLV type depends on the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attribute_name: String,
    pub attribute_index: Option<i32>,
    pub attribute_value: AttributeValue,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            attribute_name: name.into(),
            attribute_index: None,
            attribute_value: value,
        }
    }
}

/// The dynamic attribute value. The concrete TTLV type travels with the
/// variant, so values survive a decode/encode round trip even when the
/// server knows nothing about the attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Integer(i32),
    LongInteger(i64),
    Enumeration(u32),
    Boolean(bool),
    TextString(String),
    ByteString(Vec<u8>),
    DateTime(OffsetDateTime),
    Interval(u32),
}

impl Serialize for AttributeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Integer(v) => serializer.serialize_i32(*v),
            Self::LongInteger(v) => serializer.serialize_i64(*v),
            Self::Enumeration(v) => serializer.serialize_newtype_struct(ENUMERATION_NEWTYPE, v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::TextString(v) => serializer.serialize_str(v),
            Self::ByteString(v) => serializer.serialize_bytes(v),
            Self::DateTime(v) => KmipDateTime(*v).serialize(serializer),
            Self::Interval(v) => crate::ttlv::interval::serialize(v, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AnyValueVisitor;

        // the TTLV deserializer hands each type a distinct visitor
        // slot: DateTime arrives as i128 seconds, Interval as u64,
        // Enumeration as u32
        impl Visitor<'_> for AnyValueVisitor {
            type Value = AttributeValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a TTLV attribute value")
            }

            fn visit_i32<E>(self, v: i32) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Integer(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::LongInteger(v))
            }

            fn visit_u32<E>(self, v: u32) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Enumeration(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(v)
                    .map(AttributeValue::Interval)
                    .map_err(E::custom)
            }

            fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let seconds = i64::try_from(v).map_err(E::custom)?;
                OffsetDateTime::from_unix_timestamp(seconds)
                    .map(AttributeValue::DateTime)
                    .map_err(E::custom)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::Boolean(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::TextString(v.to_owned()))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::ByteString(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttributeValue::ByteString(v))
            }
        }

        deserializer.deserialize_any(AnyValueVisitor)
    }
}

impl Serialize for Attribute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut st = serializer.serialize_struct("Attribute", 3)?;
        st.serialize_field("AttributeName", &self.attribute_name)?;
        if let Some(index) = &self.attribute_index {
            st.serialize_field("AttributeIndex", index)?;
        }
        st.serialize_field("AttributeValue", &self.attribute_value)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            AttributeName,
            AttributeIndex,
            AttributeValue,
        }

        struct AttributeVisitor;

        impl<'de> Visitor<'de> for AttributeVisitor {
            type Value = Attribute;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("struct Attribute")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut attribute_name: Option<String> = None;
                let mut attribute_index: Option<i32> = None;
                let mut attribute_value: Option<AttributeValue> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::AttributeName => {
                            if attribute_name.is_some() {
                                return Err(de::Error::duplicate_field("AttributeName"));
                            }
                            attribute_name = Some(map.next_value()?);
                        }
                        Field::AttributeIndex => {
                            if attribute_index.is_some() {
                                return Err(de::Error::duplicate_field("AttributeIndex"));
                            }
                            attribute_index = Some(map.next_value()?);
                        }
                        Field::AttributeValue => {
                            if attribute_value.is_some() {
                                return Err(de::Error::duplicate_field("AttributeValue"));
                            }
                            attribute_value = Some(map.next_value()?);
                        }
                    }
                }
                Ok(Attribute {
                    attribute_name: attribute_name
                        .ok_or_else(|| de::Error::missing_field("AttributeName"))?,
                    attribute_index,
                    attribute_value: attribute_value
                        .ok_or_else(|| de::Error::missing_field("AttributeValue"))?,
                })
            }
        }

        const FIELDS: &[&str] = &["AttributeName", "AttributeIndex", "AttributeValue"];
        deserializer.deserialize_struct("Attribute", FIELDS, AttributeVisitor)
    }
}

/// Key Block: the carrier of key material inside managed objects.
/// Key wrapping is out of scope, so the Key Wrapping Data structure is
/// not modeled.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct KeyBlock {
    pub key_format_type: KeyFormatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_compression_type: Option<KeyCompressionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_value: Option<KeyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptographic_algorithm: Option<CryptographicAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptographic_length: Option<i32>,
}

impl KeyBlock {
    /// A raw-format key block over plain key bytes.
    #[must_use]
    pub fn raw(
        key_material: Vec<u8>,
        algorithm: CryptographicAlgorithm,
        length_bits: i32,
    ) -> Self {
        Self {
            key_format_type: KeyFormatType::Raw,
            key_compression_type: None,
            key_value: Some(KeyValue {
                key_material,
                attribute: None,
            }),
            cryptographic_algorithm: Some(algorithm),
            cryptographic_length: Some(length_bits),
        }
    }
}

/// Key Value: the key material plus optional attributes. Only the
/// byte-string material forms (Raw, Opaque) are modeled; transparent
/// key structures are not.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    #[serde(with = "crate::ttlv::byte_string")]
    pub key_material: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Vec<Attribute>>,
}
