//! The typed KMIP 1.4 message model: enumerations, data structures,
//! managed objects, operation payloads and the request/response
//! messages.

pub mod kmip_data_structures;
pub mod kmip_messages;
pub mod kmip_objects;
pub mod kmip_operations;
pub mod kmip_types;

/// Defines a closed KMIP enumeration.
///
/// The serde implementations carry both the numeric value (riding in
/// the unit-variant index slot) and the variant name, so the TTLV codec
/// can emit the value while text encodings keep the name. `strum`
/// provides `Display`, `FromStr` and `from_repr`.
macro_rules! kmip_enum {
    (
        $(#[$outer:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::strum::Display,
            ::strum::EnumString,
            ::strum::FromRepr,
        )]
        #[repr(u32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            // idiomatic for #[repr(u32)] enums
            #[allow(clippy::as_conversions)]
            #[must_use]
            pub const fn as_u32(self) -> u32 {
                self as u32
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                match self {
                    $(Self::$variant => serializer.serialize_unit_variant(
                        stringify!($name),
                        $value,
                        stringify!($variant),
                    ),)+
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct EnumVisitor;

                impl<'de> ::serde::de::Visitor<'de> for EnumVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        formatter: &mut ::std::fmt::Formatter<'_>,
                    ) -> ::std::fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name), " enumeration value"))
                    }

                    fn visit_u32<E>(self, v: u32) -> Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        $name::from_repr(v).ok_or_else(|| {
                            E::custom(format!(
                                concat!("unknown ", stringify!($name), " value: {:#010X}"),
                                v
                            ))
                        })
                    }

                    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        let v = u32::try_from(v).map_err(E::custom)?;
                        self.visit_u32(v)
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        v.parse::<$name>().map_err(E::custom)
                    }
                }

                deserializer.deserialize_any(EnumVisitor)
            }
        }
    };
}

pub(crate) use kmip_enum;
