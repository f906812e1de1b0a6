//! Bidirectional mappings between numeric KMIP tags, TTLV types and
//! enumeration values on one side and their canonical and normalized
//! names on the other.
//!
//! A [`Registry`] is immutable: a [`RegistryBuilder`] collects the
//! registrations (typically the generated KMIP 1.4 tables) and freezes
//! them, so steady-state readers never need a lock. The process-wide
//! [`default_registry`] is pre-populated with the KMIP 1.4 tables.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use thiserror::Error;

mod kmip_1_4_defs;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("malformed hex string: {0}")]
    MalformedHex(String),

    #[error("unregistered enum name: {0}")]
    UnregisteredEnumName(String),
}

impl From<RegistryError> for crate::KmipError {
    fn from(e: RegistryError) -> Self {
        Self::InvalidTag(e.to_string())
    }
}

/// A 24-bit KMIP tag. The set is open: values outside the registered
/// tables still flow through the codec under their hex names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u32);

impl Tag {
    /// Reserved "unknown/absent" tag.
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#08X}", self.0)
    }
}

/// Normalization per KMIP 1.4 §5.4.1.1: keep letters, digits and
/// underscores, drop whitespace and the remaining punctuation.
#[must_use]
pub fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// A bi-map between the numeric values of one enumeration (or bitmask)
/// and their canonical and normalized names.
#[derive(Debug, Default, Clone)]
pub struct EnumMap {
    values_to_name: HashMap<u32, String>,
    values_to_canonical: HashMap<u32, String>,
    name_to_value: HashMap<String, u32>,
    canonical_to_value: HashMap<String, u32>,
    bitmask: bool,
}

impl EnumMap {
    #[must_use]
    pub fn new_enum() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_bitmask() -> Self {
        Self {
            bitmask: true,
            ..Self::default()
        }
    }

    /// Register a value under its canonical name; the normalized name
    /// is derived with [`normalize_name`].
    pub fn register_value(&mut self, value: u32, canonical: &str) {
        let normalized = normalize_name(canonical);
        self.values_to_name.insert(value, normalized.clone());
        self.name_to_value.insert(normalized, value);
        self.values_to_canonical.insert(value, canonical.to_owned());
        self.canonical_to_value.insert(canonical.to_owned(), value);
    }

    #[must_use]
    pub fn with_value(mut self, value: u32, canonical: &str) -> Self {
        self.register_value(value, canonical);
        self
    }

    /// The normalized name of a value.
    #[must_use]
    pub fn name(&self, value: u32) -> Option<&str> {
        self.values_to_name.get(&value).map(String::as_str)
    }

    #[must_use]
    pub fn canonical_name(&self, value: u32) -> Option<&str> {
        self.values_to_canonical.get(&value).map(String::as_str)
    }

    /// Resolve a normalized or canonical name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<u32> {
        self.name_to_value
            .get(name)
            .or_else(|| self.canonical_to_value.get(name))
            .copied()
    }

    /// All registered values, ascending.
    #[must_use]
    pub fn values(&self) -> Vec<u32> {
        let mut values: Vec<u32> = self.values_to_name.keys().copied().collect();
        values.sort_unstable();
        values
    }

    #[must_use]
    pub const fn is_bitmask(&self) -> bool {
        self.bitmask
    }
}

/// Collects registrations and freezes them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tags: EnumMap,
    types: EnumMap,
    enums: HashMap<Tag, EnumMap>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tag(&mut self, tag: Tag, canonical: &str) -> &mut Self {
        self.tags.register_value(tag.value(), canonical);
        self
    }

    pub fn register_type(&mut self, value: u8, canonical: &str) -> &mut Self {
        self.types.register_value(u32::from(value), canonical);
        self
    }

    /// Register the enum (or bitmask) map of a tag; the last
    /// registration for a tag wins.
    pub fn register_enum(&mut self, tag: Tag, map: EnumMap) -> &mut Self {
        self.enums.insert(tag, map);
        self
    }

    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            tags: self.tags,
            types: self.types,
            enums: self.enums,
        }
    }
}

/// The frozen tag, type and enumeration tables.
#[derive(Debug)]
pub struct Registry {
    tags: EnumMap,
    types: EnumMap,
    enums: HashMap<Tag, EnumMap>,
}

impl Registry {
    /// The normalized name of a tag, else the `0xHHHHHH` hex form.
    #[must_use]
    pub fn format_tag(&self, tag: Tag) -> String {
        self.tags
            .name(tag.value())
            .map_or_else(|| format!("{:#08X}", tag.value()), str::to_owned)
    }

    /// The canonical (spec) name of a tag, else the hex form.
    #[must_use]
    pub fn format_tag_canonical(&self, tag: Tag) -> String {
        self.tags
            .canonical_name(tag.value())
            .map_or_else(|| format!("{:#08X}", tag.value()), str::to_owned)
    }

    /// Resolve a canonical name, a normalized name, or `0x` + 6 hex
    /// digits. Unknown names that are not hex resolve to [`Tag::NONE`].
    pub fn parse_tag(&self, s: &str) -> Result<Tag, RegistryError> {
        if let Some(hex_digits) = s.strip_prefix("0x") {
            if hex_digits.len() != 6 {
                return Err(RegistryError::MalformedHex(format!(
                    "tag hex form needs 6 digits: {s}"
                )));
            }
            let value = u32::from_str_radix(hex_digits, 16)
                .map_err(|_e| RegistryError::MalformedHex(s.to_owned()))?;
            return Ok(Tag::new(value));
        }
        Ok(self.tags.value(s).map_or(Tag::NONE, Tag::new))
    }

    /// The name of a TTLV type byte, else the `0xHH` hex form.
    #[must_use]
    pub fn format_type(&self, value: u8) -> String {
        self.types
            .name(u32::from(value))
            .map_or_else(|| format!("{value:#04X}"), str::to_owned)
    }

    pub fn parse_type(&self, s: &str) -> Result<u8, RegistryError> {
        if let Some(hex_digits) = s.strip_prefix("0x") {
            return u8::from_str_radix(hex_digits, 16)
                .map_err(|_e| RegistryError::MalformedHex(s.to_owned()));
        }
        self.types
            .value(s)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| RegistryError::UnregisteredEnumName(s.to_owned()))
    }

    /// The enum map registered for a tag, if any.
    #[must_use]
    pub fn enum_for_tag(&self, tag: Tag) -> Option<&EnumMap> {
        self.enums.get(&tag)
    }

    #[must_use]
    pub fn is_bitmask(&self, tag: Tag) -> bool {
        self.enum_for_tag(tag).is_some_and(EnumMap::is_bitmask)
    }

    #[must_use]
    pub fn is_enum(&self, tag: Tag) -> bool {
        self.enum_for_tag(tag).is_some_and(|e| !e.is_bitmask())
    }

    /// Render an enumeration or bitmask value for a tag.
    ///
    /// Bitmask values are joined by bit position,
    /// `Sign|Verify|0x00000400` style, with a single hex residual for
    /// the unknown bits; enum values render as their name or as
    /// `0xHHHHHHHH`.
    #[must_use]
    pub fn format_enum(&self, tag: Tag, value: u32) -> String {
        let Some(map) = self.enum_for_tag(tag) else {
            return format!("{value:#010X}");
        };
        if !map.is_bitmask() {
            return map
                .name(value)
                .map_or_else(|| format!("{value:#010X}"), str::to_owned);
        }
        let mut parts = Vec::new();
        let mut residual = 0_u32;
        for bit in 0..32 {
            let mask = 1_u32 << bit;
            if value & mask != 0 {
                match map.name(mask) {
                    Some(name) => parts.push(name.to_owned()),
                    None => residual |= mask,
                }
            }
        }
        if residual != 0 || parts.is_empty() {
            parts.push(format!("{residual:#010X}"));
        }
        parts.join("|")
    }

    /// Render a bitmask-tagged Integer value.
    #[must_use]
    pub fn format_int(&self, tag: Tag, value: i32) -> String {
        self.format_enum(tag, u32::from_be_bytes(value.to_be_bytes()))
    }

    /// Parse the inverse of [`Registry::format_enum`]: names and hex
    /// tokens joined with `|`. Unknown names fail with
    /// `UnregisteredEnumName`; bad hex fails with `MalformedHex`.
    pub fn parse_enum(&self, tag: Tag, s: &str) -> Result<u32, RegistryError> {
        let map = self.enum_for_tag(tag);
        let mut value = 0_u32;
        for token in s.split('|') {
            if let Some(hex_digits) = token.strip_prefix("0x") {
                let v = u32::from_str_radix(hex_digits, 16)
                    .map_err(|_e| RegistryError::MalformedHex(token.to_owned()))?;
                value |= v;
            } else {
                let v = map
                    .and_then(|m| m.value(token))
                    .ok_or_else(|| RegistryError::UnregisteredEnumName(token.to_owned()))?;
                value |= v;
            }
        }
        Ok(value)
    }

    pub fn parse_int(&self, tag: Tag, s: &str) -> Result<i32, RegistryError> {
        self.parse_enum(tag, s)
            .map(|v| i32::from_be_bytes(v.to_be_bytes()))
    }
}

static DEFAULT_REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| {
    let mut builder = RegistryBuilder::new();
    kmip_1_4_defs::populate(&mut builder);
    Arc::new(builder.build())
});

/// The process-wide registry, pre-populated with the KMIP 1.4 tables.
#[must_use]
pub fn default_registry() -> Arc<Registry> {
    DEFAULT_REGISTRY.clone()
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::{default_registry, normalize_name, EnumMap, RegistryError, Tag};

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Cryptographic Algorithm"), "CryptographicAlgorithm");
        assert_eq!(normalize_name("Template-Attribute"), "TemplateAttribute");
        assert_eq!(normalize_name("IV/Counter/Nonce"), "IVCounterNonce");
        assert_eq!(normalize_name("PKCS#12 Friendly Name"), "PKCS12FriendlyName");
        assert_eq!(normalize_name("X.509 Certificate Identifier"), "X509CertificateIdentifier");
    }

    #[test]
    fn test_tag_round_trip() {
        let registry = default_registry();
        assert_eq!(registry.format_tag(Tag::CRYPTOGRAPHIC_ALGORITHM), "CryptographicAlgorithm");
        assert_eq!(
            registry.format_tag_canonical(Tag::CRYPTOGRAPHIC_ALGORITHM),
            "Cryptographic Algorithm"
        );
        assert_eq!(
            registry.parse_tag("CryptographicAlgorithm").unwrap(),
            Tag::CRYPTOGRAPHIC_ALGORITHM
        );
        assert_eq!(
            registry.parse_tag("Cryptographic Algorithm").unwrap(),
            Tag::CRYPTOGRAPHIC_ALGORITHM
        );
        assert_eq!(registry.parse_tag("0x420028").unwrap(), Tag::CRYPTOGRAPHIC_ALGORITHM);
        // every registered normalized name equals the normalization of
        // its canonical name
        for tag in [Tag::REQUEST_MESSAGE, Tag::TEMPLATE_ATTRIBUTE, Tag::UNIQUE_BATCH_ITEM_ID] {
            let canonical = registry.format_tag_canonical(tag);
            assert_eq!(normalize_name(&canonical), registry.format_tag(tag));
        }
    }

    #[test]
    fn test_parse_tag_totality() {
        let registry = default_registry();
        // hex form works for any 6-digit string
        assert_eq!(registry.parse_tag("0x54FFFF").unwrap(), Tag::new(0x0054_FFFF));
        // unknown non-hex name resolves to TagNone
        assert_eq!(registry.parse_tag("NoSuchTag").unwrap(), Tag::NONE);
        // malformed hex fails
        assert!(matches!(
            registry.parse_tag("0x42"),
            Err(RegistryError::MalformedHex(_))
        ));
        assert!(matches!(
            registry.parse_tag("0x42002G"),
            Err(RegistryError::MalformedHex(_))
        ));
        // format of an unregistered tag is its hex form, which parses back
        let unknown = Tag::new(0x0054_0001);
        let name = registry.format_tag(unknown);
        assert_eq!(name, "0x540001");
        assert_eq!(registry.parse_tag(&name).unwrap(), unknown);
    }

    #[test]
    fn test_format_enum() {
        let registry = default_registry();
        assert_eq!(
            registry.format_enum(Tag::OPERATION, 0x1E),
            "DiscoverVersions"
        );
        assert_eq!(registry.format_enum(Tag::OPERATION, 0x99), "0x00000099");
    }

    #[test]
    fn test_bitmask_format_and_parse() {
        let registry = default_registry();
        let usage = registry.format_enum(Tag::CRYPTOGRAPHIC_USAGE_MASK, 0x0000_000C);
        assert_eq!(usage, "Encrypt|Decrypt");
        assert_eq!(
            registry.parse_enum(Tag::CRYPTOGRAPHIC_USAGE_MASK, "Encrypt|Decrypt").unwrap(),
            0x0000_000C
        );
        // unknown bits render as one hex residual, in stable order
        let mixed = registry.format_enum(Tag::CRYPTOGRAPHIC_USAGE_MASK, 0x0100_0003);
        assert_eq!(mixed, "Sign|Verify|0x01000000");
        assert_eq!(
            registry.parse_enum(Tag::CRYPTOGRAPHIC_USAGE_MASK, &mixed).unwrap(),
            0x0100_0003
        );
        // unknown names fail unless given as hex
        assert!(matches!(
            registry.parse_enum(Tag::CRYPTOGRAPHIC_USAGE_MASK, "Sign|NoSuchBit"),
            Err(RegistryError::UnregisteredEnumName(_))
        ));
    }

    #[test]
    fn test_types_table() {
        let registry = default_registry();
        assert_eq!(registry.format_type(0x07), "TextString");
        assert_eq!(registry.parse_type("TextString").unwrap(), 0x07);
        assert_eq!(registry.parse_type("0x07").unwrap(), 0x07);
        assert_eq!(registry.format_type(0x7F), "0x7F");
    }

    #[test]
    fn test_enum_map_both_name_forms() {
        let map = EnumMap::new_enum().with_value(1, "Query Operations");
        assert_eq!(map.value("QueryOperations"), Some(1));
        assert_eq!(map.value("Query Operations"), Some(1));
        assert_eq!(map.name(1), Some("QueryOperations"));
        assert_eq!(map.canonical_name(1), Some("Query Operations"));
        assert_eq!(map.value("Unknown"), None);
    }
}
