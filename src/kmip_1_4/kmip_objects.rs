use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{
    kmip_data_structures::KeyBlock,
    kmip_types::{ObjectType, SecretDataType},
};

/// A managed cryptographic object as carried by Get responses. The
/// enclosing message names the variant through the Object Type field,
/// so the enum serializes as its content alone and is deserialized by
/// the message visitor that has seen the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    SymmetricKey(SymmetricKey),
    SecretData(SecretData),
}

impl Object {
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::SymmetricKey(_) => ObjectType::SymmetricKey,
            Self::SecretData(_) => ObjectType::SecretData,
        }
    }

    #[must_use]
    pub const fn key_block(&self) -> &KeyBlock {
        match self {
            Self::SymmetricKey(object) => &object.key_block,
            Self::SecretData(object) => &object.key_block,
        }
    }

    /// The tag the object serializes under, e.g. `SymmetricKey`.
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::SymmetricKey(_) => "SymmetricKey",
            Self::SecretData(_) => "SecretData",
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

impl Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::SymmetricKey(object) => object.serialize(serializer),
            Self::SecretData(object) => object.serialize(serializer),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SymmetricKey {
    pub key_block: KeyBlock,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SecretData {
    pub secret_data_type: SecretDataType,
    pub key_block: KeyBlock,
}
