use std::fmt::{self, Display};

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeStruct,
    Deserialize, Serialize,
};
use time::OffsetDateTime;

use super::{
    kmip_data_structures::TemplateAttribute,
    kmip_objects::Object,
    kmip_types::{
        KeyCompressionType, KeyFormatType, ObjectType, OperationEnumeration, ProtocolVersion,
        QueryFunction, RevocationReason,
    },
};

/// Whether a payload belongs in a request or a response batch item.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Direction {
    Request,
    Response,
}

/// 4.1 Create: generate a new managed object from template attributes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Create {
    pub object_type: ObjectType,
    pub template_attribute: TemplateAttribute,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateResponse {
    pub object_type: ObjectType,
    pub unique_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_attribute: Option<TemplateAttribute>,
}

/// 4.10 Get: retrieve a managed object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Get {
    /// Omitted to address the ID Placeholder, which this core does not
    /// track; handlers decide how to resolve an absent identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_format_type: Option<KeyFormatType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_compression_type: Option<KeyCompressionType>,
}

/// The Get response carries the object under its own tag; the Object
/// Type field selects the variant, so serde is written by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResponse {
    pub object_type: ObjectType,
    pub unique_identifier: String,
    pub object: Object,
}

impl Serialize for GetResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.object.object_type() != self.object_type {
            return Err(serde::ser::Error::custom(format!(
                "object type field ({}) does not match the object ({})",
                self.object_type,
                self.object.object_type()
            )));
        }
        let mut st = serializer.serialize_struct("GetResponse", 3)?;
        st.serialize_field("ObjectType", &self.object_type)?;
        st.serialize_field("UniqueIdentifier", &self.unique_identifier)?;
        st.serialize_field(self.object.tag_name(), &self.object)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for GetResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            ObjectType,
            UniqueIdentifier,
            SymmetricKey,
            SecretData,
        }

        struct GetResponseVisitor;

        impl<'de> Visitor<'de> for GetResponseVisitor {
            type Value = GetResponse;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct GetResponse")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut object_type: Option<ObjectType> = None;
                let mut unique_identifier: Option<String> = None;
                let mut object: Option<Object> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::ObjectType => {
                            if object_type.is_some() {
                                return Err(de::Error::duplicate_field("ObjectType"));
                            }
                            object_type = Some(map.next_value()?);
                        }
                        Field::UniqueIdentifier => {
                            if unique_identifier.is_some() {
                                return Err(de::Error::duplicate_field("UniqueIdentifier"));
                            }
                            unique_identifier = Some(map.next_value()?);
                        }
                        Field::SymmetricKey => {
                            object = Some(Object::SymmetricKey(map.next_value()?));
                        }
                        Field::SecretData => {
                            object = Some(Object::SecretData(map.next_value()?));
                        }
                    }
                }
                let object_type =
                    object_type.ok_or_else(|| de::Error::missing_field("ObjectType"))?;
                let object = object.ok_or_else(|| de::Error::custom("missing object"))?;
                if object.object_type() != object_type {
                    return Err(de::Error::custom(format!(
                        "object type field ({object_type}) does not match the object ({})",
                        object.object_type()
                    )));
                }
                Ok(GetResponse {
                    object_type,
                    unique_identifier: unique_identifier
                        .ok_or_else(|| de::Error::missing_field("UniqueIdentifier"))?,
                    object,
                })
            }
        }

        const FIELDS: &[&str] = &["ObjectType", "UniqueIdentifier", "SymmetricKey", "SecretData"];
        deserializer.deserialize_struct("GetResponse", FIELDS, GetResponseVisitor)
    }
}

/// 4.19 Activate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Activate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ActivateResponse {
    pub unique_identifier: String,
}

/// 4.20 Revoke.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Revoke {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    pub revocation_reason: RevocationReason,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::ttlv::date_time::option",
        default
    )]
    pub compromise_occurrence_date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RevokeResponse {
    pub unique_identifier: String,
}

/// 4.21 Destroy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Destroy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DestroyResponse {
    pub unique_identifier: String,
}

/// 4.25 Query: interrogate server capabilities.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Query {
    pub query_function: Vec<QueryFunction>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Vec<OperationEnumeration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Vec<ObjectType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_identification: Option<String>,
}

/// 4.26 Discover Versions: report the protocol versions both sides
/// speak, highest first.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DiscoverVersions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<Vec<ProtocolVersion>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DiscoverVersionsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<Vec<ProtocolVersion>>,
}

/// One payload variant per implemented operation, keyed by the
/// Operation enumeration at the batch item layer. Serialization
/// delegates to the payload; deserialization happens in the batch item
/// visitor, which has seen the Operation field.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum Operation {
    Activate(Activate),
    ActivateResponse(ActivateResponse),
    Create(Create),
    CreateResponse(CreateResponse),
    Destroy(Destroy),
    DestroyResponse(DestroyResponse),
    DiscoverVersions(DiscoverVersions),
    DiscoverVersionsResponse(DiscoverVersionsResponse),
    Get(Get),
    GetResponse(GetResponse),
    Query(Query),
    QueryResponse(QueryResponse),
    Revoke(Revoke),
    RevokeResponse(RevokeResponse),
}

impl Operation {
    /// The Operation enumeration value this payload answers to.
    #[must_use]
    pub const fn operation_enum(&self) -> OperationEnumeration {
        match self {
            Self::Activate(_) | Self::ActivateResponse(_) => OperationEnumeration::ACTIVATE,
            Self::Create(_) | Self::CreateResponse(_) => OperationEnumeration::CREATE,
            Self::Destroy(_) | Self::DestroyResponse(_) => OperationEnumeration::DESTROY,
            Self::DiscoverVersions(_) | Self::DiscoverVersionsResponse(_) => {
                OperationEnumeration::DISCOVER_VERSIONS
            }
            Self::Get(_) | Self::GetResponse(_) => OperationEnumeration::GET,
            Self::Query(_) | Self::QueryResponse(_) => OperationEnumeration::QUERY,
            Self::Revoke(_) | Self::RevokeResponse(_) => OperationEnumeration::REVOKE,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Activate(_)
            | Self::Create(_)
            | Self::Destroy(_)
            | Self::DiscoverVersions(_)
            | Self::Get(_)
            | Self::Query(_)
            | Self::Revoke(_) => Direction::Request,
            Self::ActivateResponse(_)
            | Self::CreateResponse(_)
            | Self::DestroyResponse(_)
            | Self::DiscoverVersionsResponse(_)
            | Self::GetResponse(_)
            | Self::QueryResponse(_)
            | Self::RevokeResponse(_) => Direction::Response,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Activate(_) => "Activate",
            Self::ActivateResponse(_) => "ActivateResponse",
            Self::Create(_) => "Create",
            Self::CreateResponse(_) => "CreateResponse",
            Self::Destroy(_) => "Destroy",
            Self::DestroyResponse(_) => "DestroyResponse",
            Self::DiscoverVersions(_) => "DiscoverVersions",
            Self::DiscoverVersionsResponse(_) => "DiscoverVersionsResponse",
            Self::Get(_) => "Get",
            Self::GetResponse(_) => "GetResponse",
            Self::Query(_) => "Query",
            Self::QueryResponse(_) => "QueryResponse",
            Self::Revoke(_) => "Revoke",
            Self::RevokeResponse(_) => "RevokeResponse",
        };
        f.write_str(name)
    }
}
