use std::fmt::{self, Formatter};

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeStruct,
    Deserialize, Serialize,
};

use super::kmip_enum;
use crate::{
    registry::{default_registry, Tag},
    ttlv::ENUMERATION_NEWTYPE,
};

/// The KMIP protocol version carried in message headers and reported by
/// Discover Versions. Ordering is major-then-minor.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash,
)]
#[serde(rename_all = "PascalCase")]
pub struct ProtocolVersion {
    pub protocol_version_major: i32,
    pub protocol_version_minor: i32,
}

impl ProtocolVersion {
    pub const V1_0: Self = Self::new(1, 0);
    pub const V1_1: Self = Self::new(1, 1);
    pub const V1_2: Self = Self::new(1, 2);
    pub const V1_3: Self = Self::new(1, 3);
    pub const V1_4: Self = Self::new(1, 4);

    #[must_use]
    pub const fn new(major: i32, minor: i32) -> Self {
        Self {
            protocol_version_major: major,
            protocol_version_minor: minor,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.protocol_version_major, self.protocol_version_minor
        )
    }
}

/// The Operation enumeration, kept open over the raw wire value: a
/// request naming an operation this server has no handler for must
/// still decode far enough to be answered with `OperationNotSupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationEnumeration(u32);

impl OperationEnumeration {
    pub const ACTIVATE: Self = Self(0x12);
    pub const ADD_ATTRIBUTE: Self = Self(0x0D);
    pub const ARCHIVE: Self = Self(0x15);
    pub const CANCEL: Self = Self(0x19);
    pub const CERTIFY: Self = Self(0x06);
    pub const CHECK: Self = Self(0x09);
    pub const CREATE: Self = Self(0x01);
    pub const CREATE_KEY_PAIR: Self = Self(0x02);
    pub const CREATE_SPLIT_KEY: Self = Self(0x28);
    pub const DECRYPT: Self = Self(0x20);
    pub const DELETE_ATTRIBUTE: Self = Self(0x0F);
    pub const DERIVE_KEY: Self = Self(0x05);
    pub const DESTROY: Self = Self(0x14);
    pub const DISCOVER_VERSIONS: Self = Self(0x1E);
    pub const ENCRYPT: Self = Self(0x1F);
    pub const GET: Self = Self(0x0A);
    pub const GET_ATTRIBUTES: Self = Self(0x0B);
    pub const GET_ATTRIBUTE_LIST: Self = Self(0x0C);
    pub const GET_USAGE_ALLOCATION: Self = Self(0x11);
    pub const HASH: Self = Self(0x27);
    pub const JOIN_SPLIT_KEY: Self = Self(0x29);
    pub const LOCATE: Self = Self(0x08);
    pub const MAC: Self = Self(0x23);
    pub const MAC_VERIFY: Self = Self(0x24);
    pub const MODIFY_ATTRIBUTE: Self = Self(0x0E);
    pub const NOTIFY: Self = Self(0x1B);
    pub const OBTAIN_LEASE: Self = Self(0x10);
    pub const POLL: Self = Self(0x1A);
    pub const PUT: Self = Self(0x1C);
    pub const QUERY: Self = Self(0x18);
    pub const RECOVER: Self = Self(0x16);
    pub const RE_CERTIFY: Self = Self(0x07);
    pub const RE_KEY: Self = Self(0x04);
    pub const RE_KEY_KEY_PAIR: Self = Self(0x1D);
    pub const REGISTER: Self = Self(0x03);
    pub const REVOKE: Self = Self(0x13);
    pub const RNG_RETRIEVE: Self = Self(0x25);
    pub const RNG_SEED: Self = Self(0x26);
    pub const SIGN: Self = Self(0x21);
    pub const SIGNATURE_VERIFY: Self = Self(0x22);
    pub const VALIDATE: Self = Self(0x17);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OperationEnumeration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&default_registry().format_enum(Tag::OPERATION, self.0))
    }
}

impl Serialize for OperationEnumeration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct(ENUMERATION_NEWTYPE, &self.0)
    }
}

impl<'de> Deserialize<'de> for OperationEnumeration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OperationVisitor;

        impl Visitor<'_> for OperationVisitor {
            type Value = OperationEnumeration;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("an Operation enumeration value")
            }

            fn visit_u32<E>(self, v: u32) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OperationEnumeration(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(v).map(OperationEnumeration).map_err(E::custom)
            }
        }

        deserializer.deserialize_newtype_struct(ENUMERATION_NEWTYPE, OperationVisitor)
    }
}

kmip_enum! {
    /// Success or failure of one batch item.
    pub enum ResultStatusEnumeration {
        Success = 0x00,
        OperationFailed = 0x01,
        OperationPending = 0x02,
        OperationUndone = 0x03,
    }
}

kmip_enum! {
    /// Failure classification carried in failed batch items.
    pub enum ResultReason {
        ItemNotFound = 0x01,
        ResponseTooLarge = 0x02,
        AuthenticationNotSuccessful = 0x03,
        InvalidMessage = 0x04,
        OperationNotSupported = 0x05,
        MissingData = 0x06,
        InvalidField = 0x07,
        FeatureNotSupported = 0x08,
        OperationCanceledByRequester = 0x09,
        CryptographicFailure = 0x0A,
        IllegalOperation = 0x0B,
        PermissionDenied = 0x0C,
        ObjectArchived = 0x0D,
        IndexOutOfBounds = 0x0E,
        ApplicationNamespaceNotSupported = 0x0F,
        KeyFormatTypeNotSupported = 0x10,
        KeyCompressionTypeNotSupported = 0x11,
        EncodingOptionError = 0x12,
        KeyValueNotPresent = 0x13,
        AttestationRequired = 0x14,
        AttestationFailed = 0x15,
        Sensitive = 0x16,
        NotExtractable = 0x17,
        ObjectAlreadyExists = 0x18,
        GeneralFailure = 0x100,
    }
}

kmip_enum! {
    /// How the server proceeds after a failed batch item. `Stop` is
    /// assumed when the request header omits the option.
    pub enum BatchErrorContinuationOption {
        Continue = 0x01,
        Undo = 0x02,
        Stop = 0x03,
    }
}

kmip_enum! {
    pub enum ObjectType {
        Certificate = 0x01,
        SymmetricKey = 0x02,
        PublicKey = 0x03,
        PrivateKey = 0x04,
        SplitKey = 0x05,
        Template = 0x06,
        SecretData = 0x07,
        OpaqueObject = 0x08,
        PGPKey = 0x09,
    }
}

kmip_enum! {
    pub enum CryptographicAlgorithm {
        DES = 0x01,
        TripleDES = 0x02,
        AES = 0x03,
        RSA = 0x04,
        DSA = 0x05,
        ECDSA = 0x06,
        HMACSHA1 = 0x07,
        HMACSHA224 = 0x08,
        HMACSHA256 = 0x09,
        HMACSHA384 = 0x0A,
        HMACSHA512 = 0x0B,
        HMACMD5 = 0x0C,
        DH = 0x0D,
        ECDH = 0x0E,
        ECMQV = 0x0F,
        Blowfish = 0x10,
        Camellia = 0x11,
        CAST5 = 0x12,
        IDEA = 0x13,
        MARS = 0x14,
        RC2 = 0x15,
        RC4 = 0x16,
        RC5 = 0x17,
        SKIPJACK = 0x18,
        Twofish = 0x19,
        EC = 0x1A,
        OneTimePad = 0x1B,
        ChaCha20 = 0x1C,
        Poly1305 = 0x1D,
        ChaCha20Poly1305 = 0x1E,
        SM2 = 0x1F,
        SM3 = 0x20,
        SM4 = 0x21,
    }
}

kmip_enum! {
    pub enum KeyFormatType {
        Raw = 0x01,
        Opaque = 0x02,
        PKCS1 = 0x03,
        PKCS8 = 0x04,
        X509 = 0x05,
        ECPrivateKey = 0x06,
        TransparentSymmetricKey = 0x07,
        TransparentDSAPrivateKey = 0x08,
        TransparentDSAPublicKey = 0x09,
        TransparentRSAPrivateKey = 0x0A,
        TransparentRSAPublicKey = 0x0B,
        TransparentDHPrivateKey = 0x0C,
        TransparentDHPublicKey = 0x0D,
        TransparentECDSAPrivateKey = 0x0E,
        TransparentECDSAPublicKey = 0x0F,
        TransparentECDHPrivateKey = 0x10,
        TransparentECDHPublicKey = 0x11,
        TransparentECMQVPrivateKey = 0x12,
        TransparentECMQVPublicKey = 0x13,
        TransparentECPrivateKey = 0x14,
        TransparentECPublicKey = 0x15,
        PKCS12 = 0x16,
    }
}

kmip_enum! {
    pub enum KeyCompressionType {
        ECPublicKeyTypeUncompressed = 0x01,
        ECPublicKeyTypeX962CompressedPrime = 0x02,
        ECPublicKeyTypeX962CompressedChar2 = 0x03,
        ECPublicKeyTypeX962Hybrid = 0x04,
    }
}

kmip_enum! {
    pub enum QueryFunction {
        QueryOperations = 0x01,
        QueryObjects = 0x02,
        QueryServerInformation = 0x03,
        QueryApplicationNamespaces = 0x04,
        QueryExtensionList = 0x05,
        QueryExtensionMap = 0x06,
        QueryAttestationTypes = 0x07,
        QueryRNGs = 0x08,
        QueryValidations = 0x09,
        QueryProfiles = 0x0A,
        QueryCapabilities = 0x0B,
        QueryClientRegistrationMethods = 0x0C,
    }
}

kmip_enum! {
    pub enum CredentialType {
        UsernameAndPassword = 0x01,
        Device = 0x02,
        Attestation = 0x03,
    }
}

kmip_enum! {
    pub enum RevocationReasonCode {
        Unspecified = 0x01,
        KeyCompromise = 0x02,
        CACompromise = 0x03,
        AffiliationChanged = 0x04,
        Superseded = 0x05,
        CessationOfOperation = 0x06,
        PrivilegeWithdrawn = 0x07,
    }
}

kmip_enum! {
    pub enum SecretDataType {
        Password = 0x01,
        Seed = 0x02,
    }
}

kmip_enum! {
    pub enum State {
        PreActive = 0x01,
        Active = 0x02,
        Deactivated = 0x03,
        Compromised = 0x04,
        Destroyed = 0x05,
        DestroyedCompromised = 0x06,
    }
}

/// Server nonce carried by response headers during attestation flows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Nonce {
    #[serde(rename = "NonceID", with = "crate::ttlv::byte_string")]
    pub nonce_id: Vec<u8>,
    #[serde(with = "crate::ttlv::byte_string")]
    pub nonce_value: Vec<u8>,
}

/// Revocation Reason structure carried by Revoke requests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RevocationReason {
    pub revocation_reason_code: RevocationReasonCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_message: Option<String>,
}

/// The Authentication structure of a request header: one or more
/// credentials. The core carries them to handlers; validating them is a
/// policy concern outside this crate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Authentication {
    pub credential: Vec<Credential>,
}

/// A Credential: its type selects the concrete value structure, so the
/// serde implementations are written by hand the same way batch item
/// payloads are keyed by Operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub credential_type: CredentialType,
    pub credential_value: CredentialValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValue {
    UsernameAndPassword(UsernameAndPasswordCredential),
    Device(DeviceCredential),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UsernameAndPasswordCredential {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceCredential {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_identifier: Option<String>,
}

impl Serialize for Credential {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut st = serializer.serialize_struct("Credential", 2)?;
        st.serialize_field("CredentialType", &self.credential_type)?;
        match &self.credential_value {
            CredentialValue::UsernameAndPassword(value) => {
                st.serialize_field("CredentialValue", value)?;
            }
            CredentialValue::Device(value) => {
                st.serialize_field("CredentialValue", value)?;
            }
        }
        st.end()
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            CredentialType,
            CredentialValue,
        }

        struct CredentialVisitor;

        impl<'de> Visitor<'de> for CredentialVisitor {
            type Value = Credential;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct Credential")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut credential_type: Option<CredentialType> = None;
                let mut credential_value: Option<CredentialValue> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::CredentialType => {
                            if credential_type.is_some() {
                                return Err(de::Error::duplicate_field("CredentialType"));
                            }
                            credential_type = Some(map.next_value()?);
                        }
                        Field::CredentialValue => {
                            if credential_value.is_some() {
                                return Err(de::Error::duplicate_field("CredentialValue"));
                            }
                            // the type field selects the value structure
                            let Some(credential_type) = &credential_type else {
                                return Err(de::Error::missing_field("CredentialType"));
                            };
                            credential_value = Some(match credential_type {
                                CredentialType::UsernameAndPassword => {
                                    CredentialValue::UsernameAndPassword(map.next_value()?)
                                }
                                CredentialType::Device => {
                                    CredentialValue::Device(map.next_value()?)
                                }
                                CredentialType::Attestation => {
                                    return Err(de::Error::custom(
                                        "Attestation credentials are not supported",
                                    ))
                                }
                            });
                        }
                    }
                }
                Ok(Credential {
                    credential_type: credential_type
                        .ok_or_else(|| de::Error::missing_field("CredentialType"))?,
                    credential_value: credential_value
                        .ok_or_else(|| de::Error::missing_field("CredentialValue"))?,
                })
            }
        }

        const FIELDS: &[&str] = &["CredentialType", "CredentialValue"];
        deserializer.deserialize_struct("Credential", FIELDS, CredentialVisitor)
    }
}
