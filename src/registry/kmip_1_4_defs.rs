//! The KMIP 1.4 tag, type and enumeration tables, transcribed from the
//! spec's §9.1.3 registries. Canonical names are the spec spellings;
//! the normalized forms are derived at registration time.

use super::{EnumMap, RegistryBuilder, Tag};

impl Tag {
    pub const ATTRIBUTE: Self = Self(0x42_0008);
    pub const ATTRIBUTE_NAME: Self = Self(0x42_000A);
    pub const ATTRIBUTE_VALUE: Self = Self(0x42_000B);
    pub const BATCH_COUNT: Self = Self(0x42_000D);
    pub const BATCH_ERROR_CONTINUATION_OPTION: Self = Self(0x42_000E);
    pub const BATCH_ITEM: Self = Self(0x42_000F);
    pub const CREDENTIAL_TYPE: Self = Self(0x42_0024);
    pub const CRYPTOGRAPHIC_ALGORITHM: Self = Self(0x42_0028);
    pub const CRYPTOGRAPHIC_USAGE_MASK: Self = Self(0x42_002C);
    pub const KEY_FORMAT_TYPE: Self = Self(0x42_0042);
    pub const OBJECT_TYPE: Self = Self(0x42_0057);
    pub const OPERATION: Self = Self(0x42_005C);
    pub const PROTOCOL_VERSION: Self = Self(0x42_0069);
    pub const QUERY_FUNCTION: Self = Self(0x42_0074);
    pub const REQUEST_MESSAGE: Self = Self(0x42_0078);
    pub const REQUEST_PAYLOAD: Self = Self(0x42_0079);
    pub const RESPONSE_MESSAGE: Self = Self(0x42_007B);
    pub const RESPONSE_PAYLOAD: Self = Self(0x42_007C);
    pub const RESULT_REASON: Self = Self(0x42_007E);
    pub const RESULT_STATUS: Self = Self(0x42_007F);
    pub const REVOCATION_REASON_CODE: Self = Self(0x42_0082);
    pub const SECRET_DATA_TYPE: Self = Self(0x42_0086);
    pub const STATE: Self = Self(0x42_008D);
    pub const TEMPLATE_ATTRIBUTE: Self = Self(0x42_0091);
    pub const UNIQUE_BATCH_ITEM_ID: Self = Self(0x42_0093);
    pub const UNIQUE_IDENTIFIER: Self = Self(0x42_0094);
}

#[rustfmt::skip]
const TAGS: &[(u32, &str)] = &[
    (0x42_0001, "Activation Date"),
    (0x42_0002, "Application Data"),
    (0x42_0003, "Application Namespace"),
    (0x42_0004, "Application Specific Information"),
    (0x42_0005, "Archive Date"),
    (0x42_0006, "Asynchronous Correlation Value"),
    (0x42_0007, "Asynchronous Indicator"),
    (0x42_0008, "Attribute"),
    (0x42_0009, "Attribute Index"),
    (0x42_000A, "Attribute Name"),
    (0x42_000B, "Attribute Value"),
    (0x42_000C, "Authentication"),
    (0x42_000D, "Batch Count"),
    (0x42_000E, "Batch Error Continuation Option"),
    (0x42_000F, "Batch Item"),
    (0x42_0010, "Batch Order Option"),
    (0x42_0011, "Block Cipher Mode"),
    (0x42_0012, "Cancellation Result"),
    (0x42_0013, "Certificate"),
    (0x42_0018, "Certificate Request"),
    (0x42_0019, "Certificate Request Type"),
    (0x42_001D, "Certificate Type"),
    (0x42_001E, "Certificate Value"),
    (0x42_001F, "Common Template-Attribute"),
    (0x42_0020, "Compromise Date"),
    (0x42_0021, "Compromise Occurrence Date"),
    (0x42_0022, "Contact Information"),
    (0x42_0023, "Credential"),
    (0x42_0024, "Credential Type"),
    (0x42_0025, "Credential Value"),
    (0x42_0026, "Criticality Indicator"),
    (0x42_0027, "CRT Coefficient"),
    (0x42_0028, "Cryptographic Algorithm"),
    (0x42_0029, "Cryptographic Domain Parameters"),
    (0x42_002A, "Cryptographic Length"),
    (0x42_002B, "Cryptographic Parameters"),
    (0x42_002C, "Cryptographic Usage Mask"),
    (0x42_002D, "Custom Attribute"),
    (0x42_002E, "D"),
    (0x42_002F, "Deactivation Date"),
    (0x42_0030, "Derivation Data"),
    (0x42_0031, "Derivation Method"),
    (0x42_0032, "Derivation Parameters"),
    (0x42_0033, "Destroy Date"),
    (0x42_0034, "Digest"),
    (0x42_0035, "Digest Value"),
    (0x42_0036, "Encryption Key Information"),
    (0x42_0037, "G"),
    (0x42_0038, "Hashing Algorithm"),
    (0x42_0039, "Initial Date"),
    (0x42_003A, "Initialization Vector"),
    (0x42_003C, "Iteration Count"),
    (0x42_003D, "IV/Counter/Nonce"),
    (0x42_003E, "J"),
    (0x42_003F, "Key"),
    (0x42_0040, "Key Block"),
    (0x42_0041, "Key Compression Type"),
    (0x42_0042, "Key Format Type"),
    (0x42_0043, "Key Material"),
    (0x42_0044, "Key Part Identifier"),
    (0x42_0045, "Key Value"),
    (0x42_0046, "Key Wrapping Data"),
    (0x42_0047, "Key Wrapping Specification"),
    (0x42_0048, "Last Change Date"),
    (0x42_0049, "Lease Time"),
    (0x42_004A, "Link"),
    (0x42_004B, "Link Type"),
    (0x42_004C, "Linked Object Identifier"),
    (0x42_004D, "MAC/Signature"),
    (0x42_004E, "MAC/Signature Key Information"),
    (0x42_004F, "Maximum Items"),
    (0x42_0050, "Maximum Response Size"),
    (0x42_0051, "Message Extension"),
    (0x42_0052, "Modulus"),
    (0x42_0053, "Name"),
    (0x42_0054, "Name Type"),
    (0x42_0055, "Name Value"),
    (0x42_0056, "Object Group"),
    (0x42_0057, "Object Type"),
    (0x42_0058, "Offset"),
    (0x42_0059, "Opaque Data Type"),
    (0x42_005A, "Opaque Data Value"),
    (0x42_005B, "Opaque Object"),
    (0x42_005C, "Operation"),
    (0x42_005E, "P"),
    (0x42_005F, "Padding Method"),
    (0x42_0060, "Prime Exponent P"),
    (0x42_0061, "Prime Exponent Q"),
    (0x42_0062, "Prime Field Size"),
    (0x42_0063, "Private Exponent"),
    (0x42_0064, "Private Key"),
    (0x42_0065, "Private Key Template-Attribute"),
    (0x42_0066, "Private Key Unique Identifier"),
    (0x42_0067, "Process Start Date"),
    (0x42_0068, "Protect Stop Date"),
    (0x42_0069, "Protocol Version"),
    (0x42_006A, "Protocol Version Major"),
    (0x42_006B, "Protocol Version Minor"),
    (0x42_006C, "Public Exponent"),
    (0x42_006D, "Public Key"),
    (0x42_006E, "Public Key Template-Attribute"),
    (0x42_006F, "Public Key Unique Identifier"),
    (0x42_0070, "Put Function"),
    (0x42_0071, "Q"),
    (0x42_0072, "Q String"),
    (0x42_0073, "Qlength"),
    (0x42_0074, "Query Function"),
    (0x42_0075, "Recommended Curve"),
    (0x42_0076, "Replaced Unique Identifier"),
    (0x42_0077, "Request Header"),
    (0x42_0078, "Request Message"),
    (0x42_0079, "Request Payload"),
    (0x42_007A, "Response Header"),
    (0x42_007B, "Response Message"),
    (0x42_007C, "Response Payload"),
    (0x42_007D, "Result Message"),
    (0x42_007E, "Result Reason"),
    (0x42_007F, "Result Status"),
    (0x42_0080, "Revocation Message"),
    (0x42_0081, "Revocation Reason"),
    (0x42_0082, "Revocation Reason Code"),
    (0x42_0083, "Key Role Type"),
    (0x42_0084, "Salt"),
    (0x42_0085, "Secret Data"),
    (0x42_0086, "Secret Data Type"),
    (0x42_0088, "Server Information"),
    (0x42_0089, "Split Key"),
    (0x42_008A, "Split Key Method"),
    (0x42_008B, "Split Key Parts"),
    (0x42_008C, "Split Key Threshold"),
    (0x42_008D, "State"),
    (0x42_008E, "Storage Status Mask"),
    (0x42_008F, "Symmetric Key"),
    (0x42_0090, "Template"),
    (0x42_0091, "Template-Attribute"),
    (0x42_0092, "Time Stamp"),
    (0x42_0093, "Unique Batch Item ID"),
    (0x42_0094, "Unique Identifier"),
    (0x42_0095, "Usage Limits"),
    (0x42_0096, "Usage Limits Count"),
    (0x42_0097, "Usage Limits Total"),
    (0x42_0098, "Usage Limits Unit"),
    (0x42_0099, "Username"),
    (0x42_009A, "Validity Date"),
    (0x42_009B, "Validity Indicator"),
    (0x42_009C, "Vendor Extension"),
    (0x42_009D, "Vendor Identification"),
    (0x42_009E, "Wrapping Method"),
    (0x42_009F, "X"),
    (0x42_00A0, "Y"),
    (0x42_00A1, "Password"),
    (0x42_00A2, "Device Identifier"),
    (0x42_00A3, "Encoding Option"),
    (0x42_00A4, "Extension Information"),
    (0x42_00A5, "Extension Name"),
    (0x42_00A6, "Extension Tag"),
    (0x42_00A7, "Extension Type"),
    (0x42_00A8, "Fresh"),
    (0x42_00A9, "Machine Identifier"),
    (0x42_00AA, "Media Identifier"),
    (0x42_00AB, "Network Identifier"),
    (0x42_00AC, "Object Group Member"),
    (0x42_00AD, "Certificate Length"),
    (0x42_00AE, "Digital Signature Algorithm"),
    (0x42_00AF, "Certificate Serial Number"),
    (0x42_00B0, "Device Serial Number"),
    (0x42_00B1, "Issuer Alternative Name"),
    (0x42_00B2, "Issuer Distinguished Name"),
    (0x42_00B3, "Subject Alternative Name"),
    (0x42_00B4, "Subject Distinguished Name"),
    (0x42_00B5, "X.509 Certificate Identifier"),
    (0x42_00B6, "X.509 Certificate Issuer"),
    (0x42_00B7, "X.509 Certificate Subject"),
    (0x42_00B8, "Key Value Location"),
    (0x42_00B9, "Key Value Location Value"),
    (0x42_00BA, "Key Value Location Type"),
    (0x42_00BB, "Key Value Present"),
    (0x42_00BC, "Original Creation Date"),
    (0x42_00BD, "PGP Key"),
    (0x42_00BE, "PGP Key Version"),
    (0x42_00BF, "Alternative Name"),
    (0x42_00C0, "Alternative Name Value"),
    (0x42_00C1, "Alternative Name Type"),
    (0x42_00C2, "Data"),
    (0x42_00C3, "Signature Data"),
    (0x42_00C4, "Data Length"),
    (0x42_00C5, "Random IV"),
    (0x42_00C6, "MAC Data"),
    (0x42_00C7, "Attestation Type"),
    (0x42_00C8, "Nonce"),
    (0x42_00C9, "Nonce ID"),
    (0x42_00CA, "Nonce Value"),
    (0x42_00CB, "Attestation Measurement"),
    (0x42_00CC, "Attestation Assertion"),
    (0x42_00CD, "IV Length"),
    (0x42_00CE, "Tag Length"),
    (0x42_00CF, "Fixed Field Length"),
    (0x42_00D0, "Counter Length"),
    (0x42_00D1, "Initial Counter Value"),
    (0x42_00D2, "Invocation Field Length"),
    (0x42_00D3, "Attestation Capable Indicator"),
    (0x42_00D4, "Offset Items"),
    (0x42_00D5, "Located Items"),
    (0x42_00D6, "Correlation Value"),
    (0x42_00D7, "Init Indicator"),
    (0x42_00D8, "Final Indicator"),
    (0x42_00D9, "RNG Parameters"),
    (0x42_00DA, "RNG Algorithm"),
    (0x42_00DB, "DRBG Algorithm"),
    (0x42_00DC, "FIPS186 Variation"),
    (0x42_00DD, "Prediction Resistance"),
    (0x42_00DE, "Random Number Generator"),
    (0x42_00DF, "Validation Information"),
    (0x42_00E0, "Validation Authority Type"),
    (0x42_00E1, "Validation Authority Country"),
    (0x42_00E2, "Validation Authority URI"),
    (0x42_00E3, "Validation Version Major"),
    (0x42_00E4, "Validation Version Minor"),
    (0x42_00E5, "Validation Type"),
    (0x42_00E6, "Validation Level"),
    (0x42_00E7, "Validation Certificate Identifier"),
    (0x42_00E8, "Validation Certificate URI"),
    (0x42_00E9, "Validation Vendor URI"),
    (0x42_00EA, "Validation Profile"),
    (0x42_00EB, "Profile Information"),
    (0x42_00EC, "Profile Name"),
    (0x42_00ED, "Server URI"),
    (0x42_00EE, "Server Port"),
    (0x42_00EF, "Streaming Capability"),
    (0x42_00F0, "Asynchronous Capability"),
    (0x42_00F1, "Attestation Capability"),
    (0x42_00F2, "Unwrap Mode"),
    (0x42_00F3, "Destroy Action"),
    (0x42_00F4, "Shredding Algorithm"),
    (0x42_00F5, "RNG Mode"),
    (0x42_00F6, "Client Registration Method"),
    (0x42_00F7, "Capability Information"),
    (0x42_00F8, "Key Wrap Type"),
    (0x42_00F9, "Batch Undo Capability"),
    (0x42_00FA, "Batch Continue Capability"),
    (0x42_00FB, "PKCS#12 Friendly Name"),
    (0x42_00FC, "Description"),
    (0x42_00FD, "Comment"),
    (0x42_00FE, "Sensitive"),
    (0x42_00FF, "Always Sensitive"),
    (0x42_0100, "Extractable"),
    (0x42_0101, "Never Extractable"),
    (0x42_0102, "Replace Existing"),
    (0x42_0105, "Client Correlation Value"),
    (0x42_0106, "Server Correlation Value"),
];

const TYPES: &[(u8, &str)] = &[
    (0x01, "Structure"),
    (0x02, "Integer"),
    (0x03, "Long Integer"),
    (0x04, "Big Integer"),
    (0x05, "Enumeration"),
    (0x06, "Boolean"),
    (0x07, "Text String"),
    (0x08, "Byte String"),
    (0x09, "Date Time"),
    (0x0A, "Interval"),
    (0x0B, "Date Time Extended"),
];

const OPERATIONS: &[(u32, &str)] = &[
    (0x01, "Create"),
    (0x02, "Create Key Pair"),
    (0x03, "Register"),
    (0x04, "Re-key"),
    (0x05, "Derive Key"),
    (0x06, "Certify"),
    (0x07, "Re-certify"),
    (0x08, "Locate"),
    (0x09, "Check"),
    (0x0A, "Get"),
    (0x0B, "Get Attributes"),
    (0x0C, "Get Attribute List"),
    (0x0D, "Add Attribute"),
    (0x0E, "Modify Attribute"),
    (0x0F, "Delete Attribute"),
    (0x10, "Obtain Lease"),
    (0x11, "Get Usage Allocation"),
    (0x12, "Activate"),
    (0x13, "Revoke"),
    (0x14, "Destroy"),
    (0x15, "Archive"),
    (0x16, "Recover"),
    (0x17, "Validate"),
    (0x18, "Query"),
    (0x19, "Cancel"),
    (0x1A, "Poll"),
    (0x1B, "Notify"),
    (0x1C, "Put"),
    (0x1D, "Re-key Key Pair"),
    (0x1E, "Discover Versions"),
    (0x1F, "Encrypt"),
    (0x20, "Decrypt"),
    (0x21, "Sign"),
    (0x22, "Signature Verify"),
    (0x23, "MAC"),
    (0x24, "MAC Verify"),
    (0x25, "RNG Retrieve"),
    (0x26, "RNG Seed"),
    (0x27, "Hash"),
    (0x28, "Create Split Key"),
    (0x29, "Join Split Key"),
];

const RESULT_STATUSES: &[(u32, &str)] = &[
    (0x00, "Success"),
    (0x01, "Operation Failed"),
    (0x02, "Operation Pending"),
    (0x03, "Operation Undone"),
];

const RESULT_REASONS: &[(u32, &str)] = &[
    (0x01, "Item Not Found"),
    (0x02, "Response Too Large"),
    (0x03, "Authentication Not Successful"),
    (0x04, "Invalid Message"),
    (0x05, "Operation Not Supported"),
    (0x06, "Missing Data"),
    (0x07, "Invalid Field"),
    (0x08, "Feature Not Supported"),
    (0x09, "Operation Canceled By Requester"),
    (0x0A, "Cryptographic Failure"),
    (0x0B, "Illegal Operation"),
    (0x0C, "Permission Denied"),
    (0x0D, "Object Archived"),
    (0x0E, "Index Out of Bounds"),
    (0x0F, "Application Namespace Not Supported"),
    (0x10, "Key Format Type Not Supported"),
    (0x11, "Key Compression Type Not Supported"),
    (0x12, "Encoding Option Error"),
    (0x13, "Key Value Not Present"),
    (0x14, "Attestation Required"),
    (0x15, "Attestation Failed"),
    (0x16, "Sensitive"),
    (0x17, "Not Extractable"),
    (0x18, "Object Already Exists"),
    (0x100, "General Failure"),
];

const OBJECT_TYPES: &[(u32, &str)] = &[
    (0x01, "Certificate"),
    (0x02, "Symmetric Key"),
    (0x03, "Public Key"),
    (0x04, "Private Key"),
    (0x05, "Split Key"),
    (0x06, "Template"),
    (0x07, "Secret Data"),
    (0x08, "Opaque Object"),
    (0x09, "PGP Key"),
];

const BATCH_ERROR_CONTINUATION_OPTIONS: &[(u32, &str)] =
    &[(0x01, "Continue"), (0x02, "Undo"), (0x03, "Stop")];

const QUERY_FUNCTIONS: &[(u32, &str)] = &[
    (0x01, "Query Operations"),
    (0x02, "Query Objects"),
    (0x03, "Query Server Information"),
    (0x04, "Query Application Namespaces"),
    (0x05, "Query Extension List"),
    (0x06, "Query Extension Map"),
    (0x07, "Query Attestation Types"),
    (0x08, "Query RNGs"),
    (0x09, "Query Validations"),
    (0x0A, "Query Profiles"),
    (0x0B, "Query Capabilities"),
    (0x0C, "Query Client Registration Methods"),
];

const CRYPTOGRAPHIC_ALGORITHMS: &[(u32, &str)] = &[
    (0x01, "DES"),
    (0x02, "3DES"),
    (0x03, "AES"),
    (0x04, "RSA"),
    (0x05, "DSA"),
    (0x06, "ECDSA"),
    (0x07, "HMAC-SHA1"),
    (0x08, "HMAC-SHA224"),
    (0x09, "HMAC-SHA256"),
    (0x0A, "HMAC-SHA384"),
    (0x0B, "HMAC-SHA512"),
    (0x0C, "HMAC-MD5"),
    (0x0D, "DH"),
    (0x0E, "ECDH"),
    (0x0F, "ECMQV"),
    (0x10, "Blowfish"),
    (0x11, "Camellia"),
    (0x12, "CAST5"),
    (0x13, "IDEA"),
    (0x14, "MARS"),
    (0x15, "RC2"),
    (0x16, "RC4"),
    (0x17, "RC5"),
    (0x18, "SKIPJACK"),
    (0x19, "Twofish"),
    (0x1A, "EC"),
    (0x1B, "One Time Pad"),
    (0x1C, "ChaCha20"),
    (0x1D, "Poly1305"),
    (0x1E, "ChaCha20Poly1305"),
    (0x1F, "SM2"),
    (0x20, "SM3"),
    (0x21, "SM4"),
];

const CRYPTOGRAPHIC_USAGE_MASKS: &[(u32, &str)] = &[
    (0x0000_0001, "Sign"),
    (0x0000_0002, "Verify"),
    (0x0000_0004, "Encrypt"),
    (0x0000_0008, "Decrypt"),
    (0x0000_0010, "Wrap Key"),
    (0x0000_0020, "Unwrap Key"),
    (0x0000_0040, "Export"),
    (0x0000_0080, "MAC Generate"),
    (0x0000_0100, "MAC Verify"),
    (0x0000_0200, "Derive Key"),
    (0x0000_0400, "Content Commitment"),
    (0x0000_0800, "Key Agreement"),
    (0x0000_1000, "Certificate Sign"),
    (0x0000_2000, "CRL Sign"),
    (0x0000_4000, "Generate Cryptogram"),
    (0x0000_8000, "Validate Cryptogram"),
    (0x0001_0000, "Translate Encrypt"),
    (0x0002_0000, "Translate Decrypt"),
    (0x0004_0000, "Translate Wrap"),
    (0x0008_0000, "Translate Unwrap"),
];

const KEY_FORMAT_TYPES: &[(u32, &str)] = &[
    (0x01, "Raw"),
    (0x02, "Opaque"),
    (0x03, "PKCS#1"),
    (0x04, "PKCS#8"),
    (0x05, "X.509"),
    (0x06, "EC Private Key"),
    (0x07, "Transparent Symmetric Key"),
    (0x08, "Transparent DSA Private Key"),
    (0x09, "Transparent DSA Public Key"),
    (0x0A, "Transparent RSA Private Key"),
    (0x0B, "Transparent RSA Public Key"),
    (0x0C, "Transparent DH Private Key"),
    (0x0D, "Transparent DH Public Key"),
    (0x0E, "Transparent ECDSA Private Key"),
    (0x0F, "Transparent ECDSA Public Key"),
    (0x10, "Transparent ECDH Private Key"),
    (0x11, "Transparent ECDH Public Key"),
    (0x12, "Transparent ECMQV Private Key"),
    (0x13, "Transparent ECMQV Public Key"),
    (0x14, "Transparent EC Private Key"),
    (0x15, "Transparent EC Public Key"),
    (0x16, "PKCS#12"),
];

const CREDENTIAL_TYPES: &[(u32, &str)] = &[
    (0x01, "Username and Password"),
    (0x02, "Device"),
    (0x03, "Attestation"),
];

const REVOCATION_REASON_CODES: &[(u32, &str)] = &[
    (0x01, "Unspecified"),
    (0x02, "Key Compromise"),
    (0x03, "CA Compromise"),
    (0x04, "Affiliation Changed"),
    (0x05, "Superseded"),
    (0x06, "Cessation of Operation"),
    (0x07, "Privilege Withdrawn"),
];

const SECRET_DATA_TYPES: &[(u32, &str)] = &[(0x01, "Password"), (0x02, "Seed")];

const STATES: &[(u32, &str)] = &[
    (0x01, "Pre-Active"),
    (0x02, "Active"),
    (0x03, "Deactivated"),
    (0x04, "Compromised"),
    (0x05, "Destroyed"),
    (0x06, "Destroyed Compromised"),
];

fn enum_map(values: &[(u32, &str)]) -> EnumMap {
    let mut map = EnumMap::new_enum();
    for (value, canonical) in values {
        map.register_value(*value, canonical);
    }
    map
}

fn bitmask_map(values: &[(u32, &str)]) -> EnumMap {
    let mut map = EnumMap::new_bitmask();
    for (value, canonical) in values {
        map.register_value(*value, canonical);
    }
    map
}

pub(super) fn populate(builder: &mut RegistryBuilder) {
    for (value, canonical) in TAGS {
        builder.register_tag(Tag::new(*value), canonical);
    }
    for (value, canonical) in TYPES {
        builder.register_type(*value, canonical);
    }
    builder
        .register_enum(Tag::OPERATION, enum_map(OPERATIONS))
        .register_enum(Tag::RESULT_STATUS, enum_map(RESULT_STATUSES))
        .register_enum(Tag::RESULT_REASON, enum_map(RESULT_REASONS))
        .register_enum(Tag::OBJECT_TYPE, enum_map(OBJECT_TYPES))
        .register_enum(
            Tag::BATCH_ERROR_CONTINUATION_OPTION,
            enum_map(BATCH_ERROR_CONTINUATION_OPTIONS),
        )
        .register_enum(Tag::QUERY_FUNCTION, enum_map(QUERY_FUNCTIONS))
        .register_enum(
            Tag::CRYPTOGRAPHIC_ALGORITHM,
            enum_map(CRYPTOGRAPHIC_ALGORITHMS),
        )
        .register_enum(
            Tag::CRYPTOGRAPHIC_USAGE_MASK,
            bitmask_map(CRYPTOGRAPHIC_USAGE_MASKS),
        )
        .register_enum(Tag::KEY_FORMAT_TYPE, enum_map(KEY_FORMAT_TYPES))
        .register_enum(Tag::CREDENTIAL_TYPE, enum_map(CREDENTIAL_TYPES))
        .register_enum(
            Tag::REVOCATION_REASON_CODE,
            enum_map(REVOCATION_REASON_CODES),
        )
        .register_enum(Tag::SECRET_DATA_TYPE, enum_map(SECRET_DATA_TYPES))
        .register_enum(Tag::STATE, enum_map(STATES));
}
