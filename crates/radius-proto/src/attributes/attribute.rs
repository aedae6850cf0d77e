use super::encoder::EncoderKind;
use super::registry;
use super::types::{display_code, AttributeType};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute {attr_type}: {found} value does not fit the {expected} encoder")]
    ValueTypeMismatch {
        attr_type: u8,
        expected: &'static str,
        found: &'static str,
    },
    #[error("encoded attribute too long: {0} bytes (max 253)")]
    AttributeTooLong(usize),
    #[error("address attribute has invalid size: {0} bytes")]
    InvalidAddressSize(usize),
    #[error("attribute truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("invalid attribute length: {0}")]
    InvalidLength(usize),
    #[error("can't encode unknown attribute type {0}")]
    UnencodableType(u8),
    #[error("unregistered attribute type {0}")]
    UnknownAttributeType(u8),
    #[error("invalid tunnel tag: {0:#04x}")]
    InvalidTag(u8),
    #[error("attribute {attr_type}: value {value} out of range")]
    ValueOutOfRange { attr_type: u8, value: u32 },
}

/// One vendor sub-attribute inside a Vendor-Specific attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorPair {
    pub vendor_type: u8,
    pub value: Vec<u8>,
}

impl VendorPair {
    /// Sub-TLV header: vendor type + vendor length
    pub const HEADER_LENGTH: usize = 2;

    pub fn new(vendor_type: u8, value: impl Into<Vec<u8>>) -> Self {
        VendorPair {
            vendor_type,
            value: value.into(),
        }
    }

    pub fn encoded_length(&self) -> usize {
        Self::HEADER_LENGTH + self.value.len()
    }
}

/// Typed attribute value, one case per wire-format family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Bytes(Vec<u8>),
    Address(IpAddr),
    Integer(u32),
    VendorSpecific { vendor_id: u32, pairs: Vec<VendorPair> },
}

impl AttributeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Text(_) => "text",
            AttributeValue::Bytes(_) => "bytes",
            AttributeValue::Address(_) => "address",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::VendorSpecific { .. } => "vendor-specific",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{:?}", s),
            AttributeValue::Bytes(b) => {
                f.write_str("0x")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            AttributeValue::Address(addr) => write!(f, "{}", addr),
            AttributeValue::Integer(n) => write!(f, "{}", n),
            AttributeValue::VendorSpecific { vendor_id, pairs } => {
                write!(f, "vendor {}", vendor_id)?;
                for pair in pairs {
                    write!(
                        f,
                        " [{}: {:?}]",
                        pair.vendor_type,
                        String::from_utf8_lossy(&pair.value)
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// RADIUS Attribute structure as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// An attribute is built either from a typed value (then [`encode`](Self::encode)d)
/// or from a wire slice via [`decode`](Self::decode). Equality compares type, tag
/// and value, not the cached wire bytes.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute type (1 byte)
    pub attr_type: u8,
    /// Tunnel group tag (RFC 2868), zero for untagged attributes
    pub tag: u8,
    /// Typed value
    pub value: AttributeValue,
    wire: Vec<u8>,
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.attr_type == other.attr_type && self.tag == other.tag && self.value == other.value
    }
}

impl Eq for Attribute {}

impl Attribute {
    /// Type + length fields
    pub const HEADER_LENGTH: usize = 2;
    /// Minimum attribute length (type + length fields = 2 bytes)
    pub const MIN_LENGTH: usize = 2;
    /// Maximum encoded attribute length, header included
    pub const MAX_LENGTH: usize = 253;

    pub fn new(attr_type: impl Into<u8>, value: AttributeValue) -> Self {
        Attribute {
            attr_type: attr_type.into(),
            tag: 0,
            value,
            wire: Vec::new(),
        }
    }

    /// Create a text attribute
    pub fn string(attr_type: impl Into<u8>, value: impl Into<String>) -> Self {
        Self::new(attr_type, AttributeValue::Text(value.into()))
    }

    /// Create an octet-string attribute
    pub fn bytes(attr_type: impl Into<u8>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(attr_type, AttributeValue::Bytes(value.into()))
    }

    /// Create an integer attribute (32-bit big-endian)
    pub fn integer(attr_type: impl Into<u8>, value: u32) -> Self {
        Self::new(attr_type, AttributeValue::Integer(value))
    }

    /// Create an IPv4 address attribute
    pub fn ipv4(attr_type: impl Into<u8>, value: Ipv4Addr) -> Self {
        Self::new(attr_type, AttributeValue::Address(IpAddr::V4(value)))
    }

    /// Create an address attribute; encoding fails unless it is IPv4
    /// (or IPv4-mapped IPv6)
    pub fn address(attr_type: impl Into<u8>, value: IpAddr) -> Self {
        Self::new(attr_type, AttributeValue::Address(value))
    }

    /// Create an empty Vendor-Specific attribute for `vendor_id`
    pub fn vendor_specific(vendor_id: u32) -> Self {
        Self::new(
            AttributeType::VendorSpecific,
            AttributeValue::VendorSpecific {
                vendor_id,
                pairs: Vec::new(),
            },
        )
    }

    /// Create a tagged tunnel attribute (RFC 2868)
    pub fn tunnel(attr_type: impl Into<u8>, tag: u8, value: AttributeValue) -> Self {
        let mut attr = Self::new(attr_type, value);
        attr.tag = tag;
        attr
    }

    /// Append a vendor sub-attribute. Fails if this is not a Vendor-Specific value.
    pub fn add_vendor_pair(
        &mut self,
        vendor_type: u8,
        value: impl Into<Vec<u8>>,
    ) -> Result<(), AttributeError> {
        match &mut self.value {
            AttributeValue::VendorSpecific { pairs, .. } => {
                pairs.push(VendorPair::new(vendor_type, value));
                Ok(())
            }
            other => Err(AttributeError::ValueTypeMismatch {
                attr_type: self.attr_type,
                expected: EncoderKind::VendorSpecific.name(),
                found: other.kind_name(),
            }),
        }
    }

    /// Builder form of [`add_vendor_pair`](Self::add_vendor_pair)
    pub fn with_vendor_pair(
        mut self,
        vendor_type: u8,
        value: impl Into<Vec<u8>>,
    ) -> Result<Self, AttributeError> {
        self.add_vendor_pair(vendor_type, value)?;
        Ok(self)
    }

    /// Registry entry for this attribute's code, if any
    pub fn attribute_type(&self) -> Option<AttributeType> {
        AttributeType::from_u8(self.attr_type)
    }

    /// Display name, empty for unregistered codes
    pub fn name(&self) -> &'static str {
        self.attribute_type().map(AttributeType::name).unwrap_or("")
    }

    /// Encoder family used for this attribute
    pub fn encoder(&self) -> EncoderKind {
        registry::encoder_for(self.attr_type)
    }

    /// Encode attribute to bytes.
    ///
    /// The result is kept as this attribute's wire form. Encoding again after
    /// changing `value` or `tag` produces fresh bytes.
    pub fn encode(&mut self) -> Result<&[u8], AttributeError> {
        self.wire = self.encoder().encode(self)?;
        Ok(&self.wire)
    }

    /// Decode one attribute from the start of `data`.
    ///
    /// Only the first `data[1]` bytes are consumed; use
    /// [`encoded_length`](Self::encoded_length) to advance past it.
    /// Unregistered codes decode as opaque bytes.
    pub fn decode(data: &[u8]) -> Result<Self, AttributeError> {
        if data.len() < Self::MIN_LENGTH {
            return Err(AttributeError::Truncated {
                expected: Self::MIN_LENGTH,
                actual: data.len(),
            });
        }

        let attr_type = data[0];
        let length = data[1] as usize;
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(AttributeError::InvalidLength(length));
        }
        if data.len() < length {
            return Err(AttributeError::Truncated {
                expected: length,
                actual: data.len(),
            });
        }

        let wire = &data[..length];
        let (tag, value) = registry::encoder_for(attr_type).decode(wire)?;

        Ok(Attribute {
            attr_type,
            tag,
            value,
            wire: wire.to_vec(),
        })
    }

    /// Bytes from the last encode or decode, empty if neither happened yet
    pub fn wire(&self) -> &[u8] {
        &self.wire
    }

    /// Encoded length of the current value, header included
    pub fn encoded_length(&self) -> usize {
        let tag = usize::from(self.encoder() == EncoderKind::Tunnel);
        let value = match &self.value {
            AttributeValue::Text(s) => s.len(),
            AttributeValue::Bytes(b) => b.len(),
            AttributeValue::Address(_) => 4,
            AttributeValue::Integer(_) if tag == 1 => 3,
            AttributeValue::Integer(_) => 4,
            AttributeValue::VendorSpecific { pairs, .. } => {
                4 + pairs.iter().map(VendorPair::encoded_length).sum::<usize>()
            }
        };
        Self::HEADER_LENGTH + tag + value
    }

    fn mismatch(&self, expected: &'static str) -> AttributeError {
        AttributeError::ValueTypeMismatch {
            attr_type: self.attr_type,
            expected,
            found: self.value.kind_name(),
        }
    }

    /// Interpret value as text
    pub fn as_text(&self) -> Result<&str, AttributeError> {
        match &self.value {
            AttributeValue::Text(s) => Ok(s),
            _ => Err(self.mismatch("text")),
        }
    }

    /// Raw octets of a text or bytes value
    pub fn as_bytes(&self) -> Result<&[u8], AttributeError> {
        match &self.value {
            AttributeValue::Text(s) => Ok(s.as_bytes()),
            AttributeValue::Bytes(b) => Ok(b),
            _ => Err(self.mismatch("bytes")),
        }
    }

    /// Interpret value as a 32-bit integer
    pub fn as_integer(&self) -> Result<u32, AttributeError> {
        match self.value {
            AttributeValue::Integer(n) => Ok(n),
            _ => Err(self.mismatch("integer")),
        }
    }

    /// Interpret value as an IPv4 address
    pub fn as_ipv4(&self) -> Result<Ipv4Addr, AttributeError> {
        match self.value {
            AttributeValue::Address(IpAddr::V4(addr)) => Ok(addr),
            AttributeValue::Address(IpAddr::V6(addr)) => {
                addr.to_ipv4_mapped().ok_or_else(|| self.mismatch("address"))
            }
            _ => Err(self.mismatch("address")),
        }
    }

    /// Vendor ID of a Vendor-Specific attribute
    pub fn vendor_id(&self) -> Result<u32, AttributeError> {
        match self.value {
            AttributeValue::VendorSpecific { vendor_id, .. } => Ok(vendor_id),
            _ => Err(self.mismatch("vendor-specific")),
        }
    }

    /// Vendor sub-attributes in wire order; empty for other attributes
    pub fn pairs(&self) -> &[VendorPair] {
        match &self.value {
            AttributeValue::VendorSpecific { pairs, .. } => pairs,
            _ => &[],
        }
    }

    /// Read a tagged tunnel value back as the 3-byte integer it encodes
    /// (Tunnel-Type, Tunnel-Medium-Type, Tunnel-Preference)
    pub fn tunnel_integer(&self) -> Result<u32, AttributeError> {
        match &self.value {
            AttributeValue::Integer(n) => Ok(*n),
            AttributeValue::Bytes(b) if b.len() == 3 => {
                Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
            }
            _ => Err(self.mismatch("integer")),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_code(self.attr_type))?;
        if self.encoder() == EncoderKind::Tunnel {
            write!(f, " tag {}", self.tag)?;
        }
        if self.attr_type == AttributeType::UserPassword.as_u8() {
            let bytes = self.as_bytes().unwrap_or_default();
            return write!(f, ": {}", AttributeValue::Bytes(bytes.to_vec()));
        }
        write!(f, ": {}", self.value)
    }
}
