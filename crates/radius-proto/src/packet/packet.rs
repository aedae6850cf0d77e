use super::code::{AuthenticatorKind, Code};
use crate::attributes::{registry, Attribute, AttributeError, AttributeType, AttributeValue};
use crate::auth::{self, PasswordError};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("attribute {attr_type}: {source}")]
    Attribute {
        attr_type: u8,
        #[source]
        source: AttributeError,
    },
    #[error("packet too long: {0} bytes (max 4096)")]
    PacketTooLong(usize),
    #[error("shared secret is empty")]
    MissingSecret,
    #[error("no authenticator rule for packet code {0}")]
    UnknownPacketCode(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("packet too short: {0} bytes")]
    TooShort(usize),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("attribute {attr_type}: {source}")]
    Attribute {
        attr_type: u8,
        #[source]
        source: AttributeError,
    },
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// The encoded attribute region is cached after the first [`encode`](Self::encode)
/// (or set from the received bytes by [`decode`](Self::decode)). Any change to
/// the attribute list through this type's methods drops the cache, so the next
/// encode serializes the attributes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet type (1 byte)
    pub code: Code,
    /// Packet identifier for matching requests/responses (1 byte)
    pub identifier: u8,
    /// Authenticator as last written or read
    pub authenticator: [u8; 16],
    /// Authenticator of the request this packet answers
    pub request_authenticator: [u8; 16],
    /// Shared secret used when computing authenticators
    pub secret: Vec<u8>,
    attributes: Vec<Attribute>,
    attribute_cache: Option<Vec<u8>>,
    declared_length: Option<u16>,
    decoded_length: Option<usize>,
}

impl Packet {
    /// Header size (1 code + 1 id + 2 length + 16 authenticator)
    pub const HEADER_LENGTH: usize = 20;
    /// Minimum RADIUS packet size
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    /// Create an empty packet with a random identifier
    pub fn new(code: Code, secret: impl Into<Vec<u8>>) -> Self {
        Self::with_identifier(code, auth::generate_identifier(), secret)
    }

    pub fn with_identifier(code: Code, identifier: u8, secret: impl Into<Vec<u8>>) -> Self {
        Packet {
            code,
            identifier,
            authenticator: [0u8; 16],
            request_authenticator: [0u8; 16],
            secret: secret.into(),
            attributes: Vec::new(),
            attribute_cache: None,
            declared_length: None,
            decoded_length: None,
        }
    }

    /// Start a reply to `request`: same identifier and secret, with the
    /// request's authenticator kept for the Response Authenticator.
    pub fn response_to(request: &Packet, code: Code) -> Self {
        let mut response = Self::with_identifier(code, request.identifier, request.secret.clone());
        response.request_authenticator = request.authenticator;
        response
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attribute_cache = None;
        self.attributes.push(attribute);
    }

    /// Add a value for a registered attribute type.
    ///
    /// Unregistered types are refused since they could never be encoded.
    pub fn add(&mut self, attr_type: impl Into<u8>, value: AttributeValue) -> Result<(), AttributeError> {
        let attr_type = attr_type.into();
        if registry::lookup(attr_type).is_none() {
            return Err(AttributeError::UnknownAttributeType(attr_type));
        }
        self.add_attribute(Attribute::new(attr_type, value));
        Ok(())
    }

    /// Attributes in wire order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Mutable access to the attribute list; drops the encoded cache
    pub fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        self.attribute_cache = None;
        &mut self.attributes
    }

    /// Remove every attribute of `attr_type`, returning how many were removed
    pub fn remove_attributes(&mut self, attr_type: impl Into<u8>) -> usize {
        let attr_type = attr_type.into();
        let before = self.attributes.len();
        self.attributes.retain(|a| a.attr_type != attr_type);
        let removed = before - self.attributes.len();
        if removed > 0 {
            self.attribute_cache = None;
        }
        removed
    }

    /// Find an attribute by type. When the type repeats, the last one wins.
    pub fn find_attribute(&self, attr_type: impl Into<u8>) -> Option<&Attribute> {
        let attr_type = attr_type.into();
        self.attributes.iter().rev().find(|a| a.attr_type == attr_type)
    }

    /// Find all attributes by type, in wire order
    pub fn find_all_attributes(&self, attr_type: impl Into<u8>) -> Vec<&Attribute> {
        let attr_type = attr_type.into();
        self.attributes
            .iter()
            .filter(|a| a.attr_type == attr_type)
            .collect()
    }

    /// Get the length of the encoded packet
    pub fn length(&self) -> usize {
        match &self.attribute_cache {
            Some(cache) => Self::HEADER_LENGTH + cache.len(),
            None => {
                Self::HEADER_LENGTH
                    + self
                        .attributes
                        .iter()
                        .map(Attribute::encoded_length)
                        .sum::<usize>()
            }
        }
    }

    /// Length field as last read or written
    pub fn declared_length(&self) -> Option<u16> {
        self.declared_length
    }

    /// Header plus the attribute bytes actually consumed by decode
    pub fn decoded_length(&self) -> Option<usize> {
        self.decoded_length
    }

    /// Whether the header's Length field disagrees with what was decoded.
    ///
    /// Advisory only: such packets still decode.
    pub fn length_mismatch(&self) -> bool {
        match (self.declared_length, self.decoded_length) {
            (Some(declared), Some(decoded)) => declared as usize != decoded,
            _ => false,
        }
    }

    /// Encode packet to bytes, computing the Authenticator for this code.
    ///
    /// The attribute region is serialized once and cached. Access-Request and
    /// Status-Server get a random Request Authenticator on first encode and
    /// keep it afterwards, so a retransmission is byte-identical.
    pub fn encode(&mut self) -> Result<Vec<u8>, EncodeError> {
        if self.attribute_cache.is_none() {
            let mut buffer = Vec::new();
            for attr in self.attributes.iter_mut() {
                let attr_type = attr.attr_type;
                let wire = attr
                    .encode()
                    .map_err(|source| EncodeError::Attribute { attr_type, source })?;
                buffer.extend_from_slice(wire);
            }
            self.attribute_cache = Some(buffer);
        }
        let attributes = self.attribute_cache.as_deref().unwrap_or_default();

        let total_length = Self::HEADER_LENGTH + attributes.len();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(EncodeError::PacketTooLong(total_length));
        }
        let length = total_length as u16;

        if self.secret.is_empty() {
            return Err(EncodeError::MissingSecret);
        }

        let code = self.code.as_u8();
        self.authenticator = match self.code.authenticator_kind() {
            Some(AuthenticatorKind::Request) => self.request_authenticator_or_generate(),
            Some(AuthenticatorKind::Response) => auth::calculate_response_authenticator(
                code,
                self.identifier,
                length,
                &self.request_authenticator,
                attributes,
                &self.secret,
            ),
            Some(AuthenticatorKind::AccountingRequest) => {
                auth::calculate_accounting_request_authenticator(
                    code,
                    self.identifier,
                    length,
                    attributes,
                    &self.secret,
                )
            }
            None => return Err(EncodeError::UnknownPacketCode(code)),
        };

        let mut buffer = Vec::with_capacity(total_length);
        buffer.push(code);
        buffer.push(self.identifier);
        buffer.extend_from_slice(&length.to_be_bytes());
        buffer.extend_from_slice(&self.authenticator);
        buffer.extend_from_slice(attributes);

        self.declared_length = Some(length);
        self.decoded_length = Some(total_length);
        Ok(buffer)
    }

    fn request_authenticator_or_generate(&self) -> [u8; 16] {
        if self.authenticator == [0u8; 16] {
            auth::generate_request_authenticator()
        } else {
            self.authenticator
        }
    }

    /// Hide `password` (RFC 2865 Section 5.2) and add it as User-Password.
    ///
    /// Fixes the Request Authenticator now, since the hidden value depends on it.
    pub fn add_user_password(&mut self, password: &[u8]) -> Result<(), PasswordError> {
        self.authenticator = self.request_authenticator_or_generate();
        let hidden = auth::encrypt_user_password(password, &self.secret, &self.authenticator)?;
        self.add_attribute(Attribute::bytes(AttributeType::UserPassword, hidden));
        Ok(())
    }

    /// Decode packet from bytes.
    ///
    /// Attributes are read from byte 20 to the end of `data`; a zero
    /// attribute length ends the list early (trailing padding). The declared
    /// Length field is kept for [`length_mismatch`](Self::length_mismatch)
    /// rather than enforced. Unregistered attribute types are kept as bytes.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < 4 {
            return Err(DecodeError::TooShort(data.len()));
        }

        let code = Code::from_u8(data[0]);
        let identifier = data[1];
        let declared = u16::from_be_bytes([data[2], data[3]]);
        let declared_usize = declared as usize;
        if !(Self::MIN_PACKET_SIZE..=Self::MAX_PACKET_SIZE).contains(&declared_usize) {
            return Err(DecodeError::InvalidLength(declared_usize));
        }
        if data.len() < Self::HEADER_LENGTH {
            return Err(DecodeError::TooShort(data.len()));
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..Self::HEADER_LENGTH]);

        let region = &data[Self::HEADER_LENGTH..];
        let mut attributes = Vec::new();
        let mut offset = 0;

        while offset < region.len() {
            let rest = &region[offset..];
            if rest.len() < Attribute::HEADER_LENGTH {
                return Err(DecodeError::TooShort(rest.len()));
            }
            let attr_type = rest[0];
            let length = rest[1] as usize;
            if length == 0 {
                break;
            }
            if length < Attribute::MIN_LENGTH || length > Attribute::MAX_LENGTH || length > rest.len() {
                return Err(DecodeError::InvalidLength(length));
            }

            if registry::lookup(attr_type).is_none() {
                warn!(attr_type, length, "Unknown attribute type, keeping raw bytes");
            }
            let attr = Attribute::decode(&rest[..length])
                .map_err(|source| DecodeError::Attribute { attr_type, source })?;
            attributes.push(attr);
            offset += length;
        }

        let decoded_length = Self::HEADER_LENGTH + offset;
        if decoded_length != declared_usize {
            debug!(
                code = %code,
                identifier,
                declared = declared_usize,
                decoded = decoded_length,
                "Packet length field disagrees with decoded length"
            );
        }

        Ok(Packet {
            code,
            identifier,
            authenticator,
            request_authenticator: [0u8; 16],
            secret: Vec::new(),
            attributes,
            attribute_cache: Some(region[..offset].to_vec()),
            declared_length: Some(declared),
            decoded_length: Some(decoded_length),
        })
    }

    /// Attribute region for verification: the cache when present, otherwise
    /// a fresh serialization that leaves the packet untouched.
    fn attribute_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        if let Some(cache) = &self.attribute_cache {
            return Ok(cache.clone());
        }
        let mut buffer = Vec::new();
        for attr in &self.attributes {
            let wire = attr.encoder().encode(attr).map_err(|source| EncodeError::Attribute {
                attr_type: attr.attr_type,
                source,
            })?;
            buffer.extend_from_slice(&wire);
        }
        Ok(buffer)
    }

    fn length_for_verification(&self, attributes: &[u8]) -> Result<u16, EncodeError> {
        match self.declared_length {
            Some(length) => Ok(length),
            None => {
                let total = Self::HEADER_LENGTH + attributes.len();
                u16::try_from(total)
                    .ok()
                    .filter(|_| total <= Self::MAX_PACKET_SIZE)
                    .ok_or(EncodeError::PacketTooLong(total))
            }
        }
    }

    /// Verify the Request Authenticator of a received Accounting-Request
    /// (also CoA-Request and Disconnect-Request) per RFC 2866 Section 3.
    ///
    /// A wrong secret or tampered packet yields `Ok(false)`; errors are
    /// reserved for inputs the check cannot be run on.
    pub fn check_accounting_request_authenticator(&self, secret: &[u8]) -> Result<bool, EncodeError> {
        if secret.is_empty() {
            return Err(EncodeError::MissingSecret);
        }
        let attributes = self.attribute_bytes()?;
        let length = self.length_for_verification(&attributes)?;
        let expected = auth::calculate_accounting_request_authenticator(
            self.code.as_u8(),
            self.identifier,
            length,
            &attributes,
            secret,
        );
        Ok(auth::authenticators_match(&expected, &self.authenticator))
    }

    /// Verify the Response Authenticator of a received reply against the
    /// authenticator of the request it answers (RFC 2865 Section 3).
    pub fn verify_response(
        &self,
        request_authenticator: &[u8; 16],
        secret: &[u8],
    ) -> Result<bool, EncodeError> {
        if secret.is_empty() {
            return Err(EncodeError::MissingSecret);
        }
        let attributes = self.attribute_bytes()?;
        let length = self.length_for_verification(&attributes)?;
        let expected = auth::calculate_response_authenticator(
            self.code.as_u8(),
            self.identifier,
            length,
            request_authenticator,
            &attributes,
            secret,
        );
        Ok(auth::authenticators_match(&expected, &self.authenticator))
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id={} auth=", self.code, self.identifier)?;
        for byte in &self.authenticator {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, " [")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", attr)?;
        }
        f.write_str("]")
    }
}
