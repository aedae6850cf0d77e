//! Per-family attribute wire formats
//!
//! The set of families is closed and fixed by the RFCs, so dispatch is a plain
//! `match` over [`EncoderKind`]. Every encoder produces a complete TLV
//! (`[type][length][value...]`) and every decoder receives one, already
//! bounds-checked by [`Attribute::decode`](super::Attribute::decode).

use super::attribute::{Attribute, AttributeError, AttributeValue, VendorPair};
use super::types::AttributeType;
use std::net::{IpAddr, Ipv4Addr};

/// Wire-format family of an attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    /// Raw octets, no terminator
    Text,
    /// IPv4 address, 4 bytes network order
    Address,
    /// 32-bit unsigned integer, big-endian
    UnsignedInteger,
    /// Vendor ID followed by vendor sub-TLVs (RFC 2865 Section 5.26)
    VendorSpecific,
    /// Tag byte followed by the value (RFC 2868 Section 3)
    Tunnel,
    /// Opaque bytes for codes missing from the registry; decode only
    RawFallback,
}

/// Highest tag value that groups tunnel attributes (RFC 2868 Section 3.1)
pub const MAX_TUNNEL_TAG: u8 = 0x1F;

/// Largest value that fits the 3-byte integer field of tagged tunnel attributes
pub const MAX_TUNNEL_INTEGER: u32 = 0x00FF_FFFF;

impl EncoderKind {
    pub fn name(self) -> &'static str {
        match self {
            EncoderKind::Text => "text",
            EncoderKind::Address => "address",
            EncoderKind::UnsignedInteger => "integer",
            EncoderKind::VendorSpecific => "vendor-specific",
            EncoderKind::Tunnel => "tunnel",
            EncoderKind::RawFallback => "raw",
        }
    }

    /// Serialize `attr` into a full TLV
    pub fn encode(self, attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
        let payload = match self {
            EncoderKind::Text => encode_text(attr)?,
            EncoderKind::Address => encode_address(attr)?,
            EncoderKind::UnsignedInteger => encode_integer(attr)?,
            EncoderKind::VendorSpecific => encode_vendor_specific(attr)?,
            EncoderKind::Tunnel => encode_tunnel(attr)?,
            EncoderKind::RawFallback => {
                return Err(AttributeError::UnencodableType(attr.attr_type));
            }
        };

        let length = Attribute::HEADER_LENGTH + payload.len();
        if length > Attribute::MAX_LENGTH {
            return Err(AttributeError::AttributeTooLong(length));
        }

        let mut wire = Vec::with_capacity(length);
        wire.push(attr.attr_type);
        wire.push(length as u8);
        wire.extend_from_slice(&payload);
        Ok(wire)
    }

    /// Decode the value part of one TLV. Returns the tag (zero for untagged
    /// families) and the typed value.
    pub fn decode(self, wire: &[u8]) -> Result<(u8, AttributeValue), AttributeError> {
        let value = wire
            .get(Attribute::HEADER_LENGTH..)
            .ok_or(AttributeError::Truncated {
                expected: Attribute::HEADER_LENGTH,
                actual: wire.len(),
            })?;
        match self {
            EncoderKind::Text => Ok((0, decode_text(value))),
            EncoderKind::Address => {
                if value.len() != 4 {
                    return Err(AttributeError::InvalidAddressSize(value.len()));
                }
                let addr = Ipv4Addr::new(value[0], value[1], value[2], value[3]);
                Ok((0, AttributeValue::Address(IpAddr::V4(addr))))
            }
            EncoderKind::UnsignedInteger => {
                let bytes: [u8; 4] = value.try_into().map_err(|_| {
                    if value.len() < 4 {
                        AttributeError::Truncated {
                            expected: wire.len() + 4 - value.len(),
                            actual: wire.len(),
                        }
                    } else {
                        AttributeError::InvalidLength(wire.len())
                    }
                })?;
                Ok((0, AttributeValue::Integer(u32::from_be_bytes(bytes))))
            }
            EncoderKind::VendorSpecific => decode_vendor_specific(wire),
            EncoderKind::Tunnel => {
                if value.is_empty() {
                    return Err(AttributeError::Truncated {
                        expected: Attribute::HEADER_LENGTH + 1,
                        actual: wire.len(),
                    });
                }
                if value[0] > MAX_TUNNEL_TAG && has_optional_tag(wire[0]) {
                    return Ok((0, AttributeValue::Bytes(value.to_vec())));
                }
                Ok((value[0], AttributeValue::Bytes(value[1..].to_vec())))
            }
            EncoderKind::RawFallback => Ok((0, AttributeValue::Bytes(value.to_vec()))),
        }
    }
}

fn mismatch(attr: &Attribute, expected: EncoderKind) -> AttributeError {
    AttributeError::ValueTypeMismatch {
        attr_type: attr.attr_type,
        expected: expected.name(),
        found: attr.value.kind_name(),
    }
}

fn encode_text(attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
    match &attr.value {
        AttributeValue::Text(s) => Ok(s.as_bytes().to_vec()),
        AttributeValue::Bytes(b) => Ok(b.clone()),
        _ => Err(mismatch(attr, EncoderKind::Text)),
    }
}

/// Valid UTF-8 becomes `Text`, anything else stays `Bytes` so nothing is lost.
fn decode_text(value: &[u8]) -> AttributeValue {
    match std::str::from_utf8(value) {
        Ok(s) => AttributeValue::Text(s.to_string()),
        Err(_) => AttributeValue::Bytes(value.to_vec()),
    }
}

fn encode_address(attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
    let v4 = match &attr.value {
        AttributeValue::Address(IpAddr::V4(v4)) => *v4,
        AttributeValue::Address(IpAddr::V6(v6)) => v6
            .to_ipv4_mapped()
            .ok_or_else(|| mismatch(attr, EncoderKind::Address))?,
        _ => return Err(mismatch(attr, EncoderKind::Address)),
    };
    Ok(v4.octets().to_vec())
}

fn encode_integer(attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
    match attr.value {
        AttributeValue::Integer(n) => Ok(n.to_be_bytes().to_vec()),
        _ => Err(mismatch(attr, EncoderKind::UnsignedInteger)),
    }
}

fn encode_vendor_specific(attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
    let (vendor_id, pairs) = match &attr.value {
        AttributeValue::VendorSpecific { vendor_id, pairs } => (*vendor_id, pairs),
        _ => return Err(mismatch(attr, EncoderKind::VendorSpecific)),
    };
    if pairs.is_empty() {
        return Err(AttributeError::Truncated {
            expected: 7,
            actual: Attribute::HEADER_LENGTH + 4,
        });
    }

    let mut payload = Vec::with_capacity(4 + pairs.iter().map(VendorPair::encoded_length).sum::<usize>());
    payload.extend_from_slice(&vendor_id.to_be_bytes());
    for pair in pairs {
        let length = pair.encoded_length();
        if length > u8::MAX as usize {
            return Err(AttributeError::AttributeTooLong(length));
        }
        payload.push(pair.vendor_type);
        payload.push(length as u8);
        payload.extend_from_slice(&pair.value);
    }
    Ok(payload)
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |  Length       |            Vendor-Id
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      Vendor-Id (cont)           | Vendor type   | Vendor length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Attribute-Specific...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
fn decode_vendor_specific(wire: &[u8]) -> Result<(u8, AttributeValue), AttributeError> {
    if wire.len() < 7 {
        return Err(AttributeError::Truncated {
            expected: 7,
            actual: wire.len(),
        });
    }
    let vendor_id = u32::from_be_bytes([wire[2], wire[3], wire[4], wire[5]]);

    let mut pairs = Vec::new();
    let mut rest = &wire[6..];
    while !rest.is_empty() {
        if rest.len() < VendorPair::HEADER_LENGTH {
            return Err(AttributeError::Truncated {
                expected: VendorPair::HEADER_LENGTH,
                actual: rest.len(),
            });
        }
        let vendor_type = rest[0];
        let length = rest[1] as usize;
        if length < VendorPair::HEADER_LENGTH {
            return Err(AttributeError::InvalidLength(length));
        }
        if length > rest.len() {
            return Err(AttributeError::Truncated {
                expected: length,
                actual: rest.len(),
            });
        }
        pairs.push(VendorPair {
            vendor_type,
            value: rest[VendorPair::HEADER_LENGTH..length].to_vec(),
        });
        rest = &rest[length..];
    }

    Ok((0, AttributeValue::VendorSpecific { vendor_id, pairs }))
}

/// String-valued tunnel attributes, where a first byte above 0x1F is data
/// rather than a tag (RFC 2868 Sections 3.5, 3.6 and 3.9 to 3.11)
fn has_optional_tag(attr_type: u8) -> bool {
    matches!(
        AttributeType::from_u8(attr_type),
        Some(
            AttributeType::TunnelClientEndpoint
                | AttributeType::TunnelServerEndpoint
                | AttributeType::TunnelPrivateGroupId
                | AttributeType::TunnelAssignmentId
                | AttributeType::TunnelClientAuthId
                | AttributeType::TunnelServerAuthId
        )
    )
}

fn encode_tunnel(attr: &Attribute) -> Result<Vec<u8>, AttributeError> {
    if attr.tag > MAX_TUNNEL_TAG {
        return Err(AttributeError::InvalidTag(attr.tag));
    }
    let mut payload = vec![attr.tag];
    match &attr.value {
        AttributeValue::Text(s) => payload.extend_from_slice(s.as_bytes()),
        AttributeValue::Bytes(b) => payload.extend_from_slice(b),
        AttributeValue::Integer(n) => {
            if *n > MAX_TUNNEL_INTEGER {
                return Err(AttributeError::ValueOutOfRange {
                    attr_type: attr.attr_type,
                    value: *n,
                });
            }
            payload.extend_from_slice(&n.to_be_bytes()[1..]);
        }
        _ => return Err(mismatch(attr, EncoderKind::Tunnel)),
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeType;

    #[test]
    fn test_text_encode_non_ascii() {
        let attr = Attribute::string(AttributeType::UserName, "строка еще строка");
        let wire = EncoderKind::Text.encode(&attr).unwrap();
        assert_eq!(&wire[2..], "строка еще строка".as_bytes());
        assert_eq!(wire[1] as usize, wire.len());
    }

    #[test]
    fn test_text_encode_rejects_integer() {
        let attr = Attribute::integer(AttributeType::UserName, 5);
        assert!(matches!(
            EncoderKind::Text.encode(&attr),
            Err(AttributeError::ValueTypeMismatch { attr_type: 1, .. })
        ));
    }

    #[test]
    fn test_text_too_long() {
        let attr = Attribute::bytes(AttributeType::Class, vec![b'x'; 254]);
        assert_eq!(
            EncoderKind::Text.encode(&attr),
            Err(AttributeError::AttributeTooLong(256))
        );

        let attr = Attribute::bytes(AttributeType::Class, vec![b'x'; 251]);
        assert_eq!(EncoderKind::Text.encode(&attr).unwrap().len(), 253);

        let attr = Attribute::bytes(AttributeType::Class, vec![b'x'; 252]);
        assert!(EncoderKind::Text.encode(&attr).is_err());
    }

    #[test]
    fn test_address_encode() {
        let attr = Attribute::ipv4(AttributeType::FramedIpAddress, Ipv4Addr::LOCALHOST);
        let wire = EncoderKind::Address.encode(&attr).unwrap();
        assert_eq!(wire, vec![8, 6, 127, 0, 0, 1]);
    }

    #[test]
    fn test_address_encode_mapped_v6() {
        let mapped: IpAddr = "::ffff:10.1.2.3".parse().unwrap();
        let attr = Attribute::address(AttributeType::NasIpAddress, mapped);
        let wire = EncoderKind::Address.encode(&attr).unwrap();
        assert_eq!(&wire[2..], &[10, 1, 2, 3]);
    }

    #[test]
    fn test_address_encode_rejects_v6_and_integer() {
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let attr = Attribute::address(AttributeType::NasIpAddress, v6);
        assert!(EncoderKind::Address.encode(&attr).is_err());

        let attr = Attribute::integer(AttributeType::NasIpAddress, u32::MAX);
        assert!(EncoderKind::Address.encode(&attr).is_err());
    }

    #[test]
    fn test_address_decode_invalid_size() {
        assert_eq!(
            EncoderKind::Address.decode(&[8, 5, 127, 0, 0]),
            Err(AttributeError::InvalidAddressSize(3))
        );
    }

    #[test]
    fn test_integer_decode_max() {
        let (_, value) = EncoderKind::UnsignedInteger
            .decode(&[5, 6, 0xff, 0xff, 0xff, 0xff])
            .unwrap();
        assert_eq!(value, AttributeValue::Integer(u32::MAX));
    }

    #[test]
    fn test_integer_decode_short() {
        assert!(matches!(
            EncoderKind::UnsignedInteger.decode(&[5, 4, 0, 1]),
            Err(AttributeError::Truncated { .. })
        ));
        assert_eq!(
            EncoderKind::UnsignedInteger.decode(&[5, 7, 0, 0, 0, 1, 2]),
            Err(AttributeError::InvalidLength(7))
        );
    }

    #[test]
    fn test_vendor_specific_encode() {
        let mut attr = Attribute::vendor_specific(9);
        attr.add_vendor_pair(252, b"test test".to_vec()).unwrap();
        attr.add_vendor_pair(252, b"test test 2".to_vec()).unwrap();
        let wire = EncoderKind::VendorSpecific.encode(&attr).unwrap();
        assert_eq!(wire[5], 9);
        assert_eq!(wire[1] as usize, wire.len());
        assert_eq!(wire.len(), 6 + (2 + 9) + (2 + 11));
    }

    #[test]
    fn test_vendor_specific_decode() {
        let wire = [
            26, 30, 0, 0, 0, 9, 252, 11, 116, 101, 115, 116, 32, 116, 101, 115, 116, 252, 13,
            116, 101, 115, 116, 32, 116, 101, 115, 116, 32, 50,
        ];
        let (_, value) = EncoderKind::VendorSpecific.decode(&wire).unwrap();
        match value {
            AttributeValue::VendorSpecific { vendor_id, pairs } => {
                assert_eq!(vendor_id, 9);
                assert_eq!(pairs.len(), 2);
                assert_eq!(pairs[1].value, b"test test 2");
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_vendor_specific_decode_too_short() {
        assert!(matches!(
            EncoderKind::VendorSpecific.decode(&[26, 6, 0, 0, 0, 9]),
            Err(AttributeError::Truncated { expected: 7, actual: 6 })
        ));
    }

    #[test]
    fn test_vendor_specific_decode_bad_sub_length() {
        // sub-length 0 and 1 are below the sub-TLV header
        assert_eq!(
            EncoderKind::VendorSpecific.decode(&[26, 9, 0, 0, 0, 9, 1, 0, 0]),
            Err(AttributeError::InvalidLength(0))
        );
        assert_eq!(
            EncoderKind::VendorSpecific.decode(&[26, 9, 0, 0, 0, 9, 1, 1, 0]),
            Err(AttributeError::InvalidLength(1))
        );
        // sub-length runs past the attribute
        assert!(matches!(
            EncoderKind::VendorSpecific.decode(&[26, 9, 0, 0, 0, 9, 1, 5, 0]),
            Err(AttributeError::Truncated { expected: 5, actual: 3 })
        ));
        // a lone trailing byte cannot hold a sub-TLV header
        assert!(matches!(
            EncoderKind::VendorSpecific.decode(&[26, 7, 0, 0, 0, 9, 1]),
            Err(AttributeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_tunnel_encode_integer() {
        let attr = Attribute::tunnel(AttributeType::TunnelType, 1, AttributeValue::Integer(3));
        let wire = EncoderKind::Tunnel.encode(&attr).unwrap();
        assert_eq!(wire, vec![64, 6, 1, 0, 0, 3]);
    }

    #[test]
    fn test_tunnel_encode_text() {
        let attr = Attribute::tunnel(
            AttributeType::TunnelPrivateGroupId,
            2,
            AttributeValue::Text("vlan10".to_string()),
        );
        let wire = EncoderKind::Tunnel.encode(&attr).unwrap();
        assert_eq!(&wire[..3], &[81, 9, 2]);
        assert_eq!(&wire[3..], b"vlan10");
    }

    #[test]
    fn test_tunnel_encode_rejects_bad_tag_and_range() {
        let attr = Attribute::tunnel(AttributeType::TunnelType, 0x20, AttributeValue::Integer(3));
        assert_eq!(
            EncoderKind::Tunnel.encode(&attr),
            Err(AttributeError::InvalidTag(0x20))
        );

        let attr = Attribute::tunnel(
            AttributeType::TunnelType,
            1,
            AttributeValue::Integer(0x0100_0000),
        );
        assert!(matches!(
            EncoderKind::Tunnel.encode(&attr),
            Err(AttributeError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tunnel_decode() {
        let (tag, value) = EncoderKind::Tunnel.decode(&[64, 6, 1, 0, 0, 13]).unwrap();
        assert_eq!(tag, 1);
        assert_eq!(value, AttributeValue::Bytes(vec![0, 0, 13]));

        assert!(EncoderKind::Tunnel.decode(&[64, 2]).is_err());
    }

    #[test]
    fn test_tunnel_decode_untagged_string() {
        let (tag, value) = EncoderKind::Tunnel.decode(&[81, 4, b'1', b'0']).unwrap();
        assert_eq!(tag, 0);
        assert_eq!(value, AttributeValue::Bytes(b"10".to_vec()));

        // a tagged string keeps its tag
        let (tag, value) = EncoderKind::Tunnel.decode(&[81, 5, 2, b'1', b'0']).unwrap();
        assert_eq!(tag, 2);
        assert_eq!(value, AttributeValue::Bytes(b"10".to_vec()));

        // integer tunnel attributes always carry a tag byte
        let (tag, _) = EncoderKind::Tunnel.decode(&[64, 6, 0x31, 0, 0, 13]).unwrap();
        assert_eq!(tag, 0x31);
    }

    #[test]
    fn test_vendor_specific_encode_rejects_empty() {
        let attr = Attribute::vendor_specific(9);
        assert_eq!(
            EncoderKind::VendorSpecific.encode(&attr),
            Err(AttributeError::Truncated { expected: 7, actual: 6 })
        );
    }

    #[test]
    fn test_raw_fallback() {
        let (_, value) = EncoderKind::RawFallback.decode(&[200, 4, 0xde, 0xad]).unwrap();
        assert_eq!(value, AttributeValue::Bytes(vec![0xde, 0xad]));

        let attr = Attribute::bytes(200, vec![1]);
        assert_eq!(
            EncoderKind::RawFallback.encode(&attr),
            Err(AttributeError::UnencodableType(200))
        );
    }
}
