//! Attribute type registry
//!
//! Maps a one-byte attribute code to its display name and wire-format family.
//! The table is fixed at compile time from the RFC attribute lists, so lookups
//! need no synchronization and can be made from any number of tasks at once.

use super::encoder::EncoderKind;
use super::types::AttributeType;

/// Registry entry for a known attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo {
    pub attr_type: AttributeType,
    pub name: &'static str,
    pub encoder: EncoderKind,
}

/// Look up an attribute code.
///
/// Returns `None` for unregistered codes. That is not an error: callers decode
/// such attributes with [`EncoderKind::RawFallback`] and keep them as opaque bytes.
pub fn lookup(code: u8) -> Option<AttributeInfo> {
    AttributeType::from_u8(code).map(|attr_type| AttributeInfo {
        attr_type,
        name: attr_type.name(),
        encoder: attr_type.encoder(),
    })
}

/// Encoder to use for a code, falling back to opaque bytes for unknown codes
pub fn encoder_for(code: u8) -> EncoderKind {
    lookup(code)
        .map(|info| info.encoder)
        .unwrap_or(EncoderKind::RawFallback)
}

/// Number of registered attribute types
pub fn len() -> usize {
    AttributeType::ALL.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known() {
        let info = lookup(1).unwrap();
        assert_eq!(info.attr_type, AttributeType::UserName);
        assert_eq!(info.name, "User-Name");
        assert_eq!(info.encoder, EncoderKind::Text);

        let info = lookup(26).unwrap();
        assert_eq!(info.encoder, EncoderKind::VendorSpecific);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup(17).is_none());
        assert!(lookup(255).is_none());
        assert_eq!(encoder_for(255), EncoderKind::RawFallback);
    }

    #[test]
    fn test_registry_size() {
        assert!(len() >= 90);
    }

    #[test]
    fn test_concurrent_lookups() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| (0..=255u8).filter(|c| lookup(*c).is_some()).count())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), len());
        }
    }
}
