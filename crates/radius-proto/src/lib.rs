//! RADIUS wire protocol codec
//!
//! Encoding and decoding of RADIUS packets and attributes as defined in
//! RFC 2865, 2866, 2867, 2868, 3162, 3576 and 5090.
//!
//! # Features
//!
//! - Packet framing with the three MD5 authenticator constructions
//! - Fixed registry of the well-known RFC attributes
//! - Vendor-Specific sub-attributes and RFC 2868 tagged tunnel attributes
//! - Unknown attribute types kept as opaque bytes
//! - User-Password hiding
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Attribute, AttributeType, Code, Packet};
//!
//! let mut packet = Packet::new(Code::AccountingRequest, "secret");
//! packet.add_attribute(Attribute::string(AttributeType::UserName, "alice"));
//! packet.add_attribute(Attribute::integer(AttributeType::AcctStatusType, 1));
//!
//! let bytes = packet.encode().unwrap();
//! let received = Packet::decode(&bytes).unwrap();
//! assert!(received.check_accounting_request_authenticator(b"secret").unwrap());
//! ```

pub mod accounting;
pub mod attributes;
pub mod auth;
pub mod packet;

pub use accounting::{AcctAuthentic, AcctStatusType, AcctTerminateCause};
pub use attributes::{Attribute, AttributeError, AttributeType, AttributeValue, EncoderKind, VendorPair};
pub use auth::{
    calculate_accounting_request_authenticator, calculate_response_authenticator,
    decrypt_user_password, encrypt_user_password, generate_request_authenticator, PasswordError,
};
pub use packet::{AuthenticatorKind, Code, DecodeError, EncodeError, Packet};
