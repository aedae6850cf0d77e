//! RADIUS attributes: the type registry, per-family encoders and the
//! [`Attribute`] TLV itself.

pub mod attribute;
pub mod encoder;
pub mod registry;
pub mod types;

pub use attribute::{Attribute, AttributeError, AttributeValue, VendorPair};
pub use encoder::EncoderKind;
pub use registry::{lookup, AttributeInfo};
pub use types::AttributeType;
