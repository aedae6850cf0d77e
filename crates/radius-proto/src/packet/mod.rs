mod code;
#[allow(clippy::module_inception)]
mod packet;

pub use code::{AuthenticatorKind, Code};
pub use packet::{DecodeError, EncodeError, Packet};
