use std::fmt;

/// RADIUS packet codes as defined in RFC 2865 Section 4
///
/// Codes this crate has no rule for are kept as [`Code::Unknown`] so that any
/// received packet can still be decoded and inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Access-Request (1)
    AccessRequest,
    /// Access-Accept (2)
    AccessAccept,
    /// Access-Reject (3)
    AccessReject,
    /// Accounting-Request (4) - RFC 2866
    AccountingRequest,
    /// Accounting-Response (5) - RFC 2866
    AccountingResponse,
    /// Access-Challenge (11)
    AccessChallenge,
    /// Status-Server (12) - RFC 5997
    StatusServer,
    /// Status-Client (13) - RFC 5997
    StatusClient,
    /// Disconnect-Request (40) - RFC 3576
    DisconnectRequest,
    /// Disconnect-ACK (41) - RFC 3576
    DisconnectAck,
    /// Disconnect-NAK (42) - RFC 3576
    DisconnectNak,
    /// CoA-Request (43) - RFC 3576
    CoaRequest,
    /// CoA-ACK (44) - RFC 3576
    CoaAck,
    /// CoA-NAK (45) - RFC 3576
    CoaNak,
    /// Any other code
    Unknown(u8),
}

/// Which Authenticator construction a packet code uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorKind {
    /// 16 random bytes (Access-Request, Status-Server)
    Request,
    /// MD5 over the packet with the request's authenticator (replies)
    Response,
    /// MD5 over the packet with a zeroed authenticator
    /// (Accounting-Request, CoA-Request, Disconnect-Request)
    AccountingRequest,
}

impl Code {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Code::AccessRequest,
            2 => Code::AccessAccept,
            3 => Code::AccessReject,
            4 => Code::AccountingRequest,
            5 => Code::AccountingResponse,
            11 => Code::AccessChallenge,
            12 => Code::StatusServer,
            13 => Code::StatusClient,
            40 => Code::DisconnectRequest,
            41 => Code::DisconnectAck,
            42 => Code::DisconnectNak,
            43 => Code::CoaRequest,
            44 => Code::CoaAck,
            45 => Code::CoaNak,
            other => Code::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Code::AccessRequest => 1,
            Code::AccessAccept => 2,
            Code::AccessReject => 3,
            Code::AccountingRequest => 4,
            Code::AccountingResponse => 5,
            Code::AccessChallenge => 11,
            Code::StatusServer => 12,
            Code::StatusClient => 13,
            Code::DisconnectRequest => 40,
            Code::DisconnectAck => 41,
            Code::DisconnectNak => 42,
            Code::CoaRequest => 43,
            Code::CoaAck => 44,
            Code::CoaNak => 45,
            Code::Unknown(value) => value,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Code::AccessRequest => "Access-Request",
            Code::AccessAccept => "Access-Accept",
            Code::AccessReject => "Access-Reject",
            Code::AccountingRequest => "Accounting-Request",
            Code::AccountingResponse => "Accounting-Response",
            Code::AccessChallenge => "Access-Challenge",
            Code::StatusServer => "Status-Server",
            Code::StatusClient => "Status-Client",
            Code::DisconnectRequest => "Disconnect-Request",
            Code::DisconnectAck => "Disconnect-ACK",
            Code::DisconnectNak => "Disconnect-NAK",
            Code::CoaRequest => "CoA-Request",
            Code::CoaAck => "CoA-ACK",
            Code::CoaNak => "CoA-NAK",
            Code::Unknown(_) => return None,
        };
        Some(name)
    }

    /// Authenticator construction for this code; `None` means the packet
    /// can be decoded but not encoded.
    pub fn authenticator_kind(self) -> Option<AuthenticatorKind> {
        match self {
            Code::AccessRequest | Code::StatusServer => Some(AuthenticatorKind::Request),
            Code::AccessAccept
            | Code::AccessReject
            | Code::AccessChallenge
            | Code::AccountingResponse
            | Code::DisconnectAck
            | Code::DisconnectNak
            | Code::CoaAck
            | Code::CoaNak => Some(AuthenticatorKind::Response),
            Code::AccountingRequest | Code::CoaRequest | Code::DisconnectRequest => {
                Some(AuthenticatorKind::AccountingRequest)
            }
            Code::StatusClient | Code::Unknown(_) => None,
        }
    }
}

impl From<u8> for Code {
    fn from(value: u8) -> Self {
        Code::from_u8(value)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.as_u8()),
            None => write!(f, "unknown({})", self.as_u8()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for value in 0..=255u8 {
            assert_eq!(Code::from_u8(value).as_u8(), value);
        }
        assert_eq!(Code::from_u8(255), Code::Unknown(255));
    }

    #[test]
    fn test_authenticator_selection() {
        assert_eq!(
            Code::AccessRequest.authenticator_kind(),
            Some(AuthenticatorKind::Request)
        );
        assert_eq!(
            Code::StatusServer.authenticator_kind(),
            Some(AuthenticatorKind::Request)
        );
        for code in [
            Code::AccessAccept,
            Code::AccessReject,
            Code::AccessChallenge,
            Code::AccountingResponse,
            Code::DisconnectAck,
            Code::DisconnectNak,
            Code::CoaAck,
            Code::CoaNak,
        ] {
            assert_eq!(code.authenticator_kind(), Some(AuthenticatorKind::Response));
        }
        for code in [Code::AccountingRequest, Code::CoaRequest, Code::DisconnectRequest] {
            assert_eq!(
                code.authenticator_kind(),
                Some(AuthenticatorKind::AccountingRequest)
            );
        }
        assert_eq!(Code::StatusClient.authenticator_kind(), None);
        assert_eq!(Code::Unknown(99).authenticator_kind(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Code::AccessRequest.to_string(), "Access-Request(1)");
        assert_eq!(Code::CoaNak.to_string(), "CoA-NAK(45)");
        assert_eq!(Code::Unknown(99).to_string(), "unknown(99)");
    }
}
