//! Enumerated values of the RFC 2866 accounting attributes
//!
//! The codec carries these as plain integers; the helpers here give them
//! names and read them back from a decoded packet.
//!
//! ```rust
//! use radius_proto::accounting::{AcctStatusType, AcctTerminateCause};
//!
//! assert_eq!(AcctStatusType::Start.as_u32(), 1);
//! assert_eq!(AcctTerminateCause::from_u32(1), Some(AcctTerminateCause::UserRequest));
//! ```

use crate::attributes::{Attribute, AttributeType};
use crate::packet::Packet;
use std::fmt;

/// Acct-Status-Type values (RFC 2866 Section 5.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctStatusType {
    Start = 1,
    Stop = 2,
    InterimUpdate = 3,
    AccountingOn = 7,
    AccountingOff = 8,
}

impl AcctStatusType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctStatusType::Start),
            2 => Some(AcctStatusType::Stop),
            3 => Some(AcctStatusType::InterimUpdate),
            7 => Some(AcctStatusType::AccountingOn),
            8 => Some(AcctStatusType::AccountingOff),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Start, Stop or Interim-Update
    pub fn is_session_status(self) -> bool {
        matches!(
            self,
            AcctStatusType::Start | AcctStatusType::Stop | AcctStatusType::InterimUpdate
        )
    }

    /// Read the (last) Acct-Status-Type of `packet`
    pub fn from_packet(packet: &Packet) -> Option<Self> {
        integer_value(packet, AttributeType::AcctStatusType).and_then(Self::from_u32)
    }

    pub fn to_attribute(self) -> Attribute {
        Attribute::integer(AttributeType::AcctStatusType, self.as_u32())
    }
}

impl fmt::Display for AcctStatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcctStatusType::Start => "Start",
            AcctStatusType::Stop => "Stop",
            AcctStatusType::InterimUpdate => "Interim-Update",
            AcctStatusType::AccountingOn => "Accounting-On",
            AcctStatusType::AccountingOff => "Accounting-Off",
        };
        f.write_str(name)
    }
}

/// Acct-Terminate-Cause values (RFC 2866 Section 5.10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctTerminateCause {
    UserRequest = 1,
    LostCarrier = 2,
    LostService = 3,
    IdleTimeout = 4,
    SessionTimeout = 5,
    AdminReset = 6,
    AdminReboot = 7,
    PortError = 8,
    NasError = 9,
    NasRequest = 10,
    NasReboot = 11,
    PortUnneeded = 12,
    PortPreempted = 13,
    PortSuspended = 14,
    ServiceUnavailable = 15,
    Callback = 16,
    UserError = 17,
    HostRequest = 18,
}

impl AcctTerminateCause {
    const ALL: [AcctTerminateCause; 18] = [
        AcctTerminateCause::UserRequest,
        AcctTerminateCause::LostCarrier,
        AcctTerminateCause::LostService,
        AcctTerminateCause::IdleTimeout,
        AcctTerminateCause::SessionTimeout,
        AcctTerminateCause::AdminReset,
        AcctTerminateCause::AdminReboot,
        AcctTerminateCause::PortError,
        AcctTerminateCause::NasError,
        AcctTerminateCause::NasRequest,
        AcctTerminateCause::NasReboot,
        AcctTerminateCause::PortUnneeded,
        AcctTerminateCause::PortPreempted,
        AcctTerminateCause::PortSuspended,
        AcctTerminateCause::ServiceUnavailable,
        AcctTerminateCause::Callback,
        AcctTerminateCause::UserError,
        AcctTerminateCause::HostRequest,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|cause| cause.as_u32() == value)
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_packet(packet: &Packet) -> Option<Self> {
        integer_value(packet, AttributeType::AcctTerminateCause).and_then(Self::from_u32)
    }

    pub fn to_attribute(self) -> Attribute {
        Attribute::integer(AttributeType::AcctTerminateCause, self.as_u32())
    }
}

/// Acct-Authentic values (RFC 2866 Section 5.6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctAuthentic {
    Radius = 1,
    Local = 2,
    Remote = 3,
}

impl AcctAuthentic {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctAuthentic::Radius),
            2 => Some(AcctAuthentic::Local),
            3 => Some(AcctAuthentic::Remote),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_packet(packet: &Packet) -> Option<Self> {
        integer_value(packet, AttributeType::AcctAuthentic).and_then(Self::from_u32)
    }
}

fn integer_value(packet: &Packet, attr_type: AttributeType) -> Option<u32> {
    packet
        .find_attribute(attr_type)
        .and_then(|attr| attr.as_integer().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Code;

    #[test]
    fn test_acct_status_type_conversion() {
        assert_eq!(AcctStatusType::Start.as_u32(), 1);
        assert_eq!(AcctStatusType::AccountingOff.as_u32(), 8);
        assert_eq!(AcctStatusType::from_u32(3), Some(AcctStatusType::InterimUpdate));
        assert_eq!(AcctStatusType::from_u32(4), None);
        assert!(AcctStatusType::Stop.is_session_status());
        assert!(!AcctStatusType::AccountingOn.is_session_status());
        assert_eq!(AcctStatusType::InterimUpdate.to_string(), "Interim-Update");
    }

    #[test]
    fn test_terminate_cause_conversion() {
        for value in 1..=18 {
            assert_eq!(AcctTerminateCause::from_u32(value).unwrap().as_u32(), value);
        }
        assert_eq!(AcctTerminateCause::from_u32(0), None);
        assert_eq!(AcctTerminateCause::from_u32(19), None);
    }

    #[test]
    fn test_acct_authentic_conversion() {
        assert_eq!(AcctAuthentic::from_u32(2), Some(AcctAuthentic::Local));
        assert_eq!(AcctAuthentic::from_u32(4), None);
    }

    #[test]
    fn test_values_from_packet() {
        let mut packet = Packet::new(Code::AccountingRequest, "s");
        assert_eq!(AcctStatusType::from_packet(&packet), None);

        packet.add_attribute(AcctStatusType::Stop.to_attribute());
        packet.add_attribute(AcctTerminateCause::IdleTimeout.to_attribute());
        packet.add_attribute(Attribute::integer(AttributeType::AcctAuthentic, 1));

        assert_eq!(AcctStatusType::from_packet(&packet), Some(AcctStatusType::Stop));
        assert_eq!(
            AcctTerminateCause::from_packet(&packet),
            Some(AcctTerminateCause::IdleTimeout)
        );
        assert_eq!(AcctAuthentic::from_packet(&packet), Some(AcctAuthentic::Radius));
    }
}
