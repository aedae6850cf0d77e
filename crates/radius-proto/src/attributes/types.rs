use super::encoder::EncoderKind;
use std::fmt;

macro_rules! attribute_types {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal, $name:literal, $kind:ident; )*) => {
        /// RADIUS Attribute Types known to this crate
        ///
        /// Every variant carries its RFC display name and the wire-format family
        /// used to encode and decode it. Codes outside this set are still valid on
        /// the wire; they decode through [`EncoderKind::RawFallback`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum AttributeType {
            $( $(#[$doc])* $variant = $code, )*
        }

        impl AttributeType {
            /// Every registered attribute type, in code order
            pub const ALL: &'static [AttributeType] = &[ $( AttributeType::$variant, )* ];

            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $( $code => Some(AttributeType::$variant), )*
                    _ => None,
                }
            }

            /// RFC display name, e.g. `User-Name`
            pub fn name(self) -> &'static str {
                match self {
                    $( AttributeType::$variant => $name, )*
                }
            }

            /// Wire-format family for this attribute
            pub fn encoder(self) -> EncoderKind {
                match self {
                    $( AttributeType::$variant => EncoderKind::$kind, )*
                }
            }
        }
    };
}

attribute_types! {
    // RFC 2865
    /// User-Name (1)
    UserName = 1, "User-Name", Text;
    /// User-Password (2), hidden with the shared secret
    UserPassword = 2, "User-Password", Text;
    /// CHAP-Password (3)
    ChapPassword = 3, "CHAP-Password", Text;
    /// NAS-IP-Address (4)
    NasIpAddress = 4, "NAS-IP-Address", Address;
    /// NAS-Port (5)
    NasPort = 5, "NAS-Port", UnsignedInteger;
    /// Service-Type (6)
    ServiceType = 6, "Service-Type", UnsignedInteger;
    /// Framed-Protocol (7)
    FramedProtocol = 7, "Framed-Protocol", UnsignedInteger;
    /// Framed-IP-Address (8)
    FramedIpAddress = 8, "Framed-IP-Address", Address;
    /// Framed-IP-Netmask (9)
    FramedIpNetmask = 9, "Framed-IP-Netmask", Address;
    /// Framed-Routing (10)
    FramedRouting = 10, "Framed-Routing", UnsignedInteger;
    /// Filter-Id (11)
    FilterId = 11, "Filter-Id", Text;
    /// Framed-MTU (12)
    FramedMtu = 12, "Framed-MTU", UnsignedInteger;
    /// Framed-Compression (13)
    FramedCompression = 13, "Framed-Compression", UnsignedInteger;
    /// Login-IP-Host (14)
    LoginIpHost = 14, "Login-IP-Host", Address;
    /// Login-Service (15)
    LoginService = 15, "Login-Service", UnsignedInteger;
    /// Login-TCP-Port (16)
    LoginTcpPort = 16, "Login-TCP-Port", UnsignedInteger;
    /// Reply-Message (18)
    ReplyMessage = 18, "Reply-Message", Text;
    /// Callback-Number (19)
    CallbackNumber = 19, "Callback-Number", Text;
    /// Callback-Id (20)
    CallbackId = 20, "Callback-Id", Text;
    /// Framed-Route (22)
    FramedRoute = 22, "Framed-Route", Text;
    /// Framed-IPX-Network (23)
    FramedIpxNetwork = 23, "Framed-IPX-Network", UnsignedInteger;
    /// State (24)
    State = 24, "State", Text;
    /// Class (25)
    Class = 25, "Class", Text;
    /// Vendor-Specific (26)
    VendorSpecific = 26, "Vendor-Specific", VendorSpecific;
    /// Session-Timeout (27)
    SessionTimeout = 27, "Session-Timeout", UnsignedInteger;
    /// Idle-Timeout (28)
    IdleTimeout = 28, "Idle-Timeout", UnsignedInteger;
    /// Termination-Action (29)
    TerminationAction = 29, "Termination-Action", UnsignedInteger;
    /// Called-Station-Id (30)
    CalledStationId = 30, "Called-Station-Id", Text;
    /// Calling-Station-Id (31)
    CallingStationId = 31, "Calling-Station-Id", Text;
    /// NAS-Identifier (32)
    NasIdentifier = 32, "NAS-Identifier", Text;
    /// Proxy-State (33)
    ProxyState = 33, "Proxy-State", Text;
    /// Login-LAT-Service (34)
    LoginLatService = 34, "Login-LAT-Service", Text;
    /// Login-LAT-Node (35)
    LoginLatNode = 35, "Login-LAT-Node", Text;
    /// Login-LAT-Group (36)
    LoginLatGroup = 36, "Login-LAT-Group", Text;
    /// Framed-AppleTalk-Link (37)
    FramedAppleTalkLink = 37, "Framed-AppleTalk-Link", UnsignedInteger;
    /// Framed-AppleTalk-Network (38)
    FramedAppleTalkNetwork = 38, "Framed-AppleTalk-Network", UnsignedInteger;
    /// Framed-AppleTalk-Zone (39)
    FramedAppleTalkZone = 39, "Framed-AppleTalk-Zone", Text;

    // RFC 2866
    /// Acct-Status-Type (40)
    AcctStatusType = 40, "Acct-Status-Type", UnsignedInteger;
    /// Acct-Delay-Time (41)
    AcctDelayTime = 41, "Acct-Delay-Time", UnsignedInteger;
    /// Acct-Input-Octets (42)
    AcctInputOctets = 42, "Acct-Input-Octets", UnsignedInteger;
    /// Acct-Output-Octets (43)
    AcctOutputOctets = 43, "Acct-Output-Octets", UnsignedInteger;
    /// Acct-Session-Id (44)
    AcctSessionId = 44, "Acct-Session-Id", Text;
    /// Acct-Authentic (45)
    AcctAuthentic = 45, "Acct-Authentic", UnsignedInteger;
    /// Acct-Session-Time (46)
    AcctSessionTime = 46, "Acct-Session-Time", UnsignedInteger;
    /// Acct-Input-Packets (47)
    AcctInputPackets = 47, "Acct-Input-Packets", UnsignedInteger;
    /// Acct-Output-Packets (48)
    AcctOutputPackets = 48, "Acct-Output-Packets", UnsignedInteger;
    /// Acct-Terminate-Cause (49)
    AcctTerminateCause = 49, "Acct-Terminate-Cause", UnsignedInteger;
    /// Acct-Multi-Session-Id (50)
    AcctMultiSessionId = 50, "Acct-Multi-Session-Id", Text;
    /// Acct-Link-Count (51)
    AcctLinkCount = 51, "Acct-Link-Count", UnsignedInteger;
    /// Acct-Input-Gigawords (52) - RFC 2869
    /// High 32 bits of 64-bit Acct-Input-Octets counter
    AcctInputGigawords = 52, "Acct-Input-Gigawords", UnsignedInteger;
    /// Acct-Output-Gigawords (53) - RFC 2869
    AcctOutputGigawords = 53, "Acct-Output-Gigawords", UnsignedInteger;
    /// Event-Timestamp (55) - RFC 2869, seconds since the Unix epoch
    EventTimestamp = 55, "Event-Timestamp", UnsignedInteger;

    /// CHAP-Challenge (60)
    ChapChallenge = 60, "CHAP-Challenge", Text;
    /// NAS-Port-Type (61)
    NasPortType = 61, "NAS-Port-Type", UnsignedInteger;
    /// Port-Limit (62)
    PortLimit = 62, "Port-Limit", UnsignedInteger;
    /// Login-LAT-Port (63)
    LoginLatPort = 63, "Login-LAT-Port", Text;

    // RFC 2868 (tagged)
    /// Tunnel-Type (64)
    TunnelType = 64, "Tunnel-Type", Tunnel;
    /// Tunnel-Medium-Type (65)
    TunnelMediumType = 65, "Tunnel-Medium-Type", Tunnel;
    /// Tunnel-Client-Endpoint (66)
    TunnelClientEndpoint = 66, "Tunnel-Client-Endpoint", Tunnel;
    /// Tunnel-Server-Endpoint (67)
    TunnelServerEndpoint = 67, "Tunnel-Server-Endpoint", Tunnel;
    /// Acct-Tunnel-Connection (68) - RFC 2867
    AcctTunnelConnection = 68, "Acct-Tunnel-Connection", Text;
    /// Tunnel-Password (69)
    TunnelPassword = 69, "Tunnel-Password", Tunnel;

    // RFC 2869
    /// Connect-Info (77)
    ConnectInfo = 77, "Connect-Info", Text;
    /// EAP-Message (79)
    EapMessage = 79, "EAP-Message", Text;
    /// Message-Authenticator (80)
    MessageAuthenticator = 80, "Message-Authenticator", Text;

    /// Tunnel-Private-Group-ID (81)
    TunnelPrivateGroupId = 81, "Tunnel-Private-Group-ID", Tunnel;
    /// Tunnel-Assignment-ID (82)
    TunnelAssignmentId = 82, "Tunnel-Assignment-ID", Tunnel;
    /// Tunnel-Preference (83)
    TunnelPreference = 83, "Tunnel-Preference", Tunnel;
    /// Acct-Interim-Interval (85) - RFC 2869
    AcctInterimInterval = 85, "Acct-Interim-Interval", UnsignedInteger;
    /// Acct-Tunnel-Packets-Lost (86) - RFC 2867
    AcctTunnelPacketsLost = 86, "Acct-Tunnel-Packets-Lost", UnsignedInteger;
    /// NAS-Port-Id (87) - RFC 2869
    NasPortId = 87, "NAS-Port-Id", Text;
    /// Tunnel-Client-Auth-ID (90)
    TunnelClientAuthId = 90, "Tunnel-Client-Auth-ID", Tunnel;
    /// Tunnel-Server-Auth-ID (91)
    TunnelServerAuthId = 91, "Tunnel-Server-Auth-ID", Tunnel;

    // RFC 3162, carried as raw octets
    /// NAS-IPv6-Address (95)
    NasIpv6Address = 95, "NAS-IPv6-Address", Text;
    /// Framed-Interface-Id (96)
    FramedInterfaceId = 96, "Framed-Interface-Id", Text;
    /// Framed-IPv6-Prefix (97)
    FramedIpv6Prefix = 97, "Framed-IPv6-Prefix", Text;
    /// Login-IPv6-Host (98)
    LoginIpv6Host = 98, "Login-IPv6-Host", Text;
    /// Framed-IPv6-Route (99)
    FramedIpv6Route = 99, "Framed-IPv6-Route", Text;
    /// Framed-IPv6-Pool (100)
    FramedIpv6Pool = 100, "Framed-IPv6-Pool", Text;

    // RFC 3576
    /// Error-Cause (101)
    ErrorCause = 101, "Error-Cause", UnsignedInteger;

    // RFC 5090
    /// Digest-Response (103)
    DigestResponse = 103, "Digest-Response", Text;
    /// Digest-Realm (104)
    DigestRealm = 104, "Digest-Realm", Text;
    /// Digest-Nonce (105)
    DigestNonce = 105, "Digest-Nonce", Text;
    /// Digest-Response-Auth (106)
    DigestResponseAuth = 106, "Digest-Response-Auth", Text;
    /// Digest-Nextnonce (107)
    DigestNextnonce = 107, "Digest-Nextnonce", Text;
    /// Digest-Method (108)
    DigestMethod = 108, "Digest-Method", Text;
    /// Digest-URI (109)
    DigestUri = 109, "Digest-URI", Text;
    /// Digest-Qop (110)
    DigestQop = 110, "Digest-Qop", Text;
    /// Digest-Algorithm (111)
    DigestAlgorithm = 111, "Digest-Algorithm", Text;
    /// Digest-Entity-Body-Hash (112)
    DigestEntityBodyHash = 112, "Digest-Entity-Body-Hash", Text;
    /// Digest-CNonce (113)
    DigestCNonce = 113, "Digest-CNonce", Text;
    /// Digest-Nonce-Count (114)
    DigestNonceCount = 114, "Digest-Nonce-Count", Text;
    /// Digest-Username (115)
    DigestUsername = 115, "Digest-Username", Text;
    /// Digest-Opaque (116)
    DigestOpaque = 116, "Digest-Opaque", Text;
    /// Digest-Auth-Param (117)
    DigestAuthParam = 117, "Digest-Auth-Param", Text;
    /// Digest-AKA-Auts (118)
    DigestAkaAuts = 118, "Digest-AKA-Auts", Text;
    /// Digest-Domain (119)
    DigestDomain = 119, "Digest-Domain", Text;
    /// Digest-Stale (120)
    DigestStale = 120, "Digest-Stale", Text;
    /// Digest-HA1 (121)
    DigestHa1 = 121, "Digest-HA1", Text;
    /// SIP-AOR (122)
    SipAor = 122, "SIP-AOR", Text;
}

impl AttributeType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<AttributeType> for u8 {
    fn from(value: AttributeType) -> Self {
        value as u8
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}

/// Render an attribute code the way logs show it: `User-Name(1)` or `unknown(17)`
pub fn display_code(code: u8) -> String {
    match AttributeType::from_u8(code) {
        Some(t) => t.to_string(),
        None => format!("unknown({})", code),
    }
}
