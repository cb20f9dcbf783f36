use core::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataLinkAddress {
    Ip(SocketAddr),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid BACnet/IP address {0:?}")]
pub struct AddressParseError(pub String);

impl DataLinkAddress {
    pub const BACNET_IP_DEFAULT_PORT: u16 = 47808;

    pub fn bacnet_default(addr: IpAddr) -> Self {
        Self::Ip(SocketAddr::new(addr, Self::BACNET_IP_DEFAULT_PORT))
    }

    pub fn as_socket_addr(self) -> SocketAddr {
        match self {
            Self::Ip(addr) => addr,
        }
    }
}

/// Accepts `host`, `host:port`, `host/prefix` and `host/prefix:port`; the
/// prefix length of an interface address is ignored. The port defaults to
/// 47808.
impl FromStr for DataLinkAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressParseError(s.to_owned());
        let trimmed = s.trim();
        let Some((host, suffix)) = trimmed.split_once('/') else {
            if let Ok(addr) = trimmed.parse::<SocketAddr>() {
                return Ok(Self::Ip(addr));
            }
            return trimmed
                .parse::<IpAddr>()
                .map(Self::bacnet_default)
                .map_err(|_| invalid());
        };

        let (prefix, port) = match suffix.split_once(':') {
            Some((prefix, port)) => (prefix, port.parse::<u16>().map_err(|_| invalid())?),
            None => (suffix, Self::BACNET_IP_DEFAULT_PORT),
        };
        prefix.parse::<u8>().map_err(|_| invalid())?;
        let ip = host.parse::<IpAddr>().map_err(|_| invalid())?;
        Ok(Self::Ip(SocketAddr::new(ip, port)))
    }
}

impl fmt::Display for DataLinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(addr) => write!(f, "{addr}"),
        }
    }
}
