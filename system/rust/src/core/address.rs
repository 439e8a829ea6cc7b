//! Bluetooth device address of a remote peer

use std::fmt::{Debug, Display, Formatter, Result};
use std::str::FromStr;

/// A BR/EDR device address. Bytes are stored in the order they are printed.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq)]
pub struct RawAddress {
    /// The 6 address bytes
    pub address: [u8; 6],
}

impl RawAddress {
    /// Constructs an address from its 6 bytes
    pub const fn new(address: [u8; 6]) -> Self {
        Self { address }
    }
}

impl Display for RawAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let a = &self.address;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a[0], a[1], a[2], a[3], a[4], a[5])
    }
}

impl Debug for RawAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(self, f)
    }
}

impl FromStr for RawAddress {
    type Err = String;

    /// Parses `XX:XX:XX:XX:XX:XX`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(format!("Invalid address '{}'", s));
        }

        let mut address = [0u8; 6];
        for (byte, part) in address.iter_mut().zip(parts.iter()) {
            *byte = u8::from_str_radix(part, 16).map_err(|_| format!("Invalid address '{}'", s))?;
        }
        Ok(Self { address })
    }
}
