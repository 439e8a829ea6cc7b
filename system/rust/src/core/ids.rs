//! These are strongly-typed identifiers representing the various objects
//! handed to us by the profile transport

use std::fmt::{Display, Formatter, Result};

/// The handle of a Hands-Free server port, assigned by the profile transport.
/// Zero is never a valid port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub u32);

impl Display for PortId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

/// Index into the fixed connection slot table. Only the table hands these
/// out, so an index is always in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub(crate) usize);

impl SlotIndex {
    /// The other slot of the two-slot table
    pub fn other(self) -> SlotIndex {
        SlotIndex(1 - self.0)
    }
}

impl Display for SlotIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

/// HCI handle of the ACL connection to a peer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(pub u16);

/// HCI handle of a synchronous (SCO/eSCO) audio link
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoHandle(pub u16);
