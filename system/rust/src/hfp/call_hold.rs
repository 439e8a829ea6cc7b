//! Call hold and multiparty handling selections (AT+CHLD)

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::cast::FromPrimitive;
use std::convert::TryFrom;

use crate::hfp::error::CoordinatorError;

/// What the remote device should do with its calls
#[derive(Clone, Copy, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CallHoldHandling {
    /// Release all held calls, or reject the waiting call
    ReleaseAllHeld = 0,
    /// Release all active calls and accept the held or waiting call
    ReleaseActiveAcceptWaiting,
    /// Place all active calls on hold and accept the held or waiting call
    HoldActiveAcceptOther,
    /// Add a held call to the conversation
    AddHeldToConversation,
    /// Connect the two calls and disconnect the subscriber (explicit call transfer)
    ConnectTwoAndDisconnect,
    /// Release the call with the given index
    ReleaseSpecifiedIndex,
    /// Place all calls on hold except the call with the given index
    PrivateConsultation,
}

impl CallHoldHandling {
    /// Whether the handling can bring a call to the active state, and therefore needs voice
    pub fn activates_call(self) -> bool {
        !matches!(self, CallHoldHandling::ReleaseAllHeld | CallHoldHandling::ReleaseSpecifiedIndex)
    }
}

impl TryFrom<u32> for CallHoldHandling {
    type Error = CoordinatorError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        CallHoldHandling::from_u32(value).ok_or_else(|| {
            CoordinatorError::InvalidParameters(format!("Unknown call hold handling {}", value))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handling_from_u32() {
        assert_eq!(CallHoldHandling::try_from(0), Ok(CallHoldHandling::ReleaseAllHeld));
        assert_eq!(CallHoldHandling::try_from(2), Ok(CallHoldHandling::HoldActiveAcceptOther));
        assert_eq!(CallHoldHandling::try_from(6), Ok(CallHoldHandling::PrivateConsultation));
    }

    #[test]
    fn test_out_of_range_handling_is_invalid() {
        assert!(matches!(
            CallHoldHandling::try_from(7),
            Err(CoordinatorError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_releases_do_not_activate() {
        assert!(!CallHoldHandling::ReleaseAllHeld.activates_call());
        assert!(!CallHoldHandling::ReleaseSpecifiedIndex.activates_call());
        assert!(CallHoldHandling::HoldActiveAcceptOther.activates_call());
    }
}
