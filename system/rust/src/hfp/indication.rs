//! Indications delivered by the profile transport

use crate::core::address::RawAddress;
use crate::core::ids::{PortId, ScoHandle};
use crate::hfp::error::CoordinatorError;
use crate::hfp::features::AgFeatures;

/// A status indicator update from the remote device (+CIEV)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallIndicator {
    /// "call": whether at least one call is active
    Call(bool),
    /// "callsetup": 0 when no call is being set up
    CallSetup(u32),
    /// "callheld": 0 none held, 1 active and held, 2 held only
    CallHeld(u32),
}

impl CallIndicator {
    /// Builds an indicator from its name as reported by the transport
    pub fn parse(name: &str, value: u32) -> Result<CallIndicator, CoordinatorError> {
        match name {
            "CALL" => Ok(CallIndicator::Call(value != 0)),
            "CALLSETUP" => Ok(CallIndicator::CallSetup(value)),
            "CALLHELD" => Ok(CallIndicator::CallHeld(value)),
            _ => Err(CoordinatorError::InvalidParameters(format!("Unknown indicator {}", name))),
        }
    }
}

/// Everything the transport can tell the coordinator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Indication {
    /// A remote device connected to a server port
    PortOpen {
        /// Server port
        port: PortId,
        /// Remote device
        address: RawAddress,
    },
    /// The service level connection is up and the remote's features are known
    ServiceLevelOpen {
        /// Server port
        port: PortId,
        /// Features of the Audio Gateway
        features: AgFeatures,
    },
    /// The remote device disconnected
    PortClose {
        /// Server port
        port: PortId,
        /// Close reason reported by the stack
        status: u32,
    },
    /// A call status indicator changed
    CallIndicator {
        /// Server port
        port: PortId,
        /// New indicator value
        indicator: CallIndicator,
    },
    /// The remote device asks which codec to use
    CodecSelectRequest {
        /// Server port
        port: PortId,
        /// Proposed codec id, unnormalized
        codec: u8,
    },
    /// A synchronous audio link came up
    AudioConnected {
        /// Server port
        port: PortId,
        /// Handle of the SCO/eSCO link
        sco_handle: ScoHandle,
    },
    /// The synchronous audio link went down
    AudioDisconnected {
        /// Server port
        port: PortId,
    },
}

impl Indication {
    /// Port the indication refers to
    pub fn port(&self) -> PortId {
        match *self {
            Indication::PortOpen { port, .. }
            | Indication::ServiceLevelOpen { port, .. }
            | Indication::PortClose { port, .. }
            | Indication::CallIndicator { port, .. }
            | Indication::CodecSelectRequest { port, .. }
            | Indication::AudioConnected { port, .. }
            | Indication::AudioDisconnected { port } => port,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_indicator_names() {
        assert_eq!(CallIndicator::parse("CALL", 1), Ok(CallIndicator::Call(true)));
        assert_eq!(CallIndicator::parse("CALL", 0), Ok(CallIndicator::Call(false)));
        assert_eq!(CallIndicator::parse("CALLSETUP", 2), Ok(CallIndicator::CallSetup(2)));
        assert_eq!(CallIndicator::parse("CALLHELD", 1), Ok(CallIndicator::CallHeld(1)));
    }

    #[test]
    fn test_parse_unknown_indicator_fails() {
        assert!(CallIndicator::parse("SIGNAL", 3).is_err());
        assert!(CallIndicator::parse("call", 1).is_err());
    }
}
