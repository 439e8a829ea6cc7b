//! Codec identifiers exchanged during codec negotiation. See HFP 1.8, Appendix B.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::cast::FromPrimitive;
use std::fmt::{Display, Formatter, Result};

/// Codec ids we know how to route. Anything else the peer proposes is treated as CVSD.
#[derive(Clone, Copy, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodecId {
    /// Narrowband speech
    Cvsd = 0x01,
    /// Wideband speech (mSBC)
    Msbc = 0x02,
}

impl CodecId {
    /// Every codec the Hands-Free unit can offer
    pub const ALL: [CodecId; 2] = [CodecId::Cvsd, CodecId::Msbc];

    /// Normalizes a codec id proposed by the remote device.
    pub fn from_proposed(id: u8) -> CodecId {
        CodecId::from_u8(id).unwrap_or(CodecId::Cvsd)
    }

    /// Sampling rate the shared audio codec must run at for this codec
    pub fn sample_rate(self) -> SampleRate {
        match self {
            CodecId::Cvsd => SampleRate::Narrowband,
            CodecId::Msbc => SampleRate::Wideband,
        }
    }
}

impl From<CodecId> for u8 {
    fn from(id: CodecId) -> u8 {
        id as u8
    }
}

impl Display for CodecId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CodecId::Cvsd => write!(f, "CVSD"),
            CodecId::Msbc => write!(f, "mSBC"),
        }
    }
}

/// Sampling frequency of the shared audio path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleRate {
    /// 8 kHz, CVSD
    Narrowband,
    /// 16 kHz, WBS
    Wideband,
}

impl SampleRate {
    /// Frequency in Hz
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Narrowband => 8000,
            SampleRate::Wideband => 16000,
        }
    }
}
