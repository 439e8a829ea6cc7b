//! Audio Gateway supported features, as reported in +BRSF. See HFP 1.8, Section 4.34.1.

use bitflags::bitflags;

bitflags! {
    /// Features of the connected Audio Gateway
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AgFeatures: u32 {
        /// Three-way calling
        const THREE_WAY_CALLING = 1 << 0;
        /// EC and/or NR function
        const ECNR = 1 << 1;
        /// Voice recognition function
        const VOICE_RECOGNITION = 1 << 2;
        /// In-band ring tone capability
        const IN_BAND_RING = 1 << 3;
        /// Attach a number to a voice tag
        const VOICE_TAG = 1 << 4;
        /// Ability to reject a call
        const REJECT_CALL = 1 << 5;
        /// Enhanced call status
        const ENHANCED_CALL_STATUS = 1 << 6;
        /// Enhanced call control
        const ENHANCED_CALL_CONTROL = 1 << 7;
        /// Extended error result codes
        const EXTENDED_ERROR_CODES = 1 << 8;
        /// Codec negotiation
        const CODEC_NEGOTIATION = 1 << 9;
        /// HF indicators
        const HF_INDICATORS = 1 << 10;
        /// eSCO S4 settings supported
        const ESCO_S4 = 1 << 11;
    }
}
