//! Tunables of the coordinator

use crate::hfp::codec::CodecId;

/// Coordinator behaviour switches. `Default` matches the Hands-Free demo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Accept mSBC codec proposals and route wideband audio when the controller allows it
    pub wbs_enabled: bool,
    /// Answer a waiting call automatically once the last answered call has ended
    pub auto_answer_waiting_call: bool,
    /// Release the audio link when the remote ends a call we asked to put on hold
    pub release_audio_on_hold_end: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { wbs_enabled: true, auto_answer_waiting_call: true, release_audio_on_hold_end: true }
    }
}

impl CoordinatorConfig {
    /// Codecs we are able to offer right now
    pub(crate) fn codecs(&self, wbs_free: bool) -> Vec<CodecId> {
        if self.wbs_enabled && wbs_free {
            CodecId::ALL.to_vec()
        } else {
            vec![CodecId::Cvsd]
        }
    }
}
