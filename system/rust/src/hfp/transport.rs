//! Interfaces to the collaborators the coordinator drives: the Hands-Free profile
//! transport, the audio codec driver and the vendor wideband speech commands.
//!
//! None of these calls may block waiting for an indication; indications are
//! delivered serially through the same path and would never arrive. All of them
//! are `Send` so the coordinator can be moved onto its event loop thread.

use thiserror::Error;

use crate::core::address::RawAddress;
use crate::core::ids::{ConnectionHandle, PortId};
use crate::hfp::call_hold::CallHoldHandling;
use crate::hfp::codec::{CodecId, SampleRate};

/// Failure reported by a collaborator
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The Bluetooth stack has not been brought up
    #[error("Bluetooth stack not initialized")]
    NotInitialized,
    /// The connection handle does not refer to a live connection
    #[error("Invalid connection handle")]
    InvalidHandle,
    /// The call was rejected with a negative status
    #[error("Rejected with status {0}")]
    Rejected(i32),
}

/// Result of a collaborator call
pub type TransportResult<T = ()> = Result<T, TransportError>;

/// Commands sent to the remote Audio Gateway through the Hands-Free profile
pub trait HfpTransport: Send {
    /// Answer the incoming (or waiting) call
    fn answer_incoming_call(&self, port: PortId) -> TransportResult;

    /// Terminate the active call, or reject the incoming one
    fn hang_up(&self, port: PortId) -> TransportResult;

    /// Send a call hold / multiparty selection. `index` only matters for the
    /// handling types that address a specific call.
    fn send_call_hold_multiparty_selection(
        &self,
        port: PortId,
        handling: CallHoldHandling,
        index: u32,
    ) -> TransportResult;

    /// Reply to a codec selection request with the codec actually used
    fn send_selected_codec(&self, port: PortId, codec: CodecId) -> TransportResult;

    /// Advertise the codecs currently available to the remote device
    fn send_available_codecs(&self, port: PortId, codecs: &[CodecId]) -> TransportResult;

    /// Ask for a synchronous audio link
    fn setup_audio_connection(&self, port: PortId) -> TransportResult;

    /// Tear down the synchronous audio link
    fn release_audio_connection(&self, port: PortId) -> TransportResult;

    /// Look up the ACL connection handle to a peer
    fn connection_handle(&self, address: &RawAddress) -> TransportResult<ConnectionHandle>;
}

/// The shared physical audio path. Only one slot may have it enabled.
pub trait AudioCodec: Send {
    /// Start the codec at the given sampling frequency
    fn enable(&self, rate: SampleRate) -> TransportResult;

    /// Stop the codec
    fn disable(&self) -> TransportResult;
}

/// Controller-specific wideband speech association. The controller supports a
/// single WBS stream.
pub trait VendorCodec: Send {
    /// Whether the controller's WBS feature is active
    fn is_wbs_feature_active(&self) -> TransportResult<bool>;

    /// Bind the WBS stream to a connection
    fn wbs_associate(&self, handle: ConnectionHandle) -> TransportResult;

    /// Release the WBS stream
    fn wbs_disassociate(&self) -> TransportResult;
}
