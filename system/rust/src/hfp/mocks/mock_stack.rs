//! Mocked implementation of the profile transport, the audio codec driver and
//! the vendor codec commands, for use in test

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, unbounded_channel, UnboundedReceiver};

use crate::core::address::RawAddress;
use crate::core::ids::{ConnectionHandle, PortId};
use crate::hfp::call_hold::CallHoldHandling;
use crate::hfp::codec::{CodecId, SampleRate};
use crate::hfp::transport::{
    AudioCodec, HfpTransport, TransportError, TransportResult, VendorCodec,
};

/// Connection handle returned for every peer unless a test overrides it
pub const DEFAULT_CONNECTION_HANDLE: ConnectionHandle = ConnectionHandle(0x0040);

/// Events representing calls to the collaborator traits
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockStackEvent {
    /// HfpTransport#answer_incoming_call invoked
    AnswerIncomingCall(PortId),
    /// HfpTransport#hang_up invoked
    HangUp(PortId),
    /// HfpTransport#send_call_hold_multiparty_selection invoked
    CallHoldMultipartySelection(PortId, CallHoldHandling, u32),
    /// HfpTransport#send_selected_codec invoked
    SelectedCodec(PortId, CodecId),
    /// HfpTransport#send_available_codecs invoked
    AvailableCodecs(PortId, Vec<CodecId>),
    /// HfpTransport#setup_audio_connection invoked
    SetupAudioConnection(PortId),
    /// HfpTransport#release_audio_connection invoked
    ReleaseAudioConnection(PortId),
    /// HfpTransport#connection_handle invoked
    ConnectionHandle(RawAddress),
    /// AudioCodec#enable invoked
    AudioEnable(SampleRate),
    /// AudioCodec#disable invoked
    AudioDisable,
    /// VendorCodec#is_wbs_feature_active invoked
    IsWbsFeatureActive,
    /// VendorCodec#wbs_associate invoked
    WbsAssociate(ConnectionHandle),
    /// VendorCodec#wbs_disassociate invoked
    WbsDisassociate,
}

#[derive(Debug)]
struct MockStackState {
    wbs_feature_active: bool,
    connection_handle: ConnectionHandle,
    failures: HashMap<&'static str, TransportError>,
}

/// Routes calls to all three collaborator traits into a channel of
/// MockStackEvents. Clones share the channel and the failure table, so one
/// instance can be boxed once per trait.
#[derive(Clone, Debug)]
pub struct MockStack {
    tx: mpsc::UnboundedSender<MockStackEvent>,
    state: Arc<Mutex<MockStackState>>,
}

impl MockStack {
    /// Constructor. Returns self and the RX side of the associated channel.
    /// The WBS feature starts active and every call succeeds.
    pub fn new() -> (Self, UnboundedReceiver<MockStackEvent>) {
        let (tx, rx) = unbounded_channel();
        let state = MockStackState {
            wbs_feature_active: true,
            connection_handle: DEFAULT_CONNECTION_HANDLE,
            failures: HashMap::new(),
        };
        (Self { tx, state: Arc::new(Mutex::new(state)) }, rx)
    }

    /// Makes every later call to `op` (the trait method name) fail with `err`.
    /// The call is still reported on the channel.
    pub fn fail(&self, op: &'static str, err: TransportError) {
        self.state().failures.insert(op, err);
    }

    /// Lets every call succeed again
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Value reported by `is_wbs_feature_active`
    pub fn set_wbs_feature_active(&self, active: bool) {
        self.state().wbs_feature_active = active;
    }

    /// Value reported by `connection_handle`
    pub fn set_connection_handle(&self, handle: ConnectionHandle) {
        self.state().connection_handle = handle;
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockStackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: &'static str, event: MockStackEvent) -> TransportResult {
        // the receiver may be gone when a test only checks results
        let _ = self.tx.send(event);
        match self.state().failures.get(op) {
            Some(&err) => Err(err),
            None => Ok(()),
        }
    }
}

impl HfpTransport for MockStack {
    fn answer_incoming_call(&self, port: PortId) -> TransportResult {
        self.record("answer_incoming_call", MockStackEvent::AnswerIncomingCall(port))
    }

    fn hang_up(&self, port: PortId) -> TransportResult {
        self.record("hang_up", MockStackEvent::HangUp(port))
    }

    fn send_call_hold_multiparty_selection(
        &self,
        port: PortId,
        handling: CallHoldHandling,
        index: u32,
    ) -> TransportResult {
        self.record(
            "send_call_hold_multiparty_selection",
            MockStackEvent::CallHoldMultipartySelection(port, handling, index),
        )
    }

    fn send_selected_codec(&self, port: PortId, codec: CodecId) -> TransportResult {
        self.record("send_selected_codec", MockStackEvent::SelectedCodec(port, codec))
    }

    fn send_available_codecs(&self, port: PortId, codecs: &[CodecId]) -> TransportResult {
        self.record("send_available_codecs", MockStackEvent::AvailableCodecs(port, codecs.to_vec()))
    }

    fn setup_audio_connection(&self, port: PortId) -> TransportResult {
        self.record("setup_audio_connection", MockStackEvent::SetupAudioConnection(port))
    }

    fn release_audio_connection(&self, port: PortId) -> TransportResult {
        self.record("release_audio_connection", MockStackEvent::ReleaseAudioConnection(port))
    }

    fn connection_handle(&self, address: &RawAddress) -> TransportResult<ConnectionHandle> {
        self.record("connection_handle", MockStackEvent::ConnectionHandle(*address))?;
        Ok(self.state().connection_handle)
    }
}

impl AudioCodec for MockStack {
    fn enable(&self, rate: SampleRate) -> TransportResult {
        self.record("audio_codec_enable", MockStackEvent::AudioEnable(rate))
    }

    fn disable(&self) -> TransportResult {
        self.record("audio_codec_disable", MockStackEvent::AudioDisable)
    }
}

impl VendorCodec for MockStack {
    fn is_wbs_feature_active(&self) -> TransportResult<bool> {
        self.record("is_wbs_feature_active", MockStackEvent::IsWbsFeatureActive)?;
        Ok(self.state().wbs_feature_active)
    }

    fn wbs_associate(&self, handle: ConnectionHandle) -> TransportResult {
        self.record("wbs_associate", MockStackEvent::WbsAssociate(handle))
    }

    fn wbs_disassociate(&self) -> TransportResult {
        self.record("wbs_disassociate", MockStackEvent::WbsDisassociate)
    }
}
