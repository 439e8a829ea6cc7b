// Copyright 2024, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The dual-slot coordinator: owns the slot table and the process-wide WBS owner,
//! consumes transport indications and user commands.
//!
//! Multi-step command sequences are not transactional. Each step is checked, the
//! first failure is returned, and the remaining independent steps still run:
//! once the remote has accepted a command there is nothing to roll back.

mod call_state;
mod multiparty;
mod routing;


use log::{debug, error, info, warn};

use crate::core::address::RawAddress;
use crate::core::ids::{PortId, SlotIndex};
use crate::hfp::codec::SampleRate;
use crate::hfp::config::CoordinatorConfig;
use crate::hfp::error::{CoordinatorError, CoordinatorResult};
use crate::hfp::features::AgFeatures;
use crate::hfp::indication::Indication;
use crate::hfp::slot::{ConnectionSlot, SlotTable};
use crate::hfp::transport::{AudioCodec, HfpTransport, TransportResult, VendorCodec};

/// Everything the coordinator mutates. Owned by the coordinator, never global.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoordinatorState {
    /// The two connection slots
    pub slots: SlotTable,
    /// Port of the slot bound to the controller's single WBS stream
    pub wbs_owner: Option<PortId>,
    /// Number of connected Audio Gateways
    pub connections: usize,
    /// Rate the shared codec is enabled at, None while disabled
    pub sample_rate: Option<SampleRate>,
}

/// Call-state and audio-routing coordinator for up to two Audio Gateways.
///
/// Not thread safe by itself: every entry point has to be serialized, which the
/// [`crate::CoordinatorHandle`] event loop does.
pub struct Coordinator {
    config: CoordinatorConfig,
    transport: Box<dyn HfpTransport>,
    audio: Box<dyn AudioCodec>,
    vendor: Box<dyn VendorCodec>,
    state: CoordinatorState,
}

impl Coordinator {
    /// Constructor
    pub fn new(
        config: CoordinatorConfig,
        transport: Box<dyn HfpTransport>,
        audio: Box<dyn AudioCodec>,
        vendor: Box<dyn VendorCodec>,
    ) -> Self {
        Self { config, transport, audio, vendor, state: CoordinatorState::default() }
    }

    /// Current state, for display and inspection
    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Active configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The slot serving `port`, if any
    pub fn slot(&self, port: PortId) -> Option<&ConnectionSlot> {
        self.state.slots.find_slot_by_port_id(port).map(|idx| self.state.slots.get(idx))
    }

    /// Port currently bound to the WBS stream
    pub fn wbs_owner(&self) -> Option<PortId> {
        self.state.wbs_owner
    }

    /// Number of connected Audio Gateways
    pub fn number_of_current_connections(&self) -> usize {
        self.state.connections
    }

    /// Dispatches an indication from the profile transport.
    pub fn handle_indication(&mut self, indication: Indication) -> CoordinatorResult {
        debug!("Handling {:?}", indication);
        match indication {
            Indication::PortOpen { port, address } => self.on_port_open(port, address),
            Indication::ServiceLevelOpen { port, features } => {
                self.on_service_level_connection_open(port, features)
            }
            Indication::PortClose { port, status } => self.on_port_close(port, status),
            Indication::CallIndicator { port, indicator } => {
                self.on_call_indicator(port, indicator)
            }
            Indication::CodecSelectRequest { port, codec } => {
                self.on_codec_select_request(port, codec)
            }
            Indication::AudioConnected { port, sco_handle } => {
                self.on_audio_connected(port, sco_handle)
            }
            Indication::AudioDisconnected { port } => self.on_audio_disconnected(port),
        }
    }

    /// A remote device connected to `port`.
    pub fn on_port_open(&mut self, port: PortId, address: RawAddress) -> CoordinatorResult {
        let slots = &mut self.state.slots;
        let Some(idx) = slots.find_slot_by_port_id(port).or_else(|| slots.allocate_slot()) else {
            warn!("No free slot for port {port} ({address}), both connections in use");
            return Err(CoordinatorError::ResourceConflict(
                "Maximum number of connections reached".to_string(),
            ));
        };

        let slot = slots.get_mut(idx);
        if slot.connected && slot.port_id == Some(port) {
            warn!("Port {port} opened twice, now connected to {address}");
            slot.remote_address = address;
            return Ok(());
        }

        if slot.port_id != Some(port) {
            *slot = ConnectionSlot { port_id: Some(port), ..Default::default() };
        }
        slot.connected = true;
        slot.remote_address = address;
        self.state.connections += 1;

        info!(
            "Port {port} open to {address} in slot {}, {} connection(s)",
            idx.0, self.state.connections
        );
        Ok(())
    }

    /// The service level connection on `port` is established.
    pub fn on_service_level_connection_open(
        &mut self,
        port: PortId,
        features: AgFeatures,
    ) -> CoordinatorResult {
        let idx = self.slot_for_indication(port)?;
        let slot = self.state.slots.get_mut(idx);
        slot.remote_supported_features = features;
        slot.remote_supported_features_valid = true;

        info!("Service level connection on port {port}, remote features {features:?}");
        Ok(())
    }

    /// The remote device on `port` disconnected.
    pub fn on_port_close(&mut self, port: PortId, status: u32) -> CoordinatorResult {
        let idx = self.slot_for_port(port)?;
        info!("Port {port} closed with status {status}");

        let mut result = Ok(());
        if self.state.slots.get(idx).in_active_audio {
            result = self.disable_audio_path(port);
        }
        if self.state.wbs_owner == Some(port) {
            result = result.and(self.release_wbs_ownership(port));
        }

        let slot = self.state.slots.get_mut(idx);
        if slot.connected {
            self.state.connections = self.state.connections.saturating_sub(1);
        }
        slot.reset();

        result
    }

    /// Answers the incoming call on `port`, or on the only candidate slot.
    pub fn answer_incoming_call(&mut self, port: Option<PortId>) -> CoordinatorResult {
        let (_, port) = self.resolve_slot(port)?;
        Self::check(port, "answer_incoming_call", self.transport.answer_incoming_call(port))
    }

    /// Hangs up or rejects the call on `port`, or on the only candidate slot.
    pub fn hang_up(&mut self, port: Option<PortId>) -> CoordinatorResult {
        let (_, port) = self.resolve_slot(port)?;
        Self::check(port, "hang_up", self.transport.hang_up(port))
    }

    /// Requests an audio link on `port`, or on the only candidate slot.
    pub fn setup_audio_connection(&mut self, port: Option<PortId>) -> CoordinatorResult {
        let (_, port) = self.resolve_slot(port)?;
        Self::check(port, "setup_audio_connection", self.transport.setup_audio_connection(port))
    }

    /// Releases the audio link on `port`, or on the only candidate slot.
    pub fn release_audio_connection(&mut self, port: Option<PortId>) -> CoordinatorResult {
        let (_, port) = self.resolve_slot(port)?;
        Self::check(port, "release_audio_connection", self.transport.release_audio_connection(port))
    }

    /// Picks the slot a user command applies to. An explicit port wins; without
    /// one, a single connection is used as is, otherwise the slot must be the
    /// only one with a held or incoming call.
    fn resolve_slot(&self, port: Option<PortId>) -> CoordinatorResult<(SlotIndex, PortId)> {
        match port {
            Some(port) => Ok((self.connected_slot(port)?, port)),
            None if self.state.connections == 1 => {
                let idx = self.state.slots.connected().map(|(idx, _)| idx).next().ok_or_else(
                    || CoordinatorError::InvalidParameters("No connected phone".to_string()),
                )?;
                Ok((idx, self.port_of(idx)?))
            }
            None => {
                let idx = self.state.slots.find_active_or_held_slot()?;
                Ok((idx, self.port_of(idx)?))
            }
        }
    }

    /// Slot of a connected port named by the user
    fn connected_slot(&self, port: PortId) -> CoordinatorResult<SlotIndex> {
        match self.state.slots.find_slot_by_port_id(port) {
            Some(idx) if self.state.slots.get(idx).connected => Ok(idx),
            _ => Err(CoordinatorError::InvalidParameters(format!("Port {port} is not connected"))),
        }
    }

    /// Slot of a port named by the transport, closed or not
    fn slot_for_port(&self, port: PortId) -> CoordinatorResult<SlotIndex> {
        self.state.slots.find_slot_by_port_id(port).ok_or_else(|| {
            warn!("Indication for unknown port {port}");
            CoordinatorError::InvalidParameters(format!("Unknown port {port}"))
        })
    }

    /// Slot of a connected port named by the transport. A closed slot keeps its
    /// port id but must stay zeroed until the port opens again.
    fn slot_for_indication(&self, port: PortId) -> CoordinatorResult<SlotIndex> {
        let idx = self.slot_for_port(port)?;
        if !self.state.slots.get(idx).connected {
            warn!("Indication for closed port {port}");
            return Err(CoordinatorError::InvalidParameters(format!("Port {port} is closed")));
        }
        Ok(idx)
    }

    fn port_of(&self, idx: SlotIndex) -> CoordinatorResult<PortId> {
        self.state.slots.get(idx).port_id.ok_or_else(|| {
            CoordinatorError::InvalidParameters(format!("Slot {idx} is not in use"))
        })
    }

    /// Logs and converts a failed collaborator call.
    fn check<T>(port: PortId, op: &'static str, result: TransportResult<T>) -> CoordinatorResult<T> {
        result.map_err(|e| {
            error!("{op} on port {port} failed: {e}");
            CoordinatorError::from_transport(op, e)
        })
    }
}
