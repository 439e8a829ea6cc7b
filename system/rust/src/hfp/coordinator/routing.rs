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

//! Codec negotiation and arbitration of the shared audio path.
//!
//! The first slot to claim the audio codec keeps it until its link goes down.
//! A second SCO link coming up meanwhile stays unrouted.

use log::{info, warn};

use super::Coordinator;
use crate::core::ids::{PortId, ScoHandle, SlotIndex};
use crate::hfp::codec::{CodecId, SampleRate};
use crate::hfp::error::{CoordinatorError, CoordinatorResult};

impl Coordinator {
    /// The remote device on `port` proposes a codec. The chosen codec is always
    /// sent back, even when the audio path is left untouched.
    pub fn on_codec_select_request(&mut self, port: PortId, proposed: u8) -> CoordinatorResult {
        let idx = self.slot_for_indication(port)?;
        let mut codec = CodecId::from_proposed(proposed);

        let mut result = Ok(());
        if let Some(owner) = self.state.slots.active_audio_slot() {
            info!("Audio is routed to slot {}, echoing {codec} to port {port}", owner.0);
        } else {
            match self.route_audio(idx, codec) {
                Ok(routed) => codec = routed,
                Err(e) => {
                    codec = CodecId::Cvsd;
                    result = Err(e);
                }
            }
        }

        result.and(Self::check(
            port,
            "send_selected_codec",
            self.transport.send_selected_codec(port, codec),
        ))
    }

    /// A synchronous audio link to `port` came up.
    pub fn on_audio_connected(&mut self, port: PortId, sco_handle: ScoHandle) -> CoordinatorResult {
        let idx = self.slot_for_indication(port)?;
        let slot = self.state.slots.get_mut(idx);
        slot.in_active_sco = true;
        slot.sco_handle = Some(sco_handle);
        let claimed_here = slot.in_active_audio;

        if claimed_here || self.state.slots.get(idx.other()).in_active_audio {
            info!("Audio path already claimed, SCO {sco_handle:?} of port {port} stays unrouted");
            return Ok(());
        }

        let preferred =
            if self.state.slots.get(idx).supports_wbs { CodecId::Msbc } else { CodecId::Cvsd };
        let codec = self.route_audio(idx, preferred)?;
        info!("Audio of port {port} routed to the codec with {codec}");
        Ok(())
    }

    /// The synchronous audio link to `port` went down.
    pub fn on_audio_disconnected(&mut self, port: PortId) -> CoordinatorResult {
        let idx = self.slot_for_indication(port)?;
        let slot = self.state.slots.get_mut(idx);
        slot.in_active_sco = false;
        slot.sco_handle = None;

        if !slot.in_active_audio {
            info!("Unrouted SCO of port {port} disconnected");
            return Ok(());
        }
        slot.in_active_audio = false;

        let mut result = self.disable_audio_path(port);
        if self.state.wbs_owner == Some(port) {
            result = result.and(self.release_wbs_ownership(port));
        }
        info!("Audio path released by port {port}");
        result
    }

    /// Routes the shared codec to `idx`, trying wideband first when `preferred`
    /// asks for it. Returns the codec actually in use.
    pub(super) fn route_audio(
        &mut self,
        idx: SlotIndex,
        preferred: CodecId,
    ) -> CoordinatorResult<CodecId> {
        if preferred == CodecId::Msbc {
            if !self.config.wbs_enabled {
                info!("WBS disabled by configuration, using CVSD");
            } else {
                match self.route_wbs(idx) {
                    Ok(()) => return Ok(CodecId::Msbc),
                    Err(e) => {
                        warn!("WBS routing for slot {} failed ({e}), falling back to CVSD", idx.0);
                        let slot = self.state.slots.get_mut(idx);
                        slot.supports_wbs = false;
                        slot.in_active_audio = false;
                    }
                }
            }
        }

        self.route_cvsd(idx)?;
        Ok(CodecId::Cvsd)
    }

    fn route_wbs(&mut self, idx: SlotIndex) -> CoordinatorResult {
        let port = self.port_of(idx)?;
        if let Some(owner) = self.state.wbs_owner.filter(|&owner| owner != port) {
            return Err(CoordinatorError::ResourceConflict(format!(
                "WBS stream already owned by port {owner}"
            )));
        }

        let address = self.state.slots.get(idx).remote_address;
        let handle =
            Self::check(port, "connection_handle", self.transport.connection_handle(&address))?;
        if !Self::check(port, "is_wbs_feature_active", self.vendor.is_wbs_feature_active())? {
            return Err(CoordinatorError::ResourceConflict(
                "WBS feature is not active on the controller".to_string(),
            ));
        }

        self.state.slots.get_mut(idx).supports_wbs = true;
        self.enable_audio_path(port, CodecId::Msbc.sample_rate())?;
        self.state.slots.get_mut(idx).in_active_audio = true;

        Self::check(port, "wbs_associate", self.vendor.wbs_associate(handle))?;
        self.state.wbs_owner = Some(port);
        info!("Port {port} owns the WBS stream on connection {handle:?}");

        self.broadcast_codecs(port);
        Ok(())
    }

    fn route_cvsd(&mut self, idx: SlotIndex) -> CoordinatorResult {
        let port = self.port_of(idx)?;
        if self.state.sample_rate == Some(SampleRate::Wideband) {
            if let Err(e) = self.vendor.wbs_disassociate() {
                warn!("wbs_disassociate before CVSD routing on port {port} failed: {e}");
            }
        }

        self.enable_audio_path(port, CodecId::Cvsd.sample_rate())?;
        let slot = self.state.slots.get_mut(idx);
        slot.in_active_audio = true;
        slot.supports_wbs = false;

        if self.state.wbs_owner == Some(port) {
            info!("Port {port} gives up the WBS stream");
            self.state.wbs_owner = None;
        }
        Ok(())
    }

    fn enable_audio_path(&mut self, port: PortId, rate: SampleRate) -> CoordinatorResult {
        Self::check(port, "audio_codec_enable", self.audio.enable(rate))?;
        self.state.sample_rate = Some(rate);
        info!("Audio codec enabled at {} Hz for port {port}", rate.hz());
        Ok(())
    }

    pub(super) fn disable_audio_path(&mut self, port: PortId) -> CoordinatorResult {
        self.state.sample_rate = None;
        Self::check(port, "audio_codec_disable", self.audio.disable())
    }

    /// Frees the WBS stream held by `port` and tells the other phones mSBC is
    /// available again.
    pub(super) fn release_wbs_ownership(&mut self, port: PortId) -> CoordinatorResult {
        self.state.wbs_owner = None;
        let result = Self::check(port, "wbs_disassociate", self.vendor.wbs_disassociate());
        self.broadcast_codecs(port);
        info!("WBS stream released by port {port}");
        result
    }

    /// Sends the codecs currently available to every connected phone but `except`.
    /// Failures only affect the notified phone and are not reported.
    fn broadcast_codecs(&self, except: PortId) {
        let codecs = self.config.codecs(self.state.wbs_owner.is_none());
        let ports = self
            .state
            .slots
            .connected()
            .filter_map(|(_, slot)| slot.port_id)
            .filter(|&port| port != except);

        for port in ports {
            if let Err(e) = self.transport.send_available_codecs(port, &codecs) {
                warn!("send_available_codecs on port {port} failed: {e}");
            }
        }
    }
}
