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

//! Call hold and multiparty operations, within one phone and across two.
//!
//! None of these wait for the remote to confirm a step: confirmations arrive
//! later as indications, through the same serialized path.

use log::{info, warn};

use super::Coordinator;
use crate::core::ids::{PortId, SlotIndex};
use crate::hfp::call_hold::CallHoldHandling;
use crate::hfp::error::{CoordinatorError, CoordinatorResult};

impl Coordinator {
    /// Puts the active call of `port` (or of the only candidate slot) on hold.
    pub fn place_call_on_hold(&mut self, port: Option<PortId>) -> CoordinatorResult {
        let (idx, port) = self.resolve_slot(port)?;
        let slot = self.state.slots.get(idx);
        if !slot.in_active_call && !slot.call_on_hold {
            return Err(CoordinatorError::InvalidParameters(format!(
                "No active or held call on port {port}"
            )));
        }
        self.require_three_way_calling(idx, port)?;

        self.send_chld(port, CallHoldHandling::HoldActiveAcceptOther, 0)?;
        self.state.slots.get_mut(idx).hold_requested = true;
        self.check_hold_outcome(idx)
    }

    /// Sends any call hold handling to a single phone.
    pub fn holding_multiparty_call(
        &mut self,
        port: Option<PortId>,
        handling: CallHoldHandling,
        index: u32,
    ) -> CoordinatorResult {
        let (idx, port) = self.resolve_slot(port)?;
        self.require_three_way_calling(idx, port)?;
        self.send_chld(port, handling, index)
    }

    /// Sends a call hold handling when up to two phones are connected. With two
    /// phones the port must be named, and a handling that would bring up a voice
    /// next to the other phone's is refused.
    pub fn holding_multi_phones_call(
        &mut self,
        port: Option<PortId>,
        handling: CallHoldHandling,
        index: u32,
    ) -> CoordinatorResult {
        if self.state.connections < 2 {
            return self.holding_multiparty_call(port, handling, index);
        }

        let Some(port) = port else {
            return Err(CoordinatorError::InvalidParameters(
                "Two phones are connected, a port is required".to_string(),
            ));
        };
        let idx = self.connected_slot(port)?;

        if handling.activates_call() {
            if let Some(reason) = self.parallel_voice_conflict(idx) {
                warn!("Refusing {handling:?} on port {port}: {reason}");
                return Err(CoordinatorError::ResourceConflict(reason));
            }
        }

        self.require_three_way_calling(idx, port)?;
        self.send_chld(port, handling, index)
    }

    /// Moves the audio from the phone that has it to the other one. Each phone
    /// must have exactly one call.
    pub fn switch_audio_between_two_active_calls(&mut self) -> CoordinatorResult {
        if self.state.connections < 2 {
            return Err(CoordinatorError::ResourceConflict(
                "Switching audio needs two connected phones".to_string(),
            ));
        }

        for (_, slot) in self.state.slots.connected() {
            if !slot.has_single_call() {
                return Err(CoordinatorError::ResourceConflict(format!(
                    "Port {} must have exactly one ongoing call",
                    slot.port_id.map_or(0, |p| p.0)
                )));
            }
        }

        let Some(from) = self.state.slots.active_audio_slot() else {
            return Err(CoordinatorError::ResourceConflict(
                "No phone owns the audio".to_string(),
            ));
        };
        let to = from.other();
        let (from_port, to_port) = (self.port_of(from)?, self.port_of(to)?);
        info!("Switching audio from port {from_port} to port {to_port}");

        self.hold_tolerated(from_port);
        let mut result = Self::check(
            from_port,
            "release_audio_connection",
            self.transport.release_audio_connection(from_port),
        );

        let target = self.state.slots.get(to);
        let (target_has_sco, target_held) = (target.in_active_sco, target.call_on_hold);
        if target_has_sco {
            result = result.and(Self::check(
                to_port,
                "release_audio_connection",
                self.transport.release_audio_connection(to_port),
            ));
        }
        if target_held {
            result = result.and(self.send_chld(to_port, CallHoldHandling::HoldActiveAcceptOther, 0));
        }

        result.and(Self::check(
            to_port,
            "setup_audio_connection",
            self.transport.setup_audio_connection(to_port),
        ))
    }

    /// Answers the call waiting on one phone while the other has an active call,
    /// and moves the audio to the answered call.
    pub fn answer_waiting_call_and_switch_audio(&mut self) -> CoordinatorResult {
        let (waiting, active) = self.waiting_and_active_slots()?;
        let (waiting_port, active_port) = (self.port_of(waiting)?, self.port_of(active)?);
        info!("Answering the waiting call on port {waiting_port}, holding port {active_port}");

        self.hold_tolerated(active_port);

        let mut result = Ok(());
        if self.state.slots.get(active).in_active_sco {
            result = Self::check(
                active_port,
                "release_audio_connection",
                self.transport.release_audio_connection(active_port),
            );
        }
        if self.state.slots.get(waiting).in_active_sco {
            result = result.and(Self::check(
                waiting_port,
                "release_audio_connection",
                self.transport.release_audio_connection(waiting_port),
            ));
        }

        result = result.and(Self::check(
            waiting_port,
            "answer_incoming_call",
            self.transport.answer_incoming_call(waiting_port),
        ));
        result.and(Self::check(
            waiting_port,
            "setup_audio_connection",
            self.transport.setup_audio_connection(waiting_port),
        ))
    }

    /// Exactly one slot has a call being set up while the other has an active call.
    fn waiting_and_active_slots(&self) -> CoordinatorResult<(SlotIndex, SlotIndex)> {
        let mut waiting =
            self.state.slots.connected().filter(|(_, slot)| slot.call_setup_in_progress);

        match (waiting.next(), waiting.next()) {
            (Some((idx, _)), None) => {
                let other = self.state.slots.get(idx.other());
                if other.connected && other.in_active_call {
                    Ok((idx, idx.other()))
                } else {
                    Err(CoordinatorError::InvalidParameters(
                        "The other phone has no active call".to_string(),
                    ))
                }
            }
            _ => Err(CoordinatorError::InvalidParameters(
                "Exactly one phone must have a waiting call".to_string(),
            )),
        }
    }

    /// Why bringing up a call on `idx` would make two voices run in parallel, if it would.
    ///
    /// The other phone keeps priority when it owns the wideband stream and is
    /// using it for a call, since the controller carries one WBS stream only.
    /// Two phones each juggling an active call next to a waiting or held one
    /// cannot be arbitrated either.
    fn parallel_voice_conflict(&self, idx: SlotIndex) -> Option<String> {
        let target = self.state.slots.get(idx);
        let other = self.state.slots.get(idx.other());
        if !other.connected {
            return None;
        }

        let other_owns_wbs = other.port_id.is_some() && self.state.wbs_owner == other.port_id;
        if other_owns_wbs && other.in_active_audio && !other.is_idle() {
            return Some(
                "Two voices working in parallel, the other phone owns the wideband audio"
                    .to_string(),
            );
        }
        if target.is_juggling_calls() && other.is_juggling_calls() {
            return Some(
                "Two voices working in parallel, both phones have a second call pending"
                    .to_string(),
            );
        }
        None
    }

    fn require_three_way_calling(&self, idx: SlotIndex, port: PortId) -> CoordinatorResult {
        if self.state.slots.get(idx).lacks_three_way_calling() {
            return Err(CoordinatorError::InvalidParameters(format!(
                "Phone on port {port} does not support three-way calling"
            )));
        }
        Ok(())
    }

    /// Some phones refuse to hold a lone call; that does not stop a switch.
    fn hold_tolerated(&self, port: PortId) {
        let handling = CallHoldHandling::HoldActiveAcceptOther;
        if let Err(e) = self.transport.send_call_hold_multiparty_selection(port, handling, 0) {
            warn!("Port {port} refused to hold its call ({e}), continuing");
        }
    }

    fn send_chld(&self, port: PortId, handling: CallHoldHandling, index: u32) -> CoordinatorResult {
        info!("Sending {handling:?} (index {index}) to port {port}");
        Self::check(
            port,
            "send_call_hold_multiparty_selection",
            self.transport.send_call_hold_multiparty_selection(port, handling, index),
        )
    }
}
