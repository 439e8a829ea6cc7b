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

use log::info;

use super::Coordinator;
use crate::core::ids::{PortId, SlotIndex};
use crate::hfp::error::{CoordinatorError, CoordinatorResult};
use crate::hfp::indication::CallIndicator;

/// (in_active_call, call_on_hold) for a "callheld" value
fn held_state(value: u32) -> Option<(bool, bool)> {
    match value {
        0 => Some((true, false)),
        1 => Some((true, true)),
        2 => Some((false, true)),
        _ => None,
    }
}

impl Coordinator {
    /// A call status indicator of the remote device on `port` changed.
    pub fn on_call_indicator(&mut self, port: PortId, indicator: CallIndicator) -> CoordinatorResult {
        let idx = self.slot_for_indication(port)?;
        let slot = self.state.slots.get_mut(idx);

        match indicator {
            CallIndicator::Call(true) => slot.in_active_call = true,
            CallIndicator::Call(false) => {
                slot.in_active_call = false;
                slot.call_on_hold = false;
            }
            CallIndicator::CallSetup(value) => slot.call_setup_in_progress = value != 0,
            CallIndicator::CallHeld(value) => {
                let Some((active, held)) = held_state(value) else {
                    return Err(CoordinatorError::InvalidParameters(format!(
                        "Invalid callheld value {value} on port {port}"
                    )));
                };
                slot.in_active_call = active;
                slot.call_on_hold = held;
            }
        }
        info!(
            "Port {port} {indicator:?}: active={} held={} setup={}",
            slot.in_active_call, slot.call_on_hold, slot.call_setup_in_progress
        );

        let mut result = Ok(());
        if indicator == CallIndicator::Call(false) {
            result = self.answer_waiting_call(idx, port);
        }
        result.and(self.check_hold_outcome(idx))
    }

    /// Once no answered call is left anywhere, a call still waiting on this slot
    /// would be dropped silently; answer it instead.
    fn answer_waiting_call(&mut self, idx: SlotIndex, port: PortId) -> CoordinatorResult {
        if !self.config.auto_answer_waiting_call
            || !self.state.slots.get(idx).call_setup_in_progress
            || self.state.slots.count_answered_calls() != 0
        {
            return Ok(());
        }

        info!("Last call ended, answering the waiting call on port {port}");
        Self::check(port, "answer_incoming_call", self.transport.answer_incoming_call(port))
    }

    /// Resolves a pending hold request on `idx`. A hold shows up as a held call;
    /// when the call disappears altogether the remote ended it and the audio
    /// link left behind is released.
    pub(super) fn check_hold_outcome(&mut self, idx: SlotIndex) -> CoordinatorResult {
        let slot = self.state.slots.get_mut(idx);
        if !slot.hold_requested {
            return Ok(());
        }

        if slot.call_on_hold {
            slot.hold_requested = false;
            return Ok(());
        }
        if !slot.is_idle() {
            return Ok(());
        }
        slot.hold_requested = false;
        if !slot.in_active_sco || !self.config.release_audio_on_hold_end {
            return Ok(());
        }

        let port = self.port_of(idx)?;
        info!("Call on port {port} ended while being held, releasing its audio");
        Self::check(port, "release_audio_connection", self.transport.release_audio_connection(port))
    }
}
