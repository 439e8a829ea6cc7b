//! Fixed-capacity table of Hands-Free connection slots

use log::warn;

use crate::core::address::RawAddress;
use crate::core::ids::{PortId, ScoHandle, SlotIndex};
use crate::hfp::error::{CoordinatorError, CoordinatorResult};
use crate::hfp::features::AgFeatures;

/// Maximum number of simultaneously connected Audio Gateways
pub const MAX_CONNECTIONS: usize = 2;

/// State of one Hands-Free server connection.
///
/// A slot whose `port_id` is `None` is unused and every other field is zeroed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionSlot {
    /// Server port, assigned when the transport opens the port
    pub port_id: Option<PortId>,
    /// mSBC was negotiated for this connection
    pub supports_wbs: bool,
    /// A remote device is connected
    pub connected: bool,
    /// A call is being set up (incoming, outgoing or waiting)
    pub call_setup_in_progress: bool,
    /// A call is active
    pub in_active_call: bool,
    /// A call is on hold
    pub call_on_hold: bool,
    /// A synchronous audio link exists, whether or not it is routed to the codec
    pub in_active_sco: bool,
    /// This slot owns the shared audio codec
    pub in_active_audio: bool,
    /// `remote_supported_features` was reported
    pub remote_supported_features_valid: bool,
    /// Features of the connected Audio Gateway
    pub remote_supported_features: AgFeatures,
    /// Connected Audio Gateway
    pub remote_address: RawAddress,
    /// Handle of the synchronous link while `in_active_sco`
    pub sco_handle: Option<ScoHandle>,
    /// A hold was accepted by the remote and its outcome is not observed yet
    pub hold_requested: bool,
}

impl ConnectionSlot {
    /// Zeroes everything but the port, which the transport keeps using.
    pub fn reset(&mut self) {
        *self = ConnectionSlot { port_id: self.port_id, ..Default::default() };
    }

    /// Number of calls the user has answered on this connection (0, 1 or 2)
    pub fn answered_calls(&self) -> usize {
        self.in_active_call as usize + self.call_on_hold as usize
    }

    /// Neither a call nor a call setup is left on this connection
    pub fn is_idle(&self) -> bool {
        !self.in_active_call && !self.call_on_hold && !self.call_setup_in_progress
    }

    /// Exactly one ongoing call, either active or held
    pub fn has_single_call(&self) -> bool {
        self.in_active_call != self.call_on_hold
    }

    /// An active call with a second one waiting or held next to it
    pub fn is_juggling_calls(&self) -> bool {
        self.in_active_call && (self.call_setup_in_progress || self.call_on_hold)
    }

    /// The remote rejects three-way calling commands
    pub fn lacks_three_way_calling(&self) -> bool {
        self.remote_supported_features_valid
            && !self.remote_supported_features.contains(AgFeatures::THREE_WAY_CALLING)
    }
}

/// The two connection slots. Never grows or shrinks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: [ConnectionSlot; MAX_CONNECTIONS],
}

impl SlotTable {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot at `idx`
    pub fn get(&self, idx: SlotIndex) -> &ConnectionSlot {
        &self.slots[idx.0]
    }

    /// Mutable slot at `idx`
    pub fn get_mut(&mut self, idx: SlotIndex) -> &mut ConnectionSlot {
        &mut self.slots[idx.0]
    }

    /// All slots with their index
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &ConnectionSlot)> {
        self.slots.iter().enumerate().map(|(i, slot)| (SlotIndex(i), slot))
    }

    /// Connected slots with their index
    pub fn connected(&self) -> impl Iterator<Item = (SlotIndex, &ConnectionSlot)> {
        self.iter().filter(|(_, slot)| slot.connected)
    }

    /// Translates a transport port into a slot
    pub fn find_slot_by_port_id(&self, port: PortId) -> Option<SlotIndex> {
        self.iter().find(|(_, slot)| slot.port_id == Some(port)).map(|(idx, _)| idx)
    }

    /// Picks a slot for a newly opened port: an unused one first, then one whose
    /// port was retained after a close. None when both slots are connected.
    pub fn allocate_slot(&self) -> Option<SlotIndex> {
        self.iter()
            .find(|(_, slot)| slot.port_id.is_none())
            .or_else(|| self.iter().find(|(_, slot)| !slot.connected))
            .map(|(idx, _)| idx)
    }

    /// The only connected slot with a held call or a call being set up.
    ///
    /// Lets single-connection usage omit the port.
    pub fn find_active_or_held_slot(&self) -> CoordinatorResult<SlotIndex> {
        let mut candidates = self
            .connected()
            .filter(|(_, slot)| slot.call_on_hold || slot.call_setup_in_progress)
            .map(|(idx, _)| idx);

        match (candidates.next(), candidates.next()) {
            (Some(idx), None) => Ok(idx),
            (None, _) => Err(CoordinatorError::InvalidParameters(
                "No connection with a held or incoming call".to_string(),
            )),
            (Some(_), Some(_)) => {
                warn!("Both connections have calls pending, a port must be given");
                Err(CoordinatorError::InvalidParameters(
                    "More than one connection with a held or incoming call".to_string(),
                ))
            }
        }
    }

    /// Calls answered across every connection
    pub fn count_answered_calls(&self) -> usize {
        self.connected().map(|(_, slot)| slot.answered_calls()).sum()
    }

    /// The slot owning the shared audio codec, if any
    pub fn active_audio_slot(&self) -> Option<SlotIndex> {
        self.iter().find(|(_, slot)| slot.in_active_audio).map(|(idx, _)| idx)
    }
}
