//! A stand-in for the Bluetooth stack: every command the coordinator sends is
//! printed instead of reaching a controller.

use bluetooth_hfp::core::address::RawAddress;
use bluetooth_hfp::core::ids::{ConnectionHandle, PortId};
use bluetooth_hfp::hfp::transport::TransportResult;
use bluetooth_hfp::hfp::{
    AudioCodec, CallHoldHandling, CodecId, HfpTransport, SampleRate, VendorCodec,
};

use crate::{console_blue, print_stack};

#[derive(Clone, Copy, Debug)]
pub struct SimStack {
    wbs_feature_active: bool,
}

impl SimStack {
    pub fn new(wbs_feature_active: bool) -> Self {
        SimStack { wbs_feature_active }
    }
}

impl HfpTransport for SimStack {
    fn answer_incoming_call(&self, port: PortId) -> TransportResult {
        print_stack!("[port {}] ATA", port);
        Ok(())
    }

    fn hang_up(&self, port: PortId) -> TransportResult {
        print_stack!("[port {}] AT+CHUP", port);
        Ok(())
    }

    fn send_call_hold_multiparty_selection(
        &self,
        port: PortId,
        handling: CallHoldHandling,
        index: u32,
    ) -> TransportResult {
        let chld = match handling {
            CallHoldHandling::ReleaseAllHeld => "0".to_string(),
            CallHoldHandling::ReleaseActiveAcceptWaiting => "1".to_string(),
            CallHoldHandling::HoldActiveAcceptOther => "2".to_string(),
            CallHoldHandling::AddHeldToConversation => "3".to_string(),
            CallHoldHandling::ConnectTwoAndDisconnect => "4".to_string(),
            CallHoldHandling::ReleaseSpecifiedIndex => format!("1{}", index),
            CallHoldHandling::PrivateConsultation => format!("2{}", index),
        };
        print_stack!("[port {}] AT+CHLD={} ({:?})", port, chld, handling);
        Ok(())
    }

    fn send_selected_codec(&self, port: PortId, codec: CodecId) -> TransportResult {
        print_stack!("[port {}] AT+BCS={} ({})", port, u8::from(codec), codec);
        Ok(())
    }

    fn send_available_codecs(&self, port: PortId, codecs: &[CodecId]) -> TransportResult {
        let ids: Vec<String> = codecs.iter().map(|&c| u8::from(c).to_string()).collect();
        print_stack!("[port {}] AT+BAC={}", port, ids.join(","));
        Ok(())
    }

    fn setup_audio_connection(&self, port: PortId) -> TransportResult {
        print_stack!("[port {}] audio connection requested", port);
        Ok(())
    }

    fn release_audio_connection(&self, port: PortId) -> TransportResult {
        print_stack!("[port {}] audio connection released", port);
        Ok(())
    }

    fn connection_handle(&self, address: &RawAddress) -> TransportResult<ConnectionHandle> {
        // ACL handles are 12 bits wide
        let [.., hi, lo] = address.address;
        Ok(ConnectionHandle(u16::from_be_bytes([hi, lo]) & 0x0fff))
    }
}

impl AudioCodec for SimStack {
    fn enable(&self, rate: SampleRate) -> TransportResult {
        print_stack!("audio codec enabled at {} Hz", rate.hz());
        Ok(())
    }

    fn disable(&self) -> TransportResult {
        print_stack!("audio codec disabled");
        Ok(())
    }
}

impl VendorCodec for SimStack {
    fn is_wbs_feature_active(&self) -> TransportResult<bool> {
        Ok(self.wbs_feature_active)
    }

    fn wbs_associate(&self, handle: ConnectionHandle) -> TransportResult {
        print_stack!("WBS associated with connection 0x{:04x}", handle.0);
        Ok(())
    }

    fn wbs_disassociate(&self) -> TransportResult {
        print_stack!("WBS disassociated");
        Ok(())
    }
}
