mod utils;

use bluetooth_hfp::core::address::RawAddress;
use bluetooth_hfp::core::ids::{PortId, ScoHandle};
use bluetooth_hfp::hfp::mocks::mock_stack::{MockStack, MockStackEvent};
use bluetooth_hfp::hfp::{
    AgFeatures, CallIndicator, CodecId, Coordinator, CoordinatorConfig, CoordinatorError,
    Indication, SampleRate,
};
use bluetooth_hfp::CoordinatorHandle;
use utils::{start_test, TestCoordinator};

const PORT_1: PortId = PortId(1);
const PORT_2: PortId = PortId(2);
const ADDR_1: RawAddress = RawAddress { address: [0x10, 0x20, 0x30, 0x40, 0x50, 0x60] };
const ADDR_2: RawAddress = RawAddress { address: [0x11, 0x21, 0x31, 0x41, 0x51, 0x61] };

fn connect(handle: &CoordinatorHandle, port: PortId, address: RawAddress) {
    handle.post_indication(Indication::PortOpen { port, address }).unwrap();
    handle
        .post_indication(Indication::ServiceLevelOpen {
            port,
            features: AgFeatures::THREE_WAY_CALLING | AgFeatures::CODEC_NEGOTIATION,
        })
        .unwrap();
}

#[test]
fn test_post_before_start_is_refused() {
    let handle = CoordinatorHandle::new();

    assert!(!handle.is_running());
    assert_eq!(handle.post(|_| {}), Err(CoordinatorError::NotRunning));
    assert_eq!(
        handle.post_indication(Indication::AudioDisconnected { port: PORT_1 }),
        Err(CoordinatorError::NotRunning)
    );
}

#[test]
fn test_indications_and_commands_run_in_order() {
    start_test(async {
        let mut tc = TestCoordinator::start(CoordinatorConfig::default());
        assert!(tc.handle.is_running());

        connect(&tc.handle, PORT_1, ADDR_1);
        tc.handle
            .post_indication(Indication::CallIndicator {
                port: PORT_1,
                indicator: CallIndicator::CallSetup(1),
            })
            .unwrap();
        let answered = tc.handle.call(|c| c.answer_incoming_call(None)).await.unwrap();

        assert_eq!(answered, Ok(()));
        assert_eq!(tc.events.recv().await, Some(MockStackEvent::AnswerIncomingCall(PORT_1)));
        assert_eq!(tc.handle.call(|c| c.number_of_current_connections()).await, Ok(1));
        assert_eq!(tc.stop(), Ok(()));
    });
}

#[test]
fn test_codec_negotiation_through_the_loop() {
    start_test(async {
        let mut tc = TestCoordinator::start(CoordinatorConfig::default());
        connect(&tc.handle, PORT_1, ADDR_1);
        connect(&tc.handle, PORT_2, ADDR_2);

        tc.handle.post_indication(Indication::CodecSelectRequest { port: PORT_1, codec: 2 }).unwrap();
        tc.handle
            .post_indication(Indication::AudioConnected { port: PORT_1, sco_handle: ScoHandle(9) })
            .unwrap();
        let owner = tc.handle.call(|c| c.wbs_owner()).await.unwrap();

        assert_eq!(owner, Some(PORT_1));
        let mut events = vec![];
        while let Ok(event) = tc.events.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&MockStackEvent::AudioEnable(SampleRate::Wideband)));
        assert!(events.contains(&MockStackEvent::AvailableCodecs(PORT_2, vec![CodecId::Cvsd])));
        assert_eq!(events.last(), Some(&MockStackEvent::SelectedCodec(PORT_1, CodecId::Msbc)));
        tc.stop().unwrap();
    });
}

#[test]
fn test_failed_indication_does_not_stop_the_loop() {
    start_test(async {
        let mut tc = TestCoordinator::start(CoordinatorConfig::default());

        tc.handle.post_indication(Indication::AudioDisconnected { port: PORT_2 }).unwrap();
        connect(&tc.handle, PORT_1, ADDR_1);

        assert_eq!(tc.handle.call(|c| c.number_of_current_connections()).await, Ok(1));
        tc.stop().unwrap();
    });
}

#[test]
fn test_call_returns_operation_errors() {
    start_test(async {
        let mut tc = TestCoordinator::start(CoordinatorConfig::default());

        let result = tc.handle.call(|c| c.hang_up(None)).await.unwrap();

        assert!(matches!(result, Err(CoordinatorError::InvalidParameters(_))));
        tc.stop().unwrap();
    });
}

#[test]
fn test_stop_drains_queue_then_refuses_work() {
    start_test(async {
        let mut tc = TestCoordinator::start(CoordinatorConfig::default());
        connect(&tc.handle, PORT_1, ADDR_1);
        tc.handle.post(|c| c.setup_audio_connection(Some(PORT_1)).unwrap()).unwrap();

        assert_eq!(tc.stop(), Ok(()));

        assert_eq!(tc.events.recv().await, Some(MockStackEvent::SetupAudioConnection(PORT_1)));
        assert!(!tc.handle.is_running());
        assert_eq!(tc.handle.post(|_| {}), Err(CoordinatorError::NotRunning));
        assert_eq!(tc.handle.call(|c| c.wbs_owner()).await, Err(CoordinatorError::NotRunning));
    });
}

#[test]
fn test_handle_runs_only_once() {
    let mut tc = TestCoordinator::start(CoordinatorConfig::default());
    tc.stop().unwrap();

    let (stack, _events) = MockStack::new();
    let coordinator = Coordinator::new(
        CoordinatorConfig::default(),
        Box::new(stack.clone()),
        Box::new(stack.clone()),
        Box::new(stack),
    );

    assert_eq!(tc.handle.run(coordinator, || {}), Err(CoordinatorError::NotRunning));
}

#[test]
fn test_call_blocking_from_plain_thread() {
    let mut tc = TestCoordinator::start(CoordinatorConfig::default());
    connect(&tc.handle, PORT_1, ADDR_1);

    let connections = tc.handle.call_blocking(|c| c.number_of_current_connections());

    assert_eq!(connections, Ok(1));
    tc.stop().unwrap();
}
