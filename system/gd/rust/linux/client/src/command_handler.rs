use std::collections::HashMap;

use bluetooth_hfp::core::address::RawAddress;
use bluetooth_hfp::core::ids::{PortId, ScoHandle};
use bluetooth_hfp::hfp::coordinator::CoordinatorState;
use bluetooth_hfp::hfp::{
    AgFeatures, CallHoldHandling, CallIndicator, Coordinator, CoordinatorError,
    CoordinatorResult, Indication,
};
use bluetooth_hfp::CoordinatorHandle;

use crate::{console_red, console_yellow, print_error, print_info};

const INDENT_CHAR: &str = " ";
const BAR1_CHAR: &str = "=";
const BAR2_CHAR: &str = "-";
const MAX_MENU_CHAR_WIDTH: usize = 72;

/// Features assumed by `slc` when none are given
const DEFAULT_AG_FEATURES: AgFeatures =
    AgFeatures::THREE_WAY_CALLING.union(AgFeatures::CODEC_NEGOTIATION);

#[derive(Debug)]
pub(crate) enum CommandError {
    // Command not handled due to invalid arguments.
    InvalidArgs,
    // Command handled but failed with the given reason.
    Failed(String),
}

impl From<&str> for CommandError {
    fn from(s: &str) -> CommandError {
        CommandError::Failed(String::from(s))
    }
}

impl From<String> for CommandError {
    fn from(s: String) -> CommandError {
        CommandError::Failed(s)
    }
}

impl From<CoordinatorError> for CommandError {
    fn from(e: CoordinatorError) -> CommandError {
        CommandError::Failed(e.to_string())
    }
}

pub(crate) type CommandResult = Result<(), CommandError>;

type CommandFunction = fn(&mut CommandHandler, &[String]) -> CommandResult;

fn _noop(_handler: &mut CommandHandler, _args: &[String]) -> CommandResult {
    // Used so we can add options with no direct function
    // e.g. quit
    Ok(())
}

pub struct CommandOption {
    rules: Vec<String>,
    description: String,
    function_pointer: CommandFunction,
}

/// Handles string command entered from command line.
pub(crate) struct CommandHandler {
    handle: CoordinatorHandle,
    command_options: HashMap<String, CommandOption>,
}

fn wrap_help_text(text: &str, max: usize, indent: usize) -> String {
    let remaining_count = max.saturating_sub(indent + text.chars().count());

    format!("|{}{}{}|", INDENT_CHAR.repeat(indent), text, INDENT_CHAR.repeat(remaining_count))
}

fn option(rules: &[&str], description: &str, function_pointer: CommandFunction) -> CommandOption {
    CommandOption {
        rules: rules.iter().map(|r| r.to_string()).collect(),
        description: String::from(description),
        function_pointer,
    }
}

// This should be called during the constructor in order to populate the command option map
fn build_commands() -> HashMap<String, CommandOption> {
    let mut command_options = HashMap::<String, CommandOption>::new();

    // Indications a real stack would deliver
    command_options.insert(
        String::from("open"),
        option(
            &["open <port> <address>"],
            "Simulates a phone connecting to a server port. (e.g. open 1 00:11:22:33:44:55)",
            CommandHandler::cmd_open,
        ),
    );
    command_options.insert(
        String::from("slc"),
        option(
            &["slc <port> [features]"],
            "Simulates the service level connection coming up with the phone's features\n\
             (hex or decimal, three-way calling and codec negotiation by default).",
            CommandHandler::cmd_slc,
        ),
    );
    command_options.insert(
        String::from("close"),
        option(
            &["close <port> [status]"],
            "Simulates the phone disconnecting.",
            CommandHandler::cmd_close,
        ),
    );
    command_options.insert(
        String::from("ind"),
        option(
            &["ind <port> <CALL|CALLSETUP|CALLHELD> <value>"],
            "Simulates a call status indicator update. (e.g. ind 1 CALLSETUP 1)",
            CommandHandler::cmd_ind,
        ),
    );
    command_options.insert(
        String::from("codec"),
        option(
            &["codec <port> <codec_id>"],
            "Simulates a codec selection request, 1 for CVSD and 2 for mSBC.",
            CommandHandler::cmd_codec,
        ),
    );
    command_options.insert(
        String::from("sco"),
        option(
            &["sco <port> <sco_handle>"],
            "Simulates an audio link coming up.",
            CommandHandler::cmd_sco,
        ),
    );
    command_options.insert(
        String::from("scodown"),
        option(&["scodown <port>"], "Simulates an audio link going down.", CommandHandler::cmd_scodown),
    );

    // User commands
    command_options.insert(
        String::from("answer"),
        option(&["answer [port]"], "Answers the incoming call.", CommandHandler::cmd_answer),
    );
    command_options.insert(
        String::from("hangup"),
        option(
            &["hangup [port]"],
            "Hangs up the active call or rejects the incoming one.",
            CommandHandler::cmd_hangup,
        ),
    );
    command_options.insert(
        String::from("audio"),
        option(
            &["audio <up|down> [port]"],
            "Sets up or releases the audio connection.",
            CommandHandler::cmd_audio,
        ),
    );
    command_options.insert(
        String::from("hold"),
        option(&["hold [port]"], "Puts the active call on hold.", CommandHandler::cmd_hold),
    );
    command_options.insert(
        String::from("multiparty"),
        option(
            &["multiparty <handling> [index] [port]"],
            "Sends a call hold handling to one phone. Handling is 0 release held,\n\
             1 release active accept other, 2 hold active accept other, 3 add held,\n\
             4 connect two and disconnect, 5 release index, 6 private consultation.",
            CommandHandler::cmd_multiparty,
        ),
    );
    command_options.insert(
        String::from("multiphones"),
        option(
            &["multiphones <handling> [index] [port]"],
            "Same as multiparty, arbitrated against the other phone. The port is\n\
             required when two phones are connected.",
            CommandHandler::cmd_multiphones,
        ),
    );
    command_options.insert(
        String::from("switch"),
        option(
            &["switch"],
            "Moves the audio to the other phone. Each phone must have one call.",
            CommandHandler::cmd_switch,
        ),
    );
    command_options.insert(
        String::from("answerswitch"),
        option(
            &["answerswitch"],
            "Answers the waiting call on one phone and moves the audio to it.",
            CommandHandler::cmd_answerswitch,
        ),
    );

    // Console
    command_options.insert(
        String::from("status"),
        option(&["status"], "Shows every connection slot.", CommandHandler::cmd_status),
    );
    command_options.insert(
        String::from("help"),
        option(&["help [command]"], "Shows this menu.", CommandHandler::cmd_help),
    );
    command_options.insert(
        String::from("quit"),
        option(&["quit"], "Quits the console.", _noop),
    );

    command_options
}

fn get_arg(args: &[String], index: usize) -> Result<&String, CommandError> {
    args.get(index).ok_or(CommandError::InvalidArgs)
}

/// Decimal, or hex with a 0x prefix
fn parse_number(arg: &str) -> Result<u32, CommandError> {
    match arg.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => arg.parse::<u32>(),
    }
    .map_err(|_| CommandError::InvalidArgs)
}

fn get_number(args: &[String], index: usize) -> Result<u32, CommandError> {
    parse_number(get_arg(args, index)?)
}

fn get_port(args: &[String], index: usize) -> Result<PortId, CommandError> {
    match get_number(args, index)? {
        0 => Err(CommandError::InvalidArgs),
        port => Ok(PortId(port)),
    }
}

fn get_optional_port(args: &[String], index: usize) -> Result<Option<PortId>, CommandError> {
    match args.get(index) {
        Some(_) => Ok(Some(get_port(args, index)?)),
        None => Ok(None),
    }
}

fn get_handling(args: &[String], index: usize) -> Result<CallHoldHandling, CommandError> {
    CallHoldHandling::try_from(get_number(args, index)?).map_err(|_| CommandError::InvalidArgs)
}

impl CommandHandler {
    /// Create a new CommandHandler posting to the given coordinator.
    pub fn new(handle: CoordinatorHandle) -> CommandHandler {
        CommandHandler { handle, command_options: build_commands() }
    }

    /// Entry point for command and arguments
    pub fn process_cmd_line(&mut self, command: &str, args: &[String]) {
        // Ignore empty line
        match command {
            "" => {}
            _ => match self.command_options.get(command) {
                Some(cmd) => {
                    let rules = cmd.rules.clone();
                    let function_pointer = cmd.function_pointer;
                    match function_pointer(self, args) {
                        Ok(()) => {}
                        Err(CommandError::InvalidArgs) => {
                            print_error!("Invalid arguments. Usage:\n{}", rules.join("\n"));
                        }
                        Err(CommandError::Failed(msg)) => {
                            print_error!("Command failed: {}", msg);
                        }
                    }
                }
                None => {
                    println!("'{}' is an invalid command!", command);
                    self.cmd_help(&[]).ok();
                }
            },
        };
    }

    /// Command names, sorted
    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.command_options.keys().cloned().collect();
        names.sort();
        names
    }

    /// Usage rules of every command, for line completion
    pub fn get_command_rule_list(&self) -> Vec<String> {
        self.get_command_names()
            .iter()
            .filter_map(|name| self.command_options.get(name))
            .flat_map(|cmd| cmd.rules.iter().cloned())
            .collect()
    }

    fn indicate(&self, indication: Indication) -> CommandResult {
        self.handle.call_blocking(move |c| c.handle_indication(indication))??;
        Ok(())
    }

    fn coordinator<F>(&self, f: F) -> CommandResult
    where
        F: FnOnce(&mut Coordinator) -> CoordinatorResult + Send + 'static,
    {
        self.handle.call_blocking(f)??;
        Ok(())
    }

    fn cmd_help(&mut self, args: &[String]) -> CommandResult {
        if let Some(command) = args.first() {
            match self.command_options.get(command) {
                Some(cmd) => {
                    println!(
                        "\n{}{}\n{}{}\n",
                        INDENT_CHAR.repeat(4),
                        cmd.rules.join("\n"),
                        INDENT_CHAR.repeat(8),
                        cmd.description
                    );
                }
                None => {
                    println!("'{}' is an invalid command!", command);
                    self.cmd_help(&[]).ok();
                }
            }
        } else {
            // Build equals bar and Shave off sides
            let equal_bar = format!(" {} ", BAR1_CHAR.repeat(MAX_MENU_CHAR_WIDTH));

            // Build empty bar and Shave off sides
            let empty_bar = format!("|{}|", INDENT_CHAR.repeat(MAX_MENU_CHAR_WIDTH));

            // Header
            println!(
                "\n{}\n{}\n+{}+\n{}",
                equal_bar,
                wrap_help_text("Help Menu", MAX_MENU_CHAR_WIDTH, 2),
                BAR2_CHAR.repeat(MAX_MENU_CHAR_WIDTH),
                empty_bar
            );

            // Print commands
            for name in self.get_command_names() {
                let Some(cmd) = self.command_options.get(&name) else { continue };
                for rule in cmd.rules.iter() {
                    println!("{}", wrap_help_text(rule, MAX_MENU_CHAR_WIDTH, 4));
                }
                for line in cmd.description.lines() {
                    println!("{}", wrap_help_text(line.trim(), MAX_MENU_CHAR_WIDTH, 8));
                }
                println!("{}", empty_bar);
            }

            // Footer
            println!("{}\n{}", empty_bar, equal_bar);
        }

        Ok(())
    }

    fn cmd_open(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let address =
            get_arg(args, 1)?.parse::<RawAddress>().map_err(|_| CommandError::InvalidArgs)?;

        self.indicate(Indication::PortOpen { port, address })
    }

    fn cmd_slc(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let features = match args.get(1) {
            Some(arg) => AgFeatures::from_bits_truncate(parse_number(arg)?),
            None => DEFAULT_AG_FEATURES,
        };

        self.indicate(Indication::ServiceLevelOpen { port, features })
    }

    fn cmd_close(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let status = match args.get(1) {
            Some(arg) => parse_number(arg)?,
            None => 0,
        };

        self.indicate(Indication::PortClose { port, status })
    }

    fn cmd_ind(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let name = get_arg(args, 1)?;
        let value = get_number(args, 2)?;
        let indicator = CallIndicator::parse(&name.to_uppercase(), value)?;

        self.indicate(Indication::CallIndicator { port, indicator })
    }

    fn cmd_codec(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let codec = u8::try_from(get_number(args, 1)?).map_err(|_| CommandError::InvalidArgs)?;

        self.indicate(Indication::CodecSelectRequest { port, codec })
    }

    fn cmd_sco(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;
        let handle = u16::try_from(get_number(args, 1)?).map_err(|_| CommandError::InvalidArgs)?;

        self.indicate(Indication::AudioConnected { port, sco_handle: ScoHandle(handle) })
    }

    fn cmd_scodown(&mut self, args: &[String]) -> CommandResult {
        let port = get_port(args, 0)?;

        self.indicate(Indication::AudioDisconnected { port })
    }

    fn cmd_answer(&mut self, args: &[String]) -> CommandResult {
        let port = get_optional_port(args, 0)?;
        self.coordinator(move |c| c.answer_incoming_call(port))
    }

    fn cmd_hangup(&mut self, args: &[String]) -> CommandResult {
        let port = get_optional_port(args, 0)?;
        self.coordinator(move |c| c.hang_up(port))
    }

    fn cmd_audio(&mut self, args: &[String]) -> CommandResult {
        let port = get_optional_port(args, 1)?;
        match &get_arg(args, 0)?[..] {
            "up" => self.coordinator(move |c| c.setup_audio_connection(port)),
            "down" => self.coordinator(move |c| c.release_audio_connection(port)),
            _ => Err(CommandError::InvalidArgs),
        }
    }

    fn cmd_hold(&mut self, args: &[String]) -> CommandResult {
        let port = get_optional_port(args, 0)?;
        self.coordinator(move |c| c.place_call_on_hold(port))
    }

    fn cmd_multiparty(&mut self, args: &[String]) -> CommandResult {
        let handling = get_handling(args, 0)?;
        let index = if args.len() > 1 { get_number(args, 1)? } else { 0 };
        let port = get_optional_port(args, 2)?;

        self.coordinator(move |c| c.holding_multiparty_call(port, handling, index))
    }

    fn cmd_multiphones(&mut self, args: &[String]) -> CommandResult {
        let handling = get_handling(args, 0)?;
        let index = if args.len() > 1 { get_number(args, 1)? } else { 0 };
        let port = get_optional_port(args, 2)?;

        self.coordinator(move |c| c.holding_multi_phones_call(port, handling, index))
    }

    fn cmd_switch(&mut self, _args: &[String]) -> CommandResult {
        self.coordinator(|c| c.switch_audio_between_two_active_calls())
    }

    fn cmd_answerswitch(&mut self, _args: &[String]) -> CommandResult {
        self.coordinator(|c| c.answer_waiting_call_and_switch_audio())
    }

    fn cmd_status(&mut self, _args: &[String]) -> CommandResult {
        let state: CoordinatorState = self.handle.call_blocking(|c| c.state().clone())?;

        print_info!(
            "{} connection(s), WBS owner: {}, codec: {}",
            state.connections,
            state.wbs_owner.map_or(String::from("none"), |port| format!("port {}", port)),
            state.sample_rate.map_or(String::from("off"), |rate| format!("{} Hz", rate.hz()))
        );
        for (idx, slot) in state.slots.iter() {
            let Some(port) = slot.port_id else {
                print_info!("slot {}: unused", idx);
                continue;
            };
            print_info!(
                "slot {}: port {} {} {} active={} held={} setup={} sco={} audio={} wbs={}",
                idx,
                port,
                if slot.connected { "connected to" } else { "closed, last" },
                slot.remote_address,
                slot.in_active_call,
                slot.call_on_hold,
                slot.call_setup_in_progress,
                slot.in_active_sco,
                slot.in_active_audio,
                slot.supports_wbs
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bluetooth_hfp::hfp::mocks::mock_stack::{MockStack, MockStackEvent};
    use bluetooth_hfp::hfp::{CodecId, CoordinatorConfig};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};

    const ADDR_1: &str = "00:11:22:33:44:55";
    const ADDR_2: &str = "66:77:88:99:AA:BB";

    fn args(line: &str) -> Vec<String> {
        shell_words::split(line).unwrap()
    }

    /// Starts a coordinator on the given stack and a command handler posting to it
    fn start(stack: MockStack) -> (CommandHandler, JoinHandle<CoordinatorResult>) {
        let coordinator = Coordinator::new(
            CoordinatorConfig::default(),
            Box::new(stack.clone()),
            Box::new(stack.clone()),
            Box::new(stack),
        );
        let handle = CoordinatorHandle::new();
        let runner = handle.clone();
        let (started_tx, started_rx) = mpsc::channel();
        let thread =
            thread::spawn(move || runner.run(coordinator, move || started_tx.send(()).unwrap()));
        started_rx.recv().unwrap();

        (CommandHandler::new(handle), thread)
    }

    fn stop(handler: CommandHandler, thread: JoinHandle<CoordinatorResult>) {
        handler.handle.stop();
        thread.join().unwrap().unwrap();
    }

    fn run(handler: &mut CommandHandler, line: &str) -> CommandResult {
        let words = args(line);
        let function_pointer = handler.command_options.get(&words[0]).unwrap().function_pointer;
        function_pointer(handler, &words[1..])
    }

    #[test]
    fn every_command_has_a_rule() {
        let commands = build_commands();

        for name in [
            "open",
            "slc",
            "close",
            "ind",
            "codec",
            "sco",
            "scodown",
            "answer",
            "hangup",
            "audio",
            "hold",
            "multiparty",
            "multiphones",
            "switch",
            "answerswitch",
            "status",
            "help",
            "quit",
        ] {
            let option = commands.get(name).unwrap();
            assert!(option.rules[0].starts_with(name));
            assert!(!option.description.is_empty());
        }
        assert_eq!(commands.len(), 18);
    }

    #[test]
    fn rule_list_follows_command_names() {
        let handler = CommandHandler::new(CoordinatorHandle::new());

        let rules = handler.get_command_rule_list();

        assert_eq!(rules.len(), handler.get_command_names().len());
        assert!(rules[0].starts_with("answer "));
        assert!(rules.iter().any(|r| r == "audio <up|down> [port]"));
        assert!(rules.iter().any(|r| r == "codec <port> <codec_id>"));
    }

    #[test]
    fn parse_numbers_and_ports() {
        assert_eq!(parse_number("12").unwrap(), 12);
        assert_eq!(parse_number("0x21").unwrap(), 0x21);
        assert!(matches!(parse_number("x"), Err(CommandError::InvalidArgs)));
        assert!(matches!(get_port(&args("0"), 0), Err(CommandError::InvalidArgs)));
        assert_eq!(get_optional_port(&args("answer"), 1).unwrap(), None);
        assert_eq!(get_optional_port(&args("answer 2"), 1).unwrap(), Some(PortId(2)));
        assert!(matches!(get_handling(&args("7"), 0), Err(CommandError::InvalidArgs)));
        assert_eq!(get_handling(&args("2"), 0).unwrap(), CallHoldHandling::HoldActiveAcceptOther);
    }

    #[test]
    fn open_requires_a_valid_address() {
        let (stack, _events) = MockStack::new();
        let (mut handler, thread) = start(stack);

        assert!(matches!(run(&mut handler, "open 1"), Err(CommandError::InvalidArgs)));
        assert!(matches!(run(&mut handler, "open 1 00:11"), Err(CommandError::InvalidArgs)));
        assert!(run(&mut handler, &format!("open 1 {}", ADDR_1)).is_ok());

        stop(handler, thread);
    }

    #[test]
    fn answer_incoming_call() {
        let (stack, mut events) = MockStack::new();
        let (mut handler, thread) = start(stack);

        run(&mut handler, &format!("open 1 {}", ADDR_1)).unwrap();
        run(&mut handler, "slc 1").unwrap();
        run(&mut handler, "ind 1 callsetup 1").unwrap();
        run(&mut handler, "answer").unwrap();

        assert_eq!(events.try_recv().unwrap(), MockStackEvent::AnswerIncomingCall(PortId(1)));
        stop(handler, thread);
    }

    #[test]
    fn coordinator_errors_are_reported_as_failures() {
        let (stack, _events) = MockStack::new();
        let (mut handler, thread) = start(stack);

        assert!(matches!(run(&mut handler, "ind 5 CALL 1"), Err(CommandError::Failed(_))));
        run(&mut handler, &format!("open 1 {}", ADDR_1)).unwrap();
        assert!(matches!(run(&mut handler, "ind 1 RING 1"), Err(CommandError::Failed(_))));
        assert!(matches!(run(&mut handler, "switch"), Err(CommandError::Failed(_))));

        stop(handler, thread);
    }

    #[test]
    fn multiphones_needs_a_port_with_two_phones() {
        let (stack, mut events) = MockStack::new();
        let (mut handler, thread) = start(stack);
        run(&mut handler, &format!("open 1 {}", ADDR_1)).unwrap();
        run(&mut handler, &format!("open 2 {}", ADDR_2)).unwrap();
        run(&mut handler, "ind 1 CALL 1").unwrap();

        assert!(matches!(run(&mut handler, "multiphones 2"), Err(CommandError::Failed(_))));
        run(&mut handler, "multiphones 2 0 1").unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            MockStackEvent::CallHoldMultipartySelection(
                PortId(1),
                CallHoldHandling::HoldActiveAcceptOther,
                0
            )
        );
        stop(handler, thread);
    }

    #[test]
    fn codec_and_audio_commands() {
        let (stack, mut events) = MockStack::new();
        let (mut handler, thread) = start(stack);
        run(&mut handler, &format!("open 1 {}", ADDR_1)).unwrap();

        assert!(matches!(run(&mut handler, "codec 1 300"), Err(CommandError::InvalidArgs)));
        run(&mut handler, "codec 1 1").unwrap();
        run(&mut handler, "sco 1 0x0101").unwrap();
        assert!(matches!(run(&mut handler, "audio sideways"), Err(CommandError::InvalidArgs)));
        run(&mut handler, "audio down 1").unwrap();
        run(&mut handler, "scodown 1").unwrap();
        run(&mut handler, "status").unwrap();

        let mut sent = vec![];
        while let Ok(event) = events.try_recv() {
            sent.push(event);
        }
        assert!(sent.contains(&MockStackEvent::SelectedCodec(PortId(1), CodecId::Cvsd)));
        assert!(sent.contains(&MockStackEvent::ReleaseAudioConnection(PortId(1))));
        assert_eq!(sent.last(), Some(&MockStackEvent::AudioDisable));
        stop(handler, thread);
    }
}
