// The console (hfpclient) drives a Hands-Free coordinator against a simulated
// stack: indications are typed in as commands and every command the coordinator
// sends back is printed. Keep the coordinator logic in the bluetooth_hfp library.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use bluetooth_hfp::hfp::Coordinator;
use bluetooth_hfp::{utils, CoordinatorHandle};
use clap::{App, Arg};
use log::info;
use rustyline::error::ReadlineError;

use crate::command_handler::CommandHandler;
use crate::config_util::ConsoleConfig;
use crate::editor::ConsoleEditor;
use crate::sim_stack::SimStack;

mod command_handler;
mod config_util;
mod console;
mod editor;
mod sim_stack;

fn load_config(path: Option<&str>) -> ConsoleConfig {
    let Some(path) = path else {
        return ConsoleConfig::default();
    };
    match config_util::read_config(Path::new(path)) {
        Ok(config) => config_util::parse_config(config),
        Err(e) => {
            print_error!("Cannot read config {}: {}, using defaults", path, e);
            ConsoleConfig::default()
        }
    }
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("Hands-Free Console")
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .takes_value(true)
                .help("JSON file with the coordinator settings and log level"),
        )
        .arg(
            Arg::with_name("script")
                .long("script")
                .short("s")
                .takes_value(true)
                .help("Read commands from a file instead of stdin"),
        )
        .arg(
            Arg::with_name("wbs-inactive")
                .long("wbs-inactive")
                .help("Simulate a controller whose WBS feature is off"),
        )
        .get_matches();

    let config = load_config(matches.value_of("config"));
    match config.log_level {
        Some(level) => utils::init_logging_with_level(level),
        None => utils::init_logging(),
    }

    let stack = SimStack::new(!matches.is_present("wbs-inactive"));
    let coordinator =
        Coordinator::new(config.coordinator, Box::new(stack), Box::new(stack), Box::new(stack));

    // The coordinator runs on its own thread; this one only reads commands.
    let handle = CoordinatorHandle::new();
    let runner = handle.clone();
    let (started_tx, started_rx) = mpsc::channel();
    let coordinator_thread = thread::spawn(move || {
        runner.run(coordinator, move || {
            let _ = started_tx.send(());
        })
    });
    started_rx.recv()?;

    let mut handler = CommandHandler::new(handle.clone());
    let result = match matches.value_of("script") {
        Some(path) => run_script(&mut handler, path),
        None => run_interactive(&mut handler),
    };

    info!("Console done, stopping the coordinator");
    handle.stop();
    match coordinator_thread.join() {
        Ok(stopped) => stopped?,
        Err(_) => return Err("coordinator thread panicked".into()),
    }
    result
}

/// Splits and runs one command line. Returns false once the user quits.
fn dispatch(handler: &mut CommandHandler, line: &str) -> bool {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(e) => {
            print_error!("Cannot parse '{}': {}", line, e);
            return true;
        }
    };
    let Some((command, args)) = words.split_first() else {
        return true;
    };
    if command == "quit" {
        return false;
    }
    handler.process_cmd_line(command, args);
    true
}

fn run_script(handler: &mut CommandHandler, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    for line in BufReader::new(File::open(path)?).lines() {
        if !dispatch(handler, &line?) {
            break;
        }
    }
    Ok(())
}

fn run_interactive(handler: &mut CommandHandler) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor =
        ConsoleEditor::new(handler.get_command_rule_list(), handler.get_command_names())?;
    print_info!("Type 'help' for the list of commands");

    loop {
        match editor.readline() {
            Ok(line) => {
                if !dispatch(handler, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
