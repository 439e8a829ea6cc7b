//! Line editing for the interactive console, on top of rustyline.

use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Editor};
use rustyline_derive::Helper;

use std::collections::HashSet;

use crate::console_blue;

#[derive(Helper)]
struct HfpHelper {
    // Command rules follow the format:
    // cmd arg1 arg2 ...
    // An argument in brackets is a placeholder, e.g. <port> or [index], and is
    // never suggested. A bracketed argument with options separated by '|'
    // completes to those options, e.g. <up|down>.
    //
    // "command" is a keyword matched by any command name, as in
    // help [command]
    command_rules: Vec<String>,
    command_names: Vec<String>,
}

impl Completer for HfpHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<String>), ReadlineError> {
        let slice = &line[..pos];
        let mut completions =
            self.get_candidates(slice).into_iter().map(|c| c + " ").collect::<Vec<String>>();

        completions.sort();

        // |start| points to the starting position of the current token
        let start = match slice.rfind(' ') {
            Some(x) => x + 1,
            None => 0,
        };

        Ok((start, completions))
    }
}

impl Hinter for HfpHelper {
    type Hint = String;
}

impl Highlighter for HfpHelper {}

impl Validator for HfpHelper {}

impl HfpHelper {
    /// Words a rule token accepts, or `None` when it takes any value.
    fn rule_options(&self, rule_token: &str) -> Option<Vec<String>> {
        let bracketed = rule_token.starts_with(['<', '[']);
        let inner = rule_token.trim_matches(|c| matches!(c, '<' | '>' | '[' | ']'));

        if inner == "command" {
            Some(self.command_names.clone())
        } else if inner.contains('|') {
            Some(inner.split('|').map(String::from).collect())
        } else if bracketed {
            None
        } else {
            Some(vec![inner.to_string()])
        }
    }

    fn get_candidates(&self, cmd: &str) -> HashSet<String> {
        let mut result = HashSet::new();

        let n_splits = cmd.split(' ').count();
        // Empty tokens are dropped, except the last one which is being typed.
        let tokens: Vec<&str> = cmd
            .split(' ')
            .enumerate()
            .filter_map(|(i, token)| (i == n_splits - 1 || !token.is_empty()).then_some(token))
            .collect();

        for rule in self.command_rules.iter() {
            let rule_tokens: Vec<&str> = rule.split_whitespace().collect();
            if tokens.len() > rule_tokens.len() {
                continue;
            }

            for (i, (rule_token, cmd_token)) in rule_tokens.iter().zip(tokens.iter()).enumerate() {
                let options = self.rule_options(rule_token);

                if i == tokens.len() - 1 {
                    // we add candidates only for the last word
                    for opt in options.unwrap_or_default() {
                        if opt.starts_with(cmd_token) {
                            result.insert(opt);
                        }
                    }
                    break;
                }

                match options {
                    Some(options) if !options.iter().any(|opt| opt == cmd_token) => break,
                    _ => {}
                }
            }
        }
        result
    }
}

/// Wrapper of the rustyline editor that completes console commands.
pub struct ConsoleEditor {
    rl: Editor<HfpHelper>,
}

impl ConsoleEditor {
    /// Creates a new editor.
    ///
    /// * `command_rules` - Usage rules of every command, for completion.
    /// * `command_names` - Names offered wherever a rule takes a command.
    pub(crate) fn new(
        command_rules: Vec<String>,
        command_names: Vec<String>,
    ) -> rustyline::Result<ConsoleEditor> {
        let builder = Config::builder()
            .auto_add_history(true)
            .history_ignore_dups(true)
            .completion_type(CompletionType::List);
        let config = builder.build();
        let mut rl = Editor::with_config(config)?;
        rl.set_helper(Some(HfpHelper { command_rules, command_names }));
        Ok(ConsoleEditor { rl })
    }

    /// Blocks until a line is entered.
    pub fn readline(&mut self) -> rustyline::Result<String> {
        self.rl.readline(console_blue!("hfp> "))
    }
}
