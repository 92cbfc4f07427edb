use crate::controller::GameController;
use crate::host::{self, EnvHost, HostEnvironment};
use genie_bot::session::SessionError;
use genie_core::AppInfo;
use genie_core::game::phase::GamePhase;
use genie_core::model::answer::Answer;
use genie_core::model::roster::{Roster, RosterError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const USAGE: &str = "\
Usage:
  genie play [--seed <n>] [--roster <file>] [--cap <n>]
  genie roster [--roster <file>] [--json]
  genie help

Answers: yes (y), probably (p), dont_know (d), probably_not (pn), no (n).
Type 'restart' to start over or 'quit' to leave.";

fn answer_prompt() -> String {
    let labels: Vec<&str> = Answer::ALL.iter().map(|answer| answer.label()).collect();
    format!("[{}]", labels.join(" / "))
}

pub enum CliOutcome {
    Handled,
    NotHandled,
}

#[derive(Debug)]
pub enum CliError {
    UnknownCommand(String),
    UnknownFlag(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
    Io(io::Error),
    Json(serde_json::Error),
    Roster(RosterError),
    Session(SessionError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::UnknownCommand(cmd) => write!(f, "Unknown command: {cmd}"),
            CliError::UnknownFlag(flag) => write!(f, "Unknown flag: {flag}"),
            CliError::MissingArgument(arg) => write!(f, "Missing argument: {arg}"),
            CliError::InvalidNumber(value) => write!(f, "Invalid number: {value}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Roster(err) => write!(f, "Roster error: {err}"),
            CliError::Session(err) => write!(f, "Game error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        CliError::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        CliError::Json(value)
    }
}

impl From<RosterError> for CliError {
    fn from(value: RosterError) -> Self {
        CliError::Roster(value)
    }
}

impl From<SessionError> for CliError {
    fn from(value: SessionError) -> Self {
        CliError::Session(value)
    }
}

/// Options accepted by `genie play`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayOptions {
    pub seed: Option<u64>,
    pub roster: Option<PathBuf>,
    pub cap: Option<u32>,
}

impl PlayOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, CliError> {
        let mut options = PlayOptions::default();
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--seed" => {
                    let raw = args.next().ok_or(CliError::MissingArgument("--seed <n>"))?;
                    options.seed = Some(raw.parse().map_err(|_| CliError::InvalidNumber(raw))?);
                }
                "--roster" => {
                    let raw = args
                        .next()
                        .ok_or(CliError::MissingArgument("--roster <file>"))?;
                    options.roster = Some(PathBuf::from(raw));
                }
                "--cap" => {
                    let raw = args.next().ok_or(CliError::MissingArgument("--cap <n>"))?;
                    options.cap = Some(raw.parse().map_err(|_| CliError::InvalidNumber(raw))?);
                }
                other => return Err(CliError::UnknownFlag(other.to_string())),
            }
        }
        Ok(options)
    }
}

pub fn run_cli() -> Result<CliOutcome, CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(std::env::args().skip(1), &mut stdin.lock(), &mut stdout.lock())
}

/// Runs one command against explicit streams; `NotHandled` when no command was given.
pub fn run_with<I, R, W>(args: I, input: &mut R, output: &mut W) -> Result<CliOutcome, CliError>
where
    I: IntoIterator<Item = String>,
    R: BufRead,
    W: Write,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(CliOutcome::NotHandled);
    };

    match cmd.as_str() {
        "play" => {
            let options = PlayOptions::parse(args)?;
            play(&options, input, output)?;
            Ok(CliOutcome::Handled)
        }
        "roster" => {
            let mut path: Option<PathBuf> = None;
            let mut json = false;
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--roster" => {
                        let raw = args
                            .next()
                            .ok_or(CliError::MissingArgument("--roster <file>"))?;
                        path = Some(PathBuf::from(raw));
                    }
                    "--json" => json = true,
                    other => return Err(CliError::UnknownFlag(other.to_string())),
                }
            }
            list_roster(path.as_deref(), json, output)?;
            Ok(CliOutcome::Handled)
        }
        "help" | "--help" | "-h" => {
            writeln!(
                output,
                "{} {} ({})",
                AppInfo::name(),
                AppInfo::version(),
                AppInfo::codename()
            )?;
            writeln!(output, "{USAGE}")?;
            Ok(CliOutcome::Handled)
        }
        other => Err(CliError::UnknownCommand(other.to_string())),
    }
}

/// Plays with default options on stdin/stdout.
pub fn play_interactive() -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    play(&PlayOptions::default(), &mut stdin.lock(), &mut stdout.lock())
}

fn load_roster(path: Option<&Path>) -> Result<Arc<Roster>, CliError> {
    let roster = match path {
        Some(path) => Roster::from_path(path)?,
        None => Roster::builtin(),
    };
    Ok(Arc::new(roster))
}

fn list_roster<W: Write>(path: Option<&Path>, json: bool, output: &mut W) -> Result<(), CliError> {
    let roster = load_roster(path)?;
    if json {
        writeln!(output, "{}", roster.to_json()?)?;
        return Ok(());
    }

    for candidate in roster.candidates() {
        let emoji = candidate.emoji.as_deref().unwrap_or(" ");
        writeln!(
            output,
            "{emoji} {:<20} {:<24} {}",
            candidate.id, candidate.name, candidate.category
        )?;
    }
    writeln!(
        output,
        "{} candidates, {} questions",
        roster.candidates().len(),
        roster.questions().len()
    )?;
    Ok(())
}

pub fn play<R: BufRead, W: Write>(
    options: &PlayOptions,
    input: &mut R,
    output: &mut W,
) -> Result<(), CliError> {
    let roster = load_roster(options.roster.as_deref())?;

    let env_host = EnvHost::from_env();
    let ready = host::await_ready(env_host.as_ref().map(|host| host as &dyn HostEnvironment));
    if let Some(user) = ready.user.as_ref() {
        writeln!(output, "Welcome, {}!", user.greeting_name())?;
    }
    if let Some(err) = ready.error.as_ref() {
        writeln!(output, "({err}; playing without host)")?;
    }
    writeln!(output, "Think of a famous person and I will read your mind.")?;

    let mut controller = GameController::new(roster, options.seed, options.cap);

    loop {
        match controller.phase() {
            GamePhase::Playing => {
                let Some(question) = controller.question_text() else {
                    break;
                };
                writeln!(output, "{question}")?;
                if let Some(status) = controller.status_text() {
                    writeln!(output, "  {status}")?;
                }

                let Some(line) = prompt(input, output, &answer_prompt())? else {
                    break;
                };
                match line.as_str() {
                    "quit" | "q" => break,
                    "restart" | "r" => {
                        controller.restart();
                        writeln!(output, "Starting over.")?;
                    }
                    _ => match line.parse::<Answer>() {
                        Ok(answer) => {
                            controller.answer(answer)?;
                        }
                        Err(err) => writeln!(output, "{err}")?,
                    },
                }
            }
            GamePhase::Guessing(_) => {
                if let Some(guess) = controller.guess_text() {
                    writeln!(output, "{guess}")?;
                }
                let Some(line) = prompt(input, output, "Am I right? [y/n]")? else {
                    break;
                };
                match parse_confirmation(&line) {
                    Some(correct) => {
                        controller.confirm_guess(correct)?;
                    }
                    None => writeln!(output, "Please answer y or n.")?,
                }
            }
            GamePhase::Won(_) => {
                writeln!(output, "I win again! The magic of the genie never fails.")?;
                if !play_again(input, output)? {
                    break;
                }
                controller.restart();
            }
            GamePhase::Lost => {
                writeln!(output, "You got me! The genie's magic failed this time.")?;
                if !play_again(input, output)? {
                    break;
                }
                controller.restart();
            }
        }
    }

    writeln!(output, "Thanks for playing!")?;
    Ok(())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<Option<String>, CliError> {
    write!(output, "{label} > ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_ascii_lowercase()))
}

fn play_again<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool, CliError> {
    let line = prompt(input, output, "Play again? [y/n]")?;
    Ok(line.as_deref().and_then(parse_confirmation).unwrap_or(false))
}

fn parse_confirmation(line: &str) -> Option<bool> {
    match line {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(args: &[&str], stdin: &str) -> (Result<CliOutcome, CliError>, String) {
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = run_with(
            args.iter().map(|arg| arg.to_string()),
            &mut input,
            &mut output,
        );
        (result, String::from_utf8(output).expect("utf-8 output"))
    }

    #[test]
    fn no_command_is_not_handled() {
        let (result, output) = run(&[], "");
        assert!(matches!(result, Ok(CliOutcome::NotHandled)));
        assert!(output.is_empty());
    }

    #[test]
    fn parses_play_flags() {
        let options = PlayOptions::parse(
            ["--seed", "9", "--cap", "4", "--roster", "people.json"]
                .into_iter()
                .map(String::from),
        )
        .unwrap();
        assert_eq!(
            options,
            PlayOptions {
                seed: Some(9),
                roster: Some(PathBuf::from("people.json")),
                cap: Some(4),
            }
        );

        let err = PlayOptions::parse(["--seed", "soon"].into_iter().map(String::from))
            .expect_err("bad seed");
        assert_eq!(err.to_string(), "Invalid number: soon");
        assert!(matches!(
            PlayOptions::parse(["--cap"].into_iter().map(String::from)),
            Err(CliError::MissingArgument("--cap <n>"))
        ));
    }

    #[test]
    fn answer_prompt_lists_every_label() {
        assert_eq!(
            answer_prompt(),
            "[Yes / Probably / Don't know / Probably not / No]"
        );
        for label in Answer::ALL.map(Answer::label) {
            assert!(label.parse::<Answer>().is_ok(), "{label} should parse");
        }
    }

    #[test]
    fn unknown_command_is_an_error() {
        let (result, _) = run(&["summon"], "");
        assert!(matches!(result, Err(CliError::UnknownCommand(cmd)) if cmd == "summon"));
    }

    #[test]
    fn roster_lists_candidates() {
        let (result, output) = run(&["roster"], "");
        assert!(matches!(result, Ok(CliOutcome::Handled)));
        assert!(output.contains("Elon Musk"));
        assert!(output.contains("Naruto Uzumaki"));
        assert!(output.ends_with("11 candidates, 21 questions\n"));
    }

    #[test]
    fn indifferent_player_stumps_the_genie() {
        let (result, output) = run(&["play", "--seed", "5"], "d\nd\nmaybe\nd\nd\nn\n");
        assert!(matches!(result, Ok(CliOutcome::Handled)));
        assert!(output.contains("Question 1/15: "));
        assert!(output.contains("11 possibilities remaining • Confidence: 100%"));
        assert!(output.contains("unrecognised answer 'maybe'"));
        assert!(output.contains("Question 4/15: "));
        assert!(!output.contains("Question 5/15: "));
        assert!(output.contains("You got me!"));
        assert!(output.ends_with("Thanks for playing!\n"));
    }

    #[test]
    fn confirmed_guess_wins() {
        let (result, output) = run(&["play", "--seed", "5", "--cap", "1"], "p\nyes\nno\n");
        assert!(matches!(result, Ok(CliOutcome::Handled)));
        assert!(output.contains("I think you're thinking of..."));
        assert!(output.contains("I win again!"));
    }

    #[test]
    fn end_of_input_leaves_quietly() {
        let (result, output) = run(&["play", "--seed", "5"], "");
        assert!(result.is_ok());
        assert!(output.ends_with("Thanks for playing!\n"));
    }
}
