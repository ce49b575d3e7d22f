//! Terminal front end for PhysiSolve.
//!
//! One-shot:     physisolve <image> [question...]
//! Interactive:  physisolve
//!
//! The credential is read from GEMINI_API_KEY (or VITE_GEMINI_API_KEY), optionally via a
//! `.env` file in the working directory.

use physisolve::config::AppConfig;
use physisolve::image::ImageInput;
use physisolve::llm::gateways::GeminiGateway;
use physisolve::llm::AnalysisBroker;
use physisolve::render::terminal::{to_plain_string, to_terminal_string};
use physisolve::shell::{AnalysisShell, AnalysisStatus};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const HELP: &str = "Commands:
  open <path>    select an image of the problem (alias: drop)
  ask <text>     set the question (empty text clears it)
  solve          analyze the selected image
  clear          remove the image, question and result
  status         show the current state
  help           show this message
  quit           exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open(String),
    Ask(String),
    Solve,
    Clear,
    Status,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "open" | "drop" if !rest.is_empty() => Command::Open(unquote(rest).to_string()),
        "ask" => Command::Ask(rest.to_string()),
        "solve" => Command::Solve,
        "clear" => Command::Clear,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

// Terminals quote dropped paths that contain spaces.
fn unquote(path: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = path.strip_prefix(quote).and_then(|p| p.strip_suffix(quote)) {
            return inner;
        }
    }
    path
}

fn write_solution(out: &mut impl Write, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

fn print_solution(shell: &AnalysisShell) -> io::Result<()> {
    let Some(blocks) = shell.blocks() else {
        return Ok(());
    };

    let stdout = io::stdout();
    let styled = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let text = if styled {
        to_terminal_string(&blocks)
    } else {
        to_plain_string(&blocks)
    };

    write_solution(&mut stdout.lock(), &text)
}

fn print_status(shell: &AnalysisShell) {
    match shell.image() {
        Some(image) => println!("Image:    {}", image.preview()),
        None => println!("Image:    (none)"),
    }
    if shell.question().trim().is_empty() {
        println!("Question: (none)");
    } else {
        println!("Question: {}", shell.question());
    }
    println!("Status:   {}", shell.status().label());
    if let Some(message) = shell.error_message() {
        println!("Error:    {}", message);
    }
}

async fn solve(shell: &mut AnalysisShell) -> io::Result<AnalysisStatus> {
    if !shell.can_submit() {
        eprintln!("Select an image first (open <path>).");
        return Ok(shell.status());
    }

    eprintln!("{}", AnalysisStatus::Analyzing.label());
    let status = shell.submit().await;
    match status {
        AnalysisStatus::Success => print_solution(shell)?,
        _ => {
            if let Some(message) = shell.error_message() {
                eprintln!("{}", message);
            }
        }
    }
    Ok(status)
}

async fn run_once(shell: &mut AnalysisShell, path: &str, question: String) -> ExitCode {
    match ImageInput::open(path).await {
        Ok(image) => shell.select_image(image),
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    }
    shell.set_question(question);

    match solve(shell).await {
        Ok(AnalysisStatus::Success) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_interactive(shell: &mut AnalysisShell) -> io::Result<()> {
    println!("PhysiSolve. Type `help` for commands.\n");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Open(path) => match ImageInput::open(&path).await {
                Ok(image) => {
                    println!("Selected {}", image.preview());
                    shell.select_image(image);
                }
                Err(e) => eprintln!("{}", e.user_message()),
            },
            Command::Ask(question) => shell.set_question(question),
            Command::Solve => {
                solve(shell).await?;
            }
            Command::Clear => {
                shell.clear_image();
                println!("Cleared.");
            }
            Command::Status => print_status(shell),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(input) => {
                eprintln!("Unknown command: {}. Type `help` for commands.", input)
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("physisolve=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let gateway = match GeminiGateway::with_config(config.gemini_config()) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let broker = Arc::new(AnalysisBroker::with_config(
        config.model.clone(),
        gateway,
        config.generation_config(),
    ));
    let mut shell = AnalysisShell::new(broker);

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(path) => {
            let question = args.collect::<Vec<_>>().join(" ");
            run_once(&mut shell, &path, question).await
        }
        None => match run_interactive(&mut shell).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("I/O error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
