//! REPL shell — Reedline-based interactive console session.

use std::sync::Arc;

use anyhow::Result;
use migra_core::{AssetSession, Command};
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

pub async fn run_repl(session: Arc<AssetSession>) -> Result<()> {
    println!("migra v{}", env!("CARGO_PKG_VERSION"));
    println!("Module: {}", session.module());
    match session.account().await {
        Some(account) => println!("Account: {account}"),
        None => println!("No account connected. Use 'account <address>' to connect."),
    }
    println!("Type 'help' for a list of commands.");
    println!();

    let commands: Vec<String> = vec![
        "details".into(),
        "info".into(),
        "balance".into(),
        "bal".into(),
        "mint".into(),
        "burn".into(),
        "transfer".into(),
        "send".into(),
        "migrate".into(),
        "recipient".into(),
        "amount".into(),
        "account".into(),
        "connect".into(),
        "refresh".into(),
        "reset".into(),
        "help".into(),
        "exit".into(),
        "quit".into(),
        "q".into(),
    ];
    let completer = Box::new(DefaultCompleter::new(commands));
    let mut line_editor = Reedline::create().with_completer(completer);
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("migra".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let command = match Command::parse(line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                if command == Command::Exit {
                    println!("Goodbye.");
                    break;
                }

                match command.execute(&session).await {
                    Ok(output) => {
                        if !output.is_empty() {
                            println!("{output}");
                        }
                    }
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => {
                eprintln!("{e}");
                break;
            }
        }
    }

    Ok(())
}
