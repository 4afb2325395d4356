//! Console REPL: feed stdin lines to the dispatcher as console-scope
//! input and print the resolution of each.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use botkit_commands::{
    build_default_dispatcher, Callback, CommandOutcome, CommandRegistry, CommandReply,
    ConsoleHandler, JsonFileStorage, ResolveResult,
};
use botkit_core::{CommandScope, Incoming};

struct PingHandler;

#[async_trait::async_trait]
impl ConsoleHandler for PingHandler {
    async fn handle(&self, args: &[String]) -> Result<CommandReply> {
        if args.is_empty() {
            Ok(CommandReply::ok("pong"))
        } else {
            Ok(CommandReply::ok(format!("pong: {}", args.join(" "))))
        }
    }
}

pub async fn run(data_file: &Path) -> Result<()> {
    let registry = Arc::new(
        CommandRegistry::open(Box::new(JsonFileStorage::new(data_file))).await?,
    );
    let dispatcher = build_default_dispatcher(Arc::clone(&registry)).await;
    registry
        .register("ping", CommandScope::Console, Callback::console(PingHandler))
        .await;

    info!(data_file = %data_file.display(), "REPL started; type 'exit' to quit");
    println!("botkit console — 'commands' lists commands, 'exit' quits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let result = dispatcher.handle(&Incoming::Console(line), true).await;
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &ResolveResult) {
    if !result.is_command {
        return;
    }
    let name = result.name.as_deref().unwrap_or("?");

    if !result.was_executed {
        match result.resolved_scope {
            None => println!("unknown command: {name}"),
            Some(scope) => println!("'{name}' is only available in {scope} scope"),
        }
        return;
    }

    match &result.outcome {
        Some(CommandOutcome::Completed(reply)) => println!("{}", reply.text),
        Some(CommandOutcome::Failed(err)) => println!("'{name}' failed: {err}"),
        Some(CommandOutcome::TimedOut) => println!("'{name}' timed out"),
        None => {}
    }
}
