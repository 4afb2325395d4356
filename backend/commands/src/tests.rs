//! Dispatch-level tests: full tokenizer → resolver → registry →
//! dispatcher flows over an in-memory settings store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use botkit_core::{ChatMessage, CommandScope, Incoming};

use crate::dispatch::CommandDispatcher;
use crate::registry::CommandRegistry;
use crate::settings::DEFAULT_PREFIX;
use crate::storage::{JsonFileStorage, MemoryStorage};
use crate::types::{
    Callback, ChatContext, ChatHandler, CommandOutcome, CommandReply, ConsoleHandler,
};

struct Echo(&'static str);

#[async_trait]
impl ConsoleHandler for Echo {
    async fn handle(&self, args: &[String]) -> Result<CommandReply> {
        Ok(CommandReply::ok(format!("{}:{}", self.0, args.join(","))))
    }
}

struct ChatEcho(&'static str);

#[async_trait]
impl ChatHandler for ChatEcho {
    async fn handle(&self, ctx: &ChatContext, args: &[String]) -> Result<CommandReply> {
        Ok(CommandReply::ok(format!(
            "{}@{}:{}",
            self.0,
            ctx.identity,
            args.join(",")
        )))
    }
}

struct Failing;

#[async_trait]
impl ChatHandler for Failing {
    async fn handle(&self, _ctx: &ChatContext, _args: &[String]) -> Result<CommandReply> {
        Err(anyhow!("boom"))
    }
}

struct Slow;

#[async_trait]
impl ConsoleHandler for Slow {
    async fn handle(&self, _args: &[String]) -> Result<CommandReply> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(CommandReply::ok("too late"))
    }
}

struct Counting(Arc<AtomicUsize>);

#[async_trait]
impl ConsoleHandler for Counting {
    async fn handle(&self, _args: &[String]) -> Result<CommandReply> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(CommandReply::ok("counted"))
    }
}

async fn dispatcher() -> CommandDispatcher {
    let registry = CommandRegistry::open(Box::<MemoryStorage>::default())
        .await
        .unwrap();
    CommandDispatcher::new(Arc::new(registry))
}

fn server_msg(text: &str) -> Incoming {
    Incoming::Chat(ChatMessage::in_channel(text, "user-1", "guild-1"))
}

fn dm_msg(text: &str) -> Incoming {
    Incoming::Chat(ChatMessage::direct(text, "user-1"))
}

fn reply_text(outcome: &CommandOutcome) -> &str {
    match outcome {
        CommandOutcome::Completed(reply) => &reply.text,
        other => panic!("expected completed outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_command_chat_message_passes_through() {
    let d = dispatcher().await;
    let result = d.handle(&server_msg("hello there"), true).await;
    assert!(!result.is_command);
    assert!(!result.was_executed);
    assert!(result.name.is_none());
    assert_eq!(result.invoked_scope, CommandScope::Server);
}

#[tokio::test]
async fn test_bare_prefix_is_not_a_command_attempt() {
    let d = dispatcher().await;
    let result = d.handle(&server_msg("!"), true).await;
    assert!(!result.is_command);
    let result = d.handle(&server_msg("! ping"), true).await;
    assert!(!result.is_command);
}

#[tokio::test]
async fn test_unknown_command_is_reported_not_executed() {
    let d = dispatcher().await;
    let result = d.handle(&server_msg("!nope"), true).await;
    assert!(result.is_command);
    assert!(!result.was_executed);
    assert_eq!(result.name.as_deref(), Some("nope"));
    assert!(result.resolved_scope.is_none());
    assert!(result.resolved_callback.is_none());
    assert!(result.outcome.is_none());
}

#[tokio::test]
async fn test_console_dispatch_executes_without_prefix() {
    let d = dispatcher().await;
    d.registry()
        .register("ping", CommandScope::Console, Callback::console(Echo("pong")))
        .await;
    let result = d.handle(&Incoming::Console("ping a b".into()), true).await;
    assert!(result.is_command);
    assert!(result.was_executed);
    assert_eq!(result.resolved_scope, Some(CommandScope::Console));
    assert_eq!(reply_text(result.outcome.as_ref().unwrap()), "pong:a,b");
}

#[tokio::test]
async fn test_console_name_is_case_folded() {
    let d = dispatcher().await;
    d.registry()
        .register("ping", CommandScope::Console, Callback::console(Echo("pong")))
        .await;
    let result = d.handle(&Incoming::Console("PiNg".into()), true).await;
    assert!(result.was_executed);
    assert_eq!(result.name.as_deref(), Some("ping"));
}

#[tokio::test]
async fn test_quoted_arguments_reach_the_callback() {
    let d = dispatcher().await;
    d.registry()
        .register("say", CommandScope::Server, Callback::chat(ChatEcho("say")))
        .await;
    let result = d.handle(&server_msg(r#"!say "a b" c"#), true).await;
    assert_eq!(result.args, vec!["a b", "c"]);
    assert_eq!(result.arg_count(), 2);
    assert_eq!(
        reply_text(result.outcome.as_ref().unwrap()),
        "say@guild-1:a b,c"
    );
}

#[tokio::test]
async fn test_wrong_scope_reports_the_existing_command() {
    let d = dispatcher().await;
    d.registry()
        .register("ping", CommandScope::Console, Callback::console(Echo("pong")))
        .await;
    let result = d.handle(&server_msg("!ping"), true).await;
    assert!(result.is_command);
    assert!(!result.was_executed);
    assert_eq!(result.resolved_scope, Some(CommandScope::Console));
    assert!(result.resolved_callback.is_some());
    assert!(result.outcome.is_none());
}

#[tokio::test]
async fn test_shared_command_matches_both_chat_scopes() {
    let d = dispatcher().await;
    d.registry()
        .register("hi", CommandScope::Shared, Callback::chat(ChatEcho("hi")))
        .await;
    let server = d.handle(&server_msg("!hi"), true).await;
    assert!(server.was_executed);
    assert_eq!(server.resolved_scope, Some(CommandScope::Shared));
    let dm = d.handle(&dm_msg("!hi"), true).await;
    assert!(dm.was_executed);
    assert_eq!(reply_text(dm.outcome.as_ref().unwrap()), "hi@user-1:");
}

#[tokio::test]
async fn test_shared_command_is_not_invokable_from_console() {
    let d = dispatcher().await;
    d.registry()
        .register("hi", CommandScope::Shared, Callback::chat(ChatEcho("hi")))
        .await;
    let result = d.handle(&Incoming::Console("hi".into()), true).await;
    assert!(result.is_command);
    assert!(!result.was_executed);
    assert_eq!(result.resolved_scope, Some(CommandScope::Shared));
}

#[tokio::test]
async fn test_shared_eviction_redirects_dispatch() {
    let d = dispatcher().await;
    d.registry()
        .register("x", CommandScope::Server, Callback::chat(ChatEcho("old")))
        .await;
    d.registry()
        .register("x", CommandScope::Shared, Callback::chat(ChatEcho("new")))
        .await;
    let result = d.handle(&server_msg("!x"), true).await;
    assert_eq!(reply_text(result.outcome.as_ref().unwrap()), "new@guild-1:");
}

#[tokio::test]
async fn test_disabled_command_is_not_executed_but_console_is_exempt() {
    let counter = Arc::new(AtomicUsize::new(0));
    let d = dispatcher().await;
    d.registry()
        .register("x", CommandScope::Server, Callback::chat(ChatEcho("x")))
        .await;
    d.registry()
        .register(
            "x",
            CommandScope::Console,
            Callback::console(Counting(Arc::clone(&counter))),
        )
        .await;
    assert!(d.registry().disable("guild-1", "x").await);

    let chat = d.handle(&server_msg("!x"), true).await;
    assert!(chat.is_command);
    assert!(!chat.was_executed);
    assert_eq!(chat.resolved_scope, Some(CommandScope::Server));
    assert!(chat.resolved_callback.is_some());

    let console = d.handle(&Incoming::Console("x".into()), true).await;
    assert!(console.was_executed);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_disable_is_per_identity() {
    let d = dispatcher().await;
    d.registry()
        .register("x", CommandScope::Server, Callback::chat(ChatEcho("x")))
        .await;
    d.registry().disable("guild-1", "x").await;

    let other = Incoming::Chat(ChatMessage::in_channel("!x", "user-1", "guild-2"));
    let result = d.handle(&other, true).await;
    assert!(result.was_executed);
}

#[tokio::test]
async fn test_dry_run_resolves_without_executing() {
    let counter = Arc::new(AtomicUsize::new(0));
    let d = dispatcher().await;
    d.registry()
        .register(
            "ping",
            CommandScope::Console,
            Callback::console(Counting(Arc::clone(&counter))),
        )
        .await;
    let result = d.handle(&Incoming::Console("ping".into()), false).await;
    assert!(result.is_command);
    assert!(!result.was_executed);
    assert_eq!(result.resolved_scope, Some(CommandScope::Console));
    assert!(result.resolved_callback.is_some());
    assert!(result.outcome.is_none());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_error_is_captured_as_data() {
    let d = dispatcher().await;
    d.registry()
        .register("fail", CommandScope::Server, Callback::chat(Failing))
        .await;
    let result = d.handle(&server_msg("!fail"), true).await;
    assert!(result.was_executed);
    match result.outcome {
        Some(CommandOutcome::Failed(err)) => assert_eq!(err.to_string(), "boom"),
        other => panic!("expected failed outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_callback_times_out() {
    let d = dispatcher()
        .await
        .with_execution_timeout(Duration::from_millis(50));
    d.registry()
        .register("slow", CommandScope::Console, Callback::console(Slow))
        .await;
    let result = d.handle(&Incoming::Console("slow".into()), true).await;
    assert!(result.was_executed);
    assert!(matches!(result.outcome, Some(CommandOutcome::TimedOut)));
}

#[tokio::test]
async fn test_prefix_isolation_between_identities() {
    let d = dispatcher().await;
    d.registry()
        .register("ping", CommandScope::Shared, Callback::chat(ChatEcho("pong")))
        .await;
    assert!(d.registry().set_prefix("guild-1", "$").await);

    let custom = d.handle(&server_msg("$ping"), true).await;
    assert!(custom.was_executed);
    // The old prefix no longer matches for guild-1.
    let old = d.handle(&server_msg("!ping"), true).await;
    assert!(!old.is_command);

    // guild-2 still resolves the default prefix.
    let other = Incoming::Chat(ChatMessage::in_channel("!ping", "user-1", "guild-2"));
    assert_eq!(d.registry().prefix("guild-2").await, DEFAULT_PREFIX);
    let result = d.handle(&other, true).await;
    assert!(result.was_executed);
}

#[tokio::test]
async fn test_dm_prefix_keys_on_sender_identity() {
    let d = dispatcher().await;
    d.registry()
        .register("ping", CommandScope::Shared, Callback::chat(ChatEcho("pong")))
        .await;
    assert!(d.registry().set_prefix("user-1", "%").await);
    let result = d.handle(&dm_msg("%ping"), true).await;
    assert!(result.was_executed);
}

#[tokio::test]
async fn test_builtin_handlers_drive_the_registry() {
    let registry = Arc::new(
        CommandRegistry::open(Box::<MemoryStorage>::default())
            .await
            .unwrap(),
    );
    let d = crate::build_default_dispatcher(Arc::clone(&registry)).await;

    let result = d.handle(&server_msg("!prefix $"), true).await;
    assert!(result.was_executed);
    assert_eq!(registry.prefix("guild-1").await, "$");

    let result = d.handle(&server_msg("$disable disabled"), true).await;
    assert!(result.was_executed);
    assert!(registry.is_disabled("guild-1", "disabled").await);

    // The disable built-in itself now refuses to run once disabled.
    let result = d.handle(&server_msg("$disabled"), true).await;
    assert!(result.is_command);
    assert!(!result.was_executed);

    let result = d.handle(&server_msg("$enable disabled"), true).await;
    assert!(result.was_executed);
    assert!(!registry.is_disabled("guild-1", "disabled").await);
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

fn scratch_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("botkit-settings-{}.json", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn test_missing_settings_file_is_seeded_empty() {
    let path = scratch_path();
    let registry = CommandRegistry::open(Box::new(JsonFileStorage::new(&path)))
        .await
        .unwrap();
    assert_eq!(registry.prefix("guild-1").await, DEFAULT_PREFIX);

    let raw = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<crate::settings::IdentitySettings> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "guild-1");
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_corrupt_settings_file_is_reset_not_fatal() {
    let path = scratch_path();
    std::fs::write(&path, "{ not json !!").unwrap();

    let registry = CommandRegistry::open(Box::new(JsonFileStorage::new(&path)))
        .await
        .unwrap();
    assert_eq!(registry.prefix("guild-1").await, DEFAULT_PREFIX);

    // The file was recreated with a valid collection.
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(serde_json::from_str::<Vec<crate::settings::IdentitySettings>>(&raw).is_ok());
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_settings_survive_reopen() {
    let path = scratch_path();
    {
        let registry = CommandRegistry::open(Box::new(JsonFileStorage::new(&path)))
            .await
            .unwrap();
        assert!(registry.set_prefix("guild-1", "$").await);
        assert!(registry.disable("guild-1", "ping").await);
    }
    let registry = CommandRegistry::open(Box::new(JsonFileStorage::new(&path)))
        .await
        .unwrap();
    assert_eq!(registry.prefix("guild-1").await, "$");
    assert!(registry.is_disabled("guild-1", "ping").await);
    let _ = std::fs::remove_file(&path);
}
