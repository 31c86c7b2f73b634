use std::future::Future;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use poise::FrameworkError;

use super::{Context, PoiseData};
use common::Error;

/// cooldowns shorter than this are waited out instead of reported
pub const RETRY_THRESHOLD: Duration = Duration::from_secs(3);

/// Everything that can go wrong during an invocation, as far as the user is told.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    CommandNotFound,
    CooldownActive { retry_after: Duration },
    Other { kind: String, message: String },
}

impl Failure {
    pub fn other(kind: &str, message: impl ToString) -> Self {
        Failure::Other {
            kind: kind.to_owned(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Failure::CommandNotFound => "CommandNotFound",
            Failure::CooldownActive { .. } => "CommandOnCooldown",
            Failure::Other { kind, .. } => kind,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Failure::CommandNotFound => "Command not found".to_owned(),
            Failure::CooldownActive { retry_after } => format!(
                "You are on cooldown. Try again in {:.2}s",
                retry_after.as_secs_f64()
            ),
            Failure::Other { message, .. } => message.clone(),
        }
    }

    /// `Kind: message`, as sent to the channel
    pub fn render(&self) -> String {
        format!("{}: {}", self.kind(), self.message())
    }
}

impl From<&FrameworkError<'_, PoiseData, Error>> for Failure {
    fn from(error: &FrameworkError<'_, PoiseData, Error>) -> Self {
        use FrameworkError as E;
        match error {
            E::UnknownCommand { .. } => Failure::CommandNotFound,
            E::CooldownHit {
                remaining_cooldown, ..
            } => Failure::CooldownActive {
                retry_after: *remaining_cooldown,
            },
            E::Command { error, .. } => Failure::other(error_kind(error), error),
            E::ArgumentParse { error, .. } => Failure::other("BadArgument", error),
            E::MissingBotPermissions { .. } => Failure::other("BotMissingPermissions", error),
            E::MissingUserPermissions { .. } => Failure::other("MissingPermissions", error),
            E::NotAnOwner { .. } => Failure::other("NotOwner", error),
            E::GuildOnly { .. } => Failure::other("NoPrivateMessage", error),
            E::DmOnly { .. } => Failure::other("PrivateMessageOnly", error),
            E::NsfwOnly { .. } => Failure::other("NSFWChannelRequired", error),
            E::CommandCheckFailed { .. } => Failure::other("CheckFailure", error),
            E::CommandPanic { .. } => Failure::other("CommandPanic", error),
            other => Failure::other("CommandError", other),
        }
    }
}

/// names the error the way the user gets to see it
fn error_kind(error: &Error) -> &'static str {
    if error.downcast_ref::<serenity::Error>().is_some() {
        "DiscordError"
    } else if error.downcast_ref::<reqwest::Error>().is_some() {
        "HTTPError"
    } else if error.downcast_ref::<std::num::ParseIntError>().is_some() {
        "ValueError"
    } else if error.downcast_ref::<std::io::Error>().is_some() {
        "IOError"
    } else {
        "CommandError"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownAction {
    /// say nothing at all
    Ignore,
    /// wait it out, then run the command once more
    Retry(Duration),
    Report,
}

impl CooldownAction {
    /// Compares on the command's name only: `http` spam is swallowed, and
    /// anything but `help` is retried if the wait is short.
    pub fn decide(command: &str, retry_after: Duration) -> Self {
        if command == "http" {
            CooldownAction::Ignore
        } else if command != "help" && retry_after < RETRY_THRESHOLD {
            CooldownAction::Retry(retry_after)
        } else {
            CooldownAction::Report
        }
    }
}

/// Rewrites `content` (the text after the prefix) into an `http` invocation.
/// Returns None if it already is one, so a message is only rewritten once.
pub fn reinterpret(prefix: &str, content: &str) -> Option<String> {
    let first = content.split_whitespace().next().unwrap_or("");
    if first.eq_ignore_ascii_case("http") {
        return None;
    }
    Some(format!("{}http {}", prefix, content))
}

/// `msg` with its content swapped for the `http` form, if it gets rewritten at all
fn rewritten_message(
    msg: &serenity::Message,
    prefix: &str,
    content: &str,
) -> Option<serenity::Message> {
    let content = reinterpret(prefix, content)?;
    let mut rewritten = msg.clone();
    rewritten.content = content;
    Some(rewritten)
}

/// Waits, then makes exactly one more `attempt`. A failure goes to
/// `on_failure` and is never retried.
pub async fn retry_once<A, AF, R, RF>(wait: Duration, attempt: A, on_failure: R)
where
    A: FnOnce() -> AF,
    AF: Future<Output = Result<(), Error>>,
    R: FnOnce(Error) -> RF,
    RF: Future<Output = ()>,
{
    tokio::time::sleep(wait).await;
    if let Err(e) = attempt().await {
        on_failure(e).await;
    }
}

/// framework-wide error handler
pub async fn on_error(error: FrameworkError<'_, PoiseData, Error>) {
    match error {
        FrameworkError::UnknownCommand {
            ctx,
            msg,
            prefix,
            msg_content,
            framework,
            invocation_data,
            trigger,
            ..
        } => {
            let Some(rewritten) = rewritten_message(msg, prefix, msg_content) else {
                log::debug!("Unknown command {:?}, giving up", msg_content);
                return;
            };
            log::debug!(
                "Unknown command {:?}, retrying as {:?}",
                msg_content,
                rewritten.content
            );

            let mut parent_commands = vec![];
            let dispatched = poise::dispatch_message(
                framework,
                ctx,
                &rewritten,
                trigger,
                invocation_data,
                &mut parent_commands,
            )
            .await;
            if let Err(e) = dispatched {
                on_invocation_error(e).await;
            }
        }
        other => on_invocation_error(other).await,
    }
}

/// Handles everything but unknown commands. Never dispatches anything new,
/// so it can't loop back into [`on_error`].
async fn on_invocation_error(error: FrameworkError<'_, PoiseData, Error>) {
    if let FrameworkError::CooldownHit {
        remaining_cooldown,
        ctx,
        ..
    } = error
    {
        match CooldownAction::decide(&ctx.command().name, remaining_cooldown) {
            CooldownAction::Ignore => {}
            CooldownAction::Retry(wait) => {
                log::debug!(
                    "{} is on cooldown for {:?}, reinvoking after",
                    ctx.command().name,
                    wait
                );
                retry_once(
                    wait,
                    || rerun(ctx),
                    |e| report(ctx, Failure::other(error_kind(&e), &e)),
                )
                .await;
            }
            CooldownAction::Report => {
                report(
                    ctx,
                    Failure::CooldownActive {
                        retry_after: remaining_cooldown,
                    },
                )
                .await
            }
        }
        return;
    }

    let failure = Failure::from(&error);
    match error.ctx() {
        Some(ctx) => report(ctx, failure).await,
        None => {
            if let Err(e) = poise::builtins::on_error(error).await {
                log::error!("Error while handling error: {}", e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invocation {
    Prefix,
    Slash,
}

/// true if `command` has a body for the way it was invoked
fn can_rerun(command: &poise::Command<PoiseData, Error>, invocation: Invocation) -> bool {
    match invocation {
        Invocation::Prefix => command.prefix_action.is_some(),
        Invocation::Slash => command.slash_action.is_some(),
    }
}

/// Runs the command body again, skipping cooldown and permission checks.
async fn rerun(ctx: Context<'_>) -> Result<(), Error> {
    let invocation = match ctx {
        poise::Context::Prefix(_) => Invocation::Prefix,
        poise::Context::Application(_) => Invocation::Slash,
    };
    if !can_rerun(ctx.command(), invocation) {
        log::warn!(
            "{} has no {:?} action to rerun",
            ctx.command().name,
            invocation
        );
        return Ok(());
    }

    let outcome = match ctx {
        poise::Context::Prefix(pctx) => match pctx.command.prefix_action {
            Some(action) => action(pctx).await,
            None => Ok(()),
        },
        poise::Context::Application(actx) => match actx.command.slash_action {
            Some(action) => action(actx).await,
            None => Ok(()),
        },
    };
    match outcome {
        Ok(()) => Ok(()),
        Err(FrameworkError::Command { error, .. }) => Err(error),
        Err(other) => Err(other.to_string().into()),
    }
}

async fn report(ctx: Context<'_>, failure: Failure) {
    let rendered = failure.render();
    log::error!(
        "Command `{}` invoked by {} failed: {}",
        ctx.command().qualified_name,
        ctx.author().name,
        rendered
    );
    if let Err(e) = ctx.say(rendered).await {
        log::error!("Could not send error message: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_cooldown_decisions() {
        let short = Duration::from_millis(1500);
        let long = Duration::from_secs(10);

        assert_eq!(CooldownAction::decide("http", short), CooldownAction::Ignore);
        assert_eq!(CooldownAction::decide("http", long), CooldownAction::Ignore);
        assert_eq!(
            CooldownAction::decide("random", short),
            CooldownAction::Retry(short)
        );
        assert_eq!(
            CooldownAction::decide("http-random", short),
            CooldownAction::Retry(short)
        );
        assert_eq!(CooldownAction::decide("random", long), CooldownAction::Report);
        assert_eq!(CooldownAction::decide("help", short), CooldownAction::Report);
        assert_eq!(
            CooldownAction::decide("random", RETRY_THRESHOLD),
            CooldownAction::Report
        );
    }

    #[test]
    fn test_reinterpret() {
        assert_eq!(reinterpret("!", "404"), Some("!http 404".to_owned()));
        assert_eq!(reinterpret("!", "teapot"), Some("!http teapot".to_owned()));
        assert_eq!(reinterpret("!", ""), Some("!http ".to_owned()));
        assert_eq!(reinterpret("!", "http 404"), None);
        assert_eq!(reinterpret("!", "HTTP"), None);
        // only the exact command name stops a rewrite
        assert_eq!(reinterpret("!", "https"), Some("!http https".to_owned()));
    }

    #[test]
    fn test_render() {
        assert_eq!(
            Failure::CommandNotFound.render(),
            "CommandNotFound: Command not found"
        );
        assert_eq!(
            Failure::CooldownActive {
                retry_after: Duration::from_millis(4250)
            }
            .render(),
            "CommandOnCooldown: You are on cooldown. Try again in 4.25s"
        );
        assert_eq!(
            Failure::other("ValueError", "invalid digit found in string").render(),
            "ValueError: invalid digit found in string"
        );
    }

    #[test]
    fn test_error_kind() {
        let parse: Error = Box::new("abc".parse::<u16>().unwrap_err());
        assert_eq!(error_kind(&parse), "ValueError");
        let io: Error = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "meow"));
        assert_eq!(error_kind(&io), "IOError");
        let plain: Error = "meow".into();
        assert_eq!(error_kind(&plain), "CommandError");
    }

    #[tokio::test]
    async fn test_failed_retry_is_reported_once() {
        let attempts = AtomicUsize::new(0);
        let reports = AtomicUsize::new(0);
        let start = Instant::now();

        retry_once(
            Duration::from_millis(50),
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), Error>("still broken".into())
            },
            |e| {
                assert_eq!(e.to_string(), "still broken");
                reports.fetch_add(1, Ordering::SeqCst);
                async {}
            },
        )
        .await;

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_retry_reports_nothing() {
        let reports = AtomicUsize::new(0);
        retry_once(
            Duration::from_millis(1),
            || async { Ok(()) },
            |_| {
                reports.fetch_add(1, Ordering::SeqCst);
                async {}
            },
        )
        .await;
        assert_eq!(reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rewritten_message() {
        let mut msg = serenity::Message::default();
        msg.content = "!404".to_owned();

        let rewritten = rewritten_message(&msg, "!", "404").unwrap();
        assert_eq!(rewritten.content, "!http 404");
        assert_eq!(rewritten.id, msg.id);
        assert_eq!(rewritten.channel_id, msg.channel_id);

        // the rewritten message can't be rewritten again
        assert!(rewritten_message(&rewritten, "!", "http 404").is_none());
    }

    #[test]
    fn test_can_rerun() {
        let commands: Vec<_> = super::super::commands::ALL.iter().map(|f| f()).collect();
        let find = |name: &str| commands.iter().find(|c| c.name == name).unwrap();

        assert!(can_rerun(find("http"), Invocation::Prefix));
        assert!(can_rerun(find("http"), Invocation::Slash));
        assert!(can_rerun(find("random"), Invocation::Prefix));
        assert!(!can_rerun(find("random"), Invocation::Slash));
        assert!(can_rerun(find("http-random"), Invocation::Slash));
        assert!(!can_rerun(find("http-random"), Invocation::Prefix));
    }
}
