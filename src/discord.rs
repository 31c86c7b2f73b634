use std::fmt;
use std::future::Future;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use poise::PrefixFrameworkOptions;

use common::Error;

use crate::config::Config;

mod commands;
mod help;
mod on_error;

pub type Context<'a> = poise::Context<'a, PoiseData, Error>;

pub struct PoiseData {
    /// shown as the prefix in help when invoked through a slash command
    pub command_prefix: String,
    /// where the code lives
    pub source_url: String,
    pub support_server_url: String,
}

/// Lifecycle of the bot shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Constructed,
    Connected,
    Running,
    Closing,
    Terminated,
}

impl ShellState {
    /// moves to `next`, if that's a legal step from here
    pub fn advance(self, next: ShellState) -> Result<ShellState, Error> {
        use ShellState::*;
        match (self, next) {
            (Constructed, Connected)
            | (Connected, Running)
            | (Connected, Closing)
            | (Running, Closing)
            | (Closing, Terminated) => Ok(next),
            (from, to) => Err(format!("Bot can't go from {} to {}", from, to).into()),
        }
    }
}

impl fmt::Display for ShellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShellState::Constructed => "constructed",
            ShellState::Connected => "connected",
            ShellState::Running => "running",
            ShellState::Closing => "closing",
            ShellState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// The bot itself: config, the discord client, and the http session it owns.
pub struct HttpCat {
    config: Config,
    state: ShellState,
    session: Option<reqwest::Client>,
    client: Option<serenity::Client>,
}

impl HttpCat {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: ShellState::Constructed,
            session: None,
            client: None,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Opens the http session and builds the discord client around the framework.
    pub async fn connect(&mut self) -> Result<(), Error> {
        let state = self.state.advance(ShellState::Connected)?;

        let session = reqwest::Client::builder()
            .user_agent(concat!("httpcat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        check_cats(&session).await;

        let framework = {
            let data = PoiseData {
                command_prefix: self.config.command_prefix.clone(),
                source_url: self.config.source_url.clone(),
                support_server_url: self.config.support_server_url.clone(),
            };
            let prefix = self.config.command_prefix.clone();
            poise::Framework::builder()
                .options(poise::FrameworkOptions {
                    commands: commands::ALL.iter().map(|f| f()).collect(),
                    on_error: |error| Box::pin(on_error::on_error(error)),
                    pre_command: |ctx| {
                        Box::pin(async move {
                            log::info!(
                                "{} invoked {}",
                                ctx.author().name,
                                ctx.invocation_string()
                            );
                        })
                    },
                    prefix_options: PrefixFrameworkOptions {
                        prefix: Some(self.config.command_prefix.clone()),
                        mention_as_prefix: true,
                        case_insensitive_commands: true,
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .setup(move |ctx, ready, framework| {
                    Box::pin(async move {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        ctx.set_activity(Some(serenity::ActivityData::playing(format!(
                            "{}help",
                            prefix
                        ))));
                        log::info!("{} is connected and ready", ready.user.name);
                        Ok(data)
                    })
                })
                .build()
        };

        let client = serenity::Client::builder(
            &self.config.token,
            self.config.intents.gateway_intents(),
        )
        .framework(framework)
        .await?;

        self.session = Some(session);
        self.client = Some(client);
        self.state = state;
        Ok(())
    }

    /// Runs until the gateway gives up or ctrl-c is pressed, then closes.
    pub async fn run(&mut self) -> Result<(), Error> {
        self.state = self.state.advance(ShellState::Running)?;
        let Some(mut client) = self.client.take() else {
            return Err("Bot has no client".into());
        };

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(shutdown_on_signal(tokio::signal::ctrl_c(), async move {
            shard_manager.shutdown_all().await
        }));

        log::info!("Bot started!");
        let result = client.start_autosharded().await;
        // always runs, whatever the gateway did
        self.close();
        result.map_err(Into::into)
    }

    /// Releases the http session. Does nothing if never connected or already closed.
    pub fn close(&mut self) {
        match self.state.advance(ShellState::Closing) {
            Ok(closing) => self.state = closing,
            Err(_) => return,
        }
        self.session.take();
        self.client.take();
        self.state = ShellState::Terminated;
        log::info!("Bot closed.");
    }
}

/// Waits for `signal`, then runs `shutdown`. If the signal can't be listened
/// for, the bot keeps running. Returns whether shutdown ran.
async fn shutdown_on_signal<S, F>(signal: S, shutdown: F) -> bool
where
    S: Future<Output = std::io::Result<()>>,
    F: Future<Output = ()>,
{
    match signal.await {
        Ok(()) => {
            log::info!("Got ctrl-c, shutting down...");
            shutdown.await;
            true
        }
        Err(e) => {
            log::error!("Could not listen for ctrl-c, ignoring it: {}", e);
            false
        }
    }
}

/// warns early if the cats are down, since every reply links to them
async fn check_cats(session: &reqwest::Client) {
    let url = codes::cat_url(codes::random_code(&mut rand::thread_rng()));
    match session
        .head(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(res) if res.status().is_success() => log::debug!("{} is up", url),
        Ok(res) => log::warn!("{} answered {}", url, res.status()),
        Err(e) => log::warn!("Could not reach {}: {}", url, e),
    }
}

impl Drop for HttpCat {
    fn drop(&mut self) {
        self.close();
    }
}
