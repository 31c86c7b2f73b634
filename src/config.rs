use poise::serenity_prelude as serenity;

use common::{
    util::{env_flag, env_or, parse_env},
    Error,
};

/// Which gateway event groups the bot subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentsConfig {
    pub guilds: bool,
    pub messages: bool,
    pub reactions: bool,
}

impl Default for IntentsConfig {
    fn default() -> Self {
        Self {
            guilds: true,
            messages: true,
            reactions: true,
        }
    }
}

impl IntentsConfig {
    pub fn from_env() -> Result<Self, Error> {
        let default = Self::default();
        Ok(Self {
            guilds: env_flag("INTENT_GUILDS", default.guilds)?,
            messages: env_flag("INTENT_MESSAGES", default.messages)?,
            reactions: env_flag("INTENT_REACTIONS", default.reactions)?,
        })
    }

    pub fn gateway_intents(&self) -> serenity::GatewayIntents {
        let mut intents = serenity::GatewayIntents::empty();
        if self.guilds {
            intents |= serenity::GatewayIntents::GUILDS;
        }
        if self.messages {
            // prefix commands can't be read without message content
            intents |= serenity::GatewayIntents::GUILD_MESSAGES
                | serenity::GatewayIntents::DIRECT_MESSAGES
                | serenity::GatewayIntents::MESSAGE_CONTENT;
        }
        if self.reactions {
            intents |= serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
                | serenity::GatewayIntents::DIRECT_MESSAGE_REACTIONS;
        }
        intents
    }
}

pub struct Config {
    pub token: String,
    pub command_prefix: String,
    pub support_server_url: String,
    pub source_url: String,
    pub intents: IntentsConfig,
}

impl Config {
    /// loads everything from the environment. call `dotenv()` first
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            token: parse_env("BOT_TOKEN")?,
            command_prefix: env_or("COMMAND_PREFIX", "!".to_owned())?,
            support_server_url: parse_env("SUPPORT_SERVER_URL")?,
            source_url: parse_env("SOURCE_URL")?,
            intents: IntentsConfig::from_env()?,
        })
    }
}

// keeps the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .field("support_server_url", &self.support_server_url)
            .field("source_url", &self.source_url)
            .field("intents", &self.intents)
            .finish()
    }
}
