use poise::serenity_prelude::{self as serenity, CreateEmbed};
use poise::CreateReply;
use rand::Rng;

use super::{Context, PoiseData};
use common::Error;

/// commands shown in the overview, in order
const LISTED: [&str; 2] = ["http", "random"];

/// Shows what the bot can do
#[poise::command(prefix_command, slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "A specific command to show help about"] command: Option<String>,
) -> Result<(), Error> {
    let prefix = invoked_prefix(ctx);
    let framework = ctx.framework();
    let commands = &framework.options.commands;

    let embed = match command {
        None => {
            let listed: Vec<_> = LISTED
                .iter()
                .filter_map(|&name| commands.iter().find(|c| c.name == name))
                .collect();

            let mut embed = CreateEmbed::new()
                .title("Help")
                .colour(random_colour(&mut rand::thread_rng()));
            for cmd in listed {
                embed = embed.field(command_signature(&prefix, cmd), help_text(cmd), false);
            }
            embed
        }
        Some(name) => {
            let name = name.trim().to_lowercase();
            let Some(cmd) = commands
                .iter()
                .find(|c| c.name == name || c.aliases.iter().any(|a| *a == name))
            else {
                ctx.say(format!("No command called \"{}\" found.", name))
                    .await?;
                return Ok(());
            };

            let mut embed = CreateEmbed::new()
                .title(command_signature(&prefix, cmd))
                .field("description", help_text(cmd), false);
            if let Some(aliases) = alias_list(&cmd.aliases) {
                embed = embed.field("aliases", aliases, false);
            }
            embed
        }
    };

    let data = ctx.data();
    let links = useful_links(
        &invite_url(framework.bot_id.get()),
        &data.source_url,
        &data.support_server_url,
    );
    let embed = embed.field("Useful links", links, false);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// slash invocations have no text prefix, so show the configured one
fn invoked_prefix(ctx: Context<'_>) -> String {
    match ctx {
        poise::Context::Prefix(pctx) => pctx.prefix.to_owned(),
        poise::Context::Application(_) => ctx.data().command_prefix.clone(),
    }
}

fn help_text(cmd: &poise::Command<PoiseData, Error>) -> String {
    cmd.description
        .clone()
        .unwrap_or_else(|| "No description".to_owned())
}

fn command_signature(prefix: &str, cmd: &poise::Command<PoiseData, Error>) -> String {
    let params: Vec<(&str, bool)> = cmd
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.required))
        .collect();
    signature(prefix, &cmd.name, &params)
}

/// Builds `!name <required> [optional]`. `http` leaves out its own name,
/// since anything unrecognized after the prefix is treated as a status code.
pub fn signature(prefix: &str, name: &str, params: &[(&str, bool)]) -> String {
    let params = params
        .iter()
        .map(|&(param, required)| {
            if required {
                format!("<{}>", param)
            } else {
                format!("[{}]", param)
            }
        })
        .collect::<Vec<String>>()
        .join(" ");

    if name == "http" {
        format!("{}{}", prefix, params)
    } else {
        format!("{}{} {}", prefix, name, params).trim_end().to_owned()
    }
}

fn alias_list(aliases: &[String]) -> Option<String> {
    if aliases.is_empty() {
        return None;
    }
    Some(
        aliases
            .iter()
            .map(|a| format!("-{}", a))
            .collect::<Vec<String>>()
            .join("\n"),
    )
}

pub fn invite_url(bot_id: u64) -> String {
    format!(
        "https://discord.com/oauth2/authorize?client_id={}&scope=bot",
        bot_id
    )
}

pub fn useful_links(invite: &str, source: &str, support: &str) -> String {
    [
        format!("[Invite]({})", invite),
        format!("[Source]({})", source),
        format!("[Support]({})", support),
    ]
    .join(" | ")
}

/// a bright colour with a random hue
pub fn random_colour<R: Rng + ?Sized>(rng: &mut R) -> serenity::Colour {
    let (r, g, b) = hsv_to_rgb(rng.gen::<f64>(), rng.gen_range(0.75..=0.95), 1.0);
    serenity::Colour::from_rgb(r, g, b)
}

/// all components in [0, 1]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    (byte(r), byte(g), byte(b))
}
