use super::{Context, PoiseData};

use codes::{cat_url, random_code, resolve, CodeInput};
use common::Error;

use super::help::help;

pub static ALL: &[fn() -> poise::Command<PoiseData, Error>] = &[
    || poise::Command {
        slash_action: http_slash().slash_action,
        parameters: http_slash().parameters,
        ..http()
    },
    random,
    http_random,
    help,
];

/// Shows the corresponding http cat image given a status code
#[poise::command(prefix_command)]
pub async fn http(
    ctx: Context<'_>,
    #[rest]
    #[description = "An http status code"]
    code: Option<String>,
) -> Result<(), Error> {
    send_cat(ctx, resolve(code.as_ref().map(CodeInput::from))).await
}

/// Shows the corresponding http cat image given a status code
#[poise::command(slash_command, rename = "http")]
pub async fn http_slash(
    ctx: Context<'_>,
    #[description = "An http status code"] code: Option<String>,
) -> Result<(), Error> {
    send_cat(ctx, resolve(code.as_ref().map(CodeInput::from))).await
}

/// Shows a random http cat
#[poise::command(prefix_command, user_cooldown = 1)]
pub async fn random(ctx: Context<'_>) -> Result<(), Error> {
    send_cat(ctx, roll()).await
}

/// Shows a random http cat
#[poise::command(slash_command, rename = "http-random", user_cooldown = 1)]
pub async fn http_random(ctx: Context<'_>) -> Result<(), Error> {
    send_cat(ctx, roll()).await
}

fn roll() -> u16 {
    // the same code path as a typed-in number
    resolve(Some(random_code(&mut rand::thread_rng()).into()))
}

async fn send_cat(ctx: Context<'_>, code: u16) -> Result<(), Error> {
    ctx.say(cat_url(code)).await?;
    Ok(())
}
