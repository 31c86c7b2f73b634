// this whole thing is a joke. please do not send it any real status codes
use dotenv::dotenv;

use common::Error;

mod config;
mod discord;

use config::Config;
use discord::HttpCat;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    let mut log_config = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%m/%d %I:%M:%S %p"),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Off);

    for module in ["httpcat", "codes", "common"] {
        log_config = log_config.level_for(module, log::LevelFilter::Debug);
    }
    log_config.chain(std::io::stdout()).apply()?;

    log::info!("Starting httpcat...");

    let config = Config::from_env()?;
    log::debug!("Loaded {:?}", config);

    let mut bot = HttpCat::new(config);
    bot.connect().await?;
    log::debug!("Bot is {}", bot.state());
    bot.run().await
}
