mod config;
mod conversation;
mod logging;
mod omdb;

use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;

use teloxide::dispatching::HandlerExt;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use config::{Config, ConfigError};
use conversation::telegram::{private_chat, starts_with_bot_command};
use conversation::{ButtonPress, Command, Controller, TelegramClient};
use omdb::OmdbClient;

type BotController = Controller<TelegramClient, OmdbClient>;

/// Fatal errors before the dispatcher starts. Nothing is retried.
#[derive(Debug)]
enum StartupError {
    Config(ConfigError),
    Telegram(teloxide::RequestError),
    Http(reqwest::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Telegram(e) => write!(f, "telegram error: {e}"),
            Self::Http(e) => write!(f, "failed to build HTTP client: {e}"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<teloxide::RequestError> for StartupError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Telegram(e)
    }
}

impl From<reqwest::Error> for StartupError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logging needs LOG_DIR, which may come from .env, so a bad file is reported once logging is up.
    let dotenv = config::load_dotenv(".env");

    let log_dir = config::log_dir_from(|name| std::env::var(name).ok());
    let _guard = match logging::init(&log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = dotenv {
        error!("Bot startup failed: {}", StartupError::Config(e));
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => {
            info!("👋 Bot stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Bot startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    info!(
        "Loaded config (OMDb endpoint: {}, log: {})",
        config.omdb_base_url,
        logging::log_file_path(&config.log_dir).display()
    );

    let bot = Bot::new(&config.telegram_token);
    let me = bot.get_me().await?;
    info!("Bot user ID: {}, username: @{}", me.id, me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let omdb = OmdbClient::new(config.omdb_api_key, config.omdb_base_url)?;
    let controller: Arc<BotController> =
        Arc::new(Controller::new(TelegramClient::new(bot.clone()), omdb));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
                .branch(dptree::endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    info!("🚀 Bot started");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(msg: Message, cmd: Command, controller: Arc<BotController>) -> ResponseResult<()> {
    match cmd {
        Command::Start => controller.handle_start(msg.chat.id).await,
    }
    Ok(())
}

async fn handle_text(msg: Message, controller: Arc<BotController>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if msg.entities().is_some_and(starts_with_bot_command) {
        debug!("Ignoring unhandled command: {}", text);
        return Ok(());
    }
    let Some(ref user) = msg.from else {
        return Ok(());
    };

    controller.handle_text(user.id, msg.chat.id, text).await;
    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, controller: Arc<BotController>) -> ResponseResult<()> {
    // Stops the client-side spinner; failure only affects the UI.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {e}");
    }

    let Some(data) = q.data.clone() else {
        return Ok(());
    };

    // Without an accessible menu message the prompt goes to the user's private chat.
    let (chat_id, message_id) = match q.regular_message() {
        Some(menu) => (menu.chat.id, Some(menu.id)),
        None => (private_chat(q.from.id), None),
    };

    controller
        .handle_button(ButtonPress {
            user_id: q.from.id,
            chat_id,
            message_id,
            data,
        })
        .await;
    Ok(())
}
