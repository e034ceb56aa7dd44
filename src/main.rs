mod config;
mod convert;
mod formats;
mod media;
mod recognize;
mod telegram;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::FileId;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use formats::ContentKind;
use media::MediaStore;
use recognize::Recognizer;
use telegram::TelegramClient;

struct BotState {
    telegram: TelegramClient,
    store: MediaStore,
    recognizer: Recognizer,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    /// Greet the user.
    Start,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("startup failed: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("golosok.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    let store = match MediaStore::new() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("startup failed: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.bot_token);
    let state = Arc::new(BotState {
        telegram: TelegramClient::new(bot.clone()),
        recognizer: Recognizer::new(&config.stt),
        store,
    });

    info!("🚀 Starting golosok...");
    info!("Speech language: {}", config.stt.language);

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            info!("/start from chat {}", msg.chat.id);
            state.telegram.send_message(msg.chat.id, "Hi!", None).await.ok();
        }
    }
    Ok(())
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some((kind, file_id)) = formats::media_attachment(&msg) else {
        debug!("ignoring non-media message in chat {}", msg.chat.id);
        return Ok(());
    };

    info!("{} message {} in chat {}", kind.as_str(), msg.id.0, msg.chat.id);

    match transcribe(&state, kind, file_id).await {
        Ok(text) => {
            state
                .telegram
                .send_message(msg.chat.id, &text, Some(msg.id))
                .await
                .ok();
        }
        Err(e) => {
            // The sender gets no reply; the failure stays with this message.
            warn!(
                "pipeline failed for message {} in chat {}: {e}",
                msg.id.0, msg.chat.id
            );
        }
    }

    Ok(())
}

/// Download, normalize to wav, recognize, then always drop the temp files.
async fn transcribe(state: &BotState, kind: ContentKind, file_id: FileId) -> Result<String, String> {
    let bytes = state.telegram.download_file(file_id).await?;
    let media = state.store.save(kind, &bytes).await?;

    let result = async {
        convert::to_wav(&media.source_path(), &media.wav_path()).await?;
        state.recognizer.transcribe(&media.wav_path()).await
    }
    .await;

    media.cleanup().await;
    result
}
