//! Telegram client using teloxide.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, MessageId, ReplyParameters};
use tracing::{info, warn};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send a plain-text message, optionally threaded as a reply.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, String> {
        let mut request = self.bot.send_message(chat_id, text);

        if let Some(msg_id) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(msg_id));
        }

        request.await.map(|msg| msg.id).map_err(|e| {
            let msg = format!("failed to send to chat {chat_id}: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Download a file's raw bytes by its Telegram file id.
    ///
    /// Resolves the file reference to a path first; an expired reference or
    /// a network failure surfaces here and drops the message's pipeline.
    pub async fn download_file(&self, file_id: FileId) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| format!("failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("failed to download file: {e}"))?;

        info!("📥 downloaded media ({} bytes)", data.len());
        Ok(data)
    }
}
