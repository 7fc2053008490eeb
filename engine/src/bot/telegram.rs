//! Telegram Bot Integration
//!
//! Long-polls `getUpdates`. `/start` answers with a keyboard of web-app
//! buttons opening the pages; `/career` browses the career path table;
//! `web_app_data` messages coming back from the pages are routed to the
//! [`Inbox`].

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use super::career;
use super::inbox::Inbox;
use crate::dataset::PageKind;

/// Telegram rejects messages longer than this
const MAX_MESSAGE_LEN: usize = 4000;

/// Web app the button opens
#[derive(Serialize, Debug)]
struct WebAppInfo {
    url: String,
}

#[derive(Serialize, Debug)]
struct KeyboardButton {
    text: String,
    web_app: WebAppInfo,
}

/// Reply keyboard markup for Telegram
#[derive(Serialize, Debug)]
struct ReplyKeyboardMarkup {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
}

#[derive(Clone)]
pub struct TelegramBot {
    token: String,
    allowed_users: Vec<i64>,
    client: Client,
    inbox: Inbox,
    pages_base_url: String,
    bot_username: String,
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("allowed_users", &self.allowed_users)
            .field("pages_base_url", &self.pages_base_url)
            .field("bot_username", &self.bot_username)
            .finish()
    }
}

#[derive(Deserialize, Debug)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize, Debug)]
struct Message {
    chat: Chat,
    text: Option<String>,
    from: Option<User>,
    web_app_data: Option<WebAppData>,
}

#[derive(Deserialize, Debug)]
struct WebAppData {
    data: String,
}

#[derive(Deserialize, Debug)]
struct Chat {
    id: i64,
}

#[derive(Deserialize, Debug)]
struct User {
    id: i64,
}

#[derive(Deserialize, Debug)]
struct GetUpdatesResponse {
    ok: bool,
    result: Option<Vec<Update>>,
}

impl TelegramBot {
    pub fn new(token: String, allowed_users: Vec<i64>, inbox: Inbox) -> Self {
        Self {
            token,
            allowed_users,
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            inbox,
            pages_base_url: String::new(),
            bot_username: String::new(),
        }
    }

    /// Public base URL the page buttons point to
    pub fn with_pages(mut self, base_url: &str) -> Self {
        self.pages_base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Username used in links back to the bot
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = username.into();
        self
    }

    /// URL of one page under the pages base URL
    pub fn page_url(&self, page: PageKind) -> String {
        format!("{}/{}/index.html", self.pages_base_url, page.dir_name())
    }

    /// Start the long-polling loop
    ///
    /// This will block the current task. Should be spawned in a background tokio::task.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot long-polling loop...");
        let mut offset = 0;

        loop {
            match self.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = update.update_id + 1;
                        if let Some(msg) = update.message {
                            self.handle_message(&msg).await;
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to fetch Telegram updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!(
            "https://api.telegram.org/bot{}/getUpdates?offset={}&timeout=30",
            self.token, offset
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<GetUpdatesResponse>()
            .await?;

        if !response.ok {
            return Err(anyhow::anyhow!("Telegram API returned ok=false"));
        }

        Ok(response.result.unwrap_or_default())
    }

    fn is_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }

    async fn handle_message(&self, msg: &Message) {
        let chat_id = msg.chat.id;

        let user_id = match msg.from.as_ref() {
            Some(u) => u.id,
            None => {
                warn!("Message with no user info - ignoring");
                return;
            }
        };

        if !self.is_allowed(user_id) {
            warn!("Unauthorized user {} attempted to use the bot", user_id);
            let _ = self
                .send_message(chat_id, "Unauthorized. Access denied.")
                .await;
            return;
        }

        if let Some(web_app_data) = &msg.web_app_data {
            let reply = match self
                .inbox
                .handle_web_app_data(&web_app_data.data, &self.bot_username)
            {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Failed to handle web app data from {}: {}", user_id, e);
                    format!("Could not process the page data: {}", e)
                }
            };
            if let Err(e) = self.send_message(chat_id, &reply).await {
                error!("Failed to send reply to {}: {}", chat_id, e);
            }
            return;
        }

        if let Some(text) = &msg.text {
            info!("Received message from {}: {}", user_id, text);
            if text.starts_with('/') {
                self.handle_command(chat_id, text).await;
            }
        }
    }

    /// Keyboard with one web-app button per page
    fn pages_keyboard(&self) -> ReplyKeyboardMarkup {
        let button = |text: &str, page: PageKind| {
            vec![KeyboardButton {
                text: text.to_string(),
                web_app: WebAppInfo {
                    url: self.page_url(page),
                },
            }]
        };
        ReplyKeyboardMarkup {
            keyboard: vec![
                button("🧬 វិភាគ DNA និស្សិត", PageKind::Quiz),
                button("📚 កាតាឡុកសាកលវិទ្យាល័យ", PageKind::Browser),
                button("💰 អ្នកគណនាថ្លៃសិក្សា", PageKind::Calculator),
            ],
            resize_keyboard: true,
        }
    }

    /// Handle built-in bot commands
    async fn handle_command(&self, chat_id: i64, cmd: &str) {
        let (name, argument) = split_command(cmd);
        let result = match name {
            "/start" => {
                self.send_with_keyboard(
                    chat_id,
                    "សូមស្វាគមន៍! សូមជ្រើសរើសឧបករណ៍:",
                    &self.pages_keyboard(),
                )
                .await
            }
            "/career" => {
                self.send_message(chat_id, &career::career_reply(argument))
                    .await
            }
            "/help" => {
                self.send_message(
                    chat_id,
                    "Available commands:\n\
                     /start  - Open the EduGuide tools\n\
                     /career - Explore career paths by field\n\
                     /help   - Show this help",
                )
                .await
            }
            _ => {
                self.send_message(chat_id, &format!("Unknown command: {}", cmd))
                    .await
            }
        };

        if let Err(e) = result {
            error!("Failed to send command reply: {}", e);
        }
    }

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &ReplyKeyboardMarkup,
    ) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "reply_markup": keyboard,
        });
        self.client.post(&url).json(&body).send().await?;
        Ok(())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        #[derive(Serialize)]
        struct SendMsgReq<'a> {
            chat_id: i64,
            text: &'a str,
        }

        let req = SendMsgReq {
            chat_id,
            text: truncate(text, MAX_MESSAGE_LEN),
        };

        self.client.post(&url).json(&req).send().await?;
        Ok(())
    }
}

/// Split `/cmd@bot rest` into the bare command and its argument
fn split_command(text: &str) -> (&str, &str) {
    let text = text.trim();
    let (head, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let name = head.split('@').next().unwrap_or(head);
    (name, rest.trim())
}

/// Cut `text` to at most `max` bytes on a char boundary
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
