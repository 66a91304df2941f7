//! Event router: turns incoming updates into registry changes, generation calls
//! and replies.
//!
//! Handler-level failures are logged and never propagated; the polling loop must
//! survive every update.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    config::{Config, GreetingScope},
    conversation::{ConversationKey, ConversationState, Conversations, Resolution},
    domain::{Chat, ChatId, MessageRef, Sender, UserId},
    errors::AuditLogDeliveryFailure,
    formatting::{self, escape_html, truncate_chars},
    messaging::{
        port::MessagingPort,
        types::{
            CallbackQuery, ChatAction, Command, IncomingUpdate, InlineArticle, InlineQuery,
            TextMessage,
        },
    },
    panel::{self, PanelButton},
    ports::GenerationPort,
    registry::AdminRegistry,
    security::{authorize, ensure, Action},
    utils::contains_keyword,
};

const INLINE_DESCRIPTION_CHARS: usize = 64;

/// Process-wide application context shared by every handler.
pub struct BotApp {
    cfg: Arc<Config>,
    owner: UserId,
    registry: RwLock<AdminRegistry>,
    conversations: Mutex<Conversations>,
    generator: Arc<dyn GenerationPort>,
    messenger: Arc<dyn MessagingPort>,
}

impl BotApp {
    pub fn new(
        cfg: Arc<Config>,
        generator: Arc<dyn GenerationPort>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let registry =
            AdminRegistry::with_admins(cfg.owner_id, cfg.initial_admins.iter().copied());
        Self {
            owner: cfg.owner_id,
            cfg,
            registry: RwLock::new(registry),
            conversations: Mutex::new(Conversations::new()),
            generator,
            messenger,
        }
    }

    pub async fn admins(&self) -> Vec<UserId> {
        self.registry.read().await.list()
    }

    pub async fn conversation_state(&self, key: ConversationKey) -> ConversationState {
        self.conversations.lock().await.state(key)
    }

    pub async fn handle_update(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
            IncomingUpdate::InlineQuery(q) => self.handle_inline_query(q).await,
        }
    }

    // ---------- Commands ----------

    async fn handle_command(&self, cmd: Command) {
        self.mirror(&cmd.chat, &cmd.sender, &cmd.raw_text).await;

        match cmd.name.as_str() {
            "start" => {
                let card = formatting::start_card(&self.cfg.persona_name);
                self.send(cmd.chat.id, &card).await;
            }
            "admin" => self.show_panel(&cmd).await,
            "cancel" => {
                let key = ConversationKey::new(cmd.chat.id, cmd.sender.id);
                let cancelled = self.conversations.lock().await.cancel(key);
                let reply = if cancelled {
                    formatting::CANCELLED
                } else {
                    formatting::NOTHING_TO_CANCEL
                };
                self.send(cmd.chat.id, reply).await;
            }
            other => debug!(command = other, "ignoring unknown command"),
        }
    }

    async fn show_panel(&self, cmd: &Command) {
        if !cmd.chat.is_private() {
            self.send(cmd.chat.id, formatting::PRIVATE_ONLY_NOTICE).await;
            return;
        }

        let requester = cmd.sender.id;
        let (view, manage) = {
            let reg = self.registry.read().await;
            (
                authorize(requester, Action::ViewBroadcastPanel, &reg),
                authorize(requester, Action::AddAdmin, &reg),
            )
        };

        if !view.is_permitted() {
            info!(user_id = requester.0, "admin panel denied");
            self.send(cmd.chat.id, formatting::PANEL_DENIED).await;
            return;
        }

        let keyboard = if manage.is_permitted() {
            panel::owner_keyboard(&self.cfg.broadcast_url)
        } else {
            panel::admin_keyboard(&self.cfg.broadcast_url)
        };

        self.send(cmd.chat.id, formatting::PANEL_INTRO).await;
        if let Err(e) = self
            .messenger
            .send_inline_keyboard(cmd.chat.id, formatting::PANEL_TITLE, keyboard)
            .await
        {
            warn!(chat_id = cmd.chat.id.0, error = %e, "failed to send admin panel");
        }
    }

    // ---------- Free text ----------

    async fn handle_text(&self, msg: TextMessage) {
        self.mirror(&msg.chat, &msg.sender, &msg.text).await;

        let key = ConversationKey::new(msg.chat.id, msg.sender.id);
        let pending = self.conversations.lock().await.take(key);
        if let Some(pending) = pending {
            let resolution = {
                let mut reg = self.registry.write().await;
                pending.resolve(msg.sender.id, &msg.text, &mut reg)
            };
            log_resolution(msg.sender.id, &resolution);
            self.send(msg.chat.id, &formatting::resolution(&resolution))
                .await;
            return;
        }

        if self.greeting_applies(&msg) {
            self.reply_with_generation(msg.chat.id, &msg.text).await;
        }
    }

    fn greeting_applies(&self, msg: &TextMessage) -> bool {
        let in_scope = match self.cfg.greeting_scope {
            GreetingScope::GroupsOnly => !msg.chat.is_private(),
            GreetingScope::Everywhere => true,
        };
        in_scope && contains_keyword(&msg.text, &self.cfg.greeting_keywords)
    }

    async fn reply_with_generation(&self, chat_id: ChatId, prompt: &str) {
        if let Err(e) = self
            .messenger
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
        {
            debug!(chat_id = chat_id.0, error = %e, "typing indicator failed");
        }
        if !self.cfg.typing_delay.is_zero() {
            tokio::time::sleep(self.cfg.typing_delay).await;
        }

        match self.generator.generate(prompt).await {
            Ok(text) => self.send(chat_id, &escape_html(&text)).await,
            Err(e) => warn!(chat_id = chat_id.0, error = %e, "greeting generation failed"),
        }
    }

    // ---------- Button presses ----------

    async fn handle_callback(&self, q: CallbackQuery) {
        if let Err(e) = self
            .messenger
            .answer_callback_query(&q.callback_id)
            .await
        {
            debug!(error = %e, "failed to answer callback query");
        }

        let Some(msg) = q.message else {
            return;
        };
        let Some(button) = PanelButton::parse(&q.data) else {
            debug!(data = %q.data, "ignoring unknown callback data");
            return;
        };

        let key = ConversationKey::new(msg.chat_id, q.sender.id);
        match button {
            PanelButton::AddAdmin | PanelButton::RemoveAdmin => {
                let Some(pending) = button.pending() else {
                    return;
                };
                let armed = {
                    let reg = self.registry.read().await;
                    self.conversations.lock().await.arm(key, pending, &reg)
                };
                match armed {
                    Ok(()) => {
                        let res = self
                            .messenger
                            .edit_inline_keyboard(
                                msg,
                                formatting::id_prompt(pending),
                                panel::cancel_keyboard(),
                            )
                            .await;
                        if let Err(e) = res {
                            warn!(error = %e, "failed to show id prompt");
                        }
                    }
                    Err(denied) => {
                        info!(error = %denied, "panel button denied");
                        self.edit(msg, formatting::OWNER_ONLY_BUTTON).await;
                    }
                }
            }
            PanelButton::ListAdmins => {
                let listed = {
                    let reg = self.registry.read().await;
                    ensure(q.sender.id, Action::ListAdmins, &reg).map(|_| reg.list())
                };
                match listed {
                    Ok(ids) => self.edit(msg, &formatting::admin_list(&ids)).await,
                    Err(denied) => {
                        info!(error = %denied, "panel button denied");
                        self.edit(msg, formatting::OWNER_ONLY_BUTTON).await;
                    }
                }
            }
            PanelButton::Cancel => {
                self.conversations.lock().await.cancel(key);
                self.edit(msg, formatting::CANCELLED).await;
            }
        }
    }

    // ---------- Inline mode ----------

    async fn handle_inline_query(&self, q: InlineQuery) {
        let prompt = q.query.trim();
        if prompt.is_empty() {
            return;
        }

        let results = match self.generator.generate(prompt).await {
            Ok(text) => vec![InlineArticle {
                id: format!("gen-{}", q.query_id),
                title: self.cfg.persona_name.clone(),
                description: truncate_chars(&text, INLINE_DESCRIPTION_CHARS),
                body: text,
            }],
            Err(e) => {
                warn!(user_id = q.sender.id.0, error = %e, "inline generation failed");
                Vec::new()
            }
        };

        if let Err(e) = self
            .messenger
            .answer_inline_query(&q.query_id, results, self.cfg.inline_cache_time)
            .await
        {
            warn!(error = %e, "failed to answer inline query");
        }
    }

    // ---------- Audit mirror ----------

    async fn mirror(&self, chat: &Chat, sender: &Sender, text: &str) {
        if sender.id == self.owner {
            return;
        }
        if let Err(e) = self.mirror_to_owner(chat, sender, text).await {
            error!(error = %e, "logging to owner failed");
        }
    }

    async fn mirror_to_owner(
        &self,
        chat: &Chat,
        sender: &Sender,
        text: &str,
    ) -> Result<(), AuditLogDeliveryFailure> {
        let html = formatting::audit_mirror(chat, sender, text);
        self.messenger
            .send_html(self.owner.private_chat(), &html)
            .await
            .map(|_| ())
            .map_err(|source| AuditLogDeliveryFailure {
                owner: self.owner,
                source,
            })
    }

    // ---------- Send helpers ----------

    async fn send(&self, chat_id: ChatId, html: &str) {
        if let Err(e) = self.messenger.send_html(chat_id, html).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send message");
        }
    }

    async fn edit(&self, msg: MessageRef, html: &str) {
        if let Err(e) = self.messenger.edit_html(msg, html).await {
            warn!(chat_id = msg.chat_id.0, error = %e, "failed to edit message");
        }
    }
}

fn log_resolution(requester: UserId, r: &Resolution) {
    match r {
        Resolution::Added(id) => info!(by = requester.0, admin = id.0, "admin added"),
        Resolution::Removed(id) => info!(by = requester.0, admin = id.0, "admin removed"),
        Resolution::OwnerProtected(_) => warn!(by = requester.0, "refused to remove owner"),
        Resolution::Invalid(e) => debug!(by = requester.0, error = %e, "invalid admin id"),
        Resolution::Denied(e) => warn!(error = %e, "pending form resolved by non-owner"),
        Resolution::AlreadyAdmin(_) | Resolution::NotAdmin(_) => {}
    }
}
