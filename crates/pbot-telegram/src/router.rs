use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use pbot_core::{
    app::BotApp, config::Config, messaging::port::MessagingPort, ports::GenerationPort,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<BotApp>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Per-chat serialization of message handling, independent of the dispatcher's
/// distribution function. Entries no guard or waiter holds are pruned on the
/// next lock.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.retain(|id, lock| *id == chat_id || Arc::strong_count(lock) > 1);
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Say hello"),
        BotCommand::new("admin", "Open the admin panel (private chat)"),
        BotCommand::new("cancel", "Cancel the pending admin action"),
    ]
}

pub async fn run_polling(
    cfg: Arc<Config>,
    generator: Arc<dyn GenerationPort>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "get_me failed"),
    }
    info!(
        owner = cfg.owner_id.0,
        extra_admins = cfg.initial_admins.len(),
        model = %cfg.generation_model,
        "configuration loaded"
    );

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        warn!(error = %e, "failed to register bot commands");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        app: Arc::new(BotApp::new(cfg, generator, messenger)),
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_inline_query().endpoint(handlers::handle_inline_query))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn chat_locks_serialize_one_chat_but_not_others() {
        let locks = ChatLocks::default();

        let guard = locks.lock_chat(1).await;
        // A different chat is not blocked.
        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock_chat(2)).await;
        assert!(other.is_ok());

        // The same chat waits until the first guard is dropped.
        let same = tokio::time::timeout(Duration::from_millis(50), locks.lock_chat(1)).await;
        assert!(same.is_err());

        drop(guard);
        let same = tokio::time::timeout(Duration::from_millis(50), locks.lock_chat(1)).await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn idle_chat_entries_are_pruned() {
        let locks = ChatLocks::default();

        drop(locks.lock_chat(1).await);
        drop(locks.lock_chat(2).await);
        let held = locks.lock_chat(3).await;
        assert_eq!(locks.inner.lock().await.len(), 1);

        // A held chat survives pruning triggered by another chat.
        drop(locks.lock_chat(4).await);
        let tracked: Vec<i64> = {
            let mut ids: Vec<i64> = locks.inner.lock().await.keys().copied().collect();
            ids.sort_unstable();
            ids
        };
        assert_eq!(tracked, vec![3, 4]);
        drop(held);
    }

    #[test]
    fn registers_the_three_commands() {
        let names: Vec<String> = bot_commands().into_iter().map(|c| c.command).collect();
        assert_eq!(names, vec!["start", "admin", "cancel"]);
    }
}
