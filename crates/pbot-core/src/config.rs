use std::{env, fs, path::Path, time::Duration};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_PERSONA_NAME: &str = "CINDRELLA";

const DEFAULT_PERSONA_PROMPT: &str = "You are CINDRELLA, a 16-year-old intelligent, emotionally mature, and realistic girl. \
You speak fluently in English and always sound human. You're friendly, confident, and a little bit naughty, but never childish or overly playful. \
Your tone is calm, witty, and thoughtful. Keep replies short, smart, and real, like a teenager who knows what she's saying. \
Never sound like a robot. Always reply only in English.";

/// Where free-text greetings are answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreetingScope {
    GroupsOnly,
    Everywhere,
}

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub telegram_bot_token: String,
    pub openrouter_api_key: String,

    // Admin panel
    pub owner_id: UserId,
    pub initial_admins: Vec<UserId>,
    pub broadcast_url: String,

    // Persona / generation
    pub persona_name: String,
    pub persona_prompt: String,
    pub generation_endpoint: String,
    pub generation_model: String,
    pub generation_timeout: Duration,

    // Greeting trigger
    pub greeting_keywords: Vec<String>,
    pub greeting_scope: GreetingScope,
    pub typing_delay: Duration,

    // Inline mode
    pub inline_cache_time: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN")
            .or_else(|| env_str("BOT_TOKEN"))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;
        let openrouter_api_key = env_str("OPENROUTER_API_KEY")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("OPENROUTER_API_KEY environment variable is required".to_string())
            })?;
        let owner_id = env_str("OWNER_ID")
            .ok_or_else(|| Error::Config("OWNER_ID environment variable is required".to_string()))?
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|e| Error::Config(format!("OWNER_ID must be a numeric user id: {e}")))?;

        let initial_admins = parse_csv_i64(env_str("TELEGRAM_ADMIN_IDS"))
            .into_iter()
            .map(UserId)
            .collect();
        let broadcast_url =
            env_str("BROADCAST_URL").unwrap_or_else(|| "https://t.me/yourchannel".to_string());

        let persona_name = env_str("PERSONA_NAME")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_PERSONA_NAME.to_string());
        let persona_prompt = env_str("PERSONA_PROMPT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_PERSONA_PROMPT.to_string());
        let generation_endpoint = env_str("GENERATION_ENDPOINT")
            .unwrap_or_else(|| "https://openrouter.ai/api/v1/chat/completions".to_string());
        let generation_model = env_str("GENERATION_MODEL")
            .unwrap_or_else(|| "openrouter/cinematika-7b".to_string());
        let generation_timeout =
            Duration::from_millis(env_u64("GENERATION_TIMEOUT_MS").unwrap_or(60_000));

        let greeting_keywords = parse_csv_lower(
            env_str("GREETING_KEYWORDS")
                .or_else(|| Some("hi,hello,hey,hlo,heyy,hola".to_string())),
        );
        let greeting_scope = parse_greeting_scope(env_str("GREETING_SCOPE").as_deref())?;
        let typing_delay = Duration::from_millis(env_u64("TYPING_DELAY_MS").unwrap_or(1_500));

        let inline_cache_time = Duration::from_secs(env_u64("INLINE_CACHE_SECS").unwrap_or(10));

        Ok(Self {
            telegram_bot_token,
            openrouter_api_key,
            owner_id,
            initial_admins,
            broadcast_url,
            persona_name,
            persona_prompt,
            generation_endpoint,
            generation_model,
            generation_timeout,
            greeting_keywords,
            greeting_scope,
            typing_delay,
            inline_cache_time,
        })
    }
}

fn parse_greeting_scope(v: Option<&str>) -> Result<GreetingScope> {
    match v.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("groups") | Some("group") => Ok(GreetingScope::GroupsOnly),
        Some("all") | Some("everywhere") => Ok(GreetingScope::Everywhere),
        Some(other) => Err(Error::Config(format!(
            "GREETING_SCOPE must be `groups` or `all`, got `{other}`"
        ))),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
