use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const WG_URL_DEFAULT: &str = "https://www.wg-gesucht.de/wg-zimmer-in-Tuebingen.127.0.1.0.html?offer_filter=1&city_id=127&sort_order=0&noDeact=1&categories%5B%5D=0&rMax=430";
const STATE_PATH_DEFAULT: &str = "data/seen_listings.json";
const USER_AGENT_DEFAULT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// What to do when a single notification fails to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Log the failure and keep going with the remaining listings.
    SkipAndContinue,
    /// Persist the ids already sent, then stop the run with an error.
    Abort,
}

/// Runtime configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: String,
    pub state_path: PathBuf,
    pub user_agent: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub request_timeout: Duration,
    /// Delay between consecutive sends, to stay under Telegram rate limits.
    pub send_pacing: Duration,
    pub debug_dump_html: bool,
    pub delivery_policy: DeliveryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        let delivery_policy = match env::var("ON_DELIVERY_ERROR").as_deref() {
            Ok("abort") => DeliveryPolicy::Abort,
            Ok("skip") | Err(_) => DeliveryPolicy::SkipAndContinue,
            Ok(other) => {
                warn!("Unknown ON_DELIVERY_ERROR value '{}', using 'skip'", other);
                DeliveryPolicy::SkipAndContinue
            }
        };

        Self {
            search_url: env::var("WG_URL").unwrap_or_else(|_| WG_URL_DEFAULT.to_string()),
            state_path: env::var("STATE_PATH")
                .unwrap_or_else(|_| STATE_PATH_DEFAULT.to_string())
                .into(),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| USER_AGENT_DEFAULT.to_string()),
            bot_token: env::var("TELEGRAM_BOT_TOKEN").ok().filter(|v| !v.is_empty()),
            chat_id: env::var("TELEGRAM_CHAT_ID").ok().filter(|v| !v.is_empty()),
            request_timeout: Duration::from_secs(20),
            send_pacing: Duration::from_millis(800),
            debug_dump_html: env::var("DEBUG_DUMP_HTML").as_deref() == Ok("1"),
            delivery_policy,
        }
    }

    /// Without both Telegram credentials we only log what would be sent.
    pub fn dry_run(&self) -> bool {
        self.bot_token.is_none() || self.chat_id.is_none()
    }
}

/// Minimal config for tests: no credentials, no pacing.
#[cfg(test)]
pub(crate) fn test_config(state_path: PathBuf) -> Config {
    Config {
        search_url: "https://www.wg-gesucht.de/test.html".to_string(),
        state_path,
        user_agent: "test-agent".to_string(),
        bot_token: None,
        chat_id: None,
        request_timeout: Duration::from_secs(5),
        send_pacing: Duration::ZERO,
        debug_dump_html: false,
        delivery_policy: DeliveryPolicy::SkipAndContinue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_requires_both_credentials() {
        let mut config = test_config(PathBuf::from("data/seen_listings.json"));
        assert!(config.dry_run());

        config.bot_token = Some("123:abc".to_string());
        assert!(config.dry_run());

        config.chat_id = Some("-100200300".to_string());
        assert!(!config.dry_run());
    }
}
