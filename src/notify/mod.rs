pub mod caption;
pub mod telegram;

pub use caption::build_caption;
pub use telegram::{DryRunNotifier, Notify, TelegramNotifier};
