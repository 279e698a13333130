//! Native (tray and notification) message table.
//!
//! The webview renders its own translations; only strings shown by the shell
//! itself live here.

use std::sync::RwLock;

use crate::settings::Locale;

/// A translatable shell message. Menu item ids use the English text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    Hide,
    Show,
    Quit,
    RunningInBackground,
}

impl Message {
    pub fn id(&self) -> &'static str {
        match self {
            Message::Hide => "Hide",
            Message::Show => "Show",
            Message::Quit => "Quit",
            Message::RunningInBackground => "RunningInBackground",
        }
    }

    pub fn from_id(id: &str) -> Option<Message> {
        [Message::Hide, Message::Show, Message::Quit, Message::RunningInBackground]
            .into_iter()
            .find(|m| m.id() == id)
    }
}

pub fn translate(message: Message, locale: Locale) -> &'static str {
    use Locale::*;
    use Message::*;
    match (message, locale) {
        (Hide, En) => "Hide",
        (Hide, Zh) => "隐藏",
        (Hide, ZhHant) => "隱藏",
        (Show, En) => "Show",
        (Show, Zh) => "显示",
        (Show, ZhHant) => "顯示",
        (Quit, En) => "Quit",
        (Quit, Zh | ZhHant) => "退出",
        (RunningInBackground, En) => "The application is still running in the background.",
        (RunningInBackground, Zh) => "应用仍在后台运行。",
        (RunningInBackground, ZhHant) => "應用程式仍在背景執行。",
    }
}

/// Current shell locale, shared between the tray and command handlers.
#[derive(Debug, Default)]
pub struct Translator {
    locale: RwLock<Locale>,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale: RwLock::new(locale) }
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_locale(&self, locale: Locale) {
        match self.locale.write() {
            Ok(mut guard) => *guard = locale,
            Err(poisoned) => *poisoned.into_inner() = locale,
        }
    }

    pub fn t(&self, message: Message) -> &'static str {
        translate(message, self.locale())
    }
}
