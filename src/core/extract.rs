use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const TELEGRAM_LINK_PATTERN: &str =
    r"(?:https?://)?(?:t\.me|telegram\.me|telegram\.dog)/(?:joinchat/)?([a-zA-Z0-9_-]+)";
const USERNAME_PATTERN: &str = r"@([a-zA-Z0-9_]+)";

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TELEGRAM_LINK_PATTERN).expect("link pattern is valid"))
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(USERNAME_PATTERN).expect("username pattern is valid"))
}

/// 從自我介紹等自由文字中找出 t.me 連結與 @ 提及
pub fn extract_channels_from_text(text: Option<&str>) -> BTreeSet<String> {
    let mut channels = BTreeSet::new();
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return channels;
    };

    for caps in link_regex().captures_iter(text) {
        channels.insert(caps[1].to_string());
    }

    for caps in username_regex().captures_iter(text) {
        channels.insert(caps[1].to_string());
    }

    channels
}
