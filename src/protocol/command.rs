#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    LanguagesList,
    LanguagesResolve,
    LanguagesSupported,
    Translate,
    CacheEntries,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "languages.list" => Command::LanguagesList,
            "languages.resolve" => Command::LanguagesResolve,
            "languages.supported" => Command::LanguagesSupported,
            "translate" => Command::Translate,
            "cache.entries" => Command::CacheEntries,
            _ => Command::Unknown,
        }
    }
}
