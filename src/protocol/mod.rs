use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::TranslateError;
use crate::model::language::LanguageField;
use crate::services::provider::Provider;
use crate::services::translate::TranslationService;
use crate::services::translation_cache::TranslationCache;

mod command;
use command::Command;

/// State shared by every request of one process.
pub struct Core<P> {
    service: TranslationService<P>,
    cache_dir: Option<PathBuf>,
}

impl<P: Provider> Core<P> {
    pub fn new(service: TranslationService<P>, cache_dir: Option<PathBuf>) -> Self {
        Self { service, cache_dir }
    }

    pub fn service(&self) -> &TranslationService<P> {
        &self.service
    }

    fn cache_dir_for(&self, payload: &Value) -> Option<PathBuf> {
        payload
            .get("cache_dir")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.cache_dir.clone())
    }
}

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str, default: &'a str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

pub fn handle<P: Provider>(core: &Core<P>, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);
    let catalog = core.service.catalog();

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "lingua-core alive" })),

        Command::LanguagesList => ok(id, json!({ "languages": catalog.all_languages() })),

        Command::LanguagesResolve => {
            let value = get_str(payload, "value", "");
            if value.is_empty() {
                return err(id, "payload.value is required");
            }
            let by = match payload.get("by").cloned() {
                None | Some(Value::Null) => LanguageField::Code,
                Some(v) => match serde_json::from_value::<LanguageField>(v) {
                    Ok(f) => f,
                    Err(_) => return err(id, "payload.by must be \"code\" or \"language\""),
                },
            };
            ok(id, json!({ "language": catalog.resolve(value, by) }))
        }

        Command::LanguagesSupported => {
            let code = get_str(payload, "code", "");
            if code.is_empty() {
                return err(id, "payload.code is required");
            }
            ok(id, json!({ "supported": catalog.is_supported(code) }))
        }

        Command::Translate => {
            let text = get_str(payload, "text", "");
            let from = get_str(payload, "from", "en");
            let to = get_str(payload, "to", "fr");
            let cache_dir = core.cache_dir_for(payload);

            match core.service.translate_result(text, from, to, cache_dir.as_deref()) {
                Ok(result) => ok(id, json!({ "result": result })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::CacheEntries => {
            let from = get_str(payload, "from", "");
            let to = get_str(payload, "to", "");
            if from.is_empty() || to.is_empty() {
                return err(id, "payload.from and payload.to are required");
            }
            for code in [from, to] {
                if !catalog.is_supported(code) {
                    return err(id, TranslateError::UnsupportedLanguage(code.to_string()).to_string());
                }
            }
            let Some(dir) = core.cache_dir_for(payload) else {
                return err(id, "no cache directory configured");
            };

            match cache_entries(core, &dir, from, to) {
                Ok(entries) => ok(id, json!({ "entries": entries })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

fn cache_entries<P: Provider>(
    core: &Core<P>,
    dir: &Path,
    from: &str,
    to: &str,
) -> crate::error::Result<std::collections::BTreeMap<String, String>> {
    TranslationCache::new(dir)
        .with_corrupt_policy(core.service.corrupt_policy())
        .entries(from, to)
}
