use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

use tracing::{error, info};

use lingua_core::protocol::{self, Core};
use lingua_core::{Config, GoogleProvider, LanguageCatalog, TranslationService};

fn build_core(config: &Config) -> lingua_core::Result<Core<GoogleProvider>> {
    let catalog = match &config.catalog_path {
        Some(path) => LanguageCatalog::load(path)?,
        None => LanguageCatalog::bundled()?,
    };
    let provider = GoogleProvider::new(&config.provider)?;
    let service = TranslationService::new(catalog, provider).with_corrupt_policy(config.corrupt_store);

    Ok(Core::new(service, config.cache_dir.clone()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = Config::resolve_path();
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let core = match build_core(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!(config = %config_path.display(), languages = core.service().catalog().len(), "lingua-core ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| protocol::handle(&core, &line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
