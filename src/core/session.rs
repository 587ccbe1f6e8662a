use std::path::Path;

use crate::config::{Config, ConfigNeedsInput, FileConfig, TokenBackend};

use super::error::Result;
use super::keyring;

/// Authenticated identity sent with every backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_name: String,
    pub jwt_key: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_name", &self.user_name)
            .field("jwt_key", &"<redacted>")
            .finish()
    }
}

/// Login names are case-insensitive on the backend; it expects lower case.
pub fn normalize_user(user: &str) -> String {
    user.trim().to_lowercase()
}

/// Look up the stored token for the configured user, reading `file` for a
/// plaintext fallback.
pub fn resolve(config: &Config, file: &Path) -> std::result::Result<Session, ConfigNeedsInput> {
    let needs_login = |error: Option<String>| ConfigNeedsInput::LoginOnly {
        api_url: config.api_url.to_string(),
        username: config.username.clone(),
        error,
    };
    if config.username.is_empty() {
        return Err(needs_login(None));
    }

    let backend = FileConfig::load_from(file)
        .ok()
        .flatten()
        .as_ref()
        .and_then(|fc| fc.token.clone())
        .unwrap_or(TokenBackend::Keyring);

    let token = match backend {
        TokenBackend::Plaintext { value } => {
            log::info!("Session token loaded from config file");
            value
        }
        TokenBackend::Keyring => match keyring::get_token(&config.username, &config.host()) {
            Ok(t) => {
                log::info!("Session token loaded from keyring");
                t
            }
            Err(e) => return Err(needs_login(Some(e.to_string()))),
        },
    };
    if token.is_empty() {
        return Err(needs_login(None));
    }
    Ok(Session {
        user_name: config.username.clone(),
        jwt_key: token,
    })
}

/// Persist the session: keyring first, plaintext in the config file if that fails.
pub fn save(config: &Config, file: &Path, session: &Session) -> Result<()> {
    let mut fc = FileConfig::load_from(file)?.unwrap_or_default();
    let backend = match keyring::set_token(&session.user_name, &config.host(), &session.jwt_key) {
        Ok(()) => TokenBackend::Keyring,
        Err(e) => {
            log::warn!("Keyring unavailable ({e}); storing session token in config file");
            TokenBackend::Plaintext {
                value: session.jwt_key.clone(),
            }
        }
    };
    apply_login(&mut fc, config, &session.user_name, backend);
    fc.save_to(file)
}

/// Drop the stored token. The user name and backend URL are kept for the next login.
pub fn clear(config: &Config, file: &Path) -> Result<()> {
    if !config.username.is_empty() {
        if let Err(e) = keyring::delete_token(&config.username, &config.host()) {
            log::warn!("Failed to remove keyring token: {e}");
        }
    }
    if let Some(mut fc) = FileConfig::load_from(file)? {
        fc.token = None;
        fc.save_to(file)?;
    }
    Ok(())
}

fn apply_login(fc: &mut FileConfig, config: &Config, user: &str, backend: TokenBackend) {
    fc.api_url = config.api_url.to_string();
    fc.username = user.to_string();
    fc.page_size = config.page_size;
    fc.token = Some(backend);
}
