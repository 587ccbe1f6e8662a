use super::error::{Error, Result};

const SERVICE: &str = "webmail";

fn key_id(username: &str, host: &str) -> String {
    format!("{username}@{host}")
}

fn entry(username: &str, host: &str) -> Result<keyring::Entry> {
    let key = key_id(username, host);
    keyring::Entry::new(SERVICE, &key).map_err(|e| {
        log::error!("keyring Entry::new failed for key={key:?}: {e}");
        Error::Keyring(e.to_string())
    })
}

pub fn get_token(username: &str, host: &str) -> Result<String> {
    log::debug!("keyring GET: service={SERVICE:?} key={:?}", key_id(username, host));
    entry(username, host)?.get_password().map_err(|e| {
        log::warn!("keyring get failed for {username}@{host}: {e}");
        Error::Keyring(format!("get: {e}"))
    })
}

pub fn set_token(username: &str, host: &str, token: &str) -> Result<()> {
    log::debug!("keyring SET: service={SERVICE:?} key={:?}", key_id(username, host));
    entry(username, host)?.set_password(token).map_err(|e| {
        log::error!("keyring set failed for {username}@{host}: {e}");
        Error::Keyring(format!("set: {e}"))
    })
}

pub fn delete_token(username: &str, host: &str) -> Result<()> {
    match entry(username, host)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            log::warn!("keyring delete failed for {username}@{host}: {e}");
            Err(Error::Keyring(format!("delete: {e}")))
        }
    }
}
