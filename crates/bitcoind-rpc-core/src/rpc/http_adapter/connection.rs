use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

/// Pick basic-auth credentials: explicit pair first, then the cookie file.
pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<Option<(String, String)>, CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok(Some((u.to_owned(), p.to_owned()))),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    let Some(cookie_file) = cookie_file else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(cookie_file).map_err(|e| {
        CoreError::Config(format!(
            "failed to read rpc cookie file {}: {e}",
            cookie_file.display()
        ))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| {
            CoreError::Config(format!("rpc cookie file {} is empty", cookie_file.display()))
        })?;

    match line.split_once(':') {
        Some((cookie_user, cookie_pass)) if !cookie_user.is_empty() && !cookie_pass.is_empty() => {
            Ok(Some((cookie_user.to_owned(), cookie_pass.to_owned())))
        }
        _ => Err(CoreError::Config(format!(
            "rpc cookie file {} must contain non-empty `username:password`",
            cookie_file.display()
        ))),
    }
}

/// `http(s)://host:port/`, the root every endpoint is joined onto.
pub(super) fn base_url(tls: bool, host: &str, port: u16) -> Result<Url, CoreError> {
    let scheme = if tls { "https" } else { "http" };
    let host = host.trim();
    // bare IPv6 literals need brackets inside a URL
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    Url::parse(&format!("{scheme}://{host}:{port}/"))
        .map_err(|e| CoreError::Config(format!("invalid rpc host `{host}`: {e}")))
}

pub(super) fn endpoint_url(base: &Url, endpoint: Option<&str>) -> Result<Url, CoreError> {
    match endpoint.map(|e| e.trim_start_matches('/')).filter(|e| !e.is_empty()) {
        None => Ok(base.clone()),
        Some(path) => base
            .join(path)
            .map_err(|e| CoreError::Config(format!("invalid rpc endpoint `{path}`: {e}"))),
    }
}
