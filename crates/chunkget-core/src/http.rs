//! curl handle setup shared by the probe, chunk fetchers and the sequential path.

use curl::easy::{Easy, List, SslVersion};

use crate::config::{TlsConfig, TlsVersion, TransferConfig};
use crate::request::HeaderList;

/// New easy handle for `url` with redirects, buffer size, connect timeout and
/// TLS overrides from `cfg`, plus every entry of `headers`.
pub(crate) fn new_easy(
    url: &str,
    headers: &HeaderList,
    cfg: &TransferConfig,
) -> Result<Easy, curl::Error> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.buffer_size(cfg.buffer_size)?;
    if let Some(timeout) = cfg.connect_timeout() {
        easy.connect_timeout(timeout)?;
    }
    apply_tls(&mut easy, &cfg.tls)?;
    if !headers.is_empty() {
        easy.http_headers(header_list(headers)?)?;
    }
    Ok(easy)
}

/// Build a curl header list. Duplicate names are appended, never merged.
fn header_list(headers: &HeaderList) -> Result<List, curl::Error> {
    let mut list = List::new();
    for (name, value) in headers.iter() {
        list.append(&header_line(name, value))?;
    }
    Ok(list)
}

/// curl treats `Name:` as "remove this header"; `Name;` sends it with an empty value.
fn header_line(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{};", name.trim())
    } else {
        format!("{}: {}", name.trim(), value.trim())
    }
}

fn apply_tls(easy: &mut Easy, tls: &TlsConfig) -> Result<(), curl::Error> {
    if tls.is_default() {
        return Ok(());
    }
    tracing::debug!(min_version = ?tls.min_version, cipher_list = ?tls.cipher_list, "applying TLS overrides");
    if let Some(min) = tls.min_version {
        let min = match min {
            TlsVersion::Tls10 => SslVersion::Tlsv10,
            TlsVersion::Tls11 => SslVersion::Tlsv11,
            TlsVersion::Tls12 => SslVersion::Tlsv12,
            TlsVersion::Tls13 => SslVersion::Tlsv13,
        };
        easy.ssl_min_max_version(min, SslVersion::Default)?;
    }
    if let Some(ciphers) = tls.cipher_list.as_deref() {
        easy.ssl_cipher_list(ciphers)?;
    }
    Ok(())
}

/// Status code from an HTTP status line (`HTTP/1.1 206 Partial Content`, `HTTP/2 200`).
/// Returns `None` for ordinary header lines.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim_start();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
