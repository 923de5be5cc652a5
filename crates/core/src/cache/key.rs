//! Cache key derivation from request URLs.

use std::sync::LazyLock;

use regex::Regex;

static SCHEME_AND_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^/]+").expect("scheme/host pattern is valid"));

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("separator pattern is valid"));

/// Separator substituted for every non-alphanumeric character.
pub const KEY_SEPARATOR: &str = "_";

/// Derive the cache key for a request URL.
///
/// The first `http(s)://host` run is removed, so the same path and query
/// reached through different hosts or schemes share an entry. Every remaining
/// character outside `[a-zA-Z0-9]` becomes `_`. Distinct URLs can collide
/// (`/a-b` and `/a_b`); the cache accepts that.
pub fn cache_key(url: &str) -> String {
    let without_origin = SCHEME_AND_HOST.replace(url, "");
    NON_ALPHANUMERIC
        .replace_all(&without_origin, KEY_SEPARATOR)
        .into_owned()
}
