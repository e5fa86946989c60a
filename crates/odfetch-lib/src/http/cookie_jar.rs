use cookie::Cookie;
use cookie::time::{Duration, OffsetDateTime};
use parking_lot::Mutex;
use reqwest::Url;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use std::collections::{BTreeMap, HashMap};

/// Cookie store that scopes every cookie to the exact host that set it.
///
/// Each host behaves as its own public suffix: a `Domain` attribute naming any other
/// domain (a parent included) gets the cookie rejected, so cookies never leak to sibling
/// subdomains. `Path`, `Secure`, `Max-Age` and `Expires` are honoured.
#[derive(Debug, Default)]
pub struct HostOnlyJar {
    cookies: Mutex<HashMap<String, BTreeMap<CookieKey, StoredCookie>>>,
}

/// Cookies are identified by path and name within a host.
type CookieKey = (String, String);

#[derive(Clone, Debug)]
struct StoredCookie {
    value: String,
    secure: bool,
    expires: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires.is_none_or(|at| at > now)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expiry {
    Session,
    At(OffsetDateTime),
    Expired,
}

/// `Max-Age` wins over `Expires` when both are present.
fn expiry(cookie: &Cookie<'_>, now: OffsetDateTime) -> Expiry {
    if let Some(age) = cookie.max_age() {
        if age <= Duration::ZERO {
            return Expiry::Expired;
        }
        return now.checked_add(age).map_or(Expiry::Session, Expiry::At);
    }
    match cookie.expires_datetime() {
        Some(at) if at <= now => Expiry::Expired,
        Some(at) => Expiry::At(at),
        None => Expiry::Session,
    }
}

/// Directory of the request path, as used when `Path` is absent or not absolute.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(end) => path[..end].to_string(),
    }
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/')
                || request_path[cookie_path.len()..].starts_with('/')))
}

impl HostOnlyJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn host_key(url: &Url) -> Option<String> {
        url.host_str().map(|host| host.to_ascii_lowercase())
    }
}

impl CookieStore for HostOnlyJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = Self::host_key(url) else {
            return;
        };
        let now = OffsetDateTime::now_utc();
        let mut cookies = self.cookies.lock();
        let jar = cookies.entry(host.clone()).or_default();

        for header in cookie_headers {
            let Ok(header) = header.to_str() else {
                tracing::debug!(url = %url, "Ignoring non-ASCII Set-Cookie header");
                continue;
            };
            let cookie = match Cookie::parse(header) {
                Ok(cookie) => cookie,
                Err(e) => {
                    tracing::debug!(
                        url = %url,
                        header,
                        "Ignoring malformed Set-Cookie header: {e}"
                    );
                    continue;
                }
            };

            if let Some(domain) = cookie.domain() {
                let domain = domain.trim_start_matches('.');
                if !domain.eq_ignore_ascii_case(&host) {
                    tracing::debug!(url = %url, domain, "Rejecting cookie for another domain");
                    continue;
                }
            }

            let path = cookie
                .path()
                .filter(|path| path.starts_with('/'))
                .map_or_else(|| default_path(url), str::to_string);
            let key = (path, cookie.name().to_string());
            let value = cookie.value().trim_matches('"');

            let expires = match expiry(&cookie, now) {
                Expiry::Expired => None,
                _ if value.is_empty() => None,
                Expiry::At(at) => Some(Some(at)),
                Expiry::Session => Some(None),
            };
            match expires {
                Some(expires) => {
                    jar.insert(
                        key,
                        StoredCookie {
                            value: value.to_string(),
                            secure: cookie.secure().unwrap_or(false),
                            expires,
                        },
                    );
                }
                None => {
                    jar.remove(&key);
                }
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = Self::host_key(url)?;
        let now = OffsetDateTime::now_utc();
        let mut cookies = self.cookies.lock();
        let jar = cookies.get_mut(&host)?;
        jar.retain(|_, cookie| cookie.is_live(now));

        let https = url.scheme() == "https";
        let mut matching: Vec<_> = jar
            .iter()
            .filter(|((path, _), cookie)| {
                (https || !cookie.secure) && path_matches(url.path(), path)
            })
            .collect();
        if matching.is_empty() {
            return None;
        }
        // More specific paths first.
        matching.sort_by_key(|((path, _), _)| std::cmp::Reverse(path.len()));

        let header = matching
            .iter()
            .map(|((_, name), cookie)| format!("{name}={}", cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}
