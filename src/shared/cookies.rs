/**
 * Cookie Sets
 *
 * Parsing and rendering of the `Cookie` / `Set-Cookie` headers that carry the
 * session between the edge middleware, the server-rendered pages and the browser.
 *
 * # Tombstones
 *
 * Expiring a cookie does not delete the entry from a `CookieSet`. It stores a
 * tombstone (empty value, `Max-Age=0`) so the expiry can still be rendered as a
 * `Set-Cookie` header. Tombstones never appear in a rendered `Cookie` header.
 *
 * # Mirroring
 *
 * `MirroredCookies` pairs the cookie set of a forwarded request with the cookie
 * set of the eventual response. Its only write operations touch both sets, so a
 * rewrite made for the server renderer is always visible to the browser too.
 */

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, COOKIE};

const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Attributes written alongside a cookie value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    /// Lifetime in seconds. `Some(0)` marks a tombstone, `None` a browser-session cookie.
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            max_age: None,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieOptions {
    /// Same attributes with `Max-Age=0`
    pub fn expired(&self) -> Self {
        Self {
            max_age: Some(0),
            ..self.clone()
        }
    }
}

/// A single named cookie with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// An expired entry instructing the browser to delete `name`
    pub fn tombstone(name: impl Into<String>, options: &CookieOptions) -> Self {
        Self::new(name, "", options.expired())
    }

    pub fn is_tombstone(&self) -> bool {
        self.options.max_age == Some(0)
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_set_cookie(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        out.push_str("; Path=");
        out.push_str(&self.options.path);
        if let Some(max_age) = self.options.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.is_tombstone() {
            out.push_str("; Expires=");
            out.push_str(EPOCH_EXPIRES);
        }
        if self.options.http_only {
            out.push_str("; HttpOnly");
        }
        if self.options.secure {
            out.push_str("; Secure");
        }
        out.push_str("; SameSite=");
        out.push_str(self.options.same_site.as_str());
        out
    }

    /// Parse a `Set-Cookie` header value.
    ///
    /// Unknown attributes are ignored. An `Expires` in 1970 is read as a tombstone,
    /// which is how most servers delete cookies without `Max-Age`.
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut options = CookieOptions {
            path: "/".to_string(),
            max_age: None,
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        };
        for attr in parts {
            let attr = attr.trim();
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attr, ""),
            };
            match key.to_ascii_lowercase().as_str() {
                "path" => options.path = val.to_string(),
                "max-age" => options.max_age = val.parse().ok(),
                "expires" if val.contains("1970") && options.max_age.is_none() => {
                    options.max_age = Some(0)
                }
                "httponly" => options.http_only = true,
                "secure" => options.secure = true,
                "samesite" => {
                    if let Some(same_site) = SameSite::parse(val) {
                        options.same_site = same_site;
                    }
                }
                _ => {}
            }
        }

        Some(Self::new(name, value.trim(), options))
    }
}

/// Ordered mapping from cookie name to value and attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: BTreeMap<String, Cookie>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` request header (`a=1; b=2`).
    ///
    /// When a name repeats, the first occurrence wins, matching the browser's
    /// most-specific-path-first ordering.
    pub fn parse(header: &str) -> Self {
        let mut set = Self::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || set.cookies.contains_key(name) {
                continue;
            }
            set.cookies.insert(
                name.to_string(),
                Cookie::new(name, value.trim(), CookieOptions::default()),
            );
        }
        set
    }

    /// Collect every `Cookie` header of a request
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        Self::parse(&joined)
    }

    /// Live value of `name`; tombstones read as absent
    pub fn value(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .filter(|cookie| !cookie.is_tombstone())
            .map(|cookie| cookie.value.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Names of live cookies starting with `prefix`
    pub fn live_names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.cookies
            .values()
            .filter(move |cookie| !cookie.is_tombstone() && cookie.name.starts_with(prefix))
            .map(|cookie| cookie.name.as_str())
    }

    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Replace `name` with a tombstone
    pub fn expire(&mut self, name: &str, options: &CookieOptions) {
        self.insert(Cookie::tombstone(name, options));
    }

    /// Drop `name` entirely, as a browser does when it receives a tombstone
    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        self.cookies.remove(name)
    }

    /// Store `cookie` the way a browser cookie jar would: tombstones delete
    pub fn apply(&mut self, cookie: Cookie) {
        if cookie.is_tombstone() {
            self.cookies.remove(&cookie.name);
        } else {
            self.insert(cookie);
        }
    }

    /// Apply one `Set-Cookie` header value the way a browser cookie jar would
    pub fn apply_set_cookie(&mut self, header: &str) {
        match Cookie::parse_set_cookie(header) {
            Some(cookie) => self.apply(cookie),
            None => tracing::debug!("Ignoring malformed Set-Cookie header"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// Number of live cookies
    pub fn len(&self) -> usize {
        self.cookies.values().filter(|c| !c.is_tombstone()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the live cookies as a `Cookie` header, `None` when nothing is live
    pub fn to_cookie_header(&self) -> Option<String> {
        let rendered = self
            .cookies
            .values()
            .filter(|cookie| !cookie.is_tombstone())
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>();
        if rendered.is_empty() {
            None
        } else {
            Some(rendered.join("; "))
        }
    }

    /// Render every entry, tombstones included, as `Set-Cookie` values
    pub fn to_set_cookie_headers(&self) -> Vec<String> {
        self.cookies.values().map(Cookie::to_set_cookie).collect()
    }
}

/// Request and response cookie sets that can only be rewritten together
#[derive(Debug, Clone)]
pub struct MirroredCookies {
    request: CookieSet,
    response: CookieSet,
}

impl MirroredCookies {
    /// Start from the cookies of an inbound request; the response side starts empty
    pub fn new(request: CookieSet) -> Self {
        Self {
            request,
            response: CookieSet::new(),
        }
    }

    pub fn request(&self) -> &CookieSet {
        &self.request
    }

    pub fn response(&self) -> &CookieSet {
        &self.response
    }

    pub fn write(&mut self, cookie: Cookie) {
        self.request.insert(cookie.clone());
        self.response.insert(cookie);
    }

    pub fn expire(&mut self, name: &str, options: &CookieOptions) {
        self.write(Cookie::tombstone(name, options));
    }

    /// Whether any rewrite has happened
    pub fn is_dirty(&self) -> bool {
        self.response.iter().next().is_some()
    }

    pub fn into_parts(self) -> (CookieSet, CookieSet) {
        (self.request, self.response)
    }
}
