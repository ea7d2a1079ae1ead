//! Cookies set by the first response and the confirmation token hidden in them.
//!
//! Drive answers a request for a file above its virus-scan size limit with an
//! HTML warning page and a `download_warning_<suffix>` cookie. The cookie value
//! must be sent back as `confirm=<value>` to get the actual bytes.

/// Cookie name prefix that marks the large-file warning.
pub const CONFIRM_COOKIE_PREFIX: &str = "download_warning";

/// A non-empty `download_warning*` cookie, sent back as the `confirm` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmToken {
    name: String,
    value: String,
}

impl ConfirmToken {
    /// Full cookie name, suffix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ConfirmToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Name/value pairs in the order the server first set them.
/// A later `Set-Cookie` for the same name replaces the value in place;
/// one with `Max-Age<=0` removes it.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one cookie, replacing any earlier value with the same name.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.cookies.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.cookies.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.cookies.retain(|(n, _)| n != name);
    }

    /// Parse the value of a `Set-Cookie` header (everything after the colon).
    /// Only `Max-Age` is interpreted; a past `Expires` date is left to the
    /// session's cookie engine (see [`CookieJar::insert_netscape_line`]).
    pub fn insert_set_cookie(&mut self, header_value: &str) {
        let mut parts = header_value.split(';');
        let pair = parts.next().unwrap_or("");
        let Some((name, value)) = pair.split_once('=') else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let deleted = parts.any(|attr| {
            attr.split_once('=').is_some_and(|(k, v)| {
                k.trim().eq_ignore_ascii_case("max-age")
                    && v.trim().parse::<i64>().is_ok_and(|secs| secs <= 0)
            })
        });
        if deleted {
            self.remove(name);
            return;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        self.insert(name, value);
    }

    /// Parse one line of curl's cookie list (Netscape format:
    /// `domain  tailmatch  path  secure  expires  name  value`, tab separated).
    /// Entries whose expiry (unix seconds, 0 = session) is not after `now` are skipped.
    pub fn insert_netscape_line(&mut self, line: &str, now: u64) {
        let fields: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect();
        if fields.len() < 6 {
            return;
        }
        let expires = fields[4].parse::<u64>().unwrap_or(0);
        if expires != 0 && expires <= now {
            return;
        }
        self.insert(fields[5], fields.get(6).copied().unwrap_or(""));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// The `download_warning*` cookie called `name`, if present and non-empty.
    pub fn confirm_token_named(&self, name: &str) -> Option<ConfirmToken> {
        if !name.starts_with(CONFIRM_COOKIE_PREFIX) {
            return None;
        }
        self.get(name)
            .filter(|value| !value.is_empty())
            .map(|value| ConfirmToken {
                name: name.to_string(),
                value: value.to_string(),
            })
    }

    /// First non-empty cookie whose name starts with `download_warning`, if any.
    pub fn confirm_token(&self) -> Option<ConfirmToken> {
        self.iter()
            .find(|(name, value)| name.starts_with(CONFIRM_COOKIE_PREFIX) && !value.is_empty())
            .map(|(name, value)| ConfirmToken {
                name: name.to_string(),
                value: value.to_string(),
            })
    }
}
