//! Response status and cookies, accumulated from raw header lines.

use crate::cookie::CookieJar;

/// What the headers told us by the time the body starts.
///
/// With redirects followed, header lines of every hop arrive in order: the
/// status reflects the latest hop, cookies accumulate across all of them.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    status: Option<u32>,
    content_length: Option<u64>,
    cookies: CookieJar,
}

impl ResponseHead {
    /// Feed one header line as delivered by curl (CRLF included).
    pub fn push_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            self.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse().ok());
            self.content_length = None;
            return;
        }
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("set-cookie") {
            self.cookies.insert_set_cookie(value);
        } else if name.eq_ignore_ascii_case("content-length") {
            self.content_length = value.parse().ok();
        }
    }

    pub fn status(&self) -> Option<u32> {
        self.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}
