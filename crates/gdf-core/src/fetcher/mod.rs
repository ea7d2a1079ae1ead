//! Drive download with the large-file confirmation round-trip.
//!
//! Uses the curl crate (libcurl) easy interface. One `Session` owns one easy
//! handle with curl's in-memory cookie engine enabled, so cookies from the
//! first response are sent back on the confirmation request without any
//! process-wide state.

mod head;
mod sink;

pub use head::ResponseHead;

use crate::config::FetchConfig;
use crate::cookie::{ConfirmToken, CookieJar};
use crate::error::{FetchError, Stage};
use crate::request::{confirm_url, initial_url, DownloadRequest, FileId};
use sink::BodySink;
use std::cell::RefCell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

/// Progress notifications, emitted in procedure order.
#[derive(Debug)]
pub enum FetchEvent<'a> {
    /// About to send the initial request.
    Connecting { id: &'a FileId },
    /// The initial response carried a `download_warning*` cookie.
    TokenFound(&'a ConfirmToken),
    /// About to send the confirmation request.
    ConfirmDownload,
    /// No token; the initial response body was the file.
    DirectDownload,
}

/// Result of a completed fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Token used for the second request; `None` for a direct download.
    pub token: Option<ConfirmToken>,
    /// Bytes written to the destination.
    pub bytes: u64,
}

/// HTTP session scoped to one caller: a configured easy handle plus endpoint.
pub struct Session {
    easy: curl::easy::Easy,
    endpoint: Url,
    chunk_size: usize,
}

impl Session {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|source| FetchError::Endpoint {
            url: config.endpoint.clone(),
            source,
        })?;

        let mut easy = curl::easy::Easy::new();
        // Empty path: enable the cookie engine without reading any file.
        easy.cookie_file("")?;
        easy.useragent(&config.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(config.max_redirections)?;
        easy.buffer_size(config.chunk_size)?;
        easy.connect_timeout(Duration::from_secs(config.connect_timeout_secs))?;
        easy.low_speed_limit(config.low_speed_limit)?;
        easy.low_speed_time(Duration::from_secs(config.low_speed_time_secs))?;

        Ok(Self {
            easy,
            endpoint,
            chunk_size: config.chunk_size,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Cookies held by the session's cookie engine, expired entries dropped.
    pub fn cookie_jar(&mut self) -> Result<CookieJar, FetchError> {
        let list = self.easy.cookies()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let mut jar = CookieJar::new();
        for line in list.iter() {
            jar.insert_netscape_line(&String::from_utf8_lossy(line), now);
        }
        Ok(jar)
    }

    /// One GET. `keep_body` is asked once, when the first body chunk arrives,
    /// whether the body goes to `sink` or is dropped.
    fn get<F>(
        &mut self,
        url: &Url,
        stage: Stage,
        sink: &mut BodySink<'_>,
        keep_body: F,
    ) -> Result<ResponseHead, FetchError>
    where
        F: Fn(&ResponseHead) -> bool,
    {
        tracing::debug!("{} GET {}", stage, url);
        self.easy.url(url.as_str())?;

        let head = RefCell::new(ResponseHead::default());
        let performed = {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|line| {
                head.borrow_mut().push_line(line);
                true
            })?;
            transfer.write_function(|data| {
                if sink.is_undecided() {
                    let keep = keep_body(&*head.borrow());
                    sink.decide(keep);
                }
                // Short count makes curl abort with a write error.
                Ok(if sink.write(data) { data.len() } else { 0 })
            })?;
            transfer.perform()
        };
        let head = head.into_inner();

        if let Some(source) = sink.take_error() {
            return Err(FetchError::Io {
                path: sink.destination().to_path_buf(),
                source,
            });
        }
        performed.map_err(|source| FetchError::Transport { stage, source })?;

        let status = self
            .easy
            .response_code()
            .map_err(|source| FetchError::Transport { stage, source })?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Http { stage, status });
        }
        Ok(head)
    }
}

fn finish_direct(sink: BodySink<'_>, id: &FileId) -> Result<FetchOutcome, FetchError> {
    let destination = sink.destination();
    let bytes = sink.finish().map_err(|source| FetchError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "direct download of {} complete: {} bytes to {}",
        id,
        bytes,
        destination.display()
    );
    Ok(FetchOutcome { token: None, bytes })
}

/// Download `request` without progress reporting.
pub fn fetch(session: &mut Session, request: &DownloadRequest) -> Result<FetchOutcome, FetchError> {
    fetch_with(session, request, |_| {})
}

/// Download `request`, calling `on_event` at each step.
///
/// Without a confirmation cookie the initial body is streamed to the
/// destination as it arrives. With one, the initial body (the warning page)
/// is dropped and the confirmation response is streamed instead. If the
/// session's cookie engine rejected the announced cookie (past `Expires`,
/// foreign `Domain`), the initial URL is requested once more and its body
/// written. A failure mid-transfer may leave a partial destination file behind.
pub fn fetch_with<F>(
    session: &mut Session,
    request: &DownloadRequest,
    mut on_event: F,
) -> Result<FetchOutcome, FetchError>
where
    F: FnMut(FetchEvent<'_>),
{
    let id = request.id();
    let destination = request.destination();
    let io_err = |source: std::io::Error| FetchError::Io {
        path: destination.to_path_buf(),
        source,
    };

    on_event(FetchEvent::Connecting { id });
    let url = initial_url(session.endpoint(), id);
    let mut first = BodySink::new(destination, session.chunk_size);
    let head = session.get(&url, Stage::Initial, &mut first, |h| {
        h.is_success() && h.cookies().confirm_token().is_none()
    })?;

    let Some(announced) = head.cookies().confirm_token() else {
        on_event(FetchEvent::DirectDownload);
        return finish_direct(first, id);
    };
    drop(first);

    // Headers only show Max-Age deletions; the cookie engine also applies
    // Expires and Domain rules, and its jar is what gets sent back.
    let kept = session.cookie_jar()?;
    let Some(token) = kept.confirm_token_named(announced.name()) else {
        tracing::warn!(
            "{} was not kept by the session; requesting {} without confirmation",
            announced.name(),
            id
        );
        let mut reread = BodySink::new(destination, session.chunk_size);
        session.get(&url, Stage::Initial, &mut reread, ResponseHead::is_success)?;
        on_event(FetchEvent::DirectDownload);
        return finish_direct(reread, id);
    };

    tracing::info!("confirmation token found for {}", id);
    on_event(FetchEvent::TokenFound(&token));
    on_event(FetchEvent::ConfirmDownload);

    let url = confirm_url(session.endpoint(), id, &token);
    let mut second = BodySink::new(destination, session.chunk_size);
    let head = session.get(&url, Stage::Confirm, &mut second, ResponseHead::is_success)?;
    let bytes = second.finish().map_err(io_err)?;
    if let Some(expected) = head.content_length() {
        if expected != bytes {
            tracing::warn!("content-length {} but wrote {} bytes", expected, bytes);
        }
    }
    tracing::info!(
        "confirmed download of {} complete: {} bytes to {}",
        id,
        bytes,
        destination.display()
    );
    Ok(FetchOutcome {
        token: Some(token),
        bytes,
    })
}
