//! Minimal HTTP/1.1 server imitating the Drive download endpoint for integration tests.
//!
//! With a token configured, a request without `confirm=<token>` gets an HTML
//! warning page and a `download_warning_*` cookie; a request with it gets the
//! file. Without a token every request gets the file directly. With
//! `redirect`, `/uc` answers 303 (with a body) to `/download` and the warning
//! cookie is set on that hop. Every request target and its `Cookie` header
//! are recorded for assertions.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

pub const WARNING_COOKIE: &str = "download_warning_13058876669334088843_1ik";
pub const REDIRECT_BODY: &[u8] = b"<html>Moved</html>";

pub const WARNING_PAGE: &[u8] =
    b"<html><body>Google Drive can't scan this file for viruses.</body></html>";

#[derive(Debug, Clone)]
pub struct DriveServerOptions {
    /// Bytes served as the file.
    pub file: Vec<u8>,
    /// When set, unconfirmed requests get the warning page and this cookie value.
    pub token: Option<String>,
    /// Status line for the file response.
    pub status: u16,
    /// Advertise the full length but close the connection after this many body bytes.
    pub truncate_at: Option<usize>,
    /// Extra attributes appended to the warning `Set-Cookie` (e.g. `; Max-Age=0`).
    pub warning_attrs: &'static str,
    /// Send `/uc` through a 303 hop to `/download`.
    pub redirect: bool,
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Path and query.
    pub target: String,
    /// Value of the `Cookie` header, if sent.
    pub cookie: Option<String>,
}

impl DriveServerOptions {
    pub fn direct(file: Vec<u8>) -> Self {
        Self {
            file,
            token: None,
            status: 200,
            truncate_at: None,
            warning_attrs: "",
            redirect: false,
        }
    }

    pub fn confirmed(file: Vec<u8>, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::direct(file)
        }
    }
}

pub struct DriveServer {
    /// Endpoint URL including `?export=download`.
    pub endpoint: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl DriveServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start(opts: DriveServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let opts = Arc::new(opts);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let opts = Arc::clone(&opts);
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || handle(stream, &opts, &recorded));
            }
        });
        Self {
            endpoint: format!("http://127.0.0.1:{}/uc?export=download", port),
            requests,
        }
    }

    /// Request targets (path + query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.recorded().into_iter().map(|r| r.target).collect()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// `Cookie` header of the n-th request.
    pub fn cookie_of(&self, n: usize) -> Option<String> {
        self.recorded()[n].cookie.clone()
    }

    /// Query pairs of the n-th request.
    pub fn query_of(&self, n: usize) -> Vec<(String, String)> {
        let target = &self.requests()[n];
        url::Url::parse(&format!("http://127.0.0.1{}", target))
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8(data).ok()
}

fn handle(mut stream: TcpStream, opts: &DriveServerOptions, recorded: &Mutex<Vec<Recorded>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let target = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let cookie = request.lines().skip(1).find_map(|l| {
        l.split_once(':')
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("cookie"))
            .map(|(_, value)| value.trim().to_string())
    });
    recorded.lock().unwrap().push(Recorded {
        target: target.clone(),
        cookie,
    });

    let confirm = url::Url::parse(&format!("http://127.0.0.1{}", target))
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "confirm")
                .map(|(_, v)| v.into_owned())
        });

    let unconfirmed = opts
        .token
        .as_ref()
        .filter(|token| confirm.as_deref() != Some(token.as_str()));
    let warning_cookie = unconfirmed
        .map(|token| {
            format!(
                "Set-Cookie: NID=511=abc; Path=/; HttpOnly\r\n\
Set-Cookie: {}={}; Path=/; HttpOnly{}\r\n",
                WARNING_COOKIE, token, opts.warning_attrs
            )
        })
        .unwrap_or_default();

    if opts.redirect && target.starts_with("/uc") {
        let location = target.replacen("/uc", "/download", 1);
        let head = format!(
            "HTTP/1.1 303 See Other\r\nLocation: {}\r\n{}\
Content-Length: {}\r\nConnection: close\r\n\r\n",
            location,
            warning_cookie,
            REDIRECT_BODY.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(REDIRECT_BODY);
        return;
    }

    if unconfirmed.is_some() {
        // Behind a redirect the cookie was already set on the hop.
        let cookie_lines = if opts.redirect { "" } else { warning_cookie.as_str() };
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n{}\
Content-Length: {}\r\nConnection: close\r\n\r\n",
            cookie_lines,
            WARNING_PAGE.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(WARNING_PAGE);
        return;
    }

    let reason = match opts.status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Status",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\n\
Content-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason,
        opts.file.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let body = match opts.truncate_at {
        Some(n) => &opts.file[..n.min(opts.file.len())],
        None => &opts.file[..],
    };
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
