//! Minimal HTTP/1.1 stand-in for the PAN-OS XML API, for integration tests.
//!
//! Answers form-encoded POSTs to `/api/` for `type=keygen` and
//! `type=op` with `<test><url>…</url></test>`. Every response closes the
//! connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cr&t pass=word";
pub const API_KEY: &str = "LUFRPT1TEST==";

/// Starts a server in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A base URL nothing listens on.
pub fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some((request_line, body)) = read_request(&mut stream) else {
        return;
    };
    let (status, xml) = if request_line.starts_with("POST /api/ ") {
        let fields: HashMap<String, String> = url::form_urlencoded::parse(&body)
            .into_owned()
            .collect();
        respond(&fields)
    } else {
        ("404 Not Found", String::new())
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        xml.len(),
        xml
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Returns (request line, body) once headers and `Content-Length` bytes are in.
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let request_line = head.lines().next().unwrap_or("").to_string();
    Some((request_line, buf[header_end..].to_vec()))
}

fn respond(fields: &HashMap<String, String>) -> (&'static str, String) {
    let field = |k: &str| fields.get(k).map(String::as_str).unwrap_or("");
    match field("type") {
        "keygen" => {
            if field("user") == USERNAME && field("password") == PASSWORD {
                (
                    "200 OK",
                    format!(
                        "<response status=\"success\"><result><key>{}</key></result></response>",
                        API_KEY
                    ),
                )
            } else {
                forbidden("Invalid credentials.")
            }
        }
        "op" => {
            if field("key") != API_KEY {
                return forbidden("Invalid Credential");
            }
            let cmd = field("cmd");
            if cmd == "<show><system><info></info></system></show>" {
                return (
                    "200 OK",
                    "<response status=\"success\"><result><system><hostname>stub-fw</hostname></system></result></response>".to_string(),
                );
            }
            let Some(url) = cmd
                .strip_prefix("<test><url>")
                .and_then(|s| s.strip_suffix("</url></test>"))
            else {
                return ("200 OK", error_lines("invalid command"));
            };
            ("200 OK", test_url(&unescape(url)))
        }
        _ => ("400 Bad Request", String::new()),
    }
}

fn test_url(url: &str) -> String {
    match url {
        "bad url" => error_lines("test -> url is invalid"),
        "empty.example" => "<response status=\"success\"><result/></response>".to_string(),
        "oneline.example" => format!(
            "<response status=\"success\"><result>{} news (Base db)</result></response>",
            escape(url)
        ),
        _ => {
            let (local, cloud) = if url.contains("shop") {
                ("shopping", "online-storage-and-backup")
            } else {
                ("news", "news")
            };
            let u = escape(url);
            format!(
                "<response status=\"success\"><result>{u} {local} low-risk (Base db) expires in 5 seconds\n{u} {cloud} low-risk (Cloud db)</result></response>"
            )
        }
    }
}

fn forbidden(msg: &str) -> (&'static str, String) {
    (
        "403 Forbidden",
        format!(
            "<response status=\"error\" code=\"403\"><result><msg>{}</msg></result></response>",
            msg
        ),
    )
}

fn error_lines(line: &str) -> String {
    format!(
        "<response status=\"error\" code=\"17\"><msg><line><![CDATA[ {} ]]></line></msg></response>",
        line
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
