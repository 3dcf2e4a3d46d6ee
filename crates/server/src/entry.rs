#![forbid(unsafe_code)]

use crate::service::ImportService;
use crate::{ops, wire};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

/// Newline-delimited JSON over stdio: one request object per line, one
/// response object per line. The web layer in front of this process owns
/// HTTP; this loop owns dispatch.
pub fn run_stdio(service: &mut ImportService) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(request) => handle_request(service, request),
            Err(err) => wire::err("PARSE_ERROR", 400, format!("invalid JSON: {err}")),
        };

        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, &response)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        out.write_all(b"\n")?;
        out.flush()?;
    }
}

/// Arguments may sit under an `args` object or flat on the request itself;
/// the scraping extension sends them flat.
pub fn handle_request(service: &mut ImportService, request: Value) -> Value {
    let Some(op) = request.get("op").and_then(Value::as_str) else {
        return wire::err("INVALID_REQUEST", 400, "missing op");
    };
    let op = op.to_string();
    let nested = request
        .get("args")
        .filter(|args| args.is_object())
        .cloned();
    let args = nested.unwrap_or(request);
    ops::dispatch(service, &op, args)
}
