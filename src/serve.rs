//! The HTTP front end, built on `tiny_http`. Requests are handled one at a
//! time on the calling thread; every response is HTML produced by
//! [`crate::router`].

use crate::log;
use crate::router;
use crate::site::Site;
use anyhow::{anyhow, Result};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Binds an HTTP server to `address` (e.g., `127.0.0.1:1337`).
pub fn bind(address: &str) -> Result<Server> {
    Server::http(address).map_err(|e| anyhow!("Binding to {}: {}", address, e))
}

/// Answers requests from `server` against `site` until the server shuts down.
pub fn run(server: &Server, site: &Site) {
    for request in server.incoming_requests() {
        if let Err(e) = respond(site, request) {
            log!("serve"; "request error: {}", e);
        }
    }
}

fn respond(site: &Site, request: Request) -> Result<()> {
    let routed = router::handle(site, request.url());
    let status = routed.status();
    let content_type = Header::from_bytes("Content-Type", "text/html; charset=utf-8")
        .map_err(|_| anyhow!("invalid Content-Type header"))?;

    let response = Response::from_string(routed.body())
        .with_status_code(StatusCode(status))
        .with_header(content_type);
    request.respond(response)?;

    if routed != router::Response::Ignored {
        log!("serve"; "Served {}", status);
    }
    Ok(())
}
