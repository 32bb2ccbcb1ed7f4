//! Resolves request paths against the live [`SiteIndex`].
//!
//! Resolution order:
//! 1. A `name.md` segment naming an existing post → the post's page
//! 2. A tag-like segment naming an existing tag → the tag's page
//! 3. A leading number → that page of the stream (page 0 when absent)
//! 4. Nothing found → 404

use crate::build::SiteIndex;
use crate::log;
use crate::site::Site;
use crate::tag::tag_in_path;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static POST_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([A-Za-z0-9_]+\.md)").unwrap());

static PAGE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/([0-9]+)").unwrap());

static BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

const FAVICON: &str = "/favicon.ico";
const REBUILD: &str = "/rebuild";
const NOT_FOUND: &str = "404";

/// The outcome of routing one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The request isn't answered with content (e.g., `/favicon.ico`).
    Ignored,

    /// The HTML for the requested page.
    Found(String),

    /// Nothing matched the request.
    NotFound,
}

impl Response {
    /// The HTTP status code for the response.
    pub fn status(&self) -> u16 {
        match self {
            Response::Ignored => 204,
            Response::Found(_) => 200,
            Response::NotFound => 404,
        }
    }

    /// The response body.
    pub fn body(&self) -> &str {
        match self {
            Response::Ignored => "",
            Response::Found(html) => html.as_str(),
            Response::NotFound => NOT_FOUND,
        }
    }
}

/// Handles one request for `target` (the request line's path and query).
/// `/rebuild` rebuilds the site first and is then resolved like any other
/// path.
pub fn handle(site: &Site, target: &str) -> Response {
    let path = request_path(target);
    if path == FAVICON {
        return Response::Ignored;
    }
    log!("serve"; "Requested: {}", target);

    if path == REBUILD {
        if let Err(err) = site.rebuild() {
            log!("error"; "rebuild failed: {}", err);
        }
    }
    resolve(&path, &site.index())
}

/// Resolves `path` against `index`. Post file names are tried before tag
/// names, and both before page numbers.
pub fn resolve(path: &str, index: &SiteIndex) -> Response {
    if let Some(html) = post_in_path(path).and_then(|filename| index.post(filename)) {
        return Response::Found(html.to_owned());
    }

    if let Some(html) = tag_in_path(path).and_then(|name| index.tag(name)) {
        return Response::Found(html.to_owned());
    }

    match index.page(page_in_path(path).unwrap_or(0)) {
        Some(html) => Response::Found(html.to_owned()),
        None => Response::NotFound,
    }
}

/// Strips the query string and fragment from a request target.
fn request_path(target: &str) -> String {
    match BASE.join(target) {
        Ok(url) => url.path().to_owned(),
        Err(_) => target.split('?').next().unwrap_or(target).to_owned(),
    }
}

fn post_in_path(path: &str) -> Option<&str> {
    POST_SEGMENT
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn page_in_path(path: &str) -> Option<usize> {
    PAGE_SEGMENT
        .captures(path)
        .and_then(|caps| caps[1].parse().ok())
}
