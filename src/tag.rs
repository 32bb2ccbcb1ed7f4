//! Defines the [`Tag`] type and the tag extraction logic. Tags aren't declared
//! anywhere; they are `#word` markers written inline in a post's body. See
//! [`extract_tags`] for the marker syntax.

use crate::page::{Layout, HOME_LINK};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// A `#` followed by a letter and at least one more letter or digit.
static TAG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z][A-Za-z0-9]+)").unwrap());

/// Matches a tag name appearing as a URL path segment.
static TAG_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([A-Za-z][A-Za-z0-9]+)").unwrap());

/// Rewrites every tag marker in `html` into a link to the tag's page and
/// returns the rewritten HTML along with the distinct tag names found, in
/// order of first appearance. Names are compared case-insensitively; the
/// casing of the first occurrence is the one returned. Each link keeps the
/// casing of its own occurrence. Markers inside an element's markup, such as
/// the `#note` in `<a href="#note">`, are left alone.
pub fn extract_tags(html: &str) -> (String, Vec<String>) {
    let mut names: Vec<String> = Vec::new();
    let rewritten = TAG_MARKER.replace_all(html, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if inside_markup(&html[..start]) {
            return caps[0].to_owned();
        }
        let name = &caps[1];
        if !names.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
            names.push(name.to_owned());
        }
        format!(r#"<a class="tag" href="/{0}">{0}</a>"#, name)
    });
    (rewritten.into_owned(), names)
}

/// Whether text following `before` sits between a `<` and its `>`.
fn inside_markup(before: &str) -> bool {
    before.rfind('<') > before.rfind('>')
}

/// Finds the first path segment in `path` that looks like a tag name.
pub fn tag_in_path(path: &str) -> Option<&str> {
    TAG_SEGMENT
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The key under which a tag is stored and looked up.
pub fn tag_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// A tag and the posts that mention it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    /// The tag's name as first written.
    pub name: String,

    /// The wrapped HTML of every post mentioning the tag, newest first.
    pub members: Vec<String>,
}

/// Groups post fragments by tag during a single rebuild.
#[derive(Default)]
pub struct TagIndex {
    tags: Vec<Tag>,
    positions: HashMap<String, usize>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragment` to the member list of every tag in `names`.
    pub fn add(&mut self, names: &[String], fragment: &str) {
        for name in names {
            let key = tag_key(name);
            let position = match self.positions.get(&key) {
                Some(&position) => position,
                None => {
                    self.tags.push(Tag {
                        name: name.clone(),
                        members: Vec::new(),
                    });
                    self.positions.insert(key, self.tags.len() - 1);
                    self.tags.len() - 1
                }
            };
            self.tags[position].members.push(fragment.to_owned());
        }
    }

    /// Returns the tags ordered by member count, largest first. Tags with the
    /// same count keep the order in which they were first seen.
    pub fn into_sorted(self) -> Vec<Tag> {
        let mut tags = self.tags;
        tags.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        tags
    }
}

/// Renders the list of tags shown at the top of every page.
pub fn tag_index_fragment(tags: &[Tag]) -> String {
    let mut html = String::from("<section><h3>tags</h3><ol>");
    for tag in tags {
        html.push_str(&format!(
            r#"<li><a href="/{0}">{0}</a> ({1})</li>"#,
            tag.name,
            tag.members.len()
        ));
    }
    html.push_str("</ol></section>");
    html
}

/// Renders the page listing every post of `tag`.
pub fn tag_page_html(tag: &Tag, layout: &Layout, tag_index: &str) -> String {
    let mut blocks: Vec<&str> = Vec::with_capacity(tag.members.len() + 4);
    blocks.push(&layout.header);
    blocks.push(tag_index);
    blocks.extend(tag.members.iter().map(String::as_str));
    blocks.push(HOME_LINK);
    blocks.push(&layout.footer);
    blocks.join("\n")
}
