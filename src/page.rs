//! Splits the sorted posts into pages and assembles the HTML for every page
//! and every standalone post. All markup outside of the posts themselves is
//! literal: a header, a footer, and the configured post wrapper.

use crate::config::Config;
use crate::log;
use crate::post::Post;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::ops::Range;

/// The link back to the newest page.
pub const HOME_LINK: &str = r#"<a href="/">&lt; home</a>"#;

/// The literal markup wrapped around content.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub header: String,
    pub footer: String,
    pub post_opening: String,
    pub post_closing: String,
}

impl Layout {
    /// Reads the header and footer files named by `config`.
    pub fn load(config: &Config) -> io::Result<Layout> {
        Ok(Layout {
            header: fs::read_to_string(&config.header_file)?,
            footer: fs::read_to_string(&config.footer_file)?,
            post_opening: config.post_opening.clone(),
            post_closing: config.post_closing.clone(),
        })
    }

    /// Wraps one post's HTML in the post opening and closing markup.
    pub fn wrap(&self, html: &str) -> String {
        format!("{}{}{}", self.post_opening, html, self.post_closing)
    }

    fn separator(&self) -> String {
        format!("{}{}", self.post_closing, self.post_opening)
    }
}

/// Assigns `count` posts to pages and returns the index range of the posts on
/// each page, newest page first.
///
/// The first page closes after `posts_per_page + 1` posts; every later page
/// closes after `posts_per_page` posts; the last post always closes its page.
/// With 9 posts and a page size of 4 this gives pages of 5 and 4 posts.
pub fn paginate(count: usize, posts_per_page: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    for i in 0..count {
        let placed = i + 1 - start;
        let capacity = if pages.is_empty() {
            posts_per_page + 1
        } else {
            posts_per_page
        };
        if placed == capacity || i == count - 1 {
            pages.push(start..i + 1);
            start = i + 1;
        }
    }
    pages
}

/// The URL path of page `index`. The newest page lives at the root.
fn page_path(index: usize) -> String {
    match index {
        0 => String::from("/"),
        _ => format!("/{}", index),
    }
}

/// Builds the HTML for every page (newest first) and for every post on its
/// own, keyed by file name. `tag_index` is placed under the header of each
/// one; pass an empty string to leave it out.
pub fn build_pages(
    posts: &[Post],
    posts_per_page: usize,
    layout: &Layout,
    tag_index: &str,
) -> (Vec<String>, HashMap<String, String>) {
    let ranges = paginate(posts.len(), posts_per_page);
    let last_page = ranges.len().saturating_sub(1);

    let mut single_posts = HashMap::with_capacity(posts.len());
    let mut pages = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        for (i, post) in posts[range.clone()].iter().enumerate() {
            log!(
                "build";
                "{}: placing {} on page {}/{}",
                range.start + i,
                post.filename,
                index,
                last_page
            );
            single_posts.insert(
                post.filename.clone(),
                single_post_html(post, layout, tag_index),
            );
        }
        pages.push(page_html(&posts[range], index, last_page, layout, tag_index));
    }
    (pages, single_posts)
}

fn page_html(
    posts: &[Post],
    index: usize,
    last_page: usize,
    layout: &Layout,
    tag_index: &str,
) -> String {
    let contents: Vec<&str> = posts.iter().map(|p| p.rendered_content.as_str()).collect();
    let separator = layout.separator();

    let mut blocks: Vec<String> = Vec::with_capacity(8);
    blocks.push(layout.header.clone());
    if !tag_index.is_empty() {
        blocks.push(tag_index.to_owned());
    }
    blocks.push(layout.post_opening.clone());
    blocks.push(contents.join(separator.as_str()));
    blocks.push(layout.post_closing.clone());
    if index > 0 {
        blocks.push(format!(
            r#"<a href="{}">&lt; newer</a>"#,
            page_path(index - 1)
        ));
    }
    if index < last_page {
        blocks.push(format!(
            r#"<a href="{}">older &gt;</a>"#,
            page_path(index + 1)
        ));
    }
    blocks.push(layout.footer.clone());
    blocks.join("\n")
}

fn single_post_html(post: &Post, layout: &Layout, tag_index: &str) -> String {
    let mut blocks: Vec<&str> = Vec::with_capacity(7);
    blocks.push(&layout.header);
    if !tag_index.is_empty() {
        blocks.push(tag_index);
    }
    blocks.push(&layout.post_opening);
    blocks.push(&post.rendered_content);
    blocks.push(&layout.post_closing);
    blocks.push(HOME_LINK);
    blocks.push(&layout.footer);
    blocks.join("\n")
}
