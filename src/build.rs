//! Exports the [`build_site_index`] function which stitches together the
//! high-level steps of a rebuild: loading the posts ([`crate::post`]),
//! linking and grouping their tags ([`crate::tag`]), and paginating them into
//! HTML ([`crate::page`]). The result is a [`SiteIndex`], which holds every
//! servable artifact in memory.

use crate::config::Config;
use crate::log;
use crate::page::{build_pages, Layout};
use crate::post::{load_posts, Error as LoadError, Post};
use crate::tag::{extract_tags, tag_index_fragment, tag_key, tag_page_html, TagIndex};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// The complete output of one rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteIndex {
    /// The rendered pages, newest first. Page 0 is served at `/`.
    pub pages: Vec<String>,

    /// Each post's standalone page, keyed by file name.
    pub single_posts: HashMap<String, String>,

    /// Each tag's page, keyed by lowercased tag name.
    pub tags: HashMap<String, String>,

    /// The tag list shown on every page.
    pub tag_index: String,
}

impl SiteIndex {
    /// Looks up a standalone post page by file name.
    pub fn post(&self, filename: &str) -> Option<&str> {
        self.single_posts.get(filename).map(String::as_str)
    }

    /// Looks up a tag page. Tag names match case-insensitively.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(&tag_key(name)).map(String::as_str)
    }

    /// Looks up a page by index.
    pub fn page(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }
}

/// Builds a fresh [`SiteIndex`] from the files named by `config`.
pub fn build_site_index(config: &Config) -> Result<SiteIndex> {
    let layout = Layout::load(config).map_err(|err| Error::ReadLayout {
        path: config
            .header_file
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_default(),
        err,
    })?;

    let posts = load_posts(&config.posts_directory)?;
    log!("build"; "Reading {} posts...", posts.len());
    Ok(index_posts(posts, &layout, config.posts_per_page, config.tags))
}

/// Links tags and assembles every page for `posts`, which must already be
/// sorted newest first. When `tags` is false, tag markers are left as they
/// are and no tag pages or tag list are produced.
pub fn index_posts(
    posts: Vec<Post>,
    layout: &Layout,
    posts_per_page: usize,
    tags: bool,
) -> SiteIndex {
    if !tags {
        let (pages, single_posts) = build_pages(&posts, posts_per_page, layout, "");
        return SiteIndex {
            pages,
            single_posts,
            ..SiteIndex::default()
        };
    }

    let mut tag_index = TagIndex::new();
    let posts: Vec<Post> = posts
        .into_iter()
        .map(|post| {
            let (html, names) = extract_tags(&post.rendered_content);
            tag_index.add(&names, &layout.wrap(&html));
            post.with_rendered_content(html)
        })
        .collect();

    let tags = tag_index.into_sorted();
    let fragment = tag_index_fragment(&tags);
    let tag_pages = tags
        .iter()
        .map(|tag| (tag_key(&tag.name), tag_page_html(tag, layout, &fragment)))
        .collect();

    let (pages, single_posts) = build_pages(&posts, posts_per_page, layout, &fragment);
    SiteIndex {
        pages,
        single_posts,
        tags: tag_pages,
        tag_index: fragment,
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a rebuild. Errors can come from reading the layout or
/// from loading posts.
#[derive(Debug)]
pub enum Error {
    /// Returned when the header or footer file can't be read.
    ReadLayout { path: PathBuf, err: std::io::Error },

    /// Returned for errors loading posts.
    Load(LoadError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadLayout { path, err } => {
                write!(f, "Reading layout '{}': {}", path.display(), err)
            }
            Error::Load(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadLayout { path: _, err } => Some(err),
            Error::Load(err) => Some(err),
        }
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::router::{resolve, Response};
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::Path;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn layout() -> Layout {
        Layout {
            header: String::from("<header>"),
            footer: String::from("<footer>"),
            post_opening: String::from("<article>"),
            post_closing: String::from("</article>"),
        }
    }

    fn post(filename: &str, html: &str, secs: i64) -> Post {
        Post {
            filename: filename.to_owned(),
            raw_content: String::new(),
            rendered_content: html.to_owned(),
            mod_time: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn project(root: &Path) -> std::io::Result<()> {
        fs::create_dir_all(root.join("layout").join("default"))?;
        fs::create_dir_all(root.join("posts"))?;
        fs::write(root.join("layout/default/header.html"), "<html><body>")?;
        fs::write(root.join("layout/default/footer.html"), "</body></html>")?;
        Ok(())
    }

    #[test]
    fn test_golang_tag_round_trip() {
        let posts = vec![post("go.md", "<p>#golang is fun #golang</p>", 1)];
        let index = index_posts(posts, &layout(), 4, true);

        assert_eq!(index.tags.len(), 1);
        let tag_page = index.tag("golang").unwrap();
        assert_eq!(tag_page.matches("<article>").count(), 1);

        let single = index.post("go.md").unwrap();
        let link = r#"<a class="tag" href="/golang">golang</a>"#;
        assert_eq!(single.matches(link).count(), 2);
        assert!(index
            .tag_index
            .contains(r#"<li><a href="/golang">golang</a> (1)</li>"#));
    }

    #[test]
    fn test_tag_page_lists_every_member() {
        let posts = vec![
            post("b.md", "<p>#rust again</p>", 2),
            post("a.md", "<p>#Rust and #go</p>", 1),
        ];
        let index = index_posts(posts, &layout(), 4, true);

        let rust = index.tag("RUST").unwrap();
        assert!(rust.contains("<article><p><a class=\"tag\" href=\"/rust\">rust</a> again</p></article>"));
        assert!(rust.contains("<article><p><a class=\"tag\" href=\"/Rust\">Rust</a> and"));
        assert!(index.tag_index.starts_with(
            r#"<section><h3>tags</h3><ol><li><a href="/rust">rust</a> (2)</li><li><a href="/go">go</a> (1)</li>"#
        ));
    }

    #[test]
    fn test_tags_disabled() {
        let posts = vec![post("a.md", "<p>#rust</p>", 1)];
        let index = index_posts(posts, &layout(), 4, false);

        assert!(index.tags.is_empty());
        assert!(index.tag_index.is_empty());
        assert!(index.page(0).unwrap().contains("<p>#rust</p>"));
        assert!(!index.page(0).unwrap().contains("<section>"));
    }

    #[test]
    fn test_build_site_index_is_idempotent() -> TestResult {
        let root = tempfile::tempdir()?;
        project(root.path())?;
        for i in 0..6 {
            fs::write(
                root.path().join("posts").join(format!("post{}.md", i)),
                format!("Post {} #tag{}", i, i % 2),
            )?;
        }
        let config = Config::from_directory(root.path())?;

        let first = build_site_index(&config)?;
        let second = build_site_index(&config)?;
        assert_eq!(first, second);
        assert_eq!(first.pages.len(), 2);
        assert_eq!(first.single_posts.len(), 6);
        assert!(first.page(0).unwrap().starts_with("<html><body>\n<section>"));
        Ok(())
    }

    #[test]
    fn test_post_named_like_a_tag() -> TestResult {
        let root = tempfile::tempdir()?;
        project(root.path())?;
        fs::write(root.path().join("posts/tag.md"), "All about #tag")?;
        let index = build_site_index(&Config::from_directory(root.path())?)?;

        let post = index.post("tag.md").unwrap();
        let tag_page = index.tag("tag").unwrap();
        assert_ne!(post, tag_page);
        assert!(post.contains(r#"<a href="/">&lt; home</a>"#));
        assert!(tag_page.contains(r#"<a class="tag" href="/tag">tag</a>"#));

        assert_eq!(resolve("/tag.md", &index), Response::Found(post.to_owned()));
        assert_eq!(resolve("/tag", &index), Response::Found(tag_page.to_owned()));
        Ok(())
    }

    #[test]
    fn test_build_site_index_missing_layout() -> TestResult {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join("posts"))?;
        let config = Config::from_directory(root.path())?;

        match build_site_index(&config) {
            Err(Error::ReadLayout { .. }) => Ok(()),
            other => panic!("wanted ReadLayout error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_build_site_index_missing_posts_directory() -> TestResult {
        let root = tempfile::tempdir()?;
        project(root.path())?;
        fs::remove_dir(root.path().join("posts"))?;
        let config = Config::from_directory(root.path())?;

        assert!(matches!(build_site_index(&config), Err(Error::Load(_))));
        Ok(())
    }
}
