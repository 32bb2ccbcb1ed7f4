//! Loads the project configuration from `blogd.yaml`. The file is optional;
//! every key falls back to a default when it (or the whole file) is missing.

use crate::log;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "blogd.yaml";
const POSTS_DIRECTORY: &str = "posts";
const LAYOUT_DIRECTORY: &str = "layout";
const HEADER_FILE: &str = "header.html";
const FOOTER_FILE: &str = "footer.html";

#[derive(Deserialize)]
struct PostsPerPage(usize);
impl Default for PostsPerPage {
    fn default() -> Self {
        PostsPerPage(4)
    }
}

#[derive(Deserialize)]
struct LayoutName(String);
impl Default for LayoutName {
    fn default() -> Self {
        LayoutName(String::from("default"))
    }
}

#[derive(Deserialize)]
struct PostOpening(String);
impl Default for PostOpening {
    fn default() -> Self {
        PostOpening(String::from("<article>\n"))
    }
}

#[derive(Deserialize)]
struct PostClosing(String);
impl Default for PostClosing {
    fn default() -> Self {
        PostClosing(String::from("</article>\n"))
    }
}

#[derive(Deserialize)]
struct Tags(bool);
impl Default for Tags {
    fn default() -> Self {
        Tags(true)
    }
}

#[derive(Deserialize)]
struct Address(String);
impl Default for Address {
    fn default() -> Self {
        Address(String::from("127.0.0.1:1337"))
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Project {
    #[serde(default)]
    layout_name: LayoutName,

    #[serde(default)]
    post_opening: PostOpening,

    #[serde(default)]
    post_closing: PostClosing,

    #[serde(default)]
    posts_per_page: PostsPerPage,

    #[serde(default)]
    tags: Tags,

    #[serde(default)]
    address: Address,
}

/// An empty file (or one holding only whitespace or comments) means "all
/// defaults" rather than a parse error.
fn parse_project(contents: &str) -> serde_yaml::Result<Project> {
    let blank = contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if blank {
        Ok(Project::default())
    } else {
        serde_yaml::from_str(contents)
    }
}

/// The resolved configuration for one project directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The directory scanned for `*.md` posts.
    pub posts_directory: PathBuf,

    /// The literal HTML prepended to every page.
    pub header_file: PathBuf,

    /// The literal HTML appended to every page.
    pub footer_file: PathBuf,

    /// Markup opening each post.
    pub post_opening: String,

    /// Markup closing each post.
    pub post_closing: String,

    /// The configured page size. The first page may hold one more post than
    /// this; see [`crate::page::paginate`].
    pub posts_per_page: usize,

    /// Whether `#tag` markers are extracted and tag pages are served.
    pub tags: bool,

    /// The address the HTTP server binds to.
    pub address: String,
}

impl Config {
    /// Loads `blogd.yaml` from `root` if it exists, otherwise uses the
    /// defaults. Either way, paths are resolved relative to `root`.
    pub fn from_directory(root: &Path) -> Result<Config> {
        let path = root.join(CONFIG_FILE);
        let project = if path.is_file() {
            log!("config"; "Setting config parameters from {}", CONFIG_FILE);
            let contents = fs::read_to_string(&path)
                .map_err(|e| anyhow!("Opening config file `{}`: {}", path.display(), e))?;
            parse_project(&contents)
                .map_err(|e| anyhow!("Loading configuration `{}`: {}", path.display(), e))?
        } else {
            log!("config"; "No {} found", CONFIG_FILE);
            Project::default()
        };
        Config::from_project(root, project)
    }

    fn from_project(root: &Path, project: Project) -> Result<Config> {
        if project.posts_per_page.0 == 0 {
            return Err(anyhow!("`postsPerPage` must be greater than zero"));
        }
        let layout_directory = root.join(LAYOUT_DIRECTORY).join(&project.layout_name.0);
        Ok(Config {
            posts_directory: root.join(POSTS_DIRECTORY),
            header_file: layout_directory.join(HEADER_FILE),
            footer_file: layout_directory.join(FOOTER_FILE),
            post_opening: project.post_opening.0,
            post_closing: project.post_closing.0,
            posts_per_page: project.posts_per_page.0,
            tags: project.tags.0,
            address: project.address.0,
        })
    }

    /// The markup placed between two consecutive posts on a page.
    pub fn post_separator(&self) -> String {
        format!("{}{}", self.post_closing, self.post_opening)
    }
}
