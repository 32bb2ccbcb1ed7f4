//! The library code for the `blogd` blog engine. A build turns a directory of
//! Markdown posts into an in-memory [`crate::build::SiteIndex`], which is then
//! served over HTTP. The architecture can be broken down into these steps:
//!
//! 1. Loading posts from source files on disk ([`crate::post`])
//! 2. Rewriting inline `#tag` markers and grouping posts by tag
//!    ([`crate::tag`])
//! 3. Paginating the posts and assembling the HTML for every page, post and
//!    tag ([`crate::page`], [`crate::build`])
//! 4. Publishing the result and answering requests against it
//!    ([`crate::site`], [`crate::router`], [`crate::serve`])
//!
//! Every rebuild is a full recomputation. The live index is replaced
//! wholesale, so a request never observes a half-built site.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod logger;
pub mod markdown;
pub mod page;
pub mod post;
pub mod router;
pub mod serve;
pub mod site;
pub mod tag;
pub mod watch;
