//! Holds the live [`SiteIndex`] and rebuilds it on demand.
//!
//! Readers load the current index without locking; a rebuild computes a new
//! index on the side and swaps it in with a single atomic store. Only one
//! rebuild runs at a time: a request arriving while one is in flight is
//! dropped, and the caller keeps seeing the previous index.

use crate::build::{build_site_index, Error, SiteIndex};
use crate::config::Config;
use crate::log;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happened to a rebuild request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rebuild {
    /// A new index was built and published.
    Rebuilt,

    /// Another rebuild was already running; nothing was done.
    Skipped,
}

pub struct Site {
    config: Config,
    index: ArcSwap<SiteIndex>,
    rebuilding: AtomicBool,
}

impl Site {
    /// Creates a site with an empty index. Call [`Site::rebuild`] to populate
    /// it.
    pub fn new(config: Config) -> Site {
        Site {
            config,
            index: ArcSwap::from_pointee(SiteIndex::default()),
            rebuilding: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the live index. The returned value stays valid even if a
    /// rebuild replaces it in the meantime.
    pub fn index(&self) -> Arc<SiteIndex> {
        self.index.load_full()
    }

    /// Rebuilds the index from scratch and publishes it. On error the
    /// previous index stays live.
    pub fn rebuild(&self) -> Result<Rebuild, Error> {
        self.rebuild_with(|| build_site_index(&self.config))
    }

    fn rebuild_with<F>(&self, build: F) -> Result<Rebuild, Error>
    where
        F: FnOnce() -> Result<SiteIndex, Error>,
    {
        if self
            .rebuilding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log!("build"; "Rebuild already triggered. Aborting");
            return Ok(Rebuild::Skipped);
        }
        let _guard = RebuildGuard(&self.rebuilding);

        log!("build"; "Rebuilding...");
        let index = build()?;
        self.index.store(Arc::new(index));
        log!("build"; "Done");
        Ok(Rebuild::Rebuilt)
    }
}

/// Clears the rebuilding flag when the rebuild ends, successfully or not.
struct RebuildGuard<'a>(&'a AtomicBool);

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            posts_directory: PathBuf::from("./does/not/exist/posts"),
            header_file: PathBuf::from("./does/not/exist/header.html"),
            footer_file: PathBuf::from("./does/not/exist/footer.html"),
            post_opening: String::from("<article>"),
            post_closing: String::from("</article>"),
            posts_per_page: 4,
            tags: true,
            address: String::from("127.0.0.1:0"),
        }
    }

    fn index(page: &str) -> SiteIndex {
        SiteIndex {
            pages: vec![page.to_owned()],
            ..SiteIndex::default()
        }
    }

    #[test]
    fn test_rebuild_publishes_new_index() -> Result<(), Error> {
        let site = Site::new(config());
        assert!(site.index().pages.is_empty());

        assert_eq!(site.rebuild_with(|| Ok(index("one")))?, Rebuild::Rebuilt);
        assert_eq!(site.index().page(0), Some("one"));
        Ok(())
    }

    #[test]
    fn test_reentrant_rebuild_is_skipped() -> Result<(), Error> {
        let site = Site::new(config());
        let outcome = site.rebuild_with(|| {
            let inner = site.rebuild_with(|| Ok(index("inner")));
            assert_eq!(inner.unwrap(), Rebuild::Skipped);
            Ok(index("outer"))
        })?;

        assert_eq!(outcome, Rebuild::Rebuilt);
        assert_eq!(site.index().page(0), Some("outer"));
        Ok(())
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_index() -> Result<(), Error> {
        let site = Site::new(config());
        site.rebuild_with(|| Ok(index("good")))?;
        let old = site.index();

        assert!(site.rebuild().is_err());
        assert_eq!(site.index(), old);

        // the guard is released after a failure
        assert_eq!(site.rebuild_with(|| Ok(index("again")))?, Rebuild::Rebuilt);
        Ok(())
    }

    #[test]
    fn test_rebuild_reads_project() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join("layout/default"))?;
        fs::create_dir_all(root.path().join("posts"))?;
        fs::write(root.path().join("layout/default/header.html"), "<h1>blog</h1>")?;
        fs::write(root.path().join("layout/default/footer.html"), "<hr>")?;
        fs::write(root.path().join("posts/hello.md"), "Hello")?;

        let site = Site::new(Config::from_directory(root.path())?);
        site.rebuild()?;
        assert!(site.index().post("hello.md").is_some());

        fs::remove_file(root.path().join("posts/hello.md"))?;
        site.rebuild()?;
        assert!(site.index().post("hello.md").is_none());
        assert!(site.index().page(0).is_none());
        Ok(())
    }

    #[test]
    fn test_site_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Site>();
    }
}
