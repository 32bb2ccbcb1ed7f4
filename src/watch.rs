//! Watches the posts directory and reports posts being added, removed or
//! renamed. Edits to an existing post's contents are not reported.

use crate::log;
use crate::post::is_post_file_name;
use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

/// Keeps the subscription alive. Dropping it stops the notifications.
pub struct PostsWatcher {
    _watcher: RecommendedWatcher,
}

/// Returns the first post file touched by `event`, if the event adds, removes
/// or renames a post.
pub fn changed_post(event: &Event) -> Option<&Path> {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
    );
    if !relevant {
        return None;
    }
    event.paths.iter().map(|p| p.as_path()).find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, is_post_file_name)
    })
}

/// Subscribes to changes in `dir`. `callback` runs on a dedicated thread
/// with the path of the post that changed.
pub fn on_posts_directory_changed<F>(dir: &Path, mut callback: F) -> Result<PostsWatcher>
where
    F: FnMut(&Path) + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    thread::spawn(move || {
        for result in rx {
            match result {
                Ok(event) => {
                    if let Some(path) = changed_post(&event) {
                        callback(path);
                    }
                }
                Err(e) => log!("watch"; "error: {}", e),
            }
        }
    });

    Ok(PostsWatcher { _watcher: watcher })
}

#[cfg(test)]
mod test {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind, RenameMode};
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_changed_post() {
        let created = event(EventKind::Create(CreateKind::File), "/posts/new.md");
        assert_eq!(changed_post(&created), Some(Path::new("/posts/new.md")));

        let removed = event(EventKind::Remove(RemoveKind::File), "/posts/old.md");
        assert_eq!(changed_post(&removed), Some(Path::new("/posts/old.md")));

        let renamed = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            "/posts/moved.md",
        );
        assert_eq!(changed_post(&renamed), Some(Path::new("/posts/moved.md")));
    }

    #[test]
    fn test_changed_post_ignores_irrelevant_events() {
        let edited = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            "/posts/post.md",
        );
        assert_eq!(changed_post(&edited), None);

        let swap_file = event(EventKind::Create(CreateKind::File), "/posts/.post.md.swp");
        assert_eq!(changed_post(&swap_file), None);

        let other = event(EventKind::Remove(RemoveKind::File), "/posts/notes.txt");
        assert_eq!(changed_post(&other), None);
    }

    #[test]
    fn test_on_posts_directory_changed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, rx) = mpsc::channel();
        let _watcher = on_posts_directory_changed(dir.path(), move |path| {
            tx.send(path.to_owned()).ok();
        })?;

        fs::write(dir.path().join("ignored.txt"), "x")?;
        fs::write(dir.path().join("fresh.md"), "# Fresh")?;

        let path = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(path.file_name(), Some(std::ffi::OsStr::new("fresh.md")));
        Ok(())
    }
}
