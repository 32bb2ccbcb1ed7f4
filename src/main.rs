use anyhow::Result;
use blogd::config::Config;
use blogd::log;
use blogd::serve;
use blogd::site::Site;
use blogd::watch::on_posts_directory_changed;
use clap::{crate_version, App, Arg};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let matches = App::new("blogd")
        .version(crate_version!())
        .about("Renders a directory of Markdown posts and serves them over HTTP")
        .arg(
            Arg::with_name("PROJECT")
                .help("The project directory containing `posts/` and `layout/`")
                .default_value(".")
                .index(1),
        )
        .get_matches();

    let root = PathBuf::from(matches.value_of("PROJECT").unwrap_or("."));
    let config = Config::from_directory(&root)?;
    let site = Arc::new(Site::new(config));

    // The first build has to succeed; there is nothing to serve otherwise.
    site.rebuild()?;

    let posts_directory = site.config().posts_directory.clone();
    let _watcher = {
        let site = Arc::clone(&site);
        on_posts_directory_changed(&posts_directory, move |_| {
            log!("watch"; "Something changed. Better rebuild");
            if let Err(e) = site.rebuild() {
                log!("error"; "rebuild failed: {}", e);
            }
        })?
    };

    let server = serve::bind(&site.config().address)?;
    log!("serve"; "Running on http://{}", site.config().address);
    serve::run(&server, &site);
    Ok(())
}
