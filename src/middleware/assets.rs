//! Static file serving.

use std::path::{Path, PathBuf};

use log::debug;
use percent_encoding::percent_decode_str;

use super::{Middleware, Next};
use crate::context::{Body, Context};
use crate::server::{BoxFuture, Error, StatusCode};

/// Serves files from `root` for paths whose parent directory is named `dir`.
///
/// `GET /static/app.css` with `dir = "static"` streams `<root>/app.css`. A
/// matching path with no such file answers 404. Other paths pass through.
#[derive(Debug, Clone)]
pub struct Assets {
    dir: String,
    root: PathBuf,
}

impl Assets {
    pub fn new(dir: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            root: root.into(),
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name requested under the asset directory, decoded.
    fn requested_file(&self, pathname: &str) -> Option<String> {
        let (parent, file) = pathname.rsplit_once('/')?;
        let parent = parent.rsplit('/').next().unwrap_or("");
        if parent != self.dir {
            return None;
        }
        let file = percent_decode_str(file).decode_utf8().ok()?;
        Some(file.into_owned())
    }
}

impl Middleware for Assets {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let Some(pathname) = ctx.url().map(|url| url.path().to_string()) else {
                return next.run(ctx).await;
            };
            let Some(name) = self.requested_file(&pathname) else {
                return next.run(ctx).await;
            };

            if name.is_empty() || name == ".." || name.contains(['/', '\\']) {
                ctx.set_status(StatusCode::NotFound.as_u16());
                return Ok(());
            }

            let path = self.root.join(&name);
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                debug!("asset {} not found under {}", name, self.root.display());
                ctx.set_status(StatusCode::NotFound.as_u16());
                return Ok(());
            }

            let file = tokio::fs::File::open(&path).await?;
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                ctx.set_type(ext);
            }
            ctx.set_body(Body::stream(file));
            Ok(())
        })
    }
}
