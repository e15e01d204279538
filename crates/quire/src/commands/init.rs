//! Scaffold a new quire site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command, writing `config_path` and sample articles next to it.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let content_dir = root.join("content");

    if content_dir.exists() {
        if !yes {
            tracing::warn!("content/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(&content_dir).context("Failed to create content directory")?;
    }

    write_if_absent(config_path, DEFAULT_CONFIG, yes)?;
    write_if_absent(&content_dir.join("hello-world.md"), DEFAULT_HELLO, yes)?;
    write_if_absent(&content_dir.join("writing-articles.md"), DEFAULT_WRITING, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire build' to generate the site.");

    Ok(())
}

fn write_if_absent(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# quire configuration

[site]
title = "My Blog"
base_url = "/"
output = "dist"

[content]
dir = "content"
extensions = ["md", "mdx"]
include_drafts = false

[catalog]
page_size = 10
fallback_author = "staff"
# "skip" leaves unreadable files out, "fail" stops the build
on_load_error = "skip"

[routes]
articles = "blog"
tags = "tags"
authors = "authors"
series = "series"

[build]
# 0 = one worker per core
workers = 0

[authors.staff]
name = "Staff"
"#;

const DEFAULT_HELLO: &str = r#"---
title: Hello, world
date: 2024-01-01
description: The first post on this blog.
author: staff
tags: [meta]
series: getting started
---

# Hello, world

This site is built by **quire**. Every Markdown file under `content/`
becomes an article.
"#;

const DEFAULT_WRITING: &str = r#"---
title: Writing articles
date: 2024-01-02
author: staff
tags: [meta, guide]
series: getting started
---

# Writing articles

Each article starts with a frontmatter block:

```yaml
---
title: Article title
date: 2024-01-02
description: Optional summary
author: staff
tags: [one, two]
series: optional series name
draft: false
---
```

`title` and `date` are required. Files marked `draft: true` are left out
unless `include_drafts` is enabled in `quire.toml`.

Run `quire check` to validate content and `quire build` to write the site.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use quire_catalog::{CancellationToken, FsSource, Pipeline};
    use tempfile::tempdir;

    #[tokio::test]
    async fn scaffold_builds_cleanly() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("quire.toml");

        run(&config_path, false).await.unwrap();

        let config = Config::load(&config_path).unwrap();
        let mut pipeline = Pipeline::new(
            FsSource::new(config.content_dir()),
            config.author_registry(),
            config.pipeline_config(None),
        );
        let outcome = pipeline.run(&CancellationToken::new());

        let catalog = outcome.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(outcome.warnings().is_empty());
        assert_eq!(
            catalog.series_slugs("getting started").unwrap(),
            ["hello-world", "writing-articles"]
        );
    }

    #[tokio::test]
    async fn existing_content_is_kept_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("quire.toml");
        fs::create_dir_all(temp.path().join("content")).unwrap();

        run(&config_path, false).await.unwrap();

        assert!(!config_path.exists());
    }
}
