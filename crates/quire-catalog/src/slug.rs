//! Slug derivation.

use std::path::{Component, Path};

/// Convert text to a URL-safe slug.
///
/// Transliterates to ASCII, lower-cases and joins the alphanumeric runs with
/// single hyphens. Text with no alphanumeric content yields an empty slug.
pub fn slugify(text: &str) -> String {
    ::slug::slugify(text)
}

/// Derive a document slug from its source path.
///
/// The extension is stripped and path separators and dots become hyphens,
/// so `blog/2024/Hello_World.mdx` turns into `blog-2024-hello-world`.
pub fn slug_from_path(path: &Path) -> String {
    let stem = path.with_extension("");
    let joined = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    slugify(&joined)
}

/// A route segment for a tag, author or series name. Never empty.
///
/// Names that slugify to nothing are spelled as `x` followed by the hex of
/// their UTF-8 bytes, so `#` becomes `x23`.
pub fn url_segment(name: &str) -> String {
    let slug = slugify(name);
    if !slug.is_empty() {
        return slug;
    }

    let hex: String = name.trim().bytes().map(|b| format!("{b:02x}")).collect();
    format!("x{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("C++ Tips"), "c-tips");
        assert_eq!(slugify("Node.js"), "node-js");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugs_are_ascii() {
        let slug = slug_from_path(Path::new("Café Ünïcode.md"));

        assert_eq!(slug, "cafe-unicode");
        assert!(slug.is_ascii());
        assert!(slugify("Ωmega Straße").is_ascii());
    }

    #[test]
    fn path_slugs_join_directories() {
        assert_eq!(
            slug_from_path(Path::new("blog/2024/Hello_World.mdx")),
            "blog-2024-hello-world"
        );
        assert_eq!(slug_from_path(Path::new("hello-world.md")), "hello-world");
        assert_eq!(
            slug_from_path(Path::new("./notes/v1.2-release.mdx")),
            "notes-v1-2-release"
        );
    }

    #[test]
    fn differently_spelled_paths_can_collide() {
        assert_eq!(
            slug_from_path(Path::new("Hello-World.mdx")),
            slug_from_path(Path::new("hello_world.md"))
        );
    }

    #[test]
    fn punctuation_only_names_yield_empty_slugs() {
        assert_eq!(slug_from_path(Path::new("???.md")), "");
    }

    #[test]
    fn url_segments_are_never_empty() {
        assert_eq!(url_segment("Getting Started"), "getting-started");
        assert_eq!(url_segment("#"), "x23");
        assert_eq!(url_segment("++"), "x2b2b");
        assert!(!url_segment("🦀").is_empty());
        assert!(url_segment("🦀").is_ascii());
    }
}
