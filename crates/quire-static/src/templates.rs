//! minijinja templates for the built-in page types.

use minijinja::{context, Environment};
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

use crate::render::{PageRenderer, PageView, RenderError};

/// Site-wide values every page template can use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMeta {
    pub title: String,
    pub base_url: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            base_url: "/".to_string(),
        }
    }
}

/// Renders pages with the bundled HTML templates.
pub struct TemplateRenderer {
    env: Environment<'static>,
    site: SiteMeta,
}

impl TemplateRenderer {
    pub fn new(site: SiteMeta) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("entries.html", ENTRIES_TEMPLATE)?;
        env.add_template("article.html", ARTICLE_TEMPLATE)?;
        env.add_template("listing.html", LISTING_TEMPLATE)?;
        env.add_template("index.html", INDEX_TEMPLATE)?;

        Ok(Self { env, site })
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }
}

impl PageRenderer for TemplateRenderer {
    fn render(&self, view: &PageView<'_>) -> Result<String, RenderError> {
        let (template, content) = match view {
            PageView::Article(article) => {
                ("article.html", render_markdown(&article.entry.document.body))
            }
            PageView::Listing(_) => ("listing.html", String::new()),
            PageView::TagIndex { .. } | PageView::AuthorIndex { .. } => {
                ("index.html", String::new())
            }
        };

        let tmpl = self.env.get_template(template)?;
        let html = tmpl.render(context! {
            site => &self.site,
            title => view.title(),
            page => view,
            content => content,
        })?;

        Ok(html)
    }
}

/// Render a Markdown body to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options);

    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site.title }}</title>
</head>
<body>
  <header class="site-header">
    <a href="{{ site.base_url }}" class="site-title">{{ site.title }}</a>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
</body>
</html>"##;

const ENTRIES_TEMPLATE: &str = r##"<ul class="entries">
{% for entry in page.entries %}
  <li class="entry">
    <a href="{{ entry.url }}">{{ entry.document.title }}</a>
    <time datetime="{{ entry.date }}">{{ entry.date }}</time>
    <span class="byline">{{ entry.author.display_name }}</span>
    {% if entry.document.description %}<p>{{ entry.document.description }}</p>{% endif %}
  </li>
{% endfor %}
</ul>"##;

const ARTICLE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="article">
  <h1>{{ page.entry.document.title }}</h1>
  <p class="meta">
    <time datetime="{{ page.entry.date }}">{{ page.entry.date }}</time>
    by {{ page.entry.author.display_name }}
  </p>
  {% if page.entry.document.cover %}<img class="cover" src="{{ page.entry.document.cover }}" alt="">{% endif %}
  <div class="content">
    {{ content | safe }}
  </div>
  {% if page.tags %}
  <ul class="tags">
  {% for tag in page.tags %}
    <li><a href="{{ tag.url }}">{{ tag.label }}</a></li>
  {% endfor %}
  </ul>
  {% endif %}
  {% if page.series %}
  <aside class="series">
    <h2>More in this series</h2>
    <ul>
    {% for part in page.series %}
      <li><a href="{{ part.url }}">{{ part.label }}</a></li>
    {% endfor %}
    </ul>
  </aside>
  {% endif %}
</article>
{% endblock %}"##;

const LISTING_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="listing">
  <h1>{{ page.heading }}</h1>
  {% include "entries.html" %}
  <nav class="pagination">
    {% if page.pagination.previous %}<a rel="prev" href="{{ page.pagination.previous }}">Newer</a>{% endif %}
    <span>Page {{ page.pagination.number }} of {{ page.pagination.total }}</span>
    {% if page.pagination.next %}<a rel="next" href="{{ page.pagination.next }}">Older</a>{% endif %}
  </nav>
</section>
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="index">
  <h1>{{ title }}</h1>
  <ul>
  {% for item in page.tags or page.authors %}
    <li><a href="{{ item.url }}">{{ item.label }}</a> <span class="count">{{ item.count }}</span></li>
  {% endfor %}
  </ul>
</section>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ArticleView, Entry, IndexEntry, ListingView, Pagination};
    use quire_catalog::{Author, Document};
    use quire_mdx::parse_date;
    use std::path::PathBuf;

    fn document() -> Document {
        Document {
            slug: "hello".to_string(),
            source_path: PathBuf::from("hello.md"),
            title: "Hello <World>".to_string(),
            description: Some("First post".to_string()),
            published_at: parse_date("2024-03-05").unwrap(),
            author: "ada".to_string(),
            tags: vec![],
            series: None,
            thumb: None,
            cover: None,
            draft: false,
            extra: Default::default(),
            body: "# Heading\n\nSome *text*.".to_string(),
        }
    }

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(SiteMeta {
            title: "My Blog".to_string(),
            base_url: "/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn renders_article() {
        let doc = document();
        let author = Author::new("ada", "Ada Lovelace");
        let view = PageView::Article(ArticleView {
            entry: Entry {
                document: &doc,
                author: &author,
                url: "/blog/hello/".to_string(),
                date: "2024-03-05".to_string(),
            },
            tags: vec![],
            series: vec![],
        });

        let html = renderer().render(&view).unwrap();

        assert!(html.contains("<title>Hello &lt;World&gt; - My Blog</title>"));
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("Ada Lovelace"));
    }

    #[test]
    fn renders_listing_with_pagination() {
        let doc = document();
        let author = Author::new("ada", "Ada Lovelace");
        let view = PageView::Listing(ListingView {
            heading: "Latest".to_string(),
            entries: vec![Entry {
                document: &doc,
                author: &author,
                url: "/blog/hello/".to_string(),
                date: "2024-03-05".to_string(),
            }],
            pagination: Pagination {
                number: 1,
                total: 2,
                previous: None,
                next: Some("/page/2/".to_string()),
            },
        });

        let html = renderer().render(&view).unwrap();

        assert!(html.contains("Hello &lt;World&gt;</a>"));
        assert!(html.contains("First post"));
        assert!(html.contains("Page 1 of 2"));
        assert!(html.contains(r#"rel="next""#));
        assert!(!html.contains(r#"rel="prev""#));
    }

    #[test]
    fn renders_indexes() {
        let view = PageView::AuthorIndex {
            authors: vec![IndexEntry {
                label: "Ada Lovelace".to_string(),
                url: "/authors/ada/".to_string(),
                count: 3,
            }],
        };

        let html = renderer().render(&view).unwrap();

        assert!(html.contains("<h1>Authors</h1>"));
        assert!(html.contains("Ada Lovelace</a>"));
        assert!(html.contains(r#"<span class="count">3</span>"#));
    }
}
