//! The dispatch table for the link hub template.

use crate::links::LinkRegistry;
use crate::profile::{Profile, link_anchors};
use crate::rewrite::{DispatchTable, ElementHandler, SelectorKey};

/// Build the handlers for the template's seven rewritten elements.
///
/// | selector      | mutation                                      |
/// |---------------|-----------------------------------------------|
/// | `div#links`   | clear, then one anchor per link               |
/// | `div#profile` | remove `style`                                |
/// | `img#avatar`  | set `src`                                     |
/// | `h1#name`     | replace text with the display name            |
/// | `div#social`  | remove `style`, replace content with a link   |
/// | `title`       | replace text                                  |
/// | `body`        | set `class`                                   |
pub fn dispatch_table(profile: &Profile, links: &LinkRegistry) -> DispatchTable {
    let mut render_links = vec![ElementHandler::replace_html("")];
    render_links.extend(
        link_anchors(links)
            .into_iter()
            .map(|anchor| ElementHandler::append_html(anchor.into_string())),
    );

    DispatchTable::new()
        .on(
            SelectorKey::tag_with_id("div", "links"),
            ElementHandler::Composite(render_links),
        )
        .on(
            SelectorKey::tag_with_id("div", "profile"),
            ElementHandler::remove_attribute("style"),
        )
        .on(
            SelectorKey::tag_with_id("img", "avatar"),
            ElementHandler::set_attribute("src", profile.avatar_url.as_str()),
        )
        .on(
            SelectorKey::tag_with_id("h1", "name"),
            ElementHandler::replace_text(profile.display_name.as_str()),
        )
        .on(
            SelectorKey::tag_with_id("div", "social"),
            ElementHandler::Composite(vec![
                ElementHandler::remove_attribute("style"),
                ElementHandler::replace_html(profile.social_anchor().into_string()),
            ]),
        )
        .on(
            SelectorKey::tag("title"),
            ElementHandler::replace_text(profile.title.as_str()),
        )
        .on(
            SelectorKey::tag("body"),
            ElementHandler::set_attribute("class", profile.background_class.as_str()),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::links::LinkEntry;
    use crate::rewrite::Rewriter;

    /// Trimmed copy of the upstream template's structure.
    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>Static Links Page</title>
    <link href="https://unpkg.com/tailwindcss@^1.0/dist/tailwind.min.css" rel="stylesheet" />
  </head>
  <body class="bg-green-400">
    <div class="mx-auto max-w-2xl min-h-screen flex flex-col items-center py-8">
      <div id="profile" style="display: none">
        <img id="avatar" class="w-24 h-24 rounded-full shadow-md" />
        <h1 id="name" class="text-md text-white mt-2 font-semibold"></h1>
      </div>
      <div id="links" class="flex flex-col text-center w-full"></div>
      <div id="social" style="display: none" class="flex w-1/2 justify-around"></div>
    </div>
  </body>
</html>
"#;

    fn render(links: &LinkRegistry) -> (String, Vec<crate::rewrite::MutationFailure>) {
        let table = dispatch_table(&Profile::default(), links);
        let mut rewriter = Rewriter::new(Arc::new(table));
        let mut out = rewriter.write(TEMPLATE.as_bytes());
        out.extend(rewriter.end());
        (String::from_utf8(out).unwrap(), rewriter.failures().to_vec())
    }

    #[test]
    fn test_table_has_seven_bindings() {
        let table = dispatch_table(&Profile::default(), &LinkRegistry::default());
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_template_fully_rewritten() {
        let links = LinkRegistry::new(vec![
            LinkEntry::new("A", "http://a"),
            LinkEntry::new("B", "http://b"),
        ]);
        let (out, failures) = render(&links);
        assert!(failures.is_empty());

        assert!(out.contains("<title>Jacob Curtis</title>"));
        assert!(out.contains(r#"<body class="bg-gray-700">"#));
        assert!(out.contains(r#"<div id="profile">"#));
        assert!(out.contains(
            r#"<img id="avatar" class="w-24 h-24 rounded-full shadow-md" src="https://avatars0.githubusercontent.com/u/6753860?s=460&amp;v=4" />"#
        ));
        assert!(out.contains(
            r#"<h1 id="name" class="text-md text-white mt-2 font-semibold">nnazo</h1>"#
        ));
        assert!(out.contains(
            r#"<div id="links" class="flex flex-col text-center w-full"><a href="http://a">A</a><a href="http://b">B</a></div>"#
        ));
        assert!(out.contains(
            r#"<div id="social" class="flex w-1/2 justify-around"><a href="https://github.com/nnazo" alt="GitHub Profile"><svg"#
        ));
        assert!(!out.contains("display: none"));
    }

    #[test]
    fn test_anchor_count_matches_registry() {
        let (out, _) = render(&LinkRegistry::default());
        let start = out.find(r#"<div id="links""#).unwrap();
        let end = start + out[start..].find("</div>").unwrap();
        let container = &out[start..end];
        assert_eq!(container.matches("<a ").count(), 6);

        let order: Vec<usize> = LinkRegistry::default()
            .iter()
            .map(|link| {
                let anchor = format!(r#"href="{}">{}</a>"#, link.url, link.name);
                container.find(&anchor).unwrap()
            })
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unmatched_lines_unchanged() {
        let (out, _) = render(&LinkRegistry::default());
        for line in [
            "<!DOCTYPE html>",
            r#"<html lang="en">"#,
            r#"    <meta charset="UTF-8" />"#,
            r#"    <link href="https://unpkg.com/tailwindcss@^1.0/dist/tailwind.min.css" rel="stylesheet" />"#,
            r#"    <div class="mx-auto max-w-2xl min-h-screen flex flex-col items-center py-8">"#,
        ] {
            assert!(out.lines().any(|l| l == line), "missing line {line:?}");
        }
    }

    #[test]
    fn test_empty_registry_clears_container() {
        let (out, _) = render(&LinkRegistry::new(Vec::new()));
        assert!(out.contains(r#"<div id="links" class="flex flex-col text-center w-full"></div>"#));
    }
}
