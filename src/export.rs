//! Printable export of a recommendation sheet.
//!
//! The sheet is rendered into a standalone HTML document that prints itself once
//! loaded. Every value taken from the payload goes through [`escape_html`] first.

use crate::{RecommendationSheet, RecommendedProblem, TopicRecommendation};
use log::{info, warn};
use std::fmt::Write;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlDocument;

const PRINT_WINDOW_NAME: &str = "sheet-pdf-export";
const PRINT_WINDOW_FEATURES: &str = "width=1100,height=800";

const PRINT_STYLES: &str = "\
body { font-family: Arial, sans-serif; padding: 24px; color: #0f172a; }
h1 { margin: 0 0 8px; }
.meta { color: #475569; margin-bottom: 20px; }
section { margin-top: 20px; page-break-inside: avoid; }
h2 { margin: 0 0 6px; }
table { width: 100%; border-collapse: collapse; margin-top: 8px; }
th, td { border: 1px solid #cbd5e1; padding: 8px; font-size: 12px; text-align: left; }
th { background: #f1f5f9; }
a { color: #2563eb; text-decoration: none; }";

/// Escape the five HTML-reserved characters.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Capitalise the first letter of every space-separated word ("binary search" -> "Binary Search").
pub fn format_topic_label(topic: &str) -> String {
    topic
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rating column text; unrated problems print "-".
pub fn rating_cell(problem: &RecommendedProblem) -> String {
    match problem.problem_rating {
        Some(rating) if rating != 0.0 => rating.to_string(),
        _ => "-".to_string(),
    }
}

fn render_problem_row(out: &mut String, problem: &RecommendedProblem) {
    let _ = write!(
        out,
        "<tr><td>{}</td><td>{}</td><td>{}</td>\
         <td><a href=\"{}\" target=\"_blank\" rel=\"noreferrer\">Open</a></td></tr>\n",
        escape_html(&problem.problem_name),
        escape_html(&problem.problem_key),
        escape_html(&rating_cell(problem)),
        escape_html(&problem.cf_link),
    );
}

fn render_topic_section(out: &mut String, topic: &TopicRecommendation) {
    let _ = write!(
        out,
        "<section>\n<h2>{}</h2>\n<p>Weakness: {}</p>\n<table>\n\
         <thead><tr><th>Problem</th><th>Key</th><th>Rating</th><th>Link</th></tr></thead>\n<tbody>\n",
        escape_html(&format_topic_label(&topic.topic)),
        escape_html(&topic.weakness_score.to_string()),
    );
    for problem in &topic.problems {
        render_problem_row(out, problem);
    }
    out.push_str("</tbody>\n</table>\n</section>\n");
}

/// Render `sheet` as a self-printing HTML document.
pub fn render_sheet_document(sheet: &RecommendationSheet) -> String {
    let handle = escape_html(sheet.codeforces_id.as_deref().unwrap_or_default());
    let cluster = escape_html(sheet.cluster.as_deref().unwrap_or_default());
    let topic_count = sheet
        .top_weak_topics_count
        .map(|n| n.to_string())
        .unwrap_or_default();

    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n\
         <title>Personalized Sheet - {handle}</title>\n<style>\n{PRINT_STYLES}\n</style>\n\
         </head>\n<body>\n<h1>CP Mentor Personalized Sheet</h1>\n\
         <div class=\"meta\">User: {handle} | Cluster: {cluster} | Topics: {} | Problems: {}</div>\n",
        escape_html(&topic_count),
        sheet.total_problems(),
    );
    for topic in &sheet.recommendations {
        render_topic_section(&mut html, topic);
    }
    html.push_str("<script>\nwindow.onload = () => { window.print(); };\n</script>\n</body>\n</html>\n");
    html
}

/// Write `html` into a fresh window. Gives up quietly when the window is blocked.
pub fn open_print_window(html: &str) {
    let window = gloo_utils::window();
    let popup = match window.open_with_url_and_target_and_features(
        "",
        PRINT_WINDOW_NAME,
        PRINT_WINDOW_FEATURES,
    ) {
        Ok(Some(popup)) => popup,
        Ok(None) => {
            info!("print window was blocked");
            return;
        }
        Err(err) => {
            warn!("could not open print window: {:?}", err);
            return;
        }
    };
    let Some(document) = popup
        .document()
        .and_then(|doc| doc.dyn_into::<HtmlDocument>().ok())
    else {
        warn!("print window has no HTML document");
        return;
    };

    if let Err(err) = write_print_document(&document, html) {
        warn!("could not write print document: {:?}", err);
    }
}

/// Replace the contents of `document` with `html`.
fn write_print_document(document: &HtmlDocument, html: &str) -> Result<(), JsValue> {
    document.open()?;
    document.write_1(html)?;
    document.close()
}

/// Export `sheet` for printing. Sheets without topics are ignored.
pub fn export_sheet(sheet: &RecommendationSheet) {
    if sheet.recommendations.is_empty() {
        return;
    }
    open_print_window(&render_sheet_document(sheet));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> RecommendationSheet {
        RecommendationSheet {
            codeforces_id: Some("<script>alert('x')</script>".into()),
            cluster: Some("2".into()),
            top_weak_topics_count: Some(1),
            recommendations: vec![TopicRecommendation {
                topic: "Graphs & Trees".into(),
                weakness_score: 1.25,
                solved_unique: 3,
                attempted_unique: 7,
                problems: vec![
                    RecommendedProblem {
                        problem_key: "1000A".into(),
                        problem_name: "A<B>\"C\"".into(),
                        problem_rating: Some(1500.0),
                        cf_link: "https://codeforces.com/problemset/problem/1000/A?x=1&y=2".into(),
                        success_rate: Some(0.4),
                    },
                    RecommendedProblem {
                        problem_key: "1000B".into(),
                        problem_name: "It's fine".into(),
                        problem_rating: None,
                        cf_link: String::new(),
                        success_rate: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn escapes_all_reserved_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn document_escapes_topic_and_problem_names() {
        let html = render_sheet_document(&sheet());
        assert!(html.contains("Graphs &amp; Trees"));
        assert!(html.contains("A&lt;B&gt;&quot;C&quot;"));
        assert!(html.contains("It&#39;s fine"));
        assert!(html.contains("?x=1&amp;y=2"));
        assert!(!html.contains("A<B>"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn user_fields_never_reach_markup_unescaped() {
        let html = render_sheet_document(&sheet());
        let raw = ["Graphs & Trees", "\"C\"", "It's", "alert('x')"];
        for needle in raw {
            assert!(!html.contains(needle), "found raw {:?}", needle);
        }
    }

    #[test]
    fn document_carries_meta_and_print_script() {
        let html = render_sheet_document(&sheet());
        assert!(html.contains("Cluster: 2 | Topics: 1 | Problems: 2"));
        assert!(html.contains("Weakness: 1.25"));
        assert!(html.contains("<td>1500</td>"));
        assert!(html.contains("<td>-</td>"));
        assert!(html.contains("window.print()"));
        assert_eq!(html.matches("<section>").count(), 1);
    }

    #[test]
    fn topic_labels_are_title_cased() {
        assert_eq!(format_topic_label("binary search"), "Binary Search");
        assert_eq!(format_topic_label("dp"), "Dp");
        assert_eq!(format_topic_label("two  pointers"), "Two  Pointers");
        assert_eq!(format_topic_label(""), "");
    }

    #[test]
    fn empty_sheet_is_not_exported() {
        // Returns before any window is touched.
        export_sheet(&RecommendationSheet::default());
    }

    #[test]
    fn print_document_is_written_through_html_document() {
        let _: fn(&HtmlDocument, &str) -> Result<(), JsValue> = write_print_document;
    }
}
