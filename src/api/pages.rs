// =============================================================================
// HTML pages served by the web form shell
// =============================================================================

use crate::chart::html::{escape_html, page_shell, summary_block};
use crate::chart::Summary;

/// `GET /` — symbol / start date / title form posting to `/plot`.
pub fn form_page() -> String {
    let body = r#"<h1>AHR999 Index</h1>
<form action="/plot" method="post">
  <p>
    <label for="symbol">Symbol</label>
    <input id="symbol" name="symbol" type="text" value="BTC-USD" required>
  </p>
  <p>
    <label for="start_date">Start date</label>
    <input id="start_date" name="start_date" type="date" value="2010-01-01" required>
  </p>
  <p>
    <label for="title">Title</label>
    <input id="title" name="title" type="text" value="Bitcoin">
  </p>
  <p><button type="submit">Plot</button></p>
</form>"#;
    page_shell("AHR999 Index", None, body)
}

/// `POST /plot` — the embedded chart plus its summary.
pub fn plot_page(summary: &Summary, chart_fragment: &str, plotly_cdn_url: &str) -> String {
    let body = format!(
        "<p><a href=\"/\">&larr; New chart</a></p>\n{chart_fragment}\n{}",
        summary_block(summary)
    );
    page_shell(
        &format!("{} AHR999 Index", summary.title),
        Some(plotly_cdn_url),
        &body,
    )
}

/// Error page shown when a request cannot be charted.
pub fn error_page(heading: &str, detail: &str) -> String {
    let body = format!(
        "<h1 class=\"error\">{}</h1>\n<p>{}</p>\n<p><a href=\"/\">&larr; Back</a></p>",
        escape_html(heading),
        escape_html(detail)
    );
    page_shell(heading, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn form_has_all_fields() {
        let html = form_page();
        for field in ["name=\"symbol\"", "name=\"start_date\"", "name=\"title\""] {
            assert!(html.contains(field), "missing {field}");
        }
        assert!(html.contains(r#"action="/plot" method="post""#));
    }

    #[test]
    fn error_page_escapes_detail() {
        let html = error_page("Invalid input", "<b>bad</b>");
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(!html.contains("<b>bad</b>"));
    }

    #[test]
    fn plot_page_embeds_fragment_verbatim() {
        let summary = Summary {
            title: "Bitcoin".to_string(),
            as_of: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            last_date: None,
            latest_indicator: Some(0.5),
            latest_close: Some(1.0),
        };
        let html = plot_page(&summary, "<div id=\"chart\"></div>", "https://cdn.example/p.js");
        assert!(html.contains("<div id=\"chart\"></div>"));
        assert!(html.contains("https://cdn.example/p.js"));
        assert!(html.contains("Latest Bitcoin AHR999 value: 0.5000"));
    }
}
