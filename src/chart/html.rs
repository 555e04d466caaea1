// =============================================================================
// HTML rendering for ChartSpec
// =============================================================================
//
// `render_fragment` produces an embeddable `<div>` + `<script>` pair that
// expects Plotly.js to already be loaded on the page. `render_page` wraps a
// fragment in a standalone document that loads Plotly.js itself.
// =============================================================================

use uuid::Uuid;

use crate::chart::{ChartSpec, Summary};

/// Serialize `spec` to JSON that is safe to inline inside a `<script>` block.
///
/// `<`, `>` and `&` become `\u` escapes so a title containing `</script>`
/// cannot terminate the block. The result is still valid JSON.
pub fn figure_json(spec: &ChartSpec) -> serde_json::Result<String> {
    let json = serde_json::to_string(spec)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// Embeddable chart markup. Requires Plotly.js on the host page.
pub fn render_fragment(spec: &ChartSpec) -> serde_json::Result<String> {
    let id = Uuid::new_v4();
    let figure = figure_json(spec)?;
    Ok(format!(
        r#"<div id="{id}" class="plotly-graph-div" style="height:640px; width:100%;"></div>
<script type="text/javascript">
  (function () {{
    var figure = {figure};
    Plotly.newPlot("{id}", figure.data, figure.layout, {{"responsive": true}});
  }})();
</script>"#
    ))
}

/// Standalone document with the chart and the three summary lines.
pub fn render_page(
    spec: &ChartSpec,
    summary: &Summary,
    plotly_cdn_url: &str,
) -> serde_json::Result<String> {
    let body = format!(
        "{}\n{}",
        render_fragment(spec)?,
        summary_block(summary)
    );
    Ok(page_shell(&spec.layout.title.text, Some(plotly_cdn_url), &body))
}

/// The summary as a `<pre>` block, one line per value.
pub fn summary_block(summary: &Summary) -> String {
    format!(
        r#"<pre class="summary">{}</pre>"#,
        escape_html(&summary.to_string())
    )
}

/// Minimal HTML document. `body` is inserted verbatim; `title` is escaped.
///
/// Plotly.js is only loaded when `plotly_cdn_url` is given.
pub fn page_shell(title: &str, plotly_cdn_url: Option<&str>, body: &str) -> String {
    let script = plotly_cdn_url
        .map(|url| {
            format!(
                r#"<script src="{}" charset="utf-8"></script>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  {script}
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    pre.summary {{ font-size: 1rem; }}
    .error {{ color: #b00020; }}
  </style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
