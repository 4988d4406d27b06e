use serde_json::Value;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone page rendering `spec` with vega-embed.
pub fn html_page(title: &str, spec: &Value) -> String {
    // keep `</script>` inside string values from closing the tag
    let spec_json = spec.to_string().replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
</head>
<body>
  <div id="vis"></div>
  <script type="text/javascript">
    const spec = {spec_json};
    vegaEmbed('#vis', spec, {{ "actions": true }}).catch(console.error);
  </script>
</body>
</html>
"#,
        title = escape_html(title),
        spec_json = spec_json,
    )
}
