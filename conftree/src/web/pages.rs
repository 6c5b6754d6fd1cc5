//! Page chrome around the generated form and document.

use crate::form::escape_html;

const TITLE: &str = "muds - DevStack local.conf generator";

/// Stylesheet linked by every page, served at `/style.css`.
pub const STYLESHEET: &str = include_str!("../../assets/style.css");

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{TITLE}</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<div class="container">
<h1>{TITLE}</h1>
{body}
</div>
</body>
</html>
"#
    )
}

/// Option form posting to `/go`.
pub fn form_page(form: &str) -> String {
    page(&format!(
        r#"<form method="post" action="/go">{form}<button type="submit" class="btn btn-primary">Generate</button></form>"#
    ))
}

/// Generated document together with its permanent link.
pub fn output_page(local_conf: &str, id: &str) -> String {
    let id = escape_html(id);
    page(&format!(
        r#"<pre id="local-conf">{}</pre>
<p>Permanent link: <a id="config-link" href="/api/v1/configs/{id}">/api/v1/configs/{id}</a></p>
<p><a href="/">Start over</a></p>"#,
        escape_html(local_conf)
    ))
}
