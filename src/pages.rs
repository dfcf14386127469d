use axum::response::Html;

/// Page
///
/// The rendering layer behind the guards. Dashboards, charts and forms are served by the
/// frontend; the gateway only emits a shell naming the view and who it is rendered for.
pub struct Page<'a> {
    pub title: &'a str,
    pub viewer: Option<&'a str>,
    pub body: &'a str,
}

impl Page<'_> {
    pub fn render(&self) -> Html<String> {
        let viewer = self
            .viewer
            .map(|name| format!("<p class=\"viewer\">{}</p>", escape(name)))
            .unwrap_or_default();

        Html(format!(
            "<!doctype html>\n<html><head><title>{title} | SIAM</title></head>\
             <body><main><h1>{title}</h1>{viewer}{body}</main></body></html>",
            title = escape(self.title),
            viewer = viewer,
            body = self.body,
        ))
    }
}

/// The public entry: a username and password form posted to `POST /session`.
pub fn login_page() -> Html<String> {
    Page {
        title: "Sign in",
        viewer: None,
        body: "<form method=\"post\" action=\"/session\">\
               <label for=\"username\">Username</label>\
               <input id=\"username\" type=\"text\" name=\"username\" required>\
               <label for=\"password\">Password</label>\
               <input id=\"password\" type=\"password\" name=\"password\" required>\
               <button type=\"submit\">Sign in</button></form>",
    }
    .render()
}

/// escape
///
/// Minimal HTML text escaping for values that come from the backend.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
