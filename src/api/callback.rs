use axum::response::Html;

/// Landing page for the authorization redirect.
///
/// The implicit grant delivers the token in the URL fragment, which browsers
/// never send to the server. The page reads it (or the query string, where
/// some errors are reported) and forwards it to `/token`.
pub async fn callback() -> Html<&'static str> {
    Html(CALLBACK_PAGE)
}

const CALLBACK_PAGE: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>toptracks</title></head>
  <body>
    <h4 id="status">Completing sign in...</h4>
    <script>
      const params = window.location.hash.length > 1
        ? window.location.hash.substring(1)
        : window.location.search.substring(1);
      fetch("/token?" + params)
        .then((res) => res.text())
        .then((html) => { document.body.innerHTML = html; })
        .catch(() => {
          document.getElementById("status").textContent = "Login failed.";
        });
    </script>
  </body>
</html>
"#;
