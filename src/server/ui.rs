use axum::response::Html;

pub const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serves the single-page chat UI.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_posts_to_every_endpoint() {
        for endpoint in ["/api/chat", "/api/document", "/api/image", "/api/audio"] {
            assert!(INDEX_HTML.contains(endpoint), "missing {}", endpoint);
        }
    }
}
