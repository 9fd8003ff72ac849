// src/render/live.rs
// =============================================================================
// Live browsing: show a branch's entry page without importing anything.
//
// Every call goes to GitHub again (list tree, download the entry page,
// rewrite its links). Nothing is cached and nothing is written to disk.
// =============================================================================

use tracing::info;

use super::entry::pick_entry;
use super::rewrite::rewrite_relative_urls;
use crate::error::{AppError, AppResult};
use crate::github::{GithubClient, RepositoryRef};

/// Fetches the entry HTML of `reference` with relative links pointed at GitHub.
///
/// Returns [`AppError::EntryNotFound`] when the branch has no HTML file.
pub async fn render_live(client: &GithubClient, reference: &RepositoryRef) -> AppResult<String> {
    let listing = client.fetch_files(reference).await?;
    let entry = pick_entry(listing.paths().as_slice()).ok_or(AppError::EntryNotFound)?;

    let prefix = reference.raw_prefix(&client.config().raw_base, &listing.branch);
    let bytes = client.download(&format!("{}{}", prefix, entry)).await?;

    // Pages with stray non-UTF-8 bytes still render; the bad bytes become U+FFFD
    let html = String::from_utf8_lossy(&bytes);

    info!(repo = %reference, branch = %listing.branch, %entry, "rendered live entry page");
    Ok(rewrite_relative_urls(&html, &prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GithubConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_tree(server: &MockServer, branch: &str, paths: &[&str]) {
        let tree: Vec<_> = paths
            .iter()
            .map(|p| json!({"path": p, "type": "blob", "size": 1}))
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/repos/o/r/git/trees/{}", branch)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tree": tree })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_render_rewrites_entry_page() {
        let server = MockServer::start().await;
        mount_tree(&server, "main", &["style.css", "index.html"]).await;
        Mock::given(method("GET"))
            .and(path("/o/r/main/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<link href="style.css"><a href="https://example.com">x</a>"#,
            ))
            .mount(&server)
            .await;

        let client = GithubClient::new(GithubConfig::with_base(&server.uri())).unwrap();
        let reference = RepositoryRef::new("o", "r").with_branch("main");
        let html = render_live(&client, &reference).await.unwrap();

        assert_eq!(
            html,
            format!(
                r#"<link href="{}/o/r/main/style.css"><a href="https://example.com">x</a>"#,
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_render_without_html_is_entry_not_found() {
        let server = MockServer::start().await;
        mount_tree(&server, "main", &["README.md", "main.py"]).await;

        let client = GithubClient::new(GithubConfig::with_base(&server.uri())).unwrap();
        let reference = RepositoryRef::new("o", "r").with_branch("main");
        let err = render_live(&client, &reference).await.unwrap_err();

        assert!(matches!(err, AppError::EntryNotFound));
    }

    #[tokio::test]
    async fn test_render_tolerates_invalid_utf8() {
        let server = MockServer::start().await;
        mount_tree(&server, "main", &["page.html"]).await;
        Mock::given(method("GET"))
            .and(path("/o/r/main/page.html"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<p>caf\xe9</p>".to_vec()))
            .mount(&server)
            .await;

        let client = GithubClient::new(GithubConfig::with_base(&server.uri())).unwrap();
        let reference = RepositoryRef::new("o", "r").with_branch("main");
        let html = render_live(&client, &reference).await.unwrap();

        assert_eq!(html, "<p>caf\u{FFFD}</p>");
    }
}
