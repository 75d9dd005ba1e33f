//! Session history listing.

use reel_core::wire::HistoryPage;

use crate::{ApiClient, HISTORY_PATH, error::ClientError, http::check_response};

impl ApiClient {
    /// Fetch one page of the caller's sessions.
    ///
    /// `204 No Content` is an empty listing, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, the service returns a
    /// non-success status, or the body cannot be parsed.
    pub async fn fetch_history(&self, page: u32, limit: u32) -> Result<HistoryPage, ClientError> {
        let page = page.max(1);
        let url = self.url(&format!("{HISTORY_PATH}?page={page}&limit={limit}"));
        let builder = self.prepare(self.http.get(&url), self.request_timeout);
        let resp = check_response(builder.send().await?).await?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            tracing::debug!(page, "history is empty");
            return Ok(HistoryPage::empty(page));
        }
        let body = resp.text().await?;
        parse_history(&body, page)
    }
}

fn parse_history(body: &str, page: u32) -> Result<HistoryPage, ClientError> {
    if body.trim().is_empty() {
        return Ok(HistoryPage::empty(page));
    }
    serde_json::from_str(body).map_err(|e| ClientError::Parse(format!("history page {page}: {e}")))
}
