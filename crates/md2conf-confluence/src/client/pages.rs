//! Page operations for Confluence API.

use serde_json::{Value, json};
use tracing::{debug, info};

use super::{ConfluenceClient, read_body};
use crate::error::ConfluenceError;
use crate::store::PageStore;
use crate::types::{ContentResults, RemotePage};

impl PageStore for ConfluenceClient {
    fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<RemotePage>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        debug!("Looking up page '{}' in space {}", title, space);

        let response = self
            .agent
            .get(&url)
            .query("spaceKey", space)
            .query("title", title)
            .query("type", "page")
            .query("expand", "version")
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let results: ContentResults = serde_json::from_str(&read_body(response)?)?;
        Ok(results.results.into_iter().next())
    }

    fn create_page(
        &self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<RemotePage, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let payload = serde_json::to_vec(&create_payload(space, title, body, parent_id))?;

        info!("Creating page '{}' under parent {}", title, parent_id);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload[..])?;

        let page: RemotePage = serde_json::from_str(&read_body(response)?)?;
        info!("Created page {} at version {}", page.id, page.version.number);
        Ok(page)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<RemotePage, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);
        let next_version = current_version + 1;
        let payload = serde_json::to_vec(&update_payload(title, body, next_version))?;

        info!(
            "Updating page {} from version {} to {}",
            page_id, current_version, next_version
        );

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload[..])?;

        let page: RemotePage = serde_json::from_str(&read_body(response)?)?;
        info!("Updated page {} to version {}", page_id, page.version.number);
        Ok(page)
    }
}

/// Request body for `POST /content`.
fn create_payload(space: &str, title: &str, body: &str, parent_id: &str) -> Value {
    json!({
        "type": "page",
        "title": title,
        "space": {"key": space},
        "ancestors": [{"id": parent_id}],
        "body": {
            "storage": {
                "value": body,
                "representation": "storage"
            }
        }
    })
}

/// Request body for `PUT /content/{id}`.
fn update_payload(title: &str, body: &str, version: u32) -> Value {
    json!({
        "type": "page",
        "title": title,
        "body": {
            "storage": {
                "value": body,
                "representation": "storage"
            }
        },
        "version": {"number": version}
    })
}
