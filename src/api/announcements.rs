//! Announcement operations. These endpoints answer with their payload next
//! to the `success` flag rather than under `data`.

use reqwest::Method;

use crate::error::{ClientError, Result};

use super::types::{Announcement, NewAnnouncement};
use super::ApiClient;

const MAX_TITLE_LEN: usize = 100;
const MAX_MESSAGE_LEN: usize = 500;

impl ApiClient {
    pub async fn create_announcement(
        &self,
        announcement: NewAnnouncement,
    ) -> Result<Announcement> {
        if announcement.title.trim().is_empty() {
            return Err(ClientError::Validation("title is required".to_string()));
        }
        if announcement.message.trim().is_empty() {
            return Err(ClientError::Validation("message is required".to_string()));
        }
        if announcement.title.len() > MAX_TITLE_LEN {
            return Err(ClientError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if announcement.message.len() > MAX_MESSAGE_LEN {
            return Err(ClientError::Validation(format!(
                "message must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }

        let body = serde_json::to_value(&announcement)?;
        let envelope = self
            .request(Method::POST, "/announcements", Some(&body))
            .await?;
        let payload = envelope.announcement.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn announcements(&self, limit: Option<u32>) -> Result<Vec<Announcement>> {
        let path = match limit {
            Some(limit) => format!("/announcements?limit={limit}"),
            None => "/announcements".to_string(),
        };
        let envelope = self.request(Method::GET, &path, None).await?;
        let payload = envelope
            .announcements
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        Ok(serde_json::from_value(payload)?)
    }
}
