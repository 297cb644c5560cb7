use serde::Serialize;

use crate::{db::Page, models::User};

/// Success body shared by every resource endpoint.
///
/// Lists carry `count`, paginated lists also carry `page` and `totalPages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            page: None,
            total_pages: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::data(items)
        }
    }
}

impl<T> From<Page<T>> for Envelope<Vec<T>> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            page: Some(page.params.page),
            total_pages: Some(total_pages),
            ..Self::list(page.items)
        }
    }
}

impl Envelope<()> {
    /// A body with a message and no data, for deletes and logout.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            page: None,
            total_pages: None,
            data: None,
        }
    }
}

/// Body returned by register, login and token refresh.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// Body returned by the profile endpoint.
#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub success: bool,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::PageParams;

    #[test]
    fn test_paginated_envelope() {
        let page = Page {
            items: vec![1, 2],
            total: 12,
            params: PageParams { page: 2, limit: 5 },
        };

        let body = serde_json::to_value(Envelope::from(page)).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "count": 2, "page": 2, "totalPages": 3, "data": [1, 2] })
        );
    }

    #[test]
    fn test_message_envelope_has_no_data() {
        let body = serde_json::to_value(Envelope::message("Course removed")).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "Course removed" }));
    }

    #[test]
    fn test_data_with_message() {
        let body =
            serde_json::to_value(Envelope::data("x").with_message("Certificate generated successfully"))
                .unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": "Certificate generated successfully", "data": "x" })
        );
    }
}
