//! Response wrapper types.
//!
//! JSON endpoints answer with [`ApiResponse`]; list pages are cut with
//! [`PageWindow`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard API response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// Response metadata.
    pub meta: ResponseMeta,
}

/// API error details.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Error code for client handling (e.g., "QUERY_ERROR").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// Response metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseMeta {
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,

    /// Service name that handled the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            service: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: ResponseMeta::default(),
        }
    }

    /// Creates a successful response tagged with the service name.
    pub fn ok_with_service(data: T, service: impl Into<String>) -> Self {
        Self::ok(data).with_service(service)
    }

    /// Sets the service name on the response.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.meta.service = Some(service.into());
        self
    }
}

impl ApiResponse<()> {
    /// Creates an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
            meta: ResponseMeta::default(),
        }
    }
}

/// One page of a list, with the requested page clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageWindow {
    /// Current page number (1-based, clamped).
    pub page: u32,

    /// Number of items per page.
    pub size: u32,

    /// Total number of items.
    pub total: usize,

    /// Total number of pages, never less than 1.
    pub total_pages: u32,

    /// 1-based position of the first row on this page.
    pub start_index: usize,
}

impl PageWindow {
    /// Computes the window for `page` of `size` rows over `total` items.
    ///
    /// A `size` below 1 is treated as 1; `page` is clamped into
    /// `[1, total_pages]`.
    pub fn new(page: i64, size: i64, total: usize) -> Self {
        let size = u32::try_from(size.max(1)).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(size as usize).max(1);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        let page = u32::try_from(page.clamp(1, i64::from(total_pages))).unwrap_or(total_pages);
        Self {
            page,
            size,
            total,
            total_pages,
            start_index: (page as usize - 1) * size as usize + 1,
        }
    }

    /// Half-open index range of this page, capped at `total`.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page as usize - 1) * self.size as usize).min(self.total);
        let end = (start + self.size as usize).min(self.total);
        start..end
    }

    /// Whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether there is a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let window = PageWindow::new(3, 10, 25);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.start_index, 21);
        assert_eq!(window.range(), 20..25);
        assert!(!window.has_next());
        assert!(window.has_prev());
    }

    #[test]
    fn test_page_is_clamped() {
        assert_eq!(PageWindow::new(0, 10, 25).page, 1);
        assert_eq!(PageWindow::new(99, 10, 25).page, 3);
        assert_eq!(PageWindow::new(-1, 10, 25).page, 1);
    }

    #[test]
    fn test_negative_size_treated_as_one() {
        let window = PageWindow::new(1, -5, 3);
        assert_eq!(window.size, 1);
        assert_eq!(window.total_pages, 3);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let window = PageWindow::new(4, 10, 0);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.page, 1);
        assert_eq!(window.range(), 0..0);
        assert_eq!(window.start_index, 1);
    }

    #[test]
    fn test_zero_size_treated_as_one() {
        let window = PageWindow::new(2, 0, 3);
        assert_eq!(window.size, 1);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.range(), 1..2);
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::err("TIMEOUT", "slow")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "TIMEOUT");
        assert!(json.get("data").is_none());
    }
}
