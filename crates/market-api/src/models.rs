use chrono::{DateTime, Utc};
use market_db::entities::{deal, item, user};
use market_db::PageInfo;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page for listings when `page` is missing or invalid
pub const DEFAULT_PAGE_NUMBER: i64 = 1;
/// Default page size for listings when `size` is missing or invalid
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Pagination query parameters
///
/// Values that are missing or do not parse as positive integers fall back to
/// page 1 and size 10.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
    /// Page size
    pub size: Option<String>,
}

impl PageQuery {
    pub fn page_info(&self) -> PageInfo {
        fn positive(raw: Option<&String>, default: i64) -> i64 {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        }

        PageInfo::new(
            positive(self.page.as_ref(), DEFAULT_PAGE_NUMBER),
            positive(self.size.as_ref(), DEFAULT_PAGE_SIZE),
        )
    }
}

// ============================================================
// Authentication
// ============================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with both tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Short-lived access token
    pub token: String,
    /// Long-lived token for `/api/refresh`
    pub refresh_token: String,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// New access token
    pub token: String,
}

// ============================================================
// Users
// ============================================================

/// Public view of a user; never carries credential columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// User update request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: String,
    /// New email (unchanged if omitted)
    #[serde(default)]
    pub email: Option<String>,
    /// New password; regenerates salt and hash together (unchanged if omitted)
    #[serde(default)]
    pub password: Option<String>,
}

// ============================================================
// Items
// ============================================================

/// Item creation request; the owner is always the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewItemRequest {
    pub name: String,
    pub price: f64,
}

/// Item update request; the owner cannot be changed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<item::Model> for ItemResponse {
    fn from(item: item::Model) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            owner_id: item.owner_id,
            created_at: item.created_at,
        }
    }
}

// ============================================================
// Deals
// ============================================================

/// Deal creation request; the deal's user is always the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewDealRequest {
    pub item_id: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDealRequest {
    pub item_id: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DealResponse {
    pub id: i32,
    pub item_id: i32,
    pub user_id: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl From<deal::Model> for DealResponse {
    fn from(deal: deal::Model) -> Self {
        Self {
            id: deal.id,
            item_id: deal.item_id,
            user_id: deal.user_id,
            price: deal.price,
            created_at: deal.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page_info(), PageInfo::new(1, 10));
    }

    #[test]
    fn test_page_query_parses_values() {
        let query = PageQuery {
            page: Some("2".to_string()),
            size: Some("25".to_string()),
        };
        assert_eq!(query.page_info(), PageInfo::new(2, 25));
    }

    #[test]
    fn test_page_query_invalid_values_fall_back() {
        let query = PageQuery {
            page: Some("zero".to_string()),
            size: Some("-5".to_string()),
        };
        assert_eq!(query.page_info(), PageInfo::new(1, 10));
    }

    #[test]
    fn test_user_response_has_no_credentials() {
        let response = UserResponse {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("password"));
        assert!(!json.contains("salt"));
    }
}
