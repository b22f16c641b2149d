//! Query-string parsers for the list endpoint
//!
//! The parsers are lenient: anything missing or unparseable falls back to a
//! default, so a list request never fails because of its query string.
//!
//! ```rust
//! use std::collections::HashMap;
//! use contacts_service::config::PaginationConfig;
//! use contacts_service::handlers::parse_pagination_params;
//!
//! let params = HashMap::from([("page".to_string(), "3".to_string()), ("perPage".to_string(), "500".to_string())]);
//! let pagination = parse_pagination_params(&params, &PaginationConfig::default());
//! assert_eq!(pagination.page, 3);
//! assert_eq!(pagination.per_page, 100);
//! ```

use std::collections::HashMap;

use crate::config::PaginationConfig;
use crate::ids::UserId;
use crate::repository::{
    ContactFilter, ContactQuery, ContactType, Pagination, Sort, SortField, SortOrder,
};

/// Raw query string parameters
pub type QueryParams = HashMap<String, String>;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "perPage";
pub const SORT_BY_PARAM: &str = "sortBy";
pub const SORT_ORDER_PARAM: &str = "sortOrder";
pub const CONTACT_TYPE_PARAM: &str = "contactType";
pub const IS_FAVOURITE_PARAM: &str = "isFavourite";

fn parse_int(params: &QueryParams, key: &str) -> Option<i64> {
    params.get(key).and_then(|raw| raw.trim().parse::<i64>().ok())
}

fn clamp_to_u32(value: i64, min: u32, max: u32) -> u32 {
    u32::try_from(value.clamp(i64::from(min), i64::from(max))).unwrap_or(min)
}

/// `page` and `perPage`
///
/// Page numbers below 1 become 1. Page sizes are clamped to
/// `1..=config.max_per_page`.
#[must_use]
pub fn parse_pagination_params(params: &QueryParams, config: &PaginationConfig) -> Pagination {
    let max_per_page = config.max_per_page.max(1);
    let page = parse_int(params, PAGE_PARAM).map_or(1, |page| clamp_to_u32(page, 1, u32::MAX));
    let per_page = parse_int(params, PER_PAGE_PARAM).map_or_else(
        || config.default_per_page.clamp(1, max_per_page),
        |per_page| clamp_to_u32(per_page, 1, max_per_page),
    );
    Pagination::new(page, per_page)
}

/// `sortBy` and `sortOrder`, defaulting to `_id` ascending
#[must_use]
pub fn parse_sort_params(params: &QueryParams) -> Sort {
    let sort_by = params
        .get(SORT_BY_PARAM)
        .and_then(|key| SortField::from_key(key))
        .unwrap_or_default();
    let sort_order = match params.get(SORT_ORDER_PARAM).map(String::as_str) {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    };
    Sort {
        sort_by,
        sort_order,
    }
}

/// `contactType` and `isFavourite`; unrecognised values are dropped
#[must_use]
pub fn parse_filter_params(params: &QueryParams) -> ContactFilter {
    let contact_type = params
        .get(CONTACT_TYPE_PARAM)
        .and_then(|raw| raw.parse::<ContactType>().ok());
    let is_favourite = match params.get(IS_FAVOURITE_PARAM).map(String::as_str) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };
    ContactFilter {
        contact_type,
        is_favourite,
    }
}

/// Combine every parser into the list query for `user_id`
#[must_use]
pub fn contact_query(user_id: UserId, params: &QueryParams, config: &PaginationConfig) -> ContactQuery {
    ContactQuery::for_user(user_id)
        .with_pagination(parse_pagination_params(params, config))
        .with_sort(parse_sort_params(params))
        .with_filter(parse_filter_params(params))
}
