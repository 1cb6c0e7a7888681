use serde::Deserialize;

use crate::repos::{ListingFilter, ListingStatus};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

fn paginate(filter: &mut ListingFilter, limit: Option<i64>, offset: Option<i64>) {
    filter.limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    filter.offset = offset.unwrap_or(0).max(0);
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn into_filter(self, mut filter: ListingFilter) -> ListingFilter {
        paginate(&mut filter, self.limit, self.offset);
        filter
    }
}

/// Query string of `GET /properties/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchQuery {
    /// Public searches only ever see approved listings.
    pub fn into_filter(self) -> Result<ListingFilter, String> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err("minPrice must not exceed maxPrice".into());
        }

        let mut filter = ListingFilter {
            status: Some(ListingStatus::Approved),
            city: non_blank(self.city),
            property_type: non_blank(self.property_type),
            min_price: self.min_price,
            max_price: self.max_price,
            ..Default::default()
        };
        paginate(&mut filter, self.limit, self.offset);
        Ok(filter)
    }
}

/// Query string of `GET /properties/admin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AdminQuery {
    pub fn into_filter(self) -> Result<ListingFilter, String> {
        let status = match non_blank(self.status) {
            Some(s) => s.parse()?,
            None => ListingStatus::Pending,
        };

        let mut filter = ListingFilter {
            status: Some(status),
            ..Default::default()
        };
        paginate(&mut filter, self.limit, self.offset);
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_limited_to_approved() {
        let filter = SearchQuery {
            city: Some(" Pune ".into()),
            property_type: Some(String::new()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.status, Some(ListingStatus::Approved));
        assert_eq!(filter.city.as_deref(), Some("Pune"));
        assert!(filter.property_type.is_none());
        assert_eq!(filter.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let query = SearchQuery {
            min_price: Some(10.0),
            max_price: Some(5.0),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn admin_status_defaults_to_pending() {
        let filter = AdminQuery::default().into_filter().unwrap();
        assert_eq!(filter.status, Some(ListingStatus::Pending));

        let filter = AdminQuery {
            status: Some("rejected".into()),
            limit: Some(1000),
            offset: Some(-3),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, Some(ListingStatus::Rejected));
        assert_eq!(filter.limit, MAX_LIMIT);
        assert_eq!(filter.offset, 0);

        let unknown = AdminQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(unknown.into_filter().is_err());
    }
}
