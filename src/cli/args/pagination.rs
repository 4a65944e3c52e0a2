//! Pagination arguments for list commands

use clap::Args;

use super::CallFilterArgs;
use crate::client::models::{CallQuery, MAX_PAGE_SIZE};

/// Offset paging for the call list.
#[derive(Args, Debug, Default, Clone)]
pub struct PaginationArgs {
    /// Number of calls to skip
    #[arg(long, default_value_t = 0)]
    pub skip: u32,

    /// Page size (1-200, defaults to the configured page size)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,
}

impl PaginationArgs {
    /// Build the list query from paging and filters.
    pub fn to_query(&self, filters: &CallFilterArgs, default_limit: u32) -> CallQuery {
        CallQuery {
            skip: self.skip,
            limit: self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            status: filters.status,
            sales_rep: filters.rep.clone(),
            upload_method: filters.upload_method,
            search: filters.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_query_uses_configured_default() {
        let query = PaginationArgs::default().to_query(&CallFilterArgs::default(), 25);
        assert_eq!(query.limit, 25);
        assert_eq!(query.skip, 0);
    }

    #[test]
    fn test_to_query_clamps_limit() {
        let paging = PaginationArgs {
            skip: 100,
            limit: Some(5000),
        };
        let query = paging.to_query(&CallFilterArgs::default(), 50);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.skip, 100);
    }
}
