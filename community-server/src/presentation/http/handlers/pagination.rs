use serde::Deserialize;
use utoipa::IntoParams;

use crate::data::pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest, Sort, SortDirection, SortField,
};
use crate::domain::error::DomainError;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(crate) struct PageQuery {
    /// Zero-based page index.
    pub(crate) page: Option<u32>,
    /// Items per page (1..=100).
    pub(crate) size: Option<u32>,
    /// Field to order by, e.g. `createdAt`.
    pub(crate) sort_by: Option<String>,
    /// `asc` or `desc`.
    pub(crate) sort_dir: Option<String>,
}

impl PageQuery {
    /// Fills the gaps from `default_sort`. The allow-list of sort fields is
    /// checked by the service.
    pub(crate) fn into_request(self, default_sort: Sort) -> Result<PageRequest, DomainError> {
        let field = match self.sort_by.as_deref() {
            Some(raw) => SortField::parse(raw).ok_or(DomainError::Validation {
                field: "sortBy",
                message: "unsupported sort field",
            })?,
            None => default_sort.field,
        };
        let direction = match self.sort_dir.as_deref() {
            Some(raw) => SortDirection::parse(raw).ok_or(DomainError::Validation {
                field: "sortDir",
                message: "must be asc or desc",
            })?,
            None => default_sort.direction,
        };

        Ok(PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            Sort::new(field, direction),
        ))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(crate) struct SearchQuery {
    /// Case-insensitive substring to look for.
    pub(crate) search_term: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct LimitQuery {
    /// Number of items (1..=100).
    pub(crate) limit: Option<u32>,
}
