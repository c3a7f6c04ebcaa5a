use crate::domain::error::DomainError;

pub(crate) const DEFAULT_PAGE: u32 = 0;
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortField {
    Id,
    CreatedAt,
    UpdatedAt,
    Title,
    Username,
    Email,
    FirstName,
    LastName,
}

impl SortField {
    /// Accepts the camelCase names used in query strings as well as the
    /// snake_case column names.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let field = match raw.trim() {
            "id" => SortField::Id,
            "createdAt" | "created_at" => SortField::CreatedAt,
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "username" => SortField::Username,
            "email" => SortField::Email,
            "firstName" | "first_name" => SortField::FirstName,
            "lastName" | "last_name" => SortField::LastName,
            _ => return None,
        };
        Some(field)
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sort {
    pub(crate) field: SortField,
    pub(crate) direction: SortDirection,
}

impl Sort {
    pub(crate) const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub(crate) const fn newest_first() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }

    /// `ORDER BY` body with the id as tie breaker, e.g. `created_at DESC, id DESC`.
    /// The column is qualified with `table` when given.
    pub(crate) fn order_by(&self, table: Option<&str>) -> String {
        let dir = self.direction.as_sql();
        let prefix = table.map(|t| format!("{t}.")).unwrap_or_default();
        if self.field == SortField::Id {
            format!("{prefix}id {dir}")
        } else {
            format!("{prefix}{} {dir}, {prefix}id {dir}", self.field.column())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) sort: Sort,
}

impl PageRequest {
    pub(crate) fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self { page, size, sort }
    }

    pub(crate) fn first(size: u32, sort: Sort) -> Self {
        Self::new(0, size, sort)
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub(crate) fn ensure_valid(&self, sortable: &[SortField]) -> Result<(), DomainError> {
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(DomainError::Validation {
                field: "size",
                message: "must be 1..100",
            });
        }
        if !sortable.contains(&self.sort.field) {
            return Err(DomainError::Validation {
                field: "sortBy",
                message: "unsupported sort field",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total: i64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }

    pub(crate) fn total_pages(&self) -> i64 {
        if self.size == 0 {
            return 0;
        }
        let size = i64::from(self.size);
        (self.total + size - 1) / size
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest, Sort, SortDirection, SortField};

    #[test]
    fn sort_field_accepts_camel_and_snake_case() {
        assert_eq!(SortField::parse("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("created_at"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("password_hash"), None);
    }

    #[test]
    fn order_by_adds_id_tie_breaker() {
        let sort = Sort::newest_first();
        assert_eq!(sort.order_by(None), "created_at DESC, id DESC");
        assert_eq!(sort.order_by(Some("p")), "p.created_at DESC, p.id DESC");

        let by_id = Sort::new(SortField::Id, SortDirection::Asc);
        assert_eq!(by_id.order_by(None), "id ASC");
    }

    #[test]
    fn page_request_rejects_unsupported_sort_and_size() {
        let req = PageRequest::new(0, 10, Sort::new(SortField::Email, SortDirection::Asc));
        assert!(req.ensure_valid(&[SortField::Id, SortField::CreatedAt]).is_err());
        assert!(req.ensure_valid(&[SortField::Email]).is_ok());

        let oversized = PageRequest::new(0, 101, Sort::newest_first());
        assert!(oversized.ensure_valid(&[SortField::CreatedAt]).is_err());
    }

    #[test]
    fn offset_and_total_pages_follow_zero_based_pages() {
        let req = PageRequest::new(2, 10, Sort::newest_first());
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);

        let page: Page<u8> = Page::new(Vec::new(), &req, 21);
        assert_eq!(page.total_pages(), 3);
    }
}
