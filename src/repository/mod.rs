// src/repository/mod.rs
//! SQL access. Each repository is a unit struct whose functions accept any
//! SQLite executor, so the same call works on the pool or inside a transaction.

pub mod advertisement;
pub mod candidate;
pub mod profession;
pub mod user;

pub use advertisement::{AdvertisementFilter, AdvertisementRepository};
pub use candidate::{CandidateRepository, JobApplicationRepository};
pub use profession::ProfessionRepository;
pub use user::UserRepository;

/// One page of a listing with an already validated ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub offset: i64,
    pub limit: i64,
    pub sort_column: &'static str,
    pub descending: bool,
    /// Primary key of the listed entity, used to break ties
    pub id_column: &'static str,
}

impl PageQuery {
    /// Build from a 0-based page index, size and a `field[,asc|desc]` sort
    /// expression resolved against `allowed` (API field → column).
    pub fn new(
        page: u32,
        size: u32,
        sort: Option<&str>,
        allowed: &[(&str, &'static str)],
    ) -> Self {
        let id_column = allowed.first().map(|(_, col)| *col).unwrap_or("id");
        let mut sort_column = id_column;
        let mut descending = false;

        if let Some(sort) = sort {
            let mut parts = sort.split(',').map(str::trim);
            if let Some(field) = parts.next() {
                if let Some((_, column)) = allowed.iter().find(|(name, _)| *name == field) {
                    sort_column = *column;
                    descending = matches!(parts.next(), Some(dir) if dir.eq_ignore_ascii_case("desc"));
                }
            }
        }

        Self {
            offset: i64::from(page) * i64::from(size),
            limit: i64::from(size),
            sort_column,
            descending,
            id_column,
        }
    }

    /// `ORDER BY` clause; the column always comes from a static whitelist
    pub fn order_by(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        if self.sort_column == self.id_column {
            format!("ORDER BY {} {}", self.sort_column, direction)
        } else {
            format!(
                "ORDER BY {} {}, {} ASC",
                self.sort_column, direction, self.id_column
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[(&str, &'static str)] = &[
        ("id", "a.id"),
        ("title", "a.title"),
        ("profession", "p.name"),
    ];

    #[test]
    fn test_page_offsets() {
        let page = PageQuery::new(2, 20, None, FIELDS);
        assert_eq!(page.offset, 40);
        assert_eq!(page.limit, 20);
        assert_eq!(page.order_by(), "ORDER BY a.id ASC");
    }

    #[test]
    fn test_sort_whitelist() {
        let page = PageQuery::new(0, 10, Some("title,desc"), FIELDS);
        assert_eq!(page.order_by(), "ORDER BY a.title DESC, a.id ASC");

        let injected = PageQuery::new(0, 10, Some("title; DROP TABLE users,desc"), FIELDS);
        assert_eq!(injected.order_by(), "ORDER BY a.id ASC");
    }

    #[test]
    fn test_unaliased_columns() {
        let page = PageQuery::new(0, 10, Some("name"), &[("id", "id"), ("name", "name")]);
        assert_eq!(page.order_by(), "ORDER BY name ASC, id ASC");
    }

    #[test]
    fn test_joined_sort_breaks_ties_on_the_listed_entity() {
        let page = PageQuery::new(0, 10, Some("profession,desc"), FIELDS);
        assert_eq!(page.order_by(), "ORDER BY p.name DESC, a.id ASC");
    }
}
