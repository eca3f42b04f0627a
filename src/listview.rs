//! Search/filter/paginate contract shared by the student, homework, and
//! sessional-mark list views. Recomputed from scratch on every call; the
//! backing collections are small and UI-bound.

pub const PAGE_SIZE: usize = 10;

/// Name rendered for a dangling cross-reference.
pub const UNKNOWN: &str = "Unknown";

/// Free-text query, exact-match field filter, and requested page as they
/// arrive from the UI. An empty search or filter disables that stage.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub search: String,
    pub filter: String,
    pub page: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Clamps a requested page into `[1, max(total_pages, 1)]`. Out-of-range
/// requests (page 0, negative, past the end) land on the nearest valid page
/// rather than erroring.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let cap = total_pages.max(1) as i64;
    requested.clamp(1, cap) as usize
}

pub fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Produces the visible page for one record type.
///
/// `matches_search` receives the lowercased, trimmed query and decides the
/// case-insensitive substring match against that type's searchable fields;
/// `matches_filter` is the exact-match predicate on the designated filter
/// field; `to_row` resolves cross-references into the emitted row.
pub fn render_page<T, R>(
    records: &[T],
    query: &PageQuery,
    matches_search: impl Fn(&T, &str) -> bool,
    matches_filter: impl Fn(&T, &str) -> bool,
    to_row: impl Fn(&T) -> R,
) -> Page<R> {
    let needle = query.search.trim().to_lowercase();
    let filtered: Vec<&T> = records
        .iter()
        .filter(|r| needle.is_empty() || matches_search(r, &needle))
        .filter(|r| query.filter.is_empty() || matches_filter(r, &query.filter))
        .collect();

    let total_pages = filtered.len().div_ceil(PAGE_SIZE);
    let current_page = clamp_page(query.page, total_pages);
    let start = (current_page - 1) * PAGE_SIZE;
    let rows = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .map(to_row)
        .collect();

    Page {
        rows,
        current_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Student {i:02}")).collect()
    }

    fn page_of(records: &[String], query: &PageQuery) -> Page<String> {
        render_page(
            records,
            query,
            |r, needle| contains_ci(r, needle),
            |r, f| r.ends_with(f),
            |r| r.clone(),
        )
    }

    #[test]
    fn total_pages_is_ceil_of_filtered_count() {
        for (count, expected) in [(0, 0), (1, 1), (10, 1), (11, 2), (25, 3)] {
            let records = names(count);
            let page = page_of(&records, &PageQuery {
                page: 1,
                ..PageQuery::default()
            });
            assert_eq!(page.total_pages, expected, "count={count}");
        }
    }

    #[test]
    fn out_of_range_pages_clamp_to_nearest_valid() {
        let records = names(25);
        let q = |page| PageQuery {
            page,
            ..PageQuery::default()
        };

        let first = page_of(&records, &q(1));
        assert_eq!(page_of(&records, &q(0)), first);
        assert_eq!(page_of(&records, &q(-7)), first);

        let last = page_of(&records, &q(3));
        assert_eq!(last.rows.len(), 5);
        assert_eq!(page_of(&records, &q(4)), last);
        assert_eq!(page_of(&records, &q(9999)), last);
    }

    #[test]
    fn empty_filtered_result_reports_a_single_empty_page() {
        let records = names(8);
        let page = page_of(&records, &PageQuery {
            search: "no such student".to_string(),
            filter: String::new(),
            page: 5,
        });
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn search_is_case_insensitive_and_idempotent() {
        let records = names(25);
        let q = PageQuery {
            search: "STUDENT 1".to_string(),
            filter: String::new(),
            page: 1,
        };
        let once = page_of(&records, &q);
        // "Student 1x" matches for x in 0..10.
        assert_eq!(once.rows.len(), 10);
        assert_eq!(once.total_pages, 1);

        // Re-applying the same query over its own result changes nothing.
        let twice = page_of(&once.rows, &q);
        assert_eq!(twice.rows, once.rows);
    }

    #[test]
    fn filter_composes_with_search() {
        let records = names(25);
        let page = page_of(&records, &PageQuery {
            search: "student 0".to_string(),
            filter: "3".to_string(),
            page: 1,
        });
        assert_eq!(page.rows, vec!["Student 03".to_string()]);
        assert_eq!(page.total_pages, 1);
    }
}
