//! Derived views over a store snapshot: search filtering and pagination.

use crate::models::Post;

pub const PAGE_SIZE: usize = 5;

/// Posts whose title or body contains `search`, ignoring case, in snapshot
/// order. An empty search keeps everything.
pub fn filter_posts(posts: &[Post], search: &str) -> Vec<Post> {
    if search.is_empty() {
        return posts.to_vec();
    }
    let needle = search.to_lowercase();
    posts
        .iter()
        .filter(|post| post.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Records in `[(page - 1) * PAGE_SIZE, page * PAGE_SIZE)`. Pages are
/// 1-based; page 0 and pages past the end are empty.
pub fn paginate(posts: &[Post], page: usize) -> &[Post] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE);
    if start >= posts.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(posts.len());
    &posts[start..end]
}

pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Current page of the posts grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageCursor {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total_pages: usize) -> bool {
        self.page < total_pages
    }
}

/// One rendered page of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub posts: Vec<Post>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl PageView {
    pub fn build(filtered: &[Post], cursor: PageCursor) -> Self {
        Self {
            posts: paginate(filtered, cursor.page()).to_vec(),
            page: cursor.page(),
            total_pages: total_pages(filtered.len()),
            total_matches: filtered.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }

    /// Prev/next controls only appear when there is more than one page.
    pub fn shows_pagination(&self) -> bool {
        self.total_matches > PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post(id: i64, title: &str, body: &str) -> Post {
        Post {
            id,
            title: title.into(),
            body: body.into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    fn numbered(count: i64) -> Vec<Post> {
        (0..count).map(|i| post(i, &format!("p{i}"), "")).collect()
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn filter_is_case_insensitive_on_title() {
        let posts = vec![post(1, "Alpha", ""), post(2, "beta", "")];
        assert_eq!(ids(&filter_posts(&posts, "AL")), vec![1]);
    }

    #[test]
    fn filter_matches_body_too() {
        let posts = vec![post(1, "one", "Lorem IPSUM"), post(2, "two", "dolor")];
        assert_eq!(ids(&filter_posts(&posts, "ipsum")), vec![1]);
    }

    #[test]
    fn empty_search_keeps_snapshot_order() {
        let posts = vec![post(3, "c", ""), post(1, "a", ""), post(2, "b", "")];
        assert_eq!(ids(&filter_posts(&posts, "")), vec![3, 1, 2]);
    }

    #[test]
    fn pagination_boundaries() {
        let posts = numbered(7);
        assert_eq!(ids(paginate(&posts, 1)), vec![0, 1, 2, 3, 4]);
        assert_eq!(ids(paginate(&posts, 2)), vec![5, 6]);
        assert!(paginate(&posts, 3).is_empty());
        assert!(paginate(&posts, 0).is_empty());
        assert_eq!(total_pages(7), 2);
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(10), 2);
    }

    #[test]
    fn cursor_clamps_both_ends() {
        let mut cursor = PageCursor::default();
        cursor.prev();
        assert_eq!(cursor.page(), 1);
        cursor.next(2);
        cursor.next(2);
        assert_eq!(cursor.page(), 2);
        assert!(cursor.has_prev());
        assert!(!cursor.has_next(2));
        cursor.next(0);
        assert_eq!(cursor.page(), 1);
    }

    #[test]
    fn page_view_reports_controls() {
        let posts = numbered(6);
        let view = PageView::build(&posts, PageCursor::default());
        assert_eq!(view.posts.len(), 5);
        assert_eq!(view.total_pages, 2);
        assert!(view.shows_pagination());

        let short = PageView::build(&posts[..5], PageCursor::default());
        assert!(!short.shows_pagination());
        assert!(PageView::build(&[], PageCursor::default()).is_empty());
    }
}
