use serde::Serialize;

/// 分页加载状态（无限滚动 / “加载更多”）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    next_page: u32,
    per_page: usize,
    has_more: bool,
    in_flight: bool,
}

/// 追加到请求上的分页参数
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            next_page: 1,
            per_page: per_page.max(1),
            has_more: true,
            in_flight: false,
        }
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// 下一次要请求的页；没有更多数据时返回 None
    pub fn next_query(&self) -> Option<PageQuery> {
        self.has_more.then_some(PageQuery {
            page: self.next_page,
            per_page: self.per_page,
        })
    }

    /// 占用下一页。已有请求在途或没有更多时返回 None，
    /// 直到 record_page 或 abort 之前不会再次发出同一页
    pub fn begin(&mut self) -> Option<PageQuery> {
        if self.in_flight {
            return None;
        }
        let query = self.next_query()?;
        self.in_flight = true;
        Some(query)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// 请求失败或被丢弃，下次重新请求同一页
    pub fn abort(&mut self) {
        self.in_flight = false;
    }

    /// 记录一页结果。条数少于每页大小说明已到末尾
    pub fn record_page(&mut self, received: usize) {
        self.in_flight = false;
        self.next_page += 1;
        if received < self.per_page {
            self.has_more = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.per_page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pages_keep_loading() {
        let mut pager = Paginator::new(10);
        assert_eq!(pager.next_query().unwrap().page, 1);

        pager.record_page(10);
        assert!(pager.has_more());
        assert_eq!(pager.next_query().unwrap().page, 2);
    }

    #[test]
    fn test_short_page_stops_loading() {
        let mut pager = Paginator::new(10);
        pager.record_page(10);
        pager.record_page(3);
        assert!(!pager.has_more());
        assert!(pager.next_query().is_none());
    }

    #[test]
    fn test_empty_first_page() {
        let mut pager = Paginator::new(10);
        pager.record_page(0);
        assert!(!pager.has_more());

        pager.reset();
        assert_eq!(pager.next_query().unwrap().page, 1);
    }

    #[test]
    fn test_page_is_reserved_until_recorded() {
        let mut pager = Paginator::new(10);
        assert_eq!(pager.begin().unwrap().page, 1);
        assert!(pager.is_in_flight());
        assert!(pager.begin().is_none());

        pager.record_page(10);
        assert_eq!(pager.begin().unwrap().page, 2);
        pager.abort();
        assert_eq!(pager.begin().unwrap().page, 2);
    }
}
