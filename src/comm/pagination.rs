/// 分页结果描述
/// Pagination descriptor
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Pagina {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub num_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagina {
    /// SQL OFFSET 值
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// SQL LIMIT 值
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// 解析页码参数并夹取到有效范围：
/// 非整数页码回退到第 1 页，超出范围的页码夹取到最后一页
/// Non-integer page params fall back to page 1, out-of-range pages clamp to the last page
pub fn paginate(raw_page: Option<&str>, per_page: u32, total: u64) -> Pagina {
    let per_page = per_page.max(1);
    let num_pages = if total == 0 {
        1
    } else {
        ((total + per_page as u64 - 1) / per_page as u64) as u32
    };

    let page = match raw_page {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(p) if p >= 1 => p.min(num_pages),
            _ => 1,
        },
        None => 1,
    };

    Pagina {
        page,
        per_page,
        total,
        num_pages,
        has_previous: page > 1,
        has_next: page < num_pages,
    }
}

/// 构建 RFC 5988 Link 头
pub fn build_link_header(base_url: &str, pagina: &Pagina) -> String {
    let mut links: Vec<String> = Vec::new();

    links.push(format!(
        "<{}?page=1&per_page={}>; rel=\"first\"",
        base_url, pagina.per_page
    ));
    links.push(format!(
        "<{}?page={}&per_page={}>; rel=\"last\"",
        base_url, pagina.num_pages, pagina.per_page
    ));
    if pagina.has_next {
        links.push(format!(
            "<{}?page={}&per_page={}>; rel=\"next\"",
            base_url,
            pagina.page + 1,
            pagina.per_page
        ));
    }
    if pagina.has_previous {
        links.push(format!(
            "<{}?page={}&per_page={}>; rel=\"prev\"",
            base_url,
            pagina.page - 1,
            pagina.per_page
        ));
    }
    links.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_basic() {
        let p = paginate(Some("2"), 12, 30);
        assert_eq!(p.page, 2);
        assert_eq!(p.num_pages, 3);
        assert_eq!(p.offset(), 12);
        assert!(p.has_previous);
        assert!(p.has_next);
    }

    #[test]
    fn test_paginate_non_integer_falls_back_to_first() {
        let p = paginate(Some("abc"), 12, 30);
        assert_eq!(p.page, 1);
        assert!(!p.has_previous);
    }

    #[test]
    fn test_paginate_out_of_range_clamps_to_last() {
        let p = paginate(Some("9999"), 12, 30);
        assert_eq!(p.page, 3);
        assert!(!p.has_next);
    }

    #[test]
    fn test_paginate_zero_page_falls_back_to_first() {
        let p = paginate(Some("0"), 12, 30);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_paginate_empty_total() {
        let p = paginate(None, 12, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.num_pages, 1);
        assert!(!p.has_next);
    }

    #[test]
    fn test_link_header_build() {
        let p = paginate(Some("2"), 30, 95);
        let h = build_link_header("https://api.example/recetas", &p);
        assert!(h.contains("rel=\"next\""));
        assert!(h.contains("rel=\"prev\""));
        assert!(h.contains("rel=\"last\""));
        assert!(h.contains("page=3"));
        assert!(h.contains("page=1"));
    }
}
