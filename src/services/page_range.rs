//! 页码范围计算

use crate::error::{StageError, StageResult};
use crate::models::PageRange;

/// 根据已分配的累计页数和本篇页数计算页码范围
///
/// 页数为 0 时没有范围；累计页数超出 `u32` 时返回错误
pub fn compute_range(last_total_pages: u32, page_count: u32) -> StageResult<Option<PageRange>> {
    if page_count == 0 {
        return Ok(None);
    }
    let last = last_total_pages
        .checked_add(page_count)
        .ok_or(StageError::PageTotalOverflow {
            last_total_pages,
            page_count,
        })?;
    Ok(Some(PageRange {
        first: last_total_pages + 1,
        last,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_page_range() {
        let range = compute_range(26, 15).unwrap().unwrap();
        assert_eq!(range, PageRange { first: 27, last: 41 });
        assert_eq!(range.to_string(), "27-41");
    }

    #[test]
    fn test_single_page_range_renders_one_number() {
        let range = compute_range(26, 1).unwrap().unwrap();
        assert_eq!(range, PageRange { first: 27, last: 27 });
        assert_eq!(range.to_string(), "27");
    }

    #[test]
    fn test_first_paper_starts_at_page_one() {
        assert_eq!(compute_range(0, 10).unwrap().unwrap().to_string(), "1-10");
    }

    #[test]
    fn test_zero_pages_has_no_range() {
        assert_eq!(compute_range(26, 0).unwrap(), None);
    }

    #[test]
    fn test_page_total_overflow_is_an_error() {
        let err = compute_range(u32::MAX - 5, 10).unwrap_err();
        assert!(matches!(
            err,
            StageError::PageTotalOverflow {
                page_count: 10,
                ..
            }
        ));
        assert_eq!(
            compute_range(u32::MAX - 10, 10).unwrap().unwrap().last,
            u32::MAX
        );
    }
}
