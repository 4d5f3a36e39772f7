use plaza_types::paging::{Page, PageRequest};

use crate::error::{CommunityError, Result};

pub fn validate(request: PageRequest, max_page_size: u32) -> Result<()> {
    if request.size == 0 {
        return Err(CommunityError::invalid_input("page size must be at least 1"));
    }
    if request.size > max_page_size {
        return Err(CommunityError::invalid_input(format!(
            "page size must be at most {}",
            max_page_size
        )));
    }
    Ok(())
}

/// Builds a page from a known total, a row fetcher taking `(limit, offset)`
/// and a row-to-DTO mapper. The fetcher is skipped when the page lies past
/// the end, so out-of-range pages come back empty with correct totals.
pub fn paginate<R, T, F, M>(total: u64, request: PageRequest, fetch: F, map: M) -> Result<Page<T>>
where
    F: FnOnce(u32, u64) -> anyhow::Result<Vec<R>>,
    M: FnMut(R) -> anyhow::Result<T>,
{
    let rows = if request.offset() >= total {
        Vec::new()
    } else {
        fetch(request.size, request.offset())?
    };

    let items = rows.into_iter().map(map).collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Page::new(request, total, items))
}
