/// Number of pages needed to show `count` items, `size` per page.
pub fn page_count(count: u64, size: u64) -> u64 {
    if size == 0 {
        0
    } else {
        (count + size - 1) / size
    }
}

/// Items to skip before the first one of the 1-based `page`.
pub fn page_skip(page: u64, size: u64) -> u64 {
    page.max(1).saturating_sub(1).saturating_mul(size)
}

pub fn slugify<S: AsRef<str>>(name: S) -> String {
    slug::slugify(name.as_ref())
}
