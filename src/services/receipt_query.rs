// src/services/receipt_query.rs
//
// Pure search / filter / sort / page pipeline run after reconciliation.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::receiving::{DiscrepancyFilter, InboundView, Page, ReceiptQuery, SortOrder};

pub const MAX_PAGE_SIZE: i64 = 100;

/// Lowercase with diacritics stripped, so "Café" and "cafe" compare equal.
pub fn normalize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Normalized, whitespace separated tokens of a search string.
pub fn search_tokens(search: Option<&str>) -> Vec<String> {
    search
        .map(|s| s.split_whitespace().map(normalize).collect())
        .unwrap_or_default()
}

/// Every token has to be a substring of at least one display field.
pub fn matches_search<T: InboundView>(item: &T, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }

    let haystack: Vec<String> = item.search_fields().into_iter().map(normalize).collect();
    tokens
        .iter()
        .all(|token| haystack.iter().any(|field| field.contains(token.as_str())))
}

fn matches_filters<T: InboundView>(item: &T, query: &ReceiptQuery) -> bool {
    if let Some(supplier_id) = query.supplier_id {
        if item.supplier_id() != Some(supplier_id) {
            return false;
        }
    }

    if let Some(store_id) = query.store_id {
        if !item.involves_store(store_id) {
            return false;
        }
    }

    // Date range is inclusive on both ends
    let date = item.event_at().date_naive();
    if query.from.is_some_and(|from| date < from) || query.to.is_some_and(|to| date > to) {
        return false;
    }

    match query.discrepancy {
        DiscrepancyFilter::Any => true,
        DiscrepancyFilter::Discrepant => item.has_discrepancy() == Some(true),
        DiscrepancyFilter::Matching => item.has_discrepancy() != Some(true),
    }
}

pub fn filter_items<T: InboundView>(items: Vec<T>, query: &ReceiptQuery) -> Vec<T> {
    let tokens = search_tokens(query.search.as_deref());

    items
        .into_iter()
        .filter(|item| matches_search(item, &tokens) && matches_filters(item, query))
        .collect()
}

pub fn sort_items<T: InboundView>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::DateAsc => items.sort_by_key(|item| item.event_at()),
        SortOrder::DateDesc => items.sort_by_key(|item| std::cmp::Reverse(item.event_at())),
    }
}

/// 1-based page slicing. Page numbers below 1 are clamped to 1 and the page size
/// to `1..=MAX_PAGE_SIZE`. A page past the end is empty.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: i64) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = (total_items as i64 + page_size - 1) / page_size;

    let start = usize::try_from(page.saturating_sub(1).saturating_mul(page_size))
        .unwrap_or(usize::MAX);
    let items = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Filters, sorts and pages `items` according to `query`.
pub fn run<T: InboundView>(items: Vec<T>, query: &ReceiptQuery, default_page_size: i64) -> Page<T> {
    let mut items = filter_items(items, query);
    sort_items(&mut items, query.sort);
    paginate(
        items,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(default_page_size),
    )
}
