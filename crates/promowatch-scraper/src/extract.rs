//! Campaign extraction from one page of markup.
//!
//! Strategies run in fixed priority order and the first one that yields a
//! plausible candidate wins for the page:
//!
//! 1. campaign/promotion cards (`[class*="campaign"]`, `[class*="promo"]`)
//! 2. offer/benefit cards (`[class*="offer"]`, `[data-component="offer"]`,
//!    `[class*="benefit"]`, `[class*="member"]`)
//! 3. promotional headings paired with the paragraph that follows them

use std::collections::HashSet;
use std::sync::LazyLock;

use promowatch_core::CandidateRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::normalize::{char_len, clean_text, resolve_link};

/// Names must be longer than this many characters.
const MIN_NAME_CHARS: usize = 3;
/// Descriptions longer than this are preferred over shorter matches.
const MIN_INFO_CHARS: usize = 10;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static CAMPAIGN_CARDS: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="campaign"], [class*="promo"]"#));

static OFFER_CARDS: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#"[class*="offer"], [data-component="offer"], [class*="benefit"], [class*="member"]"#,
    )
});

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4"));

static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "h1",
        "h2",
        "h3",
        "h4",
        ".title",
        ".name",
        ".heading",
        r#"[class*="title"]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static INFO_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "p",
        ".description",
        ".info",
        ".content",
        ".summary",
        r#"[class*="desc"]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static PROMO_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)优惠|促销|特价|活动|会员.*专享|\boffers?\b|\bpromotions?\b|\bdeals?\b|\bspecials?\b")
        .expect("valid promo heading regex")
});

/// Extracts candidate campaigns from one page.
///
/// Zero candidates is a valid result. Candidates within a page are
/// de-duplicated by name, first occurrence wins.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when the markup is empty or contains no
/// elements at all.
pub fn extract_candidates(
    markup: &str,
    page_url: &str,
) -> Result<Vec<CandidateRecord>, ScraperError> {
    if markup.trim().is_empty() {
        return Err(ScraperError::Parse {
            url: page_url.to_owned(),
            reason: "document is empty".to_owned(),
        });
    }

    let document = Html::parse_document(markup);
    if !has_body_content(&document) {
        return Err(ScraperError::Parse {
            url: page_url.to_owned(),
            reason: "document has no elements".to_owned(),
        });
    }

    let strategies: [&dyn Fn() -> Vec<CandidateRecord>; 3] = [
        &|| cards(&document, &CAMPAIGN_CARDS, page_url),
        &|| cards(&document, &OFFER_CARDS, page_url),
        &|| promo_headings(&document, page_url),
    ];

    for (index, strategy) in strategies.iter().enumerate() {
        let candidates = dedup_by_name(strategy());
        if !candidates.is_empty() {
            tracing::debug!(
                url = page_url,
                strategy = index + 1,
                count = candidates.len(),
                "extracted candidates"
            );
            return Ok(candidates);
        }
    }

    Ok(Vec::new())
}

/// True when parsing produced anything beyond the implied
/// `<html>`/`<head>`/`<body>` skeleton.
fn has_body_content(document: &Html) -> bool {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| !matches!(el.value().name(), "html" | "head" | "body"))
        || !clean_text(&document.root_element().text().collect::<String>()).is_empty()
}

fn cards(document: &Html, card_selector: &Selector, page_url: &str) -> Vec<CandidateRecord> {
    document
        .select(card_selector)
        .filter_map(|card| candidate_from_card(card, page_url))
        .collect()
}

fn candidate_from_card(card: ElementRef<'_>, page_url: &str) -> Option<CandidateRecord> {
    let name = card_name(card)?;
    let info = card_info(card, &name);
    let source_url = card_link(card, page_url).unwrap_or_else(|| page_url.to_owned());
    Some(CandidateRecord {
        name,
        info,
        source_url,
    })
}

/// First plausible name, trying selectors in priority order.
fn card_name(card: ElementRef<'_>) -> Option<String> {
    NAME_SELECTORS.iter().find_map(|sel| {
        let el = card.select(sel).next()?;
        let text = element_text(el);
        (char_len(&text) > MIN_NAME_CHARS).then_some(text)
    })
}

/// First description longer than [`MIN_INFO_CHARS`]; otherwise the first
/// non-empty one. Text equal to the name is never used as the description.
fn card_info(card: ElementRef<'_>, name: &str) -> Option<String> {
    let mut fallback = None;
    for sel in INFO_SELECTORS.iter() {
        let Some(el) = card.select(sel).next() else {
            continue;
        };
        let text = element_text(el);
        if text.is_empty() || text == name {
            continue;
        }
        if char_len(&text) > MIN_INFO_CHARS {
            return Some(text);
        }
        fallback.get_or_insert(text);
    }
    fallback
}

fn card_link(card: ElementRef<'_>, page_url: &str) -> Option<String> {
    let own = if card.value().name() == "a" {
        card.value().attr("href")
    } else {
        None
    };
    let href = own.or_else(|| card.select(&LINK).next()?.value().attr("href"))?;
    resolve_link(page_url, href)
}

fn promo_headings(document: &Html, page_url: &str) -> Vec<CandidateRecord> {
    document
        .select(&HEADINGS)
        .filter_map(|heading| {
            let name = element_text(heading);
            if char_len(&name) <= MIN_NAME_CHARS || !PROMO_HEADING.is_match(&name) {
                return None;
            }
            let info = heading
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|next| next.value().name() == "p")
                .map(element_text)
                .filter(|text| !text.is_empty());
            let source_url = heading
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(page_url, href))
                .unwrap_or_else(|| page_url.to_owned());
            Some(CandidateRecord {
                name,
                info,
                source_url,
            })
        })
        .collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

fn dedup_by_name(candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
