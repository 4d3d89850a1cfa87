// Wikipedia page extraction for actor and movie articles

use crate::error::{Result, ScanError};
use crate::kind::EntityKind;
use crate::result::PageRecord;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Parse `html` fetched from `url` as a page of the given kind.
pub fn extract_page(html: &str, url: &str, kind: EntityKind) -> Result<PageRecord> {
    let document = Html::parse_document(html);
    match kind {
        EntityKind::Actor => extract_actor(&document, url),
        EntityKind::Movie => extract_movie(&document, url),
    }
}

fn extract_actor(document: &Html, url: &str) -> Result<PageRecord> {
    let name = heading_text(document).ok_or_else(|| missing(url, EntityKind::Actor, "name"))?;

    let age_selector = Selector::parse("span.noprint.ForceAgeToShow").unwrap();
    let age = document
        .select(&age_selector)
        .next()
        .map(element_text)
        .and_then(|text| {
            let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<i64>().ok()
        })
        .ok_or_else(|| missing(url, EntityKind::Actor, "age"))?;

    let mut links = film_links_from_columns(document, url);
    if links.is_empty() {
        links = film_links_from_table(document, url);
    }
    debug!("Actor {} (age {}) links to {} films", name, age, links.len());

    Ok(PageRecord::actor(url, name, age).with_links(links))
}

fn extract_movie(document: &Html, url: &str) -> Result<PageRecord> {
    let title = heading_text(document).ok_or_else(|| missing(url, EntityKind::Movie, "title"))?;

    let gross_text = infobox_value(document, "Box office")
        .ok_or_else(|| missing(url, EntityKind::Movie, "box office"))?;
    let gross = parse_gross(&element_text(gross_text))
        .ok_or_else(|| ScanError::ParseError(format!("unreadable box office for {}", title)))?;

    let year = infobox_value(document, "Release date")
        .and_then(|cell| first_year(&element_text(cell)))
        .ok_or_else(|| missing(url, EntityKind::Movie, "release year"))?;

    let links = infobox_value(document, "Starring")
        .map(|cell| article_links(cell, url))
        .unwrap_or_default();
    debug!("Movie {} ({}) grossed {} and lists {} actors", title, year, gross, links.len());

    Ok(PageRecord::movie(url, title, year, gross).with_links(links))
}

fn missing(url: &str, kind: EntityKind, field: &'static str) -> ScanError {
    ScanError::MissingField {
        url: url.to_string(),
        kind,
        field,
    }
}

fn heading_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1.firstHeading").unwrap();
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The cell that follows the infobox header labelled `label`.
fn infobox_value<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    let th_selector = Selector::parse("th").unwrap();
    document
        .select(&th_selector)
        .find(|th| element_text(*th) == label)
        .and_then(|th| th.next_siblings().find_map(ElementRef::wrap))
}

fn film_links_from_columns(document: &Html, url: &str) -> Vec<String> {
    let selector = Selector::parse("div.div-col").unwrap();
    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for column in document.select(&selector) {
        for link in article_links(column, url) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }
    links
}

/// Film links from the first wikitable following the "Film" section heading.
fn film_links_from_table(document: &Html, url: &str) -> Vec<String> {
    let selector =
        Selector::parse("span.mw-headline#Film, h2#Film, h3#Film, table.wikitable").unwrap();
    let td_selector = Selector::parse("td").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut in_film_section = false;
    for element in document.select(&selector) {
        if element.value().name() != "table" {
            in_film_section = true;
            continue;
        }
        if !in_film_section {
            continue;
        }

        let mut links = Vec::new();
        let mut seen = HashSet::new();
        for td in element.select(&td_selector) {
            let href = td
                .select(&anchor_selector)
                .next()
                .and_then(|a| a.value().attr("href"));
            if let Some(href) = href
                && let Some(link) = resolve_article_link(url, href)
                && seen.insert(link.clone())
            {
                links.push(link);
            }
        }
        return links;
    }
    Vec::new()
}

/// All distinct article links inside `element`, in document order.
fn article_links(element: ElementRef<'_>, url: &str) -> Vec<String> {
    let selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for anchor in element.select(&selector) {
        if let Some(href) = anchor.value().attr("href")
            && let Some(link) = resolve_article_link(url, href)
            && seen.insert(link.clone())
        {
            links.push(link);
        }
    }
    links
}

/// Resolve `href` against the page and keep it only if it names a
/// main-namespace article on the same host.
pub fn resolve_article_link(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    if resolved.host_str() != base_url.host_str() {
        return None;
    }
    let article = resolved.path().strip_prefix("/wiki/")?;
    if article.is_empty() || article.contains(':') || resolved.query().is_some() {
        return None;
    }

    Some(resolved.to_string())
}

/// First four-digit run in `text`, read as a year.
pub fn first_year(text: &str) -> Option<i64> {
    let chars: Vec<char> = text.chars().collect();
    let mut run_start = None;
    for (i, c) in chars.iter().chain(std::iter::once(&' ')).enumerate() {
        if c.is_ascii_digit() {
            run_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = run_start.take()
            && i - start == 4
        {
            return chars[start..i].iter().collect::<String>().parse().ok();
        }
    }
    None
}

/// Parse a box-office string such as `"$1.2 billion[3]"` or
/// `"$45,300,000 (worldwide)"` into whole currency units.
pub fn parse_gross(raw: &str) -> Option<i64> {
    let cleaned = strip_bracketed(raw).to_lowercase();

    let magnitude: i128 = if cleaned.contains("billion") {
        1_000_000_000
    } else if cleaned.contains("million") {
        1_000_000
    } else if cleaned.contains("thousand") {
        1_000
    } else {
        1
    };

    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let mut whole = String::new();
    let mut fraction = String::new();
    let mut in_fraction = false;
    let mut rest = cleaned[start..].chars().peekable();
    while let Some(c) = rest.next() {
        match c {
            '0'..='9' if in_fraction => fraction.push(c),
            '0'..='9' => whole.push(c),
            ',' => continue,
            '.' if !in_fraction && rest.peek().is_some_and(|n| n.is_ascii_digit()) => {
                in_fraction = true;
            }
            _ => break,
        }
    }

    let whole: i128 = whole.parse().ok()?;
    let mut value = whole.checked_mul(magnitude)?;
    if !fraction.is_empty() {
        let scale = 10i128.checked_pow(fraction.len() as u32)?;
        let fraction: i128 = fraction.parse().ok()?;
        value += fraction.checked_mul(magnitude)? / scale;
    }

    i64::try_from(value).ok()
}

fn strip_bracketed(raw: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
