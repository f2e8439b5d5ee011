//! Main product image resolution.
//!
//! ### Generic strategy
//! 1. `og:image` / `twitter:image` meta tags
//! 2. JSON-LD `Product.image` (string, list of strings, or object with `url` / `@id`)
//! 3. `<img>` elements whose class or id hints at a product gallery
//!
//! ### Size-tier strategy
//! Used for vendors that publish every image in `small` / `large` / `highres`
//! directories. Candidates are collected from the raw markup, from URL-bearing
//! attributes (thumbnail paths are rewritten to their large equivalent) and from
//! "zoom" links, then filtered, de-duplicated and ranked by [`RankKey`].
//!
//! Neither strategy ever returns a URL that looks like a logo, sprite or icon.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::jsonld::{Object, StructuredData};
use super::normalize::clean_text;
use super::page::{Page, element_text};

/// Keywords that disqualify an image URL in the generic strategy.
pub const LOGO_KEYWORDS: &[&str] = &["logo", "sprite", "favicon", "icon", "social"];

/// Keywords that disqualify an image URL in the size-tier strategy.
const TIERED_REJECT_KEYWORDS: &[&str] = &["logo", "sprite", "icon", "banner", "social", "favicon"];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

const META_IMAGE_KEYS: &[(&str, &str)] =
    &[("property", "og:image"), ("name", "og:image"), ("property", "twitter:image"), ("name", "twitter:image")];

const GALLERY_HINTS: &[&str] = &["product", "main", "detail", "primary", "gallery"];

/// Attributes that may carry an image URL on `a`, `img`, `source` and `link` elements.
const URL_ATTRIBUTES: &[&str] =
    &["href", "src", "data-src", "data-original", "data-large", "data-zoom-image", "data-image", "data-full"];

static ABSOLUTE_TIERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^"'\s>]+/images/(?:large|highres)/[^"'\s>]+\.(?:jpe?g|png|webp)"#)
        .expect("invalid regex")
});
static RELATIVE_TIERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)/images/(?:large|highres)/[^"'\s>]+\.(?:jpe?g|png|webp)"#).expect("invalid regex")
});
static SMALL_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/images/(?:small|tabimages)/").expect("invalid regex"));
static SMALL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[-_](?:sml|small)(\.(?:jpe?g|png|webp))$").expect("invalid regex"));
static LARGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_]lrg\.(?:jpe?g|png|webp)$").expect("invalid regex"));
static ZOOM_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:zoom|click to enlarge)\b").expect("invalid regex"));

/// Whether a URL contains any logo/sprite/icon/favicon/social keyword.
pub fn looks_like_logo(url: &str) -> bool {
    let lower = url.to_lowercase();
    LOGO_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Generic main-image lookup for any page.
pub fn find_image_generic(page: &Page) -> Option<String> {
    image_from_meta(page, |url| !looks_like_logo(url))
        .or_else(|| image_from_structured(page))
        .or_else(|| image_from_gallery(page))
}

/// First social/open-graph image URL accepted by `accept`.
pub fn image_from_meta(page: &Page, accept: impl Fn(&str) -> bool) -> Option<String> {
    META_IMAGE_KEYS
        .iter()
        .filter_map(|(attr, key)| page.meta_content(attr, key))
        .filter_map(|content| page.absolutize(&content))
        .find(|url| accept(url.as_str()))
}

/// First usable image from a JSON-LD item typed `Product`.
pub fn image_from_structured(page: &Page) -> Option<String> {
    let data = StructuredData::from_page(page);
    data.items_of_type(&["product"])
        .flat_map(structured_image_urls)
        .filter_map(|candidate| page.absolutize(&candidate))
        .find(|url| !looks_like_logo(url))
}

fn structured_image_urls(item: &Object) -> Vec<String> {
    match item.get("image") {
        Some(Value::String(url)) => vec![url.clone()],
        Some(Value::Array(urls)) => urls.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::Object(image)) => ["url", "@id"]
            .iter()
            .find_map(|key| image.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| vec![url.to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// First `<img>` whose class or id carries a gallery hint.
pub fn image_from_gallery(page: &Page) -> Option<String> {
    page.select("img").into_iter().find_map(|img| {
        let el = img.value();
        let src = ["src", "data-src", "data-original"]
            .iter()
            .filter_map(|attr| el.attr(attr))
            .map(str::trim)
            .find(|src| !src.is_empty())?;
        if src.starts_with("data:") {
            return None;
        }

        let hints = format!("{} {}", el.attr("class").unwrap_or_default(), el.attr("id").unwrap_or_default())
            .to_lowercase();
        if !GALLERY_HINTS.iter().any(|hint| hints.contains(hint)) {
            return None;
        }

        page.absolutize(src).filter(|url| !looks_like_logo(url))
    })
}

/// Map a thumbnail-tier path to its large-tier equivalent.
///
/// `/images/small/` and `/images/tabimages/` become `/images/large/`, and a
/// `-sml` / `_small` style filename suffix becomes `-lrg`.
pub fn upgrade_size_tier(path: &str) -> String {
    let upgraded = SMALL_DIR.replace_all(path, "/images/large/");
    SMALL_SUFFIX.replace(&upgraded, "-lrg${1}").into_owned()
}

/// Directory tier of an image path, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathTier {
    Large,
    Highres,
    Other,
}

/// Ranking key for an image candidate; lower sorts first.
///
/// Field order is significance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    pub not_large_suffix: bool,
    pub tier: PathTier,
    pub model_absent: bool,
    pub length: usize,
}

impl RankKey {
    pub fn for_url(url: &str, model: Option<&str>) -> Self {
        let lower = url.to_lowercase();

        let tier = if lower.contains("/images/large/") {
            PathTier::Large
        } else if lower.contains("/images/highres/") {
            PathTier::Highres
        } else {
            PathTier::Other
        };

        let filename = lower.rsplit('/').next().unwrap_or_default();
        let model_present = model
            .map(str::to_lowercase)
            .is_some_and(|model| !model.is_empty() && filename.contains(&model));

        Self {
            not_large_suffix: !LARGE_SUFFIX.is_match(&lower),
            tier,
            model_absent: !model_present,
            length: lower.chars().count(),
        }
    }
}

/// An absolute image URL with its ranking key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub key: RankKey,
}

/// Rules for the size-tier strategy.
#[derive(Debug, Clone, Copy)]
pub struct TieredImageRules<'a> {
    /// Exact URLs (compared case-insensitively) that are known vendor logos.
    pub logo_blocklist: &'a [&'a str],
}

impl TieredImageRules<'_> {
    /// Whether a candidate URL is an acceptable product image.
    pub fn accepts(&self, url: &str) -> bool {
        let lower = url.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        if self.logo_blocklist.iter().any(|logo| logo.to_lowercase() == lower) {
            return false;
        }

        !TIERED_REJECT_KEYWORDS.iter().any(|k| lower.contains(k))
            && IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }
}

/// Size-tier image lookup.
///
/// Returns the best-ranked candidate, or the first acceptable open-graph image
/// when no candidate survives filtering.
pub fn find_image_tiered(page: &Page, model: Option<&str>, rules: TieredImageRules<'_>) -> Option<String> {
    let candidates = tiered_candidates(page, model, rules);
    if let Some(best) = candidates.first() {
        tracing::debug!(url = %best.url, candidates = candidates.len(), "picked tiered image");
        return Some(best.url.clone());
    }

    image_from_meta(page, |url| rules.accepts(url))
}

/// All acceptable size-tier candidates, de-duplicated and sorted best first.
pub fn tiered_candidates(page: &Page, model: Option<&str>, rules: TieredImageRules<'_>) -> Vec<ImageCandidate> {
    let mut raw = scan_markup(page.raw());
    raw.extend(harvest_attributes(page));
    raw.extend(zoom_link(page));

    let mut seen = HashSet::new();
    let mut candidates: Vec<ImageCandidate> = raw
        .iter()
        .filter_map(|href| page.absolutize(href))
        .filter(|url| rules.accepts(url))
        .filter(|url| seen.insert(url.clone()))
        .map(|url| {
            let key = RankKey::for_url(&url, model);
            ImageCandidate { url, key }
        })
        .collect();

    candidates.sort_by_key(|candidate| candidate.key);
    candidates
}

/// Large/highres image paths written anywhere in the markup.
fn scan_markup(markup: &str) -> Vec<String> {
    let mut found: Vec<String> = ABSOLUTE_TIERED.find_iter(markup).map(|m| m.as_str().to_string()).collect();

    // Root-relative paths only; a match preceded by URL characters is the tail of an absolute URL.
    found.extend(
        RELATIVE_TIERED
            .find_iter(markup)
            .filter(|m| !markup[..m.start()].chars().next_back().is_some_and(is_url_char))
            .map(|m| m.as_str().to_string()),
    );

    found
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~' | '%' | ':' | '/')
}

/// Tiered image URLs from URL-bearing attributes, thumbnails upgraded.
fn harvest_attributes(page: &Page) -> Vec<String> {
    let mut found = Vec::new();

    for element in page.select("a, img, source, link") {
        for attr in URL_ATTRIBUTES {
            let Some(value) = element.value().attr(attr).map(str::trim) else {
                continue;
            };
            if value.is_empty() || value.starts_with("data:") {
                continue;
            }

            let lower = value.to_lowercase();
            if lower.contains("/images/large/") || lower.contains("/images/highres/") {
                found.push(value.to_string());
            }
            if lower.contains("/images/small/") || lower.contains("/images/tabimages/") {
                found.push(upgrade_size_tier(value));
            }
        }
    }

    found
}

/// Target of the first "zoom" / "click to enlarge" anchor.
fn zoom_link(page: &Page) -> Option<String> {
    let anchor = page.select("a").into_iter().find(|a| {
        clean_text(&element_text(*a)).is_some_and(|text| ZOOM_TEXT.is_match(&text))
    })?;

    anchor.value().attr("href").map(str::trim).filter(|href| !href.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const RULES: TieredImageRules<'static> =
        TieredImageRules { logo_blocklist: &["https://www.vendor.com/images/vendor-brand.png"] };

    fn page(url: &str, html: &str) -> Page {
        Page::parse(Url::parse(url).unwrap(), html)
    }

    #[test]
    fn test_looks_like_logo() {
        assert!(looks_like_logo("https://x.com/static/Logo.png"));
        assert!(looks_like_logo("https://x.com/img/sprite-sheet.png"));
        assert!(looks_like_logo("https://x.com/favicon.ico"));
        assert!(looks_like_logo("https://x.com/social/share.jpg"));
        assert!(!looks_like_logo("https://x.com/products/lens.jpg"));
    }

    #[test]
    fn test_generic_prefers_og_image() {
        let html = r#"
            <meta property="og:image" content="/media/lens-main.jpg">
            <img class="product-photo" src="/media/other.jpg">
        "#;
        let page = page("https://shop.example.com/p/1", html);
        assert_eq!(find_image_generic(&page), Some("https://shop.example.com/media/lens-main.jpg".to_string()));
    }

    #[test]
    fn test_generic_skips_logo_og_image() {
        let html = r#"
            <meta property="og:image" content="https://shop.example.com/logo.png">
            <meta name="twitter:image" content="https://cdn.example.com/lens.jpg">
        "#;
        let page = page("https://shop.example.com/p/1", html);
        assert_eq!(find_image_generic(&page), Some("https://cdn.example.com/lens.jpg".to_string()));
    }

    #[test]
    fn test_generic_structured_image_shapes() {
        let list = r#"<script type="application/ld+json">
            {"@type": "Product", "image": ["/img/brand-logo.png", "/img/front.jpg"]}
        </script>"#;
        let page_list = page("https://shop.example.com/p/1", list);
        assert_eq!(find_image_generic(&page_list), Some("https://shop.example.com/img/front.jpg".to_string()));

        let object = r#"<script type="application/ld+json">
            {"@type": ["Product"], "image": {"@type": "ImageObject", "url": " https://cdn.example.com/a.png "}}
        </script>"#;
        let page_object = page("https://shop.example.com/p/1", object);
        assert_eq!(find_image_generic(&page_object), Some("https://cdn.example.com/a.png".to_string()));
    }

    #[test]
    fn test_generic_structured_ignores_non_product() {
        let html = r#"<script type="application/ld+json">{"@type": "Organization", "image": "/org.jpg"}</script>"#;
        assert_eq!(find_image_generic(&page("https://shop.example.com/", html)), None);
    }

    #[test]
    fn test_generic_gallery_img() {
        let html = r#"
            <img class="header-icon" src="/icons/cart.png">
            <img class="thumb" src="/a.jpg">
            <img id="mainImage" data-src="/media/big.jpg">
            <img class="gallery" src="data:image/png;base64,AAAA">
        "#;
        let page = page("https://shop.example.com/p/1", html);
        assert_eq!(find_image_generic(&page), Some("https://shop.example.com/media/big.jpg".to_string()));
    }

    #[test]
    fn test_generic_gallery_rejects_logo() {
        let html = r#"<img class="main-logo" src="/brand/logo.svg">"#;
        assert_eq!(find_image_generic(&page("https://shop.example.com/", html)), None);
    }

    #[test]
    fn test_upgrade_size_tier() {
        assert_eq!(upgrade_size_tier("/images/small/foo-sml.jpg"), "/images/large/foo-lrg.jpg");
        assert_eq!(upgrade_size_tier("/Images/TabImages/bar_small.PNG"), "/images/large/bar-lrg.PNG");
        assert_eq!(upgrade_size_tier("/images/small/plain.webp"), "/images/large/plain.webp");
        assert_eq!(upgrade_size_tier("/other/small/foo-sml.jpg"), "/other/small/foo-lrg.jpg");
    }

    #[test]
    fn test_rank_key_ordering() {
        let lrg = RankKey::for_url("https://v.com/images/highres/a-lrg.jpg", None);
        let large_dir = RankKey::for_url("https://v.com/images/large/a.jpg", None);
        assert!(lrg < large_dir);

        let highres = RankKey::for_url("https://v.com/images/highres/a.jpg", None);
        assert!(large_dir < highres);

        let with_model = RankKey::for_url("https://v.com/images/large/PAX1000-long-name.jpg", Some("pax1000"));
        let without_model = RankKey::for_url("https://v.com/images/large/b.jpg", Some("PAX1000"));
        assert!(!with_model.model_absent);
        assert!(without_model.model_absent);
        assert!(with_model < without_model);

        let short = RankKey::for_url("https://v.com/images/large/b.jpg", None);
        let long = RankKey::for_url("https://v.com/images/large/bbbb.jpg", None);
        assert!(short < long);
    }

    #[test]
    fn test_rank_key_model_only_in_directory_does_not_count() {
        let key = RankKey::for_url("https://v.com/images/large/PAX1000/a.jpg", Some("PAX1000"));
        assert!(key.model_absent);
    }

    #[test]
    fn test_rules_accept() {
        assert!(RULES.accepts("https://www.vendor.com/images/large/a-lrg.jpg"));
        assert!(!RULES.accepts("https://WWW.VENDOR.COM/images/vendor-brand.png"));
        assert!(!RULES.accepts("https://www.vendor.com/images/large/banner-1.jpg"));
        assert!(!RULES.accepts("https://www.vendor.com/images/large/a.gif"));
        assert!(!RULES.accepts("https://www.vendor.com/images/large/a.jpg?w=200"));
        assert!(!RULES.accepts(""));
    }

    #[test]
    fn test_tiered_prefers_lrg_suffix() {
        let html = r#"
            <img src="/images/large/PAX1000_A.jpg">
            <a href="https://www.vendor.com/images/highres/PAX1000-lrg.jpg">hi</a>
        "#;
        let page = page("https://www.vendor.com/thorproduct.cfm?partnumber=PAX1000", html);
        assert_eq!(
            find_image_tiered(&page, Some("PAX1000"), RULES),
            Some("https://www.vendor.com/images/highres/PAX1000-lrg.jpg".to_string())
        );
    }

    #[test]
    fn test_tiered_upgrades_thumbnails() {
        let html = r#"<img src="/images/small/10404-sml.jpg" alt="thumb">"#;
        let page = page("https://www.vendor.com/newgrouppage9.cfm?objectgroup_id=1", html);
        assert_eq!(
            find_image_tiered(&page, None, RULES),
            Some("https://www.vendor.com/images/large/10404-lrg.jpg".to_string())
        );
    }

    #[test]
    fn test_tiered_data_attributes_and_script_markup() {
        let html = r#"
            <div data-zoom-image="/images/large/div-zoom.jpg"></div>
            <img src="/images/thumb.gif" data-zoom-image="/images/highres/zoom.png">
            <script>var gallery = ['/images/large/from-script.jpg'];</script>
        "#;
        let page = page("https://www.vendor.com/p", html);
        let urls: Vec<_> = tiered_candidates(&page, None, RULES).into_iter().map(|c| c.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.vendor.com/images/large/div-zoom.jpg",
                "https://www.vendor.com/images/large/from-script.jpg",
                "https://www.vendor.com/images/highres/zoom.png",
            ]
        );
    }

    #[test]
    fn test_tiered_keeps_absolute_host() {
        let html = r#"<img src="https://media.vendor.com/en/images/large/a.jpg">"#;
        let page = page("https://www.vendor.com/p", html);
        let urls: Vec<_> = tiered_candidates(&page, None, RULES).into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec!["https://media.vendor.com/en/images/large/a.jpg"]);
    }

    #[test]
    fn test_tiered_zoom_link() {
        let html = r#"<a href="/gallery/PAX1000.jpg"> Click to Enlarge </a>"#;
        let page = page("https://www.vendor.com/p", html);
        assert_eq!(
            find_image_tiered(&page, Some("PAX1000"), RULES),
            Some("https://www.vendor.com/gallery/PAX1000.jpg".to_string())
        );
    }

    #[test]
    fn test_tiered_deduplicates_in_first_seen_order() {
        let html = r#"
            <img src="/images/large/a.jpg">
            <a href="/images/large/a.jpg">same</a>
        "#;
        let page = page("https://www.vendor.com/p", html);
        assert_eq!(tiered_candidates(&page, None, RULES).len(), 1);
    }

    #[test]
    fn test_tiered_falls_back_to_filtered_og_image() {
        let html = r#"
            <meta property="og:image" content="https://www.vendor.com/images/vendor-brand.png">
            <meta name="og:image" content="https://www.vendor.com/img/product.jpg">
            <img src="/images/large/site-logo.png">
        "#;
        let page = page("https://www.vendor.com/p", html);
        assert_eq!(find_image_tiered(&page, None, RULES), Some("https://www.vendor.com/img/product.jpg".to_string()));
    }

    #[test]
    fn test_tiered_nothing_found() {
        let page = page("https://www.vendor.com/p", "<p>no images</p>");
        assert_eq!(find_image_tiered(&page, None, RULES), None);
    }

    #[test]
    fn test_no_strategy_returns_logo_like_urls() {
        let html = r#"
            <meta property="og:image" content="/images/large/logo-lrg.jpg">
            <meta name="twitter:image" content="/img/icon.png">
            <script type="application/ld+json">{"@type": "Product", "image": "/img/social-card.jpg"}</script>
            <img class="product" src="/images/large/sprite.jpg">
            <a href="/images/small/favicon-sml.png">Zoom</a>
        "#;
        let page = page("https://www.vendor.com/p", html);
        assert_eq!(find_image_generic(&page), None);
        assert_eq!(find_image_tiered(&page, None, RULES), None);
    }
}
