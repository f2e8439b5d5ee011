//! Thorlabs product and product-group pages.
//!
//! The part number comes from the `partnumber` (or `pn`) query parameter, the
//! name and spec from the title. Images are published in size tiers, so the
//! size-tier image strategy runs before the generic one.

use productmcp_core::ProductRecord;

use super::SiteParser;
use crate::extract::image::{TieredImageRules, find_image_generic, find_image_tiered};
use crate::extract::{Page, TitleFields, find_price, split_title};
use crate::fetch::url::{force_https, second_level_label};

pub const BRAND: &str = "Thorlabs";

const PRODUCT_PATH_MARKERS: &[&str] = &["thorproduct.cfm", "newgrouppage"];

/// Site logos that appear under otherwise acceptable image paths.
const LOGO_BLOCKLIST: &[&str] = &[
    "https://www.thorlabs.com/images/thorlabs-logo.png",
    "https://www.thorlabs.com/images/Thorlabs-logo.png",
    "https://www.thorlabs.com/GlobalShared/Images/Thorlabslogo.png",
    "https://www.thorlabs.com/images/thorlabs-logo.svg",
];

const IMAGE_RULES: TieredImageRules<'static> = TieredImageRules { logo_blocklist: LOGO_BLOCKLIST };

pub const PARSER: SiteParser = SiteParser { name: "thorlabs", can_handle, parse };

/// Thorlabs host (any country TLD) and a product or group page path.
pub fn can_handle(page: &Page) -> bool {
    let host = page.host();
    if second_level_label(&host) != Some("thorlabs") {
        return false;
    }

    let path = page.url().path().to_lowercase();
    PRODUCT_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}

pub fn parse(page: &Page) -> ProductRecord {
    let part_number = page.query_param("partnumber").or_else(|| page.query_param("pn"));

    let fields = match page.title() {
        Some(title) => split_title(&title, part_number.as_deref(), BRAND),
        None => TitleFields { model: part_number, ..TitleFields::default() },
    };
    let name = fields.name.or_else(|| page.first_heading());

    let imagelink = find_image_tiered(page, fields.model.as_deref(), IMAGE_RULES)
        .or_else(|| find_image_generic(page))
        .and_then(|image| force_https(page.url(), &image));

    ProductRecord {
        name,
        brand: Some(BRAND.to_string()),
        model: fields.model,
        price: find_price(page),
        spec: fields.spec,
        imagelink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const PRODUCT_PAGE: &str = r#"
        <html>
        <head>
            <title>Thorlabs - PAX1000VIS Polarimeter, Benchtop, 400 - 700 nm</title>
            <meta property="og:image" content="https://www.thorlabs.com/images/thorlabs-logo.png">
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"@type": "Offer", "price": "5,950.00", "priceCurrency": "USD"}}
            </script>
        </head>
        <body>
            <img src="https://www.thorlabs.com/images/Thorlabs-logo.png">
            <img src="/images/tabimages/PAX1000VIS_A1-sml.jpg">
            <a href="http://www.thorlabs.com/images/large/PAX1000VIS-lrg.jpg">Click to Enlarge</a>
        </body>
        </html>
    "#;

    fn page(url: &str, html: &str) -> Page {
        Page::parse(Url::parse(url).unwrap(), html)
    }

    #[test]
    fn test_can_handle() {
        let html = "<html></html>";
        assert!(can_handle(&page("https://www.thorlabs.com/thorproduct.cfm?partnumber=LA1951", html)));
        assert!(can_handle(&page("https://www.thorlabs.cn/NewGroupPage9.cfm?objectgroup_id=1", html)));
        assert!(!can_handle(&page("https://www.thorlabs.com/search/results.cfm", html)));
        assert!(!can_handle(&page("https://thorlabs.example.com/thorproduct.cfm", html)));
        assert!(!can_handle(&page("https://www.thorlabs.co.jp/thorproduct.cfm", html)));
    }

    #[test]
    fn test_parse_product_page() {
        let record = parse(&page("https://www.thorlabs.com/thorproduct.cfm?partnumber=PAX1000VIS", PRODUCT_PAGE));

        assert_eq!(record.name.as_deref(), Some("Polarimeter"));
        assert_eq!(record.brand.as_deref(), Some("Thorlabs"));
        assert_eq!(record.model.as_deref(), Some("PAX1000VIS"));
        assert_eq!(record.price, Some(5950.0));
        assert_eq!(record.spec.as_deref(), Some("Benchtop, 400 - 700 nm"));
        assert_eq!(record.imagelink.as_deref(), Some("https://www.thorlabs.com/images/large/PAX1000VIS-lrg.jpg"));
    }

    #[test]
    fn test_parse_pn_param_and_model_ranking() {
        let html = r#"
            <title>Thorlabs - KM100 Kinematic Mount</title>
            <img src="/images/large/mount-front.jpg">
            <img src="/images/large/KM100_mount.jpg">
        "#;
        let record = parse(&page("https://www.thorlabs.com/thorproduct.cfm?pn=KM100", html));
        assert_eq!(record.model.as_deref(), Some("KM100"));
        assert_eq!(record.name.as_deref(), Some("Kinematic Mount"));
        assert_eq!(record.imagelink.as_deref(), Some("https://www.thorlabs.com/images/large/KM100_mount.jpg"));
    }

    #[test]
    fn test_parse_without_title_uses_heading_and_query_model() {
        let html = r#"<body><h1> Mounted  Lens </h1></body>"#;
        let record = parse(&page("https://www.thorlabs.com/thorproduct.cfm?partnumber=LA1951-A", html));
        assert_eq!(record.name.as_deref(), Some("Mounted Lens"));
        assert_eq!(record.model.as_deref(), Some("LA1951-A"));
        assert_eq!(record.spec, None);
        assert_eq!(record.price, None);
        assert_eq!(record.imagelink, None);
    }

    #[test]
    fn test_parse_infers_model_from_title() {
        let html = r#"<title>Thorlabs - CCS200 Compact Spectrometer, 200 - 1000 nm</title>"#;
        let record = parse(&page("https://www.thorlabs.com/newgrouppage9.cfm?objectgroup_id=3482", html));
        assert_eq!(record.model.as_deref(), Some("CCS200"));
        assert_eq!(record.name.as_deref(), Some("Compact Spectrometer"));
        assert_eq!(record.spec.as_deref(), Some("200 - 1000 nm"));
    }

    #[test]
    fn test_parse_falls_back_to_generic_image_and_upgrades_scheme() {
        let html = r#"
            <title>Thorlabs - LA1951 Lens</title>
            <img class="product-main" src="//media.thorlabs.com/catalog/la1951.gif">
        "#;
        let record = parse(&page("https://www.thorlabs.com/thorproduct.cfm?partnumber=LA1951", html));
        assert_eq!(record.imagelink.as_deref(), Some("https://media.thorlabs.com/catalog/la1951.gif"));
    }
}
