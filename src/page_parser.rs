use crate::models::{CrawlTarget, Listing};
use crate::parser::{parse_area, parse_price};
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Listing fields reachable through a `dt` label in a unit's cassette table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Price,
    Address,
    Transit,
    ExclusiveArea,
    LandArea,
    BuildingArea,
    Layout,
    Built,
}

impl Field {
    /// Closed label vocabulary. Unknown labels map to `None` and are ignored.
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "物件名" => Some(Field::Title),
            "販売価格" => Some(Field::Price),
            "所在地" => Some(Field::Address),
            "沿線・駅" | "交通" => Some(Field::Transit),
            "専有面積" => Some(Field::ExclusiveArea),
            "土地面積" | "敷地面積" => Some(Field::LandArea),
            "建物面積" | "建物面積（延べ）" => Some(Field::BuildingArea),
            "間取り" => Some(Field::Layout),
            "築年月" => Some(Field::Built),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ListingDraft {
    title: Option<String>,
    price: Option<f64>,
    address: String,
    transit: String,
    exclusive_area: Option<f64>,
    land_area: Option<f64>,
    building_area: Option<f64>,
    layout: String,
    built: String,
}

impl ListingDraft {
    fn into_listing(self, target: &CrawlTarget, anchor_title: String, url: String) -> Option<Listing> {
        let price = self.price.filter(|p| p.is_finite() && *p > 0.0)?;
        Some(Listing {
            city: target.city.name.clone(),
            property_type: target.kind.name.clone(),
            price,
            layout: self.layout,
            exclusive_area: self.exclusive_area,
            land_area: self.land_area,
            building_area: self.building_area,
            built: self.built,
            transit: self.transit,
            address: self.address,
            title: self.title.unwrap_or(anchor_title),
            url,
        })
    }
}

/// Extracts listings from one search result page.
///
/// The selectors below are the site's markup contract as of 2025:
///
/// ```text
/// div.property_unit
///   h2.property_unit-title > a[href]
///   div.dottable--cassette
///     dl > dt (label) + dd (value, price inside span.dottable-value)
/// p.pagination-parts > a ("次へ")
/// ```
pub struct PageParser {
    base_url: String,
    unit: Selector,
    title_link: Selector,
    cassette: Selector,
    row: Selector,
    label: Selector,
    value: Selector,
    price_value: Selector,
    pagination_link: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to parse selector {}: {:?}", css, e))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

impl PageParser {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            unit: selector("div.property_unit")?,
            title_link: selector("h2.property_unit-title a")?,
            cassette: selector("div.dottable--cassette")?,
            row: selector("dl")?,
            label: selector("dt")?,
            value: selector("dd")?,
            price_value: selector("span.dottable-value")?,
            pagination_link: selector("p.pagination-parts a")?,
        })
    }

    /// Lazily yields one listing per unit that carries a parsable price.
    /// Units without a cassette table or a price are skipped.
    pub fn parse_listings<'a>(
        &'a self,
        document: &'a Html,
        target: &'a CrawlTarget,
    ) -> impl Iterator<Item = Listing> + 'a {
        document
            .select(&self.unit)
            .filter_map(move |unit| self.parse_unit(unit, target))
    }

    /// Whether the page offers a "次へ" (next) link.
    pub fn has_next_page(&self, document: &Html) -> bool {
        document
            .select(&self.pagination_link)
            .any(|link| element_text(link).contains("次へ"))
    }

    fn parse_unit(&self, unit: ElementRef<'_>, target: &CrawlTarget) -> Option<Listing> {
        let anchor = unit.select(&self.title_link).next();
        let anchor_title = anchor.map(element_text).unwrap_or_default();
        let url = anchor
            .and_then(|a| a.value().attr("href"))
            .map(|href| self.absolute_url(href))
            .unwrap_or_default();

        let Some(cassette) = unit.select(&self.cassette).next() else {
            debug!(city = %target.city.name, "skipping unit without cassette table");
            return None;
        };

        let mut draft = ListingDraft::default();
        for row in cassette.select(&self.row) {
            let (Some(dt), Some(dd)) = (
                row.select(&self.label).next(),
                row.select(&self.value).next(),
            ) else {
                continue;
            };
            let Some(field) = Field::from_label(&element_text(dt)) else {
                continue;
            };
            let value = element_text(dd);

            match field {
                Field::Title => draft.title = Some(value),
                Field::Price => {
                    let price_text = dd
                        .select(&self.price_value)
                        .next()
                        .map(element_text)
                        .unwrap_or(value);
                    draft.price = parse_price(&price_text);
                }
                Field::Address => draft.address = value,
                Field::Transit => draft.transit = value,
                Field::ExclusiveArea => draft.exclusive_area = parse_area(&value),
                Field::LandArea => draft.land_area = parse_area(&value),
                Field::BuildingArea => draft.building_area = parse_area(&value),
                Field::Layout => draft.layout = value,
                Field::Built => draft.built = value,
            }
        }

        let listing = draft.into_listing(target, anchor_title, url);
        if listing.is_none() {
            debug!(city = %target.city.name, "skipping unit without price");
        }
        listing
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            href.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, PropertyKind};

    fn target() -> CrawlTarget {
        CrawlTarget {
            city: City::new("高砂市", "28216"),
            kind: PropertyKind::new("マンション", "011"),
        }
    }

    fn parser() -> PageParser {
        PageParser::new("https://suumo.jp").unwrap()
    }

    const UNIT: &str = r#"
        <div class="property_unit property_unit--osusume">
          <h2 class="property_unit-title"><a href="/ms/chuko/hyogo/sc_takasago/nc_123/">ライオンズマンション高砂</a></h2>
          <div class="dottable dottable--cassette">
            <div class="dottable-line">
              <dl><dt>販売価格</dt><dd><span class="dottable-value">1,280万円</span>（税込）</dd></dl>
            </div>
            <div class="dottable-line">
              <dl><dt>所在地</dt><dd>兵庫県高砂市荒井町新浜２</dd></dl>
              <dl><dt>沿線・駅</dt><dd>ＪＲ山陽本線「曽根」徒歩6分</dd></dl>
            </div>
            <div class="dottable-line">
              <table class="dottable-fix"><tr>
                <td><dl><dt>専有面積</dt><dd>60.88m<sup>2</sup>（壁芯）</dd></dl></td>
                <td><dl><dt>間取り</dt><dd>3LDK</dd></dl></td>
              </tr></table>
            </div>
            <div class="dottable-line">
              <dl><dt>バルコニー</dt><dd>8.5m<sup>2</sup></dd></dl>
              <dl><dt>築年月</dt><dd>1995年3月</dd></dl>
            </div>
          </div>
        </div>"#;

    #[test]
    fn test_field_vocabulary() {
        assert_eq!(Field::from_label("交通"), Some(Field::Transit));
        assert_eq!(Field::from_label("敷地面積"), Some(Field::LandArea));
        assert_eq!(Field::from_label("建物面積（延べ）"), Some(Field::BuildingArea));
        assert_eq!(Field::from_label("バルコニー"), None);
        assert_eq!(Field::from_label(""), None);
    }

    #[test]
    fn test_parse_full_unit() {
        let document = Html::parse_document(&format!("<html><body>{}</body></html>", UNIT));
        let target = target();
        let parser = parser();
        let listings: Vec<Listing> = parser.parse_listings(&document, &target).collect();

        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.city, "高砂市");
        assert_eq!(listing.property_type, "マンション");
        assert_eq!(listing.price, 1280.0);
        assert_eq!(listing.address, "兵庫県高砂市荒井町新浜２");
        assert_eq!(listing.transit, "ＪＲ山陽本線「曽根」徒歩6分");
        assert_eq!(listing.exclusive_area, Some(60.88));
        assert_eq!(listing.land_area, None);
        assert_eq!(listing.building_area, None);
        assert_eq!(listing.layout, "3LDK");
        assert_eq!(listing.built, "1995年3月");
        assert_eq!(listing.title, "ライオンズマンション高砂");
        assert_eq!(
            listing.url,
            "https://suumo.jp/ms/chuko/hyogo/sc_takasago/nc_123/"
        );
    }

    #[test]
    fn test_title_label_overrides_anchor() {
        let html = r#"
            <div class="property_unit">
              <h2 class="property_unit-title"><a href="https://example.com/x">見出し</a></h2>
              <div class="dottable--cassette">
                <dl><dt>物件名</dt><dd>グランドメゾン明石</dd></dl>
                <dl><dt>販売価格</dt><dd>3,480万円</dd></dl>
              </div>
            </div>"#;
        let document = Html::parse_document(html);
        let target = target();
        let parser = parser();
        let listing = parser.parse_listings(&document, &target).next().unwrap();

        assert_eq!(listing.title, "グランドメゾン明石");
        assert_eq!(listing.price, 3480.0);
        // Not relative, passed through as-is
        assert_eq!(listing.url, "https://example.com/x");
    }

    #[test]
    fn test_unit_without_cassette_is_skipped() {
        let html = r#"
            <div class="property_unit">
              <h2 class="property_unit-title"><a href="/ad">PR</a></h2>
              <dl><dt>販売価格</dt><dd>980万円</dd></dl>
            </div>"#;
        let document = Html::parse_document(html);
        let target = target();
        assert_eq!(parser().parse_listings(&document, &target).count(), 0);
    }

    #[test]
    fn test_unit_without_price_is_skipped() {
        let html = r#"
            <div class="property_unit">
              <div class="dottable--cassette">
                <dl><dt>販売価格</dt><dd>未定</dd></dl>
                <dl><dt>所在地</dt><dd>兵庫県高砂市</dd></dl>
                <dl><dt>専有面積</dt><dd>70.1㎡</dd></dl>
              </div>
            </div>
            <div class="property_unit">
              <div class="dottable--cassette">
                <dl><dt>所在地</dt><dd>兵庫県高砂市</dd></dl>
              </div>
            </div>"#;
        let document = Html::parse_document(html);
        let target = target();
        assert_eq!(parser().parse_listings(&document, &target).count(), 0);
    }

    #[test]
    fn test_missing_anchor_leaves_url_and_title_empty() {
        let html = r#"
            <div class="property_unit">
              <div class="dottable--cassette">
                <dl><dt>販売価格</dt><dd>500万円</dd></dl>
                <dl><dt>土地面積</dt><dd>132.5m2</dd></dl>
                <dl><dt>建物面積</dt><dd>98.01m2（登記）</dd></dl>
                <dl><dt>間取り</dt></dl>
              </div>
            </div>"#;
        let document = Html::parse_document(html);
        let target = target();
        let listing = parser().parse_listings(&document, &target).next().unwrap();

        assert_eq!(listing.url, "");
        assert_eq!(listing.title, "");
        assert_eq!(listing.layout, "");
        assert_eq!(listing.land_area, Some(132.5));
        assert_eq!(listing.building_area, Some(98.01));
    }

    #[test]
    fn test_has_next_page() {
        let parser = parser();
        let with_next = Html::parse_document(
            r#"<p class="pagination-parts"><a href="?page=1">前へ</a></p>
               <p class="pagination-parts"><a href="?page=3">次へ</a></p>"#,
        );
        let without_next = Html::parse_document(
            r#"<p class="pagination-parts"><a href="?page=1">前へ</a></p>"#,
        );
        assert!(parser.has_next_page(&with_next));
        assert!(!parser.has_next_page(&without_next));
        assert!(!parser.has_next_page(&Html::parse_document("<p>次へ</p>")));
    }
}
