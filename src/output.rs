use crate::error::PersistenceError;
use crate::models::{Listing, COLUMNS};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the final table, replacing whatever was at `path`.
///
/// The file starts with a UTF-8 byte order mark so spreadsheet tools pick
/// the right encoding for the Japanese text. Column order is always
/// [`COLUMNS`], whatever fields the listings happen to have.
pub fn write_listings_csv(listings: &[Listing], path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| PersistenceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_err)?;
    file.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(COLUMNS).map_err(csv_err)?;
    for listing in listings {
        writer.serialize(listing).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;

    info!(rows = listings.len(), path = %path.display(), "saved listings");
    Ok(())
}

/// Price statistics for one (city, type) group, in 万円.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub city: String,
    pub property_type: String,
    pub count: usize,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Groups by (city, type) in order of first appearance.
pub fn summarize(listings: &[Listing]) -> Vec<PriceSummary> {
    let mut groups: Vec<(&str, &str, Vec<f64>)> = Vec::new();
    for listing in listings {
        match groups
            .iter_mut()
            .find(|(city, kind, _)| *city == listing.city && *kind == listing.property_type)
        {
            Some((_, _, prices)) => prices.push(listing.price),
            None => groups.push((
                listing.city.as_str(),
                listing.property_type.as_str(),
                vec![listing.price],
            )),
        }
    }

    groups
        .into_iter()
        .map(|(city, property_type, mut prices)| {
            prices.sort_by(|a, b| a.total_cmp(b));
            PriceSummary {
                city: city.to_string(),
                property_type: property_type.to_string(),
                count: prices.len(),
                median: median(&prices),
                min: prices[0],
                max: prices[prices.len() - 1],
            }
        })
        .collect()
}

/// Operator-facing table with prices rounded to whole 万円.
pub fn render_summary(rows: &[PriceSummary]) -> String {
    let mut out = String::from("市\t種別\t件数\t中央値\t最安値\t最高値\n");
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{:.0}\t{:.0}\t{:.0}\n",
            row.city, row.property_type, row.count, row.median, row.min, row.max
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(city: &str, kind: &str, price: f64) -> Listing {
        Listing {
            city: city.to_string(),
            property_type: kind.to_string(),
            price,
            layout: String::new(),
            exclusive_area: None,
            land_area: None,
            building_area: None,
            built: String::new(),
            transit: String::new(),
            address: format!("兵庫県{}", city),
            title: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn test_summarize_groups_in_first_seen_order() {
        let rows = summarize(&[
            listing("明石市", "戸建て", 3000.0),
            listing("高砂市", "マンション", 800.0),
            listing("明石市", "戸建て", 1000.0),
            listing("明石市", "戸建て", 2000.0),
            listing("高砂市", "マンション", 1200.0),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            PriceSummary {
                city: "明石市".to_string(),
                property_type: "戸建て".to_string(),
                count: 3,
                median: 2000.0,
                min: 1000.0,
                max: 3000.0,
            }
        );
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].median, 1000.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_render_summary_rounds() {
        let rendered = render_summary(&[PriceSummary {
            city: "高砂市".to_string(),
            property_type: "戸建て".to_string(),
            count: 2,
            median: 1234.4,
            min: 980.0,
            max: 1488.8,
        }]);
        assert!(rendered.starts_with("市\t種別"));
        assert!(rendered.contains("高砂市\t戸建て\t2\t1234\t980\t1489\n"));
    }

    #[test]
    fn test_write_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("listings.csv");

        let mut full = listing("高砂市", "マンション", 820.0);
        full.exclusive_area = Some(60.88);
        full.layout = "3DK".to_string();
        full.url = "https://suumo.jp/ms/1/".to_string();
        let sparse = listing("明石市", "戸建て", 1980.0);

        write_listings_csv(&[full, sparse], &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "高砂市,マンション,820.0,3DK,60.88,,,,,兵庫県高砂市,,https://suumo.jp/ms/1/"
        );
        assert_eq!(lines[2], "明石市,戸建て,1980.0,,,,,,,兵庫県明石市,,");
    }

    #[test]
    fn test_write_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");

        write_listings_csv(&[listing("高砂市", "戸建て", 1.0), listing("高砂市", "戸建て", 2.0)], &path)
            .unwrap();
        write_listings_csv(&[listing("明石市", "戸建て", 3.0)], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("高砂市"));
    }

    #[test]
    fn test_write_csv_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_listings_csv(&[listing("高砂市", "戸建て", 1.0)], dir.path());
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
    }
}
