//! CSV bulk import of gallery images.
//!
//! Format: header row with a required `url` column and an optional
//! `caption` column; any other columns are ignored. Rows with an empty url
//! cell are skipped.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::types::GalleryImage;

/// Errors produced while reading a gallery CSV.
#[derive(Debug, Error)]
pub enum ImportError {
  #[error("failed to read csv: {0}")]
  Csv(#[from] csv::Error),

  #[error("csv is missing the required `url` column")]
  MissingUrlColumn,

  #[error("row {row}: `{value}` is not an http(s) url")]
  InvalidUrl { row: usize, value: String },

  #[error("failed to open {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Parse gallery images out of CSV data.
pub fn parse_gallery_csv<R: Read>(reader: R) -> Result<Vec<GalleryImage>, ImportError> {
  let mut csv_reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_reader(reader);

  let headers = csv_reader.headers()?.clone();
  let url_column = headers
    .iter()
    .position(|header| header.eq_ignore_ascii_case("url"))
    .ok_or(ImportError::MissingUrlColumn)?;
  let caption_column = headers
    .iter()
    .position(|header| header.eq_ignore_ascii_case("caption"));

  let mut images = Vec::new();
  for (index, record) in csv_reader.records().enumerate() {
    let record = record?;
    // Header occupies row 1.
    let row = index + 2;

    let url = record.get(url_column).unwrap_or_default();
    if url.is_empty() {
      continue;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
      return Err(ImportError::InvalidUrl {
        row,
        value: url.to_string(),
      });
    }

    let caption = caption_column
      .and_then(|column| record.get(column))
      .filter(|caption| !caption.is_empty())
      .map(String::from);

    images.push(GalleryImage {
      url: url.to_string(),
      caption,
    });
  }

  Ok(images)
}

/// Parse a gallery CSV file from disk.
pub fn read_gallery_csv(path: &Path) -> Result<Vec<GalleryImage>, ImportError> {
  let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
    path: path.display().to_string(),
    source,
  })?;
  parse_gallery_csv(file)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_urls_with_and_without_captions() {
    let input = "url,caption\n\
                 https://cdn.example.com/a.jpg,Opening shot\n\
                 https://cdn.example.com/b.jpg,\n";

    let images = parse_gallery_csv(input.as_bytes()).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].url, "https://cdn.example.com/a.jpg");
    assert_eq!(images[0].caption.as_deref(), Some("Opening shot"));
    assert_eq!(images[1].caption, None);
  }

  #[test]
  fn extra_columns_are_ignored_and_order_is_kept() {
    let input = "credit,url\n\
                 Ana,https://cdn.example.com/a.jpg\n\
                 Ben,https://cdn.example.com/b.jpg\n";

    let images = parse_gallery_csv(input.as_bytes()).unwrap();
    let urls: Vec<&str> = images.iter().map(|image| image.url.as_str()).collect();
    assert_eq!(
      urls,
      ["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"]
    );
  }

  #[test]
  fn missing_url_column_is_rejected() {
    let input = "image,caption\nhttps://cdn.example.com/a.jpg,x\n";

    let error = parse_gallery_csv(input.as_bytes()).unwrap_err();
    assert!(matches!(error, ImportError::MissingUrlColumn));
  }

  #[test]
  fn non_url_rows_are_rejected_with_the_row_number() {
    let input = "url\nhttps://cdn.example.com/a.jpg\nnot-a-url\n";

    let error = parse_gallery_csv(input.as_bytes()).unwrap_err();
    match error {
      ImportError::InvalidUrl { row, value } => {
        assert_eq!(row, 3);
        assert_eq!(value, "not-a-url");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn rows_with_empty_url_cells_are_skipped() {
    let input = "url,caption\n,orphan caption\nhttps://cdn.example.com/a.jpg,\n";

    let images = parse_gallery_csv(input.as_bytes()).unwrap();
    assert_eq!(images.len(), 1);
  }
}
