/// File classification by extension.
///
/// This module maps a file path to the decoder family that can check it.
/// Classification looks only at the extension, compared case-insensitively,
/// and never touches the file itself.
///
/// # Examples
///
/// ```
/// use corruptscan::file_category::{Category, classify};
/// use std::path::Path;
///
/// assert_eq!(classify(Path::new("photo.JPG")), Category::Image);
/// assert_eq!(classify(Path::new("report.pdf")), Category::Pdf);
/// assert_eq!(classify(Path::new("budget.xlsx")), Category::Spreadsheet);
/// assert_eq!(classify(Path::new("notes.txt")), Category::Unknown);
/// ```
use serde::Serialize;
use std::path::Path;

/// The decoder family a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Raster images (PNG, JPEG)
    Image,
    /// PDF documents
    Pdf,
    /// Workbooks (Excel and OpenDocument containers)
    Spreadsheet,
    /// No decoder available
    Unknown,
}

impl Category {
    /// Returns a human-readable label for this category.
    ///
    /// ```
    /// use corruptscan::file_category::Category;
    ///
    /// assert_eq!(Category::Spreadsheet.label(), "spreadsheet");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Pdf => "pdf",
            Category::Spreadsheet => "spreadsheet",
            Category::Unknown => "unknown",
        }
    }
}

/// Extension table, checked top to bottom. Entries are lowercase, no dot.
const EXTENSION_TABLE: &[(&[&str], Category)] = &[
    (&["png", "jpg", "jpeg"], Category::Image),
    (&["pdf"], Category::Pdf),
    (
        &["xls", "xlsx", "xlsm", "xlsb", "odf", "ods", "odt"],
        Category::Spreadsheet,
    ),
];

/// Returns the lowercased extension of `path`, if it has a UTF-8 one.
fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Maps an extension (without the leading dot) to a category.
///
/// ```
/// use corruptscan::file_category::{Category, extension_to_category};
///
/// assert_eq!(extension_to_category("PNG"), Category::Image);
/// assert_eq!(extension_to_category("docx"), Category::Unknown);
/// ```
pub fn extension_to_category(ext: &str) -> Category {
    let ext = ext.to_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(extensions, _)| extensions.contains(&ext.as_str()))
        .map(|&(_, category)| category)
        .unwrap_or(Category::Unknown)
}

/// Classifies a path by its extension.
pub fn classify(path: &Path) -> Category {
    normalized_extension(path)
        .map(|ext| extension_to_category(&ext))
        .unwrap_or(Category::Unknown)
}

/// Returns true if the extension of `path` belongs to any known category.
///
/// The scanner uses this to skip irrelevant files before opening them.
pub fn is_known_extension(path: &Path) -> bool {
    classify(path) != Category::Unknown
}

/// Every recognized extension, in table order.
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    EXTENSION_TABLE
        .iter()
        .flat_map(|(extensions, _)| extensions.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert_eq!(classify(Path::new("a.png")), Category::Image);
        assert_eq!(classify(Path::new("a.jpg")), Category::Image);
        assert_eq!(classify(Path::new("a.jpeg")), Category::Image);
    }

    #[test]
    fn test_pdf_extension() {
        assert_eq!(classify(Path::new("dir/report.pdf")), Category::Pdf);
    }

    #[test]
    fn test_spreadsheet_extensions() {
        for ext in ["xls", "xlsx", "xlsm", "xlsb", "odf", "ods", "odt"] {
            let name = format!("book.{}", ext);
            assert_eq!(classify(Path::new(&name)), Category::Spreadsheet, "{}", ext);
        }
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify(Path::new("PHOTO.PNG")), Category::Image);
        assert_eq!(classify(Path::new("Report.Pdf")), Category::Pdf);
        assert_eq!(classify(Path::new("BOOK.XlsX")), Category::Spreadsheet);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(classify(Path::new("notes.txt")), Category::Unknown);
        assert_eq!(classify(Path::new("archive.tar.gz")), Category::Unknown);
        assert_eq!(classify(Path::new("Makefile")), Category::Unknown);
        assert_eq!(classify(Path::new(".png")), Category::Unknown);
    }

    #[test]
    fn test_extension_must_match_whole() {
        // "jpeg" lookalikes without the dot boundary are not images
        assert_eq!(classify(Path::new("fakejpeg")), Category::Unknown);
        assert_eq!(classify(Path::new("file.xlsxx")), Category::Unknown);
    }

    #[test]
    fn test_is_known_extension() {
        assert!(is_known_extension(Path::new("x.ods")));
        assert!(!is_known_extension(Path::new("x.docx")));
    }

    #[test]
    fn test_known_extensions_lists_every_entry() {
        let all: Vec<_> = known_extensions().collect();
        assert_eq!(all.len(), 11);
        assert!(all.contains(&"jpeg"));
        assert!(all.contains(&"xlsb"));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Image.label(), "image");
        assert_eq!(Category::Pdf.label(), "pdf");
        assert_eq!(Category::Unknown.label(), "unknown");
    }
}
