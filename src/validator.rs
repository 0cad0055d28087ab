//! Format validation through external decoders.
//!
//! Each recognized category has one decode check. A check either succeeds or
//! returns a [`DecodeError`]; [`validate`] then reduces that outcome to a
//! [`Verdict`]. Decoder handles are owned locals, so they are dropped on every
//! exit path before the next file is looked at.
//!
//! Validation depth per category:
//! - Image: full pixel decode, format guessed from content.
//! - PDF: every indirect object is loaded through the cross-reference data,
//!   the `/Root` catalog must resolve to a dictionary, and a trailer `/Info`
//!   entry, when present, must resolve to a dictionary.
//! - Spreadsheet: the workbook opens and lists at least one sheet.

use crate::file_category::Category;
use calamine::{Reader, open_workbook_auto};
use image::ImageReader;
use lopdf::{Document, Object};
use serde::Serialize;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;

/// Outcome of validating one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The decoder opened the file.
    Valid,
    /// The decoder failed on the file.
    Invalid,
    /// No decoder exists for the file's category.
    Unverifiable,
}

impl Verdict {
    /// Returns the console line shown for this verdict.
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Valid => "File is safe!",
            Verdict::Invalid => "File is corrupted!",
            Verdict::Unverifiable => "Could not verify the file.",
        }
    }
}

/// Errors raised while decoding a file.
#[derive(Debug)]
pub enum DecodeError {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// The image decoder rejected the data.
    Image(image::ImageError),
    /// The PDF parser rejected the data.
    Pdf(lopdf::Error),
    /// The spreadsheet reader rejected the data.
    Spreadsheet(calamine::Error),
    /// The file parsed but lacks a required part.
    MissingStructure(&'static str),
    /// The decoder panicked.
    Panicked(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Io(e) => write!(f, "I/O error: {}", e),
            DecodeError::Image(e) => write!(f, "image decode failed: {}", e),
            DecodeError::Pdf(e) => write!(f, "PDF parse failed: {}", e),
            DecodeError::Spreadsheet(e) => write!(f, "workbook open failed: {}", e),
            DecodeError::MissingStructure(what) => write!(f, "missing {}", what),
            DecodeError::Panicked(msg) => write!(f, "decoder panicked: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(e) => Some(e),
            DecodeError::Image(e) => Some(e),
            DecodeError::Pdf(e) => Some(e),
            DecodeError::Spreadsheet(e) => Some(e),
            DecodeError::MissingStructure(_) | DecodeError::Panicked(_) => None,
        }
    }
}

impl DecodeError {
    /// Maps a decode failure to a verdict.
    ///
    /// Every failure currently counts as corruption, including I/O errors
    /// and unsupported sub-formats. This is the only place to change that.
    pub fn verdict(&self) -> Verdict {
        match self {
            DecodeError::Io(_) => Verdict::Invalid,
            DecodeError::Image(_) => Verdict::Invalid,
            DecodeError::Pdf(_) => Verdict::Invalid,
            DecodeError::Spreadsheet(_) => Verdict::Invalid,
            DecodeError::MissingStructure(_) => Verdict::Invalid,
            DecodeError::Panicked(_) => Verdict::Invalid,
        }
    }
}

/// Result of a single decode attempt.
pub type DecodeResult = Result<(), DecodeError>;

type Check = fn(&Path) -> DecodeResult;

/// Decoder dispatch table. `Category::Unknown` has no entry.
const DECODERS: &[(Category, Check)] = &[
    (Category::Image, check_image),
    (Category::Pdf, check_pdf),
    (Category::Spreadsheet, check_spreadsheet),
];

fn decoder_for(category: Category) -> Option<Check> {
    DECODERS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|&(_, check)| check)
}

/// Runs the decoder for `category` once.
///
/// Returns `None` when no decoder exists, in which case the file is not
/// opened at all. Decoder panics are caught and returned as
/// [`DecodeError::Panicked`].
pub fn decode(path: &Path, category: Category) -> Option<DecodeResult> {
    let check = decoder_for(category)?;
    Some(run_check(path, check))
}

thread_local! {
    static IN_DECODER: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the panic hook so panics raised inside a decoder on this thread
/// are not printed; they surface as [`DecodeError::Panicked`] instead.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_DECODER.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn run_check(path: &Path, check: Check) -> DecodeResult {
    install_quiet_hook();
    IN_DECODER.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check(path)));
    IN_DECODER.with(|flag| flag.set(false));
    outcome.unwrap_or_else(|payload| Err(DecodeError::Panicked(panic_message(&*payload))))
}

/// Validates `path` as a file of `category`.
pub fn validate(path: &Path, category: Category) -> Verdict {
    match decode(path, category) {
        None => Verdict::Unverifiable,
        Some(Ok(())) => Verdict::Valid,
        Some(Err(e)) => {
            tracing::debug!(path = %path.display(), category = category.label(), error = %e, "decode failed");
            e.verdict()
        }
    }
}

fn check_image(path: &Path) -> DecodeResult {
    let reader = ImageReader::open(path)
        .map_err(DecodeError::Io)?
        .with_guessed_format()
        .map_err(DecodeError::Io)?;
    reader.decode().map_err(DecodeError::Image)?;
    Ok(())
}

fn check_pdf(path: &Path) -> DecodeResult {
    let document = Document::load(path).map_err(DecodeError::Pdf)?;

    let root = document
        .trailer
        .get(b"Root")
        .map_err(|_| DecodeError::MissingStructure("document catalog"))?;
    resolve_dictionary(&document, root)?;

    // An absent /Info is an empty info dictionary; a dangling one is not.
    if let Ok(info) = document.trailer.get(b"Info") {
        resolve_dictionary(&document, info)?;
    }
    Ok(())
}

fn resolve_dictionary(document: &Document, object: &Object) -> DecodeResult {
    let object = match object {
        Object::Reference(id) => document.get_object(*id).map_err(DecodeError::Pdf)?,
        other => other,
    };
    object.as_dict().map_err(DecodeError::Pdf)?;
    Ok(())
}

fn check_spreadsheet(path: &Path) -> DecodeResult {
    let workbook = open_workbook_auto(path).map_err(DecodeError::Spreadsheet)?;
    if workbook.sheet_names().is_empty() {
        return Err(DecodeError::MissingStructure("worksheet"));
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
