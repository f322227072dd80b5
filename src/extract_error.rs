/// Why a page produced no record.
///
/// These are recoverable: the scrape loops log them and move on.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("required element `{0}` is missing from the page")]
    MissingElement(&'static str),

    #[error("required field `{0}` is blank")]
    BlankField(&'static str),
}
