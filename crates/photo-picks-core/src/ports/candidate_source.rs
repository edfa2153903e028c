//! Candidate supplier port for producing the photo list to score.

use crate::domain::Photo;

/// Port for supplying candidate photos.
///
/// Implementations apply their own date filtering and cheap pre-filters; the
/// engine treats the output as an opaque, ordered, already-filtered list.
/// Candidate order matters: it is the tie-break for equal aggregate scores.
pub trait CandidateSource: Send + Sync {
    /// Returns an ordered iterator over candidate photos.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a photo fails to load; callers skip
    /// those and continue.
    fn candidates(&self) -> Box<dyn Iterator<Item = anyhow::Result<Photo>> + Send + '_>;

    /// Returns the total number of candidates, if cheaply known.
    fn count_hint(&self) -> Option<usize>;
}
