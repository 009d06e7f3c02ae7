mod logdiag;
mod spoc;

pub(crate) use logdiag::log_diagonal;
pub use spoc::{SpocFilters, SpocParams};

/// Covariance-to-vector method used by the filter-bank stage.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterBankMethod {
    /// Log of the covariance diagonal, one feature per channel.
    Diag,
    /// Supervised spatial projection, one feature per kept component.
    Spoc(SpocParams),
}
