use std::fmt;

/// Non-fatal conditions met while building an association.
///
/// They are logged as warnings when raised and kept on the resulting association so that
/// callers can inspect them.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A source model produced no ground-motion realization and was skipped.
    NoRealizationsForSourceModel {
        ordinal: usize,
        path: String,
        name: String,
    },
    /// The enumerated weights summed to less than one and were rescaled.
    PartialWeightLoss { total_weight: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoRealizationsForSourceModel { path, name, .. } => {
                write!(f, "No realizations for {}, {}", path, name)
            }
            Diagnostic::PartialWeightLoss { total_weight } => write!(
                f,
                "Some source models are not contributing (total weight {}), weights are being rescaled",
                total_weight
            ),
        }
    }
}
