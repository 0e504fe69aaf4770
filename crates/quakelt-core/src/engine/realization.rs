use crate::core::logictree::gsim::GsimRealization;
use std::collections::BTreeSet;
use std::fmt;

/// A combination of one source-model path and one ground-motion realization.
#[derive(Debug, Clone, PartialEq)]
pub struct Realization {
    /// Global position of the realization among all realizations of the calculation.
    pub ordinal: usize,
    pub sm_lt_path: Vec<String>,
    pub gsim_rlz: GsimRealization,
    pub weight: f64,
    /// Collection (output stream) indices, filled only for oversampled source models.
    pub col_ids: BTreeSet<usize>,
}

impl Realization {
    pub fn new(
        ordinal: usize,
        sm_lt_path: Vec<String>,
        gsim_rlz: GsimRealization,
        weight: f64,
    ) -> Self {
        Self {
            ordinal,
            sm_lt_path,
            gsim_rlz,
            weight,
            col_ids: BTreeSet::new(),
        }
    }

    /// Unique identity of the realization: `<source-model path>,<gsim path>`.
    pub fn uid(&self) -> String {
        format!("{},{}", self.sm_lt_path.join("_"), self.gsim_rlz.uid())
    }

    pub fn gsim_lt_path(&self) -> &[String] {
        &self.gsim_rlz.lt_path
    }

    /// The GSIM chosen for a tectonic region type.
    pub fn gsim_for(&self, trt: &str) -> Option<&str> {
        self.gsim_rlz.value.get(trt).map(String::as_str)
    }
}

impl fmt::Display for Realization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{},w={}", self.ordinal, self.uid(), self.weight)?;
        if !self.col_ids.is_empty() {
            let cols: Vec<String> = self.col_ids.iter().map(usize::to_string).collect();
            write!(f, ",col={}", cols.join(","))?;
        }
        write!(f, ">")
    }
}
