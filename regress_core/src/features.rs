use std::collections::BTreeMap;

use ndarray::Array3;

use crate::bands::FrequencyBand;
use crate::error::{PipelineError, Result};

/// Per-band covariance feature blocks for one set of recordings.
///
/// Each block holds one `n_channels x n_channels` covariance matrix per
/// sample, shaped `(n_samples, n_channels, n_channels)`. All blocks must
/// agree on both dimensions. Block order is irrelevant; a `BandSelection`
/// decides which blocks are used and in which order.
#[derive(Debug, Clone)]
pub struct BandCovariances {
    n_samples: usize,
    n_channels: usize,
    blocks: BTreeMap<FrequencyBand, Array3<f64>>,
}

impl BandCovariances {
    /// Builds a feature set from `(band, block)` pairs, validating shapes.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` when matrices are not square or blocks
    /// disagree on dimensions, `EmptyBlock` for a zero-sample block,
    /// `DuplicateBand` for a repeated key, and `EmptySelection` when no
    /// blocks are given.
    pub fn from_blocks<I>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (FrequencyBand, Array3<f64>)>,
    {
        let mut map = BTreeMap::new();
        let mut dims: Option<(usize, usize)> = None;

        for (band, block) in blocks {
            let (n, c, c2) = block.dim();
            if c != c2 {
                return Err(PipelineError::ShapeMismatch {
                    what: "covariance matrix",
                    got: c2,
                    expected: c,
                });
            }
            if n == 0 {
                return Err(PipelineError::EmptyBlock { band });
            }
            if c == 0 {
                return Err(PipelineError::ShapeMismatch {
                    what: "channels",
                    got: 0,
                    expected: 1,
                });
            }

            match dims {
                None => dims = Some((n, c)),
                Some((n0, c0)) => {
                    if n != n0 {
                        return Err(PipelineError::ShapeMismatch {
                            what: "samples",
                            got: n,
                            expected: n0,
                        });
                    }
                    if c != c0 {
                        return Err(PipelineError::ShapeMismatch {
                            what: "channels",
                            got: c,
                            expected: c0,
                        });
                    }
                }
            }

            if map.insert(band, block).is_some() {
                return Err(PipelineError::DuplicateBand { band });
            }
        }

        let (n_samples, n_channels) = dims.ok_or(PipelineError::EmptySelection)?;
        Ok(Self {
            n_samples,
            n_channels,
            blocks: map,
        })
    }

    /// Convenience constructor taking wire names instead of band values.
    pub fn from_named_blocks<'a, I>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Array3<f64>)>,
    {
        let mut parsed = Vec::new();
        for (name, block) in blocks {
            parsed.push((FrequencyBand::parse(name)?, block));
        }
        Self::from_blocks(parsed)
    }

    /// Number of samples shared by every block.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Channel count shared by every block.
    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// Whether a block exists for `band`.
    pub fn contains(&self, band: FrequencyBand) -> bool {
        self.blocks.contains_key(&band)
    }

    /// Fetches the block for `band`.
    ///
    /// # Errors
    /// Returns `PipelineError::MissingBand` when the band has no block.
    pub fn block(&self, band: FrequencyBand) -> Result<&Array3<f64>> {
        self.blocks
            .get(&band)
            .ok_or(PipelineError::MissingBand { band })
    }

    /// Iterates over the bands that have blocks.
    pub fn bands(&self) -> impl Iterator<Item = FrequencyBand> + '_ {
        self.blocks.keys().copied()
    }
}
