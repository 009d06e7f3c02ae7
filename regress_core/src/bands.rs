use std::fmt;

use crate::error::{PipelineError, Result};

/// The closed set of frequency bands a recording is decomposed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrequencyBand {
    Low,
    Delta,
    Theta,
    Alpha,
    BetaLow,
    BetaMid,
    BetaHigh,
}

impl FrequencyBand {
    /// All bands, in canonical (ascending frequency) order.
    pub const ALL: [FrequencyBand; 7] = [
        FrequencyBand::Low,
        FrequencyBand::Delta,
        FrequencyBand::Theta,
        FrequencyBand::Alpha,
        FrequencyBand::BetaLow,
        FrequencyBand::BetaMid,
        FrequencyBand::BetaHigh,
    ];

    /// The band's wire name, as used in selection strings and block keys.
    pub fn name(self) -> &'static str {
        match self {
            FrequencyBand::Low => "low",
            FrequencyBand::Delta => "delta",
            FrequencyBand::Theta => "theta",
            FrequencyBand::Alpha => "alpha",
            FrequencyBand::BetaLow => "beta_low",
            FrequencyBand::BetaMid => "beta_mid",
            FrequencyBand::BetaHigh => "beta_high",
        }
    }

    /// Parses a single band name.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "low" => Ok(FrequencyBand::Low),
            "delta" => Ok(FrequencyBand::Delta),
            "theta" => Ok(FrequencyBand::Theta),
            "alpha" => Ok(FrequencyBand::Alpha),
            "beta_low" => Ok(FrequencyBand::BetaLow),
            "beta_mid" => Ok(FrequencyBand::BetaMid),
            "beta_high" => Ok(FrequencyBand::BetaHigh),
            _ => Err(PipelineError::UnknownBand {
                name: name.to_owned(),
            }),
        }
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered, duplicate-free subset of frequency bands.
///
/// Selections are written as hyphen-delimited composites such as
/// `"low-alpha"`. The order in the selection string is the order in which
/// band feature blocks are concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSelection {
    bands: Vec<FrequencyBand>,
}

impl BandSelection {
    /// Parses a hyphen-delimited composite like `"low"` or `"low-alpha"`.
    ///
    /// # Errors
    /// Returns `PipelineError::UnknownBand` for names outside the closed
    /// set, `PipelineError::DuplicateBand` for repeats, and
    /// `PipelineError::EmptySelection` for an empty string.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(PipelineError::EmptySelection);
        }

        let mut bands = Vec::new();
        for name in spec.split('-') {
            let band = FrequencyBand::parse(name)?;
            if bands.contains(&band) {
                return Err(PipelineError::DuplicateBand { band });
            }
            bands.push(band);
        }

        Ok(Self { bands })
    }

    /// The selected bands, in selection order.
    pub fn bands(&self) -> &[FrequencyBand] {
        &self.bands
    }

    /// Number of selected bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the selection is empty. Never true for parsed selections.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl fmt::Display for BandSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, band) in self.bands.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{band}")?;
        }
        Ok(())
    }
}
