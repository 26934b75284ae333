//! Impact description data model and the feed it arrives through.
//!
//! An `ImpactDescription` is produced upstream by the simulation and is
//! read-only here. A new simulation replaces it wholesale.

use serde::{Deserialize, Serialize};

use crate::error::VizError;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside [-90, 90] x [-180, 180].
    pub fn validate(&self) -> Result<(), VizError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(VizError::invalid("latitude", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(VizError::invalid("longitude", self.longitude));
        }
        Ok(())
    }
}

/// Split of the affected population by effect horizon.
///
/// Upstream is expected to keep `direct_impact + secondary + long_term ==
/// total_affected`, but nothing enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationBreakdown {
    pub direct_impact: u64,
    pub secondary: u64,
    pub long_term: u64,
    pub total_affected: u64,
}

impl PopulationBreakdown {
    pub fn new(direct_impact: u64, secondary: u64, long_term: u64, total_affected: u64) -> Self {
        Self {
            direct_impact,
            secondary,
            long_term,
            total_affected,
        }
    }

    /// Build a breakdown whose total is the sum of its parts.
    pub fn from_parts(direct_impact: u64, secondary: u64, long_term: u64) -> Self {
        let total = direct_impact
            .saturating_add(secondary)
            .saturating_add(long_term);
        Self::new(direct_impact, secondary, long_term, total)
    }

    /// Parts in chart order: direct, secondary, long-term.
    pub fn parts(&self) -> [u64; 3] {
        [self.direct_impact, self.secondary, self.long_term]
    }

    pub fn part_sum(&self) -> u64 {
        self.parts().iter().fold(0u64, |acc, p| acc.saturating_add(*p))
    }

    /// Whether the parts add up to the stated total.
    pub fn is_consistent(&self) -> bool {
        self.part_sum() == self.total_affected
    }
}

/// One simulated impact, as handed over by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactDescription {
    pub latitude: f64,
    pub longitude: f64,
    pub blast_radius_km: f64,
    pub energy_megatons: f64,
    pub affected_population: u64,
    /// Absent when the simulation produced no population model.
    #[serde(default)]
    pub population_breakdown: Option<PopulationBreakdown>,
    /// Free-form place name shown as a label over the globe.
    #[serde(default)]
    pub location_label: Option<String>,
}

impl ImpactDescription {
    pub fn new(
        position: GeoPosition,
        blast_radius_km: f64,
        energy_megatons: f64,
        population_breakdown: PopulationBreakdown,
    ) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            blast_radius_km,
            energy_megatons,
            affected_population: population_breakdown.total_affected,
            population_breakdown: Some(population_breakdown),
            location_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.location_label = Some(label.into());
        self
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude)
    }

    /// Check location and magnitudes.
    pub fn validate(&self) -> Result<(), VizError> {
        self.position().validate()?;
        self.validate_magnitudes()
    }

    /// Blast radius and energy must be finite and >= 0. Location is not
    /// looked at; the 2D zone panel never uses it.
    pub fn validate_magnitudes(&self) -> Result<(), VizError> {
        if !self.blast_radius_km.is_finite() || self.blast_radius_km < 0.0 {
            return Err(VizError::invalid("blast_radius_km", self.blast_radius_km));
        }
        if !self.energy_megatons.is_finite() || self.energy_megatons < 0.0 {
            return Err(VizError::invalid("energy_megatons", self.energy_megatons));
        }
        Ok(())
    }
}

/// Holds the current impact and a version that bumps on every replacement.
///
/// The engine only reads from the feed; it never asks for a recomputation.
#[derive(Debug, Default)]
pub struct ImpactFeed {
    current: Option<ImpactDescription>,
    version: u64,
}

impl ImpactFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current impact wholesale.
    pub fn publish(&mut self, impact: ImpactDescription) {
        self.current = Some(impact);
        self.version += 1;
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.version += 1;
        }
    }

    pub fn current(&self) -> Option<&ImpactDescription> {
        self.current.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn watch(&self) -> FeedWatch {
        FeedWatch { seen: self.version }
    }
}

/// Remembers the last feed version a consumer has handled.
#[derive(Debug, Clone, Copy)]
pub struct FeedWatch {
    seen: u64,
}

impl FeedWatch {
    /// Returns true once per feed change.
    pub fn changed(&mut self, feed: &ImpactFeed) -> bool {
        if feed.version() != self.seen {
            self.seen = feed.version();
            true
        } else {
            false
        }
    }
}
