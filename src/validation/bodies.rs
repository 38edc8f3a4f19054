//! Solar System reference bodies used by the validation gates.

use crate::domain::{FEATURE_COUNT, FeatureVector, RawRecord};
use crate::features::canonicalize;

/// Planet-side parameters of a reference body around a solar twin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarBody {
    pub name: &'static str,
    pub radius: f64,
    pub mass: f64,
    pub orbital_period: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub insolation: f64,
    pub equilibrium_temperature: f64,
    pub density: f64,
}

impl SolarBody {
    /// Complete raw record (Sun-like host).
    pub fn record(&self) -> RawRecord {
        let values: [f64; FEATURE_COUNT] = [
            self.radius,
            self.mass,
            self.orbital_period,
            self.semi_major_axis,
            self.eccentricity,
            self.insolation,
            self.equilibrium_temperature,
            self.density,
            5778.0,
            1.0,
            1.0,
            1.0,
        ];
        RawRecord::complete(values)
    }

    pub fn features(&self) -> FeatureVector {
        canonicalize(&self.record()).features
    }
}

pub const MERCURY: SolarBody = SolarBody {
    name: "Mercury",
    radius: 0.383,
    mass: 0.055,
    orbital_period: 88.0,
    semi_major_axis: 0.387,
    eccentricity: 0.2056,
    insolation: 6.67,
    equilibrium_temperature: 440.0,
    density: 5.43,
};

pub const VENUS: SolarBody = SolarBody {
    name: "Venus",
    radius: 0.949,
    mass: 0.815,
    orbital_period: 225.0,
    semi_major_axis: 0.723,
    eccentricity: 0.0068,
    insolation: 1.91,
    equilibrium_temperature: 237.0,
    density: 5.24,
};

pub const EARTH: SolarBody = SolarBody {
    name: "Earth",
    radius: 1.0,
    mass: 1.0,
    orbital_period: 365.25,
    semi_major_axis: 1.0,
    eccentricity: 0.0167,
    insolation: 1.0,
    equilibrium_temperature: 255.0,
    density: 5.51,
};

pub const MARS: SolarBody = SolarBody {
    name: "Mars",
    radius: 0.532,
    mass: 0.107,
    orbital_period: 687.0,
    semi_major_axis: 1.524,
    eccentricity: 0.0934,
    insolation: 0.43,
    equilibrium_temperature: 210.0,
    density: 3.93,
};

pub const JUPITER: SolarBody = SolarBody {
    name: "Jupiter",
    radius: 11.2,
    mass: 317.8,
    orbital_period: 4333.0,
    semi_major_axis: 5.203,
    eccentricity: 0.0484,
    insolation: 0.037,
    equilibrium_temperature: 110.0,
    density: 1.33,
};

/// All reference bodies, inner to outer.
pub const SOLAR_SYSTEM: [SolarBody; 5] = [MERCURY, VENUS, EARTH, MARS, JUPITER];
