//! Parameter registry: the fixed set of ramped parameters and their ranges.
//!
//! Parameters are identified by a compact enum that doubles as a dense array
//! index, so the render path resolves a parameter with a plain index instead of
//! a lookup or a callback.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParamId {
    /// Low-pass cutoff frequency
    Cutoff = 0,
    /// Resonant peak gain at the cutoff
    Resonance = 1,
}

impl ParamId {
    pub const COUNT: usize = 2;
    pub const ALL: [ParamId; Self::COUNT] = [ParamId::Cutoff, ParamId::Resonance];

    /// Dense index into per-parameter arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolve a host parameter address.
    pub fn from_address(address: u64) -> Option<Self> {
        match address {
            0 => Some(ParamId::Cutoff),
            1 => Some(ParamId::Resonance),
            _ => None,
        }
    }

    pub const fn address(self) -> u64 {
        self as u64
    }

    pub fn spec(self) -> &'static ParamSpec {
        &PARAMS[self.index()]
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    Hertz,
    Decibels,
}

/// Static descriptor for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    pub identifier: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParamUnit,
}

impl ParamSpec {
    /// Bring `value` into `[min, max]`. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

pub static PARAMS: [ParamSpec; ParamId::COUNT] = [
    ParamSpec {
        id: ParamId::Cutoff,
        identifier: "cutoff",
        name: "Cutoff",
        min: 12.0,
        max: 20_000.0,
        default: 400.0,
        unit: ParamUnit::Hertz,
    },
    ParamSpec {
        id: ParamId::Resonance,
        identifier: "resonance",
        name: "Resonance",
        min: -20.0,
        max: 20.0,
        default: -5.0,
        unit: ParamUnit::Decibels,
    },
];
