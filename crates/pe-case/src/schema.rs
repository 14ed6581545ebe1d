//! Case file schema definitions.

use pe_equilibrium::SolverConfig;
use pe_performance::NozzleConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

fn latest_version() -> u32 {
    LATEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    #[serde(default = "latest_version")]
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reactants: Vec<ReactantDef>,
    pub problem: ProblemDef,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub nozzle: NozzleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<TablesDef>,
}

/// One propellant and its amount: either `mass` (with units) or `moles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moles: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ProblemDef {
    /// Single equilibrium point.
    Equilibrium {
        pressure: String,
        #[serde(default)]
        closure: ClosureDef,
    },
    /// Chamber, throat and one or more exits.
    Performance {
        chamber_pressure: String,
        #[serde(default)]
        strategy: StrategyDef,
        exits: Vec<ExitDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum ClosureDef {
    #[default]
    Adiabatic,
    Temperature {
        temperature: String,
    },
    Enthalpy {
        enthalpy: String,
    },
    Entropy {
        entropy: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum StrategyDef {
    Frozen,
    #[default]
    Shifting,
    Equilibrium {
        #[serde(default)]
        closure: ClosureDef,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ExitDef {
    Pressure { pressure: String },
    SupersonicAreaRatio { ratio: f64 },
    SubsonicAreaRatio { ratio: f64 },
}

/// Optional data files replacing the built-in tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TablesDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propellants: Option<PathBuf>,
}
