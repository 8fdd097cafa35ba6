//! JSON input/output schema for the factory engine (§6.4, §6.5).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bisect::BisectionResult;
use super::lp::Plan;
use super::model::{FactoryModel, Limits, Machine, ModuleProfile, Recipe, Target};
use crate::error::{Error, Result};
use crate::numeric::{round4, round6};

#[derive(Debug, Deserialize)]
struct MachineRaw {
    crafts_per_min: f64,
}

#[derive(Debug, Deserialize)]
struct RecipeRaw {
    machine: String,
    time_s: f64,
    #[serde(rename = "in", default)]
    input: BTreeMap<String, f64>,
    #[serde(rename = "out", default)]
    output: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ModuleRaw {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    prod: f64,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsRaw {
    #[serde(default)]
    raw_supply_per_min: BTreeMap<String, f64>,
    #[serde(default)]
    max_machines: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct TargetRaw {
    item: String,
    rate_per_min: f64,
}

#[derive(Debug, Deserialize)]
struct FactoryInputRaw {
    machines: BTreeMap<String, MachineRaw>,
    recipes: BTreeMap<String, RecipeRaw>,
    #[serde(default)]
    modules: BTreeMap<String, ModuleRaw>,
    #[serde(default)]
    limits: LimitsRaw,
    target: TargetRaw,
}

/// Parse and validate a raw JSON value into a `FactoryModel` (§6.4, §7).
pub fn parse_input(value: &serde_json::Value) -> Result<FactoryModel> {
    let raw: FactoryInputRaw = serde_json::from_value(value.clone())
        .map_err(|e| Error::invalid_input(format!("malformed factory input: {e}")))?;

    let machines = raw
        .machines
        .into_iter()
        .map(|(name, m)| (name, Machine { crafts_per_min: m.crafts_per_min }))
        .collect();

    let recipes = raw
        .recipes
        .into_iter()
        .map(|(name, r)| {
            (
                name,
                Recipe {
                    machine: r.machine,
                    time_s: r.time_s,
                    input: r.input,
                    output: r.output,
                },
            )
        })
        .collect();

    let modules = raw
        .modules
        .into_iter()
        .map(|(name, m)| (name, ModuleProfile { speed: m.speed, prod: m.prod }))
        .collect();

    let limits = Limits {
        raw_supply_per_min: raw.limits.raw_supply_per_min,
        max_machines: raw.limits.max_machines,
    };

    let model = FactoryModel {
        machines,
        recipes,
        modules,
        limits,
        target: Target { item: raw.target.item, rate_per_min: raw.target.rate_per_min },
    };

    model.validate()?;
    Ok(model)
}

fn plan_fields(plan: &Plan) -> (BTreeMap<String, f64>, BTreeMap<String, f64>, BTreeMap<String, f64>) {
    // §4.8/§6.5: per-recipe/per-machine/raw-consumption are internal plan
    // quantities, rounded to 6 decimals (not the 4dp used for Belts flows).
    let per_recipe = plan.per_recipe_crafts_per_min.iter().map(|(k, v)| (k.clone(), round6(*v))).collect();
    let per_machine = plan.per_machine_counts.iter().map(|(k, v)| (k.clone(), round6(*v))).collect();
    let raw = plan.raw_consumption_per_min.iter().map(|(k, v)| (k.clone(), round6(*v))).collect();
    (per_recipe, per_machine, raw)
}

/// The result object serialized to stdout (§6.5).
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FactoryOutput {
    Ok {
        per_recipe_crafts_per_min: BTreeMap<String, f64>,
        per_machine_counts: BTreeMap<String, f64>,
        raw_consumption_per_min: BTreeMap<String, f64>,
    },
    Infeasible {
        max_feasible_target_per_min: f64,
        bottleneck_hint: Vec<String>,
    },
    Error {
        message: String,
        /// Not part of the JSON contract (§6.5) — carried alongside the
        /// message so the binary can exit 1 only for a genuine internal
        /// solver failure, per §6.1/§7.
        #[serde(skip)]
        exit_code: i32,
    },
}

impl FactoryOutput {
    pub fn ok(plan: &Plan) -> Self {
        let (per_recipe_crafts_per_min, per_machine_counts, raw_consumption_per_min) = plan_fields(plan);
        Self::Ok {
            per_recipe_crafts_per_min,
            per_machine_counts,
            raw_consumption_per_min,
        }
    }

    pub fn infeasible(result: &BisectionResult) -> Self {
        Self::Infeasible {
            max_feasible_target_per_min: round4(result.achievable_rate_per_min),
            bottleneck_hint: result.bottlenecks.clone(),
        }
    }

    /// Build an `error` result, carrying the originating [`Error`]'s exit
    /// code (§6.1, §7) alongside its message.
    pub fn error(err: &Error) -> Self {
        Self::Error {
            message: err.message(),
            exit_code: err.exit_code(),
        }
    }

    /// Process exit code for this outcome (§6.1): 0 for `ok`/`infeasible` and
    /// for an input-shape/semantics `error`, 1 only for a genuine internal
    /// solver failure (malformed JSON is handled directly in the binary,
    /// before any `FactoryOutput` exists).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Error { exit_code, .. } => *exit_code,
            _ => 0,
        }
    }
}
