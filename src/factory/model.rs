//! Factory data model (§3): machines, recipes, modules, limits, target.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// A machine type's nominal crafting rate.
#[derive(Debug, Clone, Copy)]
pub struct Machine {
    pub crafts_per_min: f64,
}

/// A recipe: which machine runs it, how long a craft takes, and its input
/// and output bags.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub machine: String,
    pub time_s: f64,
    pub input: BTreeMap<String, f64>,
    pub output: BTreeMap<String, f64>,
}

impl Recipe {
    pub fn input_qty(&self, item: &str) -> f64 {
        self.input.get(item).copied().unwrap_or(0.0)
    }

    pub fn output_qty(&self, item: &str) -> f64 {
        self.output.get(item).copied().unwrap_or(0.0)
    }
}

/// Speed/productivity module bonuses for a machine type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleProfile {
    pub speed: f64,
    pub prod: f64,
}

/// Per-raw-item and per-machine-type ceilings. A missing entry means +∞.
#[derive(Debug, Clone, Default)]
pub struct Limits {
    pub raw_supply_per_min: BTreeMap<String, f64>,
    pub max_machines: BTreeMap<String, f64>,
}

impl Limits {
    pub fn raw_cap(&self, item: &str) -> f64 {
        self.raw_supply_per_min.get(item).copied().unwrap_or(f64::INFINITY)
    }

    pub fn machine_cap(&self, mtype: &str) -> f64 {
        self.max_machines.get(mtype).copied().unwrap_or(f64::INFINITY)
    }
}

/// The requested target item and rate.
#[derive(Debug, Clone)]
pub struct Target {
    pub item: String,
    pub rate_per_min: f64,
}

/// A fully-parsed factory instance.
#[derive(Debug, Clone)]
pub struct FactoryModel {
    pub machines: BTreeMap<String, Machine>,
    pub recipes: BTreeMap<String, Recipe>,
    pub modules: BTreeMap<String, ModuleProfile>,
    pub limits: Limits,
    pub target: Target,
}

impl FactoryModel {
    /// Validate cross-references and numeric ranges (§7).
    pub fn validate(&self) -> Result<()> {
        if self.recipes.is_empty() {
            return Err(Error::invalid_input("recipe set must not be empty"));
        }
        for (name, recipe) in &self.recipes {
            if recipe.time_s <= 0.0 {
                return Err(Error::invalid_input(format!(
                    "recipe '{name}' has non-positive time_s"
                )));
            }
            if !self.machines.contains_key(&recipe.machine) {
                return Err(Error::invalid_input(format!(
                    "recipe '{name}' references unknown machine '{}'",
                    recipe.machine
                )));
            }
            for (item, qty) in recipe.input.iter().chain(recipe.output.iter()) {
                if *qty < 0.0 {
                    return Err(Error::invalid_input(format!(
                        "recipe '{name}' has negative quantity for '{item}'"
                    )));
                }
            }
        }
        for (mtype, m) in &self.machines {
            if m.crafts_per_min <= 0.0 {
                return Err(Error::invalid_input(format!(
                    "machine '{mtype}' must have positive crafts_per_min"
                )));
            }
        }
        if self.target.rate_per_min < 0.0 {
            return Err(Error::invalid_input("target rate must be non-negative"));
        }
        for (item, cap) in &self.limits.raw_supply_per_min {
            if *cap < 0.0 {
                return Err(Error::invalid_input(format!(
                    "raw supply cap for '{item}' must be non-negative"
                )));
            }
        }
        for (mtype, cap) in &self.limits.max_machines {
            if *cap < 0.0 {
                return Err(Error::invalid_input(format!(
                    "machine cap for '{mtype}' must be non-negative"
                )));
            }
        }
        Ok(())
    }

    /// All items appearing in any recipe's input or output bag.
    pub fn all_items(&self) -> BTreeSet<String> {
        let mut items = BTreeSet::new();
        for r in self.recipes.values() {
            items.extend(r.input.keys().cloned());
            items.extend(r.output.keys().cloned());
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_model() -> FactoryModel {
        let mut machines = BTreeMap::new();
        machines.insert("asm".to_string(), Machine { crafts_per_min: 60.0 });

        let mut recipes = BTreeMap::new();
        recipes.insert(
            "r1".to_string(),
            Recipe {
                machine: "asm".to_string(),
                time_s: 1.0,
                input: BTreeMap::from([("ore".to_string(), 1.0)]),
                output: BTreeMap::from([("bar".to_string(), 1.0)]),
            },
        );

        FactoryModel {
            machines,
            recipes,
            modules: BTreeMap::new(),
            limits: Limits::default(),
            target: Target { item: "bar".to_string(), rate_per_min: 10.0 },
        }
    }

    #[test]
    fn validate_accepts_well_formed_model() {
        assert!(minimal_model().validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_raw_supply_cap() {
        let mut model = minimal_model();
        model.limits.raw_supply_per_min.insert("ore".to_string(), -1.0);
        assert!(model.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_machine_cap() {
        let mut model = minimal_model();
        model.limits.max_machines.insert("asm".to_string(), -1.0);
        assert!(model.validate().is_err());
    }
}
