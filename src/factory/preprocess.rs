//! Recipe preprocessor (§4.6): item classification and per-recipe effective
//! rates.

use std::collections::{BTreeMap, BTreeSet};

use super::model::FactoryModel;

/// Effective craft rate and productivity multiplier for a single recipe.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveRecipe {
    /// `crafts_per_min(machine) * (1 + speed) * 60 / time_s`
    pub eff_rate: f64,
    /// `1 + prod`
    pub prod_mult: f64,
}

/// Item classification relative to the target item (§3, §4.6).
pub struct Classification {
    pub raw: BTreeSet<String>,
    pub intermediate: BTreeSet<String>,
}

/// Classify every item referenced by any recipe as raw, intermediate, or
/// the target, and compute effective rates for every recipe.
pub fn preprocess(model: &FactoryModel) -> (Classification, BTreeMap<String, EffectiveRecipe>) {
    let mut produced = BTreeSet::new();
    let mut consumed = BTreeSet::new();
    for recipe in model.recipes.values() {
        produced.extend(recipe.output.keys().cloned());
        consumed.extend(recipe.input.keys().cloned());
    }

    let raw: BTreeSet<String> = consumed.difference(&produced).cloned().collect();
    let all: BTreeSet<String> = produced.union(&consumed).cloned().collect();
    let intermediate: BTreeSet<String> = all
        .into_iter()
        .filter(|i| !raw.contains(i) && *i != model.target.item)
        .collect();

    let mut effective = BTreeMap::new();
    for (name, recipe) in &model.recipes {
        let machine = &model.machines[&recipe.machine];
        let module = model.modules.get(&recipe.machine).copied().unwrap_or_default();
        let eff_rate = machine.crafts_per_min * (1.0 + module.speed) * 60.0 / recipe.time_s;
        effective.insert(
            name.clone(),
            EffectiveRecipe {
                eff_rate,
                prod_mult: 1.0 + module.prod,
            },
        );
    }

    (Classification { raw, intermediate }, effective)
}
