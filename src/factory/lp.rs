//! LP builder and solver interface (§4.7, §4.8).
//!
//! Mirrors the dynamic `good_lp` construction idiom seen across this
//! domain's reference implementations: a `ProblemVariables` bag holding one
//! non-negative variable per recipe, an objective and constraints built as
//! plain `Expression` locals via fold/sum (not the `variables!`/`constraint!`
//! macros' static form, since the recipe set is only known at runtime), then
//! `constraint!` to register each finished `Expression` comparison.

use std::collections::BTreeMap;

use good_lp::{constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use super::model::FactoryModel;
use super::preprocess::{Classification, EffectiveRecipe};
use crate::error::{Error, Result};
use crate::numeric::{round6, EPS};

/// Recommended LP solve time budget (§5). The in-process `microlp` backend
/// used here has no external time-limit knob and runs the small simplex
/// problems this system builds to completion well within this budget; the
/// constant is kept so a future swap to a backend that does honor time
/// limits (CBC, HiGHS) only needs to thread it through.
pub const LP_TIME_LIMIT_SECS: f64 = 2.0;

/// An extracted production plan (§4.8).
#[derive(Debug, Clone)]
pub struct Plan {
    pub per_recipe_crafts_per_min: BTreeMap<String, f64>,
    pub per_machine_counts: BTreeMap<String, f64>,
    pub raw_consumption_per_min: BTreeMap<String, f64>,
}

/// Build and solve the steady-state LP for `target_rate`. Returns `Ok(None)`
/// when the LP is infeasible at this rate (the caller falls back to
/// bisection), `Ok(Some(plan))` on an optimal solution, and `Err` only for a
/// genuine solver failure.
pub fn solve_lp(
    model: &FactoryModel,
    classification: &Classification,
    effective: &BTreeMap<String, EffectiveRecipe>,
    target_rate: f64,
) -> Result<Option<Plan>> {
    let mut vars = ProblemVariables::new();
    let x: BTreeMap<String, Variable> = model
        .recipes
        .keys()
        .map(|name| (name.clone(), vars.add(variable().min(0.0))))
        .collect();

    let mut objective = Expression::from_other_affine(0.0);
    for (name, v) in &x {
        objective = objective + *v * (1.0 / effective[name].eff_rate);
    }

    let mut problem = vars.minimise(objective).using(default_solver);

    let mut items = model.all_items();
    items.insert(model.target.item.clone());

    for item in &items {
        let mut produced = Expression::from_other_affine(0.0);
        let mut consumed = Expression::from_other_affine(0.0);
        for (rname, recipe) in &model.recipes {
            let out_qty = recipe.output_qty(item);
            if out_qty != 0.0 {
                produced = produced + x[rname] * (out_qty * effective[rname].prod_mult);
            }
            let in_qty = recipe.input_qty(item);
            if in_qty != 0.0 {
                consumed = consumed + x[rname] * in_qty;
            }
        }
        let net = produced - consumed;

        if *item == model.target.item {
            let target = Expression::from_other_affine(target_rate);
            problem.add_constraint(constraint!(net == target));
        } else if classification.intermediate.contains(item) {
            let zero = Expression::from_other_affine(0.0);
            problem.add_constraint(constraint!(net == zero));
        } else if classification.raw.contains(item) {
            let zero = Expression::from_other_affine(0.0);
            problem.add_constraint(constraint!(net.clone() <= zero));
            let cap = model.limits.raw_cap(item);
            if cap.is_finite() {
                let neg_net = Expression::from_other_affine(0.0) - net;
                let cap_expr = Expression::from_other_affine(cap);
                problem.add_constraint(constraint!(neg_net <= cap_expr));
            }
        }
    }

    for (mtype, cap) in &model.limits.max_machines {
        if !cap.is_finite() {
            continue;
        }
        let mut load = Expression::from_other_affine(0.0);
        for (rname, recipe) in &model.recipes {
            if &recipe.machine == mtype {
                load = load + x[rname] * (1.0 / effective[rname].eff_rate);
            }
        }
        let cap_expr = Expression::from_other_affine(*cap);
        problem.add_constraint(constraint!(load <= cap_expr));
    }

    match problem.solve() {
        Ok(solution) => Ok(Some(extract_plan(&solution, &x, model, effective, classification))),
        Err(good_lp::ResolutionError::Infeasible) => Ok(None),
        Err(good_lp::ResolutionError::Unbounded) => Ok(None),
        Err(other) => Err(Error::internal(format!("LP solver failed: {other:?}"))),
    }
}

fn extract_plan(
    solution: &impl Solution,
    x: &BTreeMap<String, Variable>,
    model: &FactoryModel,
    effective: &BTreeMap<String, EffectiveRecipe>,
    classification: &Classification,
) -> Plan {
    let mut per_recipe = BTreeMap::new();
    for (name, v) in x {
        let value = solution.value(*v).max(0.0);
        per_recipe.insert(name.clone(), round6(value));
    }

    let mut per_machine: BTreeMap<String, f64> = BTreeMap::new();
    for (name, recipe) in &model.recipes {
        let used = per_recipe[name] / effective[name].eff_rate;
        *per_machine.entry(recipe.machine.clone()).or_insert(0.0) += used;
    }
    for v in per_machine.values_mut() {
        *v = round6(*v);
    }

    let mut raw_consumption = BTreeMap::new();
    for item in &classification.raw {
        let total: f64 = model
            .recipes
            .iter()
            .map(|(name, r)| per_recipe[name] * r.input_qty(item))
            .sum();
        if total > EPS {
            raw_consumption.insert(item.clone(), round6(total));
        }
    }

    Plan {
        per_recipe_crafts_per_min: per_recipe,
        per_machine_counts: per_machine,
        raw_consumption_per_min: raw_consumption,
    }
}
