//! Rate-bisection fallback (§4.9): when the LP is infeasible at the
//! requested target rate, binary-search the largest achievable rate and
//! report which caps are binding there.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::lp::{solve_lp, Plan};
use super::model::FactoryModel;
use super::preprocess::{Classification, EffectiveRecipe};
use crate::error::{Error, Result};
use crate::numeric::{round4, EPS, HINT_EPS};

const MAX_ITERS: u32 = 60;

/// The best achievable rate below the target, its plan, and the bottleneck
/// hints binding at that rate.
pub struct BisectionResult {
    pub achievable_rate_per_min: f64,
    pub plan: Plan,
    pub bottlenecks: Vec<String>,
}

/// Binary-search the maximum feasible rate in `[0, target_rate]`. Assumes
/// the caller already established that `target_rate` itself is infeasible
/// and that rate 0 is trivially feasible (the empty plan).
#[instrument(skip_all, fields(target_rate))]
pub fn bisect_max_rate(
    model: &FactoryModel,
    classification: &Classification,
    effective: &BTreeMap<String, EffectiveRecipe>,
    target_rate: f64,
) -> Result<BisectionResult> {
    let mut lo = 0.0_f64;
    let mut hi = target_rate;
    let mut best_plan = solve_lp(model, classification, effective, 0.0)?.ok_or_else(|| {
        Error::internal("LP infeasible at rate 0: the empty plan should always satisfy every balance constraint")
    })?;

    for iteration in 0..MAX_ITERS {
        if hi - lo < EPS {
            break;
        }
        let mid = lo + (hi - lo) / 2.0;
        match solve_lp(model, classification, effective, mid)? {
            Some(plan) => {
                debug!(iteration, mid, "bisection: feasible, raising lower bound");
                best_plan = plan;
                lo = mid;
            }
            None => {
                debug!(iteration, mid, "bisection: infeasible, lowering upper bound");
                hi = mid;
            }
        }
    }

    let bottlenecks = bottleneck_hints(model, &best_plan);

    Ok(BisectionResult {
        achievable_rate_per_min: round4(lo),
        plan: best_plan,
        bottlenecks,
    })
}

/// Names of the machine types and raw items whose cap is binding (within
/// `HINT_EPS`) at the given plan, sorted and suffixed per §4.9.
fn bottleneck_hints(model: &FactoryModel, plan: &Plan) -> Vec<String> {
    let mut hints = Vec::new();

    for (mtype, used) in &plan.per_machine_counts {
        let cap = model.limits.machine_cap(mtype);
        if cap.is_finite() && (cap - used).abs() <= HINT_EPS {
            hints.push(format!("{mtype} cap"));
        }
    }

    for (item, used) in &plan.raw_consumption_per_min {
        let cap = model.limits.raw_cap(item);
        if cap.is_finite() && (cap - used).abs() <= HINT_EPS {
            hints.push(format!("{item} supply"));
        }
    }

    hints.sort();
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::model::{Limits, Machine, Recipe, Target};
    use crate::factory::preprocess::preprocess;
    use std::collections::BTreeMap;

    fn capped_model(raw_cap: f64) -> FactoryModel {
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

        let mut raw_supply_per_min = BTreeMap::new();
        raw_supply_per_min.insert("ore".to_string(), raw_cap);

        FactoryModel {
            machines,
            recipes,
            modules: BTreeMap::new(),
            limits: Limits { raw_supply_per_min, max_machines: BTreeMap::new() },
            target: Target { item: "bar".to_string(), rate_per_min: 10000.0 },
        }
    }

    #[test]
    fn bisection_converges_to_raw_supply_cap() {
        let model = capped_model(120.0);
        let (classification, effective) = preprocess(&model);
        let result = bisect_max_rate(&model, &classification, &effective, model.target.rate_per_min).unwrap();
        assert!((result.achievable_rate_per_min - 120.0).abs() < 1e-3);
        assert!(result.bottlenecks.contains(&"ore supply".to_string()));
    }
}
