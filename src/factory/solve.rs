//! Top-level factory solve driver (§4.7-§4.9): parse, preprocess, solve the
//! LP at the requested rate, and fall back to rate bisection when that LP
//! is infeasible.

use tracing::{debug, info, instrument};

use super::bisect::bisect_max_rate;
use super::io::{parse_input, FactoryOutput};
use super::lp::solve_lp;
use super::preprocess::preprocess;
use crate::error::{Error, Result};
use crate::numeric::is_zero;

/// Solve a factory instance given as a raw JSON value, returning the result
/// object that should be serialized to stdout (§6.1). Parse/validation
/// failures and internal solver failures are folded into
/// `FactoryOutput::Error` here so the caller never has to match on `Result`.
pub fn solve_factory(value: &serde_json::Value) -> FactoryOutput {
    match solve_factory_inner(value) {
        Ok(output) => output,
        Err(e) => FactoryOutput::error(&e),
    }
}

#[instrument(skip_all)]
fn solve_factory_inner(value: &serde_json::Value) -> Result<FactoryOutput> {
    let model = parse_input(value)?;
    debug!(
        recipes = model.recipes.len(),
        machines = model.machines.len(),
        target = %model.target.item,
        "parsed factory input"
    );

    let (classification, effective) = preprocess(&model);

    if is_zero(model.target.rate_per_min) {
        info!("target rate is zero, short-circuiting to ok with an empty plan");
        let plan = solve_lp(&model, &classification, &effective, 0.0)?.ok_or_else(|| {
            Error::internal("LP infeasible at rate 0: the empty plan should always satisfy every balance constraint")
        })?;
        return Ok(FactoryOutput::ok(&plan));
    }

    match solve_lp(&model, &classification, &effective, model.target.rate_per_min)? {
        Some(plan) => Ok(FactoryOutput::ok(&plan)),
        None => {
            info!("target rate infeasible, bisecting for the largest achievable rate");
            let result = bisect_max_rate(&model, &classification, &effective, model.target.rate_per_min)?;
            Ok(FactoryOutput::infeasible(&result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference_case() -> serde_json::Value {
        json!({
            "machines": {"asm": {"crafts_per_min": 60.0}},
            "recipes": {
                "smelt_iron": {
                    "machine": "asm",
                    "time_s": 3.2,
                    "in": {"iron_ore": 1.0},
                    "out": {"iron_plate": 1.0}
                },
                "make_gear": {
                    "machine": "asm",
                    "time_s": 0.5,
                    "in": {"iron_plate": 2.0},
                    "out": {"iron_gear": 1.0}
                }
            },
            "limits": {"raw_supply_per_min": {"iron_ore": 10000.0}},
            "target": {"item": "iron_gear", "rate_per_min": 120.0}
        })
    }

    #[test]
    fn reference_case_is_ok() {
        let out = solve_factory(&reference_case());
        match out {
            FactoryOutput::Ok { per_recipe_crafts_per_min, .. } => {
                assert!(per_recipe_crafts_per_min.contains_key("make_gear"));
                assert!(per_recipe_crafts_per_min.contains_key("smelt_iron"));
            }
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn raw_supply_cap_forces_bisection() {
        let mut input = reference_case();
        input["limits"]["raw_supply_per_min"]["iron_ore"] = json!(10.0);
        let out = solve_factory(&input);
        match out {
            FactoryOutput::Infeasible { bottleneck_hint, max_feasible_target_per_min } => {
                assert!(max_feasible_target_per_min < 120.0);
                assert!(bottleneck_hint.iter().any(|b| b.contains("iron_ore")));
            }
            _ => panic!("expected infeasible"),
        }
    }

    #[test]
    fn empty_recipes_is_an_error() {
        let input = json!({
            "machines": {},
            "recipes": {},
            "target": {"item": "x", "rate_per_min": 1.0}
        });
        assert!(matches!(solve_factory(&input), FactoryOutput::Error { .. }));
    }

    #[test]
    fn reproducible_across_runs() {
        let input = reference_case();
        let baseline = serde_json::to_string(&solve_factory(&input)).unwrap();
        for _ in 0..3 {
            assert_eq!(serde_json::to_string(&solve_factory(&input)).unwrap(), baseline);
        }
    }
}
