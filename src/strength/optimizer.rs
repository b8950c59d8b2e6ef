//! A hand-rolled, gradient-free coordinate-descent optimizer.
//!
//! `spec.md` §4.1 allows "any quasi-Newton or L-BFGS variant" but pins down
//! no concrete implementation, and no crate in this codebase's lineage pulls
//! in an external optimizer. This follows the precedent set by
//! `brumby-soccer`'s `fit.rs` (`hypergrid_search`, `univariate_descent`):
//! a deterministic, dependency-free local search that shrinks its step size
//! until it falls below a tolerance. Unlike a true quasi-Newton method this
//! has no line-search guarantees, but it is trivially reproducible (no RNG)
//! which the spec's idempotence invariant (§8 property 8) requires.

#[derive(Debug, Clone, Copy)]
pub struct DescentConfig {
    pub init_step: f64,
    pub min_step: f64,
    pub max_steps: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DescentOutcome {
    pub optimal_value: f64,
    pub optimal_cost: f64,
    pub steps: usize,
}

/// Minimize `cost` over a single scalar, clamped to `bounds`, via hill
/// descent with a shrinking step.
pub fn univariate_descent(
    config: &DescentConfig,
    init_value: f64,
    bounds: (f64, f64),
    mut cost: impl FnMut(f64) -> f64,
) -> DescentOutcome {
    let mut value = init_value.clamp(bounds.0, bounds.1);
    let mut current_cost = cost(value);
    let mut step = config.init_step;
    let mut steps = 0;

    while step >= config.min_step && steps < config.max_steps {
        let up = (value + step).clamp(bounds.0, bounds.1);
        let down = (value - step).clamp(bounds.0, bounds.1);
        let up_cost = cost(up);
        let down_cost = cost(down);

        if up_cost < current_cost && up_cost <= down_cost {
            value = up;
            current_cost = up_cost;
        } else if down_cost < current_cost {
            value = down;
            current_cost = down_cost;
        } else {
            step *= 0.5;
        }
        steps += 1;
    }

    DescentOutcome {
        optimal_value: value,
        optimal_cost: current_cost,
        steps,
    }
}

/// One named, bounded scalar parameter in a coordinate-descent block.
pub struct Parameter {
    pub value: f64,
    pub bounds: (f64, f64),
}

/// Block-coordinate descent: repeatedly sweep every parameter, optimizing
/// each in turn against the full objective with the others held fixed,
/// until the objective stops improving by more than `acceptable_residual`
/// or `max_sweeps` is reached. Returns the number of sweeps actually run and
/// the final objective value.
pub fn coordinate_descent(
    params: &mut [Parameter],
    max_sweeps: usize,
    acceptable_residual: f64,
    mut objective: impl FnMut(&[f64]) -> f64,
) -> (usize, f64) {
    let mut values: Vec<f64> = params.iter().map(|p| p.value).collect();
    let mut last_cost = objective(&values);

    let descent_config = DescentConfig {
        init_step: 0.2,
        min_step: 1e-5,
        max_steps: 40,
    };

    let mut sweep = 0;
    loop {
        let mut improved = false;
        for i in 0..params.len() {
            let bounds = params[i].bounds;
            let before = values[i];
            let outcome = univariate_descent(&descent_config, before, bounds, |candidate| {
                values[i] = candidate;
                objective(&values)
            });
            values[i] = outcome.optimal_value;
            if (before - outcome.optimal_value).abs() > 1e-9 {
                improved = true;
            }
        }
        let cost = objective(&values);
        sweep += 1;
        let delta = (last_cost - cost).abs();
        last_cost = cost;
        if !improved || delta < acceptable_residual || sweep >= max_sweeps {
            break;
        }
    }

    for (p, v) in params.iter_mut().zip(values.iter()) {
        p.value = *v;
    }
    (sweep, last_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn univariate_descent_finds_quadratic_minimum() {
        let config = DescentConfig {
            init_step: 1.0,
            min_step: 1e-6,
            max_steps: 200,
        };
        let outcome = univariate_descent(&config, 5.0, (-10.0, 10.0), |x| (x - 2.0).powi(2));
        assert!((outcome.optimal_value - 2.0).abs() < 1e-3);
    }

    #[test]
    fn coordinate_descent_finds_joint_minimum() {
        let mut params = vec![
            Parameter { value: 5.0, bounds: (-10.0, 10.0) },
            Parameter { value: -5.0, bounds: (-10.0, 10.0) },
        ];
        let (_, cost) = coordinate_descent(&mut params, 50, 1e-10, |v| {
            (v[0] - 1.0).powi(2) + (v[1] + 3.0).powi(2)
        });
        assert!(cost < 1e-4);
        assert!((params[0].value - 1.0).abs() < 1e-2);
        assert!((params[1].value + 3.0).abs() < 1e-2);
    }
}
