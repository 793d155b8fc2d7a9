use roots::{find_root_brent, Convergency};
use std::cell::{Cell, RefCell};
use tracing::{trace, warn};

/// Share of the domain width by which the residual is first probed on either side of the guess
const PROBE_FRACTION: f64 = 0.01;
/// Share of the domain width of the first expansion step, doubled at every step
const EXPANSION_FRACTION: f64 = 0.05;
/// Change of residual, relative to the tolerance, under which a probe sees no response
const FLATNESS_FRACTION: f64 = 0.01;
/// Bracket width, relative to the domain width, at which Brent's method stops
const BRACKET_FRACTION: f64 = 1e-12;

/// A scalar search for the value of an actuator that zeroes a residual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RootSearch {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    /// first trial, clamped into [lower, upper]
    pub(crate) initial: f64,
    /// accepted |residual|
    pub(crate) tolerance: f64,
    pub(crate) max_iterations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Root<T> {
    pub(crate) x: f64,
    pub(crate) residual: f64,
    /// value returned by the evaluation at `x`
    pub(crate) value: T,
    pub(crate) evaluations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RootSearchError<E> {
    /// the residual does not respond to the unknown around the initial guess
    Unresponsive,
    /// the residual keeps its sign over the whole domain
    NoSignChange,
    /// Brent's method stopped short of the tolerance, `iterations` counting its own iterations only
    NonConvergent { iterations: usize, residual: f64 },
    /// evaluating the residual failed
    Evaluation(E),
}

/// Stops Brent's method on a small enough residual, a collapsed bracket, a
/// failed evaluation or an exhausted iteration budget.
struct SetpointConvergency<'a> {
    tolerance: f64,
    bracket_width: f64,
    max_iterations: usize,
    failed: &'a Cell<bool>,
    /// Brent iterations completed so far
    iterations: usize,
}

impl Convergency<f64> for SetpointConvergency<'_> {
    fn is_root_found(&mut self, y: f64) -> bool {
        self.failed.get() || y.abs() <= self.tolerance
    }

    fn is_converged(&mut self, x1: f64, x2: f64) -> bool {
        (x1 - x2).abs() <= self.bracket_width
    }

    fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
        self.iterations = iter;
        iter >= self.max_iterations
    }
}

/// Last trial on one side of the initial guess during bracket expansion.
struct Side {
    x: f64,
    residual: f64,
    open: bool,
}

/// Find where `residual` changes sign within [lower, upper].
///
/// The residual is first probed close to the initial guess, to tell an
/// unknown that has no effect on the output from one that does. The bracket
/// then grows geometrically from the guess towards both edges of the domain
/// until the residual changes sign, and Brent's method refines the root. A
/// failed evaluation ends the expansion on its side; it is reported only when
/// no bracket is found.
///
/// Arguments:
/// * `residual` - returns the deviation from the set-point and any value to keep from the evaluation
/// * `search` - domain, initial guess, tolerance and iteration budget
pub(crate) fn find_root<T, E>(
    residual: impl Fn(f64) -> Result<(f64, T), E>,
    search: &RootSearch,
) -> Result<Root<T>, RootSearchError<E>> {
    let RootSearch {
        lower,
        upper,
        tolerance,
        ..
    } = *search;
    let width = upper - lower;
    let x0 = search.initial.clamp(lower, upper);
    let evaluations = Cell::new(0usize);
    let evaluate = |x: f64| {
        evaluations.set(evaluations.get() + 1);
        let evaluation = residual(x);
        if let Ok((r, _)) = &evaluation {
            trace!(x, residual = r, "set-point search trial");
        }
        evaluation
    };
    let accept = |x: f64, (r, value): (f64, T)| {
        if x == lower || x == upper {
            warn!(
                x,
                residual = r,
                "set-point met within tolerance at the edge of the search domain"
            );
        }
        Root {
            x,
            residual: r,
            value,
            evaluations: evaluations.get(),
        }
    };

    let (r0, value0) = evaluate(x0).map_err(RootSearchError::Evaluation)?;
    if r0.abs() <= tolerance {
        return Ok(accept(x0, (r0, value0)));
    }

    let mut above = Side {
        x: x0,
        residual: r0,
        open: x0 < upper,
    };
    let mut below = Side {
        x: x0,
        residual: r0,
        open: x0 > lower,
    };
    let mut first_failure = None;
    let mut probes_flat = vec![];
    let mut probing = true;
    let mut step = PROBE_FRACTION * width;

    loop {
        for (side, direction) in [(&mut above, 1.), (&mut below, -1.)] {
            if !side.open {
                continue;
            }
            let x = (x0 + direction * step).clamp(lower, upper);
            match evaluate(x) {
                Ok((r, value)) => {
                    if probing {
                        probes_flat.push((r - r0).abs() < FLATNESS_FRACTION * tolerance);
                    }
                    if r.abs() <= tolerance {
                        return Ok(accept(x, (r, value)));
                    }
                    if r.signum() != r0.signum() {
                        let bracket = if side.x < x {
                            ((side.x, side.residual), (x, r))
                        } else {
                            ((x, r), (side.x, side.residual))
                        };
                        return refine(&evaluate, bracket, search, &evaluations);
                    }
                    *side = Side {
                        x,
                        residual: r,
                        open: x > lower && x < upper,
                    };
                }
                Err(e) => {
                    if probing {
                        probes_flat.push(false);
                    }
                    first_failure.get_or_insert(e);
                    side.open = false;
                }
            }
        }

        if probing {
            if !probes_flat.is_empty() && probes_flat.iter().all(|flat| *flat) {
                return Err(RootSearchError::Unresponsive);
            }
            probing = false;
            step = EXPANSION_FRACTION * width;
        } else {
            step *= 2.;
        }

        if !above.open && !below.open {
            return Err(match first_failure {
                Some(e) => RootSearchError::Evaluation(e),
                None => RootSearchError::NoSignChange,
            });
        }
    }
}

/// Brent's method within a bracket, re-evaluating the residual at the root found.
fn refine<T, E>(
    evaluate: &impl Fn(f64) -> Result<(f64, T), E>,
    ((a, ra), (b, rb)): ((f64, f64), (f64, f64)),
    search: &RootSearch,
    evaluations: &Cell<usize>,
) -> Result<Root<T>, RootSearchError<E>> {
    trace!(a, b, ra, rb, "set-point bracketed");
    let failure = RefCell::new(None);
    let failed = Cell::new(false);
    let best_residual = Cell::new(ra.abs().min(rb.abs()));
    let mut convergency = SetpointConvergency {
        tolerance: search.tolerance,
        bracket_width: BRACKET_FRACTION * (search.upper - search.lower),
        max_iterations: search.max_iterations,
        failed: &failed,
        iterations: 0,
    };

    let found = find_root_brent(
        a,
        b,
        |x: f64| match evaluate(x) {
            Ok((r, _)) => {
                best_residual.set(best_residual.get().min(r.abs()));
                r
            }
            Err(e) => {
                failure.borrow_mut().get_or_insert(e);
                failed.set(true);
                f64::NAN
            }
        },
        &mut convergency,
    );

    if let Some(e) = failure.into_inner() {
        return Err(RootSearchError::Evaluation(e));
    }
    let iterations = convergency.iterations;
    let non_convergent = |residual: f64| RootSearchError::NonConvergent {
        iterations,
        residual,
    };
    let x = found.map_err(|_| non_convergent(best_residual.get()))?;

    let (r, value) = evaluate(x).map_err(RootSearchError::Evaluation)?;
    if r.abs() > search.tolerance {
        return Err(non_convergent(r.abs()));
    }

    Ok(Root {
        x,
        residual: r,
        value,
        evaluations: evaluations.get(),
    })
}
