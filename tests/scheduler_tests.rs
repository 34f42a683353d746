//! Schedule state-machine properties: ping-pong alternation, red/black
//! ordering, and the fixed dispatch accounting.

use terraflow::scheduler::{
    plan_tick, relax_phases, Direction, Generation, RelaxPhase, RELAX_ITERATIONS,
    SUBMISSIONS_PER_TICK,
};

#[test]
fn directions_alternate_starting_forward() {
    let mut generation = Generation::Ping;
    let mut directions = Vec::new();
    for _ in 0..6 {
        let (plan, next) = plan_tick(generation);
        directions.push(plan.direction);
        generation = next;
    }
    assert_eq!(
        directions,
        vec![
            Direction::Forward,
            Direction::Reverse,
            Direction::Forward,
            Direction::Reverse,
            Direction::Forward,
            Direction::Reverse,
        ]
    );
}

#[test]
fn state_after_n_ticks_depends_on_parity() {
    for n in 0..9 {
        let mut generation = Generation::Ping;
        for _ in 0..n {
            let (_, next) = plan_tick(generation);
            generation = next;
        }
        let expected = if n % 2 == 0 {
            Generation::Ping
        } else {
            Generation::Pong
        };
        assert_eq!(generation, expected, "after {n} ticks");
    }
}

#[test]
fn relaxation_runs_red_strictly_before_black() {
    let phases = relax_phases();
    assert_eq!(phases.len(), 2, "exactly two sub-dispatches per invocation");
    assert_eq!(phases[0], RelaxPhase::Red);
    assert_eq!(phases[1], RelaxPhase::Black);
    assert_eq!(phases[0].flag(), 1);
    assert_eq!(phases[1].flag(), 0);
}

#[test]
fn tick_issues_fixed_submission_count() {
    let (plan, _) = plan_tick(Generation::Ping);
    assert_eq!(plan.relax_invocations, RELAX_ITERATIONS);
    assert_eq!(RELAX_ITERATIONS, 10);
    // Relaxation invocations plus one advection plus one texture write.
    assert_eq!(SUBMISSIONS_PER_TICK, RELAX_ITERATIONS + 2);
    assert_eq!(SUBMISSIONS_PER_TICK, 12);
}
