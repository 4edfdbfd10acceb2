// Greedy best-first search over bicycle-model motion primitives.
//
// Usage: primitive_search [CONFIG.yaml]
// Verbosity follows RUST_LOG (default: info).
use std::io::Write;
use std::path::Path as FsPath;
use std::process;

use log::{error, info};

use primitive_search::planning::{
    GoalRegion, GoalSpecification, Interval, Node, PrimitiveLibrary, SearchOutcome,
};
use primitive_search::{Path, PlannerConfig, Point2D, SearchResult, State};

const CORRIDOR_HALF_WIDTH: f64 = 10.0; // [m]

fn load_config() -> SearchResult<PlannerConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            PlannerConfig::from_file(FsPath::new(&path))
        }
        None => Ok(PlannerConfig::default()),
    }
}

fn run() -> SearchResult<()> {
    let config = load_config()?;

    let initial = State::new(0.0, 0.0, 0.0, 4.0, 0);
    let goal = GoalSpecification::unconstrained()
        .with_position(GoalRegion::Circle {
            center: Point2D::new(20.0, 5.0),
            radius: 2.0,
        })
        .with_velocity(Interval::new(2.0, 6.0)?);

    let library = PrimitiveLibrary::generate(&config.primitives)?
        .with_feasibility(|path: &Path| {
            path.states()
                .iter()
                .all(|s| s.position.y.abs() <= CORRIDOR_HALF_WIDTH)
        });
    info!("Primitive library: {} primitives", library.len());

    let heuristic = config.heuristic(goal.clone())?;
    let search = config.build_search(goal, library)?;

    let mut popped = 0usize;
    let mut observer = |_: &Node, _: f64| popped += 1;
    let outcome = search.execute_observed(initial, &mut observer);

    match &outcome {
        SearchOutcome::GoalFound(solution) => {
            info!(
                "Goal found: {} primitives, {} nodes popped, {:.3}s",
                solution.num_primitives(),
                popped,
                solution.stats.elapsed_secs
            );
            let mut node = Node::root(initial);
            for path in solution.paths.iter().skip(1) {
                node = node.child(path.clone());
                let report = heuristic.report(&node);
                let s = node.terminal_state();
                info!(
                    "  t={:3} x={:6.2} y={:6.2} v={:4.1} h={:10.3} {}",
                    s.time_step, s.position.x, s.position.y, s.velocity, report.cost, report.metrics
                );
            }
        }
        SearchOutcome::Exhausted { reason, stats } => {
            info!(
                "No solution ({:?}) after {} expansions",
                reason, stats.nodes_expanded
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
