use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use strips_planner::pddl::{read_domain, read_problem};
use strips_planner::{Plan, Planner, SearchLimits};

/// Solves a PDDL STRIPS problem with depth-first forward search.
#[derive(Debug, Parser)]
#[clap(name = "strips-plan", version)]
pub struct Arguments {
    /// The PDDL domain file.
    #[clap(short, long)]
    domain: PathBuf,

    /// The PDDL problem file.
    #[clap(short, long)]
    problem: PathBuf,

    /// Directory the `<problem>.pddl.plan` file is written to.
    #[clap(short, long, default_value = ".")]
    output: PathBuf,

    /// Log every search step. `RUST_LOG` takes precedence when set.
    #[clap(short, long)]
    verbose: bool,

    /// Stop after expanding this many states.
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Do not expand states deeper than this many steps.
    #[clap(long)]
    max_depth: Option<usize>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if let Err(err) = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
}

/// One `( action arg ... )` line per step.
fn write_plan<W: Write>(mut out: W, plan: &Plan) -> io::Result<()> {
    for step in plan {
        write!(out, "( {}", step.action)?;
        for object in step.arguments() {
            write!(out, " {}", object)?;
        }
        writeln!(out, " )")?;
    }
    Ok(())
}

fn save_plan(dir: &Path, problem: &str, plan: &Plan) -> io::Result<PathBuf> {
    let path = dir.join(format!("{}.pddl.plan", problem));
    let mut file = fs::File::create(&path)?;
    write_plan(&mut file, plan)?;
    Ok(path)
}

fn main() {
    let args = Arguments::parse();
    init_logging(args.verbose);
    info!("{} - v{}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));

    let domain = match read_domain(&args.domain) {
        Ok(domain) => domain,
        Err(err) => {
            error!("{err}");
            process::exit(1);
        },
    };
    let problem = match read_problem(&args.problem) {
        Ok(problem) => problem,
        Err(err) => {
            error!("{err}");
            process::exit(1);
        },
    };
    debug!("Loaded {:?} and problem {} with {} objects.", domain, problem.name, problem.objects.len());

    let mut limits = SearchLimits::unlimited();
    if let Some(max) = args.max_expansions {
        limits = limits.max_expansions(max);
    }
    if let Some(max) = args.max_depth {
        limits = limits.max_depth(max);
    }
    let planner = match Planner::new(&domain, &problem) {
        Ok(planner) => planner.with_limits(limits),
        Err(err) => {
            error!("Cannot plan {}: {err}", problem.name);
            process::exit(1);
        },
    };

    let plan = match planner.plan() {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            println!("No plan found.");
            return;
        },
        Err(err) => {
            error!("Search failed: {err}");
            process::exit(1);
        },
    };

    for step in &plan {
        println!("{}", step);
    }
    match save_plan(&args.output, &problem.name, &plan) {
        Ok(path) => info!("Plan written to '{}'.", path.display()),
        Err(err) => {
            error!("Failed to write plan file in '{}': {err}", args.output.display());
            process::exit(1);
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use indexmap::IndexMap;
    use strips_planner::Step;

    use super::{save_plan, write_plan, Arguments};

    fn step(action: &str, objects: &[(&str, &str)]) -> Step {
        let binding: IndexMap<String, String> = objects.iter().map(|(p, o)| (p.to_string(), o.to_string())).collect();
        Step::new(action, binding)
    }

    #[test]
    fn test_plan_file_format() {
        let plan = vec![step("move", &[("from", "n1"), ("to", "n2")]), step("noop", &[])];
        let mut out = Vec::new();
        write_plan(&mut out, &plan).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "( move n1 n2 )\n( noop )\n");
    }

    #[test]
    fn test_save_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_plan(dir.path(), "triangle", &vec![step("move", &[("from", "n1"), ("to", "n2")])]).unwrap();
        assert_eq!(path, dir.path().join("triangle.pddl.plan"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "( move n1 n2 )\n");
    }

    #[test]
    fn test_arguments() {
        let args = Arguments::try_parse_from(["strips-plan", "-d", "d.pddl", "-p", "p.pddl", "--max-depth", "4"]).unwrap();
        assert_eq!(args.output, std::path::PathBuf::from("."));
        assert_eq!(args.max_depth, Some(4));
        assert_eq!(args.max_expansions, None);
        assert!(!args.verbose);
        assert!(Arguments::try_parse_from(["strips-plan", "-d", "d.pddl"]).is_err());
    }
}
