use biodivine_lib_trinary_net::clocked::ClockedDynamics;
use biodivine_lib_trinary_net::fixed_points::FixedPointEnumerator;
use biodivine_lib_trinary_net::sampled_scc::SampledSccFinder;
use biodivine_lib_trinary_net::sync_cycles::SyncCycleFinder;
use biodivine_lib_trinary_net::walk_cycles::WalkCycleSampler;
use biodivine_lib_trinary_net::TrinaryNetwork;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

/// The phase-clock partition of the hormone model this tool was built
/// around. Models without these variables can still run modes 0, 1 and 3.
const CLOCK_VARIABLE: &str = "SW";
const BRAIN_VARIABLES: [&str; 4] = ["SW", "CRH", "ACTH", "GR"];

/// The variable whose movement validates cycles in mode 3.
const TRACKED_VARIABLE: &str = "CORT";

/// Per-search budget of materialized states for the sampled analyses.
const STACK_LIMIT: usize = 500_000;
const SCC_SAMPLES: usize = 100_000;
const WALK_SAMPLES: usize = 1_000_000;

fn main() {
    env_logger::init();

    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 3 {
        println!("Usage: trinary-dynamics <input> <output> [mode]");
        println!();
        println!("Example: trinary-dynamics input.txt output.txt");
        println!("         This reads a model from input.txt and writes its steady states to output.txt");
        println!();
        println!("Modes: 0 steady states (default), 1 synchronous cycles,");
        println!("       2 sampled clocked components, 3 random-walk cycles,");
        println!("       4 GraphViz export of saved states (needs a state file argument)");
        return;
    }
    let mode: i32 = match args.get(3) {
        None => 0,
        Some(raw) => raw.parse().unwrap_or(-1),
    };

    let start = Instant::now();
    let model = TrinaryNetwork::try_from_file(args[1].as_str()).unwrap_or_else(|e| {
        eprintln!("Failed to load model {}: {}", args[1], e);
        std::process::exit(1);
    });
    info!(
        "loaded model with {} variables from {}",
        model.num_vars(),
        args[1]
    );

    let out_file = File::create(args[2].as_str()).unwrap_or_else(|e| {
        eprintln!("Failed to open output {}: {}", args[2], e);
        std::process::exit(1);
    });
    let mut out = BufWriter::new(out_file);
    let mut random = StdRng::from_entropy();

    let result = match mode {
        0 => {
            println!("You chose option 0: Finding all steady states");
            FixedPointEnumerator::new(&model)
                .enumerate(&mut out)
                .map(|count| println!("Count: {}", count))
        }
        1 => {
            println!("You chose option 1: Synchronous cycles from every starting state");
            SyncCycleFinder::new(&model)
                .find_cycles(&mut out)
                .map(|count| println!("Cycles: {}", count))
        }
        2 => {
            println!("You chose option 2: Sampled Tarjan components of the clocked dynamics");
            let clocked = make_clocked(&model);
            let mut finder = SampledSccFinder::new(clocked, STACK_LIMIT);
            for i in 0..SCC_SAMPLES {
                if i % 1_000 == 0 {
                    info!("starting iteration {}", i);
                }
                finder.sample(&mut random);
            }
            println!("Components: {}", finder.num_components());
            finder.write_report(&mut out)
        }
        3 => {
            println!("You chose option 3: Random walks recording asynchronous cycles");
            let tracked = model.find_variable(TRACKED_VARIABLE).unwrap_or_else(|| {
                eprintln!("Model has no `{}` variable to track.", TRACKED_VARIABLE);
                std::process::exit(1);
            });
            let mut sampler = WalkCycleSampler::new(&model, tracked, STACK_LIMIT);
            for i in 0..WALK_SAMPLES {
                if i % 1_000 == 0 {
                    info!("starting iteration {}", i);
                }
                sampler.iterate(&mut random);
            }
            println!("Total found: {}", sampler.num_cycles());
            sampler.write_report(&mut out)
        }
        4 => {
            if args.len() < 5 {
                println!("Option 4 requires another argument: the saved state file");
                std::process::exit(1);
            }
            println!("You chose option 4: Converting saved states into a GraphViz digraph");
            let clocked = make_clocked(&model);
            let saved = std::fs::read_to_string(args[4].as_str()).unwrap_or_else(|e| {
                eprintln!("Failed to read states {}: {}", args[4], e);
                std::process::exit(1);
            });
            let mut states = Vec::new();
            for line in saved.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match model.parse_state(line) {
                    Ok(state) => states.push(state),
                    // Saved analysis outputs interleave states with counts
                    // and headers; everything else is simply not a state.
                    Err(e) => debug!("skipping line `{}`: {}", line, e),
                }
            }
            println!("States: {}", states.len());
            model.write_clocked_dot(&clocked, &states, &mut out)
        }
        _ => {
            println!("You chose an option that doesn't exist: {}", args[3]);
            std::process::exit(1);
        }
    };
    result.unwrap_or_else(|e| {
        eprintln!("I/O error while writing output: {}", e);
        std::process::exit(1);
    });

    let seconds = start.elapsed().as_secs_f64();
    writeln!(out, "# Seconds: {}", seconds).unwrap_or_else(|e| {
        eprintln!("I/O error while writing output: {}", e);
        std::process::exit(1);
    });
    println!("Done. Total seconds: {}", seconds);
}

/// Resolve the clocked partition, exiting with a clear message when the
/// model does not carry the expected variables.
fn make_clocked(model: &TrinaryNetwork) -> ClockedDynamics {
    // Only the brain variables actually present in the model participate.
    let brain: Vec<&str> = BRAIN_VARIABLES
        .iter()
        .copied()
        .filter(|name| model.find_variable(name).is_some())
        .collect();
    ClockedDynamics::new(model, CLOCK_VARIABLE, &brain).unwrap_or_else(|e| {
        eprintln!("Cannot build the clocked dynamics: {}", e);
        std::process::exit(1);
    })
}
