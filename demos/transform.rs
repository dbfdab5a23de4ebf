use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use cnf_rs::distributive::{Limit, Thresholds};
use cnf_rs::formula::Formula;
use cnf_rs::registry::Registry;
use cnf_rs::transform::{TransformKind, DEFAULT_AUX_PREFIX};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Kind {
    Distributive,
    Tseytin,
    Hybrid,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of features.
    #[arg(value_name = "INT", default_value = "200")]
    n: usize,

    /// Transformation kind.
    #[clap(long, value_enum, default_value = "hybrid")]
    kind: Kind,

    /// Maximum number of clauses per distributive expansion (hybrid only).
    #[clap(long, value_name = "INT", default_value = "16")]
    max_clauses: usize,

    /// Maximum clause width of a distributive expansion (hybrid only).
    #[clap(long, value_name = "INT")]
    max_literals: Option<usize>,

    /// Number of cross-tree constraints.
    #[clap(long, value_name = "INT", default_value = "50")]
    cross_tree: usize,

    /// Random seed for the cross-tree constraints.
    #[clap(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Give up after this many seconds.
    #[clap(long, value_name = "SECONDS", default_value = "60")]
    timeout: u64,

    /// Write the resulting CNF in DIMACS format.
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Synthetic feature model: a tree of features with optional, mandatory and
/// alternative groups, plus random cross-tree constraints.
fn feature_model(n: usize, cross_tree: usize, seed: u64) -> cnf_rs::Result<(Formula, Registry)> {
    let mut registry = Registry::new();
    let mut features = Vec::with_capacity(n);
    for i in 0..n {
        let name = if i == 0 { "root".to_string() } else { format!("f{}", i) };
        features.push(Formula::var(registry.add_boolean(name)?));
    }
    let f = |i: usize| features[i].clone();

    let mut constraints = vec![f(0)];

    // Every non-root feature requires its parent, groups of up to 4 children.
    let parent = |i: usize| (i - 1) / 4;
    for i in 1..n {
        constraints.push(Formula::or([Formula::not(f(i)), f(parent(i))]));
    }

    for p in 0..n {
        let children: Vec<usize> = (4 * p + 1..(4 * p + 5).min(n)).collect();
        if children.len() < 2 {
            continue;
        }
        match p % 3 {
            // Alternative group: exactly one child if the parent is selected.
            0 => {
                let at_least_one = Formula::or(children.iter().map(|&c| f(c)));
                let mut at_most_one = Vec::new();
                for (k, &a) in children.iter().enumerate() {
                    for &b in &children[k + 1..] {
                        at_most_one.push(Formula::not(Formula::and([f(a), f(b)])));
                    }
                }
                let exactly_one = Formula::and([at_least_one, Formula::and(at_most_one)]);
                constraints.push(Formula::or([Formula::not(f(p)), exactly_one]));
            }
            // Or group: at least one child if the parent is selected.
            1 => {
                let children = children.iter().map(|&c| f(c));
                constraints.push(Formula::or(std::iter::once(Formula::not(f(p))).chain(children)));
            }
            // Mandatory first child.
            _ => {
                constraints.push(Formula::or([Formula::not(f(p)), f(children[0])]));
            }
        }
    }

    // Cross-tree constraints: (a & b) -> (c | (d & e)), sharing the premises.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut premises: Vec<Formula> = Vec::new();
    for _ in 0..cross_tree {
        let premise = if !premises.is_empty() && rng.random_bool(0.3) {
            premises[rng.random_range(0..premises.len())].clone()
        } else {
            let premise = Formula::and([f(rng.random_range(1..n)), f(rng.random_range(1..n))]);
            premises.push(premise.clone());
            premise
        };
        let conclusion = Formula::or([
            f(rng.random_range(1..n)),
            Formula::and([f(rng.random_range(1..n)), Formula::not(f(rng.random_range(1..n)))]),
        ]);
        constraints.push(Formula::or([Formula::not(premise), conclusion]));
    }

    Ok((Formula::and(constraints), registry))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);
    if args.n < 2 {
        return Err(color_eyre::eyre::eyre!("need at least 2 features, got {}", args.n));
    }

    let kind = match args.kind {
        Kind::Distributive => TransformKind::Distributive,
        Kind::Tseytin => TransformKind::Tseytin,
        Kind::Hybrid => TransformKind::Hybrid(Thresholds::new(
            Limit::Count(args.max_clauses),
            Limit::from(args.max_literals),
        )),
    };
    println!("kind = {}", kind);

    // Formulas are not `Send`, so the model is built on the worker thread.
    // If the timeout expires, the worker is abandoned.
    let (tx, rx) = mpsc::channel();
    let (n, cross_tree, seed) = (args.n, args.cross_tree, args.seed);
    thread::spawn(move || {
        let result = feature_model(n, cross_tree, seed).and_then(|(formula, registry)| {
            println!(
                "Feature model: {} variables, {} constraints, {} distinct nodes",
                registry.len(),
                formula.conjuncts().map_or(0, |c| c.len()),
                formula.size()
            );
            kind.transform(&formula, &registry)
        });
        let _ = tx.send(result);
    });

    let result = match rx.recv_timeout(Duration::from_secs(args.timeout)) {
        Ok(result) => result?,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            println!("Timeout after {} s", args.timeout);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let cnf = &result.cnf;
    println!("cnf: {} variables, {} clauses", cnf.num_vars(), cnf.num_clauses());
    println!("auxiliary variables: {}", cnf.aux_variables(DEFAULT_AUX_PREFIX).len());
    println!("stats: {}", result.stats);

    if let Some(path) = &args.output {
        cnf.save(path)?;
        println!("Written DIMACS to {}", path.display());
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
