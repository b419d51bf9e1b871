//! Simplifies a small building footprint with every registered decider.
//!
//! Usage:
//! ```text
//! cargo run --example footprint                          # all deciders
//! cargo run --example footprint -- minimal               # one decider
//! RUST_LOG=polycontract=debug cargo run --example footprint
//! ```

use polycontract::math::Point2;
use polycontract::simplify::{DeciderRegistry, OrientationSet};
use polycontract::{Polygon, Result, Simplifier, SimplifyConfig};

fn footprint() -> Result<Polygon> {
    Polygon::new(&[
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 20.0),
        Point2::new(8.0, 20.0),
        Point2::new(9.0, 14.0),
        Point2::new(14.0, 14.0),
        Point2::new(14.0, 17.0),
        Point2::new(22.0, 17.0),
        Point2::new(22.0, 6.0),
        Point2::new(18.0, 6.0),
        Point2::new(18.0, 3.0),
        Point2::new(22.0, 3.0),
        Point2::new(22.0, 0.0),
    ])
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for polycontract.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("polycontract=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = DeciderRegistry::default();
    let requested: Vec<String> = std::env::args().skip(1).collect();
    let names: Vec<&str> = if requested.is_empty() {
        registry.names().collect()
    } else {
        requested.iter().map(String::as_str).collect()
    };

    let input = footprint()?;
    println!("input: {} vertices, area {:.2}", input.len(), input.area());

    for name in names {
        let config = SimplifyConfig::default()
            .with_decider(name)
            .with_orientations(OrientationSet::c_oriented(2))
            .with_max_iterations(64);
        let mut simplifier = Simplifier::new(input.clone(), config)?;
        simplifier.run_to_fixed_point()?;

        let stats = simplifier.statistics();
        println!(
            "{name:>28}: {:>2} steps, {:>2} vertices, area {:>7.2} (net {:+.2}), {:?}/step",
            stats.iterations,
            simplifier.polygon().len(),
            simplifier.polygon().area(),
            stats.net_area_change,
            stats.mean_elapsed(),
        );
        for i in 0..simplifier.polygon().len() {
            let report = simplifier.inspect(i)?;
            let best = [&report.positive, &report.negative, &report.pair]
                .into_iter()
                .flatten()
                .chain(report.rotations.iter())
                .filter(|m| m.applicable)
                .map(|m| m.area)
                .fold(f64::INFINITY, f64::min);
            if best.is_finite() {
                println!("    config {i}: smallest remaining move {best:.2}");
            }
        }
        if !simplifier.self_intersections().is_empty() {
            tracing::warn!(decider = name, "result self-intersects");
        }
    }
    Ok(())
}
