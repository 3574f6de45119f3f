use impedance_synth::prelude::*;

fn main() -> Result<(), NetworkError> {
    let catalog = Catalog::new(ESeries::E6, 10.0, 10.0e6)?;

    // Check a hand-written network first.
    let expr = Expression::parallel(
        Expression::leaf(220_000.0),
        Expression::series(Expression::leaf(47_000.0), Expression::leaf(100_000.0)),
    );
    println!("{expr} = {:.3} ohm", evaluate(&expr)?);

    let requests = [(147_000.0, 0.01, 2), (88_120.0, 0.001, 3), (88_120.0, 0.001, 1)];
    for (target, tolerance, max_leaves) in requests {
        println!("\ntarget {target} ohm, tolerance {tolerance}, up to {max_leaves} parts");
        match synthesize(target, tolerance, max_leaves, &catalog) {
            Ok(results) => {
                for result in results {
                    println!(
                        "  {:<32} {:>14.3} ohm  rel err {:.3e}",
                        result.to_string(),
                        result.impedance(),
                        result.deviation().relative
                    );
                }
            }
            Err(err) => println!("  {err}"),
        }
    }

    // Reactive parts: inductors at 1 kHz.
    let inductors = Catalog::new(ESeries::E12, 1.0e-6, 1.0e-2)?;
    let alphabet = inductors.impedances(ComponentKind::Inductor, angular_frequency(1.0e3))?;
    let config = SynthesisConfig::new(CScalar::new(0.0, 25.0), Tolerance::Relative(0.005), 2);
    println!("\nj25 ohm from E12 inductors at 1 kHz:");
    match Synthesizer::new(&alphabet, config).run() {
        Ok(outcome) => {
            for result in outcome.results.iter().take(5) {
                println!("  {} -> {}", result.expression(), result.impedance());
            }
            println!(
                "  ({} candidates in {:?})",
                outcome.stats.evaluated, outcome.stats.elapsed
            );
        }
        Err(err) => println!("  {err}"),
    }
    Ok(())
}
