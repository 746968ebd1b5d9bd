//! CVA Core Simulation.
//!
//! Walks the pipeline end to end: curve math on a single trade, averaging
//! simulation paths, order independence of the trade aggregate, float vs
//! decimal totals, and a parallel portfolio run.

use cva_core::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("CVA Core Simulation");
    println!("Curve transform, path averaging, trade and counterparty aggregation\n");

    let curve = sample_curve();

    scenario_1_single_trade(&curve);
    scenario_2_path_averaging();
    scenario_3_order_independence(&curve);
    scenario_4_float_vs_decimal();
    scenario_5_portfolio_run(&curve);

    println!("\nAll simulations completed successfully.");
}

fn sample_curve() -> CdsCurve {
    CdsCurve::new(
        0.4,
        vec![0.0079, 0.0111, 0.0128, 0.0137, 0.0148, 0.016, 0.0174, 0.0194, 0.0192, 0.0195, 0.0176],
        vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0, 30.0],
    )
    .expect("sample curve is well formed")
}

fn sample_profile(trade: &str, curve: &str, counterparty: &str, scale: f64) -> ExposureProfile {
    ExposureProfile {
        trade_id: TradeId::new(trade),
        curve_name: CurveName::new(curve),
        counterparty: CounterpartyId::new(counterparty),
        exposures: [1.8666573769E7, 2050721.175, 1389901.315, 476799.798]
            .iter()
            .map(|e| e * scale)
            .collect(),
        leg_fractions: vec![0.0597826093, 0.307065219, 0.554347813, 0.809782624],
        discount_factors: vec![0.999752, 0.997813523, 0.994621098, 0.991563857],
    }
}

/// Curve math for one trade, leg by leg.
fn scenario_1_single_trade(curve: &CdsCurve) {
    println!("Scenario 1: Single Trade Transform\n");

    let profile = sample_profile("t1", "c1", "cp1", 1.0);
    let result = apply_curve(curve, &profile).expect("sample profile prices");

    for i in 0..result.leg_count() {
        println!(
            "  leg {} t={:.4} spread={:.4} hazard={:.6} pd={:.6} cva={:.2}",
            i,
            profile.leg_fractions[i],
            result.spread_rates[i],
            result.hazard_rates[i],
            result.default_prob[i],
            result.cva_exposure_by_leg[i]
        );
    }
    println!("  Total CVA: {:.2}\n", result.cva);
}

/// Two simulation paths averaged into one profile.
fn scenario_2_path_averaging() {
    println!("Scenario 2: Path Averaging\n");

    let paths = [
        sample_profile("t1", "c1", "cp1", 1.02),
        sample_profile("t1", "c2", "cp1", 0.98),
    ];
    let averager: ExposureAverager = fold(paths.iter());
    if let Some(avg) = averager.export_finish() {
        println!("  Paths averaged: {}", averager.count());
        println!("  Leg 0 exposure: {:.2}", avg.exposures[0]);
        println!("  Curve name blanked: {}\n", avg.curve_name.is_blank());
    }
}

/// Same results in either order give the same trade aggregate.
fn scenario_3_order_independence(curve: &CdsCurve) {
    println!("Scenario 3: Trade Aggregate Order Independence\n");

    let a = apply_curve(curve, &sample_profile("t1", "c1", "cp1", 1.0)).expect("prices");
    let b = apply_curve(curve, &sample_profile("t1", "c2", "cp1", 1.1)).expect("prices");

    let forward: TradeExposureAggregator = fold([a.clone(), b.clone()].iter());
    let reverse: TradeExposureAggregator = fold([b, a].iter());

    let f = forward.export_finish();
    let r = reverse.export_finish();
    if let Some((cp, result)) = &f {
        println!("  Counterparty {}: average CVA {:.2} from curve {}", cp, result.cva, result.curve_name);
    }
    println!("  Forward == reverse: {}\n", f == r);
}

/// Float sums drift with order, decimal sums do not.
fn scenario_4_float_vs_decimal() {
    println!("Scenario 4: Float vs Decimal Totals\n");

    let cvas: Vec<f64> = (0..100).map(|i| 10_000.0 + (i as f64 * 0.7071067811865476).sin() * 900.0).collect();

    let mut up = FloatSum::default();
    cvas.iter().for_each(|c| up.add(*c));
    let mut down = FloatSum::default();
    cvas.iter().rev().for_each(|c| down.add(*c));

    let mut up_dec = DecimalSum::default();
    cvas.iter().for_each(|c| up_dec.add(*c));
    let mut down_dec = DecimalSum::default();
    cvas.iter().rev().for_each(|c| down_dec.add(*c));

    println!("  f64 forward {} reverse {} equal: {}", up.value(), down.value(), up == down);
    println!("  decimal forward {} reverse {} equal: {}\n", up_dec.total(), down_dec.total(), up_dec == down_dec);
}

/// A small portfolio through the full pipeline, with one bad item.
fn scenario_5_portfolio_run(curve: &CdsCurve) {
    println!("Scenario 5: Portfolio Run\n");

    let mut curves = CurveBook::new();
    for cp in ["cp1", "cp2", "cp3"] {
        curves
            .insert(CounterpartyId::new(cp), curve.clone())
            .expect("sample curve is well formed");
    }

    let mut samples = Vec::new();
    for trade in 0..200 {
        let cp = ["cp1", "cp2", "cp3"][trade % 3];
        for path in 0..20 {
            let scale = 0.5 + ((trade * 31 + path * 7) % 100) as f64 / 100.0;
            samples.push(sample_profile(&format!("t{trade}"), &format!("c{path}"), cp, scale));
        }
    }
    samples.push(sample_profile("orphan", "c0", "unknown", 1.0));

    let pipeline = match CvaPipeline::new(CvaConfig::audit()) {
        Ok(p) => p,
        Err(e) => {
            println!("  Pipeline setup failed: {e}");
            return;
        }
    };

    match pipeline.run(&samples, &curves) {
        Ok(report) => {
            println!("  Samples: {}, profiles priced: {}", samples.len(), report.profiles_priced);
            for (cp, total) in &report.counterparties {
                println!("  {}: {} trades, CVA {:.2}", cp, total.trades, total.cva);
            }
            if let Some((trade, cva)) = &report.largest_trade {
                println!("  Largest trade: {} at {:.2}", trade, cva);
            }
            for item in &report.rejected {
                println!("  Rejected {}: {}", item.trade_id, item.reason);
            }
        }
        Err(e) => println!("  Run failed: {e}"),
    }
}
