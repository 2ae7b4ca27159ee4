use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

use formation_calc::sweep::{AngleSweep, RatioRow, SweepSummary};
use polars::prelude::*;

/// Long-format table of the angle sweep: one row per (alpha, aircraft).
pub fn angle_sweep_frame(sweep: &AngleSweep) -> Result<DataFrame, Box<dyn Error>> {
    let capacity = sweep.alphas_deg.len() * (sweep.aircraft_count() + 1);
    let mut alpha = Vec::with_capacity(capacity);
    let mut aircraft = Vec::with_capacity(capacity);
    let mut cl = Vec::with_capacity(capacity);
    let mut cdi = Vec::with_capacity(capacity);
    let mut efficiency = Vec::with_capacity(capacity);
    let mut gain = Vec::with_capacity(capacity);

    for (j, &a) in sweep.alphas_deg.iter().enumerate() {
        let isolated = sweep.isolated[j];
        alpha.push(a);
        aircraft.push("isolated".to_string());
        cl.push(isolated.lift);
        cdi.push(isolated.induced_drag);
        efficiency.push(isolated.efficiency()?);
        gain.push(0.0);

        for (i, series) in sweep.formation.iter().enumerate() {
            let point = series[j];
            alpha.push(a);
            aircraft.push(format!("aircraft {}", i + 1));
            cl.push(point.lift);
            cdi.push(point.induced_drag);
            efficiency.push(point.efficiency()?);
            gain.push(point.efficiency_gain_pct(&isolated)?);
        }
    }

    let df = df!(
        "alpha_deg" => alpha,
        "aircraft" => aircraft,
        "cl" => cl,
        "cdi" => cdi,
        "efficiency" => efficiency,
        "efficiency_gain_pct" => gain
    )?;
    Ok(df)
}

/// Mean efficiency gain of each formation aircraft over the whole sweep.
pub fn mean_gain_by_aircraft(frame: &DataFrame) -> PolarsResult<DataFrame> {
    frame
        .clone()
        .lazy()
        .filter(col("aircraft").neq(lit("isolated")))
        .groupby([col("aircraft")])
        .agg([
            col("efficiency_gain_pct").mean().alias("mean_gain_pct"),
            col("efficiency_gain_pct").max().alias("max_gain_pct"),
        ])
        .sort("aircraft", SortOptions::default())
        .collect()
}

pub fn ratio_frame(rows: &[RatioRow]) -> PolarsResult<DataFrame> {
    df!(
        "aspect_ratio" => rows.iter().map(|r| r.aspect_ratio).collect::<Vec<_>>(),
        "induced_angle_deg" => rows.iter().map(|r| r.induced_angle_deg).collect::<Vec<_>>(),
        "kind" => rows.iter().map(|r| r.kind.label().to_string()).collect::<Vec<_>>(),
        "ratio" => rows.iter().map(|r| r.ratio).collect::<Vec<_>>()
    )
}

/// Mean formation/solo ratio per coefficient and induced angle.
pub fn mean_ratio_by_kind(frame: &DataFrame) -> PolarsResult<DataFrame> {
    frame
        .clone()
        .lazy()
        .groupby([col("induced_angle_deg"), col("kind")])
        .agg([col("ratio").mean().alias("mean_ratio")])
        .sort("induced_angle_deg", SortOptions::default())
        .collect()
}

pub fn print_summary(summary: &SweepSummary) {
    println!("\n=== Results at alpha = {:.1} deg ===", summary.alpha_deg);
    println!(
        "Isolated: CL = {:.4}, CDi = {:.4}, efficiency = {:.4}",
        summary.isolated.lift, summary.isolated.induced_drag, summary.isolated_efficiency
    );
    for aircraft in &summary.aircraft {
        println!(
            "Aircraft {}: CL = {:.4}, CDi = {:.4}, efficiency = {:.4}",
            aircraft.index + 1,
            aircraft.point.lift,
            aircraft.point.induced_drag,
            aircraft.efficiency
        );
        println!("  efficiency gain: {:.2}%", aircraft.efficiency_gain_pct);
    }
}

pub fn write_csv(frame: &mut DataFrame, dir: &Path, name: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).has_header(true).finish(frame)?;
    tracing::info!(path = %path.display(), rows = frame.height(), "wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formation_calc::metrics::AeroPoint;
    use formation_calc::sweep::CoefficientKind;

    fn sweep() -> AngleSweep {
        AngleSweep {
            alphas_deg: vec![4.0, 5.0],
            isolated: vec![AeroPoint::new(0.6, 0.012), AeroPoint::new(0.75, 0.018)],
            formation: vec![
                vec![AeroPoint::new(0.6, 0.012), AeroPoint::new(0.75, 0.018)],
                vec![AeroPoint::new(0.55, 0.01), AeroPoint::new(0.7, 0.015)],
            ],
            relaxation: Vec::new(),
        }
    }

    #[test]
    fn test_angle_sweep_frame() {
        let df = angle_sweep_frame(&sweep()).unwrap();
        assert_eq!(df.shape(), (6, 6));

        let means = mean_gain_by_aircraft(&df).unwrap();
        assert_eq!(means.height(), 2);
    }

    #[test]
    fn test_ratio_frame() {
        let rows = vec![
            RatioRow { aspect_ratio: 4.0, induced_angle_deg: 2.0, kind: CoefficientKind::Lift, ratio: 1.02 },
            RatioRow { aspect_ratio: 6.0, induced_angle_deg: 2.0, kind: CoefficientKind::Lift, ratio: 1.04 },
            RatioRow { aspect_ratio: 4.0, induced_angle_deg: 2.0, kind: CoefficientKind::Drag, ratio: 0.9 },
        ];
        let df = ratio_frame(&rows).unwrap();
        assert_eq!(df.shape(), (3, 4));
        assert_eq!(mean_ratio_by_kind(&df).unwrap().height(), 2);
    }
}
