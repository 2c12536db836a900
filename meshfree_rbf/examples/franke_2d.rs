use meshfree_rbf::{
    InterpolationSettings, Interpolation, create_evaluation_grid, generators, nodeset_to_csv,
};
use meshfree_rbf_utils::kernels::ThinPlateSplineKernel;

/// Franke's bivariate test function on `[0, 1]^2`.
fn franke(x: f64, y: f64) -> f64 {
    let term1 = 0.75 * (-((9.0 * x - 2.0).powi(2) + (9.0 * y - 2.0).powi(2)) / 4.0).exp();
    let term2 = 0.75 * (-(9.0 * x + 1.0).powi(2) / 49.0 - (9.0 * y + 1.0) / 10.0).exp();
    let term3 = 0.5 * (-((9.0 * x - 7.0).powi(2) + (9.0 * y - 3.0).powi(2)) / 4.0).exp();
    let term4 = -0.2 * (-(9.0 * x - 4.0).powi(2) - (9.0 * y - 7.0).powi(2)).exp();
    term1 + term2 + term3 + term4
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Random nodes in [0, 1]^2
    let nodes = generators::random_in_hypercube(200, 2, 0.0, 1.0, Some(42))?;
    let values: Vec<f64> = nodes.iter().map(|x| franke(x[0], x[1])).collect();

    // Thin-plate spline with its natural linear polynomial part
    let kernel = ThinPlateSplineKernel::new(2)?;
    let settings = InterpolationSettings::builder().build()?;
    let itp = Interpolation::builder(nodes, values, kernel)
        .settings(settings)
        .build()?;

    // Evaluate on a 50 x 50 grid and report the error
    let grid = create_evaluation_grid(&[(0.0, 1.0), (0.0, 1.0)], &[50, 50])?;
    let fitted = itp.evaluate(&grid)?;
    let max_error = grid
        .iter()
        .zip(&fitted)
        .map(|(x, s)| (franke(x[0], x[1]) - s).abs())
        .fold(0.0_f64, f64::max);

    println!(
        "{} nodes, polynomial order {}, separation distance {:.4e}, max grid error {:.3e}",
        itp.nodeset().len(),
        itp.order(),
        itp.nodeset().separation_distance(),
        max_error
    );

    nodeset_to_csv(&grid, &fitted, std::env::temp_dir().join("franke_2d.csv"))?;

    Ok(())
}
