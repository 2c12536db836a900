use meshfree_rbf::{
    HeatEquation, InterpolationSettings, NodeSet, Semidiscretization, SpatialDiscretization,
    generators,
};
use meshfree_rbf_utils::kernels::PolyharmonicSplineKernel;
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // u_t = κ u_xx on [0, 1] with homogeneous Dirichlet data
    let kappa = 0.5;
    let nodes = generators::grid_in_hypercube(21, 1, 0.0, 1.0)?;
    let boundary = NodeSet::from_scalars(&[0.0, 1.0])?;
    let interior = nodes.setdiff(&boundary, 1e-12)?;

    let discretization = SpatialDiscretization::new(interior, boundary, |_, _| 0.0)?;
    let pde = HeatEquation::new(1, kappa, |_, _| 0.0)?;
    let kernel = PolyharmonicSplineKernel::new(1, 3)?;
    let semi = Semidiscretization::new(pde, discretization, kernel, InterpolationSettings::default())?;

    // Explicit Euler on the coefficients
    let mut c = semi.initial_coefficients(|x| (PI * x[0]).sin())?;
    let rhs = semi.ode_function();
    let (dt, steps) = (1e-5, 20_000);
    for step in 0..steps {
        let dc = rhs(&c, step as f64 * dt)?;
        c.iter_mut().zip(&dc).for_each(|(ci, di)| *ci += dt * di);
    }

    let t_end = dt * steps as f64;
    let u = semi.interpolation(&c)?;
    let exact = (-kappa * PI * PI * t_end).exp();
    println!(
        "u(0.5, {t_end}) = {:.6}, exact {:.6}",
        u.evaluate_scalar(0.5)?,
        exact
    );

    Ok(())
}
