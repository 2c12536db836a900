/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for evaluation grids, CSV I/O, and scaling utilities.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    error::{RbfError, Result},
    nodes::NodeSet,
};
use csv::{ReaderBuilder, Writer};
use faer::{Mat, MatRef};
use std::fs::File;
use std::path::Path;

/// Create a regular evaluation grid from per-dimension ranges and sample counts.
///
/// # Arguments
/// * `ranges` - Inclusive `(min, max)` range for each dimension.
/// * `counts` - Number of grid samples per range; must match `ranges.len()`.
///
/// # Returns
/// A [`NodeSet`] with one node per grid point. The first dimension varies fastest.
pub fn create_evaluation_grid(ranges: &[(f64, f64)], counts: &[usize]) -> Result<NodeSet> {
    if ranges.len() != counts.len() {
        return Err(RbfError::DimensionMismatch {
            expected: ranges.len(),
            found: counts.len(),
        });
    }
    if counts.iter().any(|&c| c == 0) {
        return Err(RbfError::InvalidArgument(
            "every grid dimension needs at least one sample".to_string(),
        ));
    }

    let total_points: usize = counts.iter().product();
    let num_dimensions = ranges.len();

    NodeSet::new(Mat::from_fn(total_points, num_dimensions, |row_idx, col_idx| {
        let dim_points = counts[col_idx];
        let (start, end) = ranges[col_idx];

        if dim_points == 1 {
            return start;
        }
        let step = (end - start) / (dim_points as f64 - 1.0);

        let stride = counts[..col_idx].iter().product::<usize>();
        let index_in_dim = (row_idx / stride) % dim_points;
        start + step * index_in_dim as f64
    }))
}

/// Load a CSV file into a node set and a value vector.
///
/// The last column is treated as the scalar value, and all preceding
/// columns form the point coordinates.
///
/// # Arguments
/// * `file_path` - Path to the CSV file.
/// * `has_headers` - Whether the file has a single header row to skip.
pub fn csv_to_nodeset<P: AsRef<Path>>(
    file_path: P,
    has_headers: bool,
) -> Result<(NodeSet, Vec<f64>)> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(file);

    let mut data = Vec::new();
    let mut last_column = Vec::new();
    let mut num_rows = 0;
    let mut num_cols = 0;

    for result in reader.records() {
        let record = result?;
        if num_cols == 0 {
            num_cols = record.len();
            if num_cols < 2 {
                return Err(RbfError::InvalidArgument(
                    "CSV needs at least one coordinate column and one value column".to_string(),
                ));
            }
        } else if record.len() != num_cols {
            return Err(RbfError::DimensionMismatch {
                expected: num_cols,
                found: record.len(),
            });
        }

        // Extract values, separating the last column
        for (i, value) in record.iter().enumerate() {
            let parsed_value: f64 = value.trim().parse()?;
            if i == num_cols - 1 {
                last_column.push(parsed_value);
            } else {
                data.push(parsed_value);
            }
        }

        num_rows += 1;
    }

    if num_rows == 0 {
        return Err(RbfError::InvalidArgument("CSV contains no records".to_string()));
    }

    let points = MatRef::from_row_major_slice(data.as_slice(), num_rows, num_cols - 1).to_owned();

    Ok((NodeSet::new(points)?, last_column))
}

/// Write node coordinates and associated values to a CSV file.
///
/// Headers are `X1, .., Xd, Value`.
pub fn nodeset_to_csv<P: AsRef<Path>>(nodes: &NodeSet, values: &[f64], file_path: P) -> Result<()> {
    if nodes.len() != values.len() {
        return Err(RbfError::DimensionMismatch {
            expected: nodes.len(),
            found: values.len(),
        });
    }

    let mut wtr = Writer::from_path(file_path)?;

    let mut headers: Vec<String> = (1..=nodes.dim()).map(|d| format!("X{d}")).collect();
    headers.push("Value".to_string());
    wtr.write_record(&headers)?;

    for (point, value) in nodes.iter().zip(values) {
        let mut record: Vec<String> = point.iter().map(|c| c.to_string()).collect();
        record.push(value.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Compute translation and scale factors to map points into a Chebyshev cube.
///
/// The translation is the midpoint of each coordinate range and the scale
/// is half the range, with zeros replaced by `1.0` to avoid division by zero.
///
/// # Arguments
/// * `point_locations` - Matrix of point coordinates (rows are points).
///
/// # Returns
/// A tuple `(translation, scale)` where each is a per-dimension factor.
pub fn get_cheb_cube_scaling_factors(point_locations: MatRef<f64>) -> (Vec<f64>, Vec<f64>) {
    let dimensions = point_locations.ncols();
    let extents = meshfree_rbf_utils::get_pointarray_extents(point_locations);

    if extents.is_empty() {
        return (vec![0.0; dimensions], vec![1.0; dimensions]);
    }

    (0..dimensions)
        .map(|d| {
            let (min_coord, max_coord) = (extents[d], extents[d + dimensions]);
            let width = max_coord - min_coord;
            let scale = if width == 0.0 { 1.0 } else { width / 2.0 };
            ((max_coord + min_coord) / 2.0, scale)
        })
        .unzip()
}

/// Apply translation and scaling to map points into a normalized cube.
///
/// For each coordinate `x`, applies `(x - translation_factor[d]) / scale_factor[d]`.
pub fn scale_points(points: &mut Mat<f64>, translation_factor: &[f64], scale_factor: &[f64]) {
    points.row_iter_mut().for_each(|row| {
        row.iter_mut()
            .enumerate()
            .for_each(|(col_idx, element)| {
                *element = (*element - translation_factor[col_idx]) / scale_factor[col_idx];
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("meshfree_rbf_{}_{name}", std::process::id()))
    }

    #[test]
    fn evaluation_grid_layout() {
        let grid = create_evaluation_grid(&[(0.0, 1.0), (10.0, 20.0)], &[3, 2]).unwrap();
        let expected = mat![
            [0.0, 10.0],
            [0.5, 10.0],
            [1.0, 10.0],
            [0.0, 20.0],
            [0.5, 20.0],
            [1.0, 20.0],
        ];

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * (6 as f64));
        assert!(&grid.to_mat() ~ &expected);

        assert!(create_evaluation_grid(&[(0.0, 1.0)], &[3, 2]).is_err());
        assert!(create_evaluation_grid(&[(0.0, 1.0)], &[0]).is_err());
    }

    #[test]
    fn scaling_maps_extents_to_unit_cube() {
        let points = mat![[0.0, 5.0, 1.0], [4.0, 7.0, 1.0], [2.0, 6.0, 1.0]];
        let (translation, scale) = get_cheb_cube_scaling_factors(points.as_ref());
        assert!(translation == vec![2.0, 6.0, 1.0]);
        assert!(scale == vec![2.0, 1.0, 1.0]);

        let mut scaled = points.clone();
        scale_points(&mut scaled, &translation, &scale);
        let expected = mat![[-1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        assert!(scaled == expected);
    }

    #[test]
    fn csv_round_trip() {
        let path = temp_path("round_trip.csv");
        let nodes = NodeSet::from_rows(&[[0.0, 1.5], [2.25, -3.0]]).unwrap();
        let values = vec![0.125, 7.0];

        nodeset_to_csv(&nodes, &values, &path).unwrap();
        let (restored, restored_values) = csv_to_nodeset(&path, true).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(restored == nodes);
        assert!(restored_values == values);
    }

    #[test]
    fn csv_rejects_ragged_rows() {
        let path = temp_path("ragged.csv");
        std::fs::write(&path, "1.0,2.0,3.0\n4.0,5.0\n").unwrap();
        let result = csv_to_nodeset(&path, false);
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn csv_length_mismatch_is_rejected() {
        let nodes = NodeSet::from_scalars(&[0.0, 1.0]).unwrap();
        assert!(matches!(
            nodeset_to_csv(&nodes, &[1.0], temp_path("unused.csv")),
            Err(RbfError::DimensionMismatch { expected: 2, found: 1 })
        ));
    }
}
