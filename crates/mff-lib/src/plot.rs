use crate::signal::ForceSeries;

/// `[sample index, force]` pairs for the plotting front-ends. The x-axis is
/// sample index, matching what the landmark picks are measured in.
pub fn series_points(series: &ForceSeries) -> Vec<[f64; 2]> {
    series
        .data
        .iter()
        .enumerate()
        .map(|(i, value)| [i as f64, *value])
        .collect()
}

/// Thin a point list down for drawing without reallocating per frame.
pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}
