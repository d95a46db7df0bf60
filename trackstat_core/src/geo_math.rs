//! Great-circle distances and the other vectorised bits of numeric work
//! that are shared by the series builder and the split analyzer.

use geo::{point, HaversineDestination, HaversineDistance};

pub type Lat = f64; // -90..90
pub type Lon = f64; // -180..180

/// Returns the haversine distance, in metres, between two coordinates,
/// using the mean radius of the Earth.
pub fn distance(lat1: Lat, lon1: Lon, lat2: Lat, lon2: Lon) -> f64 {
    // n.b. x=lon, y=lat. If you do it the other way round the
    // distances are wrong - a lot wrong.
    let p1 = point!(x: lon1, y: lat1);
    let p2 = point!(x: lon2, y: lat2);
    p1.haversine_distance(&p2)
}

/// Returns the distance from each coordinate to the one before it. The
/// first coordinate has no predecessor and gets 0 so that running sums
/// start cleanly.
pub fn step_distances(coords: &[(Lat, Lon)]) -> Vec<f64> {
    let mut steps = Vec::with_capacity(coords.len());
    let mut prev: Option<(Lat, Lon)> = None;

    for &(lat, lon) in coords {
        let step = match prev {
            Some((prev_lat, prev_lon)) => distance(prev_lat, prev_lon, lat, lon),
            None => 0.0,
        };
        steps.push(step);
        prev = Some((lat, lon));
    }

    steps
}

/// Running sum of a column.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, v| {
            *total += v;
            Some(*total)
        })
        .collect()
}

/// The point reached by travelling `metres` from a coordinate along
/// `bearing` (degrees clockwise from north).
pub fn destination(lat: Lat, lon: Lon, bearing: f64, metres: f64) -> (Lat, Lon) {
    let p = point!(x: lon, y: lat).haversine_destination(bearing, metres);
    (p.y(), p.x())
}

/// Linear interpolation between `a` and `b`.
pub fn interpolate(a: f64, b: f64, portion: f64) -> f64 {
    a + (b - a) * portion
}

/// Interpolates two optional values, which is only possible if both are there.
pub fn interpolate_opt(a: Option<f64>, b: Option<f64>, portion: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(interpolate(a, b, portion)),
        _ => None,
    }
}

/// Mean of the values that are present. None if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Sample standard deviation (n - 1 denominator) of the values that are
/// present. None with fewer than two values.
pub fn std_dev(values: &[Option<f64>], mean: f64) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return None;
    }

    let sum_sq: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (present.len() - 1) as f64).sqrt())
}

/// The z-score of every present value in a column. Returns all None if
/// the column has no spread, since no value can then be an outlier.
pub fn z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some(mean) = mean(values.iter().copied()) else {
        return vec![None; values.len()];
    };

    match std_dev(values, mean) {
        Some(sd) if sd > 0.0 => values
            .iter()
            .map(|v| v.map(|v| (v - mean) / sd))
            .collect(),
        _ => vec![None; values.len()],
    }
}
