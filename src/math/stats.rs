//! Summary statistics over trace windows.
//!
//! NaN entries (frames missing from some trials) are skipped, so an
//! all-NaN or empty slice yields NaN rather than a panic.

pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = finite_sum(values);
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let mut n = 0usize;
    let mut ss = 0.0;
    for v in values.iter().filter(|v| !v.is_nan()) {
        let d = v - m;
        ss += d * d;
        n += 1;
    }
    if n < 2 {
        return f64::NAN;
    }
    (ss / (n - 1) as f64).sqrt()
}

pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, v| if acc.is_nan() || v > acc { v } else { acc })
}

pub fn sum(values: &[f64]) -> f64 {
    finite_sum(values).0
}

/// Position of the first maximum; ties resolve to the earliest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn finite_sum(values: &[f64]) -> (f64, usize) {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().filter(|v| !v.is_nan()) {
        sum += v;
        n += 1;
    }
    (sum, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_uses_n_minus_one() {
        let s = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn nan_frames_are_skipped() {
        let v = [1.0, f64::NAN, 3.0];
        assert_eq!(mean(&v), 2.0);
        assert_eq!(max(&v), 3.0);
        assert_eq!(sum(&v), 4.0);
    }

    #[test]
    fn argmax_prefers_first_tie() {
        assert_eq!(argmax(&[1.0, 5.0, 5.0, 2.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN, f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }
}
