//! Trailing moving average.

/// Rounds `sum / n` half up, matching the dashboard's display rounding.
const fn round_div(sum: u64, n: u64) -> u64 {
    (2 * sum + n) / (2 * n)
}

/// Causal moving average over `values`, same length as the input.
///
/// Output `i` is the rounded mean of `values[i + 1 - window_size ..= i]`.
/// Near the start, where fewer than `window_size` values exist, the sum
/// covers only the available values but the divisor stays `window_size`,
/// so the leading edge reads low. A `window_size` of zero returns the
/// input unchanged.
#[must_use]
pub fn smooth(values: &[u64], window_size: usize) -> Vec<u64> {
    if window_size == 0 {
        return values.to_vec();
    }
    let divisor = u64::try_from(window_size).unwrap_or(u64::MAX);

    let mut sum = 0u64;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            sum += v;
            if i >= window_size {
                sum -= values[i - window_size];
            }
            round_div(sum, divisor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_edge_divides_by_full_window() {
        let out = smooth(&[10, 20, 30, 40, 50, 60, 70], 7);
        assert_eq!(out[0], 1, "round(10 / 7)");
        assert_eq!(out[1], 4, "round(30 / 7)");
        assert_eq!(out[6], 40, "round(280 / 7)");
    }

    #[test]
    fn trailing_window_slides() {
        let out = smooth(&[7, 7, 7, 7, 7, 7, 7, 14, 0], 7);
        assert_eq!(out[6], 7);
        assert_eq!(out[7], 8, "round(56 / 7)");
        assert_eq!(out[8], 7, "round(49 / 7)");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(smooth(&[1], 2), vec![1], "0.5 rounds up");
        assert_eq!(smooth(&[3, 0], 2), vec![2, 2], "1.5 rounds up");
    }

    #[test]
    fn preserves_length() {
        for len in [0, 1, 6, 7, 30] {
            let values: Vec<u64> = (0..len).collect();
            assert_eq!(smooth(&values, 7).len(), values.len());
        }
    }

    #[test]
    fn zero_window_is_identity() {
        assert_eq!(smooth(&[3, 1, 4], 0), vec![3, 1, 4]);
    }
}
