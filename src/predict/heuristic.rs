use super::Predictor;
use crate::cast_f64;

/// List-scheduling estimate: the sum of completion times when the tasks run back to back.
/// It favors shortest tasks first.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumOfCompletions;

impl Predictor for SumOfCompletions {
    fn predict(&self, durations: &[u64]) -> f64 {
        let total: u64 = durations
            .iter()
            .scan(0, |end, duration| {
                *end += duration;
                Some(*end)
            })
            .sum();
        cast_f64(total)
    }

    fn name(&self) -> &'static str {
        "sum-of-completions"
    }
}
