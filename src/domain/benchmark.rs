//! Published accuracy of the candidate models behind the prediction service.
//!
//! Static reference figures shown beside a result; they do not depend on the
//! record or on the service's answer.

/// Accuracy of one candidate model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBenchmark {
    pub name: &'static str,
    /// Accuracy in percent
    pub accuracy: f64,
}

/// Candidate models, weakest first. The last one serves predictions.
pub const MODEL_BENCHMARKS: [ModelBenchmark; 3] = [
    ModelBenchmark {
        name: "Logistic Regression",
        accuracy: 76.3,
    },
    ModelBenchmark {
        name: "Random Forest",
        accuracy: 82.7,
    },
    ModelBenchmark {
        name: "Neural Network",
        accuracy: 87.4,
    },
];

/// Confidence quoted for the serving model.
pub const MODEL_CONFIDENCE: f64 = MODEL_BENCHMARKS[MODEL_BENCHMARKS.len() - 1].accuracy;

/// Best accuracy among `benchmarks`, or `0.0` when empty.
#[must_use]
pub fn max_accuracy(benchmarks: &[ModelBenchmark]) -> f64 {
    benchmarks
        .iter()
        .map(|b| b.accuracy)
        .fold(0.0, f64::max)
}

/// Bar length in `[0, 1]`, relative to the best model in `benchmarks`.
#[must_use]
pub fn relative_bar(benchmark: &ModelBenchmark, benchmarks: &[ModelBenchmark]) -> f64 {
    let max = max_accuracy(benchmarks);
    if max <= 0.0 {
        return 0.0;
    }
    (benchmark.accuracy / max).clamp(0.0, 1.0)
}
