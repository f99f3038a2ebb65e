//! Media query evaluation.
//! Spec: <https://www.w3.org/TR/mediaqueries-4/#mq-features>

use crate::{
    FeatureName, FeatureValue, MediaEnvironment, MediaFeature, MediaQuery, RangeKind,
    ViewportSize,
};

/// Tolerance for an exact `aspect-ratio` comparison.
pub const ASPECT_RATIO_EPSILON: f32 = 0.01;

/// Evaluate a predicate tree against a viewport and its static environment.
///
/// Pure and total: every tree the parser produces yields a boolean.
pub fn evaluate(query: &MediaQuery, viewport: ViewportSize, env: &MediaEnvironment<'_>) -> bool {
    match query {
        MediaQuery::AllMedia => true,
        MediaQuery::Feature(feature) => evaluate_feature(feature, viewport, env),
        MediaQuery::And(left, right) => {
            evaluate(left, viewport, env) && evaluate(right, viewport, env)
        }
        MediaQuery::Or(left, right) => {
            evaluate(left, viewport, env) || evaluate(right, viewport, env)
        }
        MediaQuery::Not(operand) => !evaluate(operand, viewport, env),
    }
}

fn evaluate_feature(
    feature: &MediaFeature,
    viewport: ViewportSize,
    env: &MediaEnvironment<'_>,
) -> bool {
    match (feature.name, &feature.value) {
        (FeatureName::Width, &FeatureValue::Number(value)) => {
            compare_dimension(feature.range, viewport.width, value)
        }
        (FeatureName::Height, &FeatureValue::Number(value)) => {
            compare_dimension(feature.range, viewport.height, value)
        }
        (FeatureName::AspectRatio, &FeatureValue::Number(value)) => {
            compare_ratio(feature.range, viewport.aspect_ratio(), value)
        }
        (FeatureName::Orientation, FeatureValue::Keyword(keyword)) => {
            keyword == viewport.orientation().as_str()
        }
        // Keywords are ASCII case-insensitive; query keywords are already lowercase.
        (name, FeatureValue::Keyword(keyword)) => env
            .static_value(name)
            .is_some_and(|actual| actual.eq_ignore_ascii_case(keyword)),
        (_, FeatureValue::Number(_)) => false,
    }
}

/// Spec: Section 2.4.3 — range context comparison.
fn compare_dimension(range: RangeKind, actual: f32, requested: f32) -> bool {
    match range {
        RangeKind::Min => actual >= requested,
        RangeKind::Max => actual <= requested,
        RangeKind::Exact => (actual - requested).abs() < f32::EPSILON,
    }
}

fn compare_ratio(range: RangeKind, actual: f32, requested: f32) -> bool {
    match range {
        RangeKind::Min => actual >= requested,
        RangeKind::Max => actual <= requested,
        RangeKind::Exact => (actual - requested).abs() < ASPECT_RATIO_EPSILON,
    }
}
