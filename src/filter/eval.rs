//! Evaluator for filter trees.

use super::ast::Filter;
use crate::feature::{Context, Feature};

/// Evaluate a filter against a feature, with `ctx` shadowing the feature's
/// own attributes.
pub fn evaluate_filter(filter: &Filter, feature: &Feature, ctx: &Context) -> bool {
    match filter {
        // All stops on the first false, Any and None on the first true.
        // Only Any reports true when it stops early.
        Filter::All(ops) => short_circuit(ops, feature, ctx, false, false),
        Filter::Any(ops) => short_circuit(ops, feature, ctx, true, true),
        Filter::None(ops) => short_circuit(ops, feature, ctx, true, false),

        Filter::Existence { key, exists } => {
            let found = ctx.contains_key(key)
                || feature.props.string_props.contains_key(key)
                || feature.props.numeric_props.contains_key(key);
            *exists == found
        }

        Filter::Equality { key, values } => {
            if let Some(ctx_value) = ctx.get(key) {
                return values.iter().any(|v| v.equals(ctx_value));
            }
            if let Some(s) = feature.props.string_props.get(key)
                && values.iter().any(|v| v.equals_str(s))
            {
                return true;
            }
            // A key may live in both maps; either one matching is enough.
            match feature.props.numeric_props.get(key) {
                Some(n) => values.iter().any(|v| v.equals_number(*n)),
                None => false,
            }
        }

        Filter::Range { key, min, max } => {
            let in_range = |n: f64| n >= *min && n < *max;
            if let Some(ctx_value) = ctx.get(key) {
                // Only numbers can be in range; no fallback to the feature.
                return ctx_value.as_number().is_some_and(in_range);
            }
            feature
                .props
                .numeric_props
                .get(key)
                .is_some_and(|n| in_range(*n))
        }
    }
}

/// Walk `ops` in order, returning `break_result` as soon as an operand
/// evaluates to `break_value`, and `!break_result` if none does.
fn short_circuit(
    ops: &[Filter],
    feature: &Feature,
    ctx: &Context,
    break_value: bool,
    break_result: bool,
) -> bool {
    for op in ops {
        if evaluate_filter(op, feature, ctx) == break_value {
            return break_result;
        }
    }
    !break_result
}
