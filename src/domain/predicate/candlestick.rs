//! Candlestick-pattern predicate over the shared taxonomy.

use super::library::PredicateContext;
use super::params::StepParams;
use super::DEFAULT_DURATION;
use crate::domain::error::PredicateError;
use crate::domain::ohlcv::PriceSeries;

/// Any pattern selected by (group, subgroup, pattern) fires in the last
/// `duration` bars with the group's direction.
pub fn contains_candlestick_pattern(
    series: &PriceSeries,
    params: &StepParams,
    ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    params.ensure_only(&["group", "subgroup", "pattern", "duration"])?;
    let group = params.required_str("group")?;
    let subgroup = params.required_str("subgroup")?;
    let pattern = params.required_str("pattern")?;
    let duration = params.usize_or("duration", DEFAULT_DURATION)?;

    let selection = ctx
        .taxonomy
        .select(group, subgroup, pattern)
        .ok_or_else(|| PredicateError::UnknownPattern {
            group: group.to_string(),
            subgroup: subgroup.to_string(),
            pattern: pattern.to_string(),
        })?;

    Ok(selection.fires_within(&series.bars, duration))
}
