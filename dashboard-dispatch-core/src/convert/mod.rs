//! Converters between backend wire formats and the domain model
//!
//! Two dialects are supported: [`bear`] (URI based, `{"filterContext":
//! {"meta", "content"}}` envelopes) and [`tiger`] (JSON:API style
//! `{"data": {"id", "type", "attributes"}}` documents). Converters are pure
//! functions that run outside command dispatch and report failures
//! synchronously as [`ConversionError`].

pub mod bear;
pub mod tiger;

use crate::command::DateFilterSelection;
use crate::error::ConversionError;
use crate::handler::canonical_date_filter;
use crate::model::DateFilter;

/// Both dialects share the date filter shape
pub(crate) fn date_filter_from_wire(wire: &DateFilterSelection) -> Result<DateFilter, ConversionError> {
    canonical_date_filter(wire).map_err(|e| ConversionError::Malformed(e.message().to_string()))
}

/// All time has no wire representation; it is the absence of a date filter
pub(crate) fn date_filter_to_wire(filter: &DateFilter) -> Option<DateFilterSelection> {
    match filter {
        DateFilter::AllTime => None,
        DateFilter::Relative {
            granularity,
            from,
            to,
        } => Some(DateFilterSelection::relative(*granularity, *from, *to)),
        DateFilter::Absolute { from, to } => Some(DateFilterSelection::absolute(from, to)),
    }
}

/// At most one date filter per filter context
pub(crate) fn single_date_filter<'a>(
    mut filters: impl Iterator<Item = &'a DateFilterSelection>,
) -> Result<DateFilter, ConversionError> {
    let Some(first) = filters.next() else {
        return Ok(DateFilter::AllTime);
    };
    if filters.next().is_some() {
        return Err(ConversionError::NotSupported(
            "filter context with more than one date filter".into(),
        ));
    }
    date_filter_from_wire(first)
}

/// Local identifier for wire filters that carry none
pub(crate) fn fallback_local_identifier(position: usize) -> String {
    format!("attributeFilter_{}", position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateGranularity;

    #[test]
    fn test_all_time_is_omitted() {
        assert!(date_filter_to_wire(&DateFilter::AllTime).is_none());
        assert_eq!(single_date_filter(std::iter::empty()), Ok(DateFilter::AllTime));
    }

    #[test]
    fn test_unbounded_relative_reads_back_as_all_time() {
        let wire = DateFilterSelection::all_time();
        assert_eq!(date_filter_from_wire(&wire), Ok(DateFilter::AllTime));
    }

    #[test]
    fn test_multiple_date_filters_not_supported() {
        let a = DateFilterSelection::relative(DateGranularity::Year, -1, 0);
        let b = DateFilterSelection::relative(DateGranularity::Month, -1, 0);
        assert!(matches!(
            single_date_filter([&a, &b].into_iter()),
            Err(ConversionError::NotSupported(_))
        ));
    }

    #[test]
    fn test_half_bounded_is_malformed() {
        let mut wire = DateFilterSelection::absolute("2024-01-01", "2024-02-01");
        wire.to = None;
        assert!(matches!(
            date_filter_from_wire(&wire),
            Err(ConversionError::Malformed(_))
        ));
    }
}
