//! Tiger wire format
//!
//! JSON:API style documents: `{ "data": { "id", "type", "attributes" } }`.
//! Objects are addressed by identifier and attribute elements by value.

use serde::{Deserialize, Serialize};

use crate::command::DateFilterSelection;
use crate::convert::{date_filter_to_wire, fallback_local_identifier, single_date_filter};
use crate::error::ConversionError;
use crate::model::{AttributeElements, AttributeFilter, Dashboard, FilterContext};
use crate::obj_ref::{ObjRef, ObjectType};

const FILTER_CONTEXT_TYPE: &str = "filterContext";
const DASHBOARD_TYPE: &str = "analyticalDashboard";
const LABEL_TYPE: &str = "label";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireIdentifierRef {
    pub identifier: WireIdentifier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireElementValues {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAttributeFilter {
    pub display_form: WireIdentifierRef,
    pub negative_selection: bool,
    #[serde(default)]
    pub attribute_elements: WireElementValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireFilter {
    DateFilter(DateFilterSelection),
    AttributeFilter(WireAttributeFilter),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilterContextContent {
    #[serde(default)]
    pub filters: Vec<WireFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilterContextAttributes {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: WireFilterContextContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDashboardContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_context_ref: Option<WireIdentifierRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDashboardAttributes {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<WireDashboardContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// JSON:API resource object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResource<A> {
    /// Absent on objects that were never saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<WireLinks>,
}

/// JSON:API top-level document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDocument<A> {
    pub data: WireResource<A>,
}

pub type WireFilterContext = WireDocument<WireFilterContextAttributes>;
pub type WireAnalyticalDashboard = WireDocument<WireDashboardAttributes>;

fn expect_type<A>(resource: &WireResource<A>, expected: &str) -> Result<(), ConversionError> {
    if resource.kind == expected {
        Ok(())
    } else {
        Err(ConversionError::Malformed(format!(
            "expected resource of type {}, got {}",
            expected, resource.kind
        )))
    }
}

fn identifier_of<'a>(obj_ref: &'a ObjRef, what: &str) -> Result<&'a str, ConversionError> {
    match obj_ref {
        ObjRef::Identifier { identifier, .. } => Ok(identifier),
        ObjRef::Uri { uri } => Err(ConversionError::NotSupported(format!(
            "tiger references {} by identifier, got uri {}",
            what, uri
        ))),
    }
}

/// Display forms go on the wire as labels; an untyped identifier is taken as one
fn label_of(obj_ref: &ObjRef) -> Result<&str, ConversionError> {
    match obj_ref {
        ObjRef::Identifier {
            object_type: Some(t),
            identifier,
        } if *t != ObjectType::DisplayForm => Err(ConversionError::NotSupported(format!(
            "attribute filter display form {} has type {}",
            identifier,
            t.as_str()
        ))),
        _ => identifier_of(obj_ref, "display forms"),
    }
}

pub fn convert_filter_context(wire: &WireFilterContext) -> Result<FilterContext, ConversionError> {
    let resource = &wire.data;
    expect_type(resource, FILTER_CONTEXT_TYPE)?;
    let filters = &resource.attributes.content.filters;

    let date_filter = single_date_filter(filters.iter().filter_map(|f| match f {
        WireFilter::DateFilter(d) => Some(d),
        WireFilter::AttributeFilter(_) => None,
    }))?;

    let attribute_filters = filters
        .iter()
        .filter_map(|f| match f {
            WireFilter::AttributeFilter(a) => Some(a),
            WireFilter::DateFilter(_) => None,
        })
        .enumerate()
        .map(|(position, filter)| {
            let label = &filter.display_form.identifier;
            if label.kind != LABEL_TYPE {
                return Err(ConversionError::Malformed(format!(
                    "attribute filter display form {} has type {}",
                    label.id, label.kind
                )));
            }
            Ok(AttributeFilter {
                local_identifier: filter
                    .local_identifier
                    .clone()
                    .unwrap_or_else(|| fallback_local_identifier(position)),
                display_form: ObjRef::typed(label.id.clone(), ObjectType::DisplayForm),
                negative_selection: filter.negative_selection,
                attribute_elements: AttributeElements::Values(
                    filter.attribute_elements.values.clone(),
                ),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FilterContext {
        obj_ref: resource
            .id
            .clone()
            .map(|id| ObjRef::typed(id, ObjectType::FilterContext)),
        identifier: resource.id.clone(),
        uri: resource.links.as_ref().and_then(|l| l.self_link.clone()),
        title: resource.attributes.title.clone(),
        description: resource.attributes.description.clone(),
        date_filter,
        attribute_filters,
    })
}

pub fn to_wire_filter_context(filter_context: &FilterContext) -> Result<WireFilterContext, ConversionError> {
    let mut filters: Vec<WireFilter> = date_filter_to_wire(&filter_context.date_filter)
        .map(WireFilter::DateFilter)
        .into_iter()
        .collect();

    for filter in &filter_context.attribute_filters {
        let values = match &filter.attribute_elements {
            AttributeElements::Values(values) => values.clone(),
            // an empty selection carries no element addressing
            AttributeElements::Uris(uris) if uris.is_empty() => Vec::new(),
            AttributeElements::Uris(_) => {
                return Err(ConversionError::NotSupported(format!(
                    "tiger attribute filter {} must select elements by value",
                    filter.local_identifier
                )))
            }
        };
        filters.push(WireFilter::AttributeFilter(WireAttributeFilter {
            display_form: WireIdentifierRef {
                identifier: WireIdentifier {
                    id: label_of(&filter.display_form)?.to_string(),
                    kind: LABEL_TYPE.to_string(),
                },
            },
            negative_selection: filter.negative_selection,
            attribute_elements: WireElementValues { values },
            local_identifier: Some(filter.local_identifier.clone()),
        }));
    }

    Ok(WireDocument {
        data: WireResource {
            id: filter_context.identifier.clone(),
            kind: FILTER_CONTEXT_TYPE.to_string(),
            attributes: WireFilterContextAttributes {
                title: filter_context.title.clone(),
                description: filter_context.description.clone(),
                content: WireFilterContextContent { filters },
            },
            links: filter_context.uri.clone().map(|uri| WireLinks {
                self_link: Some(uri),
            }),
        },
    })
}

/// Dashboard metadata; tiger has no unlisted flag
pub fn convert_dashboard_meta(wire: &WireAnalyticalDashboard) -> Result<Dashboard, ConversionError> {
    let resource = &wire.data;
    expect_type(resource, DASHBOARD_TYPE)?;
    let Some(id) = resource.id.clone() else {
        return Err(ConversionError::Malformed("analytical dashboard without id".into()));
    };

    Ok(Dashboard {
        obj_ref: ObjRef::typed(id.clone(), ObjectType::AnalyticalDashboard),
        uri: resource
            .links
            .as_ref()
            .and_then(|l| l.self_link.clone())
            .unwrap_or_default(),
        identifier: id,
        title: resource.attributes.title.clone(),
        description: resource.attributes.description.clone(),
        unlisted: false,
        filter_context: None,
        layout: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateFilter;
    use serde_json::json;

    fn wire_filter_context() -> WireFilterContext {
        serde_json::from_value(json!({
            "data": {
                "id": "fc-sales",
                "type": "filterContext",
                "attributes": {
                    "title": "filterContext",
                    "content": {"filters": [
                        {"attributeFilter": {
                            "displayForm": {"identifier": {"id": "label.region", "type": "label"}},
                            "negativeSelection": false,
                            "attributeElements": {"values": ["East", "West"]},
                            "localIdentifier": "region"
                        }},
                        {"dateFilter": {"type": "absolute", "granularity": "GDC.time.date", "from": "2024-01-01", "to": "2024-03-31"}}
                    ]}
                },
                "links": {"self": "/api/v1/entities/workspaces/ws/filterContexts/fc-sales"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_filter_context() {
        let ctx = convert_filter_context(&wire_filter_context()).unwrap();

        assert_eq!(
            ctx.obj_ref,
            Some(ObjRef::typed("fc-sales", ObjectType::FilterContext))
        );
        assert_eq!(
            ctx.date_filter,
            DateFilter::Absolute {
                from: "2024-01-01".into(),
                to: "2024-03-31".into()
            }
        );
        let region = ctx.attribute_filter("region").unwrap();
        assert_eq!(
            region.display_form,
            ObjRef::typed("label.region", ObjectType::DisplayForm)
        );
        assert_eq!(
            region.attribute_elements,
            AttributeElements::Values(vec!["East".into(), "West".into()])
        );
    }

    #[test]
    fn test_round_trip_ignores_identity() {
        let domain = convert_filter_context(&wire_filter_context()).unwrap();
        let wire = to_wire_filter_context(&domain.without_identity()).unwrap();
        assert!(wire.data.id.is_none());
        assert!(wire.data.links.is_none());

        let back = convert_filter_context(&wire).unwrap();
        assert_eq!(back.without_identity(), domain.without_identity());
    }

    #[test]
    fn test_element_uris_not_supported() {
        let ctx = FilterContext {
            attribute_filters: vec![AttributeFilter {
                local_identifier: "f".into(),
                display_form: ObjRef::id("label.region"),
                negative_selection: false,
                attribute_elements: AttributeElements::Uris(vec!["/gdc/md/ws/obj/10/elements?id=1".into()]),
            }],
            ..Default::default()
        };
        assert!(matches!(
            to_wire_filter_context(&ctx),
            Err(ConversionError::NotSupported(_))
        ));
    }

    #[test]
    fn test_select_all_converts() {
        let ctx = FilterContext {
            attribute_filters: vec![AttributeFilter::select_all("f", ObjRef::id("label.region"))],
            ..Default::default()
        };
        let wire = to_wire_filter_context(&ctx).unwrap();
        let back = convert_filter_context(&wire).unwrap();
        assert!(back.attribute_filters[0].attribute_elements.is_empty());
        assert!(back.attribute_filters[0].negative_selection);
    }

    #[test]
    fn test_uri_display_form_not_supported() {
        let ctx = FilterContext {
            attribute_filters: vec![AttributeFilter::select_all("f", ObjRef::uri("/gdc/md/ws/obj/11"))],
            ..Default::default()
        };
        assert!(matches!(
            to_wire_filter_context(&ctx),
            Err(ConversionError::NotSupported(_))
        ));
    }

    #[test]
    fn test_dashboard_meta() {
        let wire: WireAnalyticalDashboard = serde_json::from_value(json!({
            "data": {
                "id": "sales",
                "type": "analyticalDashboard",
                "attributes": {
                    "title": "Sales",
                    "content": {"filterContextRef": {"identifier": {"id": "fc-sales", "type": "filterContext"}}}
                }
            }
        }))
        .unwrap();

        let dashboard = convert_dashboard_meta(&wire).unwrap();
        assert_eq!(
            dashboard.obj_ref,
            ObjRef::typed("sales", ObjectType::AnalyticalDashboard)
        );
        assert!(!dashboard.unlisted);
        assert!(dashboard.uri.is_empty());
    }

    #[test]
    fn test_wrong_resource_type_is_malformed() {
        let mut wire = wire_filter_context();
        wire.data.kind = "analyticalDashboard".into();
        assert!(matches!(
            convert_filter_context(&wire),
            Err(ConversionError::Malformed(_))
        ));
    }

    #[test]
    fn test_non_label_display_form_not_supported() {
        let ctx = FilterContext {
            attribute_filters: vec![AttributeFilter::select_all(
                "f",
                ObjRef::typed("attr.region", ObjectType::Attribute),
            )],
            ..Default::default()
        };
        assert!(matches!(
            to_wire_filter_context(&ctx),
            Err(ConversionError::NotSupported(_))
        ));
    }
}
