//! Bear wire format
//!
//! Objects are addressed by URI and wrapped in a `{ "<kind>": { "meta",
//! "content" } }` envelope.

use serde::{Deserialize, Serialize};

use crate::command::DateFilterSelection;
use crate::convert::{date_filter_to_wire, fallback_local_identifier, single_date_filter};
use crate::error::ConversionError;
use crate::model::{
    AttributeElements, AttributeFilter, Dashboard, DashboardAttachment, FilterContext,
    ScheduleWhen, ScheduledMail,
};
use crate::obj_ref::ObjRef;

/// Metadata block shared by every bear object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// `1` when hidden from listings; absent on older objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted: Option<u8>,
}

impl WireMeta {
    fn is_unlisted(&self) -> bool {
        self.unlisted.unwrap_or(0) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAttributeFilter {
    /// Display form URI
    pub display_form: String,
    pub negative_selection: bool,
    /// Element URIs
    #[serde(default)]
    pub attribute_elements: Vec<String>,
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
pub struct WireFilterContextBody {
    #[serde(default)]
    pub meta: WireMeta,
    #[serde(default)]
    pub content: WireFilterContextContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFilterContext {
    pub filter_context: WireFilterContextBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDashboardContent {
    /// Filter context URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_context: Option<String>,
    /// Widget URIs
    #[serde(default)]
    pub widgets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDashboardBody {
    #[serde(default)]
    pub meta: WireMeta,
    #[serde(default)]
    pub content: WireDashboardContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnalyticalDashboard {
    pub analytical_dashboard: WireDashboardBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScheduleWhen {
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Recurrence expression, spelled "recurrency" on the wire
    #[serde(rename = "recurrency")]
    pub recurrence: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKpiDashboardAttachment {
    /// Dashboard URI
    pub uri: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVisualizationWidgetAttachment {
    /// Widget URI
    pub uri: String,
    pub dashboard_uri: String,
    #[serde(default)]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireScheduledMailAttachment {
    KpiDashboardAttachment(WireKpiDashboardAttachment),
    VisualizationWidgetAttachment(WireVisualizationWidgetAttachment),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScheduledMailContent {
    pub when: WireScheduleWhen,
    pub to: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<WireScheduledMailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireScheduledMailBody {
    #[serde(default)]
    pub meta: WireMeta,
    pub content: WireScheduledMailContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScheduledMail {
    pub scheduled_mail: WireScheduledMailBody,
}

fn uri_of<'a>(obj_ref: &'a ObjRef, what: &str) -> Result<&'a str, ConversionError> {
    match obj_ref {
        ObjRef::Uri { uri } => Ok(uri),
        ObjRef::Identifier { identifier, .. } => Err(ConversionError::NotSupported(format!(
            "bear references {} by URI, got identifier {}",
            what, identifier
        ))),
    }
}

pub fn convert_filter_context(wire: &WireFilterContext) -> Result<FilterContext, ConversionError> {
    let body = &wire.filter_context;

    let date_filter = single_date_filter(body.content.filters.iter().filter_map(|f| match f {
        WireFilter::DateFilter(d) => Some(d),
        WireFilter::AttributeFilter(_) => None,
    }))?;

    let attribute_filters = body
        .content
        .filters
        .iter()
        .filter_map(|f| match f {
            WireFilter::AttributeFilter(a) => Some(a),
            WireFilter::DateFilter(_) => None,
        })
        .enumerate()
        .map(|(position, filter)| AttributeFilter {
            local_identifier: filter
                .local_identifier
                .clone()
                .unwrap_or_else(|| fallback_local_identifier(position)),
            display_form: ObjRef::uri(filter.display_form.clone()),
            negative_selection: filter.negative_selection,
            attribute_elements: AttributeElements::Uris(filter.attribute_elements.clone()),
        })
        .collect();

    Ok(FilterContext {
        obj_ref: body.meta.uri.clone().map(ObjRef::uri),
        identifier: body.meta.identifier.clone(),
        uri: body.meta.uri.clone(),
        title: body.meta.title.clone(),
        description: body.meta.summary.clone(),
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
        let elements = match &filter.attribute_elements {
            AttributeElements::Uris(uris) => uris.clone(),
            // an empty selection carries no element addressing
            AttributeElements::Values(values) if values.is_empty() => Vec::new(),
            AttributeElements::Values(_) => {
                return Err(ConversionError::NotSupported(format!(
                    "bear attribute filter {} must select elements by URI",
                    filter.local_identifier
                )))
            }
        };
        filters.push(WireFilter::AttributeFilter(WireAttributeFilter {
            display_form: uri_of(&filter.display_form, "display forms")?.to_string(),
            negative_selection: filter.negative_selection,
            attribute_elements: elements,
            local_identifier: Some(filter.local_identifier.clone()),
        }));
    }

    Ok(WireFilterContext {
        filter_context: WireFilterContextBody {
            meta: WireMeta {
                uri: filter_context.uri.clone(),
                identifier: filter_context.identifier.clone(),
                title: filter_context.title.clone(),
                summary: filter_context.description.clone(),
                unlisted: None,
            },
            content: WireFilterContextContent { filters },
        },
    })
}

/// Dashboard metadata; filter context and layout are loaded separately
pub fn convert_dashboard_meta(wire: &WireAnalyticalDashboard) -> Result<Dashboard, ConversionError> {
    let meta = &wire.analytical_dashboard.meta;
    let Some(uri) = meta.uri.clone() else {
        return Err(ConversionError::Malformed("analytical dashboard without uri".into()));
    };

    Ok(Dashboard {
        obj_ref: ObjRef::uri(uri.clone()),
        identifier: meta.identifier.clone().unwrap_or_default(),
        uri,
        title: meta.title.clone(),
        description: meta.summary.clone(),
        unlisted: meta.is_unlisted(),
        filter_context: None,
        layout: None,
    })
}

pub fn convert_scheduled_mail(wire: &WireScheduledMail) -> Result<ScheduledMail, ConversionError> {
    let WireScheduledMailBody { meta, content } = &wire.scheduled_mail;

    let attachments = content
        .attachments
        .iter()
        .map(|attachment| match attachment {
            WireScheduledMailAttachment::KpiDashboardAttachment(a) => Ok(DashboardAttachment {
                dashboard: ObjRef::uri(a.uri.clone()),
                format: a.format.clone(),
                filter_context: a.filter_context.clone().map(ObjRef::uri),
            }),
            WireScheduledMailAttachment::VisualizationWidgetAttachment(a) => {
                Err(ConversionError::NotSupported(format!(
                    "scheduled mail attachment of widget {} is not a dashboard attachment",
                    a.uri
                )))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScheduledMail {
        obj_ref: meta.uri.clone().map(ObjRef::uri),
        uri: meta.uri.clone(),
        identifier: meta.identifier.clone(),
        title: meta.title.clone(),
        description: meta.summary.clone(),
        when: ScheduleWhen {
            start_date: content.when.start_date.clone(),
            end_date: content.when.end_date.clone(),
            recurrence: content.when.recurrence.clone(),
            time_zone: content.when.time_zone.clone(),
        },
        to: content.to.clone(),
        bcc: content.bcc.clone(),
        subject: content.subject.clone(),
        body: content.body.clone(),
        attachments,
        unlisted: meta.is_unlisted(),
    })
}

pub fn to_wire_scheduled_mail(mail: &ScheduledMail) -> Result<WireScheduledMail, ConversionError> {
    let attachments = mail
        .attachments
        .iter()
        .map(|a| {
            Ok(WireScheduledMailAttachment::KpiDashboardAttachment(
                WireKpiDashboardAttachment {
                    uri: uri_of(&a.dashboard, "dashboards")?.to_string(),
                    format: a.format.clone(),
                    filter_context: a
                        .filter_context
                        .as_ref()
                        .map(|fc| uri_of(fc, "filter contexts").map(str::to_string))
                        .transpose()?,
                },
            ))
        })
        .collect::<Result<Vec<_>, ConversionError>>()?;

    Ok(WireScheduledMail {
        scheduled_mail: WireScheduledMailBody {
            meta: WireMeta {
                uri: mail.uri.clone(),
                identifier: mail.identifier.clone(),
                title: mail.title.clone(),
                summary: mail.description.clone(),
                unlisted: Some(u8::from(mail.unlisted)),
            },
            content: WireScheduledMailContent {
                when: WireScheduleWhen {
                    start_date: mail.when.start_date.clone(),
                    end_date: mail.when.end_date.clone(),
                    recurrence: mail.when.recurrence.clone(),
                    time_zone: mail.when.time_zone.clone(),
                },
                to: mail.to.clone(),
                bcc: mail.bcc.clone(),
                subject: mail.subject.clone(),
                body: mail.body.clone(),
                attachments,
            },
        },
    })
}
