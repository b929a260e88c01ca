//! Donation pages: which records each table shows and what can be done to them

use crate::core::render::{
    asset_link, currency, date, or_placeholder, status_badge, when_flag, yes_no,
};
use crate::core::{ColumnDescriptor, ColumnSchema, RenderFn, Row, RowAction, SchemaError};
use crate::services::Endpoint;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

const CERTIFICATE_FLAG: &str = "wants80GCertificate";

/// Request raised by a row action, handled by the app after confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCommand {
    Delete { id: String },
    SetStatus { id: String, status: String },
}

impl RowCommand {
    pub fn id(&self) -> &str {
        match self {
            RowCommand::Delete { id } | RowCommand::SetStatus { id, .. } => id,
        }
    }

    /// Question shown before the command runs
    pub fn prompt(&self) -> String {
        match self {
            RowCommand::Delete { id } => {
                format!("Delete donation {id}? This cannot be undone.")
            }
            RowCommand::SetStatus { id, status } => {
                format!("Mark donation {id} as {status}?")
            }
        }
    }
}

pub type CommandSender = UnboundedSender<RowCommand>;

/// What a page needs to build its columns
#[derive(Debug, Clone)]
pub struct PageContext {
    pub commands: CommandSender,
    pub id_field: String,
    /// Scheme and host serving uploaded files
    pub asset_origin: String,
}

impl PageContext {
    pub fn new(commands: CommandSender, id_field: &str, base_url: &str) -> Self {
        Self {
            commands,
            id_field: id_field.to_string(),
            asset_origin: origin_of(base_url),
        }
    }

    fn delete_action(&self) -> RowAction {
        let commands = self.commands.clone();
        let id_field = self.id_field.clone();
        RowAction::new("Delete", move |row: &Row| {
            dispatch(&commands, row, &id_field, |id| RowCommand::Delete { id })
        })
    }

    fn status_action(&self, status: &'static str) -> RowAction {
        let commands = self.commands.clone();
        let id_field = self.id_field.clone();
        RowAction::new(format!("Mark as {}", title_case(status)), move |row: &Row| {
            dispatch(&commands, row, &id_field, |id| RowCommand::SetStatus {
                id,
                status: status.to_string(),
            })
        })
    }
}

fn dispatch(
    commands: &CommandSender,
    row: &Row,
    id_field: &str,
    make: impl FnOnce(String) -> RowCommand,
) {
    let Some(id) = row.id(id_field) else {
        warn!(id_field, "Row has no id, ignoring action");
        return;
    };
    if commands.send(make(id)).is_err() {
        warn!("Row command receiver is gone");
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Scheme and host of a URL, or the URL itself if it does not parse
pub fn origin_of(base_url: &str) -> String {
    match reqwest::Url::parse(base_url) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => base_url.trim_end_matches('/').to_string(),
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Page {
    #[default]
    InHonour,
    InMemory,
    Sponsor,
    SpecialOccasion,
    VerifyDonations,
    Enquiries,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::InHonour,
        Page::InMemory,
        Page::Sponsor,
        Page::SpecialOccasion,
        Page::VerifyDonations,
        Page::Enquiries,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::InHonour => "In-Honour Donations",
            Page::InMemory => "In-Memory Donations",
            Page::Sponsor => "Sponsor Donations",
            Page::SpecialOccasion => "Special Occasion Donations",
            Page::VerifyDonations => "Verify Donations",
            Page::Enquiries => "Donation Enquiries",
        }
    }

    pub fn next(&self) -> Page {
        let index = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Page {
        let index = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Remote endpoint pair, if the page is served by the API
    ///
    /// Sponsor donations and enquiries are only available from files.
    pub fn endpoint(&self, base_url: &str) -> Option<Endpoint> {
        let (list, delete) = match self {
            Page::InHonour => (
                "enquiry/get-in-honour-donations",
                "enquiry/delete-in-honour-donation",
            ),
            Page::InMemory => (
                "enquiry/get-in-memory-donations",
                "enquiry/delete-in-memory-donation",
            ),
            Page::SpecialOccasion => (
                "enquiry/get-special-occasion-donations",
                "enquiry/delete-special-occasion-donation",
            ),
            Page::VerifyDonations => (
                "enquiry/get-verify-donations",
                "enquiry/delete-verify-donation",
            ),
            Page::Sponsor | Page::Enquiries => return None,
        };
        Some(Endpoint::new(base_url, list, delete))
    }

    /// Statuses an operator may move a record to
    pub fn status_options(&self) -> &'static [&'static str] {
        match self {
            Page::Sponsor => &["processing", "completed", "failed"],
            Page::Enquiries => &["new", "processing", "completed", "failed"],
            _ => &[],
        }
    }

    pub fn can_delete(&self) -> bool {
        !matches!(self, Page::Sponsor | Page::Enquiries)
    }

    /// Column schema for this page, with row actions wired to `ctx`
    pub fn columns(&self, ctx: &PageContext) -> Result<ColumnSchema, SchemaError> {
        let mut columns = match self {
            Page::InHonour => honour_columns(),
            Page::InMemory => memory_columns(),
            Page::Sponsor => sponsor_columns(),
            Page::SpecialOccasion => occasion_columns(),
            Page::VerifyDonations => verify_columns(ctx),
            Page::Enquiries => enquiry_columns(),
        };

        let mut actions: Vec<RowAction> = self
            .status_options()
            .iter()
            .map(|status| ctx.status_action(*status))
            .collect();
        if self.can_delete() {
            actions.push(ctx.delete_action());
        }
        if !actions.is_empty() {
            columns.push(ColumnDescriptor::actions("actions", "Actions", actions));
        }

        ColumnSchema::new(columns)
    }
}

fn key(path: &str, header: &str) -> ColumnDescriptor {
    ColumnDescriptor::key(path, header)
}

fn certificate_columns(render: fn(&'static str) -> RenderFn) -> Vec<ColumnDescriptor> {
    [
        ("certificateDetails.panCardNumber", "Certificate PAN"),
        ("certificateDetails.certificateAddress", "Certificate Address"),
        ("certificateDetails.certificatePinCode", "Certificate Pincode"),
        ("certificateDetails.certificateCity", "Certificate City"),
        ("certificateDetails.certificateState", "Certificate State"),
        ("certificateDetails.preferenceState", "Preference State"),
    ]
    .into_iter()
    .map(|(path, header)| key(path, header).with_renderer(render(CERTIFICATE_FLAG)))
    .collect()
}

fn honour_columns() -> Vec<ColumnDescriptor> {
    let mut columns = vec![
        key("fullName", "Name"),
        key("mobileNumber", "Mobile"),
        key("alternateMobileNumber", "Alt. Mobile"),
        key("email", "Email"),
        key("birthdate", "Birthdate"),
        key("citizenship", "Citizenship"),
        key("createdAt", "Created At").with_renderer(date()),
        key("occasionDate", "Occasion Date"),
        key("occasionName", "Occasion Name"),
        key("honoreeName", "Honoree Name"),
        key("donationType", "Donation Type"),
        key("relationshipWithHonoree", "Relation"),
        key("honoreeEmail", "Honoree Email"),
        key("honoreeMobile", "Honoree Mobile"),
    ];
    columns.extend(certificate_columns(when_flag));
    columns.push(key("amount", "Amount").with_renderer(currency("₹")));
    columns.push(key("status", "Status").with_renderer(status_badge()));
    columns
}

fn memory_columns() -> Vec<ColumnDescriptor> {
    let mut columns = vec![
        key("fullName", "Name"),
        key("mobileNumber", "Mobile"),
        key("alternateMobileNumber", "Alternate Mobile"),
        key("email", "Email"),
        key("birthdate", "Birthdate").with_renderer(date()),
        key("citizenship", "Citizenship"),
        key(CERTIFICATE_FLAG, "80G Certificate").with_renderer(yes_no()),
        key("donationType", "Donation Type"),
        key("honoreeName", "Honoree"),
        key("relationshipWithHonoree", "Relationship"),
        key("occasionName", "Occasion"),
        key("occasionDate", "Occasion Date").with_renderer(date()),
        key("createdAt", "Created At").with_renderer(date()),
    ];
    columns.extend(certificate_columns(|_| or_placeholder("Not Specified")));
    columns.push(key("amount", "Amount").with_renderer(currency("₹")));
    columns
}

fn sponsor_columns() -> Vec<ColumnDescriptor> {
    vec![
        key("occasion date", "Occasion Date").with_renderer(date()),
        key("occasion name", "Occasion Name"),
        key("honoree name", "Honoree Name"),
        key("relation", "Relation"),
        key("honoree email", "Honoree Email"),
        key("honoree phone", "Honoree Phone"),
        key("name", "Name"),
        key("phone", "Mobile"),
        key("email", "Email"),
        key("Birthdate", "Birthdate").with_renderer(date()),
        key("citizenship", "Citizenship"),
        key("certificate", "Certificate").with_renderer(yes_no()),
        key("createdAt", "Created At").with_renderer(date()),
        key("pan number", "PAN Number"),
        key("address", "Address"),
        key("pincode", "Pincode"),
        key("city", "City"),
        key("state", "State"),
        key("preferenceState", "Preference State"),
        key("donationType", "Donation Type"),
        key("amount", "Amount").with_renderer(currency("₹")),
        key("status", "Status").with_renderer(status_badge()),
    ]
}

fn occasion_columns() -> Vec<ColumnDescriptor> {
    vec![
        key("occasionDate", "Occasion Date").with_renderer(date()),
        key("occasionName", "Occasion Name"),
        key("honoreeName", "Honoree Name"),
        key("fullName", "Name"),
        key("email", "Email"),
        key("mobileNumber", "Mobile"),
    ]
}

fn verify_columns(ctx: &PageContext) -> Vec<ColumnDescriptor> {
    vec![
        key("firstName", "Name"),
        key("contactNumber", "Mobile"),
        key("email", "Email"),
        key("donationAmount", "Donation Amount").with_renderer(currency("₹")),
        key("donationScreenshot", "Donation Screenshot")
            .with_renderer(asset_link(ctx.asset_origin.clone()))
            .sortable(false),
    ]
}

fn enquiry_columns() -> Vec<ColumnDescriptor> {
    vec![
        key("name", "Name"),
        key("email", "Email"),
        key("phone", "Phone"),
        key("citizenship", "Citizenship"),
        key("donationType", "Donation Type"),
        key("amount", "Amount").with_renderer(currency("₹")),
        key("certificate", "80G Certificate").with_renderer(yes_no()),
        key("createdAt", "Date").with_renderer(date()),
        key("status", "Status").with_renderer(status_badge()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc::unbounded_channel;

    fn context() -> (PageContext, tokio::sync::mpsc::UnboundedReceiver<RowCommand>) {
        let (tx, rx) = unbounded_channel();
        let ctx = PageContext::new(tx, "_id", "https://sucheta.traficoanalytica.com/api/v1");
        (ctx, rx)
    }

    #[test]
    fn test_every_page_builds_a_valid_schema() {
        let (ctx, _rx) = context();
        for page in Page::ALL {
            let schema = page.columns(&ctx).unwrap();
            assert!(!schema.is_empty(), "{page} has no columns");
        }
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://sucheta.traficoanalytica.com/api/v1"),
            "https://sucheta.traficoanalytica.com"
        );
        assert_eq!(origin_of("not a url/"), "not a url");
    }

    #[test]
    fn test_delete_action_sends_command() {
        let (ctx, mut rx) = context();
        let schema = Page::InHonour.columns(&ctx).unwrap();
        let actions = schema.get("actions").unwrap();
        assert_eq!(actions.row_actions().len(), 1);

        let row = Row::from_value(json!({"_id": "abc"})).unwrap();
        actions.row_actions()[0].invoke(&row);
        assert_eq!(
            rx.try_recv().unwrap(),
            RowCommand::Delete {
                id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_status_actions_follow_options() {
        let (ctx, mut rx) = context();
        let schema = Page::Sponsor.columns(&ctx).unwrap();
        let labels: Vec<&str> = schema
            .get("actions")
            .unwrap()
            .row_actions()
            .iter()
            .map(|a| a.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["Mark as Processing", "Mark as Completed", "Mark as Failed"]
        );

        let row = Row::from_value(json!({"_id": "s1"})).unwrap();
        schema.get("actions").unwrap().row_actions()[1].invoke(&row);
        assert_eq!(
            rx.try_recv().unwrap(),
            RowCommand::SetStatus {
                id: "s1".to_string(),
                status: "completed".to_string()
            }
        );
    }

    #[test]
    fn test_certificate_fields_hidden_without_flag() {
        let (ctx, _rx) = context();
        let schema = Page::InHonour.columns(&ctx).unwrap();
        let pan = schema.get("certificateDetails.panCardNumber").unwrap();
        let data = Dataset::from_json(
            json!([
                {"_id": "1", "wants80GCertificate": true, "certificateDetails": {"panCardNumber": "P1"}},
                {"_id": "2", "wants80GCertificate": false, "certificateDetails": {"panCardNumber": "P2"}}
            ]),
            "_id",
        )
        .unwrap();
        assert_eq!(pan.render(&data.rows()[0]).text, "P1");
        assert_eq!(pan.render(&data.rows()[1]).text, "");
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::InHonour.next(), Page::InMemory);
        assert_eq!(Page::InHonour.prev(), Page::Enquiries);
        assert_eq!(Page::SpecialOccasion.to_string(), "special-occasion");
        assert!(Page::Sponsor.endpoint("https://x").is_none());
    }
}
