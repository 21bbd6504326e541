use crate::wizard::{FieldSchema, StepSchema, WizardSchema};

pub const CATEGORIES: &[&str] = &["hardware", "software", "network", "access", "email", "other"];

const SUBCATEGORIES: &[(&str, &[&str])] = &[
    (
        "hardware",
        &["Laptop/Desktop", "Monitor", "Printer problems", "Keyboard/Mouse", "Phone", "Other hardware"],
    ),
    (
        "software",
        &["Installation", "Crash or freeze", "License", "Update", "Other software"],
    ),
    ("network", &["No connectivity", "Slow connection", "VPN", "Wi-Fi", "Other network"]),
    ("access", &["Password reset", "Account locked", "New permission", "Shared drive"]),
    ("email", &["Cannot send", "Cannot receive", "Spam or phishing", "Mailbox full"]),
    ("other", &["General question", "Other"]),
];

const TROUBLESHOOTING: &[(&str, &[&str])] = &[
    (
        "hardware",
        &["Restarted the device", "Checked cables", "Tried another port", "Replaced batteries"],
    ),
    (
        "software",
        &["Restarted the application", "Reinstalled", "Cleared cache", "Checked for updates"],
    ),
    (
        "network",
        &["Restarted the router", "Reconnected to Wi-Fi", "Reconnected VPN", "Tried a wired connection"],
    ),
    ("access", &["Reset password", "Cleared browser cookies", "Tried another device"]),
    ("email", &["Checked spam folder", "Restarted mail client", "Checked mailbox quota"]),
    ("other", &["Restarted the device"]),
];

/// IT issue report: issue, details, troubleshooting, review.
pub fn schema() -> WizardSchema {
    WizardSchema::new(
        "it-issue",
        "Report an IT issue",
        vec![
            StepSchema::new(
                "issue",
                "Issue",
                vec![
                    FieldSchema::select("category", "Category", CATEGORIES).required(),
                    FieldSchema::dependent_select(
                        "subcategory",
                        "Subcategory",
                        "category",
                        SUBCATEGORIES,
                    )
                    .required(),
                    FieldSchema::select("priority", "Priority", &["low", "medium", "high", "critical"])
                        .required(),
                    FieldSchema::text("title", "Title").required(),
                ],
            ),
            StepSchema::new(
                "details",
                "Details",
                vec![
                    FieldSchema::long_text("description", "Description").required(),
                    FieldSchema::date("occurred_on", "When did it start?"),
                    FieldSchema::select(
                        "device.type",
                        "Device type",
                        &["laptop", "desktop", "phone", "tablet", "printer", "other"],
                    ),
                    FieldSchema::text("device.asset_tag", "Asset tag")
                        .help("Printed on the sticker under the device"),
                    FieldSchema::select("workaround", "Is there a workaround?", &["yes", "no", "partial"])
                        .required(),
                    FieldSchema::long_text("workaround_description", "Describe the workaround")
                        .required()
                        .visible_when("workaround", &["yes", "partial"]),
                ],
            ),
            StepSchema::new(
                "troubleshooting",
                "Troubleshooting & contact",
                vec![
                    FieldSchema::dependent_multi_select(
                        "troubleshooting_steps",
                        "Steps already tried",
                        "category",
                        TROUBLESHOOTING,
                    ),
                    FieldSchema::text("contact.phone", "Phone"),
                    FieldSchema::select(
                        "contact.preferred_method",
                        "Preferred contact method",
                        &["email", "phone", "chat"],
                    )
                    .required(),
                ],
            ),
            StepSchema::review("review", "Review & submit"),
        ],
    )
}
