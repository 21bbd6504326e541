use serde::Serialize;

use crate::domain::attachment::AttachmentList;
use crate::wizard::schema::WizardSchema;
use crate::wizard::validation::is_visible;
use crate::wizard::values::FormValues;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub step: usize,
    pub title: String,
    pub entries: Vec<ReviewEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// Read-only summary shown on the closing step before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub form: String,
    pub title: String,
    pub sections: Vec<ReviewSection>,
    pub attachments: Vec<ReviewFile>,
}

impl ReviewSummary {
    pub fn assemble(schema: &WizardSchema, values: &FormValues, attachments: &AttachmentList) -> Self {
        let sections = schema
            .steps
            .iter()
            .enumerate()
            .filter(|(_, step)| !step.fields.is_empty())
            .map(|(index, step)| ReviewSection {
                step: index,
                title: step.title.clone(),
                entries: step
                    .fields
                    .iter()
                    .filter(|field| is_visible(field, values))
                    .filter_map(|field| {
                        let value = values.get(&field.key).filter(|value| !value.is_blank())?;
                        Some(ReviewEntry {
                            key: field.key.clone(),
                            label: field.label.clone(),
                            value: value.display(),
                        })
                    })
                    .collect(),
            })
            .collect();

        let attachments = attachments
            .iter()
            .map(|attachment| ReviewFile {
                name: attachment.name.clone(),
                size_bytes: attachment.size_bytes,
                content_type: attachment.content_type.clone(),
            })
            .collect();

        Self { form: schema.name.clone(), title: schema.title.clone(), sections, attachments }
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("{} (review)", self.title)];
        for section in &self.sections {
            lines.push(format!("[{}] {}", section.step + 1, section.title));
            if section.entries.is_empty() {
                lines.push("  (nothing entered)".to_string());
            }
            for entry in &section.entries {
                lines.push(format!("  {}: {}", entry.label, entry.value));
            }
        }
        if self.attachments.is_empty() {
            lines.push("attachments: none".to_string());
        } else {
            lines.push(format!("attachments ({}):", self.attachments.len()));
            for file in &self.attachments {
                lines.push(format!("  - {} ({} bytes, {})", file.name, file.size_bytes, file.content_type));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::ReviewSummary;
    use crate::domain::attachment::{Attachment, AttachmentList};
    use crate::wizard::schema::{FieldSchema, StepSchema, WizardSchema};
    use crate::wizard::values::{FieldValue, FormValues};

    #[test]
    fn summary_lists_visible_filled_fields_per_step() {
        let schema = WizardSchema::new(
            "sample",
            "Sample request",
            vec![
                StepSchema::new(
                    "one",
                    "Basics",
                    vec![
                        FieldSchema::text("title", "Title"),
                        FieldSchema::multi_select("tags", "Tags", &["a", "b"]),
                        FieldSchema::text("empty", "Empty"),
                    ],
                ),
                StepSchema::review("review", "Review"),
            ],
        );
        let mut values = FormValues::new();
        values.insert("title", FieldValue::text("VPN drops"));
        values.insert("tags", FieldValue::list(["a", "b"]));
        let mut attachments = AttachmentList::new();
        attachments.add(Attachment::new("trace.txt", 42));

        let summary = ReviewSummary::assemble(&schema, &values, &attachments);
        assert_eq!(summary.sections.len(), 1);
        let entries = &summary.sections[0].entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].value, "a, b");
        assert_eq!(summary.attachments[0].name, "trace.txt");

        let text = summary.render_text();
        assert!(text.contains("  Title: VPN drops"));
        assert!(text.contains("attachments (1):"));
    }
}
