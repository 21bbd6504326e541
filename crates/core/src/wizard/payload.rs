use serde_json::{json, Map, Value};

use crate::domain::attachment::AttachmentList;
use crate::wizard::schema::WizardSchema;
use crate::wizard::validation::is_visible;
use crate::wizard::values::{insert_nested, FormValues};

/// Gathers the values of every step into the create-call body.
///
/// Dotted keys become nested objects. Fields hidden by their governing field
/// are left out even when the draft still remembers a value for them.
/// Attachment metadata goes under `attachments`, one entry per queued file.
pub fn build_payload(
    schema: &WizardSchema,
    values: &FormValues,
    attachments: &AttachmentList,
) -> Value {
    let mut body = Map::new();

    for (_, field) in schema.fields() {
        if !is_visible(field, values) {
            continue;
        }
        let Some(value) = values.get(&field.key).filter(|value| !value.is_blank()) else {
            continue;
        };
        insert_nested(&mut body, &field.key, value.to_json());
    }

    let files = attachments
        .iter()
        .map(|attachment| {
            json!({
                "id": attachment.id,
                "name": attachment.name,
                "size": attachment.size_bytes,
                "type": attachment.content_type,
            })
        })
        .collect();
    body.insert("attachments".to_string(), Value::Array(files));

    Value::Object(body)
}
