use rust_decimal::Decimal;

use crate::wizard::{FieldSchema, StepSchema, WizardSchema};

pub fn schema() -> WizardSchema {
    WizardSchema::new(
        "material-request",
        "Request materials",
        vec![
            StepSchema::new(
                "request",
                "Request",
                vec![
                    FieldSchema::text("title", "Title").required(),
                    FieldSchema::select(
                        "department",
                        "Department",
                        &["operations", "finance", "hr", "it", "supply_chain", "sales"],
                    )
                    .required(),
                    FieldSchema::select("priority", "Priority", &["low", "medium", "high", "critical"])
                        .required(),
                    FieldSchema::date("needed_by", "Needed by").required(),
                ],
            ),
            StepSchema::new(
                "items",
                "Items",
                vec![FieldSchema::line_items(
                    "items",
                    "Items",
                    vec![
                        FieldSchema::text("description", "Description").required(),
                        FieldSchema::number("quantity", "Quantity", Some(Decimal::ONE)).required(),
                        FieldSchema::select("unit", "Unit", &["each", "box", "pack", "kg", "litre"])
                            .required(),
                        FieldSchema::number("estimated_unit_cost", "Estimated unit cost", Some(Decimal::ZERO)),
                    ],
                    1,
                )
                .required()],
            ),
            StepSchema::new(
                "justification",
                "Justification & delivery",
                vec![
                    FieldSchema::long_text("justification", "Why is this needed?").required(),
                    FieldSchema::select("delivery.method", "Delivery", &["pickup", "deliver_to_desk", "ship"])
                        .required(),
                    FieldSchema::text("delivery.address", "Delivery address")
                        .required()
                        .visible_when("delivery.method", &["ship"]),
                ],
            ),
            StepSchema::review("review", "Review & submit"),
        ],
    )
}
