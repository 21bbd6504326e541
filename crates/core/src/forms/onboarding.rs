use crate::wizard::{FieldSchema, StepSchema, WizardSchema};

/// Employee onboarding, submitted by HR to `/hr/employees`.
pub fn schema() -> WizardSchema {
    WizardSchema::new(
        "onboarding",
        "Onboard an employee",
        vec![
            StepSchema::new(
                "personal",
                "Personal information",
                vec![
                    FieldSchema::text("first_name", "First name").required(),
                    FieldSchema::text("last_name", "Last name").required(),
                    FieldSchema::text("email", "Work email").required(),
                    FieldSchema::text("phone", "Phone"),
                    FieldSchema::date("date_of_birth", "Date of birth"),
                ],
            ),
            StepSchema::new(
                "employment",
                "Employment",
                vec![
                    FieldSchema::select(
                        "department",
                        "Department",
                        &["operations", "finance", "hr", "it", "supply_chain", "sales"],
                    )
                    .required(),
                    FieldSchema::text("position", "Position").required(),
                    FieldSchema::select(
                        "employment_type",
                        "Employment type",
                        &["full_time", "part_time", "contract", "intern"],
                    )
                    .required(),
                    FieldSchema::date("contract_end", "Contract end date")
                        .required()
                        .visible_when("employment_type", &["contract", "intern"]),
                    FieldSchema::date("start_date", "Start date").required(),
                    FieldSchema::text("supervisor_id", "Supervisor id"),
                    FieldSchema::select(
                        "role",
                        "Portal role",
                        &["employee", "supervisor", "finance", "it_support", "supply_chain", "hr_admin"],
                    )
                    .required(),
                ],
            ),
            StepSchema::new(
                "emergency",
                "Emergency contact",
                vec![
                    FieldSchema::text("emergency_contact.name", "Name").required(),
                    FieldSchema::select(
                        "emergency_contact.relationship",
                        "Relationship",
                        &["spouse", "parent", "sibling", "friend", "other"],
                    )
                    .required(),
                    FieldSchema::text("emergency_contact.phone", "Phone").required(),
                ],
            ),
            StepSchema::review("review", "Review & submit"),
        ],
    )
}
