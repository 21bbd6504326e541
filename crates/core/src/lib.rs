//! Headless core of the opsdesk operations portal: request records and their
//! approval chains, the multi-step form wizard, row action gating, list state,
//! session context and configuration.

pub mod config;
pub mod domain;
pub mod errors;
pub mod forms;
pub mod listing;
pub mod notice;
pub mod policy;
pub mod session;
pub mod wizard;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::approval::{ApprovalChain, ApprovalChainError, ApprovalStep, Decision, StepStatus};
pub use domain::attachment::{
    Attachment, AttachmentId, AttachmentList, AttachmentRejection, UploadPolicy,
};
pub use domain::request::{
    CashRequest, ItTicket, MaterialRequest, RecordFacts, Request, RequestId,
};
pub use domain::status::{
    AnyStatus, CashRequestStatus, ItTicketStatus, MaterialRequestStatus, Priority, RequestKind,
    StatusBadge, Tone, WorkflowStatus,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use forms::FormKind;
pub use listing::{
    DateRange, FetchOutcome, FetchTicket, ListFilters, ListQuery, ListView, Page, PageRequest,
    Pagination,
};
pub use notice::{Notice, NoticeLevel};
pub use policy::{ActionAffordance, ActionPolicy, Availability, Role, RowAction};
pub use session::{AuthenticatedUser, Session};
pub use wizard::{
    FieldError, FieldValue, FormValues, ReviewSummary, StepOutcome, SubmissionDraft,
    WizardController, WizardError, WizardSchema,
};
