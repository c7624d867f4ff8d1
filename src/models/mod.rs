pub mod classification;
pub mod entities;
pub mod message;
pub mod schedule;
pub mod scoring_table;

pub use classification::{
    ClassificationDecision, LeadStatus, LlmVerdict, RuleScoreResult, TriageReport,
};
pub use entities::{ExtractedEntities, SourceType};
pub use message::InboundMessage;
pub use schedule::{
    BusyInterval, ComposedReply, ProposedWindow, QuietHours, RequestedWindow,
    SchedulingExtraction, SchedulingPreferences, WorkHours,
};
pub use scoring_table::{KeywordSet, ScoringRules, ScoringTable, SignalWeights};
