pub mod citation;
pub mod classification;
pub mod incident;
pub mod log_event;
pub mod metric;
pub mod ops_run;
pub mod outcome;
pub mod reference;
pub mod search;
pub mod ticket;

pub use citation::{Citation, CitationSet, GateDecision};
pub use classification::{Category, Classification, ConfidenceTier, Priority, Severity};
pub use incident::{Incident, IncidentSeverity, IncidentStatus};
pub use log_event::{LogEvent, Spike};
pub use metric::{Metric, MetricStat, MetricsSummary};
pub use ops_run::{OpsRun, RankedRef, RunStatus, StepDetail, StepName, StepRecord};
pub use outcome::{ActionTaken, OutcomeEntities, WorkflowOutcome};
pub use reference::{KbArticle, Resolution};
pub use search::{
    AggregateBucket, AggregateRequest, FieldBoost, Filter, Fuzziness, HighlightRequest,
    KnnQuery, LexicalQuery, RangeBound, SearchHit, SearchQuery, SearchRequest, SearchResponse,
    SortField, StoredDocument, Visibility,
};
pub use ticket::{Ticket, TicketPatch, TicketStatus};
