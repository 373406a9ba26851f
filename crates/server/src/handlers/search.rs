//! Patent search and research-gap analysis against the Logic Mill GraphQL
//! collaborator.

use std::sync::Arc;

use tracing::info;

use venturescope_protocol::{GapAnalysis, ServerMessage};

use crate::handlers::{collaborator_failure, HandlerError};
use crate::scoring;
use crate::state::{now_rfc3339, AppState};
use crate::transcript::{self, TranscriptEntry};

const MIN_RESULTS: u32 = 1;
const MAX_RESULTS: u32 = 50;

/// Number of records per corpus consulted for gap scoring
const GAP_SAMPLE_SIZE: u32 = 5;

pub async fn handle_patent_search(
    state: &Arc<AppState>,
    query: String,
    limit: u32,
) -> Result<ServerMessage, HandlerError> {
    let limit = limit.clamp(MIN_RESULTS, MAX_RESULTS);
    let results = state
        .collaborators
        .search
        .search_patents(&query, limit)
        .await
        .map_err(collaborator_failure("Failed to search patents"))?;

    info!(
        component = "search",
        event = "search.patents.completed",
        results = results.len(),
        "patent search completed"
    );

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "patent_search".to_string(),
            timestamp: now_rfc3339(),
            input: serde_json::json!({ "query": query, "limit": limit }),
            output: serde_json::json!({ "results": results.len() }),
        },
    );

    Ok(ServerMessage::PatentSearchResponse { results })
}

/// Fetch patents and publications concurrently, then score the gap from
/// keyword overlap with the supplied description.
pub async fn handle_research_gap(
    state: &Arc<AppState>,
    description: String,
) -> Result<ServerMessage, HandlerError> {
    let (patents, publications) = tokio::join!(
        state
            .collaborators
            .search
            .search_patents(&description, GAP_SAMPLE_SIZE),
        state
            .collaborators
            .search
            .search_publications(&description, GAP_SAMPLE_SIZE),
    );
    let patents = patents.map_err(collaborator_failure("Failed to analyze research gap"))?;
    let publications =
        publications.map_err(collaborator_failure("Failed to analyze research gap"))?;

    let research_gap = scoring::research_gap_score(&description, &patents, &publications);
    let recommendations = scoring::gap_recommendations(&patents, &publications);

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "research_gap_analysis".to_string(),
            timestamp: now_rfc3339(),
            input: serde_json::json!({ "description": description }),
            output: serde_json::json!({
                "research_gap": research_gap,
                "patents": patents.len(),
                "publications": publications.len(),
            }),
        },
    );

    Ok(ServerMessage::ResearchGapAnalysisResponse {
        analysis: GapAnalysis {
            related_patents: patents,
            related_publications: publications,
            research_gap,
            recommendations,
        },
    })
}
