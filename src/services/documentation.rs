use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Rio Links Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::event_stream,
        crate::routes::players::list_players,
        crate::routes::players::create_player,
        crate::routes::round::start_round,
        crate::routes::round::current_round,
        crate::routes::round::scorecard,
        crate::routes::round::set_score,
        crate::routes::round::navigate,
        crate::routes::round::finalize_round,
        crate::routes::round::discard_round,
        crate::routes::rounds::history,
        crate::routes::rounds::edit_round,
        crate::routes::rounds::delete_round,
        crate::routes::stats::player_analytics,
        crate::routes::stats::leaderboards,
        crate::routes::stats::course_difficulty,
        crate::routes::backup::export_csv,
        crate::routes::backup::export_json,
        crate::routes::backup::import,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisiblePhase,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::PlayerSummary,
            crate::dto::round::StartRoundRequest,
            crate::dto::round::SetScoreRequest,
            crate::dto::round::NavigateRequest,
            crate::dto::round::TotalsDto,
            crate::dto::round::RoundPlayerView,
            crate::dto::round::RoundView,
            crate::dto::round::ScoreMark,
            crate::dto::round::ScorecardCell,
            crate::dto::round::ScorecardRow,
            crate::dto::round::ScorecardHole,
            crate::dto::round::ScorecardView,
            crate::dto::round::PlayerResultDto,
            crate::dto::round::RoundSummaryResponse,
            crate::dto::round::HistoryPlayerDto,
            crate::dto::round::HistoryEntry,
            crate::dto::stats::TimelinePointDto,
            crate::dto::stats::AnalyticsDto,
            crate::dto::stats::PlayerAnalyticsResponse,
            crate::dto::stats::LeaderboardEntryDto,
            crate::dto::stats::LeaderboardsResponse,
            crate::dto::stats::HoleDifficultyDto,
            crate::dto::backup::ImportSummary,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::PhaseChangedEvent,
            crate::dto::sse::RoundUpdatedEvent,
            crate::dto::sse::RoundFinalizedEvent,
            crate::dto::sse::CollectionChangedEvent,
            crate::dto::sse::DataReloadedEvent,
            crate::state::model::Course,
            crate::state::session::Direction,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "players", description = "Player roster"),
        (name = "round", description = "Working round: scoring, navigation, finalize"),
        (name = "rounds", description = "Persisted round history"),
        (name = "stats", description = "Handicaps, leaderboards and course difficulty"),
        (name = "backup", description = "CSV/JSON export and JSON import"),
    )
)]
pub struct ApiDoc;
