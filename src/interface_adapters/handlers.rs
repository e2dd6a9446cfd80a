use crate::domain::errors::LinkError;
use crate::interface_adapters::protocol::{
    ErrorResponse, GenerateLinkCodeRequest, GenerateLinkCodeResponse,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::interface_adapters::utils::codes::RandomCodeGenerator;
use crate::use_cases::issue_code::IssueCodeUseCase;
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

// Handler for minting a link code for a player.
#[tracing::instrument(name = "generate_link_code", skip_all)]
pub async fn generate_link_code(
    State(state): State<AppState>,
    payload: Result<Json<GenerateLinkCodeRequest>, JsonRejection>,
) -> Result<Json<GenerateLinkCodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    // An unreadable body carries no player id either.
    let player_id = match payload {
        Ok(Json(body)) => body.play_fab_id.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected link code request body");
            String::new()
        }
    };

    let use_case = IssueCodeUseCase {
        clock: SystemClock,
        generator: RandomCodeGenerator,
        store: state.link_store(),
        ttl: state.code_ttl,
    };

    let issued = use_case
        .execute(&player_id)
        .await
        .map_err(map_link_error)?;

    // Outstanding codes redeem an account, so they stay out of info logs.
    tracing::debug!(code = %issued.code, %player_id, "link code minted");
    tracing::info!(%player_id, expires_at = ?issued.expires_at, "link code issued");

    Ok(Json(GenerateLinkCodeResponse { code: issued.code }))
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn map_link_error(err: LinkError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        LinkError::InvalidRequest => {
            error_response(StatusCode::BAD_REQUEST, "Missing PlayFab ID")
        }
        LinkError::CodeSpaceExhausted { attempts } => {
            tracing::error!(attempts, "link code space exhausted");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Could not allocate a link code",
            )
        }
        LinkError::StorageFailure
        | LinkError::MissingCodeArgument
        | LinkError::UnknownCode
        | LinkError::DownstreamLinkFailure => {
            tracing::error!(error = %err, "link code issuance failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage error")
        }
    }
}
