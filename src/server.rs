//! HTTP server exposing the reference engine.

use crate::config::EngineConfig;
use crate::games::nim::{Move, NimGame, SharedGame};
use crate::remote::{NO_WINNER, RemoveParams, WireGameState, WireInitialPiles, WireMove};
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::MutexGuard;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

type HandlerResult<T> = Result<Json<T>, StatusCode>;

/// Builds the engine router over `game`.
pub fn router(game: SharedGame) -> Router {
    Router::new()
        .route("/start", post(start))
        .route("/remove", post(remove))
        .route("/undo_move", post(undo_move))
        .route("/get_game_state", get(get_game_state))
        .route("/find_optimal_move", get(find_optimal_move))
        .route("/get_initial_piles_for_restart", get(get_initial_piles))
        .route("/is_game_over", get(is_game_over))
        .route("/get_winner", get(get_winner))
        .route("/calculate_nim_sum", get(calculate_nim_sum))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(game)
}

/// Serves a fresh engine until the process is stopped.
#[instrument(skip_all, fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &EngineConfig) -> anyhow::Result<()> {
    let game = NimGame::new(*config.win_rule()).shared();
    let listener = TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        address = %listener.local_addr()?,
        rule = %config.win_rule(),
        "Nim engine listening"
    );
    axum::serve(listener, router(game)).await?;
    Ok(())
}

fn lock(game: &SharedGame) -> Result<MutexGuard<'_, NimGame>, StatusCode> {
    game.lock().map_err(|_| {
        error!("Engine state lock poisoned");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[instrument(skip(game))]
async fn start(State(game): State<SharedGame>, Json(piles): Json<Vec<i64>>) -> HandlerResult<bool> {
    // Negative sizes are a rejected setup, not a malformed request.
    let Ok(piles) = piles
        .into_iter()
        .map(u64::try_from)
        .collect::<Result<Vec<_>, _>>()
    else {
        warn!("Negative pile size");
        return Ok(Json(false));
    };
    Ok(Json(lock(&game)?.start(&piles).is_ok()))
}

#[instrument(skip(game))]
async fn remove(
    State(game): State<SharedGame>,
    Query(params): Query<RemoveParams>,
) -> HandlerResult<bool> {
    let (Ok(pile_index), Ok(count)) = (
        usize::try_from(params.pile_index),
        u64::try_from(params.number_to_remove),
    ) else {
        warn!("Negative move parameters");
        return Ok(Json(false));
    };
    Ok(Json(lock(&game)?.remove(Move::new(pile_index, count)).is_ok()))
}

async fn undo_move(State(game): State<SharedGame>) -> HandlerResult<bool> {
    Ok(Json(lock(&game)?.undo()))
}

async fn get_game_state(State(game): State<SharedGame>) -> HandlerResult<WireGameState> {
    Ok(Json(WireGameState::from(&lock(&game)?.state())))
}

async fn find_optimal_move(State(game): State<SharedGame>) -> HandlerResult<Option<WireMove>> {
    let mov = lock(&game)?.optimal_move();
    Ok(Json(mov.map(|mov| (mov.pile_index, mov.count))))
}

async fn get_initial_piles(State(game): State<SharedGame>) -> HandlerResult<WireInitialPiles> {
    Ok(Json(WireInitialPiles {
        initial_piles: lock(&game)?.initial_piles().to_vec(),
    }))
}

async fn is_game_over(State(game): State<SharedGame>) -> HandlerResult<bool> {
    Ok(Json(lock(&game)?.is_game_over()))
}

async fn get_winner(State(game): State<SharedGame>) -> HandlerResult<i64> {
    Ok(Json(
        lock(&game)?
            .winner()
            .map_or(NO_WINNER, |winner| winner.number()),
    ))
}

async fn calculate_nim_sum(State(game): State<SharedGame>) -> HandlerResult<u64> {
    Ok(Json(lock(&game)?.nim_sum()))
}
