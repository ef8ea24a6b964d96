use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use crate::error::ValidationError;
use crate::rules::{ConfigRecord, FaultyTech, Field, SwapOutcome};
use crate::store::SavedRuns;

pub const SESSION_COOKIE: &str = "faulty-tech";
const CONFIG_KEY: &str = "config";

// Saved runs are shared, every session keeps its own configuration in its cookie
pub struct AppState {
    pub saved_runs: Mutex<SavedRuns>,
}

impl AppState {
    pub fn new(saved_runs: SavedRuns) -> Self {
        Self { saved_runs: Mutex::new(saved_runs) }
    }

    fn runs(&self) -> Result<MutexGuard<'_, SavedRuns>> {
        self.saved_runs
            .lock()
            .map_err(|_| error::ErrorInternalServerError("saved configurations are unavailable"))
    }
}

#[derive(Deserialize)]
pub struct SetFieldRequest {
    value: Value,
}

#[derive(Serialize)]
pub struct PickResponse {
    groups: Vec<Vec<u8>>,
    nothing_to_swap: bool,
}

#[derive(Serialize)]
pub struct RunsResponse {
    names: Vec<String>,
}

/// The session's configuration. A fresh session starts from the saved run
/// when exactly one exists, otherwise from the defaults.
fn session_tech(session: &Session, state: &AppState) -> Result<FaultyTech> {
    let mut tech = FaultyTech::new();
    if let Some(record) = session.get::<ConfigRecord>(CONFIG_KEY)? {
        // the cookie is encrypted, so only records this server wrote come back
        tech.load_record(record);
    } else if let Some((name, record)) = state.runs()?.only() {
        debug!(name, "fresh session starts from the only saved configuration");
        tech.load_record(record);
    }
    Ok(tech)
}

fn keep_tech(session: &Session, tech: &FaultyTech) -> Result<HttpResponse> {
    let record = tech.to_record();
    session.insert(CONFIG_KEY, record)?;
    Ok(HttpResponse::Ok().json(record))
}

fn rejected(e: ValidationError) -> HttpResponse {
    HttpResponse::UnprocessableEntity()
        .json(serde_json::json!({"success": false, "error": e.to_string()}))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .json(serde_json::json!({"success": false, "error": "No such configuration"}))
}

async fn get_config(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let tech = session_tech(&session, &state)?;
    Ok(HttpResponse::Ok().json(tech.to_record()))
}

async fn set_field(
    field: web::Path<String>,
    req: web::Json<SetFieldRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let field = match field.parse::<Field>() {
        Ok(field) => field,
        Err(e) => return Ok(rejected(e)),
    };
    let mut tech = session_tech(&session, &state)?;
    match tech.set_field(field, &req.value) {
        Ok(()) => keep_tech(&session, &tech),
        Err(e) => Ok(rejected(e)),
    }
}

async fn reset(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut tech = session_tech(&session, &state)?;
    tech.reset();
    keep_tech(&session, &tech)
}

async fn toggle_party(
    slot: web::Path<u8>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut tech = session_tech(&session, &state)?;
    match tech.toggle_party_slot(slot.into_inner()) {
        Ok(()) => keep_tech(&session, &tech),
        Err(e) => Ok(rejected(e)),
    }
}

async fn toggle_box(
    path: web::Path<(u32, u32)>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (box_number, slot) = path.into_inner();
    let mut tech = session_tech(&session, &state)?;
    match tech.toggle_box_slot(box_number, slot) {
        Ok(()) => keep_tech(&session, &tech),
        Err(e) => Ok(rejected(e)),
    }
}

async fn pick(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let tech = session_tech(&session, &state)?;
    let outcome = tech.pick_swaps().map_err(error::ErrorInternalServerError)?;
    let nothing_to_swap = outcome == SwapOutcome::NothingToSwap;
    Ok(HttpResponse::Ok().json(PickResponse {
        groups: outcome.into_plan().groups,
        nothing_to_swap,
    }))
}

async fn list_runs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let runs = state.runs()?;
    Ok(HttpResponse::Ok().json(RunsResponse {
        names: runs.names().map(str::to_string).collect(),
    }))
}

async fn save_run(
    name: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let record = session_tech(&session, &state)?.to_record();
    let mut runs = state.runs()?;
    let changed = runs.insert(&name, record);
    if changed {
        runs.save().map_err(error::ErrorInternalServerError)?;
        info!(name = %name, "configuration saved");
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "changed": changed})))
}

async fn load_run(
    name: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let record = state.runs()?.get(&name);
    match record {
        Some(record) => {
            let mut tech = session_tech(&session, &state)?;
            tech.load_record(record);
            keep_tech(&session, &tech)
        }
        None => Ok(not_found()),
    }
}

async fn delete_run(name: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut runs = state.runs()?;
    if runs.remove(&name).is_none() {
        return Ok(not_found());
    }
    runs.save().map_err(error::ErrorInternalServerError)?;
    info!(name = %name, "configuration removed");
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(false)
        .build()
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/config", web::get().to(get_config))
        .route("/api/config/{field}", web::post().to(set_field))
        .route("/api/reset", web::post().to(reset))
        .route("/api/party/{slot}", web::post().to(toggle_party))
        .route("/api/box/{box}/{slot}", web::post().to(toggle_box))
        .route("/api/pick", web::post().to(pick))
        .route("/api/runs", web::get().to(list_runs))
        .route("/api/runs/{name}", web::post().to(save_run))
        .route("/api/runs/{name}", web::delete().to(delete_run))
        .route("/api/runs/{name}/load", web::post().to(load_run));
}

pub async fn start_server(bind: &str, port: u16, saved_runs: SavedRuns) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(saved_runs));
    let key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind((bind, port))?
    .run()
    .await
}
