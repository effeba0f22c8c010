//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    get, post, put,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pickleball_team_divider::{
    advance_reveal, begin_export, begin_name_request, complete_name_request, export_roster,
    finish_export, generate_teams, reveal_pending, visible_roster, RevealTimer, RosterInput,
    TeamNameGenerator, Tournament, TournamentConfig, TournamentError, TournamentId,
    WordListNameGenerator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data, its reveal timer, and last activity time.
struct TournamentEntry {
    tournament: Tournament,
    reveal: RevealTimer,
    last_activity: Instant,
}

type Tournaments = RwLock<HashMap<TournamentId, TournamentEntry>>;

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<Tournaments>;

type Namer = Data<WordListNameGenerator>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament plus the roster prefix the reveal cursor currently shows.
#[derive(Serialize)]
struct TournamentView<'a> {
    #[serde(flatten)]
    tournament: &'a Tournament,
    visible_teams: Vec<&'a [String]>,
    reveal_pending: bool,
}

impl<'a> TournamentView<'a> {
    fn of(tournament: &'a Tournament) -> Self {
        Self {
            tournament,
            visible_teams: visible_roster(tournament),
            reveal_pending: reveal_pending(tournament),
        }
    }
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    title: Option<String>,
    reveal_delay_secs: Option<f64>,
}

#[derive(Deserialize)]
struct TitleBody {
    title: String,
}

#[derive(Deserialize)]
struct RevealDelayBody {
    reveal_delay_secs: f64,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team index (e.g. /api/tournaments/{id}/teams/{index})
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    index: usize,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::NameRequestInFlight(_) | TournamentError::ExportInProgress => {
            HttpResponse::Conflict().json(body)
        }
        TournamentError::ExportFailed(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

/// Run `f` on the entry for `id` under the write lock, refreshing its activity time.
fn with_entry<F>(state: &Tournaments, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentEntry) -> Result<(), TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match f(entry) {
        Ok(()) => HttpResponse::Ok().json(TournamentView::of(&entry.tournament)),
        Err(e) => {
            log::warn!("Tournament {} rejected request: {:?}", id, e);
            error_response(&e)
        }
    }
}

/// (Re)start the reveal timer for `id` from the tournament's current cursor.
fn arm_reveal(state: &AppState, id: TournamentId, entry: &mut TournamentEntry) {
    let state = state.clone();
    entry.reveal.restart_for(&entry.tournament, move || {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        match g.get_mut(&id) {
            Some(entry) => advance_reveal(&mut entry.tournament),
            None => false,
        }
    });
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pickleball-team-divider",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new tournament (returns it with id and form defaults; client stores id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<CreateTournamentBody>>) -> HttpResponse {
    let mut tournament = Tournament::new(TournamentConfig::default());
    if let Some(body) = body {
        if let Some(title) = &body.title {
            tournament.set_title(title.trim());
        }
        if let Some(delay) = body.reveal_delay_secs {
            if let Err(e) = tournament.set_reveal_delay(delay) {
                return error_response(&e);
            }
        }
    }
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    log::info!("Created tournament {}", id);
    let entry = g.entry(id).or_insert(TournamentEntry {
        tournament,
        reveal: RevealTimer::new(),
        last_activity: Instant::now(),
    });
    HttpResponse::Ok().json(TournamentView::of(&entry.tournament))
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |_| Ok(()))
}

/// Update the tournament title.
#[put("/api/tournaments/{id}/title")]
async fn api_set_title(state: AppState, path: Path<TournamentPath>, body: Json<TitleBody>) -> HttpResponse {
    with_entry(&state, path.id, |entry| {
        entry.tournament.set_title(body.title.trim());
        Ok(())
    })
}

/// Update the reveal delay; a running reveal continues at the new pace.
#[put("/api/tournaments/{id}/reveal-delay")]
async fn api_set_reveal_delay(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RevealDelayBody>,
) -> HttpResponse {
    let id = path.id;
    with_entry(&state, id, |entry| {
        entry.tournament.set_reveal_delay(body.reveal_delay_secs)?;
        arm_reveal(&state, id, entry);
        Ok(())
    })
}

/// Generate teams from the roster form and restart the reveal.
#[post("/api/tournaments/{id}/teams/generate")]
async fn api_generate_teams(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RosterInput>,
) -> HttpResponse {
    let id = path.id;
    with_entry(&state, id, |entry| {
        generate_teams(&mut entry.tournament, &body, &mut rand::thread_rng())?;
        arm_reveal(&state, id, entry);
        Ok(())
    })
}

/// Generate a display name for one team. Other teams can be named concurrently.
#[post("/api/tournaments/{id}/teams/{index}/name")]
async fn api_generate_team_name(
    state: AppState,
    namer: Namer,
    path: Path<TournamentTeamPath>,
) -> HttpResponse {
    let (ticket, title) = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let entry = match g.get_mut(&path.id) {
            Some(e) => e,
            None => return not_found(),
        };
        entry.last_activity = Instant::now();
        let t = &mut entry.tournament;
        match begin_name_request(t, path.index) {
            Ok(ticket) => (ticket, t.config.title.clone()),
            Err(e) => return error_response(&e),
        }
    };

    let result = namer.generate(&title).await;

    with_entry(&state, path.id, |entry| {
        complete_name_request(&mut entry.tournament, ticket, result);
        Ok(())
    })
}

/// Render the full roster as PNG and offer it as a download.
#[get("/api/tournaments/{id}/export")]
async fn api_export_image(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    let sheet = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let entry = match g.get_mut(&id) {
            Some(e) => e,
            None => return not_found(),
        };
        entry.last_activity = Instant::now();
        match begin_export(&mut entry.tournament) {
            Ok(sheet) => sheet,
            Err(e) => return error_response(&e),
        }
    };

    let result = web::block(move || export_roster(&sheet)).await;

    if let Ok(mut g) = state.write() {
        if let Some(entry) = g.get_mut(&id) {
            finish_export(&mut entry.tournament);
        }
    }

    match result {
        Ok(Ok(image)) => {
            log::info!(
                "Exported roster of tournament {} ({}x{}, {} bytes)",
                id,
                image.width,
                image.height,
                image.png.len()
            );
            HttpResponse::Ok()
                .content_type("image/png")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(image.filename.to_string())],
                })
                .body(image.png)
        }
        Ok(Err(e)) => error_response(&e),
        Err(e) => error_response(&TournamentError::ExportFailed(e.to_string())),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(HashMap::new()));
    let namer: Namer = Data::new(WordListNameGenerator);

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(namer.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_set_title)
            .service(api_set_reveal_delay)
            .service(api_generate_teams)
            .service(api_generate_team_name)
            .service(api_export_image)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
