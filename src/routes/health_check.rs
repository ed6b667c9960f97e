use actix_web::HttpResponse;

/// `GET /health_check`. Deliberately db-free: this answers "is the process
/// accepting requests", not "is the database reachable".
// note: viewing the (empty) http response requires `curl -v`
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
