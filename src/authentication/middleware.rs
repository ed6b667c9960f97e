use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::web;
use actix_web::HttpMessage;
use actix_web::HttpResponse;
use actix_web_lab::middleware::Next;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authentication::basic_authentication;
use crate::authentication::validate_api_key;
use crate::authentication::validate_credentials;
use crate::authentication::AuthError;
use crate::authentication::BasicAuthError;
use crate::configuration::AuthScheme;
use crate::configuration::AuthSettings;
use crate::utils::error_500;
use crate::utils::ErrorBody;

/// Identity resolved by the API-key check, attached to the request for
/// handlers that care (none of the snippet handlers do; they stay unaware of
/// authentication).
#[derive(Clone)]
pub struct AuthenticatedKey(pub Uuid);

/// Identity resolved by the Basic Auth check.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// 401 with a structured body; `realm` additionally sets a
/// `WWW-Authenticate: Basic` challenge. The standard requires the challenge
/// whenever the client never presented (or garbled) Basic credentials, so
/// that browsers and http libraries know to prompt; it is deliberately absent
/// when a well-formed header simply failed validation.
fn unauthorized(
    cause: anyhow::Error,
    body: ErrorBody,
    realm: Option<&str>,
) -> actix_web::Error {
    let mut resp = HttpResponse::Unauthorized();
    if let Some(realm) = realm {
        resp.insert_header((header::WWW_AUTHENTICATE, format!(r#"Basic realm="{realm}""#)));
    }
    InternalError::from_response(cause, resp.json(body)).into()
}

/// Since every write endpoint performs the same credential check, the check
/// lives in a middleware wrapped around exactly those endpoints at
/// registration time (see `startup::run`), rather than inline in each
/// handler. A handler added behind the wrapper cannot forget the check; a
/// rejected request never reaches the handler at all.
///
/// For more details, refer to the documentation for
/// `actix_web_lab::middleware::from_fn`
pub async fn require_write_credentials(
    mut req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let pool = req
        .app_data::<web::Data<SqlitePool>>()
        .cloned()
        .ok_or_else(|| error_500(anyhow::anyhow!("no database pool in app data")))?;
    let auth = req
        .app_data::<web::Data<AuthSettings>>()
        .cloned()
        .ok_or_else(|| error_500(anyhow::anyhow!("no auth settings in app data")))?;

    match auth.scheme {
        AuthScheme::ApiKey => {
            let token = match req.headers().get("X-API-Key").and_then(|v| v.to_str().ok()) {
                Some(t) => t.to_owned(),
                None => {
                    return Err(unauthorized(
                        anyhow::anyhow!("no X-API-Key header"),
                        ErrorBody::with_message(
                            "API key required",
                            "Please provide an API key in the X-API-Key header",
                        ),
                        None,
                    ))
                }
            };
            match validate_api_key(&token, &pool).await {
                Ok(Some(key)) => {
                    req.extensions_mut().insert(AuthenticatedKey(key.id));
                    next.call(req).await
                }
                Ok(None) => Err(unauthorized(
                    anyhow::anyhow!("unknown or inactive API key"),
                    ErrorBody::with_message(
                        "Invalid API key",
                        "The provided API key is invalid or inactive",
                    ),
                    None,
                )),
                Err(e) => Err(error_500(e)),
            }
        }

        AuthScheme::Basic => {
            let creds = match basic_authentication(req.headers()) {
                Ok(creds) => creds,
                Err(e @ BasicAuthError::MissingHeader) => {
                    return Err(unauthorized(
                        e.into(),
                        ErrorBody::with_message(
                            "Authentication required",
                            "Please provide credentials via HTTP Basic Auth",
                        ),
                        Some(&auth.realm),
                    ))
                }
                Err(e @ BasicAuthError::Malformed(_)) => {
                    return Err(unauthorized(
                        e.into(),
                        ErrorBody::with_message(
                            "Invalid authorization header",
                            "Expected 'Basic base64(username:password)'",
                        ),
                        Some(&auth.realm),
                    ))
                }
            };

            let username = creds.username.clone();
            match validate_credentials(creds, &pool).await {
                Ok(user_id) => {
                    req.extensions_mut()
                        .insert(AuthenticatedUser { user_id, username });
                    next.call(req).await
                }
                // note: no WWW-Authenticate here -- the header itself was
                // well-formed, the credentials just didn't check out
                Err(AuthError::InvalidCredentials(e)) => Err(unauthorized(
                    e,
                    ErrorBody::new("Invalid credentials"),
                    None,
                )),
                Err(AuthError::UnexpectedError(e)) => Err(error_500(e)),
            }
        }
    }
}
