use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::Claims;
use crate::error::AppError;

/// The identity `AuthMiddleware` resolved for the current request.
///
/// Handlers take it as an argument and pass it on to the services
/// explicitly; nothing downstream reads the request to find the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

impl FromRequest for Caller {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Caller>().cloned() {
            Some(caller) => ready(Ok(caller)),
            None => {
                let err = AppError::Unauthorized("Access denied".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_caller_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Caller {
            id: 123,
            username: "frank".to_string(),
            roles: vec![],
        });

        let mut payload = Payload::None;
        let caller = Caller::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(caller.id, 123);
        assert_eq!(caller.username, "frank");
    }

    #[actix_rt::test]
    async fn test_caller_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = Caller::from_request(&req, &mut payload).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
