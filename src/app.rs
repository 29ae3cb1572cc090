use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, Error,
};

use crate::auth::AuthMiddleware;
use crate::routes;
use crate::state::AppState;

/// Builds the application: CORS and request logging around an `/api` scope
/// guarded by [`AuthMiddleware`]. Shared by the binary and the integration
/// tests.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
> {
    App::new()
        .app_data(state)
        .wrap(Logger::default())
        .wrap(routes::cors())
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .configure(routes::config),
        )
}
