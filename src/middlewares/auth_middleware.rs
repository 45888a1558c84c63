//! JWT 인증 미들웨어
//!
//! 보호된 스코프에 적용하면 모든 요청에서 `SessionManager::authenticate_request`를
//! 실행하고, 성공 시 [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)를
//! Request Extensions에 저장합니다. 실패하면 핸들러까지 가지 않고 401을 응답합니다.
//!
//! `SessionManager`는 `App::app_data(web::Data<SessionManager>)`로 등록되어 있어야 합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::middlewares::auth_inner::AuthMiddlewareService;

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthMiddleware;

impl AuthMiddleware {
    pub fn required() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}
