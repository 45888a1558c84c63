//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::errors::AppError;
use crate::services::auth::SessionManager;

pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let Some(sessions) = req.app_data::<web::Data<SessionManager>>().cloned() else {
                log::error!("❌ SessionManager가 app_data에 등록되지 않았습니다");
                let response = HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "Internal server error" }));
                let (req, _) = req.into_parts();
                return Ok(ServiceResponse::new(req, response).map_into_right_body());
            };

            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            match sessions.authenticate_request(authorization).await {
                Ok(user) => {
                    log::debug!("인증 성공: 사용자 ID {} ({})", user.user_id, user.role);
                    req.extensions_mut().insert(user);
                }
                Err(AppError::AuthenticationError(reason)) => {
                    log::warn!("인증 실패: {}", reason);
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "authentication_required",
                        "message": "유효한 인증 토큰이 필요합니다"
                    }));
                    let (req, _) = req.into_parts();
                    return Ok(ServiceResponse::new(req, response).map_into_right_body());
                }
                Err(other) => {
                    // 저장소 장애 등은 분류된 상태 코드 그대로 응답
                    let (req, _) = req.into_parts();
                    let response = actix_web::ResponseError::error_response(&other);
                    return Ok(ServiceResponse::new(req, response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
