use actix_web::{post, web, HttpResponse};
use log::info;

use crate::dto::{LoginDto, RefreshDto, RegisterDto};
use crate::errors::ApiError;
use crate::{service, PGPool};

#[post("/register")]
pub async fn register(
    dto: web::Json<RegisterDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let user = service::user::register(dto.into_inner(), pool_state.get_ref()).await?;
    info!("registered user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

#[post("/login")]
pub async fn login(
    dto: web::Json<LoginDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let tokens = service::user::login(dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/refresh")]
pub async fn refresh(dto: web::Json<RefreshDto>) -> Result<HttpResponse, ApiError> {
    let tokens = service::user::refresh(dto.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(refresh);
}
