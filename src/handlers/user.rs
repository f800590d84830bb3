use actix_web::{get, put, web, HttpResponse};

use crate::dto::UpdateUserDto;
use crate::errors::ApiError;
use crate::service::{self, auth::UserAuthData};
use crate::PGPool;

#[get("/me")]
pub async fn me(
    user: UserAuthData,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let view = service::user::current(user.user_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[put("/me")]
pub async fn update_me(
    user: UserAuthData,
    dto: web::Json<UpdateUserDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let view =
        service::user::update_self(user.user_id, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("")]
pub async fn get_all(
    _user: UserAuthData,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let users = service::user::get_all(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(me).service(update_me).service(get_all);
}
