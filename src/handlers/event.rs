use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::dto::{NewEventDto, UpdateEventDto};
use crate::errors::ApiError;
use crate::service::{self, auth::UserAuthData, mail::Mailer};
use crate::PGPool;

#[post("")]
pub async fn create(
    user: UserAuthData,
    new_event_dto: web::Json<NewEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event =
        service::event::create(&user, new_event_dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(event))
}

#[get("")]
pub async fn get_all(pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let events = service::event::get_all(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event = service::event::get_by_id(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[put("/{id}")]
pub async fn update(
    user: UserAuthData,
    id: web::Path<Uuid>,
    update_event_dto: web::Json<UpdateEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event = service::event::update(
        id.into_inner(),
        update_event_dto.into_inner(),
        &user,
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(event))
}

#[delete("/{id}")]
pub async fn delete_event(
    user: UserAuthData,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    service::event::delete(id.into_inner(), &user, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Event deleted successfully" })))
}

#[post("/{id}/rsvp")]
pub async fn rsvp(
    user: UserAuthData,
    id: web::Path<Uuid>,
    mailer: web::Data<Mailer>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    service::event::rsvp(
        id.into_inner(),
        &user,
        mailer.get_ref(),
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "RSVP successful" })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(get_all)
        .service(rsvp)
        .service(get_by_id)
        .service(update)
        .service(delete_event);
}
