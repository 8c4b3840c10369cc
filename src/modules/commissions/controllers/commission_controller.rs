// HTTP handlers for commission calculations
//
// Endpoints:
// - POST   /negociacoes/{id}/calculos-comissao            create with schedule
// - GET    /negociacoes/{id}/calculos-comissao?status=    list
// - GET    /negociacoes/{id}/calculos-comissao/{cid}      get with installments
// - PUT    /negociacoes/{id}/calculos-comissao/{cid}      bulk update
// - PATCH  /negociacoes/{id}/calculos-comissao/{cid}/status
// - DELETE /negociacoes/{id}/calculos-comissao/{cid}
// - GET    /consultores/{id}/calculos-comissao

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::core::Result;
use crate::modules::commissions::models::{
    CalculationStatusUpdate, CalculationUpdate, CreateCalculationRequest,
};
use crate::modules::commissions::services::CommissionService;

/// Query parameters for listing calculations
#[derive(Debug, Deserialize)]
pub struct ListCalculationsQuery {
    pub status: Option<String>,
}

/// POST /negociacoes/{negotiation_id}/calculos-comissao
///
/// # Returns
/// - 201: Calculation with its generated installments
/// - 400: Malformed payload or unknown payment mode
pub async fn create_calculation(
    service: web::Data<CommissionService>,
    path: web::Path<i64>,
    request: web::Json<CreateCalculationRequest>,
) -> Result<HttpResponse> {
    let created = service
        .create(path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// GET /negociacoes/{negotiation_id}/calculos-comissao
pub async fn list_calculations(
    service: web::Data<CommissionService>,
    path: web::Path<i64>,
    query: web::Query<ListCalculationsQuery>,
) -> Result<HttpResponse> {
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let calculations = service.list(path.into_inner(), status).await?;

    Ok(HttpResponse::Ok().json(calculations))
}

/// GET /negociacoes/{negotiation_id}/calculos-comissao/{calculation_id}
pub async fn get_calculation(
    service: web::Data<CommissionService>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (negotiation_id, calculation_id) = path.into_inner();
    let calculation = service
        .get_for_negotiation(negotiation_id, &calculation_id)
        .await?;

    Ok(HttpResponse::Ok().json(calculation))
}

/// PUT /negociacoes/{negotiation_id}/calculos-comissao/{calculation_id}
pub async fn update_calculation(
    service: web::Data<CommissionService>,
    path: web::Path<(i64, String)>,
    request: web::Json<CalculationUpdate>,
) -> Result<HttpResponse> {
    let (negotiation_id, calculation_id) = path.into_inner();
    let calculation = service
        .update(negotiation_id, &calculation_id, request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(calculation))
}

/// PATCH /negociacoes/{negotiation_id}/calculos-comissao/{calculation_id}/status
///
/// # Returns
/// - 200: Updated calculation
/// - 400: Empty status
/// - 404: Calculation not found in this negotiation
pub async fn update_calculation_status(
    service: web::Data<CommissionService>,
    path: web::Path<(i64, String)>,
    request: web::Json<CalculationStatusUpdate>,
) -> Result<HttpResponse> {
    let (negotiation_id, calculation_id) = path.into_inner();
    let calculation = service
        .update_status(negotiation_id, &calculation_id, request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(calculation))
}

/// DELETE /negociacoes/{negotiation_id}/calculos-comissao/{calculation_id}
pub async fn delete_calculation(
    service: web::Data<CommissionService>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (negotiation_id, calculation_id) = path.into_inner();
    service
        .delete(negotiation_id, &calculation_id, Utc::now())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /consultores/{consultant_id}/calculos-comissao
pub async fn list_consultant_calculations(
    service: web::Data<CommissionService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let calculations = service.list_by_consultant(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(calculations))
}

/// Configure commission calculation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/negociacoes/{negotiation_id}/calculos-comissao")
            .route("", web::post().to(create_calculation))
            .route("", web::get().to(list_calculations))
            .route("/{calculation_id}", web::get().to(get_calculation))
            .route("/{calculation_id}", web::put().to(update_calculation))
            .route("/{calculation_id}", web::delete().to(delete_calculation))
            .route(
                "/{calculation_id}/status",
                web::patch().to(update_calculation_status),
            ),
    )
    .route(
        "/consultores/{consultant_id}/calculos-comissao",
        web::get().to(list_consultant_calculations),
    );
}
