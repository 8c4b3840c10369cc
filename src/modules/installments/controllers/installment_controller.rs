// HTTP handlers for installment endpoints
//
// Endpoints:
// - GET    /calculos-comissao/{cid}/parcelas   list by due date
// - POST   /calculos-comissao/{cid}/parcelas   add one installment
// - GET    /parcelas/{pid}
// - PUT    /parcelas/{pid}                     full replacement
// - DELETE /parcelas/{pid}
// - PATCH  /parcelas/{pid}/status
// - POST   /parcelas/{pid}/anexo               set attachment
// - DELETE /parcelas/{pid}/anexo               clear attachment
// - POST   /parcelas/{pid}/nota-fiscal         set invoice
// - DELETE /parcelas/{pid}/nota-fiscal         clear invoice
// - GET    /consultores/{id}/parcelas

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::core::Result;
use crate::modules::installments::models::{InstallmentStatus, InstallmentUpdate, NewInstallment};
use crate::modules::installments::services::InstallmentService;

/// Request for PATCH /parcelas/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Request for POST /parcelas/{id}/anexo
#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    #[serde(rename = "anexo", default)]
    pub attachment: Option<String>,
}

/// Request for POST /parcelas/{id}/nota-fiscal
#[derive(Debug, Deserialize)]
pub struct InvoiceRequest {
    #[serde(rename = "notaFiscal", default)]
    pub invoice: Option<String>,
}

/// GET /calculos-comissao/{calculation_id}/parcelas
pub async fn list_installments(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let installments = service.list(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(installments))
}

/// POST /calculos-comissao/{calculation_id}/parcelas
///
/// # Returns
/// - 201: Created installment; the calculation total is recomputed
/// - 404: Calculation not found
pub async fn create_installment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
    request: web::Json<NewInstallment>,
) -> Result<HttpResponse> {
    let installment = service
        .create_for_calculation(&path.into_inner(), request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(installment))
}

/// GET /parcelas/{installment_id}
pub async fn get_installment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let installment = service.get(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// PATCH /parcelas/{installment_id}/status
///
/// # Returns
/// - 200: Updated installment
/// - 400: Missing or unknown status
/// - 409: Installment already paid
pub async fn update_installment_status(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse> {
    let status: InstallmentStatus = request.status.parse()?;
    let installment = service
        .update_status(&path.into_inner(), status, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// PUT /parcelas/{installment_id}
pub async fn update_installment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
    request: web::Json<InstallmentUpdate>,
) -> Result<HttpResponse> {
    let installment = service
        .update(&path.into_inner(), request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// DELETE /parcelas/{installment_id}
pub async fn delete_installment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete(&path.into_inner(), Utc::now()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /parcelas/{installment_id}/anexo
pub async fn set_attachment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
    request: web::Json<AttachmentRequest>,
) -> Result<HttpResponse> {
    let installment = service
        .set_attachment(&path.into_inner(), request.into_inner().attachment, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// DELETE /parcelas/{installment_id}/anexo
pub async fn clear_attachment(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let installment = service
        .set_attachment(&path.into_inner(), None, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// POST /parcelas/{installment_id}/nota-fiscal
pub async fn set_invoice(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
    request: web::Json<InvoiceRequest>,
) -> Result<HttpResponse> {
    let installment = service
        .set_invoice(&path.into_inner(), request.into_inner().invoice, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// DELETE /parcelas/{installment_id}/nota-fiscal
pub async fn clear_invoice(
    service: web::Data<InstallmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let installment = service
        .set_invoice(&path.into_inner(), None, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(installment))
}

/// GET /consultores/{consultant_id}/parcelas
pub async fn list_consultant_installments(
    service: web::Data<InstallmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let installments = service.list_by_consultant(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(installments))
}

/// Configure installment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/calculos-comissao/{calculation_id}/parcelas")
            .route("", web::get().to(list_installments))
            .route("", web::post().to(create_installment)),
    )
    .service(
        web::scope("/parcelas/{installment_id}")
            .route("", web::get().to(get_installment))
            .route("", web::put().to(update_installment))
            .route("", web::delete().to(delete_installment))
            .route("/status", web::patch().to(update_installment_status))
            .route("/anexo", web::post().to(set_attachment))
            .route("/anexo", web::delete().to(clear_attachment))
            .route("/nota-fiscal", web::post().to(set_invoice))
            .route("/nota-fiscal", web::delete().to(clear_invoice)),
    )
    .route(
        "/consultores/{consultant_id}/parcelas",
        web::get().to(list_consultant_installments),
    );
}
