use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::core::Result;
use crate::modules::contracts::services::CommissionReportService;

/// GET /consultores/{consultant_id}/comissoes
///
/// Received and receivable commission across the consultant's contracts as
/// of the request time.
pub async fn get_commission_totals(
    service: web::Data<CommissionReportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let totals = service.totals(path.into_inner(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(totals))
}

/// GET /consultores/{consultant_id}/resumo-comissoes
pub async fn get_commission_summary(
    service: web::Data<CommissionReportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let summary = service.summary(path.into_inner(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /consultores/{consultant_id}/comissoes-parcelas
///
/// Energy and management commission received (paid installments) and
/// receivable (pending installments) over the consultant's closed negotiations.
pub async fn get_installment_commission_summary(
    service: web::Data<CommissionReportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let summary = service.installment_summary(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Configure commission report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/consultores/{consultant_id}/comissoes",
        web::get().to(get_commission_totals),
    )
    .route(
        "/consultores/{consultant_id}/resumo-comissoes",
        web::get().to(get_commission_summary),
    )
    .route(
        "/consultores/{consultant_id}/comissoes-parcelas",
        web::get().to(get_installment_commission_summary),
    );
}
