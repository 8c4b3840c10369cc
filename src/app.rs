//! HTTP application wiring shared by the server binary and the API tests

use std::sync::Arc;

use actix_web::web;

use crate::config::LedgerConfig;
use crate::middleware::{json_error_handler, path_error_handler, query_error_handler};
use crate::modules::commissions::CommissionService;
use crate::modules::contracts::CommissionReportService;
use crate::modules::installments::InstallmentService;
use crate::modules::{commissions, contracts, health, installments};
use crate::storage::LedgerStore;

/// Services built once over a shared store and cloned into every worker
#[derive(Clone)]
pub struct LedgerServices {
    store: web::Data<Arc<dyn LedgerStore>>,
    commissions: web::Data<CommissionService>,
    installments: web::Data<InstallmentService>,
    reports: web::Data<CommissionReportService>,
}

impl LedgerServices {
    pub fn new(store: Arc<dyn LedgerStore>, config: &LedgerConfig) -> Self {
        Self {
            commissions: web::Data::new(CommissionService::new(store.clone(), config.date_parsing)),
            installments: web::Data::new(InstallmentService::new(store.clone())),
            reports: web::Data::new(CommissionReportService::new(
                store.clone(),
                config.fee_strategy,
            )),
            store: web::Data::new(store),
        }
    }

    /// Register services, extractor error handlers and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.commissions.clone())
            .app_data(self.installments.clone())
            .app_data(self.reports.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler));

        health::configure(cfg);
        commissions::controllers::configure(cfg);
        installments::controllers::configure(cfg);
        contracts::controllers::configure(cfg);
    }
}
