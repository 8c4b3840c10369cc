// Test Data Factory
//
// Wire payloads and domain fixtures for the ledger tests.

use chrono::{DateTime, TimeZone, Utc};
use commission_ledger::modules::commissions::models::CreateCalculationRequest;
use commission_ledger::modules::contracts::models::Contract;
use rust_decimal::Decimal;
use serde_json::{json, Value};

/// Midnight UTC on the given day
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Fixture factory for ledger payloads
pub struct TestDataFactory;

impl TestDataFactory {
    /// `parcelasIguais`: `count` installments of `value` from 2024-01-01
    pub fn equal_installments(count: u32, value: Decimal) -> CreateCalculationRequest {
        CreateCalculationRequest {
            receipt_modality: "Mensal".to_string(),
            fee: Decimal::new(5, 2),
            volume: Decimal::new(1200, 0),
            payment_mode: "parcelasIguais".to_string(),
            monthly_installment_value: value,
            installments_start_date: "2024-01-01T00:00:00Z".to_string(),
            installment_count: count,
            contract_start: "2024-01-01T00:00:00Z".to_string(),
            contract_end: "2024-12-31T00:00:00Z".to_string(),
            generated_at: "2023-12-20T10:00:00Z".to_string(),
            ..Default::default()
        }
    }

    /// `dividirInicialEmDuas` with the given initial and final values
    pub fn split_in_two(initial: Decimal, last: Decimal) -> CreateCalculationRequest {
        CreateCalculationRequest {
            receipt_modality: "Integral".to_string(),
            payment_mode: "dividirInicialEmDuas".to_string(),
            initial_payment_value: initial,
            initial_payment_date: "2024-02-01T00:00:00Z".to_string(),
            final_payment_value: last,
            final_payment_date: "2024-08-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }

    /// `pagamentoInicialEParcelas` with an optional first installment
    pub fn initial_and_installments(
        first: Decimal,
        count: u32,
        monthly: Decimal,
    ) -> CreateCalculationRequest {
        CreateCalculationRequest {
            payment_mode: "pagamentoInicialEParcelas".to_string(),
            first_installment_value: first,
            first_installment_due_date: "2023-12-15T00:00:00Z".to_string(),
            monthly_installment_value: monthly,
            installments_start_date: "2024-01-31T00:00:00Z".to_string(),
            installment_count: count,
            ..Default::default()
        }
    }

    /// Wire JSON for an equal-installments calculation
    pub fn equal_installments_payload(count: u32, value: f64) -> Value {
        json!({
            "modalidadeRecebimento": "Mensal",
            "fee": 0.05,
            "volume": 1200,
            "valorGestaoMensal": 0,
            "energiaMensal": 350.5,
            "possuiComissaoGestao": false,
            "totalReceber": 99999,
            "modoPagamento": "parcelasIguais",
            "valorParcelaMensal": value,
            "dataInicioParcelas": "2024-01-01T00:00:00Z",
            "qtdParcelas": count,
            "inicioContrato": "2024-01-01T00:00:00Z",
            "terminioContrato": "2024-12-31T00:00:00Z",
            "dataGeracao": "2023-12-20T10:00:00Z"
        })
    }

    /// Contract with every commission component disabled
    pub fn contract(id: i64, negotiation_id: i64, value: Decimal) -> Contract {
        Contract {
            id,
            negotiation_id,
            value,
            supply_start: utc(2024, 1, 1),
            supply_end: utc(2024, 12, 1),
            full_value: false,
            fee: false,
            fee_fraction: Decimal::ZERO,
            one_time_payment: false,
            one_time_fraction: Decimal::ZERO,
            monthly_payment: false,
            monthly_amount: Decimal::ZERO,
        }
    }

    /// Twelve-month monthly-payment contract (Jan through Dec 2024)
    pub fn monthly_contract(value: Decimal) -> Contract {
        Contract {
            monthly_payment: true,
            monthly_amount: value / Decimal::from(12),
            ..Self::contract(1, 1, value)
        }
    }
}
