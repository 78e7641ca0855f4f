//! WSFEv1 service operations.

use crate::types::{
    Authorization, Invoice, InvoiceQuery, LastInvoice, ParameterRecord, QueriedInvoice,
};
use crate::{Result, ServiceError};
use arca_core::{Currency, Cuit, Environment};
use arca_soap::{records, text_of, xml_escape, SoapClient};
use arca_wsaa::AuthService;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

/// Service key used for ticket acquisition and as the login request's
/// `service` element.
pub const SERVICE_KEY: &str = "wsfe";

const SOAP_NS: &str = "http://ar.gov.afip.dif.FEV1/";

/// Date format used on the wire (`yyyymmdd`).
const WIRE_DATE: &str = "%Y%m%d";

/// Client for the domestic invoicing service.
///
/// Cheap to hand out by reference; every operation is `&self` and the
/// underlying HTTP pool is shared.
pub struct WsfeService {
    auth: Arc<AuthService>,
    soap: SoapClient,
    url: String,
    cuit_digits: String,
    max_retry_attempts: u32,
}

impl WsfeService {
    #[must_use]
    pub fn new(
        auth: Arc<AuthService>,
        soap: SoapClient,
        environment: Environment,
        cuit: &Cuit,
        max_retry_attempts: u32,
    ) -> Self {
        Self {
            auth,
            soap,
            url: environment.wsfe_url(),
            cuit_digits: cuit.digits(),
            max_retry_attempts,
        }
    }

    /// Requests authorisation (CAE) for an invoice.
    pub async fn authorize_invoice(&self, invoice: &Invoice) -> Result<Authorization> {
        invoice.validate()?;
        let auth = self.auth_block().await?;

        let body = format!(
            r#"<FECAESolicitar xmlns="{ns}">{auth}<FeCAEReq><FeCabReq><CantReg>1</CantReg><PtoVta>{pos}</PtoVta><CbteTipo>{cbte_tipo}</CbteTipo></FeCabReq><FeDetReq><FECAEDetRequest><Concepto>{concepto}</Concepto><DocTipo>{doc_tipo}</DocTipo><DocNro>{doc_nro}</DocNro><CbteDesde>{nro}</CbteDesde><CbteHasta>{nro}</CbteHasta><CbteFch>{fecha}</CbteFch><ImpTotal>{total:.2}</ImpTotal><ImpNeto>{neto:.2}</ImpNeto><ImpIVA>{iva:.2}</ImpIVA><MonId>{mon}</MonId><MonCotiz>{cotiz}</MonCotiz></FECAEDetRequest></FeDetReq></FeCAEReq></FECAESolicitar>"#,
            ns = SOAP_NS,
            auth = auth,
            pos = invoice.point_of_sale,
            cbte_tipo = invoice.invoice_type.code(),
            concepto = invoice.concept.code(),
            doc_tipo = invoice.buyer_document_type.code(),
            doc_nro = xml_escape(&invoice.buyer_document_number),
            nro = invoice.invoice_number,
            fecha = invoice.invoice_date.format(WIRE_DATE),
            total = invoice.total_amount,
            neto = invoice.net_amount,
            iva = invoice.tax_amount,
            mon = invoice.currency.id(),
            cotiz = invoice.currency_rate,
        );

        let response = self.call("FECAESolicitar", &body).await?;
        check_remote_errors(&response)?;

        let cae = text_of(&response, "CAE")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ServiceError::Remote {
                code: text_of(&response, "Resultado").unwrap_or_default(),
                message: observation_message(&response),
            })?;

        let authorization = Authorization {
            cae,
            cae_expiration: text_of(&response, "CAEFchVto")
                .and_then(|d| NaiveDate::parse_from_str(&d, WIRE_DATE).ok()),
            invoice_number: invoice.invoice_number,
            point_of_sale: invoice.point_of_sale,
            status: text_of(&response, "Resultado").unwrap_or_else(|| "A".to_string()),
        };

        info!(
            point_of_sale = invoice.point_of_sale,
            invoice_number = invoice.invoice_number,
            cae = %authorization.cae,
            "invoice authorized"
        );
        Ok(authorization)
    }

    /// Looks up a previously submitted invoice.
    pub async fn query_invoice(&self, query: &InvoiceQuery) -> Result<QueriedInvoice> {
        let auth = self.auth_block().await?;

        let body = format!(
            r#"<FECompConsultar xmlns="{ns}">{auth}<FeCompConsReq><CbteTipo>{tipo}</CbteTipo><CbteNro>{nro}</CbteNro><PtoVta>{pos}</PtoVta></FeCompConsReq></FECompConsultar>"#,
            ns = SOAP_NS,
            auth = auth,
            tipo = query.invoice_type.code(),
            nro = query.invoice_number,
            pos = query.point_of_sale,
        );

        let response = self.call("FECompConsultar", &body).await?;
        check_remote_errors(&response)?;

        debug!(invoice_number = query.invoice_number, "invoice queried");
        Ok(QueriedInvoice {
            invoice_type_code: query.invoice_type.code(),
            point_of_sale: query.point_of_sale,
            invoice_number: query.invoice_number,
            cae: text_of(&response, "CodAutorizacion"),
            total_amount: text_of(&response, "ImpTotal").and_then(|v| v.parse().ok()),
            invoice_date: text_of(&response, "CbteFch")
                .and_then(|d| NaiveDate::parse_from_str(&d, WIRE_DATE).ok()),
        })
    }

    /// Returns the highest authorised invoice number for a point of sale
    /// and invoice type.
    pub async fn last_authorized(
        &self,
        point_of_sale: u32,
        invoice_type_code: u16,
    ) -> Result<LastInvoice> {
        let auth = self.auth_block().await?;

        let body = format!(
            r#"<FECompUltimoAutorizado xmlns="{ns}">{auth}<PtoVta>{pos}</PtoVta><CbteTipo>{tipo}</CbteTipo></FECompUltimoAutorizado>"#,
            ns = SOAP_NS,
            auth = auth,
            pos = point_of_sale,
            tipo = invoice_type_code,
        );

        let response = self.call("FECompUltimoAutorizado", &body).await?;
        check_remote_errors(&response)?;

        let invoice_number = text_of(&response, "CbteNro")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                ServiceError::Soap(arca_soap::SoapError::InvalidResponse(
                    "missing CbteNro".to_string(),
                ))
            })?;

        Ok(LastInvoice {
            point_of_sale,
            invoice_type_code,
            invoice_number,
        })
    }

    /// Document types parameter table.
    pub async fn document_types(&self) -> Result<Vec<ParameterRecord>> {
        self.parameter_table("FEParamGetTiposDoc", "DocTipo").await
    }

    /// Invoice (comprobante) types parameter table.
    pub async fn invoice_types(&self) -> Result<Vec<ParameterRecord>> {
        self.parameter_table("FEParamGetTiposCbte", "CbteTipo").await
    }

    /// Concept types parameter table.
    pub async fn concept_types(&self) -> Result<Vec<ParameterRecord>> {
        self.parameter_table("FEParamGetTiposConcepto", "ConceptoTipo")
            .await
    }

    /// Currencies parameter table.
    pub async fn currencies(&self) -> Result<Vec<Currency>> {
        let records = self.parameter_table("FEParamGetMonedas", "Moneda").await?;
        Ok(records
            .into_iter()
            .map(|r| Currency {
                id: r.id,
                description: r.description,
            })
            .collect())
    }

    /// Shared request path for the `FEParamGet*` family.
    async fn parameter_table(
        &self,
        method: &str,
        record_element: &str,
    ) -> Result<Vec<ParameterRecord>> {
        let auth = self.auth_block().await?;
        let body = format!(r#"<{method} xmlns="{SOAP_NS}">{auth}</{method}>"#);

        let response = self.call(method, &body).await?;
        check_remote_errors(&response)?;

        let rows = records(&response, record_element, &["Id", "Desc"])?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| {
                Some(ParameterRecord {
                    id: r.remove("Id")?,
                    description: r.remove("Desc").unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Acquires a ticket and renders the `<Auth>` block every request
    /// carries.
    async fn auth_block(&self) -> Result<String> {
        let ticket = self.auth.get_ticket(SERVICE_KEY).await?;
        Ok(format!(
            "<Auth><Token>{}</Token><Sign>{}</Sign><Cuit>{}</Cuit></Auth>",
            xml_escape(&ticket.token),
            xml_escape(&ticket.sign),
            self.cuit_digits,
        ))
    }

    async fn call(&self, method: &str, body: &str) -> Result<String> {
        let action = format!("{SOAP_NS}{method}");
        Ok(self
            .soap
            .call_with_retry(&self.url, &action, body, self.max_retry_attempts)
            .await?)
    }
}

/// Surfaces an `Errors/Err` block as a typed remote error.
fn check_remote_errors(response: &str) -> Result<()> {
    let errors = records(response, "Err", &["Code", "Msg"])?;
    if let Some(err) = errors.first() {
        return Err(ServiceError::Remote {
            code: err.get("Code").cloned().unwrap_or_default(),
            message: err.get("Msg").cloned().unwrap_or_default(),
        });
    }
    Ok(())
}

/// Collects observation messages attached to a rejected authorisation.
fn observation_message(response: &str) -> String {
    records(response, "Obs", &["Code", "Msg"])
        .ok()
        .and_then(|obs| {
            let msgs: Vec<String> = obs.into_iter().filter_map(|mut o| o.remove("Msg")).collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        })
        .unwrap_or_else(|| "authorization rejected".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_block_is_detected() {
        let response = r#"<FECAESolicitarResponse>
            <Errors><Err><Code>600</Code><Msg>No autorizado</Msg></Err></Errors>
        </FECAESolicitarResponse>"#;
        match check_remote_errors(response) {
            Err(ServiceError::Remote { code, message }) => {
                assert_eq!(code, "600");
                assert_eq!(message, "No autorizado");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn clean_response_has_no_remote_error() {
        assert!(check_remote_errors("<FECAESolicitarResponse><Resultado>A</Resultado></FECAESolicitarResponse>").is_ok());
    }

    #[test]
    fn observations_join_into_message() {
        let response = r#"<r><Observaciones>
            <Obs><Code>10016</Code><Msg>fecha invalida</Msg></Obs>
            <Obs><Code>10048</Code><Msg>numero salteado</Msg></Obs>
        </Observaciones></r>"#;
        assert_eq!(
            observation_message(response),
            "fecha invalida; numero salteado"
        );
    }
}
