//! WSFEXv1 service operations.

use crate::types::{Destination, ExportAuthorization, ExportInvoice, UnitType};
use crate::{Result, ServiceError};
use arca_core::{Currency, Cuit, Environment};
use arca_soap::{records, text_of, xml_escape, SoapClient};
use arca_wsaa::AuthService;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// Service key used for ticket acquisition.
pub const SERVICE_KEY: &str = "wsfex";

const SOAP_NS: &str = "http://ar.gov.afip.dif.fexv1/";

const WIRE_DATE: &str = "%Y%m%d";

/// Client for the export invoicing service.
pub struct WsfexService {
    auth: Arc<AuthService>,
    soap: SoapClient,
    url: String,
    cuit_digits: String,
    max_retry_attempts: u32,
}

impl WsfexService {
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
            url: environment.wsfex_url(),
            cuit_digits: cuit.digits(),
            max_retry_attempts,
        }
    }

    /// Requests authorisation for an export invoice.
    pub async fn authorize_export_invoice(
        &self,
        invoice: &ExportInvoice,
    ) -> Result<ExportAuthorization> {
        invoice.validate()?;
        let auth = self.auth_block().await?;

        let items: String = invoice
            .items
            .iter()
            .map(|item| {
                format!(
                    "<Item><Pro_ds>{}</Pro_ds><Pro_qty>{}</Pro_qty><Pro_umed>{}</Pro_umed><Pro_precio_uni>{:.2}</Pro_precio_uni><Pro_total_item>{:.2}</Pro_total_item></Item>",
                    xml_escape(&item.description),
                    item.quantity,
                    item.unit_measure_code,
                    item.unit_price,
                    item.total_price,
                )
            })
            .collect();

        let body = format!(
            r#"<FEXAuthorize xmlns="{ns}">{auth}<Cmp><Cbte_Tipo>{tipo}</Cbte_Tipo><Punto_vta>{pos}</Punto_vta><Cbte_nro>{nro}</Cbte_nro><Fecha_cbte>{fecha}</Fecha_cbte><Dst_cmp>{dst}</Dst_cmp><Cliente>{cliente}</Cliente><Domicilio_cliente>{domicilio}</Domicilio_cliente><Moneda_Id>{mon}</Moneda_Id><Moneda_ctz>{ctz}</Moneda_ctz><Imp_total>{total:.2}</Imp_total><Items>{items}</Items></Cmp></FEXAuthorize>"#,
            ns = SOAP_NS,
            auth = auth,
            tipo = invoice.invoice_type_code,
            pos = invoice.point_of_sale,
            nro = invoice.invoice_number,
            fecha = invoice.invoice_date.format(WIRE_DATE),
            dst = invoice.destination_code,
            cliente = xml_escape(&invoice.buyer_name),
            domicilio = xml_escape(&invoice.buyer_address),
            mon = invoice.currency.id(),
            ctz = invoice.currency_rate,
            total = invoice.total_amount,
            items = items,
        );

        let response = self.call("FEXAuthorize", &body).await?;
        check_remote_errors(&response)?;

        let cae = text_of(&response, "Cae")
            .or_else(|| text_of(&response, "CAE"))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ServiceError::Remote {
                code: text_of(&response, "Resultado").unwrap_or_default(),
                message: "authorization rejected".to_string(),
            })?;

        info!(
            point_of_sale = invoice.point_of_sale,
            invoice_number = invoice.invoice_number,
            "export invoice authorized"
        );
        Ok(ExportAuthorization {
            cae,
            cae_expiration: text_of(&response, "Fch_venc_Cae")
                .and_then(|d| NaiveDate::parse_from_str(&d, WIRE_DATE).ok()),
            invoice_number: invoice.invoice_number,
            point_of_sale: invoice.point_of_sale,
            status: text_of(&response, "Resultado").unwrap_or_else(|| "A".to_string()),
        })
    }

    /// Looks up a previously submitted export invoice by type, point of
    /// sale and number; returns the raw authorisation code if present.
    pub async fn query_export_invoice(
        &self,
        invoice_type_code: u16,
        point_of_sale: u32,
        invoice_number: u64,
    ) -> Result<Option<String>> {
        let auth = self.auth_block().await?;

        let body = format!(
            r#"<FEXGetCMP xmlns="{ns}">{auth}<Cmp><Cbte_tipo>{tipo}</Cbte_tipo><Punto_vta>{pos}</Punto_vta><Cbte_nro>{nro}</Cbte_nro></Cmp></FEXGetCMP>"#,
            ns = SOAP_NS,
            auth = auth,
            tipo = invoice_type_code,
            pos = point_of_sale,
            nro = invoice_number,
        );

        let response = self.call("FEXGetCMP", &body).await?;
        check_remote_errors(&response)?;

        Ok(text_of(&response, "Cae").filter(|c| !c.is_empty()))
    }

    /// Export destination countries parameter table.
    pub async fn export_destinations(&self) -> Result<Vec<Destination>> {
        let response = self.parameter_call("FEXGetPARAM_DST_pais").await?;
        let rows = records(&response, "ClsFEXResponse_DST_pais", &["DST_Codigo", "DST_Ds"])?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| {
                Some(Destination {
                    code: r.remove("DST_Codigo")?,
                    description: r.remove("DST_Ds").unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Currencies parameter table.
    pub async fn currencies(&self) -> Result<Vec<Currency>> {
        let response = self.parameter_call("FEXGetPARAM_MON").await?;
        let rows = records(&response, "ClsFEXResponse_Mon", &["Mon_Id", "Mon_Ds"])?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| {
                Some(Currency {
                    id: r.remove("Mon_Id")?,
                    description: r.remove("Mon_Ds").unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Measurement units parameter table.
    pub async fn unit_types(&self) -> Result<Vec<UnitType>> {
        let response = self.parameter_call("FEXGetPARAM_UMed").await?;
        let rows = records(&response, "ClsFEXResponse_UMed", &["Umed_Id", "Umed_Ds"])?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| {
                Some(UnitType {
                    code: r.remove("Umed_Id")?,
                    description: r.remove("Umed_Ds").unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn parameter_call(&self, method: &str) -> Result<String> {
        let auth = self.auth_block().await?;
        let body = format!(r#"<{method} xmlns="{SOAP_NS}">{auth}</{method}>"#);
        let response = self.call(method, &body).await?;
        check_remote_errors(&response)?;
        Ok(response)
    }

    /// Acquires a ticket and renders the `<Auth>` block.
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

/// Surfaces a `FEXErr` block as a typed remote error.
fn check_remote_errors(response: &str) -> Result<()> {
    let errors = records(response, "FEXErr", &["ErrCode", "ErrMsg"])?;
    if let Some(err) = errors.first() {
        let code = err.get("ErrCode").cloned().unwrap_or_default();
        // Code 0 inside a FEXErr block means success.
        if code == "0" {
            return Ok(());
        }
        return Err(ServiceError::Remote {
            code,
            message: err.get("ErrMsg").cloned().unwrap_or_default(),
        });
    }
    Ok(())
}
