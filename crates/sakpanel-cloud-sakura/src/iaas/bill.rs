//! Billing (system API)

use super::{IaasClient, resource_id};
use sakpanel_cloud::view::{de, format_month, format_timestamp};
use sakpanel_cloud::{CloudError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillInfo {
    pub id: String,
    pub amount: i64,
    /// Billing month, `YYYY-MM`
    pub date: String,
    pub paid: bool,
    pub pay_limit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDetailInfo {
    pub id: String,
    pub amount: i64,
    pub description: String,
    pub service_class_path: String,
    pub usage: i64,
    pub formatted_usage: String,
    pub zone: String,
}

pub struct BillService<'a> {
    client: &'a IaasClient,
}

impl<'a> BillService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list_by_contract(&self, account_id: &str) -> Result<Vec<BillInfo>> {
        let account_id = resource_id(account_id)?;
        let result: BillsResponse = self
            .client
            .billing(&format!("bill/by-contract/{}", account_id))
            .await?;
        Ok(result
            .bills
            .into_iter()
            .map(|b| BillInfo {
                id: b.bill_id,
                amount: b.amount,
                date: format_month(b.date.as_deref()),
                paid: b.paid,
                pay_limit: format_timestamp(b.pay_limit.as_deref()),
            })
            .collect())
    }

    pub async fn details(&self, member_code: &str, bill_id: &str) -> Result<Vec<BillDetailInfo>> {
        let member_code = member_code.trim();
        if member_code.is_empty() || !member_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CloudError::invalid_id("member code", member_code));
        }
        let bill_id = resource_id(bill_id)?;
        let result: BillDetailsResponse = self
            .client
            .billing(&format!("billdetail/{}/{}", member_code, bill_id))
            .await?;
        Ok(result
            .bill_details
            .into_iter()
            .map(|d| BillDetailInfo {
                id: d.id,
                amount: d.amount,
                description: d.description,
                service_class_path: d.service_class_path,
                usage: d.usage,
                formatted_usage: d.formatted_usage,
                zone: d.zone,
            })
            .collect())
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct BillsResponse {
    #[serde(rename = "Bills", default, deserialize_with = "de::null_default")]
    bills: Vec<ApiBill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiBill {
    #[serde(rename = "BillID", default, deserialize_with = "de::string_id")]
    bill_id: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    amount: i64,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    paid: bool,
    #[serde(default)]
    pay_limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BillDetailsResponse {
    #[serde(rename = "BillDetails", default, deserialize_with = "de::null_default")]
    bill_details: Vec<ApiBillDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiBillDetail {
    #[serde(rename = "ContractID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    amount: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    service_class_path: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    usage: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    formatted_usage: String,
    #[serde(default, deserialize_with = "de::null_default")]
    zone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_wire_shape() {
        let raw = r#"{"Bills": [{
            "BillID": 123456,
            "Amount": "15400",
            "Date": "2024-05-01T00:00:00+09:00",
            "Paid": true,
            "PayLimit": "2024-06-30T00:00:00+09:00"
        }]}"#;
        let result: BillsResponse = serde_json::from_str(raw).unwrap();
        let bill = &result.bills[0];
        assert_eq!(bill.bill_id, "123456");
        assert_eq!(bill.amount, 15400);
        assert_eq!(format_month(bill.date.as_deref()), "2024-05");
    }

    #[test]
    fn test_null_bill_details() {
        let result: BillDetailsResponse = serde_json::from_str(r#"{"BillDetails":null}"#).unwrap();
        assert!(result.bill_details.is_empty());
    }
}
