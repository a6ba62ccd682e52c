// src/services/notify.rs

//! Shipment and expiry notifications.
//!
//! Every cycle with detections gets one console report, and one email per
//! topic when a recipient is configured. Email is best-effort: a send
//! failure is logged and never aborts the cycle.

use chrono::Local;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::Result;
use crate::models::{ChangeSet, InventoryItem, QuantityChange, SmtpConfig};
use crate::pipeline::ExpiringItem;

/// Console + email notifier.
pub struct Notifier {
    smtp: SmtpConfig,
}

impl Notifier {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }

    /// Report detected shipments on the console and, when configured, by email.
    pub async fn notify_shipments(&self, changes: &ChangeSet, inventory: Option<&[InventoryItem]>) {
        let shipments = changes.shipments();
        if shipments.is_empty() {
            log::info!("No shipments detected");
            return;
        }

        log::info!("Detected {} shipment(s)", shipments.len());
        println!("{}", shipment_report(&shipments, inventory));

        if self.smtp.notification_email.is_some() {
            let subject = format!("【在庫監視】出荷が発生しました ({}件)", shipments.len());
            let body = shipment_email_body(&shipments, inventory);
            if let Err(e) = self.send_email(&subject, &body).await {
                log::error!("Shipment email failed: {e}");
            }
        } else {
            log::warn!("No notification email configured; console report only");
        }
    }

    /// Report items whose expiry falls within the warning horizon.
    pub async fn notify_expiring(&self, expiring: &[ExpiringItem], days: i64) {
        if expiring.is_empty() {
            return;
        }

        log::info!(
            "{} item(s) expire within {} days",
            expiring.len(),
            days
        );
        println!("{}", expiry_report(expiring, days));

        if self.smtp.notification_email.is_some() {
            let subject = format!(
                "【在庫監視】賞味期限が{}日以内の商品があります ({}件)",
                days,
                expiring.len()
            );
            let body = expiry_email_body(expiring, days);
            if let Err(e) = self.send_email(&subject, &body).await {
                log::error!("Expiry email failed: {e}");
            }
        }
    }

    async fn send_email(&self, subject: &str, body: &str) -> Result<()> {
        let (Some(username), Some(password)) = (&self.smtp.username, &self.smtp.password) else {
            log::warn!("SMTP credentials not configured; skipping email");
            return Ok(());
        };
        let Some(recipient) = &self.smtp.notification_email else {
            return Ok(());
        };

        let email = Message::builder()
            .from(username.parse()?)
            .to(recipient.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.server)?
            .port(self.smtp.port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build();

        mailer.send(email).await?;
        log::info!("Notification email sent to {recipient}");
        Ok(())
    }
}

fn shipment_lines(shipments: &[&QuantityChange]) -> String {
    let mut out = String::new();
    for (i, shipment) in shipments.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, shipment.product));
        out.push_str(&format!("   前回数量: {}個\n", shipment.previous_quantity));
        out.push_str(&format!("   現在数量: {}個\n", shipment.current_quantity));
        out.push_str(&format!("   出荷数量: {}個\n", shipment.shipped_quantity()));
        out.push_str(&format!("   現在の賞味期限: {}\n\n", shipment.current_expiry));
    }
    out
}

fn remaining_stock_lines(
    shipments: &[&QuantityChange],
    inventory: &[InventoryItem],
) -> String {
    let shipped: Vec<&str> = shipments.iter().map(|s| s.product.as_str()).collect();
    let mut out = String::new();
    for item in inventory {
        if shipped.contains(&item.product.trim()) {
            out.push_str(&format!("商品名: {}\n", item.product));
            out.push_str(&format!("  残り数量: {}個\n", item.quantity));
            out.push_str(&format!("  賞味期限: {}\n\n", item.expiry_date));
        }
    }
    out
}

/// Console report for detected shipments.
pub fn shipment_report(
    shipments: &[&QuantityChange],
    inventory: Option<&[InventoryItem]>,
) -> String {
    let bar = "=".repeat(60);
    let mut out = format!("\n{bar}\n【在庫監視】出荷が発生しました\n{bar}\n");
    out.push_str(&format!(
        "検知日時: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&shipment_lines(shipments));

    if let Some(inventory) = inventory {
        out.push_str(&format!("【現在の在庫状況（該当商品）】\n{}\n", "-".repeat(60)));
        out.push_str(&remaining_stock_lines(shipments, inventory));
    }

    out.push_str(&format!("{bar}\n"));
    out
}

/// Email body for the shipment digest.
pub fn shipment_email_body(
    shipments: &[&QuantityChange],
    inventory: Option<&[InventoryItem]>,
) -> String {
    let bar = "=".repeat(50);
    let mut body = String::from("委託倉庫の在庫監視システムからのお知らせです。\n\n");
    body.push_str(&format!("出荷が発生しました: {}件\n", shipments.len()));
    body.push_str(&format!(
        "検知日時: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    body.push_str(&format!("{bar}\n【出荷詳細】\n{bar}\n\n"));
    body.push_str(&shipment_lines(shipments));

    if let Some(inventory) = inventory {
        body.push_str(&format!("{bar}\n【現在の在庫状況（該当商品）】\n{bar}\n\n"));
        body.push_str(&remaining_stock_lines(shipments, inventory));
    }

    body.push_str("\nこのメールは自動送信されています。\n");
    body
}

fn expiry_lines(expiring: &[ExpiringItem]) -> String {
    let mut out = String::new();
    for entry in expiring {
        out.push_str(&format!("商品名: {}\n", entry.item.product));
        out.push_str(&format!("  数量: {}個\n", entry.item.quantity));
        out.push_str(&format!(
            "  賞味期限: {} (あと{}日)\n\n",
            entry.item.expiry_date, entry.days_until_expiry
        ));
    }
    out
}

/// Console report for items nearing expiry.
pub fn expiry_report(expiring: &[ExpiringItem], days: i64) -> String {
    let bar = "=".repeat(60);
    let mut out = format!("\n{bar}\n【在庫監視】賞味期限が{days}日以内の商品\n{bar}\n");
    out.push_str(&expiry_lines(expiring));
    out.push_str(&format!("{bar}\n"));
    out
}

/// Email body for the expiry digest.
pub fn expiry_email_body(expiring: &[ExpiringItem], days: i64) -> String {
    let bar = "=".repeat(50);
    let mut body = String::from("委託倉庫の在庫監視システムからのお知らせです。\n\n");
    body.push_str(&format!(
        "賞味期限が{}日以内の商品が{}件あります。\n\n",
        days,
        expiring.len()
    ));
    body.push_str(&format!("{bar}\n【賞味期限が近い商品】\n{bar}\n\n"));
    body.push_str(&expiry_lines(expiring));
    body.push_str("\nこのメールは自動送信されています。\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;
    use chrono::Utc;

    fn shipment(product: &str, prev: u32, curr: u32) -> QuantityChange {
        QuantityChange {
            kind: ChangeKind::Shipment,
            product: product.to_string(),
            previous_quantity: prev,
            current_quantity: curr,
            quantity_diff: i64::from(curr) - i64::from(prev),
            previous_expiry: "2024-12-31".to_string(),
            current_expiry: "2024-12-31".to_string(),
            expiry_changed: false,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_shipment_email_body_contains_details() {
        let change = shipment("りんごジュース", 100, 60);
        let body = shipment_email_body(&[&change], None);
        assert!(body.contains("出荷が発生しました: 1件"));
        assert!(body.contains("りんごジュース"));
        assert!(body.contains("前回数量: 100個"));
        assert!(body.contains("出荷数量: 40個"));
    }

    #[test]
    fn test_shipment_email_body_lists_remaining_stock() {
        let change = shipment("りんごジュース", 100, 60);
        let inventory = vec![
            InventoryItem {
                product: "りんごジュース".to_string(),
                quantity: 60,
                expiry_date: "2024-12-31".to_string(),
                scraped_at: Utc::now(),
            },
            InventoryItem {
                product: "関係ない商品".to_string(),
                quantity: 7,
                expiry_date: "2025-01-01".to_string(),
                scraped_at: Utc::now(),
            },
        ];
        let body = shipment_email_body(&[&change], Some(&inventory));
        assert!(body.contains("残り数量: 60個"));
        assert!(!body.contains("関係ない商品"));
    }

    #[test]
    fn test_expiry_email_body() {
        let expiring = vec![ExpiringItem {
            item: InventoryItem {
                product: "みかんゼリー".to_string(),
                quantity: 12,
                expiry_date: "2024-02-01".to_string(),
                scraped_at: Utc::now(),
            },
            days_until_expiry: 5,
        }];
        let body = expiry_email_body(&expiring, 30);
        assert!(body.contains("賞味期限が30日以内の商品が1件あります"));
        assert!(body.contains("みかんゼリー"));
        assert!(body.contains("あと5日"));
    }
}
