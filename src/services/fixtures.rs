// Builders shared by the receiving tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::receiving::{
    ArrivalRecord, Purchase, PurchaseStatus, ReceptionRecord, Transfer, TransferStatus,
};

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
}

pub fn purchase(product: &str) -> Purchase {
    Purchase {
        id: Uuid::new_v4(),
        supplier_id: Uuid::new_v4(),
        supplier_name: "Fournisseur Nord".into(),
        product_id: Uuid::new_v4(),
        product_name: product.into(),
        store_id: Uuid::new_v4(),
        store_name: "Boutique Centre".into(),
        quantity: Decimal::from(10),
        status: PurchaseStatus::Pending,
        created_at: day(1),
    }
}

pub fn transfer(product: &str) -> Transfer {
    Transfer {
        id: Uuid::new_v4(),
        source_store_id: Uuid::new_v4(),
        source_store_name: "Entrepôt".into(),
        destination_store_id: Uuid::new_v4(),
        destination_store_name: "Boutique Gare".into(),
        product_id: Uuid::new_v4(),
        product_name: product.into(),
        quantity: Decimal::from(4),
        status: TransferStatus::Pending,
        created_at: day(2),
    }
}

pub fn arrival_for(p: &Purchase, received: i64) -> ArrivalRecord {
    ArrivalRecord {
        id: Uuid::new_v4(),
        purchase_id: p.id,
        supplier_id: p.supplier_id,
        supplier_name: p.supplier_name.clone(),
        product_id: p.product_id,
        product_name: p.product_name.clone(),
        store_id: p.store_id,
        store_name: p.store_name.clone(),
        ordered_quantity: p.quantity,
        received_quantity: Decimal::from(received),
        received_by: None,
        notes: None,
        received_at: day(5),
    }
}

pub fn reception_for(t: &Transfer, received: i64) -> ReceptionRecord {
    ReceptionRecord {
        id: Uuid::new_v4(),
        transfer_id: t.id,
        source_store_id: t.source_store_id,
        source_store_name: t.source_store_name.clone(),
        destination_store_id: t.destination_store_id,
        destination_store_name: t.destination_store_name.clone(),
        product_id: t.product_id,
        product_name: t.product_name.clone(),
        sent_quantity: t.quantity,
        received_quantity: Decimal::from(received),
        received_by: None,
        notes: None,
        received_at: day(6),
    }
}
