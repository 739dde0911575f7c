// src/services/reconciliation.rs

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::receiving::{
    ArrivalRecord, InboundView, PendingItem, Purchase, PurchaseStatus, ReceivedItem,
    ReceptionRecord, Transfer, TransferStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    pub pending: Vec<PendingItem>,
    pub history: Vec<ReceivedItem>,
}

/// Splits inbound goods into pending and history.
///
/// Only the existence of an arrival or reception moves an item to history. A
/// purchase already flagged `validated` without its arrival is in neither list,
/// and a rejected transfer never shows up again.
pub fn reconcile(
    purchases: &[Purchase],
    transfers: &[Transfer],
    arrivals: &[ArrivalRecord],
    receptions: &[ReceptionRecord],
) -> Reconciliation {
    // 1. Ids that already have their reconciliation record
    let reconciled_purchases: HashSet<Uuid> = arrivals.iter().map(|a| a.purchase_id).collect();
    let reconciled_transfers: HashSet<Uuid> = receptions.iter().map(|r| r.transfer_id).collect();

    // 2. Pending = status pending minus reconciled
    let pending_purchases = purchases
        .iter()
        .filter(|p| p.status == PurchaseStatus::Pending && !reconciled_purchases.contains(&p.id))
        .cloned()
        .map(PendingItem::Purchase);

    let pending_transfers = transfers
        .iter()
        .filter(|t| t.status == TransferStatus::Pending && !reconciled_transfers.contains(&t.id))
        .cloned()
        .map(PendingItem::Transfer);

    let pending: Vec<PendingItem> = pending_purchases
        .chain(pending_transfers)
        .filter(InboundView::is_displayable)
        .collect();

    // 3. History keeps the first displayable record per item
    let mut seen = HashSet::new();

    let arrivals = arrivals.iter().cloned().map(ReceivedItem::Purchase);
    let receptions = receptions.iter().cloned().map(ReceivedItem::Transfer);

    let history: Vec<ReceivedItem> = arrivals
        .chain(receptions)
        .filter(InboundView::is_displayable)
        .filter(|item| seen.insert((item.origin(), item.source_id())))
        .collect();

    tracing::debug!(pending = pending.len(), history = history.len(), "reconciled_inbound_goods");

    Reconciliation { pending, history }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receiving::Origin;
    use crate::services::fixtures::{arrival_for, purchase, reception_for, transfer};

    #[test]
    fn one_arrival_moves_one_purchase_to_history() {
        let purchases = vec![purchase("Blue Widget"), purchase("Gadget"), purchase("Sprocket")];
        let arrivals = vec![arrival_for(&purchases[1], 10)];

        let result = reconcile(&purchases, &[], &arrivals, &[]);

        assert_eq!(result.pending.len(), 2);
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.history[0].source_id(), purchases[1].id);
        assert!(result.pending.iter().all(|i| i.source_id() != purchases[1].id));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let purchases = vec![purchase("A"), purchase("B")];
        let transfers = vec![transfer("C"), transfer("D")];
        let arrivals = vec![arrival_for(&purchases[0], 9)];
        let receptions = vec![reception_for(&transfers[1], 4)];

        let first = reconcile(&purchases, &transfers, &arrivals, &receptions);
        let second = reconcile(&purchases, &transfers, &arrivals, &receptions);

        assert_eq!(first, second);
    }

    #[test]
    fn pending_and_history_never_share_an_item() {
        let purchases: Vec<_> = (0..5).map(|i| purchase(&format!("P{i}"))).collect();
        let transfers: Vec<_> = (0..4).map(|i| transfer(&format!("T{i}"))).collect();
        let arrivals = vec![arrival_for(&purchases[0], 10), arrival_for(&purchases[3], 8)];
        let receptions = vec![reception_for(&transfers[2], 4)];

        let result = reconcile(&purchases, &transfers, &arrivals, &receptions);

        let mut ids = HashSet::new();
        for id in result
            .pending
            .iter()
            .map(|i| (i.origin(), i.source_id()))
            .chain(result.history.iter().map(|i| (i.origin(), i.source_id())))
        {
            assert!(ids.insert(id), "duplicate item {id:?}");
        }
        assert_eq!(ids.len(), purchases.len() + transfers.len());
    }

    #[test]
    fn duplicate_arrivals_appear_once_in_history() {
        let p = purchase("Widget");
        let arrivals = vec![arrival_for(&p, 10), arrival_for(&p, 10)];

        let result = reconcile(&[p.clone()], &[], &arrivals, &[]);

        assert!(result.pending.is_empty());
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.history[0], ReceivedItem::Purchase(arrivals[0].clone()));
    }

    #[test]
    fn incomplete_first_record_does_not_hide_a_later_valid_one() {
        let p = purchase("Widget");
        let mut incomplete = arrival_for(&p, 10);
        incomplete.product_name = String::new();
        let valid = arrival_for(&p, 10);

        let t = transfer("Gadget");
        let mut incomplete_reception = reception_for(&t, 4);
        incomplete_reception.product_name = String::new();
        let valid_reception = reception_for(&t, 4);

        let result = reconcile(
            &[p],
            &[t],
            &[incomplete, valid.clone()],
            &[incomplete_reception, valid_reception.clone()],
        );

        assert!(result.pending.is_empty());
        assert_eq!(
            result.history,
            vec![ReceivedItem::Purchase(valid), ReceivedItem::Transfer(valid_reception)]
        );
    }

    #[test]
    fn validated_flag_alone_is_not_reconciled() {
        let mut p = purchase("Widget");
        p.status = PurchaseStatus::Validated;

        let result = reconcile(&[p], &[], &[], &[]);

        assert!(result.pending.is_empty());
        assert!(result.history.is_empty());
    }

    #[test]
    fn rejected_transfer_is_a_dead_end() {
        let mut t = transfer("Widget");
        t.status = TransferStatus::Rejected;

        let result = reconcile(&[], &[t], &[], &[]);

        assert!(result.pending.is_empty());
        assert!(result.history.is_empty());
    }

    #[test]
    fn history_lists_arrivals_before_receptions() {
        let p = purchase("Widget");
        let t = transfer("Gadget");
        let result = reconcile(
            &[p.clone()],
            &[t.clone()],
            &[arrival_for(&p, 10)],
            &[reception_for(&t, 3)],
        );

        let origins: Vec<Origin> = result.history.iter().map(|i| i.origin()).collect();
        assert_eq!(origins, vec![Origin::Purchase, Origin::Transfer]);
    }

    #[test]
    fn rows_missing_join_data_are_dropped() {
        let mut broken = purchase("");
        broken.supplier_name = String::new();
        let good = purchase("Widget");

        let result = reconcile(&[broken, good.clone()], &[], &[], &[]);

        assert_eq!(result.pending, vec![PendingItem::Purchase(good)]);
    }
}
