//! 性質測試

use std::sync::Arc;

use chrono::NaiveDate;
use kitting::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum StockOp {
    Reserve(u64),
    Commit(u64),
    Release(u64),
    Receive(u64),
    Issue(u64),
}

fn stock_op() -> impl Strategy<Value = StockOp> {
    prop_oneof![
        (0u64..20).prop_map(StockOp::Reserve),
        (0u64..20).prop_map(StockOp::Commit),
        (0u64..20).prop_map(StockOp::Release),
        (0u64..20).prop_map(StockOp::Receive),
        (0u64..20).prop_map(StockOp::Issue),
    ]
}

fn rounding() -> impl Strategy<Value = PercentRounding> {
    prop_oneof![
        Just(PercentRounding::HalfUp),
        Just(PercentRounding::Floor),
        Just(PercentRounding::Ceil),
    ]
}

fn desk(on_hand: u64, per_unit: u32) -> KittingDesk {
    let stock = Arc::new(StockLedger::new());
    stock
        .register(StockItem::new("DET-1".to_string(), "Болт".to_string(), on_hand))
        .unwrap();
    let specifications = Arc::new(SpecificationResolver::new());
    specifications
        .define_assembly(
            Assembly::new("SB-1".to_string(), "Рама".to_string())
                .with_line("DET-1".to_string(), per_unit),
        )
        .unwrap();
    KittingDesk::new(
        stock,
        specifications,
        Arc::new(OrderLedger::new()),
        KittingConfig::new(),
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
}

proptest! {
    #[test]
    fn prop_free_is_on_hand_minus_reserved(
        on_hand in 0u64..50,
        ops in prop::collection::vec(stock_op(), 0..40),
    ) {
        let ledger = StockLedger::new();
        ledger
            .register(StockItem::new("DET-1".to_string(), "Болт".to_string(), on_hand))
            .unwrap();

        for op in ops {
            // 失敗的操作不得改變狀態，這裡只檢查不變量
            let _ = match op {
                StockOp::Reserve(q) => ledger.reserve("DET-1", q),
                StockOp::Commit(q) => ledger.commit("DET-1", q),
                StockOp::Release(q) => ledger.release("DET-1", q),
                StockOp::Receive(q) => ledger.receive("DET-1", q),
                StockOp::Issue(q) => ledger.issue("DET-1", q),
            };

            let item = ledger.get("DET-1").unwrap();
            prop_assert!(item.reserved_qty() <= item.on_hand_qty);
            prop_assert_eq!(item.free_qty(), item.on_hand_qty - item.reserved_qty());
            prop_assert_eq!(ledger.get_free("DET-1").unwrap(), item.free_qty());
        }
    }

    #[test]
    fn prop_need_is_quantity_times_per_unit(
        per_unit in 1u32..50,
        ordered in 1u32..200,
        own in 0u32..200,
    ) {
        let desk = desk(1_000, per_unit);
        let order = desk.place_order("SB-1", ordered, today()).unwrap();
        let draft = desk.open_draft(order.id).unwrap();
        desk.select_source_order(draft.id, order.id).unwrap();

        match desk.set_own_quantity(draft.id, own) {
            Ok(draft) => {
                prop_assert!(own <= ordered);
                let line = &draft.lines[0];
                prop_assert_eq!(line.need, u64::from(own) * u64::from(per_unit));
                prop_assert_eq!(line.deficit, 1_000 - line.need as i64);
                prop_assert_eq!(draft.total_need, line.need);
            }
            Err(err) => {
                prop_assert!(own > ordered);
                let is_exceeds = matches!(err, KittingError::QuantityExceedsRequired { .. });
                prop_assert!(is_exceeds);
            }
        }
    }

    #[test]
    fn prop_percentage_is_bounded(
        rounding in rounding(),
        completed in 0u32..10_000,
        ordered in 0u32..10_000,
    ) {
        let pct = rounding.percentage(completed, ordered);
        prop_assert!(pct <= 100);

        if ordered > 0 {
            prop_assert_eq!(rounding.percentage(0, ordered), 0);
            prop_assert_eq!(rounding.percentage(ordered, ordered), 100);
        } else {
            prop_assert_eq!(pct, 0);
        }
    }

    #[test]
    fn prop_actualize_is_idempotent(
        ordered in 1u32..50,
        own in 0u32..50,
        on_hand in 0u64..100,
    ) {
        let desk = desk(on_hand, 2);
        let order = desk.place_order("SB-1", ordered, today()).unwrap();
        let draft = desk.open_draft(order.id).unwrap();
        desk.select_source_order(draft.id, order.id).unwrap();
        let _ = desk.set_own_quantity(draft.id, own);

        let first = desk.actualize(draft.id).unwrap();
        let second = desk.actualize(draft.id).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.id, draft.id);
        prop_assert_eq!(first.own_quantity, 0);
        prop_assert!(first.is_selected(order.id));
    }

    #[test]
    fn prop_completed_never_exceeds_ordered(
        ordered in 1u32..20,
        batches in prop::collection::vec(1u32..8, 1..10),
    ) {
        let desk = desk(10_000, 1);
        let order = desk.place_order("SB-1", ordered, today()).unwrap();

        for batch in batches {
            let Ok(draft) = desk.open_draft(order.id) else {
                // 訂單已完成
                break;
            };
            desk.select_source_order(draft.id, order.id).unwrap();
            if desk.set_own_quantity(draft.id, batch).is_ok() {
                desk.commit(draft.id).unwrap();
            }
            desk.close_draft(draft.id).unwrap();

            let progress = desk.progress(order.id).unwrap();
            prop_assert!(progress.completed <= progress.ordered);
            prop_assert!(progress.percentage <= 100);
        }

        let stored = desk.orders().get(order.id).unwrap();
        let collected: u32 = stored.history.iter().map(|r| r.quantity).sum();
        prop_assert_eq!(collected, stored.completed_qty);
        let in_kits = desk.stock().get("DET-1").unwrap().in_kits_qty;
        prop_assert_eq!(in_kits, u64::from(stored.completed_qty));
    }
}
