use bookstore_stock_fulfillment::domain::model::{
    BatchId, Money, OrderLine, OrderNumber, ProductId, StockBatch,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn usd_cents(cents: i64) -> Money {
    Money::usd(Decimal::new(cents, 2))
}

// Money のプロパティベーステスト
proptest! {
    /// Money の加算は交換法則を満たす (a + b = b + a)
    #[test]
    fn test_money_addition_is_commutative(
        cents1 in 0i64..1_000_000,
        cents2 in 0i64..1_000_000,
    ) {
        let money1 = usd_cents(cents1);
        let money2 = usd_cents(cents2);

        let result1 = money1.add(&money2).unwrap();
        let result2 = money2.add(&money1).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の加算は結合法則を満たす ((a + b) + c = a + (b + c))
    #[test]
    fn test_money_addition_is_associative(
        cents1 in 0i64..100_000,
        cents2 in 0i64..100_000,
        cents3 in 0i64..100_000,
    ) {
        let money1 = usd_cents(cents1);
        let money2 = usd_cents(cents2);
        let money3 = usd_cents(cents3);

        let result1 = money1.add(&money2).unwrap().add(&money3).unwrap();
        let result2 = money1.add(&money2.add(&money3).unwrap()).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の乗算は分配法則を満たす (a * (b + c) = a * b + a * c)
    #[test]
    fn test_money_multiplication_distributive(
        base_cents in 1i64..10_000,
        factor1 in 1u32..100,
        factor2 in 1u32..100,
    ) {
        let money = usd_cents(base_cents);

        let left_side = money.multiply(factor1 + factor2);
        let right_side = money.multiply(factor1).add(&money.multiply(factor2)).unwrap();

        prop_assert_eq!(left_side, right_side);
    }

    /// Money の乗算で1を掛けると元の値と同じ
    #[test]
    fn test_money_multiply_by_one(
        cents in 0i64..1_000_000,
    ) {
        let money = usd_cents(cents);
        prop_assert_eq!(money.multiply(1), money);
    }

    /// 0〜100%のパーセンテージは元の金額を超えない
    #[test]
    fn test_money_percentage_never_exceeds_original(
        cents in 0i64..1_000_000,
        percent in 0i64..=100,
    ) {
        let money = usd_cents(cents);
        let part = money.percentage(Decimal::from(percent));

        prop_assert!(part.amount() >= Decimal::ZERO);
        prop_assert!(part.amount() <= money.amount());
    }

    /// 割引後価格と節約額を足すとほぼ基準価格に戻る（丸め誤差は1セントまで）
    #[test]
    fn test_discount_split_adds_back_to_base(
        cents in 1i64..1_000_000,
        percent in 0i64..=100,
    ) {
        let base = usd_cents(cents);
        let discount = Decimal::from(percent);
        let final_price = base.percentage(Decimal::ONE_HUNDRED - discount);
        let saved = base.percentage(discount);

        let recombined = final_price.add(&saved).unwrap();
        let diff = (recombined.amount() - base.amount()).abs();
        prop_assert!(diff <= Decimal::new(1, 2));
    }
}

// OrderLine のプロパティベーステスト
proptest! {
    /// OrderLine の小計は常に単価 × 数量と等しい
    #[test]
    fn test_order_line_subtotal_calculation(
        quantity in 1u32..1000,
        unit_cents in 1i64..100_000,
    ) {
        let price = usd_cents(unit_cents);
        let line = OrderLine::new(
            ProductId::new(),
            Some(BatchId::new()),
            quantity,
            price,
            Decimal::ZERO,
        )
        .unwrap();

        prop_assert_eq!(line.subtotal(), price.multiply(quantity));
    }

    /// OrderLine は数量0では作れない
    #[test]
    fn test_order_line_rejects_zero_quantity(
        unit_cents in 1i64..100_000,
    ) {
        let price = usd_cents(unit_cents);
        let result = OrderLine::new(ProductId::new(), None, 0, price, Decimal::ZERO);
        prop_assert!(result.is_err());
    }
}

fn test_batch(initial: u32) -> StockBatch {
    StockBatch::new(
        BatchId::new(),
        ProductId::new(),
        "BATCH-PROP".to_string(),
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        None,
        usd_cents(1850),
        initial,
    )
    .unwrap()
}

// StockBatch のプロパティベーステスト
proptest! {
    /// 引き落とした数量と残量の合計は常に初期数量と等しい
    #[test]
    fn test_batch_deduction_conserves_quantity(
        initial in 1u32..1000,
        deductions in prop::collection::vec(1u32..50, 0..20),
    ) {
        let mut batch = test_batch(initial);
        let mut deducted_total = 0u32;

        for quantity in deductions {
            if batch.deduct(quantity).is_ok() {
                deducted_total += quantity;
            }
        }

        prop_assert_eq!(batch.remaining_quantity() + deducted_total, initial);
    }

    /// 残量を超える引き落としは失敗し、残量を変えない
    #[test]
    fn test_batch_never_goes_negative(
        initial in 1u32..1000,
        excess in 1u32..1000,
    ) {
        let mut batch = test_batch(initial);
        let result = batch.deduct(initial + excess);

        prop_assert!(result.is_err());
        prop_assert_eq!(batch.remaining_quantity(), initial);
    }

    /// 引き落とし後に同じ数量を戻すと元の残量に戻る
    #[test]
    fn test_batch_deduct_restore_round_trip(
        initial in 1u32..1000,
        taken_ratio in 0.0f64..=1.0,
    ) {
        let taken = ((initial as f64) * taken_ratio) as u32;
        prop_assume!(taken >= 1);

        let mut batch = test_batch(initial);
        batch.deduct(taken).unwrap();
        batch.restore(taken).unwrap();

        prop_assert_eq!(batch.remaining_quantity(), initial);
    }

    /// 初期数量を超える戻し入れは失敗する
    #[test]
    fn test_batch_restore_never_exceeds_initial(
        initial in 1u32..1000,
        excess in 1u32..1000,
    ) {
        let mut batch = test_batch(initial);
        let result = batch.restore(excess);

        prop_assert!(result.is_err());
        prop_assert_eq!(batch.remaining_quantity(), initial);
    }
}

// OrderNumber のプロパティベーステスト
proptest! {
    /// 生成された注文番号は常に ORD-YYYYMMDD-XXXXXX 形式
    #[test]
    fn test_order_number_format(_seed in 0u32..100) {
        let number = OrderNumber::generate();
        let parts: Vec<&str> = number.as_str().split('-').collect();

        prop_assert_eq!(parts.len(), 3);
        prop_assert_eq!(parts[0], "ORD");
        prop_assert_eq!(parts[1].len(), 8);
        prop_assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(parts[2].len(), 6);
    }
}
