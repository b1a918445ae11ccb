use crate::domain::error::DomainError;
use crate::domain::model::{CartId, CustomerId, Demand, ProductId};

/// カート明細
/// 商品と数量のペア。価格はカートでは確定せず、注文時にスナップショットされる
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    product_id: ProductId,
    quantity: u32,
}

impl CartLine {
    /// 新しいカート明細を作成
    /// 数量は1以上である必要がある
    pub fn new(product_id: ProductId, quantity: u32) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// カート
/// 外部のカートコラボレータから受け取る「商品と数量の単なるリスト」
/// 認証済みカート由来かゲストカート由来かは関知しない
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    id: CartId,
    customer_id: CustomerId,
    lines: Vec<CartLine>,
}

impl Cart {
    /// 新しいカートを作成
    pub fn new(id: CartId, customer_id: CustomerId, lines: Vec<CartLine>) -> Self {
        Self {
            id,
            customer_id,
            lines,
        }
    }

    /// カートIDを取得
    pub fn id(&self) -> CartId {
        self.id
    }

    /// 顧客IDを取得
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// カート明細のリストを取得
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// カートが空かどうかチェック
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// カート明細を注文要求のリストに変換
    pub fn demands(&self) -> Result<Vec<Demand>, DomainError> {
        self.lines
            .iter()
            .map(|line| Demand::new(line.product_id(), line.quantity()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new(CartId::new(), CustomerId::new(), Vec::new());
        assert!(cart.is_empty());
        assert!(cart.demands().unwrap().is_empty());
    }

    #[test]
    fn test_cart_demands_preserve_order() {
        let p1 = ProductId::new();
        let p2 = ProductId::new();
        let cart = Cart::new(
            CartId::new(),
            CustomerId::new(),
            vec![
                CartLine::new(p1, 2).unwrap(),
                CartLine::new(p2, 5).unwrap(),
            ],
        );
        let demands = cart.demands().unwrap();
        assert_eq!(demands.len(), 2);
        assert_eq!(demands[0].product_id(), p1);
        assert_eq!(demands[0].quantity(), 2);
        assert_eq!(demands[1].product_id(), p2);
        assert_eq!(demands[1].quantity(), 5);
    }

    #[test]
    fn test_cart_line_requires_positive_quantity() {
        assert!(CartLine::new(ProductId::new(), 0).is_err());
    }
}
