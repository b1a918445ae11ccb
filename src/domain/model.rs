// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod product;
mod batch;
mod order;
mod cart;

pub use value_objects::{
    ProductId, BatchId, OrderId, CustomerId, CartId,
    Currency, Money,
    OrderNumber,
    OrderStatus,
    OrderLine,
    Demand,
    Allocation,
};

pub use product::Product;
pub use batch::StockBatch;
pub use order::Order;
pub use cart::{Cart, CartLine};
